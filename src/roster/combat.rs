//! Combat-power aggregation over a roster.

use std::collections::HashMap;

use crate::models::{CombatPower, Roster, SessionStats};

/// Names of members whose combat power is missing or was unavailable.
pub fn members_needing_combat_power(roster: &Roster) -> Vec<String> {
    roster
        .occupants()
        .filter(|member| member.needs_combat_power())
        .map(|member| member.name.clone())
        .collect()
}

/// Write freshly fetched combat power into matching members.
///
/// Returns how many members changed.
pub fn apply_combat_power(roster: &mut Roster, fetched: &HashMap<String, CombatPower>) -> usize {
    let mut changed = 0;
    for member in roster.occupants_mut() {
        if let Some(power) = fetched.get(&member.name) {
            if member.combat_power.as_ref() != Some(power) {
                member.combat_power = Some(power.clone());
                changed += 1;
            }
        }
    }
    changed
}

/// Mean over members with a numeric combat power; `None` when there are none.
pub fn average_combat_power(roster: &Roster) -> Option<f64> {
    let values: Vec<f64> = roster
        .occupants()
        .filter_map(|member| member.combat_power.as_ref())
        .filter_map(CombatPower::numeric)
        .collect();

    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn stats(roster: &Roster) -> SessionStats {
    SessionStats {
        occupied: roster.occupants().count(),
        capacity: roster.capacity(),
        average_combat_power: average_combat_power(roster),
    }
}
