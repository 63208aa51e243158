//! Slot assignment and removal.

use super::{family_key, RosterError};
use crate::models::{
    AssignedCharacter, Party, Roster, SlotRef, SlotTarget, DEALERS_PER_PARTY, RAID_PARTIES,
};

/// Place `character` into `target`, returning the updated roster.
///
/// The character is first taken out of any slot it already holds, so assigning
/// an occupant elsewhere moves it. The input roster is never modified; on error
/// the caller still holds the unchanged original.
pub fn assign(
    roster: &Roster,
    character: AssignedCharacter,
    target: SlotTarget,
) -> Result<Roster, RosterError> {
    check_target(roster, target)?;
    check_family(roster, &character)?;

    let mut next = roster.clone();
    withdraw(&mut next, &character.name);

    match (&mut next, target) {
        (Roster::Raid { parties }, SlotTarget::Designated { party }) => {
            let party = &mut parties[party_index(party)?];
            if party.support.is_some() {
                return Err(RosterError::SupportOccupied);
            }
            party.support = Some(character);
        }
        (Roster::Raid { parties }, SlotTarget::Generic { party }) => {
            let party = &mut parties[party_index(party)?];
            if party.dealers.len() >= DEALERS_PER_PARTY {
                return Err(RosterError::DealersFull);
            }
            party.dealers.push(character);
        }
        (Roster::General { participants, size }, SlotTarget::Participant) => {
            if participants.len() >= *size {
                return Err(RosterError::RosterFull);
            }
            participants.push(character);
        }
        (roster, _) => {
            return Err(RosterError::InvalidTarget(format!(
                "that slot does not exist in a {} session",
                roster.kind().as_str()
            )))
        }
    }

    Ok(next)
}

/// Take the occupant of `slot` out of the roster.
///
/// Returns the updated roster together with the removed character, so the
/// caller can authorize the removal before persisting anything.
pub fn remove(roster: &Roster, slot: SlotRef) -> Result<(Roster, AssignedCharacter), RosterError> {
    let mut next = roster.clone();

    let removed = match (&mut next, slot) {
        (Roster::Raid { parties }, SlotRef::Designated { party }) => parties[party_index(party)?]
            .support
            .take()
            .ok_or(RosterError::EmptySlot)?,
        (Roster::Raid { parties }, SlotRef::Generic { party, index }) => {
            let dealers = &mut parties[party_index(party)?].dealers;
            if index >= dealers.len() {
                return Err(RosterError::EmptySlot);
            }
            dealers.remove(index)
        }
        (Roster::General { participants, .. }, SlotRef::Participant { index }) => {
            if index >= participants.len() {
                return Err(RosterError::EmptySlot);
            }
            participants.remove(index)
        }
        (Roster::Raid { .. }, SlotRef::Participant { .. }) => {
            return Err(RosterError::InvalidTarget(
                "raid sessions have no participant list".to_string(),
            ))
        }
        (Roster::General { .. }, _) => {
            return Err(RosterError::InvalidTarget(
                "general sessions have no parties".to_string(),
            ))
        }
    };

    Ok((next, removed))
}

/// Reject a target that cannot exist in `roster`, whatever its occupancy.
pub fn check_target(roster: &Roster, target: SlotTarget) -> Result<(), RosterError> {
    match (roster, target) {
        (Roster::Raid { .. }, SlotTarget::Designated { party })
        | (Roster::Raid { .. }, SlotTarget::Generic { party }) => party_index(party).map(|_| ()),
        (Roster::General { .. }, SlotTarget::Participant) => Ok(()),
        (Roster::Raid { .. }, SlotTarget::Participant) => Err(RosterError::InvalidTarget(
            "raid sessions need a party and a role".to_string(),
        )),
        (Roster::General { .. }, _) => Err(RosterError::InvalidTarget(
            "general sessions have no parties".to_string(),
        )),
    }
}

/// Reject `character` if another character of the same account is seated.
fn check_family(roster: &Roster, character: &AssignedCharacter) -> Result<(), RosterError> {
    let incoming = family_key(&character.name, &character.display_name);

    let clash = roster
        .occupants()
        .filter(|occupant| occupant.name != character.name)
        .any(|occupant| family_key(&occupant.name, &occupant.display_name) == incoming);

    if clash {
        return Err(RosterError::FamilyConflict(incoming.to_string()));
    }
    Ok(())
}

/// Drop every slot held by the character called `name`.
fn withdraw(roster: &mut Roster, name: &str) {
    match roster {
        Roster::Raid { parties } => {
            for Party { support, dealers } in parties.iter_mut() {
                if support.as_ref().is_some_and(|s| s.name == name) {
                    *support = None;
                }
                dealers.retain(|d| d.name != name);
            }
        }
        Roster::General { participants, .. } => participants.retain(|p| p.name != name),
    }
}

/// Map a 1-based party number to an array index.
fn party_index(party: u8) -> Result<usize, RosterError> {
    match party as usize {
        n @ 1..=RAID_PARTIES => Ok(n - 1),
        _ => Err(RosterError::InvalidTarget(format!(
            "party must be between 1 and {}, got {}",
            RAID_PARTIES, party
        ))),
    }
}
