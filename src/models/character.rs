//! Character models: raw game API records, search candidates and roster snapshots.

use serde::{Deserialize, Serialize};

/// A sibling record as returned by the game API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawCharacter {
    pub character_name: String,
    pub character_level: u32,
    pub character_class_name: String,
    /// Locale-formatted decimal, e.g. `"1,620.83"`.
    pub item_avg_level: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

/// A normalized search result offered for assignment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateCharacter {
    pub name: String,
    pub class_name: String,
    pub level: u32,
    pub item_level: String,
    #[serde(default)]
    pub parsed_item_level: f64,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

/// Combat power as reported by the armory endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum CombatPower {
    Known(String),
    Unavailable,
}

impl CombatPower {
    /// Numeric value with thousands separators stripped, if any.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            CombatPower::Known(raw) => raw.replace(',', "").trim().parse().ok(),
            CombatPower::Unavailable => None,
        }
    }
}

/// A character copied by value into a session slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssignedCharacter {
    pub name: String,
    pub class_name: String,
    pub level: u32,
    pub item_level: String,
    pub display_name: String,
    /// `None` until the armory lookup has been attempted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub combat_power: Option<CombatPower>,
    pub added_by: String,
}

impl AssignedCharacter {
    pub fn from_candidate(
        candidate: CandidateCharacter,
        combat_power: CombatPower,
        added_by: impl Into<String>,
    ) -> Self {
        Self {
            name: candidate.name,
            class_name: candidate.class_name,
            level: candidate.level,
            item_level: candidate.item_level,
            display_name: candidate.display_name,
            combat_power: Some(combat_power),
            added_by: added_by.into(),
        }
    }

    /// Whether the armory lookup should be (re)attempted for this member.
    pub fn needs_combat_power(&self) -> bool {
        !matches!(self.combat_power, Some(CombatPower::Known(_)))
    }
}
