//! Session model: a scheduled raid or general event and its roster.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AssignedCharacter, CandidateCharacter};

/// Number of parties in a raid roster.
pub const RAID_PARTIES: usize = 2;
/// Dealer slots per raid party.
pub const DEALERS_PER_PARTY: usize = 3;
/// Default participant capacity of a general roster.
pub const DEFAULT_GENERAL_SIZE: usize = 4;
/// Largest participant capacity accepted for a general roster.
pub const MAX_GENERAL_SIZE: usize = 32;

/// Session discriminator as sent by clients on creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Raid,
    General,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Raid => "raid",
            SessionKind::General => "general",
        }
    }
}

/// One raid party: a single support slot and up to three dealers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Party {
    #[serde(default)]
    pub support: Option<AssignedCharacter>,
    #[serde(default)]
    pub dealers: Vec<AssignedCharacter>,
}

impl Party {
    fn members(&self) -> impl Iterator<Item = &AssignedCharacter> {
        self.support.iter().chain(self.dealers.iter())
    }

    fn members_mut(&mut self) -> impl Iterator<Item = &mut AssignedCharacter> {
        self.support.iter_mut().chain(self.dealers.iter_mut())
    }
}

/// The roster owned by a session, discriminated by session type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Roster {
    Raid {
        parties: [Party; RAID_PARTIES],
    },
    General {
        participants: Vec<AssignedCharacter>,
        size: usize,
    },
}

impl Roster {
    /// An empty roster of the given kind.
    pub fn empty(kind: SessionKind, size: usize) -> Self {
        match kind {
            SessionKind::Raid => Roster::Raid {
                parties: Default::default(),
            },
            SessionKind::General => Roster::General {
                participants: Vec::new(),
                size,
            },
        }
    }

    pub fn kind(&self) -> SessionKind {
        match self {
            Roster::Raid { .. } => SessionKind::Raid,
            Roster::General { .. } => SessionKind::General,
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            Roster::Raid { .. } => RAID_PARTIES * (1 + DEALERS_PER_PARTY),
            Roster::General { size, .. } => *size,
        }
    }

    /// Every occupied slot, parties in order with the support first.
    pub fn occupants(&self) -> Box<dyn Iterator<Item = &AssignedCharacter> + '_> {
        match self {
            Roster::Raid { parties } => Box::new(parties.iter().flat_map(Party::members)),
            Roster::General { participants, .. } => Box::new(participants.iter()),
        }
    }

    pub fn occupants_mut(&mut self) -> Box<dyn Iterator<Item = &mut AssignedCharacter> + '_> {
        match self {
            Roster::Raid { parties } => Box::new(parties.iter_mut().flat_map(Party::members_mut)),
            Roster::General { participants, .. } => Box::new(participants.iter_mut()),
        }
    }
}

/// A scheduled group event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub name: String,
    pub scheduled_start: DateTime<Utc>,
    pub creator_id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub roster: Roster,
}

/// Request body for creating a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub name: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    /// `+HH:MM` / `-HH:MM`, defaults to UTC.
    #[serde(default)]
    pub utc_offset: Option<String>,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    /// Participant capacity for general rosters; ignored for raids.
    #[serde(default)]
    pub size: Option<usize>,
}

/// Request body for editing a session's name and start time.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub name: String,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub utc_offset: Option<String>,
}

/// Where an incoming character should be placed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SlotTarget {
    /// Support slot of a raid party (`party` is 1 or 2).
    Designated { party: u8 },
    /// Dealer slot of a raid party (`party` is 1 or 2).
    Generic { party: u8 },
    /// Next free place in a general roster.
    Participant,
}

/// An occupied slot addressed for removal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SlotRef {
    Designated { party: u8 },
    Generic { party: u8, index: usize },
    Participant { index: usize },
}

/// Request body for assigning a character.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    pub character: CandidateCharacter,
    pub target: SlotTarget,
}

/// Request body for removing a character.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRequest {
    pub slot: SlotRef,
}

/// Occupancy and average combat power of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub occupied: usize,
    pub capacity: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_combat_power: Option<f64>,
}
