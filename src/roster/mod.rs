//! Roster rules.
//!
//! Pure functions over session rosters: duplicate-account detection, slot
//! assignment and removal, search normalization, expiry and combat-power
//! aggregation. Nothing in here touches the store or the network.

mod assignment;
mod combat;
mod expiry;
mod family;
mod normalize;

pub use assignment::*;
pub use combat::*;
pub use expiry::*;
pub use family::*;
pub use normalize::*;

use thiserror::Error;

/// A roster rule violation. No state is changed when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("A character from the '{0}' account is already assigned to this session")]
    FamilyConflict(String),

    #[error("The support slot of this party is already taken")]
    SupportOccupied,

    #[error("All dealer slots of this party are taken")]
    DealersFull,

    #[error("This session is full")]
    RosterFull,

    #[error("Invalid slot: {0}")]
    InvalidTarget(String),

    #[error("That slot is empty")]
    EmptySlot,
}
