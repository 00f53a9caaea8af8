//! Storage abstractions for the service layer
//!
//! A roster is always read and written as a whole; there are no partial
//! or append writes.

use async_trait::async_trait;
use models::Participant;

use crate::errors::ServiceError;

pub mod json_roster_store;
pub mod memory;

pub use json_roster_store::JsonRosterStore;
pub use memory::MemoryRosterStore;

/// Whole-roster persistence for one contest year.
#[async_trait]
pub trait RosterStore: Send + Sync {
    /// Load the roster for `year`, creating an empty one if none exists yet.
    async fn read_roster(&self, year: i32) -> Result<Vec<Participant>, ServiceError>;
    /// Replace the persisted roster for `year` with `roster`, keeping its order.
    async fn write_roster(&self, year: i32, roster: &[Participant]) -> Result<(), ServiceError>;
}
