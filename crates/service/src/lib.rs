//! Service layer for contest rosters.
//! - `storage` owns the on-disk representation of a year's roster.
//! - `participants` enforces the roster invariants and performs the mutations.
//! - Every operation re-reads the roster; nothing is cached between calls.

pub mod errors;
pub mod storage;
pub mod participants;

pub use errors::ServiceError;
pub use participants::{ParticipantService, ParticipantUpdate};
pub use storage::{JsonRosterStore, MemoryRosterStore, RosterStore};
