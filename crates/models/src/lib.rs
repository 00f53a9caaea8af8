pub mod errors;
pub mod participant;

pub use participant::{is_blank, validate_name, NewParticipant, Participant};
