use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// One contestant in a year's roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: u32,
    pub name: String,
    pub score: u16,
}

/// Create payload. The id is assigned by the service, so any `id` in the body is ignored.
/// A missing `name` is read as empty and a missing `score` as 0.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct NewParticipant {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: u16,
}

impl NewParticipant {
    pub fn into_participant(self, id: u32) -> Participant {
        Participant { id, name: self.name, score: self.score }
    }
}

/// True for the empty string and for strings made only of whitespace.
pub fn is_blank(s: &str) -> bool {
    s.chars().all(char::is_whitespace)
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if is_blank(name) {
        return Err(ModelError::EmptyName);
    }
    Ok(())
}
