use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("The name of a participant cannot be empty")]
    EmptyName,
}
