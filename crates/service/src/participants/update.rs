use models::Participant;

/// A change to one existing participant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParticipantUpdate {
    /// Add to the score, wrapping modulo 2^16.
    IncreaseScore(u16),
    /// Subtract from the score, wrapping modulo 2^16.
    DecreaseScore(u16),
    SetScore(u16),
    Rename(String),
}

impl ParticipantUpdate {
    pub fn apply(self, p: &mut Participant) {
        match self {
            ParticipantUpdate::IncreaseScore(amount) => p.score = p.score.wrapping_add(amount),
            ParticipantUpdate::DecreaseScore(amount) => p.score = p.score.wrapping_sub(amount),
            ParticipantUpdate::SetScore(score) => p.score = score,
            ParticipantUpdate::Rename(name) => p.name = name,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ParticipantUpdate::IncreaseScore(_) => "increase_score",
            ParticipantUpdate::DecreaseScore(_) => "decrease_score",
            ParticipantUpdate::SetScore(_) => "set_score",
            ParticipantUpdate::Rename(_) => "rename",
        }
    }
}
