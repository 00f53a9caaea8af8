use serde::Serialize;

/// Body of the liveness probe.
#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}
