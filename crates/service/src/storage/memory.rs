use async_trait::async_trait;
use dashmap::DashMap;
use models::Participant;

use super::RosterStore;
use crate::errors::ServiceError;

/// Process-local roster store. Rosters vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryRosterStore {
    rosters: DashMap<i32, Vec<Participant>>,
}

impl MemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a roster, replacing whatever the year held before.
    pub fn with_roster(self, year: i32, roster: Vec<Participant>) -> Self {
        self.rosters.insert(year, roster);
        self
    }

    /// Snapshot of the persisted roster, `None` if the year was never touched.
    pub fn snapshot(&self, year: i32) -> Option<Vec<Participant>> {
        self.rosters.get(&year).map(|r| r.value().clone())
    }
}

#[async_trait]
impl RosterStore for MemoryRosterStore {
    async fn read_roster(&self, year: i32) -> Result<Vec<Participant>, ServiceError> {
        Ok(self.rosters.entry(year).or_default().value().clone())
    }

    async fn write_roster(&self, year: i32, roster: &[Participant]) -> Result<(), ServiceError> {
        self.rosters.insert(year, roster.to_vec());
        Ok(())
    }
}
