use std::sync::Arc;

use dashmap::DashMap;
use models::{validate_name, NewParticipant, Participant};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};

use super::{ids::next_id, update::ParticipantUpdate};
use crate::errors::ServiceError;
use crate::storage::RosterStore;

/// One async mutex per year, held across each read-modify-write cycle.
#[derive(Default)]
struct YearLocks {
    inner: DashMap<i32, Arc<Mutex<()>>>,
}

impl YearLocks {
    async fn acquire(&self, year: i32) -> OwnedMutexGuard<()> {
        let lock = Arc::clone(self.inner.entry(year).or_default().value());
        lock.lock_owned().await
    }
}

/// Business operations on a year's roster.
///
/// Every call loads the roster from the store, and every mutation writes the
/// whole roster back before returning.
pub struct ParticipantService {
    store: Arc<dyn RosterStore>,
    locks: YearLocks,
}

impl ParticipantService {
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        Self { store, locks: YearLocks::default() }
    }

    /// Add a participant. A duplicate name is reported before an empty one.
    pub async fn create(&self, year: i32, input: NewParticipant) -> Result<Participant, ServiceError> {
        let _guard = self.locks.acquire(year).await;
        let mut roster = self.store.read_roster(year).await?;

        if roster.iter().any(|p| p.name == input.name) {
            return Err(ServiceError::DuplicateName);
        }
        validate_name(&input.name)?;

        let id = next_id(&roster)?;
        let created = input.into_participant(id);
        roster.push(created.clone());
        self.store.write_roster(year, &roster).await?;

        info!(year, id, name = %created.name, "participant created");
        Ok(created)
    }

    /// The whole roster, highest score first.
    pub async fn get_all(&self, year: i32) -> Result<Vec<Participant>, ServiceError> {
        let _guard = self.locks.acquire(year).await;
        let mut roster = self.store.read_roster(year).await?;
        roster.sort_by(|a, b| b.score.cmp(&a.score));
        debug!(year, len = roster.len(), "roster listed");
        Ok(roster)
    }

    pub async fn get(&self, year: i32, id: u32) -> Result<Participant, ServiceError> {
        let _guard = self.locks.acquire(year).await;
        let roster = self.store.read_roster(year).await?;
        roster
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(ServiceError::NotFound)
    }

    pub async fn increase_score(&self, year: i32, id: u32, amount: u16) -> Result<Participant, ServiceError> {
        self.update(year, id, ParticipantUpdate::IncreaseScore(amount)).await
    }

    pub async fn decrease_score(&self, year: i32, id: u32, amount: u16) -> Result<Participant, ServiceError> {
        self.update(year, id, ParticipantUpdate::DecreaseScore(amount)).await
    }

    pub async fn update_score(&self, year: i32, id: u32, score: u16) -> Result<Participant, ServiceError> {
        self.update(year, id, ParticipantUpdate::SetScore(score)).await
    }

    /// Rename a participant. Unlike `create`, other participants' names are not checked.
    pub async fn update_name(&self, year: i32, id: u32, new_name: String) -> Result<Participant, ServiceError> {
        self.update(year, id, ParticipantUpdate::Rename(new_name)).await
    }

    /// Load, apply `change` to the participant with `id`, persist, return the updated entry.
    pub async fn update(&self, year: i32, id: u32, change: ParticipantUpdate) -> Result<Participant, ServiceError> {
        if let ParticipantUpdate::Rename(name) = &change {
            validate_name(name)?;
        }

        let _guard = self.locks.acquire(year).await;
        let mut roster = self.store.read_roster(year).await?;
        let idx = find_index(&roster, id).ok_or(ServiceError::NotFound)?;

        let kind = change.kind();
        change.apply(&mut roster[idx]);
        self.store.write_roster(year, &roster).await?;

        let updated = roster.swap_remove(idx);
        info!(year, id, update = kind, score = updated.score, "participant updated");
        Ok(updated)
    }

    /// Remove a participant. The last entry takes the removed one's place.
    pub async fn delete(&self, year: i32, id: u32) -> Result<(), ServiceError> {
        let _guard = self.locks.acquire(year).await;
        let mut roster = self.store.read_roster(year).await?;
        let idx = find_index(&roster, id).ok_or(ServiceError::NotFound)?;

        roster.swap_remove(idx);
        self.store.write_roster(year, &roster).await?;

        info!(year, id, "participant deleted");
        Ok(())
    }
}

fn find_index(roster: &[Participant], id: u32) -> Option<usize> {
    roster.iter().position(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{JsonRosterStore, MemoryRosterStore};

    const YEAR: i32 = 2024;

    fn p(id: u32, name: &str, score: u16) -> Participant {
        Participant { id, name: name.into(), score }
    }

    fn new(name: &str) -> NewParticipant {
        NewParticipant { name: name.into(), score: 0 }
    }

    fn service_with(roster: Vec<Participant>) -> (ParticipantService, Arc<MemoryRosterStore>) {
        let store = Arc::new(MemoryRosterStore::new().with_roster(YEAR, roster));
        (ParticipantService::new(store.clone()), store)
    }

    #[tokio::test]
    async fn create_on_empty_roster_assigns_one() -> anyhow::Result<()> {
        let (svc, store) = service_with(vec![]);
        let created = svc.create(YEAR, new("Bo")).await?;
        assert_eq!(created, p(1, "Bo", 0));
        assert_eq!(store.snapshot(YEAR).unwrap(), vec![p(1, "Bo", 0)]);
        Ok(())
    }

    #[tokio::test]
    async fn create_follows_max_id_and_keeps_initial_score() -> anyhow::Result<()> {
        let (svc, _) = service_with(vec![p(0, "A", 1), p(1, "B", 1), p(2, "C", 1)]);
        let created = svc
            .create(YEAR, NewParticipant { name: "D".into(), score: 12 })
            .await?;
        assert_eq!(created, p(3, "D", 12));
        assert!(svc.get_all(YEAR).await?.contains(&created));
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_duplicate_exact_name() -> anyhow::Result<()> {
        let (svc, store) = service_with(vec![p(1, "Al", 0)]);
        assert!(matches!(svc.create(YEAR, new("Al")).await, Err(ServiceError::DuplicateName)));
        // exact match only
        assert_eq!(svc.create(YEAR, new("al")).await?.id, 2);
        assert_eq!(store.snapshot(YEAR).unwrap().len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_blank_names() {
        let (svc, store) = service_with(vec![p(1, "Al", 0)]);
        for name in ["", "   ", "\t\n"] {
            assert!(matches!(svc.create(YEAR, new(name)).await, Err(ServiceError::EmptyName)));
        }
        assert_eq!(store.snapshot(YEAR).unwrap(), vec![p(1, "Al", 0)]);
    }

    #[tokio::test]
    async fn duplicate_is_reported_before_empty() {
        let (svc, _) = service_with(vec![p(1, "", 0)]);
        assert!(matches!(svc.create(YEAR, new("")).await, Err(ServiceError::DuplicateName)));
    }

    #[tokio::test]
    async fn get_all_sorts_by_score_descending() -> anyhow::Result<()> {
        let (svc, _) = service_with(vec![]);
        assert!(svc.get_all(YEAR).await?.is_empty());

        let (svc, _) = service_with(vec![p(1, "A", 5)]);
        assert_eq!(svc.get_all(YEAR).await?, vec![p(1, "A", 5)]);

        let (svc, _) = service_with(vec![p(1, "A", 5), p(2, "B", 50), p(3, "C", 0), p(4, "D", 50)]);
        let all = svc.get_all(YEAR).await?;
        assert!(all.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(all.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn get_by_id() -> anyhow::Result<()> {
        let (svc, _) = service_with(vec![p(1, "A", 5), p(2, "B", 6)]);
        assert_eq!(svc.get(YEAR, 2).await?, p(2, "B", 6));
        assert!(matches!(svc.get(YEAR, 9).await, Err(ServiceError::NotFound)));
        Ok(())
    }

    #[tokio::test]
    async fn increase_score_persists() -> anyhow::Result<()> {
        let (svc, store) = service_with(vec![p(1, "Al", 10)]);
        assert_eq!(svc.increase_score(YEAR, 1, 5).await?, p(1, "Al", 15));
        assert_eq!(store.snapshot(YEAR).unwrap(), vec![p(1, "Al", 15)]);
        Ok(())
    }

    #[tokio::test]
    async fn score_updates_wrap_and_restore() -> anyhow::Result<()> {
        let (svc, _) = service_with(vec![p(1, "Al", 10), p(2, "Bo", 65535)]);
        svc.increase_score(YEAR, 1, 100).await?;
        assert_eq!(svc.decrease_score(YEAR, 1, 100).await?.score, 10);
        assert_eq!(svc.increase_score(YEAR, 2, 1).await?.score, 0);
        assert_eq!(svc.decrease_score(YEAR, 2, 1).await?.score, 65535);
        assert_eq!(svc.update_score(YEAR, 1, 777).await?, p(1, "Al", 777));
        Ok(())
    }

    #[tokio::test]
    async fn updates_on_missing_id_are_not_found() {
        let (svc, store) = service_with(vec![p(1, "Al", 10)]);
        assert!(matches!(svc.increase_score(YEAR, 2, 1).await, Err(ServiceError::NotFound)));
        assert!(matches!(svc.decrease_score(YEAR, 2, 1).await, Err(ServiceError::NotFound)));
        assert!(matches!(svc.update_score(YEAR, 2, 1).await, Err(ServiceError::NotFound)));
        assert!(matches!(svc.update_name(YEAR, 2, "X".into()).await, Err(ServiceError::NotFound)));
        assert_eq!(store.snapshot(YEAR).unwrap(), vec![p(1, "Al", 10)]);
    }

    #[tokio::test]
    async fn rename_checks_emptiness_before_lookup() -> anyhow::Result<()> {
        let (svc, _) = service_with(vec![p(1, "Al", 10), p(2, "Bo", 1)]);
        assert!(matches!(svc.update_name(YEAR, 99, " ".into()).await, Err(ServiceError::EmptyName)));
        // names of other participants are not checked on rename
        assert_eq!(svc.update_name(YEAR, 1, "Bo".into()).await?, p(1, "Bo", 10));
        Ok(())
    }

    #[tokio::test]
    async fn delete_swaps_last_into_place() -> anyhow::Result<()> {
        let (svc, store) = service_with(vec![p(1, "A", 0), p(2, "B", 0), p(3, "C", 0)]);
        svc.delete(YEAR, 1).await?;
        assert_eq!(store.snapshot(YEAR).unwrap(), vec![p(3, "C", 0), p(2, "B", 0)]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_leaves_roster_unchanged() {
        let (svc, store) = service_with(vec![p(1, "A", 0)]);
        assert!(matches!(svc.delete(YEAR, 5).await, Err(ServiceError::NotFound)));
        assert_eq!(store.snapshot(YEAR).unwrap(), vec![p(1, "A", 0)]);
    }

    #[tokio::test]
    async fn delete_only_entry_leaves_empty_file() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("participant_service_{}", uuid::Uuid::new_v4()));
        let store = JsonRosterStore::new(&dir).await?;
        store.write_roster(YEAR, &[p(1, "Al", 10)]).await?;
        let svc = ParticipantService::new(store.clone());

        svc.delete(YEAR, 1).await?;
        assert_eq!(tokio::fs::read_to_string(store.roster_path(YEAR)).await?, "[]");

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_creates_do_not_lose_updates() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("participant_service_{}", uuid::Uuid::new_v4()));
        let store = JsonRosterStore::new(&dir).await?;
        let svc = Arc::new(ParticipantService::new(store));

        let mut handles = Vec::new();
        for i in 0..16 {
            let svc = Arc::clone(&svc);
            handles.push(tokio::spawn(async move {
                svc.create(YEAR, new(&format!("racer{i}"))).await
            }));
        }
        for h in handles {
            h.await??;
        }

        let all = svc.get_all(YEAR).await?;
        assert_eq!(all.len(), 16);
        let mut ids: Vec<u32> = all.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<_>>());

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
