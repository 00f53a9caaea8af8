use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use models::Participant;
use tokio::fs;
use tracing::{debug, info};

use super::RosterStore;
use crate::errors::ServiceError;

pub const BASE_FILE_NAME: &str = "Participants";
pub const EXTENSION: &str = "json";

/// JSON file-backed roster store: one `Participants{year}.json` array per year.
#[derive(Clone, Debug)]
pub struct JsonRosterStore {
    directory: PathBuf,
}

impl JsonRosterStore {
    /// Initialize the store rooted at `directory`, creating the directory if missing.
    pub async fn new<P: Into<PathBuf>>(directory: P) -> Result<Arc<Self>, ServiceError> {
        let directory = directory.into();
        fs::create_dir_all(&directory).await?;
        Ok(Arc::new(Self { directory }))
    }

    pub fn directory(&self) -> &PathBuf {
        &self.directory
    }

    pub fn roster_path(&self, year: i32) -> PathBuf {
        self.directory.join(format!("{BASE_FILE_NAME}{year}.{EXTENSION}"))
    }
}

#[async_trait]
impl RosterStore for JsonRosterStore {
    async fn read_roster(&self, year: i32) -> Result<Vec<Participant>, ServiceError> {
        let path = self.roster_path(year);
        match fs::read(&path).await {
            Ok(bytes) => {
                // a `null` document is read as an empty roster
                let roster: Option<Vec<Participant>> =
                    serde_json::from_slice(&bytes).map_err(ServiceError::Decode)?;
                let roster = roster.unwrap_or_default();
                debug!(year, path = %path.display(), len = roster.len(), "roster loaded");
                Ok(roster)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(year, path = %path.display(), "roster file missing; creating empty roster");
                self.write_roster(year, &[]).await?;
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_roster(&self, year: i32, roster: &[Participant]) -> Result<(), ServiceError> {
        let path = self.roster_path(year);
        let data = serde_json::to_vec(roster).map_err(ServiceError::Encode)?;
        fs::write(&path, data).await?;
        debug!(year, path = %path.display(), len = roster.len(), "roster written");
        Ok(())
    }
}
