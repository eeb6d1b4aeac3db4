use crate::errors::StorageError;
use crate::models::TaskCompletion;
use crate::progress::ProgressState;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::error;

pub const UNLOCKED_INDEX_KEY: &str = "unlockedIndex";
pub const COMPLETED_PROJECTS_KEY: &str = "completedProjects";
pub const USER_POINTS_KEY: &str = "userPoints";
pub const TASK_COMPLETION_KEY: &str = "taskCompletion";
pub const CURRENT_PROJECT_KEY: &str = "currentProject";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
struct Entries(BTreeMap<String, String>);

// Every value is a string; typed accessors read a missing or unparsable
// value as its default.
#[derive(Debug, Clone)]
pub struct LocalCache {
    path: PathBuf,
    entries: Entries,
}

impl LocalCache {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Entries::default(),
        }
    }

    pub async fn load(path: &Path) -> Self {
        let entries = match fs::read(path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("failed to parse cache file: {err}");
                    Entries::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Entries::default(),
            Err(err) => {
                error!("failed to read cache file: {err}");
                Entries::default()
            }
        };

        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub async fn persist(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        let payload = serde_json::to_vec_pretty(&self.entries)?;
        fs::write(&self.path, payload).await?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.0.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.entries.0.insert(key.to_string(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.0.remove(key)
    }

    /// Returns `true` when any default was added.
    pub fn ensure_defaults(&mut self) -> bool {
        let mut changed = false;
        for (key, default) in [
            (UNLOCKED_INDEX_KEY, "0"),
            (COMPLETED_PROJECTS_KEY, "[]"),
            (USER_POINTS_KEY, "0"),
        ] {
            if self.get(key).is_none() {
                self.set(key, default);
                changed = true;
            }
        }
        changed
    }

    pub fn unlocked_index(&self) -> usize {
        self.parse_number(UNLOCKED_INDEX_KEY).unwrap_or(0)
    }

    pub fn set_unlocked_index(&mut self, index: usize) {
        self.set(UNLOCKED_INDEX_KEY, index.to_string());
    }

    pub fn completed_projects(&self) -> BTreeSet<usize> {
        self.get(COMPLETED_PROJECTS_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<usize>>(raw).ok())
            .map(|list| list.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn set_completed_projects(&mut self, completed: &BTreeSet<usize>) {
        let list: Vec<usize> = completed.iter().copied().collect();
        // A Vec<usize> always serializes.
        let raw = serde_json::to_string(&list).unwrap_or_else(|_| "[]".to_string());
        self.set(COMPLETED_PROJECTS_KEY, raw);
    }

    pub fn points(&self) -> u32 {
        self.parse_number(USER_POINTS_KEY).unwrap_or(0)
    }

    pub fn set_points(&mut self, points: u32) {
        self.set(USER_POINTS_KEY, points.to_string());
    }

    pub fn task_completion(&self) -> TaskCompletion {
        self.get(TASK_COMPLETION_KEY)
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    pub fn set_task_completion(&mut self, completion: &TaskCompletion) -> Result<(), StorageError> {
        let raw = serde_json::to_string(completion)?;
        self.set(TASK_COMPLETION_KEY, raw);
        Ok(())
    }

    pub fn current_project(&self) -> Option<usize> {
        self.parse_number(CURRENT_PROJECT_KEY)
    }

    pub fn set_current_project(&mut self, index: usize) {
        self.set(CURRENT_PROJECT_KEY, index.to_string());
    }

    pub fn clear_current_project(&mut self) {
        self.remove(CURRENT_PROJECT_KEY);
    }

    pub fn progress(&self) -> ProgressState {
        ProgressState {
            unlocked_index: self.unlocked_index(),
            completed_projects: self.completed_projects(),
            points: self.points(),
        }
    }

    pub fn reset_progress(&mut self) {
        self.set_unlocked_index(0);
        self.set_completed_projects(&BTreeSet::new());
        self.set_points(0);
        self.remove(TASK_COMPLETION_KEY);
        self.clear_current_project();
    }

    fn parse_number<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|raw| raw.trim().parse().ok())
    }
}
