use crate::api::ApiClient;
use crate::models::{Catalog, CurrentUser, TaskCompletion};
use crate::storage::LocalCache;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub const POINTS_PER_PROJECT: u32 = 50;
pub const POINTS_PER_LEVEL: u32 = 100;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    pub unlocked_index: usize,
    pub completed_projects: BTreeSet<usize>,
    pub points: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Awarded { advanced: bool },
    AlreadyCompleted,
}

impl ProgressState {
    pub fn is_unlocked(&self, index: usize) -> bool {
        index <= self.unlocked_index
    }

    pub fn is_completed(&self, index: usize) -> bool {
        self.completed_projects.contains(&index)
    }

    /// Completing an index already in the completed set awards nothing.
    /// Only completing the frontier moves it, and never past the last project.
    pub fn complete(&mut self, index: usize, project_count: usize) -> Completion {
        if !self.completed_projects.insert(index) {
            return Completion::AlreadyCompleted;
        }
        self.points = self.points.saturating_add(POINTS_PER_PROJECT);

        let advanced = index == self.unlocked_index && index + 1 < project_count;
        if advanced {
            self.unlocked_index += 1;
        }
        Completion::Awarded { advanced }
    }

    pub fn level(&self) -> u32 {
        level_for(self.points)
    }

    pub fn badges(&self) -> Vec<Badge> {
        badges_for(self.points)
    }

    pub fn progress_percent(&self, project_count: usize) -> u32 {
        if project_count == 0 {
            return 0;
        }
        let unlocked = (self.unlocked_index + 1) as f64;
        (unlocked / project_count as f64 * 100.0).round() as u32
    }
}

pub fn level_for(points: u32) -> u32 {
    points / POINTS_PER_LEVEL + 1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Badge {
    Beginner,
    Intermediate,
    Expert,
}

impl Badge {
    pub const ALL: [Badge; 3] = [Badge::Beginner, Badge::Intermediate, Badge::Expert];

    pub fn threshold(self) -> u32 {
        match self {
            Badge::Beginner => 50,
            Badge::Intermediate => 100,
            Badge::Expert => 200,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Badge::Beginner => "🏆 Beginner",
            Badge::Intermediate => "🎖 Intermediate",
            Badge::Expert => "🌟 Expert",
        }
    }
}

pub fn badges_for(points: u32) -> Vec<Badge> {
    Badge::ALL
        .into_iter()
        .filter(|badge| points >= badge.threshold())
        .collect()
}

pub fn completion_percent(done: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (done as f64 / total as f64 * 100.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Source {
    Remote,
    Local,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub source: Source,
    pub progress: ProgressState,
    pub task_completion: TaskCompletion,
}

impl ProgressSnapshot {
    pub fn from_user(user: &CurrentUser) -> Self {
        Self {
            source: Source::Remote,
            progress: user.progress(),
            task_completion: user.task_completion.clone(),
        }
    }

    pub fn from_cache(cache: &LocalCache) -> Self {
        Self {
            source: Source::Local,
            progress: cache.progress(),
            task_completion: cache.task_completion(),
        }
    }

    pub fn completion_for(&self, project: usize, task_count: usize) -> Vec<bool> {
        self.task_completion.vector(project, task_count)
    }

    // Only the server's completed list short-circuits to 100.
    pub fn research_percent(&self, project: usize, task_count: usize) -> u32 {
        if self.source == Source::Remote && self.progress.is_completed(project) {
            return 100;
        }
        completion_percent(self.task_completion.done_count(project).min(task_count), task_count)
    }

    pub fn research_percents(&self, catalog: &Catalog) -> Vec<u32> {
        (0..catalog.len())
            .map(|index| self.research_percent(index, catalog.tasks(index).len()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Available(ProgressSnapshot),
    Unreachable,
}

#[async_trait]
pub trait ProgressStateProvider: Send + Sync {
    async fn snapshot(&self) -> Snapshot;
}

/// Reads progress from `GET /api/user`.
///
/// A reachable server that reports no signed-in user counts as unavailable,
/// for dashboard reads as well as research charts, so a signed-out session
/// shows what the local cache holds rather than an empty checklist.
pub struct RemoteProvider {
    api: ApiClient,
}

impl RemoteProvider {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ProgressStateProvider for RemoteProvider {
    async fn snapshot(&self) -> Snapshot {
        match self.api.fetch_current_user().await {
            Ok(user) if user.logged_in => Snapshot::Available(ProgressSnapshot::from_user(&user)),
            Ok(_) => {
                debug!("server reports no signed-in user, progress unavailable remotely");
                Snapshot::Unreachable
            }
            Err(err) => {
                warn!("progress read failed: {err}");
                Snapshot::Unreachable
            }
        }
    }
}

pub struct LocalProvider {
    cache: Arc<Mutex<LocalCache>>,
}

impl LocalProvider {
    pub fn new(cache: Arc<Mutex<LocalCache>>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl ProgressStateProvider for LocalProvider {
    async fn snapshot(&self) -> Snapshot {
        let cache = self.cache.lock().await;
        Snapshot::Available(ProgressSnapshot::from_cache(&cache))
    }
}

pub async fn read_progress(
    primary: &dyn ProgressStateProvider,
    fallback: &dyn ProgressStateProvider,
) -> ProgressSnapshot {
    if let Snapshot::Available(snapshot) = primary.snapshot().await {
        return snapshot;
    }
    match fallback.snapshot().await {
        Snapshot::Available(snapshot) => snapshot,
        Snapshot::Unreachable => ProgressSnapshot {
            source: Source::Local,
            progress: ProgressState::default(),
            task_completion: TaskCompletion::default(),
        },
    }
}
