use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::progress::ProgressState;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub resources: Vec<Resource>,
}

// Also the `GET /api/projects` response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub project_tasks: Vec<Vec<String>>,
}

impl Catalog {
    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn project(&self, index: usize) -> Option<&Project> {
        self.projects.get(index)
    }

    pub fn tasks(&self, index: usize) -> &[String] {
        self.project_tasks
            .get(index)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Keyed by the decimal project index. A missing project or a short vector
/// means "not checked".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskCompletion(BTreeMap<String, Vec<bool>>);

impl TaskCompletion {
    pub fn get(&self, project: usize) -> &[bool] {
        self.0
            .get(&project.to_string())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, project: usize) -> bool {
        self.0.contains_key(&project.to_string())
    }

    pub fn is_checked(&self, project: usize, task: usize) -> bool {
        self.get(project).get(task).copied().unwrap_or(false)
    }

    pub fn set(&mut self, project: usize, task: usize, checked: bool) {
        let entry = self.0.entry(project.to_string()).or_default();
        if entry.len() <= task {
            entry.resize(task + 1, false);
        }
        entry[task] = checked;
    }

    pub fn done_count(&self, project: usize) -> usize {
        self.get(project).iter().filter(|checked| **checked).count()
    }

    pub fn vector(&self, project: usize, task_count: usize) -> Vec<bool> {
        (0..task_count)
            .map(|task| self.is_checked(project, task))
            .collect()
    }
}

/// `GET /api/user`. Every field except `logged_in` is absent for anonymous callers.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentUser {
    #[serde(default)]
    pub logged_in: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub unlocked_index: usize,
    #[serde(default)]
    pub completed_projects: Vec<usize>,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub task_completion: TaskCompletion,
}

impl CurrentUser {
    pub fn progress(&self) -> ProgressState {
        ProgressState {
            unlocked_index: self.unlocked_index,
            completed_projects: self.completed_projects.iter().copied().collect(),
            points: self.points,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub admission: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TaskToggleRequest {
    pub project_index: usize,
    pub task_index: usize,
    pub checked: bool,
}

#[derive(Debug, Serialize)]
pub struct CompleteRequest {
    pub project_index: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub unlocked_index: usize,
    #[serde(default)]
    pub completed_projects: Vec<usize>,
    #[serde(default)]
    pub points: u32,
}

impl CompleteResponse {
    pub fn progress(&self) -> ProgressState {
        ProgressState {
            unlocked_index: self.unlocked_index,
            completed_projects: self.completed_projects.iter().copied().collect(),
            points: self.points,
        }
    }
}
