// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! In-memory profile and project stores

use std::collections::VecDeque;
use tracing::debug;

use crate::model::{Profile, Project};

/// Holds the committed profile and an optional scratch copy being edited
#[derive(Debug, Clone)]
pub struct ProfileStore {
    committed: Profile,
    scratch: Option<Profile>,
}

impl ProfileStore {
    pub fn new(profile: Profile) -> Self {
        Self {
            committed: profile,
            scratch: None,
        }
    }

    /// The committed profile
    pub fn profile(&self) -> &Profile {
        &self.committed
    }

    /// Overwrite the committed profile. No validation.
    pub fn replace_profile(&mut self, next: Profile) {
        self.committed = next;
    }

    /// Start editing, or continue an edit already in progress
    pub fn stage_edit(&mut self) -> &mut Profile {
        self.scratch.get_or_insert_with(|| self.committed.clone())
    }

    pub fn scratch(&self) -> Option<&Profile> {
        self.scratch.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.scratch.is_some()
    }

    /// Commit the scratch copy. Returns false when nothing was staged.
    pub fn commit_edit(&mut self) -> bool {
        match self.scratch.take() {
            Some(next) => {
                self.replace_profile(next);
                true
            }
            None => false,
        }
    }

    pub fn discard_edit(&mut self) {
        if self.scratch.take().is_some() {
            debug!("Discarded profile edit");
        }
    }
}

/// Ordered project list, most recently added first
#[derive(Debug, Clone, Default)]
pub struct ProjectStore {
    projects: VecDeque<Project>,
}

impl ProjectStore {
    /// Seed order is kept as given
    pub fn new(projects: Vec<Project>) -> Self {
        Self {
            projects: projects.into(),
        }
    }

    pub fn add_project(&mut self, project: Project) {
        debug!("Adding project {} ({})", project.id, project.title);
        self.projects.push_front(project);
    }

    /// Remove the project with `id`; absent ids are a no-op
    pub fn delete_project(&mut self, id: &str) -> Option<Project> {
        let index = self.projects.iter().position(|p| p.id == id)?;
        self.projects.remove(index)
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Project> {
        self.projects.iter()
    }

    pub fn to_vec(&self) -> Vec<Project> {
        self.projects.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
