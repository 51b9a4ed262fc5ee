// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Top-level editing session
//!
//! Owns the profile store, the project store and the add-project draft. Every
//! method is synchronous; the suspending work (file reads, generation) runs
//! outside and hands its result back through [`Session::set_draft_image`] or
//! [`Session::finish_generation`]. Results apply in the order they arrive.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{GenerationError, ValidationError};
use crate::generator::DescribeError;
use crate::model::{ImageRef, Profile, Project};
use crate::seed::Seed;
use crate::store::{ProfileStore, ProjectStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationState {
    #[default]
    Idle,
    Generating,
    Succeeded,
    Failed,
}

/// The add-project form
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectDraft {
    pub title: String,
    pub description: String,
    pub image: Option<ImageRef>,
    pub generation: GenerationState,
    /// Inline message for the user
    pub error: Option<String>,
}

impl ProjectDraft {
    /// Build the project if every field is filled in
    pub fn to_project(&self) -> Result<Project, ValidationError> {
        match &self.image {
            Some(image)
                if !self.title.trim().is_empty()
                    && !self.description.trim().is_empty()
                    && !image.is_empty() =>
            {
                Ok(Project::new(&self.title, &self.description, image.clone()))
            }
            _ => Err(ValidationError::IncompleteProject),
        }
    }
}

/// A generation dispatch: what to send once the session lock is released
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub title: String,
    pub image: Option<ImageRef>,
}

/// A generation is already running for the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("A description is already being generated.")]
pub struct Busy;

#[derive(Debug)]
pub struct Session {
    profile: ProfileStore,
    projects: ProjectStore,
    draft: ProjectDraft,
    profile_error: Option<String>,
}

impl Session {
    pub fn new(seed: Seed) -> Self {
        Self {
            profile: ProfileStore::new(seed.profile),
            projects: ProjectStore::new(seed.projects),
            draft: ProjectDraft::default(),
            profile_error: None,
        }
    }

    pub fn profile(&self) -> &ProfileStore {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut ProfileStore {
        &mut self.profile
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn draft(&self) -> &ProjectDraft {
        &self.draft
    }

    pub fn profile_error(&self) -> Option<&str> {
        self.profile_error.as_deref()
    }

    // === Profile editing ===

    /// Put a freshly ingested avatar on the scratch profile
    pub fn set_avatar(&mut self, avatar: ImageRef) {
        self.profile.stage_edit().avatar = avatar;
        self.profile_error = None;
    }

    pub fn set_profile_error(&mut self, message: impl Into<String>) {
        self.profile_error = Some(message.into());
    }

    /// Apply the form fields to the scratch copy and commit it
    pub fn save_profile(&mut self, name: String, bio: String) {
        let scratch = self.profile.stage_edit();
        scratch.name = name;
        scratch.bio = bio;
        self.profile.commit_edit();
        self.profile_error = None;
        info!("Profile saved");
    }

    pub fn cancel_profile_edit(&mut self) {
        self.profile.discard_edit();
        self.profile_error = None;
    }

    // === Project draft ===

    pub fn set_draft_image(&mut self, image: ImageRef) {
        self.draft.image = Some(image);
        self.draft.error = None;
    }

    pub fn set_draft_error(&mut self, message: impl Into<String>) {
        self.draft.error = Some(message.into());
    }

    pub fn set_draft_text(&mut self, title: String, description: Option<String>) {
        self.draft.title = title;
        if let Some(description) = description {
            self.draft.description = description;
        }
    }

    /// Mark the draft as generating and return what to send
    pub fn begin_generation(&mut self, title: String) -> Result<PendingGeneration, Busy> {
        if self.draft.generation == GenerationState::Generating {
            warn!("Ignoring generate request while a generation is running");
            return Err(Busy);
        }

        self.draft.title = title;
        self.draft.generation = GenerationState::Generating;
        self.draft.error = None;

        Ok(PendingGeneration {
            title: self.draft.title.clone(),
            image: self.draft.image.clone(),
        })
    }

    /// Apply a generation outcome. Failures leave the description as it was.
    pub fn finish_generation(&mut self, result: Result<String, DescribeError>) {
        match result {
            Ok(description) => {
                self.draft.description = description;
                self.draft.generation = GenerationState::Succeeded;
                self.draft.error = None;
            }
            Err(e) => {
                self.draft.error = Some(e.to_string());
                self.draft.generation = GenerationState::Failed;
            }
        }
    }

    /// Fail a generation whose request went away before the service answered
    pub fn abandon_generation(&mut self) {
        if self.draft.generation == GenerationState::Generating {
            warn!("Generation request dropped before completion");
            self.finish_generation(Err(GenerationError.into()));
        }
    }

    /// Turn the draft into a project at the head of the list
    pub fn submit_draft(&mut self, title: String, description: String) -> Result<Project, ValidationError> {
        self.set_draft_text(title, Some(description));

        let project = match self.draft.to_project() {
            Ok(project) => project,
            Err(e) => {
                self.draft.error = Some(e.to_string());
                return Err(e);
            }
        };

        info!("Added project {} ({})", project.id, project.title);
        self.projects.add_project(project.clone());
        self.reset_draft();
        Ok(project)
    }

    /// Clear the form. A running generation keeps its state so the
    /// generate action stays disabled until it completes.
    pub fn reset_draft(&mut self) {
        let generation = match self.draft.generation {
            GenerationState::Generating => GenerationState::Generating,
            _ => GenerationState::Idle,
        };
        self.draft = ProjectDraft {
            generation,
            ..ProjectDraft::default()
        };
    }

    // === Projects ===

    /// Remove a project after the user confirmed
    pub fn delete_project(&mut self, id: &str) -> Option<Project> {
        let removed = self.projects.delete_project(id);
        match &removed {
            Some(project) => info!("Deleted project {} ({})", project.id, project.title),
            None => debug!("Delete for unknown project {}", id),
        }
        removed
    }

    /// Snapshot for rendering and export
    pub fn portfolio(&self) -> Portfolio {
        Portfolio {
            profile: self.profile.profile().clone(),
            projects: self.projects.to_vec(),
        }
    }
}

/// Committed profile and project list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Portfolio {
    pub profile: Profile,
    pub projects: Vec<Project>,
}

impl From<Seed> for Portfolio {
    fn from(seed: Seed) -> Self {
        Self {
            profile: seed.profile,
            projects: seed.projects,
        }
    }
}
