// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Starting portfolio data
//!
//! The built-in seed is the only source of initial state. A JSON file with the
//! same shape may replace it; it is read once and never written back.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::model::{ImageRef, Profile, Project};
use crate::{NeonfolioError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seed {
    pub profile: Profile,
    #[serde(default)]
    pub projects: Vec<Project>,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            projects: default_projects(),
        }
    }
}

impl Seed {
    /// Use the seed file when one is given, the built-in seed otherwise
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let content = std::fs::read_to_string(path)?;
        let seed: Self = serde_json::from_str(&content)
            .map_err(|e| NeonfolioError::Config(format!("Failed to parse seed {:?}: {}", path, e)))?;
        info!("Loaded seed from {:?} ({} projects)", path, seed.projects.len());
        Ok(seed)
    }
}

pub fn default_profile() -> Profile {
    Profile {
        name: "Alex Designer".to_string(),
        bio: "I am a creative developer passionate about minimal design, neon aesthetics, \
              and building intuitive user experiences. Welcome to my digital garden."
            .to_string(),
        avatar: ImageRef::Remote(
            "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?q=80&w=1000&auto=format&fit=crop"
                .to_string(),
        ),
    }
}

pub fn default_projects() -> Vec<Project> {
    vec![
        Project {
            id: "2".to_string(),
            title: "Task Master App".to_string(),
            description: "Productivity dashboard focusing on clarity and focus. Uses a card-based \
                          layout to organize daily workflows efficiently. Features include \
                          drag-and-drop tasks and dark mode."
                .to_string(),
            image: ImageRef::Remote(
                "https://images.unsplash.com/photo-1484480974693-6ca0a78fb36b?q=80&w=1000&auto=format&fit=crop"
                    .to_string(),
            ),
        },
        Project {
            id: "3".to_string(),
            title: "AI Image Analyzer".to_string(),
            description: "An experimental tool that uses computer vision to generate descriptive \
                          text for uploaded images. This project showcases my ability to \
                          integrate complex APIs into simple interfaces."
                .to_string(),
            image: ImageRef::Remote(
                "https://images.unsplash.com/photo-1620712943543-bcc4688e7485?q=80&w=1000&auto=format&fit=crop"
                    .to_string(),
            ),
        },
    ]
}
