// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! HTML page rendering

use minijinja::{context, Environment};

use crate::model::{Profile, Project};
use crate::session::{GenerationState, Portfolio, ProjectDraft};
use crate::Result;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("templates/base.html")),
    ("macros.html", include_str!("templates/macros.html")),
    ("index.html", include_str!("templates/index.html")),
    ("profile_edit.html", include_str!("templates/profile_edit.html")),
    ("project_new.html", include_str!("templates/project_new.html")),
    ("confirm_delete.html", include_str!("templates/confirm_delete.html")),
    ("print.html", include_str!("templates/print.html")),
];

/// Compiled page templates
pub struct Pages {
    env: Environment<'static>,
    fallback_url: String,
}

impl Pages {
    /// `fallback_url` replaces images that fail to load in the browser
    pub fn new(fallback_url: impl Into<String>) -> Result<Self> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self {
            env,
            fallback_url: fallback_url.into(),
        })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }

    pub fn index(&self, portfolio: &Portfolio) -> Result<String> {
        self.render("index.html", context! {
            profile => &portfolio.profile,
            projects => &portfolio.projects,
            fallback_url => &self.fallback_url,
        })
    }

    pub fn profile_edit(&self, scratch: &Profile, error: Option<&str>) -> Result<String> {
        self.render("profile_edit.html", context! {
            scratch => scratch,
            error => error,
            fallback_url => &self.fallback_url,
        })
    }

    pub fn project_new(&self, draft: &ProjectDraft) -> Result<String> {
        self.render("project_new.html", context! {
            draft => draft,
            generating => draft.generation == GenerationState::Generating,
            fallback_url => &self.fallback_url,
        })
    }

    pub fn confirm_delete(&self, project: &Project) -> Result<String> {
        self.render("confirm_delete.html", context! { project => project })
    }

    /// Print-optimized portfolio; the export surface
    pub fn print(&self, portfolio: &Portfolio, autoprint: bool) -> Result<String> {
        self.render("print.html", context! {
            profile => &portfolio.profile,
            projects => &portfolio.projects,
            fallback_url => &self.fallback_url,
            exported_at => chrono::Local::now().format("%Y-%m-%d").to_string(),
            autoprint => autoprint,
        })
    }
}
