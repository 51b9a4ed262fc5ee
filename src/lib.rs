// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! NeonFolio: portfolio builder
//!
//! Edit a profile and a list of project cards, let a multimodal AI model
//! describe a project from its image, and export the result through a
//! print-ready page. All state is held in memory.

pub mod config;
pub mod error;
pub mod gemini;
pub mod generator;
pub mod ingest;
pub mod model;
pub mod seed;
pub mod session;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use error::{GenerationError, NeonfolioError, ReadError, Result, ValidationError};
