//! Core domain models
//!
//! This module defines the configured catalog, name resolution, the
//! authentication cache and the error taxonomy shared by every tool.

pub mod auth;
pub mod config;
pub mod error;
pub mod resolver;

pub use auth::{AuthCache, AuthStage, AuthStatus};
pub use config::{CatalogConfig, PipelineEntry, RepositoryEntry, Settings};
pub use error::{ErrorReport, ToolError};
pub use resolver::{resolve, CatalogEntry, MatchTier, Resolved};
