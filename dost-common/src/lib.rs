//! # DOST Common Library
//!
//! Shared code for the DOST payload engine including:
//! - The curriculum tree (stream → subject → chapter → concept → subconcepts)
//! - Task type catalogue
//! - Per-type parameter specification table
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod curriculum;
pub mod error;
pub mod params;
pub mod task_type;

pub use curriculum::CurriculumTree;
pub use error::{Error, Result};
pub use params::{ParamSpec, ParamSpecTable};
pub use task_type::{TaskFamily, TaskType};
