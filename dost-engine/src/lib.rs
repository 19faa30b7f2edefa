//! # DOST payload engine
//!
//! Turns loosely-structured task requests (free-text chapter, concept and
//! subconcept hints plus partial parameters) into creation payloads for the
//! learning-resource API.
//!
//! Stages, in order:
//! - [`resolver`]: fuzzy-match hints onto exact curriculum tree names
//! - [`validation`]: external accept/correct round with bounded retries
//! - [`aggregation`]: complete typed parameters, merge compatible requests
//! - [`builders`]: one payload shape per task type
//! - [`dispatch`]: optional hand-off to the resource API
//!
//! [`pipeline::Pipeline`] runs the whole batch and reports per-request
//! diagnostics.

pub mod aggregation;
pub mod builders;
pub mod dispatch;
pub mod error;
pub mod params;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod types;
pub mod validation;

pub use crate::error::{EngineError, EngineResult};
pub use aggregation::{MergePolicy, TaskAggregator};
pub use builders::{BuildOutput, Payload, PayloadSynthesizer};
pub use pipeline::{Pipeline, PipelineConfig, PipelineReport};
pub use resolver::TaxonomyResolver;
pub use types::{CombinedTask, RawTaskRequest, ResolvedGroup, TaskHints};
pub use validation::{AcceptAllValidator, PortionValidator, ValidationRetryCoordinator};
