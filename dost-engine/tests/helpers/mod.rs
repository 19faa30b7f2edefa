//! Shared fixtures for dost-engine integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use dost_common::CurriculumTree;
use dost_engine::validation::{PortionValidator, ValidationRequest, ValidatorError, ValidatorVerdict};
use dost_engine::{Pipeline, PipelineConfig};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Curriculum snapshot shipped with the repository
pub fn fixture_tree() -> Arc<CurriculumTree> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../data/curriculum.json");
    Arc::new(CurriculumTree::load(&path).expect("fixture snapshot loads"))
}

/// Pipeline over the fixture tree with a given validator
pub fn pipeline_with(validator: Arc<dyn PortionValidator>, config: PipelineConfig) -> Pipeline {
    Pipeline::new(fixture_tree(), validator, config)
}

pub fn config_with_student(student_id: &str) -> PipelineConfig {
    PipelineConfig {
        student_id: Some(student_id.to_string()),
        ..PipelineConfig::default()
    }
}

/// Replies from a queue (accepting once it runs dry) and records every call
#[derive(Default)]
pub struct ScriptedValidator {
    replies: Mutex<VecDeque<Result<ValidatorVerdict, ValidatorError>>>,
    pub calls: Mutex<Vec<ValidationRequest>>,
}

impl ScriptedValidator {
    pub fn new(replies: Vec<Result<ValidatorVerdict, ValidatorError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PortionValidator for ScriptedValidator {
    async fn validate(&self, request: &ValidationRequest) -> Result<ValidatorVerdict, ValidatorError> {
        self.calls.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ValidatorVerdict::accept()))
    }
}
