use std::sync::Arc;

use gastrogenie::RecipePipeline;

/// Shared, read-only request state: the assembled pipeline.
#[derive(Clone)]
pub struct HandlerState {
    pub pipeline: Arc<RecipePipeline>,
}

impl HandlerState {
    pub fn new(pipeline: Arc<RecipePipeline>) -> Self {
        Self { pipeline }
    }
}
