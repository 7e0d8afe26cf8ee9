//! Hook for the renderable image each node carries.
//!
//! Bézier evaluation itself lives outside this crate; the network only
//! guarantees that a node's image is regenerated exactly once per public
//! call that changed the node's control points, and that a failed
//! regeneration aborts the whole call.

use thiserror::Error;

/// Failure reported by an [`Evaluator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EvaluationError(pub String);

impl EvaluationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Turns a control net into whatever the host renders or caches.
pub trait Evaluator<G> {
    type Image;

    fn evaluate(&self, net: &G) -> Result<Self::Image, EvaluationError>;
}

/// Evaluator that produces no image.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullEvaluator;

impl<G> Evaluator<G> for NullEvaluator {
    type Image = ();

    fn evaluate(&self, _net: &G) -> Result<(), EvaluationError> {
        Ok(())
    }
}
