//! SentenceModel trait: one forward pass of the local classifier.
//!
//! Implementations wrap a fixed, pre-trained network. They receive a
//! tokenized sentence and return the raw instructional-class output; the
//! inference engine normalizes that value into a confidence.

use async_trait::async_trait;

use crate::error::ModelError;
use crate::token::TokenSequence;

#[async_trait]
pub trait SentenceModel: Send + Sync {
    /// A short name for logs (e.g. "onnx", "stub").
    fn name(&self) -> &str;

    /// Run the model on one sequence (batch size 1).
    ///
    /// Returns the first scalar of the first output tensor, or `None` when
    /// the output was empty.
    async fn forward(&self, input: &TokenSequence) -> Result<Option<f32>, ModelError>;
}
