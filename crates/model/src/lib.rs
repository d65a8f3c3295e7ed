//! Local classifier for StepScout.
//!
//! - [`Vocabulary`] maps lowercase words to ids, with a reserved `<OOV>` id
//! - [`tokenize`] turns text into a fixed-length [`TokenSequence`]
//! - [`InferenceEngine`] loads the model and vocabulary once, lazily, and
//!   runs forward passes one at a time
//!
//! The ONNX backend (Candle) is behind the `onnx` feature.
//!
//! [`TokenSequence`]: stepscout_core::TokenSequence

pub mod engine;
pub mod loader;
#[cfg(feature = "onnx")]
pub mod onnx;
pub mod tokenizer;
pub mod vocab;

pub use engine::{InferenceEngine, LoadedModel};
pub use loader::{FileModelLoader, ModelLoader};
#[cfg(feature = "onnx")]
pub use onnx::OnnxModel;
pub use tokenizer::tokenize;
pub use vocab::Vocabulary;
