//! ONNX backend: evaluates the classifier graph with Candle on the CPU.
//!
//! The graph takes one `[1, 100]` f32 tensor named `input` and produces the
//! instructional-class probability as the first element of its first output.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use candle_core::{DType, Device, Tensor};
use candle_onnx::onnx::ModelProto;
use stepscout_core::error::ModelError;
use stepscout_core::{SentenceModel, TokenSequence};
use tracing::{debug, info};

/// Name of the graph input the classifier expects.
pub const INPUT_NAME: &str = "input";

/// A parsed ONNX graph ready for evaluation.
pub struct OnnxModel {
    proto: Arc<ModelProto>,
    output_name: String,
}

impl OnnxModel {
    /// Parse an ONNX file. Blocking; call from `spawn_blocking`.
    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let proto = candle_onnx::read_file(path).map_err(|e| {
            ModelError::LoadFailed(format!("Failed to parse ONNX model {}: {e}", path.display()))
        })?;

        let graph = proto
            .graph
            .as_ref()
            .ok_or_else(|| ModelError::LoadFailed("ONNX model has no graph".into()))?;
        let output_name = graph
            .output
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelError::LoadFailed("ONNX graph declares no outputs".into()))?;

        info!(
            path = %path.display(),
            nodes = graph.node.len(),
            output = %output_name,
            "ONNX graph parsed"
        );

        Ok(Self {
            proto: Arc::new(proto),
            output_name,
        })
    }

    fn evaluate(
        proto: &ModelProto,
        output_name: &str,
        ids: Vec<f32>,
    ) -> Result<Option<f32>, ModelError> {
        let len = ids.len();
        let input = Tensor::from_vec(ids, (1, len), &Device::Cpu).map_err(map_candle_err)?;

        let mut inputs = HashMap::new();
        inputs.insert(INPUT_NAME.to_string(), input);

        let mut outputs = candle_onnx::simple_eval(proto, inputs).map_err(map_candle_err)?;
        let Some(output) = outputs.remove(output_name) else {
            debug!(output = output_name, "Graph produced no output tensor");
            return Ok(None);
        };

        let values = output
            .flatten_all()
            .and_then(|t| t.to_dtype(DType::F32))
            .and_then(|t| t.to_vec1::<f32>())
            .map_err(map_candle_err)?;
        Ok(values.first().copied())
    }
}

fn map_candle_err(e: candle_core::Error) -> ModelError {
    ModelError::Inference(format!("Candle inference error: {e}"))
}

#[async_trait]
impl SentenceModel for OnnxModel {
    fn name(&self) -> &str {
        "onnx"
    }

    async fn forward(&self, input: &TokenSequence) -> Result<Option<f32>, ModelError> {
        let ids = input.as_f32();
        let proto = self.proto.clone();
        let output_name = self.output_name.clone();

        tokio::task::spawn_blocking(move || Self::evaluate(&proto, &output_name, ids))
            .await
            .map_err(|e| ModelError::Inference(format!("Inference task failed: {e}")))?
    }
}
