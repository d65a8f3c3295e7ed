//! Block scorer: mean sentence confidence per text block.

use std::sync::Arc;

use stepscout_core::error::ModelError;
use stepscout_core::{BlockScore, TextBlock};
use stepscout_model::InferenceEngine;
use tracing::{debug, info};

use crate::page::PageDocument;
use crate::sentences::split_sentences;

pub struct BlockScorer {
    engine: Arc<InferenceEngine>,
}

impl BlockScorer {
    pub fn new(engine: Arc<InferenceEngine>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &Arc<InferenceEngine> {
        &self.engine
    }

    /// Mean classifier confidence over the sentences of `text`.
    ///
    /// Sentences whose forward pass fails are left out of the mean. Text
    /// with no sentences, or whose every sentence failed, scores 0. A model
    /// that cannot be loaded is an error.
    pub async fn score_text(&self, text: &str) -> Result<f64, ModelError> {
        let model = self.engine.ready().await?;

        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Ok(0.0);
        }

        let mut total = 0.0;
        let mut scored = 0usize;
        for sentence in &sentences {
            let input = model.tokenize(sentence);
            match model.classify(&input).await {
                Ok(confidence) => {
                    total += confidence;
                    scored += 1;
                }
                Err(ModelError::Inference(reason)) => {
                    debug!(%reason, sentence, "Sentence inference failed, skipping");
                }
                Err(e) => return Err(e),
            }
        }

        if scored == 0 {
            return Ok(0.0);
        }
        Ok(total / scored as f64)
    }

    pub async fn score_block(&self, block: TextBlock) -> Result<BlockScore, ModelError> {
        let confidence = self.score_text(&block.text).await?;
        Ok(BlockScore::new(block, confidence))
    }

    /// Score every candidate block of `page`, in document order.
    pub async fn score_page(&self, page: &PageDocument) -> Result<Vec<BlockScore>, ModelError> {
        let blocks = page.candidate_blocks();
        let mut scores = Vec::with_capacity(blocks.len());
        for block in blocks {
            scores.push(self.score_block(block).await?);
        }
        info!(
            url = %page.url(),
            blocks = scores.len(),
            matched = scores.iter().filter(|s| s.is_match()).count(),
            "Scored page blocks"
        );
        Ok(scores)
    }
}
