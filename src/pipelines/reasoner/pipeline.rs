use std::sync::Arc;
use std::time::Duration;

use tokenizers::Tokenizer;
use tokio::sync::Semaphore;

use super::predictor;
use crate::bridge::{MaskedSequence, TokenBridge};
use crate::error::{ReasonerError, Result};
use crate::models::{validate_distributions, MaskedLm, VocabDistribution};
use crate::pipelines::stats::{ReasonerStats, ReasonerStatsBuilder};

// ============ Output types ============

/// A predicted token with confidence score.
#[derive(Debug, Clone)]
pub struct Prediction {
    /// Predicted token surface form.
    pub token: String,
    /// Vocabulary id of the token.
    pub id: u32,
    /// Model-assigned probability at the masked position.
    pub score: f32,
}

/// Ranked candidates for one masked position.
#[derive(Debug)]
pub struct MaskGuess {
    /// The masked position these candidates belong to.
    pub position: usize,
    /// Candidates, descending by score, no duplicate tokens.
    pub candidates: Vec<Prediction>,
}

/// Output of [`CodeReasoner::guess`]: one entry per masked position.
#[derive(Debug)]
pub struct GuessOutput {
    /// Ranked candidates per masked position, in position order.
    pub masks: Vec<MaskGuess>,
    /// Execution statistics.
    pub stats: ReasonerStats,
}

// ============ Engine ============

/// The masked-token reasoning engine.
///
/// Holds a shared read-only model handle; every operation is a synchronous
/// call-and-response unit of work with no state surviving the call, so one
/// engine may serve concurrent callers. Construct with
/// [`CodeReasonerBuilder`](super::CodeReasonerBuilder).
pub struct CodeReasoner<M: MaskedLm> {
    pub(crate) model: Arc<M>,
    pub(crate) bridge: TokenBridge,
    pub(crate) deadline: Duration,
    pub(crate) gate: Option<Arc<Semaphore>>,
}

impl<M: MaskedLm> CodeReasoner<M> {
    pub(crate) fn assemble(
        model: M,
        tokenizer: Tokenizer,
        deadline: Duration,
        max_input_tokens: usize,
        max_in_flight: Option<usize>,
    ) -> Result<Self> {
        let bridge = TokenBridge::new(tokenizer, max_input_tokens)?;
        Ok(Self {
            model: Arc::new(model),
            bridge,
            deadline,
            gate: max_in_flight.map(|permits| Arc::new(Semaphore::new(permits))),
        })
    }

    /// The token bridge this engine encodes and decodes with.
    pub fn bridge(&self) -> &TokenBridge {
        &self.bridge
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }

    /// Guess candidates for every masked position in `text`.
    ///
    /// Returns up to `top_k` candidates per position, descending by score,
    /// duplicates removed.
    ///
    /// # Errors
    ///
    /// [`ReasonerError::MalformedInput`] when `text` has no mask marker or
    /// `top_k` is zero; [`ReasonerError::InferenceUnavailable`] when the
    /// model fails or the deadline expires.
    pub async fn guess(&self, text: &str, top_k: usize) -> Result<GuessOutput> {
        let sequence = self.bridge.encode(text)?;
        self.guess_sequence(&sequence, top_k).await
    }

    /// [`guess`](Self::guess) over an already-encoded sequence.
    pub async fn guess_sequence(
        &self,
        sequence: &MaskedSequence,
        top_k: usize,
    ) -> Result<GuessOutput> {
        predictor::validate_top_k(top_k)?;
        require_masks(sequence)?;

        let mut stats = ReasonerStats::start();
        let distributions = self
            .infer_guarded(
                sequence.ids().to_vec(),
                sequence.mask_positions().to_vec(),
                &mut stats,
            )
            .await?;

        let masks = sequence
            .mask_positions()
            .iter()
            .zip(&distributions)
            .map(|(&position, distribution)| {
                let candidates =
                    predictor::rank_candidates(distribution, &self.bridge, top_k);
                if candidates.is_empty() {
                    return Err(ReasonerError::Unexpected(format!(
                        "model returned no usable candidates for position {position}"
                    )));
                }
                Ok(MaskGuess {
                    position,
                    candidates,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(GuessOutput {
            masks,
            stats: stats.finish(),
        })
    }

    /// Ranked candidates for a single masked `position` of `sequence`.
    ///
    /// # Errors
    ///
    /// [`ReasonerError::MalformedInput`] when `position` is not one of the
    /// sequence's masked positions or `top_k` is zero.
    pub async fn predict_at(
        &self,
        sequence: &MaskedSequence,
        position: usize,
        top_k: usize,
    ) -> Result<Vec<Prediction>> {
        predictor::validate_top_k(top_k)?;
        predictor::validate_position(sequence, position)?;

        let mut stats = ReasonerStats::start();
        let mut distributions = self
            .infer_guarded(sequence.ids().to_vec(), vec![position], &mut stats)
            .await?;
        Ok(predictor::rank_candidates(
            &distributions.remove(0),
            &self.bridge,
            top_k,
        ))
    }

    /// Run one model call under the configured deadline.
    ///
    /// The blocking inference is dispatched to a worker thread; on deadline
    /// expiry the result is discarded and the call reports
    /// `InferenceUnavailable`. The computation itself is not interrupted.
    pub(crate) async fn infer_guarded(
        &self,
        token_ids: Vec<u32>,
        mask_positions: Vec<usize>,
        stats: &mut ReasonerStatsBuilder,
    ) -> Result<Vec<VocabDistribution>> {
        let _permit = match &self.gate {
            Some(gate) => Some(Arc::clone(gate).acquire_owned().await.map_err(|_| {
                ReasonerError::Unexpected("inference gate closed".to_string())
            })?),
            None => None,
        };

        stats.record_call();
        let requested = mask_positions.len();
        let model = Arc::clone(&self.model);
        let task = tokio::task::spawn_blocking(move || model.infer(&token_ids, &mask_positions));

        let joined = tokio::time::timeout(self.deadline, task).await.map_err(|_| {
            ReasonerError::InferenceUnavailable(format!(
                "model call exceeded the {:?} deadline",
                self.deadline
            ))
        })?;
        let distributions = joined.map_err(|e| {
            ReasonerError::InferenceUnavailable(format!("model task aborted: {e}"))
        })??;

        validate_distributions(&distributions, requested)?;
        Ok(distributions)
    }
}

pub(crate) fn require_masks(sequence: &MaskedSequence) -> Result<()> {
    if sequence.mask_positions().is_empty() {
        return Err(ReasonerError::MalformedInput(
            "no mask marker found; mark the span to predict with [MASK]".to_string(),
        ));
    }
    Ok(())
}
