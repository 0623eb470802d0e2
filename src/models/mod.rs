//! The model capability boundary.
//!
//! The engine talks to masked language models exclusively through
//! [`MaskedLm`]: token context in, per-position vocabulary distributions
//! out. Any conforming provider can sit behind it; [`modernbert`] is the
//! bundled local provider.

use crate::error::{ReasonerError, Result};
use tokenizers::Tokenizer;

pub mod modernbert;

pub use modernbert::{ModernBertMaskedLm, ModernBertSize};

/// A probability distribution over the model's vocabulary for one masked
/// position. The index into the distribution is the vocabulary id.
#[derive(Debug, Clone)]
pub struct VocabDistribution {
    probs: Vec<f32>,
}

impl VocabDistribution {
    /// Wrap a probability vector indexed by vocabulary id.
    pub fn new(probs: Vec<f32>) -> Self {
        Self { probs }
    }

    /// Probability of `id`, or `None` when the id falls outside the
    /// distribution's vocabulary.
    pub fn probability(&self, id: u32) -> Option<f32> {
        self.probs.get(id as usize).copied()
    }

    /// Vocabulary width of this distribution.
    pub fn len(&self) -> usize {
        self.probs.len()
    }

    /// Whether the distribution is empty.
    pub fn is_empty(&self) -> bool {
        self.probs.is_empty()
    }

    /// The raw probability vector.
    pub fn probabilities(&self) -> &[f32] {
        &self.probs
    }
}

/// A masked language model capability.
///
/// `infer` is the whole contract at inference time: given the full token
/// context and the positions to predict, return one vocabulary distribution
/// per requested position, in request order. Implementations must be safe
/// to share across concurrent callers; inference is read-only.
pub trait MaskedLm: Send + Sync + 'static {
    /// Provider-specific construction options (model size, paths, ...).
    type Options: std::fmt::Debug + Clone;

    /// Load the model onto `device`.
    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// The tokenizer matching this model's vocabulary.
    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    /// Vocabulary distributions for each of `mask_positions`, given the
    /// full context `token_ids`.
    fn infer(&self, token_ids: &[u32], mask_positions: &[usize]) -> Result<Vec<VocabDistribution>>;

    /// The device the model runs on.
    fn device(&self) -> &candle_core::Device;
}

/// Check a provider's response against the request that produced it.
///
/// A wrong arity or an empty distribution is a malformed response and is
/// reported as the model being unavailable, same as a timeout.
pub(crate) fn validate_distributions(
    distributions: &[VocabDistribution],
    requested: usize,
) -> Result<()> {
    if distributions.len() != requested {
        return Err(ReasonerError::InferenceUnavailable(format!(
            "model returned {} distributions for {} masked positions",
            distributions.len(),
            requested
        )));
    }
    if distributions.iter().any(VocabDistribution::is_empty) {
        return Err(ReasonerError::InferenceUnavailable(
            "model returned an empty vocabulary distribution".to_string(),
        ));
    }
    Ok(())
}
