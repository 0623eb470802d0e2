use super::pipeline::CodeReasoner;
use super::predictor;
use crate::bridge::MaskedSequence;
use crate::error::{ReasonerError, Result};
use crate::models::{MaskedLm, VocabDistribution};
use crate::pipelines::stats::ReasonerStats;

// ============ Output types ============

/// A candidate replacement with its combined score and rank.
#[derive(Debug, Clone)]
pub struct ScoredOption {
    /// The option text as supplied by the caller.
    pub option: String,
    /// Sum of natural-log probabilities over the option's tokens. A
    /// single-token option scores the log of its direct probability.
    pub score: f32,
    /// 1-based rank after sorting, descending by score.
    pub rank: usize,
}

/// Output of [`CodeReasoner::score`].
#[derive(Debug)]
pub struct ScoreOutput {
    /// Options ranked descending by score; ties preserve input order.
    pub options: Vec<ScoredOption>,
    /// The masked position the options were scored against.
    pub position: usize,
    /// Execution statistics.
    pub stats: ReasonerStats,
}

// ============ Option scoring ============

impl<M: MaskedLm> CodeReasoner<M> {
    /// Score `options` as replacements for the first masked position in
    /// `text`.
    ///
    /// # Errors
    ///
    /// [`ReasonerError::InvalidOptions`] when `options` is empty;
    /// [`ReasonerError::MalformedInput`] when `text` has no mask marker.
    pub async fn score(&self, text: &str, options: &[String]) -> Result<ScoreOutput> {
        let sequence = self.bridge().encode(text)?;
        let position = sequence.first_mask().ok_or_else(|| {
            ReasonerError::MalformedInput(
                "no mask marker found; mark the span to score with [MASK]".to_string(),
            )
        })?;
        self.score_sequence(&sequence, position, options).await
    }

    /// Score `options` as replacements for the masked `position` of
    /// `sequence`.
    ///
    /// A single-token option is scored from the vocabulary distribution at
    /// `position`. A multi-token option is spliced in place of the mask and
    /// each of its tokens is masked in turn (the others held fixed), the
    /// combined score being the sum of log-probabilities. An option the
    /// tokenizer cannot map to any token scores negative infinity rather
    /// than being rejected.
    pub async fn score_sequence(
        &self,
        sequence: &MaskedSequence,
        position: usize,
        options: &[String],
    ) -> Result<ScoreOutput> {
        if options.is_empty() {
            return Err(ReasonerError::InvalidOptions(
                "at least one candidate option is required".to_string(),
            ));
        }
        predictor::validate_position(sequence, position)?;

        let mut stats = ReasonerStats::start();
        let tokenized: Vec<Vec<u32>> = options
            .iter()
            .map(|option| self.bridge().encode_fragment(option))
            .collect::<Result<_>>()?;

        // One distribution at the mask serves every single-token option.
        let base = if tokenized.iter().any(|ids| ids.len() == 1) {
            let mut distributions = self
                .infer_guarded(sequence.ids().to_vec(), vec![position], &mut stats)
                .await?;
            Some(distributions.remove(0))
        } else {
            None
        };

        let mut scored = Vec::with_capacity(options.len());
        for (option, option_ids) in options.iter().zip(&tokenized) {
            let score = match option_ids.as_slice() {
                [] => f32::NEG_INFINITY,
                [id] => {
                    let distribution = base.as_ref().ok_or_else(|| {
                        ReasonerError::Unexpected(
                            "missing base distribution for single-token option".to_string(),
                        )
                    })?;
                    log_probability(distribution, *id)
                }
                _ => {
                    self.pseudo_log_likelihood(sequence, position, option_ids, &mut stats)
                        .await?
                }
            };
            tracing::trace!(option = %option, score, "scored option");
            scored.push(ScoredOption {
                option: option.clone(),
                score,
                rank: 0,
            });
        }

        // Stable sort keeps equal scores in caller-supplied order.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        for (index, option) in scored.iter_mut().enumerate() {
            option.rank = index + 1;
        }

        Ok(ScoreOutput {
            options: scored,
            position,
            stats: stats.finish(),
        })
    }

    /// Joint likelihood approximation for a multi-token option: mask each
    /// constituent token in turn, holding the others fixed to the option's
    /// own tokens, and sum the log-probabilities.
    async fn pseudo_log_likelihood(
        &self,
        sequence: &MaskedSequence,
        position: usize,
        option_ids: &[u32],
        stats: &mut crate::pipelines::stats::ReasonerStatsBuilder,
    ) -> Result<f32> {
        let ids = sequence.ids();
        let mut spliced = Vec::with_capacity(ids.len() + option_ids.len() - 1);
        spliced.extend_from_slice(&ids[..position]);
        spliced.extend_from_slice(option_ids);
        spliced.extend_from_slice(&ids[position + 1..]);

        let mut total = 0.0f32;
        for (offset, &token_id) in option_ids.iter().enumerate() {
            let mut masked = spliced.clone();
            masked[position + offset] = self.bridge().mask_id();
            let mut distributions = self
                .infer_guarded(masked, vec![position + offset], stats)
                .await?;
            total += log_probability(&distributions.remove(0), token_id);
        }
        Ok(total)
    }
}

fn log_probability(distribution: &VocabDistribution, id: u32) -> f32 {
    match distribution.probability(id) {
        Some(p) if p > 0.0 => p.ln(),
        _ => f32::NEG_INFINITY,
    }
}
