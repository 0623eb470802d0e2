use std::collections::BTreeMap;

use super::pipeline::{require_masks, CodeReasoner, Prediction};
use super::predictor;
use crate::bridge::MaskedSequence;
use crate::error::{ReasonerError, Result};
use crate::models::MaskedLm;
use crate::pipelines::stats::ReasonerStats;

// ============ Output types ============

/// One committed resolution inside a [`FillPlan`].
#[derive(Debug, Clone)]
pub struct ResolvedMask {
    /// The masked position this token was committed to.
    pub position: usize,
    /// Surface form of the committed token.
    pub token: String,
    /// Vocabulary id of the committed token.
    pub id: u32,
    /// Confidence at commit time.
    pub score: f32,
    /// 1-based step at which the position was resolved.
    pub step: usize,
}

/// The complete mapping of masked positions to resolved tokens.
///
/// Built one position per step; a resolved position is never re-masked
/// within the same fill operation.
#[derive(Debug, Clone, Default)]
pub struct FillPlan {
    resolved: BTreeMap<usize, ResolvedMask>,
}

impl FillPlan {
    /// The resolution committed at `position`, if any.
    pub fn get(&self, position: usize) -> Option<&ResolvedMask> {
        self.resolved.get(&position)
    }

    /// Resolutions in ascending position order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedMask> {
        self.resolved.values()
    }

    /// Number of resolved positions.
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    /// Whether the plan is empty.
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }

    fn insert(&mut self, resolution: ResolvedMask) {
        self.resolved.insert(resolution.position, resolution);
    }
}

/// Output of [`CodeReasoner::fill`].
#[derive(Debug)]
pub struct FillOutput {
    /// The input text with every marker replaced by its resolved token.
    pub text: String,
    /// Per-position resolutions with commit order and confidence.
    pub plan: FillPlan,
    /// Execution statistics.
    pub stats: ReasonerStats,
}

// ============ Iterative fill ============

impl<M: MaskedLm> CodeReasoner<M> {
    /// Resolve every masked position in `text`, most confident first.
    ///
    /// Each step predicts for all still-masked positions against the
    /// partially-resolved sequence, commits the single highest-confidence
    /// (position, token) pair, and repeats; a sequence with N masks
    /// resolves in exactly N steps. Equal top scores commit the leftmost
    /// position. `top_k_per_step` bounds how many candidates are ranked
    /// per position when choosing the committed token.
    ///
    /// # Errors
    ///
    /// Any model failure aborts the whole fill; no partial plan is
    /// returned.
    pub async fn fill(&self, text: &str, top_k_per_step: usize) -> Result<FillOutput> {
        let sequence = self.bridge().encode(text)?;
        self.fill_sequence(&sequence, top_k_per_step).await
    }

    /// [`fill`](Self::fill) over an already-encoded sequence.
    pub async fn fill_sequence(
        &self,
        sequence: &MaskedSequence,
        top_k_per_step: usize,
    ) -> Result<FillOutput> {
        predictor::validate_top_k(top_k_per_step)?;
        require_masks(sequence)?;

        let mut stats = ReasonerStats::start();
        let mut ids = sequence.ids().to_vec();
        let mut remaining = sequence.mask_positions().to_vec();
        let mut plan = FillPlan::default();
        let mut step = 0;

        while !remaining.is_empty() {
            step += 1;
            let distributions = self
                .infer_guarded(ids.clone(), remaining.clone(), &mut stats)
                .await?;

            let mut top_candidates = Vec::with_capacity(remaining.len());
            for (&position, distribution) in remaining.iter().zip(&distributions) {
                let top = predictor::rank_candidates(distribution, self.bridge(), top_k_per_step)
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        ReasonerError::Unexpected(format!(
                            "model returned no usable candidates for position {position}"
                        ))
                    })?;
                top_candidates.push((position, top));
            }

            let (position, winner) = select_most_confident(top_candidates).ok_or_else(|| {
                ReasonerError::Unexpected("no candidates for any remaining position".to_string())
            })?;
            tracing::debug!(
                step,
                position,
                token = %winner.token,
                score = winner.score,
                "committed mask"
            );
            ids[position] = winner.id;
            plan.insert(ResolvedMask {
                position,
                token: winner.token,
                id: winner.id,
                score: winner.score,
                step,
            });
            remaining.retain(|&p| p != position);
        }

        let text = self
            .bridge()
            .decode_with(sequence, |position| {
                plan.get(position).map(|r| r.token.clone())
            })?;

        Ok(FillOutput {
            text,
            plan,
            stats: stats.finish(),
        })
    }
}

/// Pick the highest-confidence (position, candidate) pair.
///
/// Candidates arrive in ascending position order; the strict comparison
/// resolves equal scores to the leftmost position.
fn select_most_confident(candidates: Vec<(usize, Prediction)>) -> Option<(usize, Prediction)> {
    candidates
        .into_iter()
        .reduce(|best, next| if next.1.score > best.1.score { next } else { best })
}

#[cfg(test)]
mod tests {
    use super::{select_most_confident, Prediction};

    fn candidate(position: usize, score: f32) -> (usize, Prediction) {
        (
            position,
            Prediction {
                token: format!("t{position}"),
                id: position as u32,
                score,
            },
        )
    }

    #[test]
    fn picks_highest_score() {
        let (position, winner) =
            select_most_confident(vec![candidate(2, 0.1), candidate(5, 0.9), candidate(9, 0.4)])
                .unwrap();
        assert_eq!(position, 5);
        assert!((winner.score - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn equal_scores_resolve_leftmost() {
        let (position, _) =
            select_most_confident(vec![candidate(3, 0.5), candidate(7, 0.5), candidate(11, 0.5)])
                .unwrap();
        assert_eq!(position, 3);
    }
}
