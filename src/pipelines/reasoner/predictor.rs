use super::pipeline::Prediction;
use crate::bridge::{MaskedSequence, TokenBridge};
use crate::error::{ReasonerError, Result};
use crate::models::VocabDistribution;

/// Rank a vocabulary distribution into at most `top_k` candidates.
///
/// Ids are ordered by descending probability; the stable sort keeps equal
/// probabilities in vocabulary-id order. Entries that decode to an empty
/// string and repeats of an already-kept surface form are skipped, so the
/// returned tokens are unique.
pub(crate) fn rank_candidates(
    distribution: &VocabDistribution,
    bridge: &TokenBridge,
    top_k: usize,
) -> Vec<Prediction> {
    let probs = distribution.probabilities();
    let mut ids: Vec<usize> = (0..probs.len()).collect();
    ids.sort_by(|&i, &j| probs[j].total_cmp(&probs[i]));

    let mut candidates: Vec<Prediction> = Vec::with_capacity(top_k);
    for id in ids {
        if candidates.len() == top_k {
            break;
        }
        let token = bridge.decode_token(id as u32);
        if token.is_empty() || candidates.iter().any(|c| c.token == token) {
            continue;
        }
        candidates.push(Prediction {
            token,
            id: id as u32,
            score: probs[id],
        });
    }
    candidates
}

pub(crate) fn validate_top_k(top_k: usize) -> Result<()> {
    if top_k == 0 {
        return Err(ReasonerError::MalformedInput(
            "top_k must be at least 1".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_position(sequence: &MaskedSequence, position: usize) -> Result<()> {
    if !sequence.is_masked(position) {
        return Err(ReasonerError::MalformedInput(format!(
            "position {position} is not a masked position of the sequence"
        )));
    }
    Ok(())
}
