//! Token bridge between marker-bearing text and model token sequences.
//!
//! The bridge is the only place that touches the tokenizer. It normalizes
//! mask markers, encodes text into a [`MaskedSequence`], and reconstitutes
//! human-readable text with resolved tokens substituted for the markers.
//!
//! ```rust,no_run
//! # use code_reasoner::bridge::TokenBridge;
//! # fn demo(bridge: &TokenBridge) -> code_reasoner::error::Result<()> {
//! let seq = bridge.encode("let x = [MASK] ;")?;
//! assert_eq!(seq.mask_positions().len(), 1);
//! assert_eq!(bridge.decode(&seq)?, "let x = [MASK] ;");
//! # Ok(())
//! # }
//! ```

use crate::error::{ReasonerError, Result};
use tokenizers::Tokenizer;

/// Marker spellings accepted in input text, normalized to the tokenizer's
/// own mask token before encoding.
const COMMON_MARKERS: [&str; 4] = ["[MASK]", "[mask]", "<MASK>", "<mask>"];

/// A tokenized snippet with its masked positions.
///
/// Positions index into the id vector (special tokens included) and are
/// stored in ascending order. A sequence with no masked positions is legal;
/// the prediction operations reject it, but round-tripping does not.
#[derive(Debug, Clone)]
pub struct MaskedSequence {
    text: String,
    ids: Vec<u32>,
    mask_positions: Vec<usize>,
}

impl MaskedSequence {
    /// The normalized source text, markers included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Token ids, including any special tokens the tokenizer adds.
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    /// Masked position indices, ascending.
    pub fn mask_positions(&self) -> &[usize] {
        &self.mask_positions
    }

    /// Whether `position` is one of the masked positions.
    pub fn is_masked(&self, position: usize) -> bool {
        self.mask_positions.binary_search(&position).is_ok()
    }

    /// The leftmost masked position, if any.
    pub fn first_mask(&self) -> Option<usize> {
        self.mask_positions.first().copied()
    }
}

/// Adapts marker-bearing text to token sequences and back.
///
/// Construction resolves the tokenizer's mask token once; encoding enforces
/// the configured maximum input length.
pub struct TokenBridge {
    tokenizer: Tokenizer,
    mask_token: String,
    mask_id: u32,
    max_tokens: usize,
}

impl TokenBridge {
    /// Wrap a tokenizer, capping encoded inputs at `max_tokens` ids.
    ///
    /// # Errors
    ///
    /// Fails if the tokenizer has no mask token in its vocabulary.
    pub fn new(tokenizer: Tokenizer, max_tokens: usize) -> Result<Self> {
        let (mask_token, mask_id) = COMMON_MARKERS
            .iter()
            .find_map(|marker| {
                tokenizer
                    .token_to_id(marker)
                    .map(|id| (marker.to_string(), id))
            })
            .ok_or_else(|| {
                ReasonerError::Unexpected(
                    "tokenizer vocabulary has no mask token; a masked LM tokenizer is required"
                        .to_string(),
                )
            })?;
        Ok(Self {
            tokenizer,
            mask_token,
            mask_id,
            max_tokens,
        })
    }

    /// The canonical mask marker string for this tokenizer.
    pub fn mask_token(&self) -> &str {
        &self.mask_token
    }

    /// The vocabulary id of the mask token.
    pub fn mask_id(&self) -> u32 {
        self.mask_id
    }

    /// Encode text into a [`MaskedSequence`], recognizing mask markers.
    ///
    /// # Errors
    ///
    /// Returns [`ReasonerError::MalformedInput`] if the tokenizer rejects
    /// the text or the encoded length exceeds the configured maximum.
    pub fn encode(&self, text: &str) -> Result<MaskedSequence> {
        let normalized = self.normalize_markers(text);
        let encoding = self
            .tokenizer
            .encode(normalized.as_str(), true)
            .map_err(|e| {
                let preview: String = text.chars().take(50).collect();
                ReasonerError::MalformedInput(format!("cannot tokenize '{preview}': {e}"))
            })?;
        let ids = encoding.get_ids().to_vec();
        if ids.len() > self.max_tokens {
            return Err(ReasonerError::MalformedInput(format!(
                "input is {} tokens, limit is {}",
                ids.len(),
                self.max_tokens
            )));
        }
        let mask_positions: Vec<usize> = ids
            .iter()
            .enumerate()
            .filter_map(|(i, &id)| (id == self.mask_id).then_some(i))
            .collect();
        Ok(MaskedSequence {
            text: normalized,
            ids,
            mask_positions,
        })
    }

    /// Encode a bare fragment (no special tokens), e.g. a candidate option.
    pub fn encode_fragment(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self.tokenizer.encode(text, false).map_err(|e| {
            let preview: String = text.chars().take(50).collect();
            ReasonerError::MalformedInput(format!("cannot tokenize option '{preview}': {e}"))
        })?;
        Ok(encoding.get_ids().to_vec())
    }

    /// Decode a single vocabulary id to its surface form.
    pub fn decode_token(&self, id: u32) -> String {
        self.tokenizer
            .decode(&[id], true)
            .unwrap_or_default()
            .trim()
            .to_string()
    }

    /// Reconstitute the sequence's text, markers left in place.
    ///
    /// The round trip `decode(encode(t)) == t` holds for any `t` without
    /// mask markers.
    pub fn decode(&self, sequence: &MaskedSequence) -> Result<String> {
        self.decode_with(sequence, |_| None)
    }

    /// Reconstitute text, substituting `resolve(position)` for each marker.
    ///
    /// Markers are paired with masked positions in order; positions the
    /// resolver returns `None` for keep their marker.
    pub fn decode_with(
        &self,
        sequence: &MaskedSequence,
        resolve: impl Fn(usize) -> Option<String>,
    ) -> Result<String> {
        let parts: Vec<&str> = sequence.text.split(self.mask_token.as_str()).collect();
        if parts.len() - 1 != sequence.mask_positions.len() {
            return Err(ReasonerError::Unexpected(format!(
                "{} markers in text but {} masked positions in sequence",
                parts.len() - 1,
                sequence.mask_positions.len()
            )));
        }
        let mut out = String::with_capacity(sequence.text.len());
        out.push_str(parts[0]);
        for (marker_index, part) in parts[1..].iter().enumerate() {
            let position = sequence.mask_positions[marker_index];
            match resolve(position) {
                Some(token) => out.push_str(&token),
                None => out.push_str(&self.mask_token),
            }
            out.push_str(part);
        }
        Ok(out)
    }

    fn normalize_markers(&self, text: &str) -> String {
        let mut result = text.to_string();
        for marker in COMMON_MARKERS {
            if marker != self.mask_token {
                result = result.replace(marker, &self.mask_token);
            }
        }
        result
    }
}
