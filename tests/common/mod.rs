//! Shared test fixtures: an in-memory word-level tokenizer and a
//! programmable stub model. No network, no weights.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use candle_core::Device;
use tokenizers::models::wordlevel::WordLevel;
use tokenizers::pre_tokenizers::whitespace::Whitespace;
use tokenizers::{AddedToken, Tokenizer};

use code_reasoner::error::{ReasonerError, Result};
use code_reasoner::models::{MaskedLm, VocabDistribution};
use code_reasoner::reasoner::{CodeReasoner, CodeReasonerBuilder};

/// Fixed vocabulary; a word's id is its index here.
pub const VOCAB: &[&str] = &[
    "[UNK]", "[MASK]", "def", "add", "sub", "(", ")", "x", "y", ",", ":", "return", "+", "-",
    "let", "=", ";", "for", "in", "import", "os", "sys",
];

pub fn token_id(word: &str) -> u32 {
    VOCAB
        .iter()
        .position(|w| *w == word)
        .unwrap_or_else(|| panic!("'{word}' is not in the test vocabulary")) as u32
}

/// Word-level tokenizer over [`VOCAB`]; whitespace-separated input
/// round-trips through it.
pub fn test_tokenizer() -> Tokenizer {
    let vocab: HashMap<String, u32> = VOCAB
        .iter()
        .enumerate()
        .map(|(id, word)| (word.to_string(), id as u32))
        .collect();
    let model = WordLevel::builder()
        .vocab(vocab.into_iter().collect())
        .unk_token("[UNK]".to_string())
        .build()
        .unwrap();
    let mut tokenizer = Tokenizer::new(model);
    tokenizer.with_pre_tokenizer(Some(Whitespace {}));
    tokenizer.add_special_tokens(&[
        AddedToken::from("[MASK]", true),
        AddedToken::from("[UNK]", true),
    ]);
    tokenizer
}

/// Probability vector over [`VOCAB`] with the given entries set, zero
/// elsewhere.
pub fn distribution(entries: &[(&str, f32)]) -> Vec<f32> {
    let mut probs = vec![0.0; VOCAB.len()];
    for (word, p) in entries {
        probs[token_id(word) as usize] = *p;
    }
    probs
}

/// What the stub model does on each `infer` call.
#[derive(Debug, Clone)]
pub enum StubBehavior {
    /// Same distribution at every requested position.
    Uniform(Vec<f32>),
    /// Distribution chosen by position, with a fallback.
    PerPosition(HashMap<usize, Vec<f32>>, Vec<f32>),
    /// Fail every call.
    Unavailable,
    /// Succeed for the first `calls` calls, then fail.
    FailAfter(usize, Vec<f32>),
    /// Sleep before answering; pair with a short engine deadline.
    Slow(Duration, Vec<f32>),
}

#[derive(Debug, Clone)]
pub struct StubOptions {
    pub behavior: StubBehavior,
}

pub struct StubMaskedLm {
    options: StubOptions,
    calls: AtomicUsize,
    device: Device,
}

impl MaskedLm for StubMaskedLm {
    type Options = StubOptions;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        Ok(Self {
            options,
            calls: AtomicUsize::new(0),
            device,
        })
    }

    fn get_tokenizer(_options: Self::Options) -> Result<Tokenizer> {
        Ok(test_tokenizer())
    }

    fn infer(&self, _token_ids: &[u32], mask_positions: &[usize]) -> Result<Vec<VocabDistribution>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = |probs: &Vec<f32>| -> Result<Vec<VocabDistribution>> {
            Ok(mask_positions
                .iter()
                .map(|_| VocabDistribution::new(probs.clone()))
                .collect())
        };
        match &self.options.behavior {
            StubBehavior::Uniform(probs) => answer(probs),
            StubBehavior::PerPosition(by_position, fallback) => Ok(mask_positions
                .iter()
                .map(|position| {
                    VocabDistribution::new(
                        by_position.get(position).unwrap_or(fallback).clone(),
                    )
                })
                .collect()),
            StubBehavior::Unavailable => Err(ReasonerError::InferenceUnavailable(
                "stub model offline".to_string(),
            )),
            StubBehavior::FailAfter(calls, probs) => {
                if call >= *calls {
                    Err(ReasonerError::InferenceUnavailable(
                        "stub model went offline mid-run".to_string(),
                    ))
                } else {
                    answer(probs)
                }
            }
            StubBehavior::Slow(delay, probs) => {
                std::thread::sleep(*delay);
                answer(probs)
            }
        }
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

/// An engine over the stub model with a short deadline.
pub fn reasoner(behavior: StubBehavior) -> CodeReasoner<StubMaskedLm> {
    CodeReasonerBuilder::<StubMaskedLm>::new(StubOptions { behavior })
        .deadline(Duration::from_millis(250))
        .build()
        .unwrap()
}

/// Same, with an explicit deadline.
pub fn reasoner_with_deadline(
    behavior: StubBehavior,
    deadline: Duration,
) -> CodeReasoner<StubMaskedLm> {
    CodeReasonerBuilder::<StubMaskedLm>::new(StubOptions { behavior })
        .deadline(deadline)
        .build()
        .unwrap()
}
