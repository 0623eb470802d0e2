mod common;

use code_reasoner::error::ReasonerError;
use common::{distribution, reasoner, StubBehavior};

fn options(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

#[tokio::test]
async fn higher_probability_option_ranks_first() {
    let engine = reasoner(StubBehavior::Uniform(distribution(&[
        ("add", 0.6),
        ("sub", 0.2),
    ])));

    let output = engine
        .score("def [MASK] ( x , y )", &options(&["sub", "add"]))
        .await
        .unwrap();

    assert_eq!(output.options[0].option, "add");
    assert_eq!(output.options[0].rank, 1);
    assert_eq!(output.options[1].option, "sub");
    assert_eq!(output.options[1].rank, 2);
    assert!(output.options[0].score > output.options[1].score);
    // Both options are single tokens: one shared model call.
    assert_eq!(output.stats.model_calls, 1);
}

#[tokio::test]
async fn per_token_dominance_ranks_multi_token_option_above() {
    // Each of A's tokens outscores the matching token of B.
    let engine = reasoner(StubBehavior::Uniform(distribution(&[
        ("x", 0.5),
        ("y", 0.4),
        ("def", 0.01),
        (":", 0.01),
    ])));

    let output = engine
        .score("return [MASK]", &options(&["def :", "x y"]))
        .await
        .unwrap();

    assert_eq!(output.options[0].option, "x y");
    assert_eq!(output.options[1].option, "def :");
    // Two constituent tokens per option, one pseudo-masked call each.
    assert_eq!(output.stats.model_calls, 4);
}

#[tokio::test]
async fn equal_scores_preserve_input_order() {
    let engine = reasoner(StubBehavior::Uniform(distribution(&[
        ("x", 0.3),
        ("y", 0.3),
    ])));

    let forward = engine
        .score("let [MASK] = x ;", &options(&["x", "y"]))
        .await
        .unwrap();
    let reversed = engine
        .score("let [MASK] = x ;", &options(&["y", "x"]))
        .await
        .unwrap();

    assert_eq!(forward.options[0].option, "x");
    assert_eq!(reversed.options[0].option, "y");
}

#[tokio::test]
async fn out_of_vocabulary_options_still_score() {
    let engine = reasoner(StubBehavior::Uniform(distribution(&[("add", 0.9)])));

    let output = engine
        .score("def [MASK] ( x )", &options(&["add", "reallyunknownword"]))
        .await
        .unwrap();

    assert_eq!(output.options.len(), 2);
    assert_eq!(output.options[0].option, "add");
    let unknown = &output.options[1];
    assert_eq!(unknown.option, "reallyunknownword");
    assert_eq!(unknown.rank, 2);
    assert!(unknown.score == f32::NEG_INFINITY || unknown.score < output.options[0].score);
}

#[tokio::test]
async fn empty_option_set_is_invalid() {
    let engine = reasoner(StubBehavior::Uniform(distribution(&[("add", 1.0)])));

    let err = engine.score("def [MASK] ( x )", &[]).await.unwrap_err();

    assert!(matches!(err, ReasonerError::InvalidOptions(_)));
}

#[tokio::test]
async fn score_without_marker_is_malformed() {
    let engine = reasoner(StubBehavior::Uniform(distribution(&[("add", 1.0)])));

    let err = engine
        .score("def add ( x )", &options(&["add"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ReasonerError::MalformedInput(_)));
}

#[tokio::test]
async fn score_sequence_rejects_unmasked_position() {
    let engine = reasoner(StubBehavior::Uniform(distribution(&[("add", 1.0)])));
    let sequence = engine.bridge().encode("def [MASK] ( x )").unwrap();

    let err = engine
        .score_sequence(&sequence, 0, &options(&["add"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ReasonerError::MalformedInput(_)));
}

#[tokio::test]
async fn model_failure_surfaces_as_unavailable() {
    let engine = reasoner(StubBehavior::Unavailable);

    let err = engine
        .score("def [MASK] ( x )", &options(&["add"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ReasonerError::InferenceUnavailable(_)));
}
