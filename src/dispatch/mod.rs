//! The task dispatch contract.
//!
//! This is the one seam other subsystems use to reach the reasoner: a
//! serde request of shape `{task, text, top_k?, options?}` answered by a
//! `{status, data?, error?}` envelope. The envelope is stable regardless of
//! which model provider sits behind the engine, and task resolution is a
//! static match, not a dynamic registry.
//!
//! ```rust,no_run
//! use code_reasoner::dispatch::{TaskKind, TaskRequest};
//! # use code_reasoner::reasoner::{CodeReasonerBuilder, ModernBertSize};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> code_reasoner::error::Result<()> {
//! # let reasoner = CodeReasonerBuilder::modernbert(ModernBertSize::Base).build()?;
//! let request: TaskRequest =
//!     serde_json::from_str(r#"{"task": "guess", "text": "import [MASK]", "top_k": 3}"#)?;
//! let response = reasoner.dispatch(request).await;
//! println!("{}", serde_json::to_string_pretty(&response)?);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ReasonerError, Result};
use crate::models::MaskedLm;
use crate::reasoner::CodeReasoner;

/// Default candidate count for `guess` when the request omits `top_k`.
pub const DEFAULT_GUESS_TOP_K: usize = 5;
/// Default per-step candidate count for `fill` when the request omits `top_k`.
pub const DEFAULT_FILL_TOP_K: usize = 3;

// ============ Request ============

/// Which reasoning operation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// Guess candidates for each masked position.
    Guess,
    /// Iteratively resolve every masked position.
    Fill,
    /// Rank caller-supplied options for the first masked position.
    Score,
}

/// A reasoning request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    /// The operation to run.
    pub task: TaskKind,
    /// Text containing `[MASK]` markers.
    pub text: String,
    /// Candidate count; defaults per task when omitted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<usize>,
    /// Candidate replacements, required by `score`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

// ============ Response envelope ============

/// Outcome flag of a dispatched task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// The task completed and `data` is present.
    Ok,
    /// The task failed and `error` is present.
    Error,
}

/// Error payload of a failed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskError {
    /// Stable machine-readable kind, e.g. `inference_unavailable`.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

/// A single ranked candidate in a `guess` payload.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateData {
    /// Token surface form.
    pub token: String,
    /// Model-assigned probability.
    pub score: f32,
}

/// Candidates for one masked position in a `guess` payload.
#[derive(Debug, Clone, Serialize)]
pub struct GuessData {
    /// The masked position.
    pub position: usize,
    /// Candidates, descending by score.
    pub candidates: Vec<CandidateData>,
}

/// One committed resolution in a `fill` payload.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedData {
    /// The masked position.
    pub position: usize,
    /// The committed token.
    pub token: String,
    /// Confidence at commit time.
    pub score: f32,
    /// 1-based commit step.
    pub step: usize,
}

/// One ranked option in a `score` payload.
#[derive(Debug, Clone, Serialize)]
pub struct OptionData {
    /// The option text.
    pub option: String,
    /// Combined log-likelihood score.
    pub score: f32,
    /// 1-based rank.
    pub rank: usize,
}

/// Task-specific result payload.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TaskData {
    /// Payload of a `guess` task.
    Guess {
        /// The original masked input.
        input: String,
        /// Candidates per masked position.
        masks: Vec<GuessData>,
    },
    /// Payload of a `fill` task.
    Fill {
        /// The original masked input.
        input: String,
        /// The completed text.
        text: String,
        /// Commit order and confidence per position.
        plan: Vec<ResolvedData>,
    },
    /// Payload of a `score` task.
    Score {
        /// The original masked input.
        input: String,
        /// Options ranked descending by score.
        options: Vec<OptionData>,
    },
}

/// The response envelope every task returns.
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    /// Outcome flag.
    pub status: TaskStatus,
    /// Task-specific payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<TaskData>,
    /// Failure details, present on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
}

impl TaskResponse {
    fn ok(data: TaskData) -> Self {
        Self {
            status: TaskStatus::Ok,
            data: Some(data),
            error: None,
        }
    }

    fn from_error(error: &ReasonerError) -> Self {
        Self {
            status: TaskStatus::Error,
            data: None,
            error: Some(TaskError {
                kind: error.kind().to_string(),
                message: error.to_string(),
            }),
        }
    }
}

// ============ Dispatch ============

impl<M: MaskedLm> CodeReasoner<M> {
    /// Run a task and wrap the outcome in the response envelope.
    ///
    /// Never fails at the call boundary: every error of the taxonomy is
    /// carried inside the envelope's `error` field, and the engine neither
    /// substitutes a default guess nor retries.
    pub async fn dispatch(&self, request: TaskRequest) -> TaskResponse {
        match self.run_task(&request).await {
            Ok(data) => TaskResponse::ok(data),
            Err(error) => {
                tracing::debug!(kind = error.kind(), %error, "task failed");
                TaskResponse::from_error(&error)
            }
        }
    }

    async fn run_task(&self, request: &TaskRequest) -> Result<TaskData> {
        match request.task {
            TaskKind::Guess => {
                let top_k = request.top_k.unwrap_or(DEFAULT_GUESS_TOP_K);
                let output = self.guess(&request.text, top_k).await?;
                Ok(TaskData::Guess {
                    input: request.text.clone(),
                    masks: output
                        .masks
                        .into_iter()
                        .map(|mask| GuessData {
                            position: mask.position,
                            candidates: mask
                                .candidates
                                .into_iter()
                                .map(|c| CandidateData {
                                    token: c.token,
                                    score: c.score,
                                })
                                .collect(),
                        })
                        .collect(),
                })
            }
            TaskKind::Fill => {
                let top_k = request.top_k.unwrap_or(DEFAULT_FILL_TOP_K);
                let output = self.fill(&request.text, top_k).await?;
                Ok(TaskData::Fill {
                    input: request.text.clone(),
                    text: output.text,
                    plan: output
                        .plan
                        .iter()
                        .map(|r| ResolvedData {
                            position: r.position,
                            token: r.token.clone(),
                            score: r.score,
                            step: r.step,
                        })
                        .collect(),
                })
            }
            TaskKind::Score => {
                let options = request.options.as_deref().unwrap_or(&[]);
                let output = self.score(&request.text, options).await?;
                Ok(TaskData::Score {
                    input: request.text.clone(),
                    options: output
                        .options
                        .into_iter()
                        .map(|o| OptionData {
                            option: o.option,
                            score: o.score,
                            rank: o.rank,
                        })
                        .collect(),
                })
            }
        }
    }
}
