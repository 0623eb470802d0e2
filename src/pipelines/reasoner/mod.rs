//! Masked-token code reasoning.
//!
//! One engine, three operations over text containing `[MASK]` markers:
//! guess candidates for the masked slots, iteratively fill every slot, and
//! rank a caller-supplied set of replacement options by likelihood.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use code_reasoner::reasoner::{CodeReasonerBuilder, ModernBertSize};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> code_reasoner::error::Result<()> {
//! let reasoner = CodeReasonerBuilder::modernbert(ModernBertSize::Base).build()?;
//!
//! let output = reasoner.guess("import [MASK]", 5).await?;
//! for candidate in &output.masks[0].candidates {
//!     println!("{}: {:.4}", candidate.token, candidate.score);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Filling Multiple Masks
//!
//! Masks are resolved one per step, most confident first, each step seeing
//! the previously committed tokens as ordinary context:
//!
//! ```rust,no_run
//! # use code_reasoner::reasoner::{CodeReasonerBuilder, ModernBertSize};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> code_reasoner::error::Result<()> {
//! # let reasoner = CodeReasonerBuilder::modernbert(ModernBertSize::Base).build()?;
//! let output = reasoner.fill("for [MASK] in [MASK]:", 3).await?;
//! println!("{}", output.text);
//! # Ok(())
//! # }
//! ```
//!
//! # Scoring Options
//!
//! ```rust,no_run
//! # use code_reasoner::reasoner::{CodeReasonerBuilder, ModernBertSize};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> code_reasoner::error::Result<()> {
//! # let reasoner = CodeReasonerBuilder::modernbert(ModernBertSize::Base).build()?;
//! let options = ["strcpy".to_string(), "strncpy".to_string()];
//! let output = reasoner.score("use [MASK] here", &options).await?;
//! println!("best: {}", output.options[0].option);
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Models
//!
//! | Model | Sizes | Builder Method |
//! |-------|-------|----------------|
//! | ModernBERT | `Base`, `Large` | [`CodeReasonerBuilder::modernbert`] |
//!
//! Any other provider can be plugged in by implementing
//! [`MaskedLm`](crate::models::MaskedLm) and handing its options to
//! [`CodeReasonerBuilder::new`].

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod fill;
pub(crate) mod pipeline;
pub(crate) mod predictor;
pub(crate) mod score;

// ============ Public API ============

pub use crate::models::ModernBertSize;
pub use crate::pipelines::stats::ReasonerStats;
pub use builder::CodeReasonerBuilder;
pub use fill::{FillOutput, FillPlan, ResolvedMask};
pub use pipeline::{CodeReasoner, GuessOutput, MaskGuess, Prediction};
pub use score::{ScoreOutput, ScoredOption};
