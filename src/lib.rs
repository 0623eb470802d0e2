//! Masked-token code completion for security analysis tooling.
//!
//! Powered by [Candle](https://github.com/huggingface/candle), with masked
//! language models served behind a small capability trait. Three operations
//! are exposed over text containing `[MASK]` markers: guess candidates for a
//! single slot, iteratively fill every slot, and rank a closed set of
//! replacement options by likelihood.
//!
//! ```rust,no_run
//! use code_reasoner::reasoner::{CodeReasonerBuilder, ModernBertSize};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> code_reasoner::error::Result<()> {
//! let reasoner = CodeReasonerBuilder::modernbert(ModernBertSize::Base).build()?;
//!
//! let output = reasoner.guess("def [MASK](x, y): return x + y", 3).await?;
//! for guess in &output.masks {
//!     for candidate in &guess.candidates {
//!         println!("{}: {:.4}", candidate.token, candidate.score);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod bridge;
pub mod dispatch;
pub mod error;
pub mod models;

pub use pipelines::reasoner;
