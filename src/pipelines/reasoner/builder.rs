use std::time::Duration;

use super::pipeline::CodeReasoner;
use crate::error::Result;
use crate::models::{MaskedLm, ModernBertMaskedLm, ModernBertSize};
use crate::pipelines::utils::DeviceRequest;

const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);
const DEFAULT_MAX_INPUT_TOKENS: usize = 512;

/// Builder for [`CodeReasoner`] instances.
///
/// Use [`Self::modernbert`] for the bundled provider, or [`Self::new`] with
/// the options of any [`MaskedLm`] implementation. All settings are carried
/// explicitly here; the engine holds no process-wide state.
///
/// # Examples
///
/// ```rust,no_run
/// # use std::time::Duration;
/// # use code_reasoner::reasoner::{CodeReasonerBuilder, ModernBertSize};
/// # fn main() -> code_reasoner::error::Result<()> {
/// let reasoner = CodeReasonerBuilder::modernbert(ModernBertSize::Base)
///     .cuda(0)
///     .deadline(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct CodeReasonerBuilder<M: MaskedLm> {
    options: M::Options,
    device_request: DeviceRequest,
    deadline: Duration,
    max_input_tokens: usize,
    max_in_flight: Option<usize>,
}

impl<M: MaskedLm> CodeReasonerBuilder<M> {
    /// Creates a builder from provider options.
    pub fn new(options: M::Options) -> Self {
        Self {
            options,
            device_request: DeviceRequest::default(),
            deadline: DEFAULT_DEADLINE,
            max_input_tokens: DEFAULT_MAX_INPUT_TOKENS,
            max_in_flight: None,
        }
    }

    /// Use CPU for inference (default).
    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    /// Use a specific CUDA GPU for inference.
    pub fn cuda(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    /// Deadline applied to every model call (default 30s). A call that
    /// exceeds it fails with `InferenceUnavailable` instead of hanging.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Maximum encoded input length in tokens (default 512).
    pub fn max_input_tokens(mut self, max_input_tokens: usize) -> Self {
        self.max_input_tokens = max_input_tokens;
        self
    }

    /// Bound concurrent model calls, serializing them when set to 1.
    /// Useful on a single accelerator; unrestricted by default.
    pub fn max_in_flight(mut self, permits: usize) -> Self {
        self.max_in_flight = Some(permits.max(1));
        self
    }

    /// Builds the engine with the configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if model loading or device initialization fails.
    pub fn build(self) -> Result<CodeReasoner<M>> {
        let device = self.device_request.resolve()?;
        let model = M::new(self.options.clone(), device)?;
        let tokenizer = M::get_tokenizer(self.options)?;
        CodeReasoner::assemble(
            model,
            tokenizer,
            self.deadline,
            self.max_input_tokens,
            self.max_in_flight,
        )
    }
}

impl CodeReasonerBuilder<ModernBertMaskedLm> {
    /// Creates a builder for a ModernBERT masked-LM provider.
    pub fn modernbert(size: ModernBertSize) -> Self {
        Self::new(size)
    }
}
