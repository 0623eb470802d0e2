//! ModernBERT masked-LM provider, served locally through Candle.

use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::{ops::softmax, VarBuilder};
use candle_transformers::models::modernbert::{Config, ModernBertForMaskedLM};
use tokenizers::Tokenizer;

use super::{MaskedLm, VocabDistribution};
use crate::error::{ReasonerError, Result};
use crate::loaders::{load_tokenizer, HubFile};

/// Available ModernBERT model sizes.
#[derive(Debug, Clone, Copy)]
pub enum ModernBertSize {
    /// Base model (~150M parameters).
    Base,
    /// Large model (~400M parameters).
    Large,
}

impl ModernBertSize {
    fn repo_id(self) -> &'static str {
        match self {
            ModernBertSize::Base => "answerdotai/ModernBERT-base",
            ModernBertSize::Large => "answerdotai/ModernBERT-large",
        }
    }
}

impl std::fmt::Display for ModernBertSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModernBertSize::Base => "modernbert-base",
            ModernBertSize::Large => "modernbert-large",
        };
        write!(f, "{name}")
    }
}

/// ModernBERT with its masked-LM head, loaded from the HuggingFace Hub.
#[derive(Clone)]
pub struct ModernBertMaskedLm {
    model: ModernBertForMaskedLM,
    device: Device,
}

impl MaskedLm for ModernBertMaskedLm {
    type Options = ModernBertSize;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        let repo_id = options.repo_id();
        tracing::info!(model = %options, "loading masked-LM weights");

        let (config, vb) = load_model_weights(repo_id, &device)?;
        let model = ModernBertForMaskedLM::load(vb, &config)?;

        Ok(Self { model, device })
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        load_tokenizer(options.repo_id())
    }

    fn infer(&self, token_ids: &[u32], mask_positions: &[usize]) -> Result<Vec<VocabDistribution>> {
        if token_ids.is_empty() {
            return Err(ReasonerError::Unexpected(
                "inference requested on an empty token sequence".to_string(),
            ));
        }

        let input_ids = Tensor::new(token_ids, &self.device)?.unsqueeze(0)?;
        let attention_mask = Tensor::ones((1, token_ids.len()), DType::U32, &self.device)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?.squeeze(0)?;

        let mut distributions = Vec::with_capacity(mask_positions.len());
        for &position in mask_positions {
            if position >= token_ids.len() {
                return Err(ReasonerError::Unexpected(format!(
                    "masked position {position} is outside the {}-token sequence",
                    token_ids.len()
                )));
            }
            let position_logits = logits.i((position, ..))?;
            let probs = softmax(&position_logits, D::Minus1)?.to_vec1::<f32>()?;
            distributions.push(VocabDistribution::new(probs));
        }

        Ok(distributions)
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

fn load_model_weights(repo_id: &str, device: &Device) -> Result<(Config, VarBuilder<'static>)> {
    let config_path = HubFile::new(repo_id, "config.json").fetch()?;
    let weights_path = HubFile::new(repo_id, "model.safetensors")
        .fetch()
        .or_else(|_| HubFile::new(repo_id, "pytorch_model.bin").fetch())?;

    let config: Config = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;

    let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
        unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? }
    } else {
        VarBuilder::from_pth(&weights_path, DType::F32, device)?
    };

    Ok((config, vb))
}
