use std::path::PathBuf;

use hf_hub::{api::sync::Api, Repo, RepoType};
use tokenizers::Tokenizer;

use crate::error::{ReasonerError, Result};

/// A single file in a HuggingFace model repository.
#[derive(Debug, Clone)]
pub(crate) struct HubFile {
    pub repo: String,
    pub filename: String,
}

impl HubFile {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    pub fn fetch(&self) -> Result<PathBuf> {
        let api = Api::new()?;
        let repo = api.repo(Repo::new(self.repo.clone(), RepoType::Model));
        repo.get(&self.filename).map_err(|e| {
            ReasonerError::Download(format!(
                "Failed to download '{}' from '{}': {e}",
                self.filename, self.repo
            ))
        })
    }
}

pub(crate) fn load_tokenizer(repo_id: &str) -> Result<Tokenizer> {
    let tokenizer_path = HubFile::new(repo_id, "tokenizer.json").fetch()?;
    let path_str = tokenizer_path.display().to_string();
    Tokenizer::from_file(&tokenizer_path).map_err(|e| {
        ReasonerError::Unexpected(format!("Failed to load tokenizer from '{path_str}': {e}"))
    })
}
