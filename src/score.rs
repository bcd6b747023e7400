use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Persisted highscore: a single decimal integer in a plain text file.
pub struct ScoreStore {
    path: PathBuf,
}

impl ScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ScoreStore { path: path.into() }
    }

    /// A missing or unparsable file counts as no highscore yet.
    pub fn load(&self) -> u32 {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|text| text.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn save(&self, score: u32) -> Result<()> {
        fs::write(&self.path, score.to_string())
            .with_context(|| format!("writing highscore to {}", self.path.display()))
    }
}
