//! Read-only configuration. Defaults match the shipped `config.json` keys;
//! the core never writes configuration back.

use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use serde::Deserialize;
use tracing::warn;

use crate::core::QuizgenError;

const APP_NAME: &str = "quizgen";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct QuizConfig {
    /// Display name of the deck auto-created for generated notes.
    #[serde(default = "default_quiz_deck_name")]
    pub default_quiz_deck_name: String,

    /// Name of the generated field on the target note type.
    #[serde(default = "default_quiz_field_name")]
    pub quiz_field_name: String,

    #[serde(default = "default_distractor_count", rename = "max_random_cards")]
    pub default_distractor_count: usize,

    #[serde(default = "default_skip_existing", rename = "skip_existing_cards")]
    pub skip_existing_default: bool,
}

fn default_quiz_deck_name() -> String {
    "Quiz Notes".to_string()
}

fn default_quiz_field_name() -> String {
    "Quiz".to_string()
}

fn default_distractor_count() -> usize {
    3
}

fn default_skip_existing() -> bool {
    true
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            default_quiz_deck_name: default_quiz_deck_name(),
            quiz_field_name: default_quiz_field_name(),
            default_distractor_count: default_distractor_count(),
            skip_existing_default: default_skip_existing(),
        }
    }
}

impl QuizConfig {
    /// Loads `config.json` from the platform data dir, falling back to
    /// defaults when the file is absent or unreadable.
    pub fn load() -> Self {
        let path = config_file_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "falling back to default config");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, QuizgenError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn config_file_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        data_dir.join(APP_NAME).join(CONFIG_FILE)
    } else {
        PathBuf::from(CONFIG_FILE)
    }
}
