//! Configuration management for SeqImprove

use serde::Deserialize;
use std::env;

use crate::annotations::{MarkupPattern, ANY_ID};
use crate::text::{TrailingTrimmer, DEFAULT_TRAILING_PATTERN};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub annotations: AnnotationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationConfig {
    /// Pattern annotation ids in markup must match
    pub id_pattern: String,
    /// Trailing run offered for stripping from a selection
    pub trailing_pattern: String,
}

impl AnnotationConfig {
    pub fn markup_pattern(&self) -> Result<MarkupPattern, regex::Error> {
        MarkupPattern::new(&self.id_pattern)
    }

    pub fn trimmer(&self) -> Result<TrailingTrimmer, regex::Error> {
        TrailingTrimmer::new(&self.trailing_pattern)
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        ExtractionConfig {
            base_url: "http://localhost:5000".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        AnnotationConfig {
            id_pattern: ANY_ID.to_string(),
            trailing_pattern: DEFAULT_TRAILING_PATTERN.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            extraction: ExtractionConfig::default(),
            annotations: AnnotationConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Config {
            extraction: ExtractionConfig {
                base_url: env::var("SEQIMPROVE_EXTRACTION_URL")?,
                timeout_secs: env::var("SEQIMPROVE_EXTRACTION_TIMEOUT_SECS")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .unwrap_or(60),
            },
            annotations: AnnotationConfig {
                id_pattern: env::var("SEQIMPROVE_ID_PATTERN").unwrap_or_else(|_| ANY_ID.to_string()),
                trailing_pattern: env::var("SEQIMPROVE_TRAILING_PATTERN")
                    .unwrap_or_else(|_| DEFAULT_TRAILING_PATTERN.to_string()),
            },
        })
    }
}
