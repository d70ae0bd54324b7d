//! Pipeline configuration.
//!
//! All paths default to the conventional `data/` layout. A JSON file may
//! override any subset of the fields.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{LexiconError, Result};
use crate::grammar::PartOfSpeech;
use crate::store::default_store_path;

/// Minimum counts and percentages the verification report expects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageThresholds {
    pub total_lemmas: usize,
    pub verb_lemmas: usize,
    pub noun_lemmas: usize,
    pub adjective_lemmas: usize,
    pub total_forms: usize,
    /// Percentage of forms with a written spelling
    pub written_pct: f64,
    /// Percentage of lemmas with frequency data
    pub frequency_pct: f64,
}

impl Default for CoverageThresholds {
    fn default() -> Self {
        CoverageThresholds {
            total_lemmas: 100_000,
            verb_lemmas: 10_000,
            noun_lemmas: 50_000,
            adjective_lemmas: 20_000,
            total_forms: 900_000,
            written_pct: 100.0,
            frequency_pct: 60.0,
        }
    }
}

impl CoverageThresholds {
    /// Thresholds that any non-empty store satisfies
    pub fn none() -> Self {
        CoverageThresholds {
            total_lemmas: 0,
            verb_lemmas: 0,
            noun_lemmas: 0,
            adjective_lemmas: 0,
            total_forms: 0,
            written_pct: 0.0,
            frequency_pct: 0.0,
        }
    }

    pub fn lemmas_for(&self, pos: PartOfSpeech) -> usize {
        match pos {
            PartOfSpeech::Verb => self.verb_lemmas,
            PartOfSpeech::Noun => self.noun_lemmas,
            PartOfSpeech::Adjective => self.adjective_lemmas,
        }
    }
}

/// Frequency corpus settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    pub name: String,
    pub directory: PathBuf,
    /// Corpus size in words, used for the Zipf scale
    pub size_words: f64,
    pub verb_file: String,
    pub noun_file: String,
    pub adjective_file: String,
    pub verb_version: String,
    pub noun_version: String,
    pub adjective_version: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        CorpusConfig {
            name: "itwac".to_string(),
            directory: PathBuf::from("data/itwac"),
            size_words: 1.9e9,
            verb_file: "itwac_verbs_lemmas_notail_2_1_0.csv".to_string(),
            noun_file: "itwac_nouns_lemmas_notail_2_0_0.csv".to_string(),
            adjective_file: "itwac_adj_lemmas_notail_2_1_0.csv".to_string(),
            verb_version: "2.1.0".to_string(),
            noun_version: "2.0.0".to_string(),
            adjective_version: "2.1.0".to_string(),
        }
    }
}

impl CorpusConfig {
    pub fn path_for(&self, pos: PartOfSpeech) -> PathBuf {
        let file = match pos {
            PartOfSpeech::Verb => &self.verb_file,
            PartOfSpeech::Noun => &self.noun_file,
            PartOfSpeech::Adjective => &self.adjective_file,
        };
        self.directory.join(file)
    }

    pub fn version_for(&self, pos: PartOfSpeech) -> &str {
        match pos {
            PartOfSpeech::Verb => &self.verb_version,
            PartOfSpeech::Noun => &self.noun_version,
            PartOfSpeech::Adjective => &self.adjective_version,
        }
    }
}

/// Settings shared by every pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub store_path: PathBuf,
    pub dictionary_path: PathBuf,
    pub secondary_path: PathBuf,
    pub corpus: CorpusConfig,
    /// Forms buffered before a flush
    pub batch_size: usize,
    /// Lines between progress reports
    pub progress_interval: usize,
    pub thresholds: CoverageThresholds,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            store_path: default_store_path().unwrap_or_else(|| PathBuf::from("lexicon.json")),
            dictionary_path: PathBuf::from("data/wiktextract/kaikki.org-dictionary-Italian.jsonl"),
            secondary_path: PathBuf::from("data/morphit/morph-it.txt"),
            corpus: CorpusConfig::default(),
            batch_size: 1000,
            progress_interval: 10_000,
            thresholds: CoverageThresholds::default(),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON configuration file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        LexiconError::require_file(path)?;
        let content = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(LexiconError::Config("batch_size must be positive".into()));
        }
        if self.progress_interval == 0 {
            return Err(LexiconError::Config("progress_interval must be positive".into()));
        }
        if self.corpus.size_words <= 0.0 {
            return Err(LexiconError::Config("corpus size must be positive".into()));
        }
        Ok(())
    }
}
