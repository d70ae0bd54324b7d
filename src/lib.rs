//! # italian-lexicon
//!
//! An Italian morphology database built from three sources: a JSONL
//! dictionary dump, a tab-separated morphological lexicon and a CSV
//! frequency corpus.
//!
//! The dictionary provides lemmas and stress-marked inflected forms. The
//! lexicon and a set of orthography rules supply the everyday written
//! spelling of each form, and the corpus supplies lemma frequencies.
//!
//! ## Quick Start
//!
//! ```rust
//! use italian_lexicon::{derive_written, ArticleSelector, Gender, Number};
//!
//! // Written spelling of a stress-marked form
//! assert_eq!(derive_written("pàrlo").as_deref(), Some("parlo"));
//! assert_eq!(derive_written("città").as_deref(), Some("città"));
//!
//! // Definite article of a noun form
//! let articles = ArticleSelector::default();
//! let selection = articles.definite("studente", Gender::Masculine, Number::Singular);
//! assert_eq!(selection.article.as_str(), "lo");
//! ```
//!
//! ## Importing
//!
//! ```rust
//! use italian_lexicon::{import_pos, DictionarySource, ImportOptions, LexiconStore,
//!     NullProgress, PartOfSpeech, Rules};
//!
//! let source = DictionarySource::from_lines([
//!     r#"{"word":"casa","pos":"noun","forms":[{"form":"càse","tags":["plural"]}],"senses":[{"glosses":["house"],"tags":["feminine"]}]}"#,
//! ]);
//! let mut store = LexiconStore::new();
//! let rules = Rules::default();
//! let stats = import_pos(&mut store, &source, PartOfSpeech::Noun, &rules,
//!     &ImportOptions::default(), &NullProgress).unwrap();
//! assert_eq!(stats.lemmas, 1);
//! ```

pub mod adjectives;
pub mod allomorphs;
pub mod articles;
pub mod builder;
pub mod config;
pub mod derivation;
pub mod dictionary;
pub mod error;
pub mod form_of;
pub mod frequency;
pub mod grammar;
pub mod model;
pub mod nouns;
pub mod orthography;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod rules;
pub mod secondary;
pub mod store;
pub mod strategy;
pub mod tags;
pub mod verbs;
pub mod verify;

// Re-export main types for convenience
pub use allomorphs::{import_allomorphs, AllomorphStats};
pub use articles::{ArticleExceptions, ArticleSelector, DefiniteArticle};
pub use builder::{import_dictionary, import_pos, ImportOptions, ImportStats};
pub use config::{CorpusConfig, CoverageThresholds, PipelineConfig};
pub use dictionary::{DictionaryEntry, DictionaryIndex, DictionarySource};
pub use error::{LexiconError, Result};
pub use form_of::{enrich_form_of_labels, FormOfStats};
pub use frequency::{import_frequencies, import_frequency_text, zipf, FrequencyStats};
pub use grammar::{
    Degree, FormOrigin, Gender, GenderClass, InflectionClass, Mood, Number, NumberClass,
    PartOfSpeech, Tense, WrittenSource,
};
pub use model::{AdjectiveForm, FormRecord, Lemma, NounForm, VerbForm};
pub use nouns::{enrich_missing_feminine_plurals, FemininePluralStats};
pub use orthography::{derive_written, normalize, Orthography};
pub use pipeline::{run_all, PipelineReport};
pub use progress::{LogProgress, NullProgress, ProgressSink};
pub use resolver::{enrich_lemma_written, reconcile_spellings, ResolverChain, SpellingResolver};
pub use rules::Rules;
pub use secondary::{fill_missing_adjective_forms, SecondaryLexicon};
pub use store::LexiconStore;
pub use verbs::generate_participles;
pub use verify::{verify, VerificationReport, VerifyOptions};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
