//! The full import for one or more parts of speech.
//!
//! Steps run in a fixed order per part of speech: dictionary import,
//! participle generation (verbs), allomorphs (nouns, adjectives), missing
//! feminine plurals (nouns), missing adjective forms, spelling reconciliation, form-of labels, lemma
//! spellings and corpus frequencies. Each step is its own transaction.

use serde::Serialize;
use std::time::Instant;

use crate::allomorphs::import_allomorphs;
use crate::builder::{import_pos, ImportOptions};
use crate::config::PipelineConfig;
use crate::dictionary::{DictionaryIndex, DictionarySource};
use crate::error::Result;
use crate::form_of::enrich_form_of_labels;
use crate::frequency::import_frequencies;
use crate::grammar::PartOfSpeech;
use crate::nouns::enrich_missing_feminine_plurals;
use crate::progress::ProgressSink;
use crate::resolver::{enrich_lemma_written, reconcile_spellings, ResolverChain};
use crate::rules::Rules;
use crate::secondary::{fill_missing_adjective_forms, SecondaryLexicon};
use crate::store::LexiconStore;
use crate::verbs::generate_participles;

/// Statistics of one step
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub pos: PartOfSpeech,
    pub step: &'static str,
    pub stats: serde_json::Value,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub steps: Vec<StepReport>,
    /// Steps skipped because an optional input was missing
    pub skipped: Vec<String>,
}

impl PipelineReport {
    fn record<T: Serialize>(&mut self, pos: PartOfSpeech, step: &'static str, stats: &T) -> Result<()> {
        self.steps.push(StepReport {
            pos,
            step,
            stats: serde_json::to_value(stats)?,
        });
        Ok(())
    }

    pub fn step(&self, pos: PartOfSpeech, step: &str) -> Option<&serde_json::Value> {
        self.steps
            .iter()
            .find(|s| s.pos == pos && s.step == step)
            .map(|s| &s.stats)
    }
}

/// Run every step for each part of speech in `parts`
pub fn run_all(
    store: &mut LexiconStore,
    parts: &[PartOfSpeech],
    config: &PipelineConfig,
    rules: &Rules,
    progress: &dyn ProgressSink,
) -> Result<PipelineReport> {
    config.validate()?;
    let source = DictionarySource::file(&config.dictionary_path);
    source.check()?;
    let lexicon = SecondaryLexicon::from_path(&config.secondary_path)?;
    let options = ImportOptions::from(config);
    let chain = ResolverChain::default();

    let mut report = PipelineReport::default();
    for &pos in parts {
        let started = Instant::now();
        log::info!("Importing {}", pos.plural());

        let stats = import_pos(store, &source, pos, rules, &options, progress)?;
        report.record(pos, "import", &stats)?;

        if pos == PartOfSpeech::Verb {
            let stats = generate_participles(store, progress)?;
            report.record(pos, "participles", &stats)?;
        } else {
            let stats = import_allomorphs(store, &source, pos, rules, progress)?;
            report.record(pos, "allomorphs", &stats)?;
        }
        if pos == PartOfSpeech::Noun {
            let stats = enrich_missing_feminine_plurals(store, rules, progress)?;
            report.record(pos, "feminine_plurals", &stats)?;
        }
        if pos == PartOfSpeech::Adjective {
            let stats = fill_missing_adjective_forms(store, &lexicon, progress)?;
            report.record(pos, "adjective_forms", &stats)?;
        }

        let index = DictionaryIndex::build(&source, pos)?;
        let stats = reconcile_spellings(store, pos, &chain, rules, Some(&lexicon), Some(&index), progress)?;
        report.record(pos, "reconcile", &stats)?;

        let stats = enrich_form_of_labels(store, pos, &index)?;
        report.record(pos, "form_of", &stats)?;

        let stats = enrich_lemma_written(store, pos, rules)?;
        report.record(pos, "lemma_written", &stats)?;

        let corpus_path = config.corpus.path_for(pos);
        if corpus_path.is_file() {
            let stats = import_frequencies(store, pos, &corpus_path, &config.corpus, rules)?;
            report.record(pos, "frequency", &stats)?;
        } else {
            log::warn!("Frequency file {} not found, skipping", corpus_path.display());
            report.skipped.push(format!("{} frequency", pos));
        }

        log::info!("Finished {} in {:.1?}", pos.plural(), started.elapsed());
    }
    Ok(report)
}
