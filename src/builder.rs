//! Dictionary import: lemma entries to lemmas, forms, metadata and
//! definitions.
//!
//! The import runs in two scans. The first builds a [`DictionaryIndex`] of
//! cross-entry facts (plurals of other lemmas, accented alternatives); the
//! second plans every lemma entry through the part-of-speech strategy and
//! writes the result. Links between lemmas are resolved once all of them
//! exist.

use serde::Serialize;

use crate::adjectives::AdjectiveStrategy;
use crate::config::PipelineConfig;
use crate::dictionary::{DictionaryEntry, DictionaryIndex, DictionarySource};
use crate::error::Result;
use crate::grammar::PartOfSpeech;
use crate::model::{Definition, FormRecord, Lemma, LemmaId};
use crate::nouns::NounStrategy;
use crate::orthography::normalize;
use crate::progress::ProgressSink;
use crate::rules::Rules;
use crate::store::LexiconStore;
use crate::strategy::{
    LemmaMetadata, PendingLink, PlanContext, PlanCounters, PosStrategy, SkipReason,
};
use crate::verbs::VerbStrategy;

/// Sense tags that restate what the metadata tables already record
const DEFINITION_TAG_BLOCKLIST: &[&str] = &[
    "masculine",
    "feminine",
    "by-personal-gender",
    "transitive",
    "intransitive",
    "ditransitive",
    "ambitransitive",
    "alt-of",
    "alternative",
];

/// Import settings
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Forms buffered before they are written
    pub batch_size: usize,
    /// Lines between progress reports
    pub progress_interval: usize,
    /// Delete the part of speech before importing
    pub clear_existing: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        ImportOptions {
            batch_size: 1000,
            progress_interval: 10_000,
            clear_existing: true,
        }
    }
}

impl From<&PipelineConfig> for ImportOptions {
    fn from(config: &PipelineConfig) -> Self {
        ImportOptions {
            batch_size: config.batch_size,
            progress_interval: config.progress_interval,
            clear_existing: true,
        }
    }
}

/// Statistics of one dictionary import
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    pub lines_read: usize,
    pub malformed_lines: usize,
    pub cleared_lemmas: usize,
    pub entries_matched: usize,
    pub lemmas: usize,
    pub forms: usize,
    pub forms_filtered: usize,
    pub definitions: usize,
    pub form_of_skipped: usize,
    pub alt_forms_skipped: usize,
    pub misspellings_skipped: usize,
    pub nouns_skipped_no_gender: usize,
    pub duplicate_lemmas: usize,
    pub links_resolved: usize,
    pub links_unresolved: usize,
    #[serde(flatten)]
    pub counters: PlanCounters,
}

/// Import the lemmas of one part of speech, choosing its strategy
pub fn import_pos(
    store: &mut LexiconStore,
    source: &DictionarySource,
    pos: PartOfSpeech,
    rules: &Rules,
    options: &ImportOptions,
    progress: &dyn ProgressSink,
) -> Result<ImportStats> {
    match pos {
        PartOfSpeech::Verb => import_dictionary(store, source, &VerbStrategy, rules, options, progress),
        PartOfSpeech::Noun => import_dictionary(store, source, &NounStrategy, rules, options, progress),
        PartOfSpeech::Adjective => {
            import_dictionary(store, source, &AdjectiveStrategy, rules, options, progress)
        }
    }
}

/// Import every lemma entry `strategy` accepts.
///
/// The part of speech is cleared first (unless disabled in `options`), so a
/// second run produces the same store. On error the store is left untouched.
pub fn import_dictionary<S: PosStrategy>(
    store: &mut LexiconStore,
    source: &DictionarySource,
    strategy: &S,
    rules: &Rules,
    options: &ImportOptions,
    progress: &dyn ProgressSink,
) -> Result<ImportStats> {
    source.check()?;
    let pos = strategy.pos();
    let index = DictionaryIndex::build(source, pos)?;
    let ctx = PlanContext {
        rules,
        index: &index,
    };
    let pass = format!("import {}", pos.plural());

    store.transaction(|store| {
        let mut stats = ImportStats::default();
        if options.clear_existing {
            stats.cleared_lemmas = store.clear_pos(pos);
            if stats.cleared_lemmas > 0 {
                log::info!("Cleared {} existing {}", stats.cleared_lemmas, pos.plural());
            }
        }

        let batch_size = options.batch_size.max(1);
        let interval = options.progress_interval.max(1);
        let mut pending: Vec<S::Form> = Vec::with_capacity(batch_size);
        let mut links: Vec<(LemmaId, Vec<PendingLink>)> = Vec::new();

        let mut stream = source.entries()?;
        for item in stream.by_ref() {
            let (line, entry) = item?;
            if line % interval == 0 {
                progress.update(&pass, line, 0);
            }
            if entry.word.is_empty() || !entry.is_pos(pos) {
                continue;
            }
            stats.entries_matched += 1;

            if !entry.is_lemma_entry(pos) {
                stats.form_of_skipped += 1;
                continue;
            }
            if entry.has_alt_of() {
                stats.alt_forms_skipped += 1;
                continue;
            }
            if entry.is_misspelling() {
                stats.misspellings_skipped += 1;
                continue;
            }

            let stressed = entry.stressed().to_string();
            let plan = match strategy.plan_entry(&entry, &stressed, &ctx) {
                Ok(plan) => plan,
                Err(SkipReason::NoGender) => {
                    log::debug!("Skipping {}: no gender", entry.word);
                    stats.nouns_skipped_no_gender += 1;
                    continue;
                }
            };

            let mut lemma = Lemma::new(normalize(&entry.word), stressed, pos);
            lemma.ipa = entry.ipa().map(str::to_string);
            let Some(lemma_id) = store.insert_lemma(lemma) else {
                log::debug!("Duplicate lemma {}", entry.word);
                stats.duplicate_lemmas += 1;
                continue;
            };
            stats.lemmas += 1;

            match plan.metadata {
                LemmaMetadata::Verb(meta) => {
                    store.verb_metadata.insert(lemma_id, meta);
                }
                LemmaMetadata::Noun(meta) => {
                    store.noun_metadata.insert(lemma_id, meta);
                }
                LemmaMetadata::Adjective(meta) => {
                    store.adjective_metadata.insert(lemma_id, meta);
                }
            }

            for definition in definitions_of(&entry, lemma_id) {
                store.add_definition(definition);
                stats.definitions += 1;
            }

            stats.forms_filtered += plan.filtered;
            stats.counters += plan.counters;
            for mut form in plan.forms {
                form.set_lemma_id(lemma_id);
                pending.push(form);
            }
            if pending.len() >= batch_size {
                flush(strategy, store, &mut pending, &mut stats);
            }
            if !plan.links.is_empty() {
                links.push((lemma_id, plan.links));
            }
        }
        flush(strategy, store, &mut pending, &mut stats);

        stats.lines_read = stream.lines_read();
        stats.malformed_lines = stream.malformed();
        progress.finish(&pass, stats.lines_read);

        resolve_links(store, links, &mut stats);

        log::info!(
            "Imported {} {} with {} forms ({} duplicate lemmas, {} malformed lines)",
            stats.lemmas,
            pos.plural(),
            stats.forms,
            stats.duplicate_lemmas,
            stats.malformed_lines
        );
        if stats.nouns_skipped_no_gender > 0 {
            log::info!("Skipped {} nouns without gender", stats.nouns_skipped_no_gender);
        }
        Ok(stats)
    })
}

fn flush<S: PosStrategy>(
    strategy: &S,
    store: &mut LexiconStore,
    pending: &mut Vec<S::Form>,
    stats: &mut ImportStats,
) {
    let table = strategy.table(store);
    for form in pending.drain(..) {
        if table.insert(form).is_some() {
            stats.forms += 1;
        } else {
            stats.counters.duplicate_forms += 1;
        }
    }
}

/// Definition rows of an entry, one per sense with glosses
pub fn definitions_of(entry: &DictionaryEntry, lemma_id: LemmaId) -> Vec<Definition> {
    entry
        .senses
        .iter()
        .filter(|s| !s.glosses.is_empty())
        .map(|sense| {
            let tags: Vec<String> = sense
                .tags
                .iter()
                .filter(|t| !DEFINITION_TAG_BLOCKLIST.contains(&t.as_str()))
                .cloned()
                .collect();
            let set = sense.tag_set();
            Definition {
                lemma_id,
                gloss: sense.glosses.join("; "),
                tags: if tags.is_empty() { None } else { Some(tags) },
                meaning_hint: sense.qualifier.clone(),
                form_gender: set.gender(),
                form_number: set.number(),
            }
        })
        .collect()
}

fn resolve_links(
    store: &mut LexiconStore,
    links: Vec<(LemmaId, Vec<PendingLink>)>,
    stats: &mut ImportStats,
) {
    for (lemma_id, pending) in links {
        for link in pending {
            let (pos, word) = match &link {
                PendingLink::Counterpart(word) => (PartOfSpeech::Noun, word),
                PendingLink::DerivedFrom { base, .. } => (PartOfSpeech::Noun, base),
                PendingLink::Degree { base, .. } => (PartOfSpeech::Adjective, base),
            };
            let target = store
                .find_lemma(pos, &normalize(word))
                .map(|l| l.id)
                .filter(|id| *id != lemma_id);
            let Some(target) = target else {
                log::debug!("Unresolved link from lemma {} to {}", lemma_id, word);
                stats.links_unresolved += 1;
                continue;
            };

            match link {
                PendingLink::Counterpart(_) => {
                    if let Some(meta) = store.noun_metadata.get_mut(&lemma_id) {
                        meta.counterpart_lemma_id = Some(target);
                    }
                }
                PendingLink::DerivedFrom { .. } => {
                    if let Some(meta) = store.noun_metadata.get_mut(&lemma_id) {
                        meta.base_lemma_id = Some(target);
                    }
                }
                PendingLink::Degree { .. } => {
                    if let Some(meta) = store.adjective_metadata.get_mut(&lemma_id) {
                        meta.base_lemma_id = Some(target);
                    }
                }
            }
            stats.links_resolved += 1;
        }
    }
}
