//! Usage labels carried over from form-of senses.
//!
//! A form-of entry such as "fè" (apocopic, form of "fede") tags one form of
//! a lemma. The labels are written onto the matching form only when that
//! form has no labels yet, so the pass never overwrites and a second run
//! changes nothing.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};

use crate::dictionary::DictionaryIndex;
use crate::error::Result;
use crate::grammar::PartOfSpeech;
use crate::model::{FormRecord, LemmaId};
use crate::orthography::normalize;
use crate::store::{FormTable, LexiconStore};

/// Statistics of a label enrichment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FormOfStats {
    pub labels_available: usize,
    pub forms_updated: usize,
    pub already_labelled: usize,
    pub lemma_not_found: usize,
    pub form_not_found: usize,
    /// Labelling would have made the form identical to another one
    pub duplicates_skipped: usize,
}

/// Apply form-of labels from `index` to forms of `pos` that have none
pub fn enrich_form_of_labels(
    store: &mut LexiconStore,
    pos: PartOfSpeech,
    index: &DictionaryIndex,
) -> Result<FormOfStats> {
    store.transaction(|store| {
        let mut stats = FormOfStats {
            labels_available: index.form_of_labels.len(),
            ..Default::default()
        };

        // (lemma, normalized form) → union of labels
        let mut targets: HashMap<(LemmaId, String), BTreeSet<String>> = HashMap::new();
        for label in &index.form_of_labels {
            let Some(lemma) = store.find_lemma(pos, &normalize(&label.lemma)) else {
                log::debug!("Form-of lemma {} not found for {}", label.lemma, label.form);
                stats.lemma_not_found += 1;
                continue;
            };
            targets
                .entry((lemma.id, normalize(&label.form)))
                .or_default()
                .extend(label.labels.split(',').map(|l| l.trim().to_string()));
        }
        let targets: HashMap<(LemmaId, String), String> = targets
            .into_iter()
            .map(|(key, labels)| (key, labels.into_iter().collect::<Vec<_>>().join(",")))
            .collect();

        match pos {
            PartOfSpeech::Verb => apply_labels(&mut store.verb_forms, &targets, &mut stats),
            PartOfSpeech::Noun => apply_labels(&mut store.noun_forms, &targets, &mut stats),
            PartOfSpeech::Adjective => {
                apply_labels(&mut store.adjective_forms, &targets, &mut stats)
            }
        }

        log::info!(
            "Form-of labels for {}: {} forms updated, {} already labelled, {} forms not found",
            pos.plural(),
            stats.forms_updated,
            stats.already_labelled,
            stats.form_not_found
        );
        Ok(stats)
    })
}

fn apply_labels<F: FormRecord>(
    table: &mut FormTable<F>,
    targets: &HashMap<(LemmaId, String), String>,
    stats: &mut FormOfStats,
) {
    table.modify(|rows| {
        let mut keys: HashSet<String> = rows.iter().map(FormRecord::unique_key).collect();
        let mut matched = HashSet::new();

        for form in rows.iter_mut() {
            let key = (form.lemma_id(), normalize(form.stressed()));
            let Some(labels) = targets.get(&key) else {
                continue;
            };
            matched.insert(key);
            if form.labels().is_some() {
                stats.already_labelled += 1;
                continue;
            }

            let old_key = form.unique_key();
            form.set_labels(Some(labels.clone()));
            let new_key = form.unique_key();
            if keys.contains(&new_key) {
                form.set_labels(None);
                stats.duplicates_skipped += 1;
                continue;
            }
            keys.remove(&old_key);
            keys.insert(new_key);
            stats.forms_updated += 1;
        }

        stats.form_not_found += targets.len() - matched.len();
    });
}
