//! Verb import rules and the participle generation pass.

use serde::Serialize;

use crate::derivation::participle_forms;
use crate::dictionary::DictionaryEntry;
use crate::error::Result;
use crate::grammar::{Auxiliary, FormOrigin, Gender, Mood, Number, PartOfSpeech, Transitivity};
use crate::model::{VerbForm, VerbMetadata};
use crate::orthography::normalize;
use crate::progress::ProgressSink;
use crate::store::{FormTable, LexiconStore};
use crate::strategy::{
    candidate_forms, dedup_forms, mark_citation, EntryPlan, LemmaMetadata, PlanContext,
    PlanCounters, PosStrategy, SkipReason,
};
use crate::tags::{classify_verb, TagSet};

#[derive(Debug, Clone, Copy, Default)]
pub struct VerbStrategy;

impl PosStrategy for VerbStrategy {
    type Form = VerbForm;

    fn pos(&self) -> PartOfSpeech {
        PartOfSpeech::Verb
    }

    fn table<'s>(&self, store: &'s mut LexiconStore) -> &'s mut FormTable<VerbForm> {
        &mut store.verb_forms
    }

    fn table_ref<'s>(&self, store: &'s LexiconStore) -> &'s FormTable<VerbForm> {
        &store.verb_forms
    }

    fn plan_entry(
        &self,
        entry: &DictionaryEntry,
        lemma_stressed: &str,
        ctx: &PlanContext<'_>,
    ) -> std::result::Result<EntryPlan<VerbForm>, SkipReason> {
        let mut counters = PlanCounters::default();
        let mut filtered = 0;
        let mut forms = Vec::new();

        // canonical rows repeat the lemma and are not conjugated forms
        let lemma_key = normalize(&entry.word);
        for candidate in candidate_forms(entry, &lemma_key, false, ctx, &mut counters) {
            let features = classify_verb(&candidate.tags);
            let mood = match features.mood {
                Some(mood) if !features.should_filter => mood,
                _ => {
                    filtered += 1;
                    continue;
                }
            };

            let mut form = VerbForm::new(0, candidate.stressed, mood);
            form.tense = features.tense;
            form.person = features.person;
            form.number = features.number;
            form.gender = features.gender;
            form.is_formal = features.is_formal;
            form.is_negative = features.is_negative;
            form.labels = features.labels;

            // a bare past participle is the masculine singular
            if mood == Mood::Participle
                && form.tense.is_none()
                && form.gender.is_none()
                && form.number.is_none()
                && form.stressed.ends_with('o')
            {
                form.gender = Some(Gender::Masculine);
                form.number = Some(Number::Singular);
            }
            forms.push(form);
        }

        if !forms.iter().any(|f| f.mood == Mood::Infinitive) {
            let mut infinitive = VerbForm::new(0, lemma_stressed, Mood::Infinitive);
            infinitive.form_origin = FormOrigin::InferredBaseForm;
            forms.push(infinitive);
            counters.inferred_infinitives += 1;
        }

        let mut forms = dedup_forms(forms, &mut counters);
        mark_citation(
            &mut forms,
            |f| f.mood == Mood::Infinitive && f.stressed == lemma_stressed && f.labels.is_none(),
            |f| f.mood == Mood::Infinitive,
        );

        let metadata = VerbMetadata {
            auxiliary: auxiliary_of(entry),
            transitivity: transitivity_of(entry),
        };

        Ok(EntryPlan {
            forms,
            metadata: LemmaMetadata::Verb(metadata),
            filtered,
            counters,
            links: Vec::new(),
        })
    }
}

/// Auxiliary from the forms tagged `auxiliary`
pub fn auxiliary_of(entry: &DictionaryEntry) -> Option<Auxiliary> {
    let mut avere = false;
    let mut essere = false;
    for form in entry.forms.iter().filter(|f| TagSet::new(&f.tags).has("auxiliary")) {
        let aux = normalize(&form.form);
        if aux.contains("aver") {
            avere = true;
        } else if aux.contains("esser") {
            essere = true;
        }
    }
    match (avere, essere) {
        (true, true) => Some(Auxiliary::Both),
        (true, false) => Some(Auxiliary::Avere),
        (false, true) => Some(Auxiliary::Essere),
        (false, false) => None,
    }
}

/// Transitivity from the sense tags
pub fn transitivity_of(entry: &DictionaryEntry) -> Option<Transitivity> {
    let transitive = entry.sense_tags().any(|t| t == "transitive");
    let intransitive = entry.sense_tags().any(|t| t == "intransitive");
    match (transitive, intransitive) {
        (true, true) => Some(Transitivity::Both),
        (true, false) => Some(Transitivity::Transitive),
        (false, true) => Some(Transitivity::Intransitive),
        (false, false) => None,
    }
}

/// Statistics of the participle pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParticipleStats {
    pub participles_found: usize,
    pub forms_generated: usize,
    pub duplicates_skipped: usize,
}

/// Generate the feminine and plural forms of every masculine singular past
/// participle. Re-running the pass adds nothing.
pub fn generate_participles(
    store: &mut LexiconStore,
    progress: &dyn ProgressSink,
) -> Result<ParticipleStats> {
    store.transaction(|store| {
        let mut stats = ParticipleStats::default();
        let bases: Vec<VerbForm> = store
            .verb_forms
            .iter()
            .filter(|f| {
                f.mood == Mood::Participle
                    && f.tense.is_none()
                    && f.gender == Some(Gender::Masculine)
                    && f.number == Some(Number::Singular)
                    && f.stressed.ends_with('o')
            })
            .cloned()
            .collect();
        let total = bases.len();

        for (i, base) in bases.into_iter().enumerate() {
            stats.participles_found += 1;
            for derived in participle_forms(&base.stressed) {
                let mut form = VerbForm::new(base.lemma_id, derived.stressed, Mood::Participle);
                form.gender = Some(derived.gender);
                form.number = Some(derived.number);
                form.labels = base.labels.clone();
                form.form_origin = FormOrigin::Derived;
                if store.verb_forms.insert(form).is_some() {
                    stats.forms_generated += 1;
                } else {
                    stats.duplicates_skipped += 1;
                }
            }
            if (i + 1) % 10_000 == 0 {
                progress.update("participles", i + 1, total);
            }
        }
        progress.finish("participles", total);

        log::info!(
            "Participles: {} found, {} generated, {} already present",
            stats.participles_found,
            stats.forms_generated,
            stats.duplicates_skipped
        );
        Ok(stats)
    })
}
