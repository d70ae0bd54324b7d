//! Per-part-of-speech behaviour of the dictionary import.
//!
//! Each part of speech has its own form table, its own tag interpretation and
//! its own gap-filling rules. [`PosStrategy`] captures those differences; the
//! builder is written once against it.

use serde::Serialize;
use std::collections::HashSet;
use std::ops::AddAssign;

use crate::dictionary::{DictionaryEntry, DictionaryIndex, RawForm};
use crate::grammar::{DegreeRelationship, DegreeSource, DerivationType, PartOfSpeech};
use crate::model::{AdjectiveMetadata, FormRecord, NounMetadata, VerbMetadata};
use crate::orthography::has_accent;
use crate::rules::Rules;
use crate::store::{FormTable, LexiconStore};
use crate::tags::SKIP_TAGS;

/// Shared read-only state while planning entries
pub struct PlanContext<'a> {
    pub rules: &'a Rules,
    pub index: &'a DictionaryIndex,
}

/// Why a lemma entry produced no lemma
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Noun with no determinable gender
    NoGender,
}

/// Metadata row for the new lemma
#[derive(Debug, Clone, PartialEq)]
pub enum LemmaMetadata {
    Verb(VerbMetadata),
    Noun(NounMetadata),
    Adjective(AdjectiveMetadata),
}

/// A reference to another lemma, resolved once all lemmas exist
#[derive(Debug, Clone, PartialEq)]
pub enum PendingLink {
    /// Opposite-gender noun (amico → amica)
    Counterpart(String),
    /// Base noun of a diminutive/augmentative/pejorative
    DerivedFrom {
        base: String,
        derivation: DerivationType,
    },
    /// Base adjective of a comparative/superlative
    Degree {
        base: String,
        relationship: DegreeRelationship,
        source: DegreeSource,
    },
}

/// Counters produced while planning one entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlanCounters {
    pub duplicate_forms: usize,
    pub inferred_infinitives: usize,
    pub stressed_alternatives: usize,
    pub counterpart_explicit: usize,
    pub counterpart_synthesized: usize,
    pub counterpart_plural_unknown: usize,
    pub counterpart_missing: usize,
}

impl AddAssign for PlanCounters {
    fn add_assign(&mut self, other: Self) {
        self.duplicate_forms += other.duplicate_forms;
        self.inferred_infinitives += other.inferred_infinitives;
        self.stressed_alternatives += other.stressed_alternatives;
        self.counterpart_explicit += other.counterpart_explicit;
        self.counterpart_synthesized += other.counterpart_synthesized;
        self.counterpart_plural_unknown += other.counterpart_plural_unknown;
        self.counterpart_missing += other.counterpart_missing;
    }
}

/// Everything needed to write one lemma
#[derive(Debug, Clone)]
pub struct EntryPlan<F> {
    /// Forms with `lemma_id` unset, exactly one marked as citation form
    pub forms: Vec<F>,
    pub metadata: LemmaMetadata,
    /// Forms dropped by the tag filter
    pub filtered: usize,
    pub counters: PlanCounters,
    pub links: Vec<PendingLink>,
}

/// Import behaviour of one part of speech
pub trait PosStrategy {
    type Form: FormRecord;

    fn pos(&self) -> PartOfSpeech;

    fn table<'s>(&self, store: &'s mut LexiconStore) -> &'s mut FormTable<Self::Form>;

    fn table_ref<'s>(&self, store: &'s LexiconStore) -> &'s FormTable<Self::Form>;

    /// Turn a lemma entry into forms and metadata
    fn plan_entry(
        &self,
        entry: &DictionaryEntry,
        lemma_stressed: &str,
        ctx: &PlanContext<'_>,
    ) -> Result<EntryPlan<Self::Form>, SkipReason>;
}

/// A source form after metadata stripping and deduplication
#[derive(Debug, Clone)]
pub struct CandidateForm {
    pub stressed: String,
    /// Tags with `canonical` removed
    pub tags: Vec<String>,
    pub was_canonical: bool,
    pub meaning_hint: Option<String>,
}

/// Walk an entry's forms, dropping metadata rows and repeats.
///
/// `keep_canonical` keeps canonical forms (with the tag stripped) instead of
/// dropping them. Returns the candidates and the number of repeats.
pub fn candidate_forms(
    entry: &DictionaryEntry,
    lemma_normalized: &str,
    keep_canonical: bool,
    ctx: &PlanContext<'_>,
    counters: &mut PlanCounters,
) -> Vec<CandidateForm> {
    let mut seen: HashSet<(String, Vec<String>)> = HashSet::new();
    let mut out = Vec::new();

    for raw in &entry.forms {
        if raw.form.is_empty() {
            continue;
        }
        let was_canonical = raw.tags.iter().any(|t| t == "canonical");
        if was_canonical && !keep_canonical {
            continue;
        }
        let tags: Vec<String> = raw
            .tags
            .iter()
            .filter(|t| t.as_str() != "canonical")
            .cloned()
            .collect();
        if tags.iter().any(|t| SKIP_TAGS.contains(&t.as_str())) {
            continue;
        }

        let mut sorted = raw.tags.clone();
        sorted.sort();
        if !seen.insert((raw.form.clone(), sorted)) {
            counters.duplicate_forms += 1;
            continue;
        }

        out.push(CandidateForm {
            stressed: upgrade_stress(raw, lemma_normalized, ctx, counters),
            tags,
            was_canonical,
            meaning_hint: raw.sense.clone(),
        });
    }
    out
}

/// Replace an unaccented form by the accented alternative a form-of entry
/// lists for it (dei → dèi)
fn upgrade_stress(
    raw: &RawForm,
    lemma_normalized: &str,
    ctx: &PlanContext<'_>,
    counters: &mut PlanCounters,
) -> String {
    if !has_accent(&raw.form) {
        if let Some(alt) = ctx.index.stressed_alternative(lemma_normalized, &raw.form) {
            counters.stressed_alternatives += 1;
            return alt.to_string();
        }
    }
    raw.form.clone()
}

/// Remove forms that share a uniqueness key, keeping the first
pub fn dedup_forms<F: FormRecord>(forms: Vec<F>, counters: &mut PlanCounters) -> Vec<F> {
    let mut keys = HashSet::new();
    let before = forms.len();
    let kept: Vec<F> = forms
        .into_iter()
        .filter(|f| keys.insert(f.unique_key()))
        .collect();
    counters.duplicate_forms += before - kept.len();
    kept
}

/// Flag exactly one form as the citation form: the first match of
/// `preferred`, else the first match of `fallback`, else the first form
pub fn mark_citation<F: FormRecord>(
    forms: &mut [F],
    preferred: impl Fn(&F) -> bool,
    fallback: impl Fn(&F) -> bool,
) {
    for form in forms.iter_mut() {
        form.set_citation_form(false);
    }
    let index = forms
        .iter()
        .position(|f| preferred(f))
        .or_else(|| forms.iter().position(|f| fallback(f)))
        .or(if forms.is_empty() { None } else { Some(0) });
    if let Some(i) = index {
        forms[i].set_citation_form(true);
    }
}
