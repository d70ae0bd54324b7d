//! In-memory lexicon store with JSON persistence.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::grammar::PartOfSpeech;
use crate::model::{
    AdjectiveForm, AdjectiveMetadata, Definition, FormId, FormRecord, Frequency, Lemma, LemmaId,
    NounForm, NounMetadata, VerbForm, VerbMetadata,
};

/// Directory name under the platform data directory
const APP_DIR: &str = "italian-lexicon";
const STORE_FILE: &str = "lexicon.json";

/// Default store location (`~/.local/share/italian-lexicon/lexicon.json` on Linux)
pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR).join(STORE_FILE))
}

/// Rows of one form table plus the uniqueness and per-lemma indexes over them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormTable<F> {
    rows: Vec<F>,
    next_id: FormId,
    #[serde(skip)]
    keys: HashSet<String>,
    /// lemma → row positions, in insertion order
    #[serde(skip)]
    by_lemma: HashMap<LemmaId, Vec<usize>>,
}

impl<F> Default for FormTable<F> {
    fn default() -> Self {
        FormTable {
            rows: Vec::new(),
            next_id: 1,
            keys: HashSet::new(),
            by_lemma: HashMap::new(),
        }
    }
}

impl<F: FormRecord> FormTable<F> {
    /// Insert a form, assigning its id. Returns `None` if an identical form
    /// already exists for the lemma.
    pub fn insert(&mut self, mut form: F) -> Option<FormId> {
        let key = form.unique_key();
        if !self.keys.insert(key) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        form.set_id(id);
        self.by_lemma
            .entry(form.lemma_id())
            .or_default()
            .push(self.rows.len());
        self.rows.push(form);
        Some(id)
    }

    /// Check whether an identical form already exists
    pub fn contains(&self, form: &F) -> bool {
        self.keys.contains(&form.unique_key())
    }

    pub fn rows(&self) -> &[F] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &F> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Forms of one lemma, in insertion order
    pub fn for_lemma(&self, lemma_id: LemmaId) -> impl Iterator<Item = &F> {
        let positions = self.by_lemma.get(&lemma_id).map(Vec::as_slice).unwrap_or(&[]);
        positions.iter().map(move |&i| &self.rows[i])
    }

    /// Mutate rows in place. The indexes are rebuilt afterwards.
    pub fn modify<R>(&mut self, f: impl FnOnce(&mut [F]) -> R) -> R {
        let result = f(&mut self.rows);
        self.rebuild_index();
        result
    }

    /// Keep only rows matching `keep`, returning how many were removed
    pub fn retain(&mut self, keep: impl FnMut(&F) -> bool) -> usize {
        let before = self.rows.len();
        self.rows.retain(keep);
        self.rebuild_index();
        before - self.rows.len()
    }

    pub fn rebuild_index(&mut self) {
        self.keys = self.rows.iter().map(FormRecord::unique_key).collect();
        self.by_lemma.clear();
        for (i, form) in self.rows.iter().enumerate() {
            self.by_lemma.entry(form.lemma_id()).or_default().push(i);
        }
    }
}

/// Row counts per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub lemmas: usize,
    pub verb_forms: usize,
    pub noun_forms: usize,
    pub adjective_forms: usize,
    pub definitions: usize,
    pub frequencies: usize,
}

impl StoreCounts {
    pub fn forms(&self) -> usize {
        self.verb_forms + self.noun_forms + self.adjective_forms
    }
}

/// The lexicon database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconStore {
    next_lemma_id: LemmaId,
    lemmas: BTreeMap<LemmaId, Lemma>,
    pub verb_forms: FormTable<VerbForm>,
    pub noun_forms: FormTable<NounForm>,
    pub adjective_forms: FormTable<AdjectiveForm>,
    definitions: Vec<Definition>,
    frequencies: Vec<Frequency>,
    pub verb_metadata: BTreeMap<LemmaId, VerbMetadata>,
    pub noun_metadata: BTreeMap<LemmaId, NounMetadata>,
    pub adjective_metadata: BTreeMap<LemmaId, AdjectiveMetadata>,
    /// stressed headword → lemma, per part of speech
    #[serde(skip)]
    by_stressed: HashMap<PartOfSpeech, HashMap<String, LemmaId>>,
    /// normalized headword → lemmas in id order, per part of speech
    #[serde(skip)]
    by_normalized: HashMap<PartOfSpeech, HashMap<String, Vec<LemmaId>>>,
    /// (lemma, corpus) → position in `frequencies`
    #[serde(skip)]
    frequency_index: HashMap<(LemmaId, String), usize>,
}

impl Default for LexiconStore {
    fn default() -> Self {
        LexiconStore {
            next_lemma_id: 1,
            lemmas: BTreeMap::new(),
            verb_forms: FormTable::default(),
            noun_forms: FormTable::default(),
            adjective_forms: FormTable::default(),
            definitions: Vec::new(),
            frequencies: Vec::new(),
            verb_metadata: BTreeMap::new(),
            noun_metadata: BTreeMap::new(),
            adjective_metadata: BTreeMap::new(),
            by_stressed: HashMap::new(),
            by_normalized: HashMap::new(),
            frequency_index: HashMap::new(),
        }
    }
}

impl LexiconStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut store: LexiconStore = serde_json::from_str(&content)?;
        store.rebuild_indexes();
        log::debug!("Loaded store from {}", path.display());
        Ok(store)
    }

    /// Load the store at `path`, or start empty if the file does not exist
    pub fn open_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            log::info!("No store at {}, starting empty", path.display());
            Ok(Self::default())
        }
    }

    /// Write the store as JSON. The file is replaced atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string(self)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        log::debug!("Saved store to {}", path.display());
        Ok(())
    }

    /// Run `pass` against the store. If it fails, the store is restored to
    /// its state before the call.
    pub fn transaction<T>(&mut self, pass: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        match pass(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                log::warn!("Pass failed, restoring store: {}", err);
                *self = snapshot;
                Err(err)
            }
        }
    }

    pub fn rebuild_indexes(&mut self) {
        self.by_stressed.clear();
        self.by_normalized.clear();
        for lemma in self.lemmas.values() {
            self.by_stressed
                .entry(lemma.pos)
                .or_default()
                .insert(lemma.stressed.clone(), lemma.id);
            self.by_normalized
                .entry(lemma.pos)
                .or_default()
                .entry(lemma.normalized.clone())
                .or_default()
                .push(lemma.id);
        }
        self.rebuild_frequency_index();
        self.verb_forms.rebuild_index();
        self.noun_forms.rebuild_index();
        self.adjective_forms.rebuild_index();
    }

    fn rebuild_frequency_index(&mut self) {
        self.frequency_index = self
            .frequencies
            .iter()
            .enumerate()
            .map(|(i, f)| ((f.lemma_id, f.corpus.clone()), i))
            .collect();
    }

    // ------------------------------------------------------------------
    // Lemmas
    // ------------------------------------------------------------------

    /// Insert a lemma, assigning its id. Returns `None` if a lemma with the
    /// same part of speech and stressed form exists.
    pub fn insert_lemma(&mut self, mut lemma: Lemma) -> Option<LemmaId> {
        let stressed = self.by_stressed.entry(lemma.pos).or_default();
        if stressed.contains_key(&lemma.stressed) {
            return None;
        }
        let id = self.next_lemma_id;
        self.next_lemma_id += 1;
        lemma.id = id;
        stressed.insert(lemma.stressed.clone(), id);
        self.by_normalized
            .entry(lemma.pos)
            .or_default()
            .entry(lemma.normalized.clone())
            .or_default()
            .push(id);
        self.lemmas.insert(id, lemma);
        Some(id)
    }

    pub fn lemma(&self, id: LemmaId) -> Option<&Lemma> {
        self.lemmas.get(&id)
    }

    pub fn lemma_mut(&mut self, id: LemmaId) -> Option<&mut Lemma> {
        self.lemmas.get_mut(&id)
    }

    pub fn lemmas(&self) -> impl Iterator<Item = &Lemma> {
        self.lemmas.values()
    }

    pub fn lemmas_of(&self, pos: PartOfSpeech) -> impl Iterator<Item = &Lemma> {
        self.lemmas.values().filter(move |l| l.pos == pos)
    }

    /// Mutable access to the lemmas of one part of speech. The headword
    /// fields are indexed: change `stressed` through [`restress_lemma`]
    /// and never change `normalized`.
    ///
    /// [`restress_lemma`]: LexiconStore::restress_lemma
    pub fn lemmas_of_mut(&mut self, pos: PartOfSpeech) -> impl Iterator<Item = &mut Lemma> {
        self.lemmas.values_mut().filter(move |l| l.pos == pos)
    }

    pub fn lemma_ids(&self, pos: PartOfSpeech) -> HashSet<LemmaId> {
        self.lemmas_of(pos).map(|l| l.id).collect()
    }

    pub fn lemma_count(&self, pos: PartOfSpeech) -> usize {
        self.lemmas_of(pos).count()
    }

    /// First lemma (lowest id) with the given normalized headword
    pub fn find_lemma(&self, pos: PartOfSpeech, normalized: &str) -> Option<&Lemma> {
        let id = self.by_normalized.get(&pos)?.get(normalized)?.first()?;
        self.lemmas.get(id)
    }

    pub fn find_lemma_by_stressed(&self, pos: PartOfSpeech, stressed: &str) -> Option<&Lemma> {
        let id = self.by_stressed.get(&pos)?.get(stressed)?;
        self.lemmas.get(id)
    }

    /// Replace the stressed form of a lemma, keeping the uniqueness index in
    /// sync. Returns false if the new form would collide.
    pub fn restress_lemma(&mut self, id: LemmaId, stressed: &str) -> bool {
        let Some(lemma) = self.lemmas.get(&id) else {
            return false;
        };
        if lemma.stressed == stressed {
            return true;
        }
        let keys = self.by_stressed.entry(lemma.pos).or_default();
        if keys.contains_key(stressed) {
            return false;
        }
        keys.remove(&lemma.stressed);
        keys.insert(stressed.to_string(), id);
        if let Some(lemma) = self.lemmas.get_mut(&id) {
            lemma.stressed = stressed.to_string();
        }
        true
    }

    // ------------------------------------------------------------------
    // Definitions and frequencies
    // ------------------------------------------------------------------

    pub fn add_definition(&mut self, definition: Definition) {
        self.definitions.push(definition);
    }

    pub fn definitions(&self) -> &[Definition] {
        &self.definitions
    }

    pub fn definitions_for(&self, lemma_id: LemmaId) -> impl Iterator<Item = &Definition> {
        self.definitions.iter().filter(move |d| d.lemma_id == lemma_id)
    }

    /// Insert or replace the frequency row for (lemma, corpus). Returns true
    /// if an existing row was replaced.
    pub fn upsert_frequency(&mut self, frequency: Frequency) -> bool {
        let key = (frequency.lemma_id, frequency.corpus.clone());
        match self.frequency_index.get(&key) {
            Some(&i) => {
                self.frequencies[i] = frequency;
                true
            }
            None => {
                self.frequency_index.insert(key, self.frequencies.len());
                self.frequencies.push(frequency);
                false
            }
        }
    }

    pub fn frequencies(&self) -> &[Frequency] {
        &self.frequencies
    }

    pub fn frequency(&self, lemma_id: LemmaId, corpus: &str) -> Option<&Frequency> {
        let i = self.frequency_index.get(&(lemma_id, corpus.to_string()))?;
        self.frequencies.get(*i)
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Delete every lemma of `pos` together with its forms, definitions,
    /// frequencies and metadata. Returns the number of lemmas removed.
    pub fn clear_pos(&mut self, pos: PartOfSpeech) -> usize {
        let ids = self.lemma_ids(pos);
        if ids.is_empty() {
            return 0;
        }

        match pos {
            PartOfSpeech::Verb => {
                self.verb_forms.retain(|f| !ids.contains(&f.lemma_id));
                self.verb_metadata.clear();
            }
            PartOfSpeech::Noun => {
                self.noun_forms.retain(|f| !ids.contains(&f.lemma_id));
                self.noun_metadata.clear();
            }
            PartOfSpeech::Adjective => {
                self.adjective_forms.retain(|f| !ids.contains(&f.lemma_id));
                self.adjective_metadata.clear();
            }
        }
        self.definitions.retain(|d| !ids.contains(&d.lemma_id));
        self.frequencies.retain(|f| !ids.contains(&f.lemma_id));
        self.rebuild_frequency_index();
        self.lemmas.retain(|id, _| !ids.contains(id));
        self.by_stressed.remove(&pos);
        self.by_normalized.remove(&pos);

        ids.len()
    }

    pub fn counts(&self) -> StoreCounts {
        StoreCounts {
            lemmas: self.lemmas.len(),
            verb_forms: self.verb_forms.len(),
            noun_forms: self.noun_forms.len(),
            adjective_forms: self.adjective_forms.len(),
            definitions: self.definitions.len(),
            frequencies: self.frequencies.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexiconError;
    use crate::grammar::{Gender, Mood, Number};

    fn store_with_lemma(pos: PartOfSpeech, word: &str) -> (LexiconStore, LemmaId) {
        let mut store = LexiconStore::new();
        let id = store
            .insert_lemma(Lemma::new(word.to_string(), word.to_string(), pos))
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_duplicate_lemma_is_rejected() {
        let (mut store, id) = store_with_lemma(PartOfSpeech::Noun, "casa");
        assert_eq!(id, 1);
        let dup = Lemma::new("casa".into(), "casa".into(), PartOfSpeech::Noun);
        assert_eq!(store.insert_lemma(dup), None);
        let other_pos = Lemma::new("casa".into(), "casa".into(), PartOfSpeech::Adjective);
        assert_eq!(store.insert_lemma(other_pos), Some(2));
    }

    #[test]
    fn test_duplicate_form_is_rejected() {
        let (mut store, id) = store_with_lemma(PartOfSpeech::Noun, "casa");
        let form = NounForm::new(id, "càsa", Gender::Feminine, Number::Singular);
        assert!(store.noun_forms.insert(form.clone()).is_some());
        assert!(store.noun_forms.insert(form).is_none());
        assert_eq!(store.noun_forms.len(), 1);
    }

    #[test]
    fn test_clear_pos_cascades() {
        let (mut store, verb) = store_with_lemma(PartOfSpeech::Verb, "parlare");
        let noun = store
            .insert_lemma(Lemma::new("casa".into(), "casa".into(), PartOfSpeech::Noun))
            .unwrap();
        store.verb_forms.insert(VerbForm::new(verb, "pàrlo", Mood::Indicative));
        store.noun_forms.insert(NounForm::new(noun, "càsa", Gender::Feminine, Number::Singular));
        store.verb_metadata.insert(verb, VerbMetadata::default());
        store.upsert_frequency(Frequency {
            lemma_id: verb,
            corpus: "itwac".into(),
            freq_raw: 10,
            freq_zipf: 1.0,
            corpus_version: "2.1.0".into(),
        });

        assert_eq!(store.clear_pos(PartOfSpeech::Verb), 1);
        assert_eq!(store.verb_forms.len(), 0);
        assert!(store.verb_metadata.is_empty());
        assert!(store.frequencies().is_empty());
        assert_eq!(store.noun_forms.len(), 1);
        assert_eq!(store.clear_pos(PartOfSpeech::Verb), 0);

        // the stressed form is free again
        let again = Lemma::new("parlare".into(), "parlare".into(), PartOfSpeech::Verb);
        assert!(store.insert_lemma(again).is_some());
    }

    #[test]
    fn test_upsert_frequency_replaces() {
        let (mut store, id) = store_with_lemma(PartOfSpeech::Noun, "casa");
        let mut row = Frequency {
            lemma_id: id,
            corpus: "itwac".into(),
            freq_raw: 5,
            freq_zipf: 0.5,
            corpus_version: "2.0.0".into(),
        };
        assert!(!store.upsert_frequency(row.clone()));
        row.freq_raw = 7;
        assert!(store.upsert_frequency(row));
        assert_eq!(store.frequencies().len(), 1);
        assert_eq!(store.frequency(id, "itwac").unwrap().freq_raw, 7);
    }

    #[test]
    fn test_transaction_rolls_back() {
        let (mut store, _) = store_with_lemma(PartOfSpeech::Noun, "casa");
        let result: Result<()> = store.transaction(|s| {
            s.insert_lemma(Lemma::new("cane".into(), "càne".into(), PartOfSpeech::Noun));
            Err(LexiconError::Config("boom".into()))
        });
        assert!(result.is_err());
        assert_eq!(store.counts().lemmas, 1);
        assert!(store.find_lemma(PartOfSpeech::Noun, "cane").is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lexicon.json");
        let (mut store, id) = store_with_lemma(PartOfSpeech::Adjective, "bello");
        store
            .adjective_forms
            .insert(AdjectiveForm::new(id, "bèllo", Gender::Masculine, Number::Singular));
        store.save(&path).unwrap();

        let mut loaded = LexiconStore::load(&path).unwrap();
        assert_eq!(loaded.counts(), store.counts());
        // indexes are rebuilt after load
        let dup = AdjectiveForm::new(id, "bèllo", Gender::Masculine, Number::Singular);
        assert!(loaded.adjective_forms.insert(dup).is_none());
        let lemma = Lemma::new("bello".into(), "bello".into(), PartOfSpeech::Adjective);
        assert!(loaded.insert_lemma(lemma).is_none());
    }

    #[test]
    fn test_lookups_follow_inserts_and_removals() {
        let mut store = LexiconStore::new();
        let anchor = store
            .insert_lemma(Lemma::new("ancora".into(), "àncora".into(), PartOfSpeech::Noun))
            .unwrap();
        let second = store
            .insert_lemma(Lemma::new("ancora".into(), "ancóra".into(), PartOfSpeech::Noun))
            .unwrap();
        assert_eq!(store.find_lemma(PartOfSpeech::Noun, "ancora").unwrap().id, anchor);
        assert_eq!(
            store.find_lemma_by_stressed(PartOfSpeech::Noun, "ancóra").unwrap().id,
            second
        );

        store.noun_forms.insert(NounForm::new(second, "ancóra", Gender::Feminine, Number::Singular));
        store.noun_forms.insert(NounForm::new(anchor, "àncora", Gender::Feminine, Number::Singular));
        store.noun_forms.insert(NounForm::new(anchor, "àncore", Gender::Feminine, Number::Plural));
        let forms: Vec<&str> = store
            .noun_forms
            .for_lemma(anchor)
            .map(|f| f.stressed.as_str())
            .collect();
        assert_eq!(forms, ["àncora", "àncore"]);

        store.noun_forms.retain(|f| f.stressed != "àncora");
        assert_eq!(store.noun_forms.for_lemma(anchor).count(), 1);
        assert_eq!(store.noun_forms.for_lemma(second).count(), 1);

        store.clear_pos(PartOfSpeech::Noun);
        assert!(store.find_lemma(PartOfSpeech::Noun, "ancora").is_none());
        assert!(store.find_lemma_by_stressed(PartOfSpeech::Noun, "àncora").is_none());
    }

    #[test]
    fn test_restress_lemma() {
        let (mut store, id) = store_with_lemma(PartOfSpeech::Noun, "dei");
        assert!(store.restress_lemma(id, "dèi"));
        assert_eq!(store.lemma(id).unwrap().stressed, "dèi");
        let plain = Lemma::new("dei".into(), "dei".into(), PartOfSpeech::Noun);
        assert!(store.insert_lemma(plain).is_some());
    }
}
