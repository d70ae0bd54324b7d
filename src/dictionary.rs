//! Line-delimited JSON dictionary dump.
//!
//! One entry per line, each with a headword, a part of speech, a list of
//! tagged inflected forms, senses and head-template arguments. Unparseable
//! lines are skipped and counted; unknown fields are ignored.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor};
use std::path::PathBuf;

use crate::error::{LexiconError, Result};
use crate::grammar::PartOfSpeech;
use crate::orthography::{has_accent, normalize};
use crate::tags::{self, TagSet};

/// An inflected form listed by an entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawForm {
    pub form: String,
    pub tags: Vec<String>,
    /// Meaning this form is restricted to (bracci vs braccia)
    pub sense: Option<String>,
}

/// Reference to another headword
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WordRef {
    pub word: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSense {
    pub glosses: Vec<String>,
    pub tags: Vec<String>,
    pub form_of: Option<Vec<WordRef>>,
    pub alt_of: Option<Vec<WordRef>>,
    pub qualifier: Option<String>,
}

impl RawSense {
    pub fn tag_set(&self) -> TagSet<'_> {
        TagSet::new(&self.tags)
    }

    /// Words this sense names as its base, via form_of or alt_of
    pub fn referenced_words(&self) -> impl Iterator<Item = &str> {
        self.form_of
            .iter()
            .chain(self.alt_of.iter())
            .flatten()
            .map(|r| r.word.as_str())
            .filter(|w| !w.is_empty())
    }

    pub fn is_degree_sense(&self) -> bool {
        self.tag_set().has_any(&["comparative", "superlative"])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HeadTemplate {
    pub name: String,
    pub args: HashMap<String, serde_json::Value>,
    pub expansion: String,
}

impl HeadTemplate {
    /// Argument value as a string; numbers are stringified
    pub fn arg(&self, key: &str) -> Option<String> {
        match self.args.get(key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

/// A category is either a bare name or an object with a `name` field
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Name(String),
    Object {
        #[serde(default)]
        name: String,
    },
}

impl Category {
    pub fn name(&self) -> &str {
        match self {
            Category::Name(name) => name,
            Category::Object { name } => name,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Sound {
    pub ipa: Option<String>,
}

/// One dictionary entry
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DictionaryEntry {
    pub word: String,
    pub pos: String,
    pub forms: Vec<RawForm>,
    pub senses: Vec<RawSense>,
    pub head_templates: Vec<HeadTemplate>,
    pub categories: Vec<Category>,
    pub sounds: Vec<Sound>,
}

impl DictionaryEntry {
    pub fn is_pos(&self, pos: PartOfSpeech) -> bool {
        self.pos == pos.dictionary_tag()
    }

    /// Check if any sense points at another word as its base form
    pub fn has_form_of(&self) -> bool {
        self.senses.iter().any(|s| s.form_of.is_some())
    }

    pub fn has_alt_of(&self) -> bool {
        self.senses.iter().any(|s| s.alt_of.is_some())
    }

    /// Entry whose every sense is tagged as a misspelling
    pub fn is_misspelling(&self) -> bool {
        !self.senses.is_empty() && self.senses.iter().all(|s| s.tag_set().has("misspelling"))
    }

    /// A headword of `pos` rather than an inflected-form entry.
    ///
    /// Adjective senses that are form-of a base through a comparative or
    /// superlative relationship still make a lemma (migliore, ottimo).
    pub fn is_lemma_entry(&self, pos: PartOfSpeech) -> bool {
        if !self.is_pos(pos) {
            return false;
        }
        self.senses.iter().all(|s| {
            s.form_of.is_none() || (pos == PartOfSpeech::Adjective && s.is_degree_sense())
        })
    }

    /// Form-of entry of `pos` (not a lemma)
    pub fn is_form_of_entry(&self, pos: PartOfSpeech) -> bool {
        self.is_pos(pos) && !self.is_lemma_entry(pos)
    }

    /// Citation form with stress marks: the first canonical or infinitive
    /// form, falling back to the headword
    pub fn stressed(&self) -> &str {
        self.forms
            .iter()
            .find(|f| {
                !f.form.is_empty()
                    && f.tags.iter().any(|t| t == "canonical" || t == "infinitive")
            })
            .map(|f| f.form.as_str())
            .unwrap_or(&self.word)
    }

    pub fn ipa(&self) -> Option<&str> {
        self.sounds.iter().find_map(|s| s.ipa.as_deref())
    }

    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(Category::name)
    }

    /// Case-insensitive substring match over category names
    pub fn has_category(&self, fragment: &str) -> bool {
        let fragment = fragment.to_lowercase();
        self.category_names()
            .any(|c| c.to_lowercase().contains(&fragment))
    }

    /// First value of a head-template argument across templates
    pub fn head_arg(&self, key: &str) -> Option<String> {
        self.head_templates.iter().find_map(|t| t.arg(key))
    }

    /// Check if any head template has `key` set to a non-empty value
    pub fn has_head_arg(&self, key: &str) -> bool {
        self.head_arg(key).map_or(false, |v| !v.is_empty())
    }

    /// Check if any head-template argument value equals `value`
    pub fn has_head_value(&self, value: &str) -> bool {
        self.head_templates
            .iter()
            .flat_map(|t| t.args.values())
            .any(|v| v.as_str() == Some(value))
    }

    pub fn expansion_contains(&self, fragment: &str) -> bool {
        self.head_templates
            .iter()
            .any(|t| t.expansion.contains(fragment))
    }

    pub fn sense_tags(&self) -> impl Iterator<Item = &str> {
        self.senses.iter().flat_map(|s| s.tags.iter().map(String::as_str))
    }
}

/// Where the dictionary is read from
#[derive(Debug, Clone)]
pub enum DictionarySource {
    File(PathBuf),
    /// Inline JSONL, used by tests and small imports
    Memory(String),
}

impl DictionarySource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DictionarySource::File(path.into())
    }

    /// Build an in-memory source from already serialized lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut content = String::new();
        for line in lines {
            content.push_str(line.as_ref());
            content.push('\n');
        }
        DictionarySource::Memory(content)
    }

    /// Fail early if the source file is missing
    pub fn check(&self) -> Result<()> {
        match self {
            DictionarySource::File(path) => LexiconError::require_file(path),
            DictionarySource::Memory(_) => Ok(()),
        }
    }

    /// Stream the entries. The source can be opened any number of times.
    pub fn entries(&self) -> Result<EntryStream<Box<dyn BufRead + '_>>> {
        let reader: Box<dyn BufRead + '_> = match self {
            DictionarySource::File(path) => {
                LexiconError::require_file(path)?;
                Box::new(BufReader::new(File::open(path)?))
            }
            DictionarySource::Memory(content) => Box::new(Cursor::new(content.as_bytes())),
        };
        Ok(EntryStream::new(reader))
    }
}

/// Iterator over parsed entries with their 1-based line numbers
pub struct EntryStream<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
    malformed: usize,
}

impl<R: BufRead> EntryStream<R> {
    pub fn new(reader: R) -> Self {
        EntryStream {
            lines: reader.lines(),
            line_no: 0,
            malformed: 0,
        }
    }

    /// Lines that failed to parse so far
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Lines read so far
    pub fn lines_read(&self) -> usize {
        self.line_no
    }
}

impl<R: BufRead> Iterator for EntryStream<R> {
    type Item = Result<(usize, DictionaryEntry)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<DictionaryEntry>(trimmed) {
                Ok(entry) => return Some(Ok((self.line_no, entry))),
                Err(err) => {
                    log::debug!("Skipping malformed line {}: {}", self.line_no, err);
                    self.malformed += 1;
                }
            }
        }
    }
}

/// Labels a form-of sense attaches to an inflected form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormOfLabel {
    pub form: String,
    pub lemma: String,
    pub labels: String,
}

/// Cross-entry lookups gathered in one pass over the dictionary before any
/// lemma is built
#[derive(Debug, Clone, Default)]
pub struct DictionaryIndex {
    /// normalized lemma → its first plural (nouns)
    pub plurals: HashMap<String, String>,
    /// (normalized lemma, unaccented form) → accented alternative
    pub stressed_alternatives: HashMap<(String, String), String>,
    /// (normalized lemma, normalized form) → page title of the form-of entry
    pub form_of_spellings: HashMap<(String, String), String>,
    /// Labelled form-of senses
    pub form_of_labels: Vec<FormOfLabel>,
    /// Number of form-of entries seen
    pub form_of_entries: usize,
    pub malformed_lines: usize,
}

impl DictionaryIndex {
    /// Scan the dictionary for entries of `pos`
    pub fn build(source: &DictionarySource, pos: PartOfSpeech) -> Result<Self> {
        let mut index = DictionaryIndex::default();
        let mut stream = source.entries()?;
        for item in stream.by_ref() {
            let (_, entry) = item?;
            index.add(&entry, pos);
        }
        index.malformed_lines = stream.malformed();
        log::debug!(
            "Indexed {} form-of entries, {} plurals, {} stressed alternatives",
            index.form_of_entries,
            index.plurals.len(),
            index.stressed_alternatives.len()
        );
        Ok(index)
    }

    fn add(&mut self, entry: &DictionaryEntry, pos: PartOfSpeech) {
        if entry.word.is_empty() || !entry.is_pos(pos) {
            return;
        }
        if entry.is_lemma_entry(pos) {
            if pos == PartOfSpeech::Noun {
                self.add_plural(entry);
            }
            return;
        }
        if !entry.has_form_of() {
            return;
        }
        self.form_of_entries += 1;

        let word_key = normalize(&entry.word);
        let alternatives: Vec<&str> = entry
            .forms
            .iter()
            .filter(|f| {
                f.tags.iter().any(|t| t == "alternative")
                    && has_accent(&f.form)
                    && normalize(&f.form) == word_key
            })
            .map(|f| f.form.as_str())
            .collect();

        for sense in &entry.senses {
            let Some(refs) = &sense.form_of else { continue };
            let labels = sense.tag_set().labels();
            for lemma in refs.iter().map(|r| r.word.as_str()).filter(|w| !w.is_empty()) {
                let lemma_key = normalize(lemma);
                self.form_of_spellings
                    .entry((lemma_key.clone(), word_key.clone()))
                    .or_insert_with(|| entry.word.clone());
                if let Some(alt) = alternatives.first() {
                    if !has_accent(&entry.word) {
                        self.stressed_alternatives
                            .entry((lemma_key.clone(), entry.word.clone()))
                            .or_insert_with(|| alt.to_string());
                    }
                }
                if let Some(labels) = &labels {
                    self.form_of_labels.push(FormOfLabel {
                        form: entry.word.clone(),
                        lemma: lemma.to_string(),
                        labels: labels.clone(),
                    });
                }
            }
        }
    }

    fn add_plural(&mut self, entry: &DictionaryEntry) {
        let plural = entry.forms.iter().find(|f| {
            !f.form.is_empty()
                && f.tags.iter().any(|t| t == "plural")
                && !tags::should_filter(&f.tags)
        });
        if let Some(plural) = plural {
            self.plurals
                .entry(normalize(&entry.word))
                .or_insert_with(|| plural.form.clone());
        }
    }

    pub fn plural_of(&self, word: &str) -> Option<&str> {
        self.plurals.get(&normalize(word)).map(String::as_str)
    }

    /// Accented spelling of an unaccented form of `lemma_normalized`
    pub fn stressed_alternative(&self, lemma_normalized: &str, form: &str) -> Option<&str> {
        self.stressed_alternatives
            .get(&(lemma_normalized.to_string(), form.to_string()))
            .map(String::as_str)
    }

    pub fn form_of_spelling(&self, lemma_normalized: &str, form_normalized: &str) -> Option<&str> {
        self.form_of_spellings
            .get(&(lemma_normalized.to_string(), form_normalized.to_string()))
            .map(String::as_str)
    }
}
