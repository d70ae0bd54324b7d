//! Secondary morphological lexicon.
//!
//! A tab-separated list of `form`, `lemma` and a tag string such as
//! `VER:ind+pres+1+s`, `NOUN-F:p` or `ADJ:pos+m+s`. Forms are written the way
//! Italian is normally spelled (no stress marks except on final vowels), so
//! the lexicon is the main source of the `written` spelling.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::error::{LexiconError, Result};
use crate::grammar::{Degree, FormOrigin, Gender, Number, PartOfSpeech, WrittenSource};
use crate::model::{AdjectiveForm, FormRecord, LemmaId};
use crate::orthography::{accent_count, derive_written, normalize};
use crate::progress::ProgressSink;
use crate::store::LexiconStore;

/// Decode a data file that may be UTF-8 or ISO-8859-1
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        // every Latin-1 byte is the code point of the same value
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// One line of the lexicon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondaryEntry {
    pub form: String,
    pub lemma: String,
    pub tags: String,
}

impl SecondaryEntry {
    /// Elided forms end in an apostrophe (bell', grand')
    pub fn is_elided(&self) -> bool {
        self.form.ends_with('\'')
    }

    /// Degree, gender and number of an `ADJ:` tag
    pub fn adjective_features(&self) -> Option<(Degree, Gender, Number)> {
        let rest = self.tags.strip_prefix("ADJ:")?;
        let mut parts = rest.split('+');
        let degree = match parts.next()? {
            "pos" => Degree::Positive,
            "comp" => Degree::Comparative,
            "sup" => Degree::Superlative,
            _ => return None,
        };
        let gender = match parts.next()? {
            "m" => Gender::Masculine,
            "f" => Gender::Feminine,
            _ => return None,
        };
        let number = match parts.next()? {
            "s" => Number::Singular,
            "p" => Number::Plural,
            _ => return None,
        };
        Some((degree, gender, number))
    }
}

/// Part of speech of a tag string
pub fn pos_of_tags(tags: &str) -> Option<PartOfSpeech> {
    if tags.starts_with("VER:") {
        Some(PartOfSpeech::Verb)
    } else if tags.starts_with("NOUN-") {
        Some(PartOfSpeech::Noun)
    } else if tags.starts_with("ADJ:") {
        Some(PartOfSpeech::Adjective)
    } else {
        None
    }
}

/// Lookups over the entries of one part of speech
#[derive(Debug, Clone, Default)]
pub struct PosIndex {
    entries: Vec<SecondaryEntry>,
    exact: HashSet<String>,
    /// Non-elided forms already in written orthography (their derived
    /// spelling is the form itself)
    written: HashSet<String>,
    /// normalized lemma → entry positions
    by_lemma: HashMap<String, Vec<usize>>,
}

impl PosIndex {
    fn add(&mut self, entry: SecondaryEntry) {
        let position = self.entries.len();
        self.exact.insert(entry.form.clone());
        if !entry.is_elided()
            && accent_count(&entry.form) <= 1
            && derive_written(&entry.form).as_deref() == Some(entry.form.as_str())
        {
            self.written.insert(entry.form.clone());
        }
        self.by_lemma
            .entry(normalize(&entry.lemma))
            .or_default()
            .push(position);
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The parsed lexicon, indexed per part of speech
#[derive(Debug, Clone, Default)]
pub struct SecondaryLexicon {
    indexes: HashMap<PartOfSpeech, PosIndex>,
    /// Lines with fewer than three fields
    pub short_lines: usize,
    /// Lines of other parts of speech
    pub other_lines: usize,
}

impl SecondaryLexicon {
    /// Read the lexicon file
    pub fn from_path(path: &Path) -> Result<Self> {
        LexiconError::require_file(path)?;
        let bytes = fs::read(path)?;
        let lexicon = Self::parse(&decode_text(&bytes));
        log::info!(
            "Loaded secondary lexicon: {} verb, {} noun, {} adjective entries",
            lexicon.len(PartOfSpeech::Verb),
            lexicon.len(PartOfSpeech::Noun),
            lexicon.len(PartOfSpeech::Adjective)
        );
        Ok(lexicon)
    }

    pub fn parse(content: &str) -> Self {
        let mut lexicon = SecondaryLexicon::default();
        for line in content.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 3 {
                lexicon.short_lines += 1;
                continue;
            }
            let Some(pos) = pos_of_tags(fields[2]) else {
                lexicon.other_lines += 1;
                continue;
            };
            lexicon.indexes.entry(pos).or_default().add(SecondaryEntry {
                form: fields[0].to_string(),
                lemma: fields[1].to_string(),
                tags: fields[2].to_string(),
            });
        }
        lexicon
    }

    pub fn index(&self, pos: PartOfSpeech) -> Option<&PosIndex> {
        self.indexes.get(&pos)
    }

    pub fn len(&self, pos: PartOfSpeech) -> usize {
        self.index(pos).map_or(0, PosIndex::len)
    }

    /// Check if `form` occurs verbatim
    pub fn contains_exact(&self, pos: PartOfSpeech, form: &str) -> bool {
        self.index(pos).map_or(false, |i| i.exact.contains(form))
    }

    /// The lexicon form spelled `written`, where `written` is the derived
    /// spelling of a stressed form
    pub fn written_match(&self, pos: PartOfSpeech, written: &str) -> Option<&str> {
        self.index(pos)?.written.get(written).map(String::as_str)
    }

    /// Entries whose lemma normalizes to `lemma_normalized`
    pub fn entries_for_lemma<'a>(
        &'a self,
        pos: PartOfSpeech,
        lemma_normalized: &str,
    ) -> impl Iterator<Item = &'a SecondaryEntry> + 'a {
        let index = self.index(pos);
        let positions = index
            .and_then(|i| i.by_lemma.get(lemma_normalized))
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        positions
            .iter()
            .filter_map(move |&p| index.map(|i| &i.entries[p]))
    }
}

/// Statistics of the adjective fill pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdjectiveFillStats {
    pub lemmas_checked: usize,
    pub lemmas_not_in_secondary: usize,
    pub forms_added: usize,
    pub elided_added: usize,
    pub already_present: usize,
}

/// Add positive-degree adjective forms the secondary lexicon lists but the
/// dictionary did not.
///
/// A form counts as present when the lemma already has a positive form of the
/// same gender and number with the same accent-stripped spelling.
pub fn fill_missing_adjective_forms(
    store: &mut LexiconStore,
    lexicon: &SecondaryLexicon,
    progress: &dyn ProgressSink,
) -> Result<AdjectiveFillStats> {
    store.transaction(|store| {
        let mut stats = AdjectiveFillStats::default();
        let lemmas: Vec<(LemmaId, String)> = store
            .lemmas_of(PartOfSpeech::Adjective)
            .map(|l| (l.id, l.normalized.clone()))
            .collect();
        let total = lemmas.len();

        for (i, (lemma_id, normalized)) in lemmas.into_iter().enumerate() {
            stats.lemmas_checked += 1;
            let mut present: HashSet<(Gender, Number, String)> = store
                .adjective_forms
                .for_lemma(lemma_id)
                .filter(|f| f.degree == Degree::Positive)
                .filter_map(|f| Some((f.gender?, f.number?, normalize(&f.stressed))))
                .collect();

            let mut seen_any = false;
            for entry in lexicon.entries_for_lemma(PartOfSpeech::Adjective, &normalized) {
                seen_any = true;
                let Some((Degree::Positive, gender, number)) = entry.adjective_features() else {
                    continue;
                };
                if !present.insert((gender, number, normalize(&entry.form))) {
                    stats.already_present += 1;
                    continue;
                }

                let mut form = AdjectiveForm::new(lemma_id, entry.form.clone(), gender, number);
                form.set_written(entry.form.clone(), WrittenSource::Secondary);
                form.form_origin = FormOrigin::SecondarySource;
                if entry.is_elided() {
                    form.labels = Some("elided".to_string());
                }
                if store.adjective_forms.insert(form).is_some() {
                    stats.forms_added += 1;
                    if entry.is_elided() {
                        stats.elided_added += 1;
                    }
                } else {
                    stats.already_present += 1;
                }
            }
            if !seen_any {
                stats.lemmas_not_in_secondary += 1;
            }
            if (i + 1) % 10_000 == 0 {
                progress.update("adjective fill", i + 1, total);
            }
        }
        progress.finish("adjective fill", total);

        log::info!(
            "Adjective fill: {} forms added ({} elided) over {} lemmas",
            stats.forms_added,
            stats.elided_added,
            stats.lemmas_checked
        );
        Ok(stats)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Lemma;
    use crate::progress::NullProgress;

    const SAMPLE: &str = "parlo\tparlare\tVER:ind+pres+1+s\n\
                          parla\tparlare\tVER:ind+pres+3+s\n\
                          città\tcittà\tNOUN-F:s\n\
                          bello\tbello\tADJ:pos+m+s\n\
                          bell'\tbello\tADJ:pos+m+s\n\
                          bella\tbello\tADJ:pos+f+s\n\
                          bellissimo\tbello\tADJ:sup+m+s\n\
                          e\te\tCON\n\
                          broken line\n";

    #[test]
    fn test_parse_indexes_per_pos() {
        let lex = SecondaryLexicon::parse(SAMPLE);
        assert_eq!(lex.len(PartOfSpeech::Verb), 2);
        assert_eq!(lex.len(PartOfSpeech::Noun), 1);
        assert_eq!(lex.len(PartOfSpeech::Adjective), 4);
        assert_eq!(lex.short_lines, 1);
        assert_eq!(lex.other_lines, 1);
        assert!(lex.contains_exact(PartOfSpeech::Noun, "città"));
        assert!(!lex.contains_exact(PartOfSpeech::Verb, "città"));
        assert_eq!(lex.written_match(PartOfSpeech::Verb, "parlo"), Some("parlo"));
        assert_eq!(lex.written_match(PartOfSpeech::Verb, "parlò"), None);
        assert_eq!(lex.entries_for_lemma(PartOfSpeech::Adjective, "bello").count(), 4);
        assert_eq!(lex.entries_for_lemma(PartOfSpeech::Adjective, "brutto").count(), 0);
    }

    #[test]
    fn test_written_match_keeps_final_accents_apart() {
        let lex = SecondaryLexicon::parse("papà\tpapà\tNOUN-M:s\ncantò\tcantare\tVER:ind+past+3+s\n");
        assert_eq!(lex.written_match(PartOfSpeech::Noun, "papà"), Some("papà"));
        assert_eq!(lex.written_match(PartOfSpeech::Noun, "papa"), None);
        assert_eq!(lex.written_match(PartOfSpeech::Verb, "canto"), None);
    }

    #[test]
    fn test_latin1_fallback() {
        let bytes = b"citt\xe0\tcitt\xe0\tNOUN-F:s\n";
        let text = decode_text(bytes);
        assert!(text.starts_with("città"));
        assert_eq!(decode_text("più".as_bytes()), "più");
    }

    #[test]
    fn test_adjective_features() {
        let entry = SecondaryEntry {
            form: "belle".into(),
            lemma: "bello".into(),
            tags: "ADJ:pos+f+p".into(),
        };
        assert_eq!(
            entry.adjective_features(),
            Some((Degree::Positive, Gender::Feminine, Number::Plural))
        );
    }

    #[test]
    fn test_fill_missing_adjective_forms() {
        let mut store = LexiconStore::new();
        let id = store
            .insert_lemma(Lemma::new("bello".into(), "bèllo".into(), PartOfSpeech::Adjective))
            .unwrap();
        store
            .adjective_forms
            .insert(AdjectiveForm::new(id, "bèllo", Gender::Masculine, Number::Singular));

        let lex = SecondaryLexicon::parse(SAMPLE);
        let stats = fill_missing_adjective_forms(&mut store, &lex, &NullProgress).unwrap();
        assert_eq!(stats.forms_added, 2);
        assert_eq!(stats.elided_added, 1);
        assert_eq!(stats.already_present, 1);

        let elided = store
            .adjective_forms
            .iter()
            .find(|f| f.stressed == "bell'")
            .unwrap();
        assert_eq!(elided.labels.as_deref(), Some("elided"));
        assert_eq!(elided.form_origin, FormOrigin::SecondarySource);
        assert_eq!(elided.written.as_deref(), Some("bell'"));

        let again = fill_missing_adjective_forms(&mut store, &lex, &NullProgress).unwrap();
        assert_eq!(again.forms_added, 0);
    }
}
