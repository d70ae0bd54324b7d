//! Corpus frequencies on the Zipf scale.
//!
//! The corpus is a CSV with a header row and at least the `lemma` and `Freq`
//! columns. Corpus lemmas are keyed by their derived written spelling, so
//! that accent marks in either source do not prevent a match.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::config::CorpusConfig;
use crate::error::{LexiconError, Result};
use crate::grammar::PartOfSpeech;
use crate::model::Frequency;
use crate::orthography::accent_count;
use crate::rules::Rules;
use crate::secondary::decode_text;
use crate::store::LexiconStore;

/// Zipf value of `freq` occurrences in a corpus of `corpus_size` words
pub fn zipf(freq: u64, corpus_size: f64) -> f64 {
    if freq == 0 || corpus_size <= 0.0 {
        return 0.0;
    }
    let per_million = freq as f64 * 1e6 / corpus_size;
    per_million.log10() + 3.0
}

/// Summed corpus counts keyed by lowercased written spelling
#[derive(Debug, Clone, Default)]
pub struct CorpusCounts {
    pub counts: HashMap<String, u64>,
    /// Lemmas with more than one accent, kept under their raw spelling
    pub multi_accent: usize,
    pub malformed_rows: usize,
}

impl CorpusCounts {
    /// Parse CSV text. A missing `lemma` or `Freq` column is an error;
    /// rows with a non-numeric frequency are counted and skipped.
    pub fn parse(text: &str, rules: &Rules) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();
        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LexiconError::Config(format!("frequency corpus has no {} column", name)))
        };
        let lemma_col = column("lemma")?;
        let freq_col = column("Freq")?;

        let mut corpus = CorpusCounts::default();
        for record in reader.records() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    log::debug!("Skipping corpus row: {}", e);
                    corpus.malformed_rows += 1;
                    continue;
                }
            };
            let lemma = record.get(lemma_col).unwrap_or("").trim();
            if lemma.is_empty() {
                continue;
            }
            let Ok(freq) = record.get(freq_col).unwrap_or("").trim().parse::<u64>() else {
                corpus.malformed_rows += 1;
                continue;
            };

            let key = if lemma.split_whitespace().any(|w| accent_count(w) > 1) {
                corpus.multi_accent += 1;
                lemma.to_string()
            } else {
                rules.derive_written(lemma).unwrap_or_else(|| lemma.to_string())
            };
            *corpus.counts.entry(key.to_lowercase()).or_default() += freq;
        }
        Ok(corpus)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Statistics of a frequency import
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrequencyStats {
    pub matched: usize,
    /// Lemmas with no corpus entry
    pub not_found: usize,
    pub multi_accent: usize,
    pub matched_freq: u64,
    pub total_corpus_freq: u64,
    /// Corpus entries that match no lemma
    pub unmatched_lemmas: usize,
    pub malformed_rows: usize,
    pub replaced: usize,
}

/// Read the corpus file of `pos` and attach frequencies to its lemmas
pub fn import_frequencies(
    store: &mut LexiconStore,
    pos: PartOfSpeech,
    path: &Path,
    corpus: &CorpusConfig,
    rules: &Rules,
) -> Result<FrequencyStats> {
    LexiconError::require_file(path)?;
    let text = decode_text(&fs::read(path)?);
    log::info!("Reading {} frequencies from {}", pos, path.display());
    import_frequency_text(store, pos, &text, corpus, rules)
}

/// Same as [`import_frequencies`] for CSV text already in memory
pub fn import_frequency_text(
    store: &mut LexiconStore,
    pos: PartOfSpeech,
    text: &str,
    corpus: &CorpusConfig,
    rules: &Rules,
) -> Result<FrequencyStats> {
    let counts = CorpusCounts::parse(text, rules)?;
    let version = corpus.version_for(pos).to_string();

    store.transaction(|store| {
        let mut stats = FrequencyStats {
            multi_accent: counts.multi_accent,
            malformed_rows: counts.malformed_rows,
            total_corpus_freq: counts.total(),
            ..Default::default()
        };

        let keys: Vec<(u64, String)> = store
            .lemmas_of(pos)
            .map(|l| {
                let key = rules
                    .derive_written(&l.stressed)
                    .unwrap_or_else(|| l.stressed.clone());
                (l.id, key.to_lowercase())
            })
            .collect();

        let mut used = HashSet::new();
        for (lemma_id, key) in keys {
            let Some(&freq) = counts.counts.get(&key) else {
                stats.not_found += 1;
                continue;
            };
            used.insert(key);
            let replaced = store.upsert_frequency(Frequency {
                lemma_id,
                corpus: corpus.name.clone(),
                freq_raw: freq,
                freq_zipf: zipf(freq, corpus.size_words),
                corpus_version: version.clone(),
            });
            if replaced {
                stats.replaced += 1;
            }
            stats.matched += 1;
            stats.matched_freq += freq;
        }
        stats.unmatched_lemmas = counts.counts.len() - used.len();

        log::info!(
            "Frequencies for {}: {} matched, {} not found, {} corpus lemmas unmatched",
            pos.plural(),
            stats.matched,
            stats.not_found,
            stats.unmatched_lemmas
        );
        if stats.multi_accent > 0 {
            log::warn!("{} corpus lemmas have more than one accent", stats.multi_accent);
        }
        Ok(stats)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Lemma;

    fn store(words: &[(&str, &str)]) -> LexiconStore {
        let mut store = LexiconStore::new();
        for (normalized, stressed) in words {
            store.insert_lemma(Lemma::new(
                normalized.to_string(),
                stressed.to_string(),
                PartOfSpeech::Noun,
            ));
        }
        store
    }

    #[test]
    fn test_zipf() {
        assert!((zipf(1_900_000, 1.9e9) - 6.0).abs() < 1e-9);
        assert!((zipf(1_900, 1.9e9) - 3.0).abs() < 1e-9);
        assert_eq!(zipf(0, 1.9e9), 0.0);
    }

    #[test]
    fn test_corpus_counts() {
        let rules = Rules::default();
        let csv = "lemma,Freq\ncasa,10\nCasa,5\ncittà,3\nàncóra,2\nlibro,abc\n,7\n";
        let corpus = CorpusCounts::parse(csv, &rules).unwrap();
        assert_eq!(corpus.counts.get("casa"), Some(&15));
        assert_eq!(corpus.counts.get("città"), Some(&3));
        assert_eq!(corpus.counts.get("àncóra"), Some(&2));
        assert_eq!(corpus.multi_accent, 1);
        assert_eq!(corpus.malformed_rows, 1);
        assert_eq!(corpus.total(), 20);
    }

    #[test]
    fn test_missing_column() {
        let err = CorpusCounts::parse("word,count\ncasa,1\n", &Rules::default());
        assert!(matches!(err, Err(LexiconError::Config(_))));
    }

    #[test]
    fn test_import_matches_stressed_lemmas() {
        let rules = Rules::default();
        let corpus = CorpusConfig::default();
        let mut store = store(&[("casa", "càsa"), ("citta", "città"), ("zzz", "zzz")]);
        let csv = "lemma,Freq,form\ncasa,1900000,case\ncittà,1900,città\ncane,4,cani\n";

        let stats =
            import_frequency_text(&mut store, PartOfSpeech::Noun, csv, &corpus, &rules).unwrap();
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.not_found, 1);
        assert_eq!(stats.unmatched_lemmas, 1);
        assert_eq!(stats.matched_freq, 1_901_900);
        assert_eq!(stats.total_corpus_freq, 1_901_904);

        let casa = store.find_lemma(PartOfSpeech::Noun, "casa").unwrap().id;
        let freq = store.frequency(casa, "itwac").unwrap();
        assert_eq!(freq.freq_raw, 1_900_000);
        assert!((freq.freq_zipf - 6.0).abs() < 1e-9);
        assert_eq!(freq.corpus_version, "2.0.0");

        let again =
            import_frequency_text(&mut store, PartOfSpeech::Noun, csv, &corpus, &rules).unwrap();
        assert_eq!(again.replaced, 2);
        assert_eq!(store.frequencies().len(), 2);
    }
}
