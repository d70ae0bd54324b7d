//! Written spelling from stressed spelling.
//!
//! Dictionary headwords carry pedagogical stress marks on every word
//! (`pàrlo`, `parlàre`). Standard written Italian keeps an accent only on
//! stressed final vowels of polysyllables and on a small set of monosyllables
//! that need it to stay distinct from a homograph. Everything else is stripped.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Embedded French loanword list
static LOANWORDS_TXT: &str = include_str!("data/loanwords.txt");

/// Characters that count as an Italian accent
pub const ACCENTED_CHARS: &str = "àèéìòóùÀÈÉÌÒÓÙ";

/// Accented characters allowed in final position
pub const ACCENTED_FINAL: &str = "àèéìòóù";

const VOWELS: &str = "aeiouAEIOU";

/// Monosyllables that keep their accent
pub static ACCENT_WHITELIST: &[&str] = &[
    "ciò", "ché", "dà", "dì", "è", "fé", "già", "giù", "là", "lì", "né", "piè", "più", "può",
    "scià", "sé", "sì", "tè",
];

/// Words that never take an accent (`qu` counts as one consonant)
pub static ACCENT_BLACKLIST: &[&str] = &["qua", "qui"];

static DEFAULT_ORTHOGRAPHY: Lazy<Orthography> = Lazy::new(Orthography::default);

/// Strip every diacritic and lowercase.
///
/// This is the lookup key used to match words across sources.
///
/// ```
/// use italian_lexicon::orthography::normalize;
/// assert_eq!(normalize("può"), "puo");
/// assert_eq!(normalize("Pàrlo"), "parlo");
/// ```
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Number of Italian accent characters in `word`
pub fn accent_count(word: &str) -> usize {
    word.chars().filter(|c| ACCENTED_CHARS.contains(*c)).count()
}

/// Check if `word` contains any Italian accent character
pub fn has_accent(word: &str) -> bool {
    word.chars().any(|c| ACCENTED_CHARS.contains(c))
}

/// Derive the written form with the built-in tables.
///
/// See [`Orthography::derive_written`].
pub fn derive_written(stressed: &str) -> Option<String> {
    DEFAULT_ORTHOGRAPHY.derive_written(stressed)
}

/// The orthography rule together with its exception tables
#[derive(Debug, Clone)]
pub struct Orthography {
    /// stressed → written for loanwords whose accents are orthographic
    loanwords: HashMap<String, String>,
    whitelist: HashSet<String>,
    blacklist: HashSet<String>,
}

impl Default for Orthography {
    fn default() -> Self {
        let loanwords = LOANWORDS_TXT
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|word| (word.to_string(), word.to_string()));
        Orthography::new(
            loanwords,
            ACCENT_WHITELIST.iter().map(|s| s.to_string()),
            ACCENT_BLACKLIST.iter().map(|s| s.to_string()),
        )
    }
}

impl Orthography {
    /// Build an orthography from explicit tables
    pub fn new(
        loanwords: impl IntoIterator<Item = (String, String)>,
        whitelist: impl IntoIterator<Item = String>,
        blacklist: impl IntoIterator<Item = String>,
    ) -> Self {
        Orthography {
            loanwords: loanwords.into_iter().collect(),
            whitelist: whitelist.into_iter().collect(),
            blacklist: blacklist.into_iter().collect(),
        }
    }

    /// Look up a loanword by its stressed spelling
    pub fn loanword(&self, stressed: &str) -> Option<&str> {
        self.loanwords.get(stressed).map(String::as_str)
    }

    /// Number of loanword entries
    pub fn loanword_count(&self) -> usize {
        self.loanwords.len()
    }

    /// Derive the written form of a stressed form.
    ///
    /// Multi-word input is derived word by word; if any word fails the
    /// whole phrase fails. Returns `None` for empty input and for words
    /// with more than one accent.
    ///
    /// ```
    /// use italian_lexicon::orthography::Orthography;
    /// let ortho = Orthography::default();
    /// assert_eq!(ortho.derive_written("pàrlo").as_deref(), Some("parlo"));
    /// assert_eq!(ortho.derive_written("parlò").as_deref(), Some("parlò"));
    /// assert_eq!(ortho.derive_written("fù").as_deref(), Some("fu"));
    /// assert_eq!(ortho.derive_written("volùto dìre").as_deref(), Some("voluto dire"));
    /// ```
    pub fn derive_written(&self, stressed: &str) -> Option<String> {
        if stressed.is_empty() {
            return None;
        }
        if !stressed.contains(' ') {
            return self.derive_word(stressed);
        }
        let words = stressed
            .split_whitespace()
            .map(|w| self.derive_word(w))
            .collect::<Option<Vec<_>>>()?;
        Some(words.join(" "))
    }

    fn derive_word(&self, word: &str) -> Option<String> {
        if word.is_empty() {
            return None;
        }
        if let Some(written) = self.loanword(word) {
            return Some(written.to_string());
        }

        match accent_count(word) {
            0 => return Some(word.to_string()),
            1 => {}
            _ => {
                log::warn!("Multiple accents in single word: {:?}", word);
                return None;
            }
        }

        let last = word.chars().last()?;
        if !ACCENTED_FINAL.contains(last) {
            return Some(normalize(word));
        }

        let normalized = normalize(word);
        if self.blacklist.contains(&normalized) {
            return Some(normalized);
        }
        if self.whitelist.contains(word) {
            return Some(word.to_string());
        }

        let stem = &word[..word.len() - last.len_utf8()];
        if stem.chars().any(|c| VOWELS.contains(c)) {
            Some(word.to_string())
        } else {
            Some(normalized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("città"), "citta");
        assert_eq!(normalize("Mangiare"), "mangiare");
        assert_eq!(normalize("perché"), "perche");
    }

    #[test]
    fn test_non_final_accent_stripped() {
        assert_eq!(derive_written("parlàre").as_deref(), Some("parlare"));
        assert_eq!(derive_written("bèlla").as_deref(), Some("bella"));
    }

    #[test]
    fn test_final_accent_on_polysyllable_kept() {
        assert_eq!(derive_written("città").as_deref(), Some("città"));
        assert_eq!(derive_written("perché").as_deref(), Some("perché"));
    }

    #[test]
    fn test_monosyllables() {
        assert_eq!(derive_written("più").as_deref(), Some("più"));
        assert_eq!(derive_written("è").as_deref(), Some("è"));
        assert_eq!(derive_written("blù").as_deref(), Some("blu"));
        assert_eq!(derive_written("trè").as_deref(), Some("tre"));
    }

    #[test]
    fn test_blacklist_beats_stem_vowel() {
        assert_eq!(derive_written("quà").as_deref(), Some("qua"));
        assert_eq!(derive_written("quì").as_deref(), Some("qui"));
    }

    #[test]
    fn test_multiple_accents_fail() {
        assert_eq!(derive_written("pàrlò"), None);
        assert_eq!(derive_written("parlàre dìcò"), None);
        assert_eq!(derive_written(""), None);
    }

    #[test]
    fn test_loanwords_bypass_rules() {
        assert_eq!(derive_written("décolleté").as_deref(), Some("décolleté"));
        assert_eq!(derive_written("rétro").as_deref(), Some("rétro"));
        assert_eq!(derive_written("à").as_deref(), Some("à"));
        assert_eq!(Orthography::default().loanword_count(), 40);
    }

    #[test]
    fn test_foreign_diacritics_ignored() {
        assert_eq!(derive_written("föhn").as_deref(), Some("föhn"));
    }

    #[test]
    fn test_custom_tables() {
        let ortho = Orthography::new(
            vec![("cafè".to_string(), "café".to_string())],
            Vec::new(),
            Vec::new(),
        );
        assert_eq!(ortho.derive_written("cafè").as_deref(), Some("café"));
        // without the whitelist, "è" has no stem vowel
        assert_eq!(ortho.derive_written("è").as_deref(), Some("e"));
    }
}
