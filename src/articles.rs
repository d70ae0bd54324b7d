//! Article selection.
//!
//! The article a noun or adjective takes depends on its gender, number and
//! initial sounds. The sounds are approximated by spelling patterns, with an
//! exception table for loanwords whose pronunciation differs from their
//! spelling.

use lru::LruCache;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Mutex;

use crate::grammar::{Gender, Number};

static EXCEPTIONS_TSV: &str = include_str!("data/article_exceptions.tsv");

/// z-, s+consonant, gn-, ps-, pn-, x-, y-, i+vowel
static LO_TRIGGERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([zZ]|[sS][bcdfgklmnpqrstvwxzBCDFGKLMNPQRSTVWXZ]|[gG][nN]|[pP][sSnN]|[xX]|[yY]|[iI][aeiouàèéìòóùAEIOUÀÈÉÌÒÓÙ])",
    )
    .expect("valid lo-trigger pattern")
});

static VOWEL_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[aeiouàèéìòóùAEIOUÀÈÉÌÒÓÙ]").expect("valid vowel pattern"));

/// Source recorded for articles computed from the spelling rules
pub const INFERRED: &str = "inferred";

/// Selections kept before the least recently used one is evicted
const CACHE_CAPACITY: usize = 10_000;

/// The initial-sound class that drives article choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    Vowel,
    Lo,
    Consonant,
    /// Fixed "gli" regardless of the rules (gli dèi)
    Gli,
}

impl Pattern {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "vowel" => Some(Pattern::Vowel),
            "lo" => Some(Pattern::Lo),
            "consonant" => Some(Pattern::Consonant),
            "gli" => Some(Pattern::Gli),
            _ => None,
        }
    }
}

macro_rules! article_enum {
    ($name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

article_enum!(DefiniteArticle {
    Il => "il",
    Lo => "lo",
    La => "la",
    Elided => "l'",
    I => "i",
    Gli => "gli",
    Le => "le",
});

article_enum!(IndefiniteArticle {
    Un => "un",
    Uno => "uno",
    Una => "una",
    UnElided => "un'",
});

article_enum!(PartitiveArticle {
    Del => "del",
    Dello => "dello",
    Dell => "dell'",
    Della => "della",
    Dei => "dei",
    Degli => "degli",
    Delle => "delle",
});

impl DefiniteArticle {
    /// The indefinite counterpart, `None` for plural articles
    pub fn indefinite(&self, gender: Gender) -> Option<IndefiniteArticle> {
        use DefiniteArticle::*;
        match (self, gender) {
            (I | Gli | Le, _) => None,
            (Il, Gender::Masculine) | (Elided, Gender::Masculine) => Some(IndefiniteArticle::Un),
            (Lo, Gender::Masculine) => Some(IndefiniteArticle::Uno),
            (La, Gender::Feminine) => Some(IndefiniteArticle::Una),
            (Elided, Gender::Feminine) => Some(IndefiniteArticle::UnElided),
            _ => None,
        }
    }

    /// di + definite article
    pub fn partitive(&self) -> PartitiveArticle {
        match self {
            DefiniteArticle::Il => PartitiveArticle::Del,
            DefiniteArticle::Lo => PartitiveArticle::Dello,
            DefiniteArticle::Elided => PartitiveArticle::Dell,
            DefiniteArticle::La => PartitiveArticle::Della,
            DefiniteArticle::I => PartitiveArticle::Dei,
            DefiniteArticle::Gli => PartitiveArticle::Degli,
            DefiniteArticle::Le => PartitiveArticle::Delle,
        }
    }
}

/// Words whose article pattern is fixed, with the reason recorded as source
#[derive(Debug, Clone, Default)]
pub struct ArticleExceptions {
    entries: HashMap<String, (Pattern, String)>,
}

impl ArticleExceptions {
    /// Parse a `word<TAB>pattern<TAB>source` table. Comment lines start with `#`.
    pub fn from_tsv(content: &str) -> Self {
        let entries = content
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.starts_with('#'))
            .filter_map(|line| {
                let mut fields = line.split('\t');
                let word = fields.next()?.trim().to_lowercase();
                let pattern = Pattern::parse(fields.next()?.trim())?;
                let source = fields.next()?.trim().to_string();
                Some((word, (pattern, source)))
            })
            .collect();
        ArticleExceptions { entries }
    }

    /// Add or replace an exception
    pub fn insert(&mut self, word: &str, pattern: Pattern, source: &str) {
        self.entries
            .insert(word.trim().to_lowercase(), (pattern, source.to_string()));
    }

    pub fn get(&self, word: &str) -> Option<&(Pattern, String)> {
        self.entries.get(&word.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A selected article with its provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<A> {
    pub article: A,
    pub source: String,
}

/// Memoizing article selector
#[derive(Debug)]
pub struct ArticleSelector {
    exceptions: ArticleExceptions,
    cache: Mutex<LruCache<(String, Gender, Number), Selection<DefiniteArticle>>>,
}

impl Default for ArticleSelector {
    fn default() -> Self {
        ArticleSelector::new(ArticleExceptions::from_tsv(EXCEPTIONS_TSV))
    }
}

impl ArticleSelector {
    pub fn new(exceptions: ArticleExceptions) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        ArticleSelector::with_cache_capacity(exceptions, capacity)
    }

    pub fn with_cache_capacity(exceptions: ArticleExceptions, capacity: NonZeroUsize) -> Self {
        ArticleSelector {
            exceptions,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn exceptions(&self) -> &ArticleExceptions {
        &self.exceptions
    }

    /// Classify the initial sound of `word`
    pub fn pattern(&self, word: &str) -> (Pattern, String) {
        if let Some((pattern, source)) = self.exceptions.get(word) {
            return (*pattern, source.clone());
        }
        let pattern = if LO_TRIGGERS.is_match(word) {
            Pattern::Lo
        } else if VOWEL_START.is_match(word) {
            Pattern::Vowel
        } else {
            Pattern::Consonant
        };
        (pattern, INFERRED.to_string())
    }

    /// The definite article for `word`
    ///
    /// ```
    /// use italian_lexicon::articles::{ArticleSelector, DefiniteArticle};
    /// use italian_lexicon::grammar::{Gender, Number};
    /// let selector = ArticleSelector::default();
    /// let sel = selector.definite("studente", Gender::Masculine, Number::Singular);
    /// assert_eq!(sel.article, DefiniteArticle::Lo);
    /// ```
    pub fn definite(&self, word: &str, gender: Gender, number: Number) -> Selection<DefiniteArticle> {
        let key = (word.to_string(), gender, number);
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return hit.clone();
            }
        }

        let selection = self.compute_definite(word, gender, number);

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, selection.clone());
        }
        selection
    }

    fn compute_definite(&self, word: &str, gender: Gender, number: Number) -> Selection<DefiniteArticle> {
        let (pattern, source) = self.pattern(word);
        let article = match (pattern, gender, number) {
            (Pattern::Gli, _, _) => DefiniteArticle::Gli,
            (_, Gender::Feminine, Number::Plural) => DefiniteArticle::Le,
            (Pattern::Vowel, Gender::Feminine, Number::Singular) => DefiniteArticle::Elided,
            (_, Gender::Feminine, Number::Singular) => DefiniteArticle::La,
            (Pattern::Vowel | Pattern::Lo, Gender::Masculine, Number::Plural) => DefiniteArticle::Gli,
            (_, Gender::Masculine, Number::Plural) => DefiniteArticle::I,
            (Pattern::Vowel, Gender::Masculine, Number::Singular) => DefiniteArticle::Elided,
            (Pattern::Lo, Gender::Masculine, Number::Singular) => DefiniteArticle::Lo,
            (Pattern::Consonant, Gender::Masculine, Number::Singular) => DefiniteArticle::Il,
        };
        Selection { article, source }
    }

    /// The indefinite article, `None` for words used only in the plural
    pub fn indefinite(&self, word: &str, gender: Gender) -> Selection<Option<IndefiniteArticle>> {
        let def = self.definite(word, gender, Number::Singular);
        Selection {
            article: def.article.indefinite(gender),
            source: def.source,
        }
    }

    pub fn partitive(&self, word: &str, gender: Gender, number: Number) -> Selection<PartitiveArticle> {
        let def = self.definite(word, gender, number);
        Selection {
            article: def.article.partitive(),
            source: def.source,
        }
    }

    /// Number of memoized selections
    pub fn cached(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Gender::*;
    use Number::*;

    fn def(word: &str, gender: Gender, number: Number) -> &'static str {
        ArticleSelector::default()
            .definite(word, gender, number)
            .article
            .as_str()
    }

    #[test]
    fn test_masculine_singular() {
        assert_eq!(def("libro", Masculine, Singular), "il");
        assert_eq!(def("amico", Masculine, Singular), "l'");
        assert_eq!(def("zaino", Masculine, Singular), "lo");
        assert_eq!(def("psicologo", Masculine, Singular), "lo");
        assert_eq!(def("iato", Masculine, Singular), "lo");
        assert_eq!(def("yogurt", Masculine, Singular), "lo");
    }

    #[test]
    fn test_masculine_plural() {
        assert_eq!(def("libri", Masculine, Plural), "i");
        assert_eq!(def("amici", Masculine, Plural), "gli");
        assert_eq!(def("gnomi", Masculine, Plural), "gli");
    }

    #[test]
    fn test_feminine() {
        assert_eq!(def("casa", Feminine, Singular), "la");
        assert_eq!(def("amica", Feminine, Singular), "l'");
        assert_eq!(def("zebra", Feminine, Singular), "la");
        assert_eq!(def("amiche", Feminine, Plural), "le");
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(def("gnomo", Masculine, Singular), "lo");
        assert_eq!(def("sbaglio", Masculine, Singular), "lo");
        assert_eq!(def("sole", Masculine, Singular), "il");
        assert_eq!(def("Sbaglio", Masculine, Singular), "lo");
    }

    #[test]
    fn test_exceptions_and_sources() {
        let selector = ArticleSelector::default();
        let hotel = selector.definite("hotel", Masculine, Singular);
        assert_eq!(hotel.article, DefiniteArticle::Elided);
        assert_eq!(hotel.source, "exception:silent_h");

        let web = selector.definite("web", Masculine, Singular);
        assert_eq!(web.article, DefiniteArticle::Il);
        assert_eq!(web.source, "exception:w_consonant");

        let dei = selector.definite("dèi", Masculine, Plural);
        assert_eq!(dei.article, DefiniteArticle::Gli);
        assert_eq!(dei.source, "exception:historical");

        assert_eq!(selector.definite("libro", Masculine, Singular).source, INFERRED);
    }

    #[test]
    fn test_indefinite() {
        let selector = ArticleSelector::default();
        assert_eq!(selector.indefinite("libro", Masculine).article, Some(IndefiniteArticle::Un));
        assert_eq!(selector.indefinite("zaino", Masculine).article, Some(IndefiniteArticle::Uno));
        assert_eq!(selector.indefinite("amico", Masculine).article, Some(IndefiniteArticle::Un));
        assert_eq!(selector.indefinite("casa", Feminine).article, Some(IndefiniteArticle::Una));
        assert_eq!(selector.indefinite("amica", Feminine).article, Some(IndefiniteArticle::UnElided));
        assert_eq!(DefiniteArticle::Gli.indefinite(Masculine), None);
    }

    #[test]
    fn test_partitive_table() {
        let selector = ArticleSelector::default();
        assert_eq!(selector.partitive("pane", Masculine, Singular).article.as_str(), "del");
        assert_eq!(selector.partitive("zucchero", Masculine, Singular).article.as_str(), "dello");
        assert_eq!(selector.partitive("acqua", Feminine, Singular).article.as_str(), "dell'");
        assert_eq!(selector.partitive("amici", Masculine, Plural).article.as_str(), "degli");
        assert_eq!(selector.partitive("case", Feminine, Plural).article.as_str(), "delle");
    }

    #[test]
    fn test_injected_exceptions() {
        let mut exceptions = ArticleExceptions::default();
        exceptions.insert("Whisky", Pattern::Vowel, "exception:custom");
        let selector = ArticleSelector::new(exceptions);
        let sel = selector.definite("whisky", Masculine, Singular);
        assert_eq!(sel.article, DefiniteArticle::Elided);
        assert_eq!(sel.source, "exception:custom");
    }

    #[test]
    fn test_cache_is_populated() {
        let selector = ArticleSelector::default();
        selector.definite("libro", Masculine, Singular);
        selector.definite("libro", Masculine, Singular);
        assert_eq!(selector.cached(), 1);
        assert!(ArticleSelector::default().exceptions().len() >= 55);
    }

    #[test]
    fn test_cache_evicts_least_recently_used() {
        let capacity = NonZeroUsize::new(2).unwrap();
        let selector = ArticleSelector::with_cache_capacity(ArticleExceptions::default(), capacity);
        selector.definite("libro", Masculine, Singular);
        selector.definite("studente", Masculine, Singular);
        // touch libro so studente is the oldest entry
        selector.definite("libro", Masculine, Singular);
        selector.definite("amico", Masculine, Singular);
        assert_eq!(selector.cached(), 2);

        let cache = selector.cache.lock().unwrap();
        assert!(cache.contains(&("libro".to_string(), Masculine, Singular)));
        assert!(!cache.contains(&("studente".to_string(), Masculine, Singular)));
    }
}
