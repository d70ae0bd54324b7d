//! Exception tables shared by the passes.
//!
//! All tables are immutable once built and are handed to the passes through
//! [`Rules`], so tests can swap any of them for a smaller one.

use std::collections::{HashMap, HashSet};

use crate::articles::ArticleSelector;
use crate::grammar::{DegreeRelationship, Gender, Number, PartOfSpeech};
use crate::orthography::Orthography;

/// Irregular comparatives and superlatives: (word, base, relationship)
static IRREGULAR_DEGREES: &[(&str, &str, DegreeRelationship)] = &[
    ("migliore", "buono", DegreeRelationship::ComparativeOf),
    ("ottimo", "buono", DegreeRelationship::SuperlativeOf),
    ("peggiore", "cattivo", DegreeRelationship::ComparativeOf),
    ("pessimo", "cattivo", DegreeRelationship::SuperlativeOf),
    ("maggiore", "grande", DegreeRelationship::ComparativeOf),
    ("massimo", "grande", DegreeRelationship::SuperlativeOf),
    ("minore", "piccolo", DegreeRelationship::ComparativeOf),
    ("minimo", "piccolo", DegreeRelationship::SuperlativeOf),
    ("superiore", "alto", DegreeRelationship::ComparativeOf),
    ("supremo", "alto", DegreeRelationship::SuperlativeOf),
    ("inferiore", "basso", DegreeRelationship::ComparativeOf),
    ("infimo", "basso", DegreeRelationship::SuperlativeOf),
];

/// Truncated forms that the dictionary does not list as alt-of entries
static HARDCODED_ALLOMORPHS: &[(PartOfSpeech, &str, &str, Gender, Number, &str)] = &[
    (PartOfSpeech::Adjective, "san", "santo", Gender::Masculine, Number::Singular, "apocopic"),
    (PartOfSpeech::Noun, "fra", "frate", Gender::Masculine, Number::Singular, "apocopic"),
    (PartOfSpeech::Noun, "suor", "suora", Gender::Feminine, Number::Singular, "apocopic"),
];

/// Feminine singulars whose plural the regular rule gets wrong
static FEMININE_PLURAL_BLOCKLIST: &[&str] = &["ala", "arma", "specie"];

/// A comparative or superlative and its base adjective
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegreeLink {
    pub base: String,
    pub relationship: DegreeRelationship,
}

/// Lookup of irregular degree forms keyed by normalized spelling
#[derive(Debug, Clone)]
pub struct DegreeTable {
    links: HashMap<String, DegreeLink>,
}

impl Default for DegreeTable {
    fn default() -> Self {
        DegreeTable::new(
            IRREGULAR_DEGREES
                .iter()
                .map(|(word, base, rel)| (word.to_string(), base.to_string(), *rel)),
        )
    }
}

impl DegreeTable {
    pub fn new(entries: impl IntoIterator<Item = (String, String, DegreeRelationship)>) -> Self {
        let links = entries
            .into_iter()
            .map(|(word, base, relationship)| (word, DegreeLink { base, relationship }))
            .collect();
        DegreeTable { links }
    }

    pub fn get(&self, normalized: &str) -> Option<&DegreeLink> {
        self.links.get(normalized)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// One hardcoded allomorph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allomorph {
    pub pos: PartOfSpeech,
    pub form: String,
    /// Normalized spelling of the parent lemma
    pub parent: String,
    pub gender: Gender,
    pub number: Number,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct AllomorphTable {
    entries: Vec<Allomorph>,
}

impl Default for AllomorphTable {
    fn default() -> Self {
        AllomorphTable::new(HARDCODED_ALLOMORPHS.iter().map(
            |(pos, form, parent, gender, number, label)| Allomorph {
                pos: *pos,
                form: form.to_string(),
                parent: parent.to_string(),
                gender: *gender,
                number: *number,
                label: label.to_string(),
            },
        ))
    }
}

impl AllomorphTable {
    pub fn new(entries: impl IntoIterator<Item = Allomorph>) -> Self {
        AllomorphTable {
            entries: entries.into_iter().collect(),
        }
    }

    /// Allomorphs belonging to one part of speech
    pub fn for_pos(&self, pos: PartOfSpeech) -> impl Iterator<Item = &Allomorph> {
        self.entries.iter().filter(move |a| a.pos == pos)
    }
}

/// Normalized words a pass must leave alone
#[derive(Debug, Clone)]
pub struct Blocklist {
    words: HashSet<String>,
}

impl Blocklist {
    pub fn new(words: impl IntoIterator<Item = String>) -> Self {
        Blocklist {
            words: words.into_iter().collect(),
        }
    }

    pub fn contains(&self, normalized: &str) -> bool {
        self.words.contains(normalized)
    }
}

impl Default for Blocklist {
    fn default() -> Self {
        Blocklist::new(FEMININE_PLURAL_BLOCKLIST.iter().map(|w| w.to_string()))
    }
}

/// Bundle of every exception table a pass may consult
#[derive(Debug, Default)]
pub struct Rules {
    pub orthography: Orthography,
    pub articles: ArticleSelector,
    pub degrees: DegreeTable,
    pub allomorphs: AllomorphTable,
    /// Feminine singulars that get no synthesized plural
    pub feminine_plurals: Blocklist,
}

impl Rules {
    /// Derive a written form with this bundle's orthography
    pub fn derive_written(&self, stressed: &str) -> Option<String> {
        self.orthography.derive_written(stressed)
    }
}
