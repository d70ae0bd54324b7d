//! Tag classification.
//!
//! The dictionary attaches a flat list of string tags to every form
//! (`["first-person", "indicative", "present", "singular"]`). This module
//! turns such a list into a feature record for one part of speech and decides
//! whether the form has to be dropped.

use std::collections::BTreeSet;

use crate::grammar::{Degree, DerivationType, Gender, Mood, Number, Tense};

/// Tags that disqualify a form outright
pub static FILTER_TAGS: &[&str] = &[
    "misspelling",
    "proscribed",
    "error-unknown-tag",
    "error-unrecognized-form",
];

/// Tags that mark table metadata rather than a real form
pub static SKIP_TAGS: &[&str] = &[
    "table-tags",
    "inflection-template",
    "canonical",
    "auxiliary",
    "form-of",
];

/// Usage-register tags recorded in `labels`
pub static LABEL_TAGS: &[&str] = &[
    "archaic",
    "literary",
    "regional",
    "dialectal",
    "poetic",
    "rare",
    "obsolete",
    "colloquial",
    "slang",
    "dated",
    "uncommon",
    "apocopic",
    "Tuscany",
    "Latinism",
];

static PERSON_TAGS: &[(&str, u8)] = &[
    ("first-person", 1),
    ("second-person", 2),
    ("third-person", 3),
];

/// Parsed features of a verb form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerbFeatures {
    pub mood: Option<Mood>,
    pub tense: Option<Tense>,
    pub person: Option<u8>,
    pub number: Option<Number>,
    /// Only participles carry gender
    pub gender: Option<Gender>,
    pub is_formal: bool,
    pub is_negative: bool,
    pub labels: Option<String>,
    pub should_filter: bool,
}

/// Parsed features of a noun form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NounFeatures {
    pub gender: Option<Gender>,
    pub number: Option<Number>,
    pub derivation_type: Option<DerivationType>,
    pub labels: Option<String>,
    pub should_filter: bool,
}

/// Parsed features of an adjective form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjectiveFeatures {
    pub gender: Option<Gender>,
    pub number: Option<Number>,
    pub degree: Degree,
    pub labels: Option<String>,
    pub should_filter: bool,
}

impl Default for AdjectiveFeatures {
    fn default() -> Self {
        AdjectiveFeatures {
            gender: None,
            number: None,
            degree: Degree::Positive,
            labels: None,
            should_filter: false,
        }
    }
}

/// A borrowed view over one form's tags with set-style lookups
#[derive(Debug, Clone, Copy)]
pub struct TagSet<'a> {
    tags: &'a [String],
}

impl<'a> TagSet<'a> {
    pub fn new(tags: &'a [String]) -> Self {
        TagSet { tags }
    }

    /// Check if `tag` is present
    pub fn has(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Check if any of `candidates` is present
    pub fn has_any(&self, candidates: &[&str]) -> bool {
        candidates.iter().any(|c| self.has(c))
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn gender(&self) -> Option<Gender> {
        if self.has("masculine") {
            Some(Gender::Masculine)
        } else if self.has("feminine") {
            Some(Gender::Feminine)
        } else {
            None
        }
    }

    pub fn number(&self) -> Option<Number> {
        if self.has("singular") {
            Some(Number::Singular)
        } else if self.has("plural") {
            Some(Number::Plural)
        } else {
            None
        }
    }

    pub fn person(&self) -> Option<u8> {
        PERSON_TAGS
            .iter()
            .find(|(tag, _)| self.has(tag))
            .map(|(_, person)| *person)
    }

    pub fn mood(&self) -> Option<Mood> {
        Mood::ALL.iter().copied().find(|m| self.has(m.as_str()))
    }

    /// Sorted, comma-joined usage labels, or `None` for an unmarked form
    pub fn labels(&self) -> Option<String> {
        let labels: BTreeSet<&str> = LABEL_TAGS
            .iter()
            .copied()
            .filter(|label| self.has(label))
            .collect();
        if labels.is_empty() {
            None
        } else {
            Some(labels.into_iter().collect::<Vec<_>>().join(","))
        }
    }
}

/// Check whether a form must be dropped regardless of part of speech
pub fn should_filter(tags: &[String]) -> bool {
    let set = TagSet::new(tags);
    set.has_any(FILTER_TAGS) || (set.has("alternative") && set.has("misspelling"))
}

fn is_excluded(set: &TagSet<'_>) -> bool {
    should_filter(set.tags) || set.has_any(SKIP_TAGS)
}

/// Tense, with the passato remoto and participle rules applied
pub fn tense_of(set: &TagSet<'_>, mood: Option<Mood>) -> Option<Tense> {
    if matches!(mood, Some(Mood::Infinitive) | Some(Mood::Gerund)) {
        return None;
    }
    if set.has("past") {
        if set.has("historic") {
            return Some(Tense::Remote);
        }
        // a participle's "past" is part of the mood
        if mood == Some(Mood::Participle) {
            return None;
        }
        return Some(Tense::Past);
    }
    [Tense::Present, Tense::Imperfect, Tense::Future]
        .into_iter()
        .find(|t| set.has(t.as_str()))
}

/// Classify the tags of a verb form
pub fn classify_verb(tags: &[String]) -> VerbFeatures {
    let set = TagSet::new(tags);
    if is_excluded(&set) {
        return VerbFeatures {
            should_filter: true,
            ..Default::default()
        };
    }

    let mood = set.mood();
    let person = set.person();

    // The dictionary occasionally tags participles with a person
    if mood == Some(Mood::Participle) && person.is_some() {
        return VerbFeatures {
            should_filter: true,
            ..Default::default()
        };
    }

    VerbFeatures {
        mood,
        tense: tense_of(&set, mood),
        person,
        number: set.number(),
        gender: set.gender(),
        is_formal: set.has("formal"),
        is_negative: set.has("negative"),
        labels: set.labels(),
        should_filter: false,
    }
}

/// Classify the tags of a noun form
pub fn classify_noun(tags: &[String]) -> NounFeatures {
    let set = TagSet::new(tags);
    if is_excluded(&set) {
        return NounFeatures {
            should_filter: true,
            ..Default::default()
        };
    }

    let derivation_type = DerivationType::ALL
        .iter()
        .copied()
        .find(|d| set.has(d.as_str()));

    NounFeatures {
        gender: set.gender(),
        number: set.number(),
        derivation_type,
        labels: set.labels(),
        should_filter: false,
    }
}

/// Classify the tags of an adjective form
pub fn classify_adjective(tags: &[String]) -> AdjectiveFeatures {
    let set = TagSet::new(tags);
    if is_excluded(&set) {
        return AdjectiveFeatures {
            should_filter: true,
            ..Default::default()
        };
    }

    let degree = if set.has("superlative") {
        Degree::Superlative
    } else if set.has("comparative") {
        Degree::Comparative
    } else {
        Degree::Positive
    };

    AdjectiveFeatures {
        gender: set.gender(),
        number: set.number(),
        degree,
        labels: set.labels(),
        should_filter: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_present_indicative() {
        let f = classify_verb(&tags(&["first-person", "indicative", "present", "singular"]));
        assert_eq!(f.mood, Some(Mood::Indicative));
        assert_eq!(f.tense, Some(Tense::Present));
        assert_eq!(f.person, Some(1));
        assert_eq!(f.number, Some(Number::Singular));
        assert!(!f.should_filter);
    }

    #[test]
    fn test_passato_remoto() {
        let f = classify_verb(&tags(&["third-person", "indicative", "past", "historic", "plural"]));
        assert_eq!(f.tense, Some(Tense::Remote));
    }

    #[test]
    fn test_past_participle_has_no_tense() {
        let f = classify_verb(&tags(&["participle", "past", "masculine", "singular"]));
        assert_eq!(f.mood, Some(Mood::Participle));
        assert_eq!(f.tense, None);
        assert_eq!(f.gender, Some(Gender::Masculine));
    }

    #[test]
    fn test_participle_with_person_is_filtered() {
        let f = classify_verb(&tags(&["participle", "past", "first-person"]));
        assert!(f.should_filter);
    }

    #[test]
    fn test_infinitive_and_gerund_drop_tense() {
        let f = classify_verb(&tags(&["infinitive", "present"]));
        assert_eq!(f.tense, None);
        let g = classify_verb(&tags(&["gerund", "present"]));
        assert_eq!(g.mood, Some(Mood::Gerund));
        assert_eq!(g.tense, None);
    }

    #[test]
    fn test_labels_sorted_and_joined() {
        let f = classify_verb(&tags(&["literary", "indicative", "archaic", "present"]));
        assert_eq!(f.labels.as_deref(), Some("archaic,literary"));
        assert!(!f.should_filter);
    }

    #[test]
    fn test_filter_markers() {
        assert!(classify_noun(&tags(&["misspelling", "plural"])).should_filter);
        assert!(classify_noun(&tags(&["table-tags"])).should_filter);
        assert!(classify_adjective(&tags(&["error-unknown-tag"])).should_filter);
        assert!(classify_verb(&tags(&["auxiliary"])).should_filter);
    }

    #[test]
    fn test_formal_negative_flags() {
        let f = classify_verb(&tags(&["imperative", "second-person", "formal", "negative"]));
        assert!(f.is_formal);
        assert!(f.is_negative);
    }

    #[test]
    fn test_noun_derivation() {
        let f = classify_noun(&tags(&["diminutive", "singular"]));
        assert_eq!(f.derivation_type, Some(DerivationType::Diminutive));
        assert_eq!(f.number, Some(Number::Singular));
    }

    #[test]
    fn test_adjective_degree_priority() {
        let f = classify_adjective(&tags(&["comparative", "superlative", "feminine", "plural"]));
        assert_eq!(f.degree, Degree::Superlative);
        let g = classify_adjective(&tags(&["feminine"]));
        assert_eq!(g.degree, Degree::Positive);
        assert_eq!(g.number, None);
    }
}
