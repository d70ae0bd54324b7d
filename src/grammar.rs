//! Grammatical categories and provenance tags.
//!
//! Every enum here has a fixed string form, used both for serialization and
//! for the human-readable reports printed by the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LexiconError;

/// Declares a fieldless enum together with its string form.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $label)] $variant ),+
        }

        impl $name {
            /// All variants in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Convert to a string representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Parse the string representation produced by [`Self::as_str`]
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($label => Some($name::$variant),)+
                    _ => None,
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

labelled_enum! {
    /// The three parts of speech the database covers
    pub enum PartOfSpeech {
        Verb => "verb",
        Noun => "noun",
        Adjective => "adjective",
    }
}

impl PartOfSpeech {
    /// Plural name used in reports ("verbs")
    pub fn plural(&self) -> &'static str {
        match self {
            PartOfSpeech::Verb => "verbs",
            PartOfSpeech::Noun => "nouns",
            PartOfSpeech::Adjective => "adjectives",
        }
    }

    /// The abbreviation the dictionary dump uses in its `pos` field
    pub fn dictionary_tag(&self) -> &'static str {
        match self {
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Adjective => "adj",
        }
    }
}

impl FromStr for PartOfSpeech {
    type Err = LexiconError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verb" | "verbs" => Ok(PartOfSpeech::Verb),
            "noun" | "nouns" => Ok(PartOfSpeech::Noun),
            "adjective" | "adjectives" | "adj" => Ok(PartOfSpeech::Adjective),
            other => Err(LexiconError::UnsupportedPos(other.to_string())),
        }
    }
}

labelled_enum! {
    /// Grammatical gender
    pub enum Gender {
        Masculine => "masculine",
        Feminine => "feminine",
    }
}

impl Gender {
    /// The other gender
    pub fn opposite(&self) -> Gender {
        match self {
            Gender::Masculine => Gender::Feminine,
            Gender::Feminine => Gender::Masculine,
        }
    }

    /// One-letter code used by head-template arguments ("m"/"f")
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Masculine => "m",
            Gender::Feminine => "f",
        }
    }
}

labelled_enum! {
    /// Grammatical number
    pub enum Number {
        Singular => "singular",
        Plural => "plural",
    }
}

labelled_enum! {
    /// Verb mood, including the non-finite moods
    pub enum Mood {
        Indicative => "indicative",
        Subjunctive => "subjunctive",
        Conditional => "conditional",
        Imperative => "imperative",
        Infinitive => "infinitive",
        Participle => "participle",
        Gerund => "gerund",
    }
}

labelled_enum! {
    /// Verb tense. `Remote` is the passato remoto.
    pub enum Tense {
        Present => "present",
        Imperfect => "imperfect",
        Future => "future",
        Past => "past",
        Remote => "remote",
    }
}

labelled_enum! {
    /// Adjective degree
    pub enum Degree {
        Positive => "positive",
        Comparative => "comparative",
        Superlative => "superlative",
    }
}

labelled_enum! {
    /// Size/affect derivation of a noun
    pub enum DerivationType {
        Diminutive => "diminutive",
        Augmentative => "augmentative",
        Pejorative => "pejorative",
    }
}

labelled_enum! {
    /// How a noun's gender relates to its referent
    pub enum GenderClass {
        /// Masculine only (libro)
        Masculine => "m",
        /// Feminine only (casa)
        Feminine => "f",
        /// One set of forms serves both genders (cantante)
        CommonGenderFixed => "common_gender_fixed",
        /// Distinct forms per gender (amico/amica)
        CommonGenderVariable => "common_gender_variable",
    }
}

labelled_enum! {
    /// Which numbers a noun inflects for
    pub enum NumberClass {
        Standard => "standard",
        PluraliaTantum => "pluralia_tantum",
        SingulariaTantum => "singularia_tantum",
        Invariable => "invariable",
    }
}

labelled_enum! {
    /// Number of distinct gender/number spellings of an adjective
    pub enum InflectionClass {
        FourForm => "4-form",
        TwoForm => "2-form",
        Invariable => "invariable",
    }
}

labelled_enum! {
    /// Link from a comparative/superlative adjective to its base
    pub enum DegreeRelationship {
        ComparativeOf => "comparative_of",
        SuperlativeOf => "superlative_of",
    }
}

labelled_enum! {
    /// Where a degree relationship was found
    pub enum DegreeSource {
        Structured => "wiktextract",
        Gloss => "wiktextract:gloss",
        Hardcoded => "hardcoded",
    }
}

labelled_enum! {
    /// Auxiliary used in compound tenses
    pub enum Auxiliary {
        Avere => "avere",
        Essere => "essere",
        Both => "both",
    }
}

labelled_enum! {
    /// Verb transitivity collected from sense tags
    pub enum Transitivity {
        Transitive => "transitive",
        Intransitive => "intransitive",
        Both => "both",
    }
}

labelled_enum! {
    /// How a form's existence was established
    pub enum FormOrigin {
        /// Listed explicitly by the dictionary
        Observed => "wiktextract",
        /// Number inferred from a gender-only tag
        InferredSingular => "inferred:singular",
        /// Gender duplicated for a two-form adjective
        InferredTwoForm => "inferred:two_form",
        /// Base form synthesized from the headword
        InferredBaseForm => "inferred:base_form",
        /// Slot filled from the single form of an invariable word
        InferredInvariable => "inferred:invariable",
        /// Plural taken from the other-gender counterpart lemma
        InferredCounterpart => "inferred:counterpart",
        /// Generated by a regular morphological rule
        Derived => "derived",
        /// Imported from the secondary lexicon
        SecondarySource => "secondary_source",
        /// Apocopic or elided alternative form entry
        AltOf => "alt_of",
        /// From a hardcoded table
        Hardcoded => "hardcoded",
    }
}

labelled_enum! {
    /// Which resolver supplied a `written` value
    pub enum WrittenSource {
        SecondaryExact => "secondary_source:exact",
        Secondary => "secondary_source",
        LoanwordException => "exception:loanword",
        FormOf => "form_of",
        NoAccent => "fallback:no_accent",
        OrthographyRule => "derived:orthography_rule",
        LoanwordRule => "derived:loanword",
        CitationForm => "citation_form",
        AltOf => "alt_of",
        Hardcoded => "hardcoded",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_from_str() {
        assert_eq!("adj".parse::<PartOfSpeech>().unwrap(), PartOfSpeech::Adjective);
        assert_eq!("Nouns".parse::<PartOfSpeech>().unwrap(), PartOfSpeech::Noun);
        assert!(matches!(
            "adverb".parse::<PartOfSpeech>(),
            Err(LexiconError::UnsupportedPos(_))
        ));
    }

    #[test]
    fn test_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&InflectionClass::FourForm).unwrap();
        assert_eq!(json, "\"4-form\"");
        let back: WrittenSource = serde_json::from_str("\"fallback:no_accent\"").unwrap();
        assert_eq!(back, WrittenSource::NoAccent);
    }

    #[test]
    fn test_parse_and_display_agree() {
        for origin in FormOrigin::ALL {
            assert_eq!(FormOrigin::parse(&origin.to_string()), Some(*origin));
        }
        assert_eq!(GenderClass::parse("by_sense"), None);
    }

    #[test]
    fn test_dictionary_tag() {
        assert_eq!(PartOfSpeech::Adjective.dictionary_tag(), "adj");
        assert_eq!(Gender::Feminine.opposite(), Gender::Masculine);
    }
}
