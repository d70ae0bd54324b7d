//! Regular inflection rules.
//!
//! Italian past participles agree in gender and number with a fixed
//! -o/-a/-i/-e ending. Irregularity lives in the stem (fare → fatto), never in
//! the ending, so the other three forms follow from the masculine singular.
//!
//! Feminine nouns in -a and -e form their plural the same regular way, with
//! the usual spelling adjustments for -ca/-ga and -cia/-gia.

use crate::grammar::{Gender, Number};

/// One generated form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedForm {
    pub stressed: String,
    pub gender: Gender,
    pub number: Number,
}

/// Endings of the four participle slots, masculine singular first
pub const PARTICIPLE_ENDINGS: [(char, Gender, Number); 4] = [
    ('o', Gender::Masculine, Number::Singular),
    ('a', Gender::Feminine, Number::Singular),
    ('i', Gender::Masculine, Number::Plural),
    ('e', Gender::Feminine, Number::Plural),
];

/// Stem of an agreeing participle form, or `None` if the ending is not one of
/// the four participle endings
pub fn participle_stem(stressed: &str) -> Option<&str> {
    let last = stressed.chars().last()?;
    if PARTICIPLE_ENDINGS.iter().any(|(ending, _, _)| *ending == last) {
        Some(&stressed[..stressed.len() - last.len_utf8()])
    } else {
        None
    }
}

/// Derive the feminine singular, masculine plural and feminine plural of a
/// masculine singular past participle.
///
/// Returns an empty list when the base does not end in `o` (clitic forms and
/// other oddities).
///
/// ```
/// use italian_lexicon::derivation::participle_forms;
/// let forms = participle_forms("parlàto");
/// let spelled: Vec<_> = forms.iter().map(|f| f.stressed.as_str()).collect();
/// assert_eq!(spelled, vec!["parlàta", "parlàti", "parlàte"]);
/// ```
pub fn participle_forms(base_stressed: &str) -> Vec<DerivedForm> {
    let stem = match base_stressed.strip_suffix('o') {
        Some(stem) => stem,
        None => return Vec::new(),
    };
    PARTICIPLE_ENDINGS[1..]
        .iter()
        .map(|(ending, gender, number)| DerivedForm {
            stressed: format!("{}{}", stem, ending),
            gender: *gender,
            number: *number,
        })
        .collect()
}

const VOWELS: &str = "aeiouàèéìòóù";

/// How a feminine singular noun forms its plural
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FemininePlural {
    /// -a → -e, -e → -i (amìca → amìche, pittrìce → pittrìci)
    Regular(String),
    /// Same spelling in both numbers: accented final vowel, consonant or -i
    /// ending (città, star, crìsi)
    Invariable,
    /// Ends in -o, which a feminine noun of a gendered pair never does
    Suspect,
}

/// Regular feminine plural of a feminine singular stressed form.
///
/// ```
/// use italian_lexicon::derivation::{feminine_plural, FemininePlural};
/// assert_eq!(feminine_plural("amìca"), FemininePlural::Regular("amìche".into()));
/// assert_eq!(feminine_plural("arància"), FemininePlural::Regular("arànce".into()));
/// assert_eq!(feminine_plural("città"), FemininePlural::Invariable);
/// ```
pub fn feminine_plural(stressed: &str) -> FemininePlural {
    let Some(last) = stressed.chars().last() else {
        return FemininePlural::Invariable;
    };
    let stem = &stressed[..stressed.len() - last.len_utf8()];
    match last {
        'a' => {
            if let Some(before_i) = stem.strip_suffix('i') {
                // unstressed i of -cia/-gia drops after a consonant
                if let Some(onset) = before_i.strip_suffix(['c', 'g']) {
                    let after_consonant = onset.chars().last().map_or(false, |c| !VOWELS.contains(c));
                    if after_consonant {
                        return FemininePlural::Regular(format!("{}e", before_i));
                    }
                }
                return FemininePlural::Regular(format!("{}e", stem));
            }
            if stem.ends_with(['c', 'g']) {
                FemininePlural::Regular(format!("{}he", stem))
            } else {
                FemininePlural::Regular(format!("{}e", stem))
            }
        }
        'e' => FemininePlural::Regular(format!("{}i", stem)),
        'o' => FemininePlural::Suspect,
        _ => FemininePlural::Invariable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_and_irregular_stems() {
        let fatto = participle_forms("fàtto");
        assert_eq!(fatto.len(), 3);
        assert_eq!(fatto[0].stressed, "fàtta");
        assert_eq!(fatto[0].gender, Gender::Feminine);
        assert_eq!(fatto[2].stressed, "fàtte");
        assert_eq!(fatto[2].number, Number::Plural);
    }

    #[test]
    fn test_non_o_base_yields_nothing() {
        assert!(participle_forms("parlàtosi").is_empty());
        assert!(participle_forms("detta").is_empty());
        assert!(participle_forms("").is_empty());
    }

    #[test]
    fn test_stem_is_shared_by_all_four_forms() {
        let base = "scrìtto";
        let stem = participle_stem(base).unwrap();
        for form in participle_forms(base) {
            assert_eq!(participle_stem(&form.stressed), Some(stem));
        }
        assert_eq!(participle_stem("città"), None);
    }

    #[test]
    fn test_feminine_plurals() {
        let regular = |s: &str| match feminine_plural(s) {
            FemininePlural::Regular(p) => p,
            other => panic!("{} gave {:?}", s, other),
        };
        assert_eq!(regular("camerièra"), "camerière");
        assert_eq!(regular("amìca"), "amìche");
        assert_eq!(regular("collèga"), "collèghe");
        assert_eq!(regular("camìcia"), "camìcie");
        assert_eq!(regular("arància"), "arànce");
        assert_eq!(regular("farmacìa"), "farmacìe");
        assert_eq!(regular("pittrìce"), "pittrìci");
        assert_eq!(regular("studentéssa"), "studentésse");
        assert_eq!(feminine_plural("star"), FemininePlural::Invariable);
        assert_eq!(feminine_plural("crìsi"), FemininePlural::Invariable);
        assert_eq!(feminine_plural("maèstro"), FemininePlural::Suspect);
        assert_eq!(feminine_plural(""), FemininePlural::Invariable);
    }
}
