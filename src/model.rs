//! Row types of the lexicon store.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::articles::DefiniteArticle;
use crate::grammar::{
    Auxiliary, Degree, DegreeRelationship, DegreeSource, DerivationType, FormOrigin, Gender,
    GenderClass, InflectionClass, Mood, Number, NumberClass, PartOfSpeech, Tense, Transitivity,
    WrittenSource,
};

pub type LemmaId = u64;
pub type FormId = u64;

/// A dictionary headword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lemma {
    pub id: LemmaId,
    /// Accent-stripped lowercase headword
    pub normalized: String,
    /// Citation form with stress marks
    pub stressed: String,
    pub written: Option<String>,
    pub written_source: Option<WrittenSource>,
    pub pos: PartOfSpeech,
    pub ipa: Option<String>,
}

impl Lemma {
    pub fn new(normalized: String, stressed: String, pos: PartOfSpeech) -> Self {
        Lemma {
            id: 0,
            normalized,
            stressed,
            written: None,
            written_source: None,
            pos,
            ipa: None,
        }
    }
}

/// Behaviour shared by the three form tables
pub trait FormRecord: Clone + std::fmt::Debug + Serialize + DeserializeOwned {
    fn id(&self) -> FormId;
    fn set_id(&mut self, id: FormId);
    fn lemma_id(&self) -> LemmaId;
    fn set_lemma_id(&mut self, lemma_id: LemmaId);
    fn stressed(&self) -> &str;
    fn written(&self) -> Option<&str>;
    fn written_source(&self) -> Option<WrittenSource>;
    fn set_written(&mut self, written: String, source: WrittenSource);
    fn labels(&self) -> Option<&str>;
    fn set_labels(&mut self, labels: Option<String>);
    fn form_origin(&self) -> FormOrigin;
    fn is_citation_form(&self) -> bool;
    fn set_citation_form(&mut self, value: bool);
    fn gender(&self) -> Option<Gender>;
    fn number(&self) -> Option<Number>;

    /// Grammatical features that distinguish two forms of the same lemma
    fn feature_key(&self) -> String;

    /// Key enforcing per-lemma uniqueness
    fn unique_key(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.lemma_id(),
            self.stressed(),
            self.feature_key(),
            self.labels().unwrap_or("")
        )
    }
}

macro_rules! impl_form_record {
    ($ty:ty, |$f:ident| $key:expr) => {
        impl FormRecord for $ty {
            fn id(&self) -> FormId {
                self.id
            }
            fn set_id(&mut self, id: FormId) {
                self.id = id;
            }
            fn lemma_id(&self) -> LemmaId {
                self.lemma_id
            }
            fn set_lemma_id(&mut self, lemma_id: LemmaId) {
                self.lemma_id = lemma_id;
            }
            fn stressed(&self) -> &str {
                &self.stressed
            }
            fn written(&self) -> Option<&str> {
                self.written.as_deref()
            }
            fn written_source(&self) -> Option<WrittenSource> {
                self.written_source
            }
            fn set_written(&mut self, written: String, source: WrittenSource) {
                self.written = Some(written);
                self.written_source = Some(source);
            }
            fn labels(&self) -> Option<&str> {
                self.labels.as_deref()
            }
            fn set_labels(&mut self, labels: Option<String>) {
                self.labels = labels;
            }
            fn form_origin(&self) -> FormOrigin {
                self.form_origin
            }
            fn is_citation_form(&self) -> bool {
                self.is_citation_form
            }
            fn set_citation_form(&mut self, value: bool) {
                self.is_citation_form = value;
            }
            fn gender(&self) -> Option<Gender> {
                self.gender
            }
            fn number(&self) -> Option<Number> {
                self.number
            }
            fn feature_key(&self) -> String {
                let $f = self;
                $key
            }
        }
    };
}

fn opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// A conjugated verb form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerbForm {
    pub id: FormId,
    pub lemma_id: LemmaId,
    pub stressed: String,
    pub written: Option<String>,
    pub written_source: Option<WrittenSource>,
    pub mood: Mood,
    pub tense: Option<Tense>,
    pub person: Option<u8>,
    pub number: Option<Number>,
    /// Participles only
    pub gender: Option<Gender>,
    pub is_formal: bool,
    pub is_negative: bool,
    pub labels: Option<String>,
    pub form_origin: FormOrigin,
    pub is_citation_form: bool,
}

impl VerbForm {
    pub fn new(lemma_id: LemmaId, stressed: impl Into<String>, mood: Mood) -> Self {
        VerbForm {
            id: 0,
            lemma_id,
            stressed: stressed.into(),
            written: None,
            written_source: None,
            mood,
            tense: None,
            person: None,
            number: None,
            gender: None,
            is_formal: false,
            is_negative: false,
            labels: None,
            form_origin: FormOrigin::Observed,
            is_citation_form: false,
        }
    }
}

impl_form_record!(VerbForm, |f| format!(
    "{}|{}|{}|{}|{}|{}|{}",
    f.mood,
    opt(&f.tense),
    opt(&f.person),
    opt(&f.number),
    opt(&f.gender),
    f.is_formal,
    f.is_negative
));

/// An inflected noun form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NounForm {
    pub id: FormId,
    pub lemma_id: LemmaId,
    pub stressed: String,
    pub written: Option<String>,
    pub written_source: Option<WrittenSource>,
    pub gender: Option<Gender>,
    pub number: Option<Number>,
    pub labels: Option<String>,
    pub derivation_type: Option<DerivationType>,
    pub meaning_hint: Option<String>,
    pub definite_article: Option<DefiniteArticle>,
    pub article_source: Option<String>,
    pub form_origin: FormOrigin,
    pub is_citation_form: bool,
}

impl NounForm {
    pub fn new(lemma_id: LemmaId, stressed: impl Into<String>, gender: Gender, number: Number) -> Self {
        NounForm {
            id: 0,
            lemma_id,
            stressed: stressed.into(),
            written: None,
            written_source: None,
            gender: Some(gender),
            number: Some(number),
            labels: None,
            derivation_type: None,
            meaning_hint: None,
            definite_article: None,
            article_source: None,
            form_origin: FormOrigin::Observed,
            is_citation_form: false,
        }
    }
}

impl_form_record!(NounForm, |f| format!(
    "{}|{}|{}|{}",
    opt(&f.gender),
    opt(&f.number),
    opt(&f.derivation_type),
    f.meaning_hint.as_deref().unwrap_or("")
));

/// An inflected adjective form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjectiveForm {
    pub id: FormId,
    pub lemma_id: LemmaId,
    pub stressed: String,
    pub written: Option<String>,
    pub written_source: Option<WrittenSource>,
    pub gender: Option<Gender>,
    pub number: Option<Number>,
    pub degree: Degree,
    pub labels: Option<String>,
    pub definite_article: Option<DefiniteArticle>,
    pub article_source: Option<String>,
    pub form_origin: FormOrigin,
    pub is_citation_form: bool,
}

impl AdjectiveForm {
    pub fn new(lemma_id: LemmaId, stressed: impl Into<String>, gender: Gender, number: Number) -> Self {
        AdjectiveForm {
            id: 0,
            lemma_id,
            stressed: stressed.into(),
            written: None,
            written_source: None,
            gender: Some(gender),
            number: Some(number),
            degree: Degree::Positive,
            labels: None,
            definite_article: None,
            article_source: None,
            form_origin: FormOrigin::Observed,
            is_citation_form: false,
        }
    }
}

impl_form_record!(AdjectiveForm, |f| format!(
    "{}|{}|{}",
    opt(&f.gender),
    opt(&f.number),
    f.degree
));

/// One sense gloss of a lemma
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Definition {
    pub lemma_id: LemmaId,
    pub gloss: String,
    pub tags: Option<Vec<String>>,
    pub meaning_hint: Option<String>,
    /// Set when the sense applies to one gender only
    pub form_gender: Option<Gender>,
    /// Set when the sense applies to one number only
    pub form_number: Option<Number>,
}

/// Corpus frequency of a lemma
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frequency {
    pub lemma_id: LemmaId,
    pub corpus: String,
    pub freq_raw: u64,
    pub freq_zipf: f64,
    pub corpus_version: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VerbMetadata {
    pub auxiliary: Option<Auxiliary>,
    pub transitivity: Option<Transitivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NounMetadata {
    pub gender_class: GenderClass,
    pub number_class: NumberClass,
    /// Opposite-gender lemma of a common-gender-variable noun
    pub counterpart_lemma_id: Option<LemmaId>,
    /// Lemma this noun is a diminutive/augmentative/pejorative of
    pub base_lemma_id: Option<LemmaId>,
    pub derivation_type: Option<DerivationType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjectiveMetadata {
    pub inflection_class: InflectionClass,
    pub base_lemma_id: Option<LemmaId>,
    pub degree_relationship: Option<DegreeRelationship>,
    pub degree_relationship_source: Option<DegreeSource>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_key_includes_labels() {
        let mut a = NounForm::new(1, "càsa", Gender::Feminine, Number::Singular);
        let b = a.clone();
        assert_eq!(a.unique_key(), b.unique_key());
        a.set_labels(Some("archaic".to_string()));
        assert_ne!(a.unique_key(), b.unique_key());
    }

    #[test]
    fn test_set_written_records_source() {
        let mut form = VerbForm::new(3, "pàrlo", Mood::Indicative);
        assert_eq!(form.written(), None);
        form.set_written("parlo".to_string(), WrittenSource::Secondary);
        assert_eq!(form.written(), Some("parlo"));
        assert_eq!(form.written_source(), Some(WrittenSource::Secondary));
    }

    #[test]
    fn test_feature_key_distinguishes_person() {
        let mut first = VerbForm::new(1, "pàrla", Mood::Indicative);
        first.person = Some(3);
        let mut second = first.clone();
        second.mood = Mood::Imperative;
        second.person = Some(2);
        assert_ne!(first.feature_key(), second.feature_key());
    }

    #[test]
    fn test_serde_keeps_article_spelling() {
        let mut form = AdjectiveForm::new(1, "àlto", Gender::Masculine, Number::Singular);
        form.definite_article = Some(DefiniteArticle::Elided);
        let json = serde_json::to_string(&form).unwrap();
        assert!(json.contains("\"l'\""));
        let back: AdjectiveForm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, form);
    }
}
