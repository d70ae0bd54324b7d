//! Adjective import rules.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dictionary::DictionaryEntry;
use crate::grammar::{
    Degree, DegreeRelationship, DegreeSource, FormOrigin, Gender, InflectionClass, Number,
    PartOfSpeech,
};
use crate::model::{AdjectiveForm, AdjectiveMetadata};
use crate::orthography::normalize;
use crate::rules::Rules;
use crate::store::{FormTable, LexiconStore};
use crate::strategy::{
    candidate_forms, dedup_forms, mark_citation, EntryPlan, LemmaMetadata, PendingLink,
    PlanContext, PlanCounters, PosStrategy, SkipReason,
};
use crate::tags::classify_adjective;

static DEGREE_GLOSS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(comparative|superlative) of ([^\s,;:.()]+)").expect("Invalid regex")
});

const SLOTS: [(Gender, Number); 4] = [
    (Gender::Masculine, Number::Singular),
    (Gender::Feminine, Number::Singular),
    (Gender::Masculine, Number::Plural),
    (Gender::Feminine, Number::Plural),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct AdjectiveStrategy;

impl PosStrategy for AdjectiveStrategy {
    type Form = AdjectiveForm;

    fn pos(&self) -> PartOfSpeech {
        PartOfSpeech::Adjective
    }

    fn table<'s>(&self, store: &'s mut LexiconStore) -> &'s mut FormTable<AdjectiveForm> {
        &mut store.adjective_forms
    }

    fn table_ref<'s>(&self, store: &'s LexiconStore) -> &'s FormTable<AdjectiveForm> {
        &store.adjective_forms
    }

    fn plan_entry(
        &self,
        entry: &DictionaryEntry,
        lemma_stressed: &str,
        ctx: &PlanContext<'_>,
    ) -> std::result::Result<EntryPlan<AdjectiveForm>, SkipReason> {
        let mut counters = PlanCounters::default();
        let mut filtered = 0;
        let mut forms: Vec<AdjectiveForm> = Vec::new();
        let mut number_only: Vec<AdjectiveForm> = Vec::new();

        let lemma_key = normalize(&entry.word);
        for candidate in candidate_forms(entry, &lemma_key, true, ctx, &mut counters) {
            if candidate.was_canonical && candidate.tags.is_empty() {
                continue;
            }
            let features = classify_adjective(&candidate.tags);
            if features.should_filter {
                filtered += 1;
                continue;
            }

            let mut form =
                AdjectiveForm::new(0, candidate.stressed, Gender::Masculine, Number::Singular);
            form.gender = features.gender;
            form.number = features.number;
            form.degree = features.degree;
            form.labels = features.labels;

            match (features.gender, features.number) {
                (Some(_), Some(_)) => forms.push(form),
                (Some(_), None) => {
                    form.number = Some(Number::Singular);
                    form.form_origin = FormOrigin::InferredSingular;
                    forms.push(form);
                }
                (None, Some(_)) => number_only.push(form),
                (None, None) => filtered += 1,
            }
        }

        let class = inflection_class_of(entry, !number_only.is_empty());

        for form in number_only {
            for gender in [Gender::Masculine, Gender::Feminine] {
                let mut copy = form.clone();
                copy.gender = Some(gender);
                copy.form_origin = FormOrigin::InferredTwoForm;
                forms.push(copy);
            }
        }

        let (slots, origin): (&[(Gender, Number)], FormOrigin) = match class {
            InflectionClass::Invariable => (&SLOTS, FormOrigin::InferredInvariable),
            InflectionClass::TwoForm => (&SLOTS[..2], FormOrigin::InferredBaseForm),
            InflectionClass::FourForm => (&SLOTS[..1], FormOrigin::InferredBaseForm),
        };
        for &(gender, number) in slots {
            if !forms.iter().any(|f| is_positive(f, gender, number)) {
                let mut form = AdjectiveForm::new(0, lemma_stressed, gender, number);
                form.form_origin = origin;
                forms.push(form);
            }
        }

        let mut forms = dedup_forms(forms, &mut counters);
        assign_articles(&mut forms, ctx.rules);
        mark_citation(
            &mut forms,
            |f| is_positive(f, Gender::Masculine, Number::Singular) && f.stressed == lemma_stressed,
            |f| is_positive(f, Gender::Masculine, Number::Singular),
        );

        let mut metadata = AdjectiveMetadata {
            inflection_class: class,
            base_lemma_id: None,
            degree_relationship: None,
            degree_relationship_source: None,
        };
        let mut links = Vec::new();
        if let Some((base, relationship, source)) = degree_of(entry, ctx.rules) {
            metadata.degree_relationship = Some(relationship);
            metadata.degree_relationship_source = Some(source);
            links.push(PendingLink::Degree {
                base,
                relationship,
                source,
            });
        }

        Ok(EntryPlan {
            forms,
            metadata: LemmaMetadata::Adjective(metadata),
            filtered,
            counters,
            links,
        })
    }
}

fn is_positive(form: &AdjectiveForm, gender: Gender, number: Number) -> bool {
    form.degree == Degree::Positive && form.gender == Some(gender) && form.number == Some(number)
}

/// Invariable, two-form or four-form. `has_number_only_forms` is true when
/// some listed form carries a number but no gender.
pub fn inflection_class_of(entry: &DictionaryEntry, has_number_only_forms: bool) -> InflectionClass {
    if entry.has_head_arg("inv")
        || entry.has_head_value("#")
        || entry.expansion_contains("invariable")
    {
        InflectionClass::Invariable
    } else if entry.expansion_contains("m or f by sense") || has_number_only_forms {
        InflectionClass::TwoForm
    } else {
        InflectionClass::FourForm
    }
}

fn relationship_from(word: &str) -> Option<DegreeRelationship> {
    match word.to_lowercase().as_str() {
        "comparative" => Some(DegreeRelationship::ComparativeOf),
        "superlative" => Some(DegreeRelationship::SuperlativeOf),
        _ => None,
    }
}

/// Base adjective of a comparative or superlative: structured sense links,
/// then glosses, then the irregular table
pub fn degree_of(
    entry: &DictionaryEntry,
    rules: &Rules,
) -> Option<(String, DegreeRelationship, DegreeSource)> {
    for sense in entry.senses.iter().filter(|s| s.is_degree_sense()) {
        if let Some(base) = sense.referenced_words().next() {
            let relationship = if sense.tag_set().has("superlative") {
                DegreeRelationship::SuperlativeOf
            } else {
                DegreeRelationship::ComparativeOf
            };
            return Some((base.to_string(), relationship, DegreeSource::Structured));
        }
    }

    let from_gloss = entry
        .senses
        .iter()
        .flat_map(|s| s.glosses.iter())
        .find_map(|gloss| {
            let caps = DEGREE_GLOSS.captures(gloss)?;
            let relationship = relationship_from(&caps[1])?;
            Some((caps[2].to_string(), relationship, DegreeSource::Gloss))
        });
    if from_gloss.is_some() {
        return from_gloss;
    }

    rules
        .degrees
        .get(&normalize(&entry.word))
        .map(|link| (link.base.clone(), link.relationship, DegreeSource::Hardcoded))
}

fn assign_articles(forms: &mut [AdjectiveForm], rules: &Rules) {
    for form in forms.iter_mut() {
        if let (Some(gender), Some(number)) = (form.gender, form.number) {
            let selection = rules.articles.definite(&form.stressed, gender, number);
            form.definite_article = Some(selection.article);
            form.article_source = Some(selection.source);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::DictionaryIndex;

    fn plan(json: &str) -> EntryPlan<AdjectiveForm> {
        let e: DictionaryEntry = serde_json::from_str(json).unwrap();
        let rules = Rules::default();
        let index = DictionaryIndex::default();
        let ctx = PlanContext { rules: &rules, index: &index };
        AdjectiveStrategy.plan_entry(&e, e.stressed(), &ctx).unwrap()
    }

    fn metadata(p: &EntryPlan<AdjectiveForm>) -> &AdjectiveMetadata {
        match &p.metadata {
            LemmaMetadata::Adjective(meta) => meta,
            other => panic!("unexpected metadata {:?}", other),
        }
    }

    #[test]
    fn test_four_form_adjective() {
        let p = plan(
            r#"{"word":"bello","pos":"adj","forms":[
                {"form":"bèllo","tags":["canonical"]},
                {"form":"bèlla","tags":["feminine","singular"]},
                {"form":"bèlli","tags":["masculine","plural"]},
                {"form":"bèlle","tags":["feminine","plural"]},
                {"form":"bellìssimo","tags":["masculine","singular","superlative"]}]}"#,
        );
        assert_eq!(metadata(&p).inflection_class, InflectionClass::FourForm);
        let positive = p.forms.iter().filter(|f| f.degree == Degree::Positive).count();
        assert_eq!(positive, 4);
        let base = p.forms.iter().find(|f| f.is_citation_form).unwrap();
        assert_eq!(base.stressed, "bèllo");
        assert_eq!(base.form_origin, FormOrigin::InferredBaseForm);
        assert_eq!(p.forms.iter().filter(|f| f.is_citation_form).count(), 1);
    }

    #[test]
    fn test_invariable_fills_every_slot() {
        let p = plan(
            r##"{"word":"blu","pos":"adj","forms":[],
                "head_templates":[{"name":"it-adj","args":{"1":"#"},"expansion":"blu (invariable)"}]}"##,
        );
        assert_eq!(metadata(&p).inflection_class, InflectionClass::Invariable);
        assert_eq!(p.forms.len(), 4);
        assert!(p
            .forms
            .iter()
            .all(|f| f.stressed == "blu" && f.form_origin == FormOrigin::InferredInvariable));
    }

    #[test]
    fn test_two_form_from_untagged_plural() {
        let p = plan(
            r#"{"word":"facile","pos":"adj","forms":[
                {"form":"fàcile","tags":["canonical"]},
                {"form":"fàcili","tags":["plural"]}]}"#,
        );
        assert_eq!(metadata(&p).inflection_class, InflectionClass::TwoForm);
        assert_eq!(p.forms.len(), 4);
        let plurals: Vec<_> = p
            .forms
            .iter()
            .filter(|f| f.number == Some(Number::Plural))
            .collect();
        assert_eq!(plurals.len(), 2);
        assert!(plurals.iter().all(|f| f.form_origin == FormOrigin::InferredTwoForm));
        let singulars = p
            .forms
            .iter()
            .filter(|f| f.stressed == "fàcile" && f.form_origin == FormOrigin::InferredBaseForm)
            .count();
        assert_eq!(singulars, 2);
    }

    #[test]
    fn test_two_form_by_expansion() {
        let p = plan(
            r#"{"word":"ottimista","pos":"adj","forms":[
                {"form":"ottimìsti","tags":["masculine","plural"]},
                {"form":"ottimìste","tags":["feminine","plural"]}],
                "head_templates":[{"name":"it-adj","expansion":"ottimista m or f by sense"}]}"#,
        );
        assert_eq!(metadata(&p).inflection_class, InflectionClass::TwoForm);
        assert_eq!(p.forms.len(), 4);
    }

    #[test]
    fn test_gender_only_form_is_singular() {
        let p = plan(
            r#"{"word":"nuovo","pos":"adj","forms":[{"form":"nuòva","tags":["feminine"]}]}"#,
        );
        let fem = p.forms.iter().find(|f| f.stressed == "nuòva").unwrap();
        assert_eq!(fem.number, Some(Number::Singular));
        assert_eq!(fem.form_origin, FormOrigin::InferredSingular);
    }

    #[test]
    fn test_degree_sources() {
        let rules = Rules::default();
        let structured: DictionaryEntry = serde_json::from_str(
            r#"{"word":"migliore","pos":"adj","senses":[
                {"glosses":["better"],"tags":["comparative"],"form_of":[{"word":"buono"}]}]}"#,
        )
        .unwrap();
        assert_eq!(
            degree_of(&structured, &rules),
            Some((
                "buono".to_string(),
                DegreeRelationship::ComparativeOf,
                DegreeSource::Structured
            ))
        );

        let gloss: DictionaryEntry = serde_json::from_str(
            r#"{"word":"bellissimo","pos":"adj","senses":[{"glosses":["superlative of bello"]}]}"#,
        )
        .unwrap();
        assert_eq!(
            degree_of(&gloss, &rules),
            Some((
                "bello".to_string(),
                DegreeRelationship::SuperlativeOf,
                DegreeSource::Gloss
            ))
        );

        let p = plan(r#"{"word":"pessimo","pos":"adj","senses":[{"glosses":["very bad"]}]}"#);
        assert_eq!(
            metadata(&p).degree_relationship_source,
            Some(DegreeSource::Hardcoded)
        );
        assert!(p.links.contains(&PendingLink::Degree {
            base: "cattivo".to_string(),
            relationship: DegreeRelationship::SuperlativeOf,
            source: DegreeSource::Hardcoded,
        }));
    }
}
