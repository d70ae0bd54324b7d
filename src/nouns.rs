//! Noun import rules.
//!
//! Nouns are the hardest of the three parts of speech: the dictionary encodes
//! gender in three different places, common-gender nouns list their forms
//! under one headword, and plurals are frequently untagged for gender.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::derivation::{feminine_plural, FemininePlural};
use crate::dictionary::DictionaryEntry;
use crate::error::Result;
use crate::grammar::{
    DerivationType, FormOrigin, Gender, GenderClass, Number, NumberClass, PartOfSpeech,
};
use crate::model::{NounForm, NounMetadata};
use crate::orthography::normalize;
use crate::progress::ProgressSink;
use crate::rules::Rules;
use crate::store::{FormTable, LexiconStore};
use crate::strategy::{
    candidate_forms, dedup_forms, mark_citation, EntryPlan, LemmaMetadata, PendingLink,
    PlanContext, PlanCounters, PosStrategy, SkipReason,
};
use crate::tags::classify_noun;

static DERIVATION_GLOSS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(diminutive|augmentative|pejorative) of ([^\s,;:.()]+)")
        .expect("Invalid regex")
});

/// Head-template arguments that carry a gender code
const GENDER_ARGS: [&str; 3] = ["1", "2", "g"];

#[derive(Debug, Clone, Copy, Default)]
pub struct NounStrategy;

impl PosStrategy for NounStrategy {
    type Form = NounForm;

    fn pos(&self) -> PartOfSpeech {
        PartOfSpeech::Noun
    }

    fn table<'s>(&self, store: &'s mut LexiconStore) -> &'s mut FormTable<NounForm> {
        &mut store.noun_forms
    }

    fn table_ref<'s>(&self, store: &'s LexiconStore) -> &'s FormTable<NounForm> {
        &store.noun_forms
    }

    fn plan_entry(
        &self,
        entry: &DictionaryEntry,
        lemma_stressed: &str,
        ctx: &PlanContext<'_>,
    ) -> std::result::Result<EntryPlan<NounForm>, SkipReason> {
        let base = gender_of(entry).ok_or(SkipReason::NoGender)?;
        let gender_class = gender_class_of(entry, base);
        let pluralia = is_pluralia_tantum(entry);

        let mut counters = PlanCounters::default();
        let mut filtered = 0;
        let mut links = Vec::new();

        let mut forms: Vec<NounForm> = Vec::new();
        let mut untagged_singulars: Vec<NounForm> = Vec::new();
        let mut untagged_plurals: Vec<NounForm> = Vec::new();

        let lemma_key = normalize(&entry.word);
        for candidate in candidate_forms(entry, &lemma_key, true, ctx, &mut counters) {
            // a bare canonical row only repeats the headword
            if candidate.was_canonical && candidate.tags.is_empty() {
                continue;
            }
            let features = classify_noun(&candidate.tags);
            if features.should_filter {
                filtered += 1;
                continue;
            }

            let mut form = NounForm::new(0, candidate.stressed, base, Number::Singular);
            form.gender = features.gender;
            form.number = features.number;
            form.labels = features.labels;
            form.derivation_type = features.derivation_type;
            form.meaning_hint = candidate.meaning_hint;

            match (features.gender, features.number) {
                (Some(_), Some(_)) => forms.push(form),
                (Some(_), None) => {
                    form.number = Some(Number::Singular);
                    form.form_origin = FormOrigin::InferredSingular;
                    forms.push(form);
                }
                (None, Some(Number::Singular)) => untagged_singulars.push(form),
                (None, Some(Number::Plural)) => untagged_plurals.push(form),
                (None, None) => filtered += 1,
            }
        }

        let other = base.opposite();
        let has_singular =
            |forms: &[NounForm], g: Gender| forms.iter().any(|f| is(f, g, Number::Singular));

        if !pluralia && untagged_singulars.is_empty() && !has_singular(&forms, base) {
            let mut synthesized = NounForm::new(0, lemma_stressed, base, Number::Singular);
            synthesized.gender = None;
            synthesized.form_origin = FormOrigin::InferredBaseForm;
            untagged_singulars.push(synthesized);
        }

        // looked up before untagged singulars are copied to the other gender
        let counterpart = match gender_class {
            GenderClass::CommonGenderVariable => counterpart_word(entry, &forms, other),
            _ => None,
        };
        if let Some(word) = &counterpart {
            links.push(PendingLink::Counterpart(word.clone()));
        }

        let duplicate_singular = match gender_class {
            GenderClass::CommonGenderFixed => true,
            GenderClass::CommonGenderVariable => !has_singular(&forms, other),
            GenderClass::Masculine | GenderClass::Feminine => false,
        };
        for form in untagged_singulars {
            if duplicate_singular {
                forms.push(with_gender(&form, other));
            }
            forms.push(with_gender(&form, base));
        }

        if !untagged_plurals.is_empty() {
            match gender_class {
                GenderClass::CommonGenderFixed => {
                    for form in &untagged_plurals {
                        forms.push(with_gender(form, base));
                        forms.push(with_gender(form, other));
                    }
                }
                GenderClass::CommonGenderVariable => {
                    for form in &untagged_plurals {
                        forms.push(with_gender(form, base));
                    }
                    resolve_counterpart_plural(
                        entry,
                        counterpart.as_deref(),
                        other,
                        ctx,
                        &mut forms,
                        &mut counters,
                    );
                }
                GenderClass::Masculine | GenderClass::Feminine => {
                    for form in &untagged_plurals {
                        forms.push(with_gender(form, base));
                    }
                }
            }
        }

        if pluralia && !forms.iter().any(|f| f.number == Some(Number::Plural)) {
            let mut plural = NounForm::new(0, lemma_stressed, base, Number::Plural);
            plural.form_origin = FormOrigin::InferredBaseForm;
            forms.push(plural);
        }

        let mut forms = dedup_forms(forms, &mut counters);
        assign_articles(&mut forms, ctx.rules);

        if pluralia {
            mark_citation(&mut forms, |f| f.number == Some(Number::Plural), |_| false);
        } else {
            mark_citation(
                &mut forms,
                |f| is(f, base, Number::Singular) && f.stressed == lemma_stressed,
                |f| is(f, base, Number::Singular),
            );
        }

        let derivation = derivation_of(entry);
        if let Some((derivation, Some(base_word))) = &derivation {
            links.push(PendingLink::DerivedFrom {
                base: base_word.clone(),
                derivation: *derivation,
            });
        }

        let metadata = NounMetadata {
            gender_class,
            number_class: number_class_of(entry, &forms),
            counterpart_lemma_id: None,
            base_lemma_id: None,
            derivation_type: derivation.map(|(d, _)| d),
        };

        Ok(EntryPlan {
            forms,
            metadata: LemmaMetadata::Noun(metadata),
            filtered,
            counters,
            links,
        })
    }
}

fn is(form: &NounForm, gender: Gender, number: Number) -> bool {
    form.gender == Some(gender) && form.number == Some(number)
}

fn with_gender(form: &NounForm, gender: Gender) -> NounForm {
    let mut form = form.clone();
    form.gender = Some(gender);
    form
}

fn head_values(entry: &DictionaryEntry) -> impl Iterator<Item = &str> {
    entry
        .head_templates
        .iter()
        .flat_map(|t| t.args.values())
        .filter_map(|v| v.as_str())
}

fn gender_from_code(code: &str) -> Option<Gender> {
    match code {
        "m" | "m-s" | "m-p" | "mf" | "mfbysense" => Some(Gender::Masculine),
        "f" | "f-s" | "f-p" => Some(Gender::Feminine),
        _ => None,
    }
}

/// Base gender: categories, then sense tags, then head-template arguments
pub fn gender_of(entry: &DictionaryEntry) -> Option<Gender> {
    if entry.has_category("Italian masculine nouns") {
        return Some(Gender::Masculine);
    }
    if entry.has_category("Italian feminine nouns") {
        return Some(Gender::Feminine);
    }
    let mut tags = entry.sense_tags();
    if let Some(gender) = tags.find_map(|t| match t {
        "masculine" => Some(Gender::Masculine),
        "feminine" => Some(Gender::Feminine),
        _ => None,
    }) {
        return Some(gender);
    }
    GENDER_ARGS
        .iter()
        .filter_map(|key| entry.head_arg(key))
        .find_map(|code| gender_from_code(&code))
}

pub fn gender_class_of(entry: &DictionaryEntry, base: Gender) -> GenderClass {
    if entry.has_head_value("mfbysense") {
        return GenderClass::CommonGenderFixed;
    }
    if entry.has_head_value("mf") || entry.has_head_arg(base.opposite().code()) {
        return GenderClass::CommonGenderVariable;
    }
    match base {
        Gender::Masculine => GenderClass::Masculine,
        Gender::Feminine => GenderClass::Feminine,
    }
}

fn is_pluralia_tantum(entry: &DictionaryEntry) -> bool {
    head_values(entry).any(|v| v.ends_with("-p")) || entry.has_category("pluralia tantum")
}

/// Number class, decided once the forms are known
pub fn number_class_of(entry: &DictionaryEntry, forms: &[NounForm]) -> NumberClass {
    if is_pluralia_tantum(entry) {
        return NumberClass::PluraliaTantum;
    }
    let spellings = |n: Number| -> BTreeSet<&str> {
        forms
            .iter()
            .filter(|f| f.number == Some(n))
            .map(|f| f.stressed.as_str())
            .collect()
    };
    let singulars = spellings(Number::Singular);
    let same_spelling = !singulars.is_empty() && singulars == spellings(Number::Plural);
    if entry.has_head_value("#") || entry.has_category("indeclinable") || same_spelling {
        return NumberClass::Invariable;
    }
    if entry.has_head_value("-")
        || entry.has_category("singularia tantum")
        || entry.has_category("uncountable")
    {
        return NumberClass::SingulariaTantum;
    }
    NumberClass::Standard
}

/// Singular of the opposite gender: a form tagged with that gender, or the
/// head-template argument naming it
fn counterpart_word(entry: &DictionaryEntry, forms: &[NounForm], other: Gender) -> Option<String> {
    forms
        .iter()
        .find(|f| is(f, other, Number::Singular))
        .map(|f| f.stressed.clone())
        .or_else(|| {
            entry
                .head_arg(other.code())
                .filter(|w| !w.is_empty() && w != "+")
        })
}

fn resolve_counterpart_plural(
    entry: &DictionaryEntry,
    counterpart: Option<&str>,
    other: Gender,
    ctx: &PlanContext<'_>,
    forms: &mut Vec<NounForm>,
    counters: &mut PlanCounters,
) {
    if forms.iter().any(|f| is(f, other, Number::Plural)) {
        counters.counterpart_explicit += 1;
        return;
    }
    let Some(word) = counterpart else {
        log::debug!("{}: no {} counterpart", entry.word, other);
        counters.counterpart_missing += 1;
        return;
    };
    match ctx.index.plural_of(word) {
        Some(plural) => {
            let mut form = NounForm::new(0, plural, other, Number::Plural);
            form.form_origin = FormOrigin::InferredCounterpart;
            forms.push(form);
            counters.counterpart_synthesized += 1;
        }
        None => {
            log::debug!("{}: plural of counterpart {} unknown", entry.word, word);
            counters.counterpart_plural_unknown += 1;
        }
    }
}

/// Derivation type and base word from sense tags or glosses
pub fn derivation_of(entry: &DictionaryEntry) -> Option<(DerivationType, Option<String>)> {
    for sense in &entry.senses {
        for gloss in &sense.glosses {
            if let Some(caps) = DERIVATION_GLOSS.captures(gloss) {
                if let Some(kind) = DerivationType::parse(&caps[1].to_lowercase()) {
                    return Some((kind, Some(caps[2].to_string())));
                }
            }
        }
        let tagged = DerivationType::ALL
            .iter()
            .copied()
            .find(|d| sense.tag_set().has(d.as_str()));
        if let Some(kind) = tagged {
            return Some((kind, sense.referenced_words().next().map(str::to_string)));
        }
    }
    None
}

fn assign_articles(forms: &mut [NounForm], rules: &Rules) {
    for form in forms.iter_mut() {
        if let (Some(gender), Some(number)) = (form.gender, form.number) {
            let selection = rules.articles.definite(&form.stressed, gender, number);
            form.definite_article = Some(selection.article);
            form.article_source = Some(selection.source);
        }
    }
}

/// Counters of [`enrich_missing_feminine_plurals`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FemininePluralStats {
    pub total_f_sg: usize,
    pub synthesized: usize,
    pub added_invariable: usize,
    pub skipped_already_exists: usize,
    pub skipped_blocklisted: usize,
    pub skipped_multiword: usize,
    pub skipped_typo: usize,
}

/// Add the feminine plural to nouns that have a feminine singular but no
/// feminine plural.
///
/// Only lemmas with a standard or invariable number class are considered.
/// Invariable lemmas and words the plural rule cannot inflect get the
/// singular spelling back; singulars ending in `-o` are counted as typos and
/// left alone.
pub fn enrich_missing_feminine_plurals(
    store: &mut LexiconStore,
    rules: &Rules,
    progress: &dyn ProgressSink,
) -> Result<FemininePluralStats> {
    store.transaction(|store| {
        let mut stats = FemininePluralStats::default();
        let singulars: Vec<(NounForm, NumberClass)> = store
            .noun_forms
            .iter()
            .filter(|f| is(f, Gender::Feminine, Number::Singular) && f.labels.is_none())
            .filter_map(|f| {
                let class = store.noun_metadata.get(&f.lemma_id)?.number_class;
                matches!(class, NumberClass::Standard | NumberClass::Invariable)
                    .then(|| (f.clone(), class))
            })
            .collect();
        let total = singulars.len();

        for (i, (singular, class)) in singulars.into_iter().enumerate() {
            stats.total_f_sg += 1;
            if (i + 1) % 10_000 == 0 {
                progress.update("feminine plurals", i + 1, total);
            }

            let has_plural = store
                .noun_forms
                .for_lemma(singular.lemma_id)
                .any(|f| is(f, Gender::Feminine, Number::Plural));
            if has_plural {
                stats.skipped_already_exists += 1;
                continue;
            }
            let multiword = singular.stressed.contains(' ')
                || store
                    .lemma(singular.lemma_id)
                    .map_or(false, |l| l.stressed.contains(' '));
            if multiword {
                stats.skipped_multiword += 1;
                continue;
            }
            if rules.feminine_plurals.contains(&normalize(&singular.stressed)) {
                stats.skipped_blocklisted += 1;
                continue;
            }

            let plural = match class {
                NumberClass::Invariable => FemininePlural::Invariable,
                _ => feminine_plural(&singular.stressed),
            };
            let (stressed, origin) = match plural {
                FemininePlural::Invariable => (singular.stressed.clone(), FormOrigin::InferredInvariable),
                FemininePlural::Regular(plural) => (plural, FormOrigin::Derived),
                FemininePlural::Suspect => {
                    stats.skipped_typo += 1;
                    continue;
                }
            };

            let mut form = NounForm::new(singular.lemma_id, stressed, Gender::Feminine, Number::Plural);
            form.meaning_hint = singular.meaning_hint.clone();
            form.derivation_type = singular.derivation_type;
            form.form_origin = origin;
            let selection = rules.articles.definite(&form.stressed, Gender::Feminine, Number::Plural);
            form.definite_article = Some(selection.article);
            form.article_source = Some(selection.source);

            if store.noun_forms.insert(form).is_none() {
                stats.skipped_already_exists += 1;
            } else if origin == FormOrigin::Derived {
                stats.synthesized += 1;
            } else {
                stats.added_invariable += 1;
            }
        }
        progress.finish("feminine plurals", total);

        log::info!(
            "Feminine plurals: {} singulars, {} synthesized, {} invariable, {} already present",
            stats.total_f_sg,
            stats.synthesized,
            stats.added_invariable,
            stats.skipped_already_exists
        );
        log::debug!(
            "Feminine plurals skipped: {} blocklisted, {} multiword, {} suspected typos",
            stats.skipped_blocklisted,
            stats.skipped_multiword,
            stats.skipped_typo
        );
        Ok(stats)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::articles::DefiniteArticle;
    use crate::dictionary::DictionaryIndex;
    use crate::model::{Lemma, LemmaId};
    use crate::progress::NullProgress;

    fn entry(json: &str) -> DictionaryEntry {
        serde_json::from_str(json).unwrap()
    }

    fn plan_with(json: &str, index: &DictionaryIndex) -> EntryPlan<NounForm> {
        let e = entry(json);
        let rules = Rules::default();
        let ctx = PlanContext { rules: &rules, index };
        NounStrategy.plan_entry(&e, e.stressed(), &ctx).unwrap()
    }

    fn plan(json: &str) -> EntryPlan<NounForm> {
        plan_with(json, &DictionaryIndex::default())
    }

    fn metadata(p: &EntryPlan<NounForm>) -> &NounMetadata {
        match &p.metadata {
            LemmaMetadata::Noun(meta) => meta,
            other => panic!("unexpected metadata {:?}", other),
        }
    }

    fn find<'a>(p: &'a EntryPlan<NounForm>, stressed: &str, g: Gender, n: Number) -> Option<&'a NounForm> {
        p.forms
            .iter()
            .find(|f| f.stressed == stressed && is(f, g, n))
    }

    #[test]
    fn test_standard_feminine_noun() {
        let p = plan(
            r#"{"word":"casa","pos":"noun",
                "forms":[{"form":"càsa","tags":["canonical"]},{"form":"càse","tags":["plural"]}],
                "head_templates":[{"name":"it-noun","args":{"1":"f"}}]}"#,
        );
        assert_eq!(p.forms.len(), 2);
        let sg = find(&p, "càsa", Gender::Feminine, Number::Singular).unwrap();
        assert_eq!(sg.form_origin, FormOrigin::InferredBaseForm);
        assert!(sg.is_citation_form);
        assert_eq!(sg.definite_article, Some(DefiniteArticle::La));
        let pl = find(&p, "càse", Gender::Feminine, Number::Plural).unwrap();
        assert_eq!(pl.definite_article, Some(DefiniteArticle::Le));
        assert_eq!(metadata(&p).gender_class, GenderClass::Feminine);
        assert_eq!(metadata(&p).number_class, NumberClass::Standard);
    }

    #[test]
    fn test_no_gender_is_skipped() {
        let e = entry(r#"{"word":"acronimo","pos":"noun","forms":[{"form":"acronimi","tags":["plural"]}]}"#);
        let rules = Rules::default();
        let index = DictionaryIndex::default();
        let ctx = PlanContext { rules: &rules, index: &index };
        assert_eq!(
            NounStrategy.plan_entry(&e, "acronimo", &ctx).unwrap_err(),
            SkipReason::NoGender
        );
    }

    #[test]
    fn test_gender_sources() {
        let by_category = entry(r#"{"word":"x","categories":["Italian masculine nouns"]}"#);
        assert_eq!(gender_of(&by_category), Some(Gender::Masculine));
        let by_object = entry(r#"{"word":"x","categories":[{"name":"Italian feminine nouns"}]}"#);
        assert_eq!(gender_of(&by_object), Some(Gender::Feminine));
        let by_tag = entry(r#"{"word":"x","senses":[{"tags":["feminine"]}]}"#);
        assert_eq!(gender_of(&by_tag), Some(Gender::Feminine));
        let by_arg = entry(r#"{"word":"x","head_templates":[{"args":{"g":"m-p"}}]}"#);
        assert_eq!(gender_of(&by_arg), Some(Gender::Masculine));
        let common = entry(r#"{"word":"x","head_templates":[{"args":{"1":"mfbysense"}}]}"#);
        assert_eq!(gender_of(&common), Some(Gender::Masculine));
        assert_eq!(
            gender_class_of(&common, Gender::Masculine),
            GenderClass::CommonGenderFixed
        );
    }

    #[test]
    fn test_common_gender_fixed_duplicates() {
        let p = plan(
            r#"{"word":"cantante","pos":"noun",
                "forms":[{"form":"cantànte","tags":["canonical"]},{"form":"cantànti","tags":["plural"]}],
                "head_templates":[{"name":"it-noun","args":{"1":"mfbysense"}}]}"#,
        );
        assert_eq!(p.forms.len(), 4);
        for g in [Gender::Masculine, Gender::Feminine] {
            assert!(find(&p, "cantànte", g, Number::Singular).is_some());
            assert!(find(&p, "cantànti", g, Number::Plural).is_some());
        }
        assert_eq!(p.forms.iter().filter(|f| f.is_citation_form).count(), 1);
        assert!(find(&p, "cantànte", Gender::Masculine, Number::Singular)
            .unwrap()
            .is_citation_form);
    }

    #[test]
    fn test_counterpart_plural_synthesized() {
        let mut index = DictionaryIndex::default();
        index.plurals.insert("amica".to_string(), "amìche".to_string());
        let p = plan_with(
            r#"{"word":"amico","pos":"noun",
                "forms":[{"form":"amìco","tags":["canonical"]},
                         {"form":"amìci","tags":["plural"]},
                         {"form":"amìca","tags":["feminine"]}],
                "head_templates":[{"name":"it-noun","args":{"1":"m","f":"+"}}]}"#,
            &index,
        );
        let fem = find(&p, "amìca", Gender::Feminine, Number::Singular).unwrap();
        assert_eq!(fem.form_origin, FormOrigin::InferredSingular);
        let plural = find(&p, "amìche", Gender::Feminine, Number::Plural).unwrap();
        assert_eq!(plural.form_origin, FormOrigin::InferredCounterpart);
        assert!(find(&p, "amìci", Gender::Masculine, Number::Plural).is_some());
        // the feminine singular exists, so the base singular stays masculine
        assert!(find(&p, "amìco", Gender::Feminine, Number::Singular).is_none());
        assert_eq!(p.counters.counterpart_synthesized, 1);
        assert_eq!(metadata(&p).gender_class, GenderClass::CommonGenderVariable);
        assert!(p.links.contains(&PendingLink::Counterpart("amìca".to_string())));
    }

    #[test]
    fn test_counterpart_cases_counted() {
        let explicit = plan(
            r#"{"word":"dio","pos":"noun",
                "forms":[{"form":"dìo","tags":["canonical"]},
                         {"form":"dèi","tags":["plural"]},
                         {"form":"dìi","tags":["plural"]},
                         {"form":"dèe","tags":["feminine","plural"]}],
                "head_templates":[{"name":"it-noun","args":{"1":"m","f":"dea"}}]}"#,
        );
        assert_eq!(explicit.counters.counterpart_explicit, 1);
        assert!(find(&explicit, "dèi", Gender::Masculine, Number::Plural).is_some());
        assert!(find(&explicit, "dèi", Gender::Feminine, Number::Plural).is_none());

        let unknown = plan(
            r#"{"word":"attore","pos":"noun",
                "forms":[{"form":"attóri","tags":["plural"]}],
                "head_templates":[{"name":"it-noun","args":{"1":"m","f":"attrice"}}]}"#,
        );
        assert_eq!(unknown.counters.counterpart_plural_unknown, 1);

        let missing = plan(
            r#"{"word":"collega","pos":"noun",
                "forms":[{"form":"collèghi","tags":["plural"]}],
                "head_templates":[{"name":"it-noun","args":{"1":"mf"}}]}"#,
        );
        assert_eq!(missing.counters.counterpart_missing, 1);
    }

    #[test]
    fn test_pluralia_tantum_without_forms() {
        let p = plan(
            r#"{"word":"forbici","pos":"noun","forms":[],
                "head_templates":[{"name":"it-noun","args":{"1":"f-p"}}]}"#,
        );
        assert_eq!(p.forms.len(), 1);
        assert_eq!(p.forms[0].number, Some(Number::Plural));
        assert!(p.forms[0].is_citation_form);
        assert_eq!(metadata(&p).number_class, NumberClass::PluraliaTantum);
    }

    #[test]
    fn test_invariable_by_identical_spellings() {
        let p = plan(
            r#"{"word":"città","pos":"noun",
                "forms":[{"form":"città","tags":["plural"]}],
                "head_templates":[{"name":"it-noun","args":{"1":"f"}}]}"#,
        );
        assert_eq!(metadata(&p).number_class, NumberClass::Invariable);
        let singular = entry(r#"{"word":"x","head_templates":[{"args":{"1":"m","2":"-"}}]}"#);
        assert_eq!(number_class_of(&singular, &[]), NumberClass::SingulariaTantum);
    }

    #[test]
    fn test_derivation_from_gloss() {
        let p = plan(
            r#"{"word":"gattino","pos":"noun",
                "senses":[{"glosses":["diminutive of gatto; kitten"]}],
                "head_templates":[{"name":"it-noun","args":{"1":"m"}}]}"#,
        );
        assert_eq!(metadata(&p).derivation_type, Some(DerivationType::Diminutive));
        assert!(p.links.contains(&PendingLink::DerivedFrom {
            base: "gatto".to_string(),
            derivation: DerivationType::Diminutive,
        }));
    }

    #[test]
    fn test_meaning_hint_kept() {
        let p = plan(
            r#"{"word":"braccio","pos":"noun",
                "forms":[{"form":"bràcci","tags":["masculine","plural"],"sense":"arms of a chair"},
                         {"form":"bràccia","tags":["feminine","plural"],"sense":"human arms"}],
                "head_templates":[{"name":"it-noun","args":{"1":"m"}}]}"#,
        );
        let arms = find(&p, "bràccia", Gender::Feminine, Number::Plural).unwrap();
        assert_eq!(arms.meaning_hint.as_deref(), Some("human arms"));
        assert_eq!(arms.definite_article, Some(DefiniteArticle::Le));
    }

    fn add_noun(
        store: &mut LexiconStore,
        stressed: &str,
        number_class: NumberClass,
        forms: &[(&str, Gender, Number)],
    ) -> LemmaId {
        let lemma = Lemma::new(normalize(stressed), stressed.to_string(), PartOfSpeech::Noun);
        let id = store.insert_lemma(lemma).unwrap();
        store.noun_metadata.insert(
            id,
            NounMetadata {
                gender_class: GenderClass::CommonGenderVariable,
                number_class,
                counterpart_lemma_id: None,
                base_lemma_id: None,
                derivation_type: None,
            },
        );
        for &(form, gender, number) in forms {
            store.noun_forms.insert(NounForm::new(id, form, gender, number));
        }
        id
    }

    fn feminine_plurals_of(store: &LexiconStore, id: LemmaId) -> Vec<&NounForm> {
        store
            .noun_forms
            .for_lemma(id)
            .filter(|f| is(f, Gender::Feminine, Number::Plural))
            .collect()
    }

    #[test]
    fn test_missing_feminine_plurals() {
        use Gender::Feminine as F;
        use Number::{Plural as Pl, Singular as Sg};

        let mut store = LexiconStore::new();
        let amica = add_noun(&mut store, "amìca", NumberClass::Standard, &[("amìca", F, Sg)]);
        let attrice = add_noun(&mut store, "attrìce", NumberClass::Standard, &[("attrìce", F, Sg)]);
        let cameriera = add_noun(
            &mut store,
            "camerièra",
            NumberClass::Standard,
            &[("camerièra", F, Sg), ("camerière", F, Pl)],
        );
        let ala = add_noun(&mut store, "àla", NumberClass::Standard, &[("àla", F, Sg)]);
        let typo = add_noun(&mut store, "maèstra", NumberClass::Standard, &[("maèstro", F, Sg)]);
        let star = add_noun(&mut store, "star", NumberClass::Standard, &[("star", F, Sg)]);
        let capocuoca = add_noun(&mut store, "càpo cuòca", NumberClass::Standard, &[("càpo cuòca", F, Sg)]);
        let forbici = add_noun(&mut store, "fòrbici", NumberClass::PluraliaTantum, &[("fòrbice", F, Sg)]);

        let rules = Rules::default();
        let stats = enrich_missing_feminine_plurals(&mut store, &rules, &NullProgress).unwrap();
        assert_eq!(
            stats,
            FemininePluralStats {
                total_f_sg: 7,
                synthesized: 2,
                added_invariable: 1,
                skipped_already_exists: 1,
                skipped_blocklisted: 1,
                skipped_multiword: 1,
                skipped_typo: 1,
            }
        );

        let amiche = feminine_plurals_of(&store, amica);
        assert_eq!(amiche.len(), 1);
        assert_eq!(amiche[0].stressed, "amìche");
        assert_eq!(amiche[0].form_origin, FormOrigin::Derived);
        assert_eq!(amiche[0].definite_article, Some(DefiniteArticle::Le));
        assert_eq!(feminine_plurals_of(&store, attrice)[0].stressed, "attrìci");

        let stars = feminine_plurals_of(&store, star);
        assert_eq!(stars[0].stressed, "star");
        assert_eq!(stars[0].form_origin, FormOrigin::InferredInvariable);

        assert_eq!(feminine_plurals_of(&store, cameriera).len(), 1);
        for untouched in [ala, typo, capocuoca, forbici] {
            assert!(feminine_plurals_of(&store, untouched).is_empty());
        }
    }

    #[test]
    fn test_feminine_plurals_rerun_adds_nothing() {
        let mut store = LexiconStore::new();
        add_noun(
            &mut store,
            "amìca",
            NumberClass::Standard,
            &[("amìca", Gender::Feminine, Number::Singular)],
        );
        let crisi = add_noun(
            &mut store,
            "crìsi",
            NumberClass::Invariable,
            &[("crìsi", Gender::Feminine, Number::Singular)],
        );
        let rules = Rules::default();
        let first = enrich_missing_feminine_plurals(&mut store, &rules, &NullProgress).unwrap();
        assert_eq!(first.synthesized, 1);
        assert_eq!(first.added_invariable, 1);
        assert_eq!(feminine_plurals_of(&store, crisi)[0].stressed, "crìsi");

        let forms = store.noun_forms.len();
        let second = enrich_missing_feminine_plurals(&mut store, &rules, &NullProgress).unwrap();
        assert_eq!(second.total_f_sg, 2);
        assert_eq!(second.skipped_already_exists, 2);
        assert_eq!(second.synthesized + second.added_invariable, 0);
        assert_eq!(store.noun_forms.len(), forms);
    }
}
