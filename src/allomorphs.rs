//! Allomorphs: shortened spellings that live under their parent lemma.
//!
//! Apocopic (gran, fra) and elided (grand') alt-of entries are never lemmas
//! of their own. This pass adds them as labelled forms of the lemma they are
//! an alternative of, then adds the hardcoded allomorphs the dictionary does
//! not list (san → santo).

use serde::Serialize;
use std::collections::BTreeSet;

use crate::dictionary::{DictionaryEntry, DictionarySource};
use crate::error::{LexiconError, Result};
use crate::grammar::{Degree, FormOrigin, Gender, Number, PartOfSpeech, WrittenSource};
use crate::model::{AdjectiveForm, FormRecord, LemmaId, NounForm};
use crate::orthography::normalize;
use crate::progress::ProgressSink;
use crate::rules::{Allomorph, Rules};
use crate::store::LexiconStore;

/// Statistics of an allomorph import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AllomorphStats {
    pub scanned: usize,
    /// Alt-of entries that are neither apocopic nor elided
    pub alt_of_filtered: usize,
    pub allomorphs_added: usize,
    pub forms_added: usize,
    pub already_in_parent: usize,
    pub parent_not_found: usize,
    pub duplicates_skipped: usize,
    pub hardcoded_added: usize,
}

/// Kind of shortening an alt-of entry represents
fn allomorph_label(entry: &DictionaryEntry) -> Option<&'static str> {
    if entry.word.ends_with('\'') || entry.word.ends_with('’') {
        return Some("elided");
    }
    entry
        .senses
        .iter()
        .filter(|s| s.alt_of.is_some())
        .any(|s| s.tag_set().has("apocopic"))
        .then_some("apocopic")
}

fn parent_word(entry: &DictionaryEntry) -> Option<&str> {
    entry
        .senses
        .iter()
        .filter_map(|s| s.alt_of.as_ref())
        .flatten()
        .map(|r| r.word.as_str())
        .find(|w| !w.is_empty())
}

/// Import allomorphs of `pos` (nouns and adjectives only)
pub fn import_allomorphs(
    store: &mut LexiconStore,
    source: &DictionarySource,
    pos: PartOfSpeech,
    rules: &Rules,
    progress: &dyn ProgressSink,
) -> Result<AllomorphStats> {
    if pos == PartOfSpeech::Verb {
        return Err(LexiconError::UnsupportedPos(format!(
            "{} have no allomorphs",
            pos.plural()
        )));
    }
    source.check()?;
    let pass_name = format!("allomorphs {}", pos.plural());

    store.transaction(|store| {
        let mut stats = AllomorphStats::default();
        let mut stream = source.entries()?;
        for item in stream.by_ref() {
            let (line_no, entry) = item?;
            if line_no % 10_000 == 0 {
                progress.update(&pass_name, line_no, 0);
            }
            if !entry.is_pos(pos) || !entry.has_alt_of() || entry.has_form_of() {
                continue;
            }
            stats.scanned += 1;

            let Some(label) = allomorph_label(&entry) else {
                stats.alt_of_filtered += 1;
                continue;
            };
            let Some(parent) = parent_word(&entry) else {
                stats.alt_of_filtered += 1;
                continue;
            };
            let Some(parent_id) = store.find_lemma(pos, &normalize(parent)).map(|l| l.id) else {
                log::debug!("Parent {} of allomorph {} not found", parent, entry.word);
                stats.parent_not_found += 1;
                continue;
            };

            let added = match pos {
                PartOfSpeech::Noun => add_noun_allomorph(store, parent_id, &entry, label, rules, &mut stats),
                _ => add_adjective_allomorph(store, parent_id, &entry, label, rules, &mut stats),
            };
            if added > 0 {
                stats.allomorphs_added += 1;
                stats.forms_added += added;
            }
        }
        progress.finish(&pass_name, stream.lines_read());

        for allomorph in rules.allomorphs.for_pos(pos) {
            add_hardcoded(store, pos, allomorph, rules, &mut stats);
        }

        log::info!(
            "Allomorphs for {}: {} added ({} forms), {} hardcoded, {} parents not found",
            pos.plural(),
            stats.allomorphs_added,
            stats.forms_added,
            stats.hardcoded_added,
            stats.parent_not_found
        );
        Ok(stats)
    })
}

/// Gender and number slots the allomorph takes over from its parent.
/// Noun allomorphs only replace singulars.
fn parent_slots<F: FormRecord>(forms: impl Iterator<Item = F>, singular_only: bool) -> BTreeSet<(Gender, Number)> {
    forms
        .filter_map(|f| Some((f.gender()?, f.number()?)))
        .filter(|(_, n)| !singular_only || *n == Number::Singular)
        .collect()
}

fn already_present<'a, F: FormRecord + 'a>(
    mut forms: impl Iterator<Item = &'a F>,
    spelling: &str,
    gender: Gender,
    number: Number,
) -> bool {
    let key = normalize(spelling);
    forms.any(|f| {
        f.gender() == Some(gender) && f.number() == Some(number) && normalize(f.stressed()) == key
    })
}

fn add_noun_allomorph(
    store: &mut LexiconStore,
    parent_id: LemmaId,
    entry: &DictionaryEntry,
    label: &str,
    rules: &Rules,
    stats: &mut AllomorphStats,
) -> usize {
    let slots = parent_slots(store.noun_forms.for_lemma(parent_id).cloned(), true);
    let mut added = 0;
    for (gender, number) in slots {
        if already_present(store.noun_forms.for_lemma(parent_id), &entry.word, gender, number) {
            stats.already_in_parent += 1;
            continue;
        }
        let mut form = NounForm::new(parent_id, entry.stressed(), gender, number);
        form.set_written(entry.word.clone(), WrittenSource::AltOf);
        form.labels = Some(label.to_string());
        form.form_origin = FormOrigin::AltOf;
        let selection = rules.articles.definite(&form.stressed, gender, number);
        form.definite_article = Some(selection.article);
        form.article_source = Some(selection.source);
        match store.noun_forms.insert(form) {
            Some(_) => added += 1,
            None => stats.duplicates_skipped += 1,
        }
    }
    added
}

fn add_adjective_allomorph(
    store: &mut LexiconStore,
    parent_id: LemmaId,
    entry: &DictionaryEntry,
    label: &str,
    rules: &Rules,
    stats: &mut AllomorphStats,
) -> usize {
    let slots = parent_slots(
        store
            .adjective_forms
            .for_lemma(parent_id)
            .filter(|f| f.degree == Degree::Positive)
            .cloned(),
        false,
    );
    let mut added = 0;
    for (gender, number) in slots {
        let positive = store
            .adjective_forms
            .for_lemma(parent_id)
            .filter(|f| f.degree == Degree::Positive);
        if already_present(positive, &entry.word, gender, number) {
            stats.already_in_parent += 1;
            continue;
        }
        let mut form = AdjectiveForm::new(parent_id, entry.stressed(), gender, number);
        form.set_written(entry.word.clone(), WrittenSource::AltOf);
        form.labels = Some(label.to_string());
        form.form_origin = FormOrigin::AltOf;
        let selection = rules.articles.definite(&form.stressed, gender, number);
        form.definite_article = Some(selection.article);
        form.article_source = Some(selection.source);
        match store.adjective_forms.insert(form) {
            Some(_) => added += 1,
            None => stats.duplicates_skipped += 1,
        }
    }
    added
}

fn add_hardcoded(
    store: &mut LexiconStore,
    pos: PartOfSpeech,
    allomorph: &Allomorph,
    rules: &Rules,
    stats: &mut AllomorphStats,
) {
    let Some(parent_id) = store.find_lemma(pos, &allomorph.parent).map(|l| l.id) else {
        log::debug!("Parent {} of {} not found", allomorph.parent, allomorph.form);
        stats.parent_not_found += 1;
        return;
    };
    let (gender, number) = (allomorph.gender, allomorph.number);
    let selection = rules.articles.definite(&allomorph.form, gender, number);
    let inserted = match pos {
        PartOfSpeech::Noun => {
            let mut form = NounForm::new(parent_id, allomorph.form.clone(), gender, number);
            form.set_written(allomorph.form.clone(), WrittenSource::Hardcoded);
            form.labels = Some(allomorph.label.clone());
            form.form_origin = FormOrigin::Hardcoded;
            form.definite_article = Some(selection.article);
            form.article_source = Some(selection.source);
            store.noun_forms.insert(form)
        }
        _ => {
            let mut form = AdjectiveForm::new(parent_id, allomorph.form.clone(), gender, number);
            form.set_written(allomorph.form.clone(), WrittenSource::Hardcoded);
            form.labels = Some(allomorph.label.clone());
            form.form_origin = FormOrigin::Hardcoded;
            form.definite_article = Some(selection.article);
            form.article_source = Some(selection.source);
            store.adjective_forms.insert(form)
        }
    };
    match inserted {
        Some(_) => stats.hardcoded_added += 1,
        None => stats.duplicates_skipped += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{import_pos, ImportOptions};
    use crate::progress::NullProgress;

    const GRANDE: &str = r#"{"pos":"adj","word":"grande","forms":[{"form":"grànde","tags":["canonical"]},{"form":"grandi","tags":["plural"]}],"senses":[{"glosses":["big"]}]}"#;
    const GRAN: &str = r#"{"pos":"adj","word":"gran","senses":[{"tags":["apocopic"],"alt_of":[{"word":"grande"}],"glosses":["apocopic form of grande"]}]}"#;
    const GRAND: &str = r#"{"pos":"adj","word":"grand'","senses":[{"alt_of":[{"word":"grande"}],"glosses":["elided form of grande"]}]}"#;
    const SANTO: &str = r#"{"pos":"adj","word":"santo","forms":[{"form":"sànto","tags":["masculine","singular"]},{"form":"sànta","tags":["feminine","singular"]},{"form":"sànti","tags":["masculine","plural"]},{"form":"sànte","tags":["feminine","plural"]}],"senses":[{"glosses":["holy"]}]}"#;

    fn imported(lines: &[&str], pos: PartOfSpeech) -> (LexiconStore, DictionarySource, Rules) {
        let mut store = LexiconStore::new();
        let source = DictionarySource::from_lines(lines);
        let rules = Rules::default();
        import_pos(&mut store, &source, pos, &rules, &ImportOptions::default(), &NullProgress).unwrap();
        (store, source, rules)
    }

    #[test]
    fn test_apocopic_adjective() {
        let (mut store, source, rules) = imported(&[GRANDE, GRAN], PartOfSpeech::Adjective);
        let stats =
            import_allomorphs(&mut store, &source, PartOfSpeech::Adjective, &rules, &NullProgress)
                .unwrap();
        assert_eq!(stats.allomorphs_added, 1);
        assert_eq!(stats.forms_added, 4);

        let grande = store.find_lemma(PartOfSpeech::Adjective, "grande").unwrap().id;
        let gran: Vec<_> = store
            .adjective_forms
            .for_lemma(grande)
            .filter(|f| f.labels.as_deref() == Some("apocopic"))
            .collect();
        assert_eq!(gran.len(), 4);
        assert!(gran.iter().all(|f| f.written.as_deref() == Some("gran")
            && f.form_origin == FormOrigin::AltOf
            && f.written_source == Some(WrittenSource::AltOf)));
    }

    #[test]
    fn test_elided_label() {
        let (mut store, source, rules) = imported(&[GRANDE, GRAND], PartOfSpeech::Adjective);
        import_allomorphs(&mut store, &source, PartOfSpeech::Adjective, &rules, &NullProgress)
            .unwrap();
        let grande = store.find_lemma(PartOfSpeech::Adjective, "grande").unwrap().id;
        let elided: Vec<_> = store
            .adjective_forms
            .for_lemma(grande)
            .filter(|f| f.labels.as_deref() == Some("elided"))
            .collect();
        assert_eq!(elided.len(), 4);
        assert!(elided.iter().all(|f| f.written.as_deref() == Some("grand'")));
    }

    #[test]
    fn test_parent_not_found() {
        let (mut store, source, rules) = imported(&[GRAN], PartOfSpeech::Adjective);
        let stats =
            import_allomorphs(&mut store, &source, PartOfSpeech::Adjective, &rules, &NullProgress)
                .unwrap();
        assert_eq!(stats.parent_not_found, 2);
        assert_eq!(stats.allomorphs_added, 0);
    }

    #[test]
    fn test_hardcoded_san() {
        let (mut store, source, rules) = imported(&[SANTO], PartOfSpeech::Adjective);
        let stats =
            import_allomorphs(&mut store, &source, PartOfSpeech::Adjective, &rules, &NullProgress)
                .unwrap();
        assert_eq!(stats.hardcoded_added, 1);

        let santo = store.find_lemma(PartOfSpeech::Adjective, "santo").unwrap().id;
        let san: Vec<_> = store
            .adjective_forms
            .for_lemma(santo)
            .filter(|f| f.written.as_deref() == Some("san"))
            .collect();
        assert_eq!(san.len(), 1);
        assert_eq!(san[0].gender, Some(Gender::Masculine));
        assert_eq!(san[0].number, Some(Number::Singular));
        assert_eq!(san[0].labels.as_deref(), Some("apocopic"));
        assert_eq!(san[0].form_origin, FormOrigin::Hardcoded);

        let again =
            import_allomorphs(&mut store, &source, PartOfSpeech::Adjective, &rules, &NullProgress)
                .unwrap();
        assert_eq!(again.hardcoded_added, 0);
        assert_eq!(again.duplicates_skipped, 1);
    }

    #[test]
    fn test_noun_allomorph_singular_only() {
        let frate = r#"{"pos":"noun","word":"frate","forms":[{"form":"fràte","tags":["canonical","masculine"]},{"form":"fràti","tags":["plural"]}],"senses":[{"glosses":["friar"],"tags":["masculine"]}]}"#;
        let fra = r#"{"pos":"noun","word":"fra","senses":[{"tags":["apocopic"],"alt_of":[{"word":"frate"}],"glosses":["apocopic form of frate"]}]}"#;
        let (mut store, source, rules) = imported(&[frate, fra], PartOfSpeech::Noun);
        let stats =
            import_allomorphs(&mut store, &source, PartOfSpeech::Noun, &rules, &NullProgress)
                .unwrap();
        assert_eq!(stats.forms_added, 1);
        // the hardcoded "fra" is the same form
        assert_eq!(stats.duplicates_skipped, 1);
        // suora is not in the store
        assert_eq!(stats.parent_not_found, 1);
    }

    #[test]
    fn test_verbs_rejected() {
        let mut store = LexiconStore::new();
        let source = DictionarySource::from_lines(Vec::<String>::new());
        let err = import_allomorphs(
            &mut store,
            &source,
            PartOfSpeech::Verb,
            &Rules::default(),
            &NullProgress,
        );
        assert!(matches!(err, Err(LexiconError::UnsupportedPos(_))));
    }
}
