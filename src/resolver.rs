//! Written-spelling reconciliation.
//!
//! Every form without a `written` spelling is offered to a chain of
//! resolvers, in priority order. The first resolver that returns a spelling
//! wins and its [`WrittenSource`] is recorded on the form. Forms that already
//! have a spelling are never touched.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::dictionary::DictionaryIndex;
use crate::error::Result;
use crate::grammar::{PartOfSpeech, WrittenSource};
use crate::model::{FormRecord, LemmaId};
use crate::orthography::{has_accent, normalize};
use crate::progress::ProgressSink;
use crate::rules::Rules;
use crate::secondary::SecondaryLexicon;
use crate::store::{FormTable, LexiconStore};

/// What a resolver may consult for one form
pub struct ResolveContext<'a> {
    pub pos: PartOfSpeech,
    /// Normalized headword of the form's lemma
    pub lemma_normalized: &'a str,
    pub rules: &'a Rules,
    pub lexicon: Option<&'a SecondaryLexicon>,
    pub index: Option<&'a DictionaryIndex>,
}

/// One strategy for finding the written spelling of a stressed form
pub trait SpellingResolver {
    /// Name used in statistics
    fn name(&self) -> &'static str;

    fn resolve(&self, stressed: &str, ctx: &ResolveContext<'_>) -> Option<(String, WrittenSource)>;
}

/// Loanwords whose accents belong to the spelling (décolleté)
pub struct LoanwordResolver;

impl SpellingResolver for LoanwordResolver {
    fn name(&self) -> &'static str {
        "loanword"
    }

    fn resolve(&self, stressed: &str, ctx: &ResolveContext<'_>) -> Option<(String, WrittenSource)> {
        let written = ctx.rules.orthography.loanword(stressed)?;
        Some((written.to_string(), WrittenSource::LoanwordException))
    }
}

/// The stressed form occurs verbatim in the secondary lexicon
pub struct SecondaryExactResolver;

impl SpellingResolver for SecondaryExactResolver {
    fn name(&self) -> &'static str {
        "secondary_exact"
    }

    fn resolve(&self, stressed: &str, ctx: &ResolveContext<'_>) -> Option<(String, WrittenSource)> {
        if ctx.lexicon?.contains_exact(ctx.pos, stressed) {
            Some((stressed.to_string(), WrittenSource::SecondaryExact))
        } else {
            None
        }
    }
}

/// An accented stressed form whose derived written spelling is a secondary
/// form (pàrlo → parlo). Accents the stressed form does not carry on its
/// final vowel are never added (pàpa never becomes papà).
pub struct SecondaryNormalizedResolver;

impl SpellingResolver for SecondaryNormalizedResolver {
    fn name(&self) -> &'static str {
        "secondary"
    }

    fn resolve(&self, stressed: &str, ctx: &ResolveContext<'_>) -> Option<(String, WrittenSource)> {
        if !has_accent(stressed) {
            return None;
        }
        let lexicon = ctx.lexicon?;
        let derived = ctx.rules.derive_written(stressed)?;
        let written = lexicon.written_match(ctx.pos, &derived)?;
        Some((written.to_string(), WrittenSource::Secondary))
    }
}

/// Page title of a form-of entry that names this form's lemma
pub struct FormOfResolver;

impl SpellingResolver for FormOfResolver {
    fn name(&self) -> &'static str {
        "form_of"
    }

    fn resolve(&self, stressed: &str, ctx: &ResolveContext<'_>) -> Option<(String, WrittenSource)> {
        let title = ctx
            .index?
            .form_of_spelling(ctx.lemma_normalized, &normalize(stressed))?;
        Some((title.to_string(), WrittenSource::FormOf))
    }
}

/// A form without stress marks is already written
pub struct NoAccentResolver;

impl SpellingResolver for NoAccentResolver {
    fn name(&self) -> &'static str {
        "no_accent"
    }

    fn resolve(&self, stressed: &str, _ctx: &ResolveContext<'_>) -> Option<(String, WrittenSource)> {
        if has_accent(stressed) {
            None
        } else {
            Some((stressed.to_string(), WrittenSource::NoAccent))
        }
    }
}

/// Orthographic derivation, the last resort
pub struct OrthographyResolver;

impl SpellingResolver for OrthographyResolver {
    fn name(&self) -> &'static str {
        "orthography_rule"
    }

    fn resolve(&self, stressed: &str, ctx: &ResolveContext<'_>) -> Option<(String, WrittenSource)> {
        derived_spelling(stressed, ctx.rules)
    }
}

/// Derived spelling tagged with the rule that produced it
pub fn derived_spelling(stressed: &str, rules: &Rules) -> Option<(String, WrittenSource)> {
    let source = if rules.orthography.loanword(stressed).is_some() {
        WrittenSource::LoanwordRule
    } else {
        WrittenSource::OrthographyRule
    };
    rules.derive_written(stressed).map(|w| (w, source))
}

/// Resolvers tried in order
pub struct ResolverChain {
    resolvers: Vec<Box<dyn SpellingResolver>>,
}

impl Default for ResolverChain {
    fn default() -> Self {
        ResolverChain::new(vec![
            Box::new(LoanwordResolver),
            Box::new(SecondaryExactResolver),
            Box::new(SecondaryNormalizedResolver),
            Box::new(FormOfResolver),
            Box::new(NoAccentResolver),
            Box::new(OrthographyResolver),
        ])
    }
}

impl ResolverChain {
    pub fn new(resolvers: Vec<Box<dyn SpellingResolver>>) -> Self {
        ResolverChain { resolvers }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.resolvers.iter().map(|r| r.name()).collect()
    }

    /// First spelling any resolver finds, with the resolver's name
    pub fn resolve(
        &self,
        stressed: &str,
        ctx: &ResolveContext<'_>,
    ) -> Option<(String, WrittenSource, &'static str)> {
        self.resolvers.iter().find_map(|r| {
            r.resolve(stressed, ctx)
                .map(|(written, source)| (written, source, r.name()))
        })
    }
}

/// Statistics of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolveStats {
    pub forms_checked: usize,
    pub already_filled: usize,
    pub updated: usize,
    pub unresolved: usize,
    /// Hits per resolver
    #[serde(flatten)]
    pub by_resolver: BTreeMap<String, usize>,
}

/// Fill the `written` spelling of every form of `pos` that lacks one
pub fn reconcile_spellings(
    store: &mut LexiconStore,
    pos: PartOfSpeech,
    chain: &ResolverChain,
    rules: &Rules,
    lexicon: Option<&SecondaryLexicon>,
    index: Option<&DictionaryIndex>,
    progress: &dyn ProgressSink,
) -> Result<ResolveStats> {
    store.transaction(|store| {
        let mut stats = ResolveStats::default();
        for name in chain.names() {
            stats.by_resolver.insert(name.to_string(), 0);
        }
        let lemmas: HashMap<LemmaId, String> = store
            .lemmas_of(pos)
            .map(|l| (l.id, l.normalized.clone()))
            .collect();

        let pass = Pass {
            pos,
            chain,
            rules,
            lexicon,
            index,
            lemmas: &lemmas,
            progress,
        };
        match pos {
            PartOfSpeech::Verb => pass.run(&mut store.verb_forms, &mut stats),
            PartOfSpeech::Noun => pass.run(&mut store.noun_forms, &mut stats),
            PartOfSpeech::Adjective => pass.run(&mut store.adjective_forms, &mut stats),
        }

        log::info!(
            "Reconciled {} {} forms: {} updated, {} already filled, {} unresolved",
            stats.forms_checked,
            pos,
            stats.updated,
            stats.already_filled,
            stats.unresolved
        );
        if stats.unresolved > 0 {
            log::warn!("{} {} forms have no written spelling", stats.unresolved, pos);
        }
        Ok(stats)
    })
}

struct Pass<'a> {
    pos: PartOfSpeech,
    chain: &'a ResolverChain,
    rules: &'a Rules,
    lexicon: Option<&'a SecondaryLexicon>,
    index: Option<&'a DictionaryIndex>,
    lemmas: &'a HashMap<LemmaId, String>,
    progress: &'a dyn ProgressSink,
}

impl Pass<'_> {
    fn run<F: FormRecord>(&self, table: &mut FormTable<F>, stats: &mut ResolveStats) {
        let total = table.len();
        let pass_name = format!("reconcile {}", self.pos.plural());
        table.modify(|rows| {
            for (i, form) in rows.iter_mut().enumerate() {
                let Some(lemma_normalized) = self.lemmas.get(&form.lemma_id()) else {
                    continue;
                };
                stats.forms_checked += 1;
                if form.written().is_some() {
                    stats.already_filled += 1;
                    continue;
                }
                let ctx = ResolveContext {
                    pos: self.pos,
                    lemma_normalized,
                    rules: self.rules,
                    lexicon: self.lexicon,
                    index: self.index,
                };
                match self.chain.resolve(form.stressed(), &ctx) {
                    Some((written, source, name)) => {
                        form.set_written(written, source);
                        *stats.by_resolver.entry(name.to_string()).or_default() += 1;
                        stats.updated += 1;
                    }
                    None => {
                        log::debug!("No written spelling for {}", form.stressed());
                        stats.unresolved += 1;
                    }
                }
                if (i + 1) % 10_000 == 0 {
                    self.progress.update(&pass_name, i + 1, total);
                }
            }
        });
        self.progress.finish(&pass_name, total);
    }
}

/// Statistics of the lemma spelling pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LemmaWrittenStats {
    pub updated: usize,
    pub from_form: usize,
    pub derived: usize,
    pub no_citation_form: usize,
    pub failed: usize,
}

/// Give every lemma of `pos` a written spelling: its citation form's, or a
/// derived one
pub fn enrich_lemma_written(
    store: &mut LexiconStore,
    pos: PartOfSpeech,
    rules: &Rules,
) -> Result<LemmaWrittenStats> {
    store.transaction(|store| {
        let citations = match pos {
            PartOfSpeech::Verb => citation_spellings(&store.verb_forms),
            PartOfSpeech::Noun => citation_spellings(&store.noun_forms),
            PartOfSpeech::Adjective => citation_spellings(&store.adjective_forms),
        };

        let mut stats = LemmaWrittenStats::default();
        for lemma in store.lemmas_of_mut(pos).filter(|l| l.written.is_none()) {
            if let Some(written) = citations.get(&lemma.id) {
                lemma.written = Some(written.clone());
                lemma.written_source = Some(WrittenSource::CitationForm);
                stats.from_form += 1;
                stats.updated += 1;
                continue;
            }
            stats.no_citation_form += 1;
            match derived_spelling(&lemma.stressed, rules) {
                Some((written, source)) => {
                    lemma.written = Some(written);
                    lemma.written_source = Some(source);
                    stats.derived += 1;
                    stats.updated += 1;
                }
                None => stats.failed += 1,
            }
        }

        log::info!(
            "Lemma spellings for {}: {} from citation forms, {} derived, {} failed",
            pos.plural(),
            stats.from_form,
            stats.derived,
            stats.failed
        );
        Ok(stats)
    })
}

fn citation_spellings<F: FormRecord>(table: &FormTable<F>) -> HashMap<LemmaId, String> {
    let mut spellings = HashMap::new();
    for form in table.iter().filter(|f| f.is_citation_form()) {
        if let Some(written) = form.written() {
            spellings
                .entry(form.lemma_id())
                .or_insert_with(|| written.to_string());
        }
    }
    spellings
}
