//! Post-import verification.
//!
//! Checks run against a finished store in four groups: integrity of row
//! references, consistency between metadata and forms, coverage against
//! configured thresholds, and spot checks of well-known words. A few
//! informational metrics are collected alongside.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::Write as _;

use crate::config::CoverageThresholds;
use crate::grammar::{
    Auxiliary, Degree, GenderClass, InflectionClass, Number, NumberClass, PartOfSpeech,
};
use crate::model::{FormRecord, Lemma, LemmaId};
use crate::orthography::normalize;
use crate::store::{FormTable, LexiconStore};

/// Details listed per failed check in a verbose summary
const MAX_DETAILS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    Integrity,
    Consistency,
    Coverage,
    Spot,
}

impl CheckCategory {
    pub const ALL: [CheckCategory; 4] = [
        CheckCategory::Integrity,
        CheckCategory::Consistency,
        CheckCategory::Coverage,
        CheckCategory::Spot,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            CheckCategory::Integrity => "Integrity Checks",
            CheckCategory::Consistency => "Consistency Checks",
            CheckCategory::Coverage => "Coverage",
            CheckCategory::Spot => "Spot Checks",
        }
    }
}

/// Outcome of a single check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub category: CheckCategory,
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Vec<String>,
}

impl CheckResult {
    fn new(category: CheckCategory, name: &str, passed: bool, message: String) -> Self {
        CheckResult {
            category,
            name: name.to_string(),
            passed,
            message,
            details: Vec::new(),
        }
    }

    /// Passed if `issues` is empty
    fn from_issues(category: CheckCategory, name: &str, title: &str, issues: Vec<String>) -> Self {
        if issues.is_empty() {
            return CheckResult::new(category, name, true, title.to_string());
        }
        CheckResult {
            category,
            name: name.to_string(),
            passed: false,
            message: format!("{}: {} violation(s)", title, issues.len()),
            details: issues,
        }
    }
}

/// What [`verify`] checks
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub thresholds: CoverageThresholds,
    pub spot_checks: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions {
            thresholds: CoverageThresholds::default(),
            spot_checks: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationReport {
    pub checks: Vec<CheckResult>,
    pub metrics: BTreeMap<String, f64>,
}

impl VerificationReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_count(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }

    pub fn total_count(&self) -> usize {
        self.checks.len()
    }

    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }

    pub fn checks_in(&self, category: CheckCategory) -> impl Iterator<Item = &CheckResult> {
        self.checks.iter().filter(move |c| c.category == category)
    }

    /// Human-readable report. `verbose` adds failure details and metrics.
    pub fn summary(&self, verbose: bool) -> String {
        let mut out = String::new();
        for category in CheckCategory::ALL {
            let mut checks = self.checks_in(category).peekable();
            if checks.peek().is_none() {
                continue;
            }
            let _ = writeln!(out, "\n{}:", category.title());
            for check in checks {
                let status = if check.passed { "[PASS]" } else { "[FAIL]" };
                let _ = writeln!(out, "  {} {}", status, check.message);
                if verbose {
                    for detail in check.details.iter().take(MAX_DETAILS) {
                        let _ = writeln!(out, "    - {}", detail);
                    }
                    if check.details.len() > MAX_DETAILS {
                        let _ = writeln!(out, "    ... and {} more", check.details.len() - MAX_DETAILS);
                    }
                }
            }
        }

        if verbose && !self.metrics.is_empty() {
            out.push_str("\nMetrics:\n");
            for (key, value) in &self.metrics {
                let unit = if key.ends_with("_pct") { "%" } else { "" };
                let _ = writeln!(out, "  {}: {:.1}{}", key, value, unit);
            }
        }

        out.push('\n');
        if self.all_passed() {
            let _ = write!(out, "Result: All {} checks passed", self.total_count());
        } else {
            let _ = write!(out, "Result: FAILED ({} check(s) failed)", self.failed_count());
        }
        out
    }
}

/// Run every check against `store`
pub fn verify(store: &LexiconStore, options: &VerifyOptions) -> VerificationReport {
    let mut report = VerificationReport::default();

    report.checks.push(check_duplicate_forms(store));
    report.checks.push(check_orphaned_forms(store));
    report.checks.push(check_orphaned_frequencies(store));

    report.checks.push(check_number_classes(store));
    report.checks.push(check_adjective_classes(store));
    report.checks.push(check_citation_forms(store));
    report.checks.push(check_metadata_rows(store));

    report.checks.extend(check_coverage(store, &options.thresholds));

    if options.spot_checks {
        report.checks.extend(run_spot_checks(store));
    }

    report.metrics = collect_metrics(store);

    log::info!(
        "Verification: {} of {} checks passed",
        report.total_count() - report.failed_count(),
        report.total_count()
    );
    report
}

fn pct(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn describe(store: &LexiconStore, id: LemmaId) -> String {
    store
        .lemma(id)
        .map(|l| l.stressed.clone())
        .unwrap_or_else(|| format!("lemma_id={}", id))
}

// ----------------------------------------------------------------------
// Integrity
// ----------------------------------------------------------------------

fn duplicate_keys<F: FormRecord>(table: &FormTable<F>, pos: PartOfSpeech, issues: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for form in table.iter() {
        if !seen.insert(form.unique_key()) {
            issues.push(format!("{} form {} (lemma_id={})", pos, form.stressed(), form.lemma_id()));
        }
    }
}

fn check_duplicate_forms(store: &LexiconStore) -> CheckResult {
    let mut issues = Vec::new();
    duplicate_keys(&store.verb_forms, PartOfSpeech::Verb, &mut issues);
    duplicate_keys(&store.noun_forms, PartOfSpeech::Noun, &mut issues);
    duplicate_keys(&store.adjective_forms, PartOfSpeech::Adjective, &mut issues);
    CheckResult::from_issues(CheckCategory::Integrity, "duplicate_forms", "No duplicate forms", issues)
}

fn orphans<F: FormRecord>(
    table: &FormTable<F>,
    lemmas: &HashSet<LemmaId>,
    pos: PartOfSpeech,
    issues: &mut Vec<String>,
) {
    for form in table.iter().filter(|f| !lemmas.contains(&f.lemma_id())) {
        issues.push(format!("{} form {} (lemma_id={})", pos, form.stressed(), form.lemma_id()));
    }
}

fn check_orphaned_forms(store: &LexiconStore) -> CheckResult {
    let mut issues = Vec::new();
    orphans(&store.verb_forms, &store.lemma_ids(PartOfSpeech::Verb), PartOfSpeech::Verb, &mut issues);
    orphans(&store.noun_forms, &store.lemma_ids(PartOfSpeech::Noun), PartOfSpeech::Noun, &mut issues);
    orphans(
        &store.adjective_forms,
        &store.lemma_ids(PartOfSpeech::Adjective),
        PartOfSpeech::Adjective,
        &mut issues,
    );
    CheckResult::from_issues(CheckCategory::Integrity, "orphaned_forms", "No orphaned forms", issues)
}

fn check_orphaned_frequencies(store: &LexiconStore) -> CheckResult {
    let issues = store
        .frequencies()
        .iter()
        .filter(|f| store.lemma(f.lemma_id).is_none())
        .map(|f| format!("lemma_id={} ({})", f.lemma_id, f.corpus))
        .collect();
    CheckResult::from_issues(
        CheckCategory::Integrity,
        "orphaned_frequencies",
        "No orphaned frequencies",
        issues,
    )
}

// ----------------------------------------------------------------------
// Consistency
// ----------------------------------------------------------------------

fn check_number_classes(store: &LexiconStore) -> CheckResult {
    let mut issues = Vec::new();
    for (&id, metadata) in &store.noun_metadata {
        let unexpected = match metadata.number_class {
            NumberClass::PluraliaTantum => Number::Singular,
            NumberClass::SingulariaTantum => Number::Plural,
            _ => continue,
        };
        let count = store
            .noun_forms
            .for_lemma(id)
            .filter(|f| f.number == Some(unexpected))
            .count();
        if count > 0 {
            issues.push(format!(
                "{} with {} {} forms: {}",
                metadata.number_class,
                count,
                unexpected,
                describe(store, id)
            ));
        }
    }
    CheckResult::from_issues(
        CheckCategory::Consistency,
        "number_class_consistency",
        "Number class consistency",
        issues,
    )
}

fn check_adjective_classes(store: &LexiconStore) -> CheckResult {
    let mut issues = Vec::new();
    for (&id, metadata) in &store.adjective_metadata {
        if metadata.inflection_class != InflectionClass::FourForm {
            continue;
        }
        let combos: HashSet<_> = store
            .adjective_forms
            .for_lemma(id)
            .filter(|f| f.degree == Degree::Positive)
            .map(|f| (f.gender, f.number))
            .collect();
        if combos.len() != 4 {
            issues.push(format!("{}: {} combos (expected 4)", describe(store, id), combos.len()));
        }
    }
    CheckResult::from_issues(
        CheckCategory::Consistency,
        "adjective_class_consistency",
        "Adjective class consistency",
        issues,
    )
}

fn citation_counts<F: FormRecord>(table: &FormTable<F>) -> HashMap<LemmaId, usize> {
    let mut counts = HashMap::new();
    for form in table.iter().filter(|f| f.is_citation_form()) {
        *counts.entry(form.lemma_id()).or_insert(0) += 1;
    }
    counts
}

fn check_citation_forms(store: &LexiconStore) -> CheckResult {
    let mut issues = Vec::new();
    for pos in PartOfSpeech::ALL.iter().copied() {
        let counts = match pos {
            PartOfSpeech::Verb => citation_counts(&store.verb_forms),
            PartOfSpeech::Noun => citation_counts(&store.noun_forms),
            PartOfSpeech::Adjective => citation_counts(&store.adjective_forms),
        };
        for lemma in store.lemmas_of(pos) {
            let count = counts.get(&lemma.id).copied().unwrap_or(0);
            if count != 1 {
                issues.push(format!("{} {}: {} citation forms", pos, lemma.stressed, count));
            }
        }
    }
    CheckResult::from_issues(
        CheckCategory::Consistency,
        "citation_forms",
        "Citation form markers",
        issues,
    )
}

fn check_metadata_rows(store: &LexiconStore) -> CheckResult {
    let mut issues = Vec::new();
    for pos in PartOfSpeech::ALL.iter().copied() {
        let has_row = |id: &LemmaId| match pos {
            PartOfSpeech::Verb => store.verb_metadata.contains_key(id),
            PartOfSpeech::Noun => store.noun_metadata.contains_key(id),
            PartOfSpeech::Adjective => store.adjective_metadata.contains_key(id),
        };
        for lemma in store.lemmas_of(pos).filter(|l| !has_row(&l.id)) {
            issues.push(format!("{} without metadata: {} (id={})", pos, lemma.stressed, lemma.id));
        }
    }
    let orphaned = store
        .verb_metadata
        .keys()
        .chain(store.noun_metadata.keys())
        .chain(store.adjective_metadata.keys())
        .filter(|id| store.lemma(**id).is_none());
    for id in orphaned {
        issues.push(format!("metadata without lemma: id={}", id));
    }
    CheckResult::from_issues(
        CheckCategory::Consistency,
        "metadata_rows",
        "Metadata row existence",
        issues,
    )
}

// ----------------------------------------------------------------------
// Coverage
// ----------------------------------------------------------------------

fn count_check(name: &str, label: &str, count: usize, min: usize) -> CheckResult {
    CheckResult::new(
        CheckCategory::Coverage,
        name,
        count >= min,
        format!("{}: {} (min: {})", label, count, min),
    )
}

fn pct_check(name: &str, label: &str, value: f64, min: f64) -> CheckResult {
    CheckResult::new(
        CheckCategory::Coverage,
        name,
        value >= min,
        format!("{}: {:.1}% (min: {:.1}%)", label, value, min),
    )
}

fn written_count<F: FormRecord>(table: &FormTable<F>) -> usize {
    table.iter().filter(|f| f.written().is_some()).count()
}

fn check_coverage(store: &LexiconStore, thresholds: &CoverageThresholds) -> Vec<CheckResult> {
    let counts = store.counts();
    let mut results = vec![count_check(
        "total_lemmas",
        "Lemmas",
        counts.lemmas,
        thresholds.total_lemmas,
    )];
    for pos in PartOfSpeech::ALL.iter().copied() {
        let label = format!("{} lemmas", pos);
        results.push(count_check(
            &format!("{}_lemmas", pos),
            &label,
            store.lemma_count(pos),
            thresholds.lemmas_for(pos),
        ));
    }
    results.push(count_check("total_forms", "Total forms", counts.forms(), thresholds.total_forms));

    let written = written_count(&store.verb_forms)
        + written_count(&store.noun_forms)
        + written_count(&store.adjective_forms);
    results.push(pct_check(
        "written_spelling",
        "Forms with spelling",
        pct(written, counts.forms()),
        thresholds.written_pct,
    ));

    let with_frequency: HashSet<LemmaId> = store.frequencies().iter().map(|f| f.lemma_id).collect();
    results.push(pct_check(
        "frequency_coverage",
        "Frequency coverage",
        pct(with_frequency.len(), counts.lemmas),
        thresholds.frequency_pct,
    ));
    results
}

// ----------------------------------------------------------------------
// Spot checks
// ----------------------------------------------------------------------

/// Facts about one well-known lemma
enum Expect {
    Verb { min_forms: usize, auxiliary: Auxiliary },
    Noun { gender_class: GenderClass },
    Adjective { class: InflectionClass },
}

const SPOT_CHECKS: &[(&str, PartOfSpeech, Expect)] = &[
    ("parlàre", PartOfSpeech::Verb, Expect::Verb { min_forms: 50, auxiliary: Auxiliary::Avere }),
    ("èssere", PartOfSpeech::Verb, Expect::Verb { min_forms: 50, auxiliary: Auxiliary::Essere }),
    ("avére", PartOfSpeech::Verb, Expect::Verb { min_forms: 50, auxiliary: Auxiliary::Avere }),
    ("andàre", PartOfSpeech::Verb, Expect::Verb { min_forms: 50, auxiliary: Auxiliary::Essere }),
    ("casa", PartOfSpeech::Noun, Expect::Noun { gender_class: GenderClass::Feminine }),
    ("uomo", PartOfSpeech::Noun, Expect::Noun { gender_class: GenderClass::Masculine }),
    ("bello", PartOfSpeech::Adjective, Expect::Adjective { class: InflectionClass::FourForm }),
    ("blu", PartOfSpeech::Adjective, Expect::Adjective { class: InflectionClass::Invariable }),
    ("facile", PartOfSpeech::Adjective, Expect::Adjective { class: InflectionClass::TwoForm }),
];

fn spot_lemma<'s>(store: &'s LexiconStore, stressed: &str, pos: PartOfSpeech) -> Option<&'s Lemma> {
    store
        .find_lemma_by_stressed(pos, stressed)
        .or_else(|| store.find_lemma(pos, &normalize(stressed)))
}

fn spot_issues(store: &LexiconStore, id: LemmaId, expect: &Expect) -> Vec<String> {
    let mut issues = Vec::new();
    match expect {
        Expect::Verb { min_forms, auxiliary } => {
            let count = store.verb_forms.for_lemma(id).count();
            if count < *min_forms {
                issues.push(format!("forms: {} < {}", count, min_forms));
            }
            let actual = store.verb_metadata.get(&id).and_then(|m| m.auxiliary);
            if actual != Some(*auxiliary) {
                issues.push(format!("auxiliary: {:?} != {}", actual.map(|a| a.as_str()), auxiliary));
            }
        }
        Expect::Noun { gender_class } => {
            let actual = store.noun_metadata.get(&id).map(|m| m.gender_class);
            if actual != Some(*gender_class) {
                issues.push(format!("gender_class: {:?} != {}", actual.map(|g| g.as_str()), gender_class));
            }
            if !store
                .noun_forms
                .for_lemma(id)
                .any(|f| f.number == Some(Number::Plural))
            {
                issues.push("has_plural: false != true".to_string());
            }
        }
        Expect::Adjective { class } => {
            let actual = store.adjective_metadata.get(&id).map(|m| m.inflection_class);
            if actual != Some(*class) {
                issues.push(format!("inflection_class: {:?} != {}", actual.map(|c| c.as_str()), class));
            }
        }
    }
    issues
}

fn run_spot_checks(store: &LexiconStore) -> Vec<CheckResult> {
    SPOT_CHECKS
        .iter()
        .map(|(stressed, pos, expect)| {
            let name = format!("spot_{}", stressed);
            let Some(lemma) = spot_lemma(store, stressed, *pos) else {
                return CheckResult::new(
                    CheckCategory::Spot,
                    &name,
                    false,
                    format!("{} ({}): lemma not found", stressed, pos),
                );
            };
            let issues = spot_issues(store, lemma.id, expect);
            if issues.is_empty() {
                CheckResult::new(CheckCategory::Spot, &name, true, format!("{} ({}): verified", stressed, pos))
            } else {
                CheckResult {
                    category: CheckCategory::Spot,
                    name,
                    passed: false,
                    message: format!("{} ({}): {} issue(s)", stressed, pos, issues.len()),
                    details: issues,
                }
            }
        })
        .collect()
}

// ----------------------------------------------------------------------
// Metrics
// ----------------------------------------------------------------------

fn average_forms<F: FormRecord>(table: &FormTable<F>) -> f64 {
    let lemmas: HashSet<LemmaId> = table.iter().map(|f| f.lemma_id()).collect();
    if lemmas.is_empty() {
        0.0
    } else {
        table.len() as f64 / lemmas.len() as f64
    }
}

fn collect_metrics(store: &LexiconStore) -> BTreeMap<String, f64> {
    let mut metrics = BTreeMap::new();
    metrics.insert("avg_verb_forms".to_string(), average_forms(&store.verb_forms));
    metrics.insert("avg_noun_forms".to_string(), average_forms(&store.noun_forms));
    metrics.insert("avg_adjective_forms".to_string(), average_forms(&store.adjective_forms));

    let total = store.counts().lemmas;
    let with_ipa = store.lemmas().filter(|l| l.ipa.is_some()).count();
    metrics.insert("lemmas_with_ipa_pct".to_string(), pct(with_ipa, total));

    let defined: HashSet<LemmaId> = store.definitions().iter().map(|d| d.lemma_id).collect();
    metrics.insert("lemmas_with_definitions_pct".to_string(), pct(defined.len(), total));

    let both = store
        .noun_metadata
        .iter()
        .filter(|(_, m)| m.number_class == NumberClass::Standard)
        .filter(|(id, _)| {
            let numbers: HashSet<Number> = store
                .noun_forms
                .for_lemma(**id)
                .filter_map(|f| f.number)
                .collect();
            numbers.len() == 2
        })
        .count();
    metrics.insert(
        "nouns_with_sg_and_pl_pct".to_string(),
        pct(both, store.noun_metadata.len()),
    );

    metrics.into_iter().map(|(k, v)| (k, round1(v))).collect()
}
