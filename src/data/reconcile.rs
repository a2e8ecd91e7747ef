use std::collections::HashMap;
use std::collections::hash_map::Entry;

use super::model::{PlotCountrySet, ReconciliationResult, ReferenceDataset};
use super::translate::CodeTranslationTable;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Join strategy
// ---------------------------------------------------------------------------

/// How plot countries are matched against reference keys.
#[derive(Debug, Clone)]
pub enum JoinStrategy {
    /// Display name equals the reference key, case-sensitive.
    ByName,
    /// Plot code translated through the table, then compared to reference
    /// keys ignoring case.
    ByCode(CodeTranslationTable),
}

impl JoinStrategy {
    /// Label used in map titles and output file names.
    pub fn label(&self) -> &'static str {
        match self {
            JoinStrategy::ByName => "name",
            JoinStrategy::ByCode(_) => "code",
        }
    }

    pub fn reconcile(
        &self,
        plot_countries: &PlotCountrySet,
        reference: &ReferenceDataset,
    ) -> Result<ReconciliationResult> {
        match self {
            JoinStrategy::ByName => Ok(reconcile_by_name(plot_countries, reference)),
            JoinStrategy::ByCode(table) => reconcile_by_code(table, plot_countries, reference),
        }
    }
}

// ---------------------------------------------------------------------------
// By name
// ---------------------------------------------------------------------------

/// Match each plot country whose display name is a reference key.
pub fn reconcile_by_name(
    plot_countries: &PlotCountrySet,
    reference: &ReferenceDataset,
) -> ReconciliationResult {
    let mut result = ReconciliationResult::default();
    for (code, name) in plot_countries {
        if reference.contains_key(name) {
            result.matched.insert(code.clone(), name.clone());
        } else {
            result.unmatched.insert(code.clone());
        }
    }
    log::debug!(
        "name join: {} matched, {} unmatched",
        result.matched.len(),
        result.unmatched.len()
    );
    result
}

// ---------------------------------------------------------------------------
// By code
// ---------------------------------------------------------------------------

/// Match each plot code, through the translation table, to a reference key
/// equal to the translated code ignoring case.
///
/// Every plot code must have a translation; a missing one aborts with
/// [`ReconcileError::TranslationMissing`](crate::error::ReconcileError).
/// If several reference keys differ only in case, the one appearing first in
/// the reference data wins. Plot codes and reference keys come out in their
/// original casing.
pub fn reconcile_by_code(
    table: &CodeTranslationTable,
    plot_countries: &PlotCountrySet,
    reference: &ReferenceDataset,
) -> Result<ReconciliationResult> {
    let translation = table.lowercased();
    let folded = fold_reference_keys(reference);

    let mut result = ReconciliationResult::default();
    for code in plot_countries.keys() {
        let expected = translation.translate(code)?;
        match folded.get(expected) {
            Some(&key) => {
                result.matched.insert(code.clone(), key.to_string());
            }
            None => {
                result.unmatched.insert(code.clone());
            }
        }
    }
    log::debug!(
        "code join: {} matched, {} unmatched",
        result.matched.len(),
        result.unmatched.len()
    );
    Ok(result)
}

/// Lower-cased reference key → first key (in file order) folding to it.
fn fold_reference_keys(reference: &ReferenceDataset) -> HashMap<String, &str> {
    let mut folded: HashMap<String, &str> = HashMap::with_capacity(reference.len());
    for key in reference.keys() {
        match folded.entry(key.to_lowercase()) {
            Entry::Vacant(slot) => {
                slot.insert(key);
            }
            Entry::Occupied(slot) => {
                log::warn!(
                    "reference keys '{}' and '{key}' differ only in case; using '{}'",
                    slot.get(),
                    slot.get()
                );
            }
        }
    }
    folded
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::data::model::Record;
    use crate::error::ReconcileError;

    fn plot(pairs: &[(&str, &str)]) -> PlotCountrySet {
        pairs
            .iter()
            .map(|(c, n)| (c.to_string(), n.to_string()))
            .collect()
    }

    fn reference(keys: &[&str]) -> ReferenceDataset {
        keys.iter()
            .map(|k| (k.to_string(), Record::new()))
            .collect()
    }

    fn table(pairs: &[(&str, &str)]) -> CodeTranslationTable {
        pairs
            .iter()
            .map(|(p, d)| (p.to_string(), d.to_string()))
            .collect()
    }

    fn assert_total(result: &ReconciliationResult, plot: &PlotCountrySet) {
        let matched: BTreeSet<&String> = result.matched.keys().collect();
        let unmatched: BTreeSet<&String> = result.unmatched.iter().collect();
        assert!(matched.is_disjoint(&unmatched));
        let union: BTreeSet<&String> = matched.union(&unmatched).copied().collect();
        assert_eq!(union, plot.keys().collect::<BTreeSet<_>>());
    }

    #[test]
    fn by_name_splits_matched_and_unmatched() {
        let plot = plot(&[("us", "United States"), ("xx", "Nowhereland"), ("fr", "France")]);
        let reference = reference(&["France", "United States", "Germany"]);

        let result = reconcile_by_name(&plot, &reference);
        assert_eq!(result.matched["us"], "United States");
        assert_eq!(result.matched["fr"], "France");
        assert_eq!(result.unmatched, BTreeSet::from(["xx".to_string()]));
        assert_total(&result, &plot);
    }

    #[test]
    fn by_name_is_case_sensitive() {
        let plot = plot(&[("us", "united states")]);
        let result = reconcile_by_name(&plot, &reference(&["United States"]));
        assert!(result.matched.is_empty());
        assert!(result.unmatched.contains("us"));
    }

    #[test]
    fn by_code_matches_ignoring_case_and_keeps_casing() {
        let plot = plot(&[("US", "United States"), ("fr", "France")]);
        let table = table(&[("US", "USA"), ("FR", "FRA")]);
        let reference = reference(&["usa", "Fra"]);

        let result = reconcile_by_code(&table, &plot, &reference).unwrap();
        assert_eq!(result.matched["US"], "usa");
        assert_eq!(result.matched["fr"], "Fra");
        assert!(result.unmatched.is_empty());
        assert_total(&result, &plot);
    }

    #[test]
    fn by_code_unmatched_when_reference_lacks_code() {
        let plot = plot(&[("us", "United States"), ("tw", "Taiwan")]);
        let table = table(&[("us", "USA"), ("tw", "TWN")]);
        let result = reconcile_by_code(&table, &plot, &reference(&["USA"])).unwrap();

        assert_eq!(result.matched.len(), 1);
        assert_eq!(result.unmatched, BTreeSet::from(["tw".to_string()]));
        assert_total(&result, &plot);
    }

    #[test]
    fn by_code_requires_translation() {
        let plot = plot(&[("us", "United States"), ("de", "Germany")]);
        let table = table(&[("us", "USA")]);
        let err = reconcile_by_code(&table, &plot, &reference(&["USA", "DEU"])).unwrap_err();
        assert!(matches!(err, ReconcileError::TranslationMissing { ref code } if code == "de"));
    }

    #[test]
    fn by_code_first_case_variant_wins() {
        let plot = plot(&[("us", "United States")]);
        let table = table(&[("us", "usa")]);

        let first = reconcile_by_code(&table, &plot, &reference(&["Usa", "USA", "usa"])).unwrap();
        assert_eq!(first.matched["us"], "Usa");

        let flipped = reconcile_by_code(&table, &plot, &reference(&["USA", "Usa"])).unwrap();
        assert_eq!(flipped.matched["us"], "USA");
    }

    #[test]
    fn reconciliation_is_deterministic() {
        let plot = plot(&[("us", "United States"), ("ca", "Canada"), ("mx", "Mexico")]);
        let table = table(&[("US", "USA"), ("CA", "CAN"), ("MX", "MEX")]);
        let reference = reference(&["can", "USA", "Can", "usa"]);

        let a = reconcile_by_code(&table, &plot, &reference).unwrap();
        let b = reconcile_by_code(&table, &plot, &reference).unwrap();
        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), format!("{b:?}"));
        assert_eq!(a.matched["ca"], "can");
    }

    #[test]
    fn strategy_dispatch() {
        let plot = plot(&[("US", "United States")]);
        let reference = reference(&["United States", "USA"]);

        let by_name = JoinStrategy::ByName.reconcile(&plot, &reference).unwrap();
        assert_eq!(by_name.matched["US"], "United States");

        let by_code = JoinStrategy::ByCode(table(&[("US", "USA")]));
        assert_eq!(by_code.label(), "code");
        assert_eq!(by_code.reconcile(&plot, &reference).unwrap().matched["US"], "USA");
    }
}
