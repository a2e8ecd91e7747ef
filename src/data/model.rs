use std::collections::{BTreeMap, BTreeSet, HashMap};

// ---------------------------------------------------------------------------
// PlotCountrySet – the plotting library's country catalogue
// ---------------------------------------------------------------------------

/// Plot code (as the plotting library spells it) → display name.
pub type PlotCountrySet = BTreeMap<String, String>;

/// One row of the GDP table: field name → raw cell text.
/// An empty string means the cell carried no data.
pub type Record = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// ReferenceDataset – GDP rows keyed by country name or code
// ---------------------------------------------------------------------------

/// GDP rows keyed by a reference key, in the order the keys first appeared.
///
/// Lookups go through a hash index; iteration follows file order, which the
/// code join relies on to break ties between keys differing only in case.
#[derive(Debug, Clone, Default)]
pub struct ReferenceDataset {
    rows: Vec<(String, Record)>,
    index: HashMap<String, usize>,
}

impl ReferenceDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row. A repeated key replaces the earlier record but keeps its
    /// original position. Returns the replaced record, if any.
    pub fn insert(&mut self, key: String, record: Record) -> Option<Record> {
        match self.index.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.rows[pos].1, record)),
            None => {
                self.index.insert(key.clone(), self.rows.len());
                self.rows.push((key, record));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.index.get(key).map(|&pos| &self.rows[pos].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl FromIterator<(String, Record)> for ReferenceDataset {
    fn from_iter<I: IntoIterator<Item = (String, Record)>>(iter: I) -> Self {
        let mut ds = ReferenceDataset::new();
        for (key, record) in iter {
            ds.insert(key, record);
        }
        ds
    }
}

// ---------------------------------------------------------------------------
// Join outputs
// ---------------------------------------------------------------------------

/// Output of the join stage.
///
/// Every plot code lands in exactly one of `matched` or `unmatched`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// Plot code → reference key, both in their original casing.
    pub matched: BTreeMap<String, String>,
    /// Plot codes with no reference key.
    pub unmatched: BTreeSet<String>,
}

/// How a single plot code ended up after resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Partition {
    /// Found in the reference data with a value; holds log10 of it.
    MatchedValue(f64),
    /// No reference key for this plot code.
    MissingFromReference,
    /// Found, but the requested year's field is empty.
    NoValueForYear,
}

/// Output of the resolution stage: three disjoint partitions of the plot
/// codes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedResult {
    /// Plot code → log10 of its value for the year.
    pub values: BTreeMap<String, f64>,
    pub missing_from_reference: BTreeSet<String>,
    pub no_value_for_year: BTreeSet<String>,
}

impl ResolvedResult {
    /// Which partition `code` belongs to, if it was part of the input at all.
    pub fn partition_of(&self, code: &str) -> Option<Partition> {
        if let Some(&v) = self.values.get(code) {
            Some(Partition::MatchedValue(v))
        } else if self.missing_from_reference.contains(code) {
            Some(Partition::MissingFromReference)
        } else if self.no_value_for_year.contains(code) {
            Some(Partition::NoValueForYear)
        } else {
            None
        }
    }

    /// Every plot code with its partition, ordered by code.
    pub fn partitions(&self) -> BTreeMap<&str, Partition> {
        let mut out: BTreeMap<&str, Partition> = BTreeMap::new();
        for (code, &v) in &self.values {
            out.insert(code, Partition::MatchedValue(v));
        }
        for code in &self.missing_from_reference {
            out.insert(code, Partition::MissingFromReference);
        }
        for code in &self.no_value_for_year {
            out.insert(code, Partition::NoValueForYear);
        }
        out
    }

    /// Total number of plot codes classified.
    pub fn len(&self) -> usize {
        self.values.len() + self.missing_from_reference.len() + self.no_value_for_year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
