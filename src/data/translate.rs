use std::collections::HashMap;

use crate::error::{ReconcileError, Result};

// ---------------------------------------------------------------------------
// CodeTranslationTable – plot code → reference code
// ---------------------------------------------------------------------------

/// Plot-library code → reference-data code, as read from the code table.
///
/// Entries keep their original casing and the order their plot codes first
/// appeared in. Comparisons go through [`CodeTranslationTable::lowercased`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTranslationTable {
    rows: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl CodeTranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping. A repeated plot code replaces the earlier data code but
    /// keeps its original position. Returns the replaced data code, if any.
    pub fn insert(&mut self, plot_code: String, data_code: String) -> Option<String> {
        match self.index.get(&plot_code) {
            Some(&pos) => Some(std::mem::replace(&mut self.rows[pos].1, data_code)),
            None => {
                self.index.insert(plot_code.clone(), self.rows.len());
                self.rows.push((plot_code, data_code));
                None
            }
        }
    }

    /// Reference code for `plot_code`, exact-case lookup.
    pub fn get(&self, plot_code: &str) -> Option<&str> {
        self.index.get(plot_code).map(|&pos| self.rows[pos].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Both sides lower-cased, filled in table order. Plot codes that collide
    /// after lower-casing (e.g. `"us"` then `"US"`) resolve to the later one.
    pub fn lowercased(&self) -> LowercaseTranslation {
        let mut entries = HashMap::with_capacity(self.rows.len());
        for (plot_code, data_code) in &self.rows {
            entries.insert(plot_code.to_lowercase(), data_code.to_lowercase());
        }
        LowercaseTranslation { entries }
    }
}

impl FromIterator<(String, String)> for CodeTranslationTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut table = CodeTranslationTable::new();
        for (plot_code, data_code) in iter {
            table.insert(plot_code, data_code);
        }
        table
    }
}

// ---------------------------------------------------------------------------
// LowercaseTranslation – comparison view used by the code join
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LowercaseTranslation {
    entries: HashMap<String, String>,
}

impl LowercaseTranslation {
    /// Lower-cased reference code expected for `plot_code`.
    ///
    /// Fails with [`ReconcileError::TranslationMissing`] if the table has no
    /// row for it; the error reports the code as given.
    pub fn translate(&self, plot_code: &str) -> Result<&str> {
        self.entries
            .get(&plot_code.to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| ReconcileError::TranslationMissing {
                code: plot_code.to_string(),
            })
    }
}
