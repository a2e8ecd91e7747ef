use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::error::DataSourceError;

// ---------------------------------------------------------------------------
// Table descriptions
// ---------------------------------------------------------------------------

fn default_separator() -> String {
    ",".to_string()
}

fn default_quote() -> String {
    "\"".to_string()
}

/// Where the GDP table lives and how to read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GdpInfo {
    pub gdpfile: PathBuf,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_quote")]
    pub quote: String,
    /// Inclusive range of year columns present in the file.
    pub min_year: i32,
    pub max_year: i32,
    /// Field holding the country name (key for the name join).
    pub country_name: String,
    /// Field holding the country code (key for the code join).
    pub country_code: String,
}

/// Where the plot-code → data-code translation table lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeInfo {
    pub codefile: PathBuf,
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_quote")]
    pub quote: String,
    /// Field holding the plotting library's code.
    pub plot_codes: String,
    /// Field holding the code used by the GDP table.
    pub data_codes: String,
}

impl GdpInfo {
    pub fn dialect(&self) -> Result<Dialect, DataSourceError> {
        Dialect::new(&self.separator, &self.quote)
    }

    /// Whether `year` names a column inside the configured range.
    pub fn covers_year(&self, year: &str) -> bool {
        year.parse::<i32>()
            .map(|y| (self.min_year..=self.max_year).contains(&y))
            .unwrap_or(false)
    }
}

impl CodeInfo {
    pub fn dialect(&self) -> Result<Dialect, DataSourceError> {
        Dialect::new(&self.separator, &self.quote)
    }
}

// ---------------------------------------------------------------------------
// Dialect – validated delimiter / quote bytes for the csv reader
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    pub delimiter: u8,
    pub quote: u8,
}

impl Default for Dialect {
    fn default() -> Self {
        Dialect {
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl Dialect {
    pub fn new(separator: &str, quote: &str) -> Result<Self, DataSourceError> {
        Ok(Dialect {
            delimiter: single_ascii("separator", separator)?,
            quote: single_ascii("quote", quote)?,
        })
    }
}

fn single_ascii(what: &'static str, value: &str) -> Result<u8, DataSourceError> {
    match value.as_bytes() {
        [b] if b.is_ascii() => Ok(*b),
        _ => Err(DataSourceError::InvalidDialect {
            what,
            value: value.to_string(),
        }),
    }
}

// ---------------------------------------------------------------------------
// RunConfig – the JSON document handed to the CLI
// ---------------------------------------------------------------------------

/// ```json
/// {
///   "gdpinfo":  { "gdpfile": "isp_gdp.csv", "min_year": 1960, "max_year": 2015,
///                 "country_name": "Country Name", "country_code": "Country Code" },
///   "codeinfo": { "codefile": "isp_country_codes.csv",
///                 "plot_codes": "ISO3166-1-Alpha-2", "data_codes": "ISO3166-1-Alpha-3" },
///   "plot_countries": "plot_countries.json",
///   "years": ["1960", "1980", "2000", "2010"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub gdpinfo: GdpInfo,
    /// Only needed for the code join.
    #[serde(default)]
    pub codeinfo: Option<CodeInfo>,
    /// Plot catalogue, `.json` object or two-column `.csv`.
    pub plot_countries: PathBuf,
    #[serde(default)]
    pub years: Vec<String>,
}

impl RunConfig {
    /// Read a config file. Relative table paths are resolved against the
    /// directory holding the config.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut cfg: RunConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        cfg.gdpinfo.gdpfile = rebase(base, &cfg.gdpinfo.gdpfile);
        if let Some(codeinfo) = cfg.codeinfo.as_mut() {
            codeinfo.codefile = rebase(base, &codeinfo.codefile);
        }
        cfg.plot_countries = rebase(base, &cfg.plot_countries);

        if cfg.gdpinfo.min_year > cfg.gdpinfo.max_year {
            bail!(
                "min_year {} is after max_year {}",
                cfg.gdpinfo.min_year,
                cfg.gdpinfo.max_year
            );
        }
        Ok(cfg)
    }

    /// Years to render: the explicit list if given, else the config's own.
    /// Every year must fall inside the GDP table's range.
    pub fn select_years(&self, requested: &[String]) -> Result<Vec<String>> {
        let years = if requested.is_empty() {
            self.years.clone()
        } else {
            requested.to_vec()
        };
        if years.is_empty() {
            bail!("no years requested (pass --year or set \"years\" in the config)");
        }
        for year in &years {
            if !self.gdpinfo.covers_year(year) {
                bail!(
                    "year {year} is outside {}..={}",
                    self.gdpinfo.min_year,
                    self.gdpinfo.max_year
                );
            }
        }
        Ok(years)
    }
}

fn rebase(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
