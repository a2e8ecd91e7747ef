use std::path::{Path, PathBuf};

use crate::config::{CodeInfo, GdpInfo};
use crate::data::loader::{load_reference_dataset, load_translation_table};
use crate::data::model::{PlotCountrySet, ReconciliationResult, ReferenceDataset, ResolvedResult};
use crate::data::reconcile::JoinStrategy;
use crate::data::resolve::resolve;
use crate::error::Result;
use crate::render::render_world_map;

// ---------------------------------------------------------------------------
// MapBuilder – tables loaded and joined once, resolved per year
// ---------------------------------------------------------------------------

/// Holds the loaded GDP table and its join against the plot catalogue so any
/// number of years can be resolved without re-reading files.
#[derive(Debug, Clone)]
pub struct MapBuilder {
    strategy: JoinStrategy,
    reference: ReferenceDataset,
    joined: ReconciliationResult,
}

impl MapBuilder {
    /// Join on the GDP table's country-name column.
    pub fn by_name(gdpinfo: &GdpInfo, plot_countries: &PlotCountrySet) -> Result<Self> {
        let reference = load_reference_dataset(gdpinfo, &gdpinfo.country_name)?;
        Self::from_parts(JoinStrategy::ByName, reference, plot_countries)
    }

    /// Join on the GDP table's country-code column through the code table.
    pub fn by_code(
        gdpinfo: &GdpInfo,
        codeinfo: &CodeInfo,
        plot_countries: &PlotCountrySet,
    ) -> Result<Self> {
        let table = load_translation_table(codeinfo)?;
        let reference = load_reference_dataset(gdpinfo, &gdpinfo.country_code)?;
        Self::from_parts(JoinStrategy::ByCode(table), reference, plot_countries)
    }

    pub fn from_parts(
        strategy: JoinStrategy,
        reference: ReferenceDataset,
        plot_countries: &PlotCountrySet,
    ) -> Result<Self> {
        let joined = strategy.reconcile(plot_countries, &reference)?;
        log::info!(
            "{} join: {} of {} plot countries matched",
            strategy.label(),
            joined.matched.len(),
            plot_countries.len()
        );
        Ok(MapBuilder {
            strategy,
            reference,
            joined,
        })
    }

    pub fn joined(&self) -> &ReconciliationResult {
        &self.joined
    }

    pub fn label(&self) -> &'static str {
        self.strategy.label()
    }

    pub fn resolve(&self, year: &str) -> Result<ResolvedResult> {
        resolve(&self.joined, &self.reference, year)
    }

    /// Output file for `year` inside `out_dir`.
    pub fn map_file(&self, out_dir: &Path, year: &str) -> PathBuf {
        out_dir.join(format!("gdp_world_{}_{year}.json", self.label()))
    }
}

// ---------------------------------------------------------------------------
// One-shot compositions
// ---------------------------------------------------------------------------

/// Load, join by name and resolve a single year.
pub fn build_map_dict_by_name(
    gdpinfo: &GdpInfo,
    plot_countries: &PlotCountrySet,
    year: &str,
) -> Result<ResolvedResult> {
    MapBuilder::by_name(gdpinfo, plot_countries)?.resolve(year)
}

/// Load, join by code and resolve a single year.
pub fn build_map_dict_by_code(
    gdpinfo: &GdpInfo,
    codeinfo: &CodeInfo,
    plot_countries: &PlotCountrySet,
    year: &str,
) -> Result<ResolvedResult> {
    MapBuilder::by_code(gdpinfo, codeinfo, plot_countries)?.resolve(year)
}

// ---------------------------------------------------------------------------
// Multi-year driver
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct RunReport {
    /// (year, written file)
    pub rendered: Vec<(String, PathBuf)>,
    /// (year, error chain)
    pub failed: Vec<(String, String)>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Resolve and render every year. A failing year is logged and recorded; the
/// remaining years still run.
pub fn render_years(builder: &MapBuilder, years: &[String], out_dir: &Path) -> RunReport {
    let mut report = RunReport::default();
    for year in years {
        let map_file = builder.map_file(out_dir, year);
        let outcome = builder
            .resolve(year)
            .map_err(anyhow::Error::from)
            .and_then(|resolved| render_world_map(&resolved, year, builder.label(), &map_file));

        match outcome {
            Ok(()) => report.rendered.push((year.clone(), map_file)),
            Err(e) => {
                log::error!("Year {year} failed: {e:#}");
                report.failed.push((year.clone(), format!("{e:#}")));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use tempfile::{TempDir, tempdir};

    use super::*;
    use crate::error::ReconcileError;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                dir: tempdir().expect("tempdir"),
            }
        }

        fn path(&self, file: &str) -> PathBuf {
            self.dir.path().join(file)
        }

        fn write(&self, file: &str, text: &str) -> PathBuf {
            let path = self.path(file);
            std::fs::write(&path, text).unwrap();
            path
        }
    }

    const GDP: &str = "\
Country Name,Country Code,2000,2010
United States,usa,,15000000000000
France,FRA,1000.0,abc
Tuvalu,TUV,5000,30000000
";

    const CODES: &str = "\
Country,ISO3166-1-Alpha-2,ISO3166-1-Alpha-3
United States,US,USA
France,FR,FRA
Tuvalu,TV,TUV
Nowhereland,XX,XXX
";

    fn gdpinfo(path: PathBuf) -> GdpInfo {
        GdpInfo {
            gdpfile: path,
            separator: ",".into(),
            quote: "\"".into(),
            min_year: 2000,
            max_year: 2010,
            country_name: "Country Name".into(),
            country_code: "Country Code".into(),
        }
    }

    fn codeinfo(path: PathBuf) -> CodeInfo {
        CodeInfo {
            codefile: path,
            separator: ",".into(),
            quote: "\"".into(),
            plot_codes: "ISO3166-1-Alpha-2".into(),
            data_codes: "ISO3166-1-Alpha-3".into(),
        }
    }

    fn plot(pairs: &[(&str, &str)]) -> PlotCountrySet {
        pairs
            .iter()
            .map(|(c, n)| (c.to_string(), n.to_string()))
            .collect()
    }

    fn set(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn by_name_end_to_end() {
        let fx = Fixture::new();
        let gdp = gdpinfo(fx.write("gdp.csv", GDP));
        let plot = plot(&[("us", "United States"), ("fr", "France"), ("xx", "Nowhereland")]);

        let res = build_map_dict_by_name(&gdp, &plot, "2000").unwrap();
        assert_eq!(res.values.len(), 1);
        assert_eq!(res.values["fr"], 3.0);
        assert_eq!(res.missing_from_reference, set(&["xx"]));
        assert_eq!(res.no_value_for_year, set(&["us"]));
        assert_eq!(res.len(), plot.len());
    }

    #[test]
    fn by_code_matches_ignoring_case() {
        let fx = Fixture::new();
        let gdp = gdpinfo(fx.write("gdp.csv", GDP));
        let codes = codeinfo(fx.write("codes.csv", CODES));
        let plot = plot(&[("US", "United States"), ("tv", "Tuvalu"), ("xx", "Nowhereland")]);

        let builder = MapBuilder::by_code(&gdp, &codes, &plot).unwrap();
        assert_eq!(builder.joined().matched["US"], "usa");
        assert_eq!(builder.joined().matched["tv"], "TUV");
        assert_eq!(builder.joined().unmatched, set(&["xx"]));

        let res = builder.resolve("2000").unwrap();
        assert_eq!(res.no_value_for_year, set(&["US"]));
        assert!((res.values["tv"] - 5000f64.log10()).abs() < 1e-12);
        assert_eq!(res.missing_from_reference, set(&["xx"]));
    }

    #[test]
    fn by_code_without_translation_aborts() {
        let fx = Fixture::new();
        let gdp = gdpinfo(fx.write("gdp.csv", GDP));
        let codes = codeinfo(fx.write("codes.csv", CODES));
        let plot = plot(&[("de", "Germany")]);

        let err = build_map_dict_by_code(&gdp, &codes, &plot, "2000").unwrap_err();
        assert!(matches!(err, ReconcileError::TranslationMissing { .. }));
    }

    #[test]
    fn missing_gdp_file_is_a_data_source_error() {
        let fx = Fixture::new();
        let gdp = gdpinfo(fx.path("absent.csv"));
        let err = build_map_dict_by_name(&gdp, &plot(&[("us", "United States")]), "2000")
            .unwrap_err();
        assert!(matches!(err, ReconcileError::DataSource(_)));
    }

    #[test]
    fn failing_year_does_not_stop_others() {
        let fx = Fixture::new();
        let gdp = gdpinfo(fx.write("gdp.csv", GDP));
        let plot = plot(&[("us", "United States"), ("fr", "France")]);
        let builder = MapBuilder::by_name(&gdp, &plot).unwrap();

        let years = vec!["2010".to_string(), "2000".to_string()];
        let report = render_years(&builder, &years, fx.dir.path());

        assert!(!report.is_success());
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "2010");
        assert!(report.failed[0].1.contains("abc"));

        assert_eq!(report.rendered.len(), 1);
        let (year, file) = &report.rendered[0];
        assert_eq!(year, "2000");
        assert_eq!(file, &fx.path("gdp_world_name_2000.json"));
        assert!(file.exists());
    }
}
