use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use gdp_atlas::config::{CodeInfo, GdpInfo, RunConfig};

const MIN_YEAR: i32 = 1960;
const MAX_YEAR: i32 = 2015;

/// (plot code, plot name, GDP-table name, alpha-3 code, 1960 GDP, first year with data)
///
/// Names and codes deliberately disagree in places so both joins leave
/// something unmatched.
const COUNTRIES: &[(&str, &str, &str, &str, f64, i32)] = &[
    ("us", "United States", "United States", "USA", 5.4e11, 1960),
    ("fr", "France", "France", "FRA", 6.2e10, 1960),
    ("de", "Germany", "Germany", "DEU", 2.1e11, 1970),
    ("kr", "Korea, Republic of", "Korea, Rep.", "KOR", 3.9e9, 1960),
    ("ru", "Russian Federation", "Russian Federation", "rus", 5.0e11, 1989),
    ("tv", "Tuvalu", "Tuvalu", "TUV", 4.0e6, 1981),
    ("tw", "Taiwan", "Taiwan", "TWN", 1.7e9, 2016),
    ("eh", "Western Sahara", "", "ESH", 0.0, 0),
];

/// Deterministic growth jitter (splitmix64), so reruns produce identical files.
struct Growth(u64);

impl Growth {
    /// Next yearly growth factor in `[0.98, 1.08)`.
    fn next_factor(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        let unit = (z >> 11) as f64 / (1u64 << 53) as f64;
        0.98 + 0.10 * unit
    }
}

fn write_gdp(path: &Path, growth: &mut Growth) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).context("creating GDP CSV")?;

    let mut header = vec!["Country Name".to_string(), "Country Code".to_string()];
    header.extend((MIN_YEAR..=MAX_YEAR).map(|y| y.to_string()));
    wtr.write_record(&header)?;

    for &(_, _, gdp_name, code, base, first_year) in COUNTRIES {
        if gdp_name.is_empty() {
            continue;
        }
        let mut row = vec![gdp_name.to_string(), code.to_string()];
        let mut gdp = base;
        for year in MIN_YEAR..=MAX_YEAR {
            gdp *= growth.next_factor();
            if year < first_year {
                row.push(String::new());
            } else {
                row.push(format!("{gdp:.1}"));
            }
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_codes(path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).context("creating code CSV")?;
    wtr.write_record(["Country", "ISO3166-1-Alpha-2", "ISO3166-1-Alpha-3"])?;
    for &(plot_code, plot_name, _, code, _, _) in COUNTRIES {
        wtr.write_record([
            plot_name,
            plot_code.to_uppercase().as_str(),
            code.to_uppercase().as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_plot_countries(path: &Path) -> Result<()> {
    let countries: BTreeMap<&str, &str> = COUNTRIES
        .iter()
        .map(|&(code, name, ..)| (code, name))
        .collect();
    let text = serde_json::to_string_pretty(&countries)?;
    std::fs::write(path, text).context("writing plot catalogue")?;
    Ok(())
}

fn write_config(path: &Path) -> Result<()> {
    let cfg = RunConfig {
        gdpinfo: GdpInfo {
            gdpfile: PathBuf::from("sample_gdp.csv"),
            separator: ",".into(),
            quote: "\"".into(),
            min_year: MIN_YEAR,
            max_year: MAX_YEAR,
            country_name: "Country Name".into(),
            country_code: "Country Code".into(),
        },
        codeinfo: Some(CodeInfo {
            codefile: PathBuf::from("sample_country_codes.csv"),
            separator: ",".into(),
            quote: "\"".into(),
            plot_codes: "ISO3166-1-Alpha-2".into(),
            data_codes: "ISO3166-1-Alpha-3".into(),
        }),
        plot_countries: PathBuf::from("sample_plot_countries.json"),
        years: ["1960", "1980", "2000", "2010"].map(String::from).to_vec(),
    };
    std::fs::write(path, serde_json::to_string_pretty(&cfg)?).context("writing config")?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)?;

    let mut growth = Growth(42);
    write_gdp(&out_dir.join("sample_gdp.csv"), &mut growth)?;
    write_codes(&out_dir.join("sample_country_codes.csv"))?;
    write_plot_countries(&out_dir.join("sample_plot_countries.json"))?;
    write_config(&out_dir.join("sample_run.json"))?;

    println!(
        "Wrote sample data for {} countries ({MIN_YEAR}..={MAX_YEAR}) to {}",
        COUNTRIES.len(),
        out_dir.display()
    );
    Ok(())
}
