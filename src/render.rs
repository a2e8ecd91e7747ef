use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use palette::{Hsl, IntoColor, Srgb};
use serde::Serialize;

use crate::data::model::ResolvedResult;

// ---------------------------------------------------------------------------
// Colours
// ---------------------------------------------------------------------------

const GDP_HUE: f32 = 210.0;

fn missing_color() -> Hsl {
    Hsl::new(0.0, 0.0, 0.55)
}

fn no_value_color() -> Hsl {
    Hsl::new(35.0, 0.80, 0.60)
}

fn hex(hsl: Hsl) -> String {
    let rgb: Srgb = hsl.into_color();
    format!(
        "#{:02x}{:02x}{:02x}",
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Light-to-dark shade for `value` within `[lo, hi]`. A degenerate range maps
/// everything to the darkest shade.
pub fn gradient_color(value: f64, lo: f64, hi: f64) -> String {
    let t = if hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0) as f32
    } else {
        1.0
    };
    let lightness = 0.85 - 0.55 * t;
    hex(Hsl::new(GDP_HUE, 0.70, lightness))
}

// ---------------------------------------------------------------------------
// Map document
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldMap {
    pub title: String,
    pub layers: Vec<Layer>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub label: String,
    pub color: String,
    pub countries: Vec<LayerCountry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerCountry {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Lay the three partitions out as map layers: values, codes missing from
/// the GDP data, codes with no GDP for the year.
pub fn build_world_map(resolved: &ResolvedResult, year: &str, join_label: &str) -> WorldMap {
    let lo = resolved.values.values().copied().fold(f64::INFINITY, f64::min);
    let hi = resolved.values.values().copied().fold(f64::NEG_INFINITY, f64::max);

    let gdp = Layer {
        label: format!("GDP for {year}"),
        color: gradient_color(hi, lo, hi),
        countries: resolved
            .values
            .iter()
            .map(|(code, &v)| LayerCountry {
                code: code.clone(),
                value: Some(v),
                color: Some(gradient_color(v, lo, hi)),
            })
            .collect(),
    };

    let plain = |label: &str, color: Hsl, codes: &BTreeSet<String>| Layer {
        label: label.to_string(),
        color: hex(color),
        countries: codes
            .iter()
            .map(|code| LayerCountry {
                code: code.clone(),
                value: None,
                color: None,
            })
            .collect(),
    };

    WorldMap {
        title: format!(
            "GDP by country for {year} (log scale), unified by common country {}",
            join_label.to_uppercase()
        ),
        layers: vec![
            gdp,
            plain(
                "Missing from world bank data",
                missing_color(),
                &resolved.missing_from_reference,
            ),
            plain("No GDP data", no_value_color(), &resolved.no_value_for_year),
        ],
    }
}

/// Write the map document for one year to `map_file` as pretty JSON.
pub fn render_world_map(
    resolved: &ResolvedResult,
    year: &str,
    join_label: &str,
    map_file: &Path,
) -> Result<()> {
    let map = build_world_map(resolved, year, join_label);
    let file = File::create(map_file)
        .with_context(|| format!("creating {}", map_file.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &map)
        .with_context(|| format!("writing {}", map_file.display()))?;
    writer
        .flush()
        .with_context(|| format!("flushing {}", map_file.display()))?;
    log::info!("Wrote {}", map_file.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn resolved() -> ResolvedResult {
        let mut r = ResolvedResult::default();
        r.values.insert("us".into(), 13.0);
        r.values.insert("fr".into(), 12.0);
        r.values.insert("tv".into(), 7.5);
        r.missing_from_reference.insert("xx".into());
        r.no_value_for_year.insert("so".into());
        r
    }

    #[test]
    fn three_layers_in_order() {
        let map = build_world_map(&resolved(), "2000", "name");
        assert_eq!(
            map.title,
            "GDP by country for 2000 (log scale), unified by common country NAME"
        );
        let labels: Vec<&str> = map.layers.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["GDP for 2000", "Missing from world bank data", "No GDP data"]
        );
        assert_eq!(map.layers[0].countries.len(), 3);
        assert_eq!(map.layers[1].countries[0].code, "xx");
        assert_eq!(map.layers[2].countries[0].code, "so");
        assert_eq!(map.layers[2].countries[0].value, None);
    }

    #[test]
    fn gradient_darkens_with_value() {
        let low = gradient_color(7.5, 7.5, 13.0);
        let high = gradient_color(13.0, 7.5, 13.0);
        assert_ne!(low, high);
        assert_eq!(low.len(), 7);
        assert!(low.starts_with('#'));
        // Degenerate range still produces a colour.
        assert_eq!(gradient_color(1.0, 1.0, 1.0), high_shade());
    }

    fn high_shade() -> String {
        gradient_color(1.0, 0.0, 1.0)
    }

    #[test]
    fn empty_result_still_renders() {
        let map = build_world_map(&ResolvedResult::default(), "1960", "code");
        assert!(map.title.ends_with("CODE"));
        assert!(map.layers.iter().all(|l| l.countries.is_empty()));
    }

    #[test]
    fn writes_json_document() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("gdp_world_code_2000.json");
        render_world_map(&resolved(), "2000", "code", &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["layers"][0]["label"], "GDP for 2000");
        assert_eq!(json["layers"][0]["countries"][0]["code"], "fr");
        assert!(json["layers"][1]["countries"][0].get("value").is_none());
    }
}
