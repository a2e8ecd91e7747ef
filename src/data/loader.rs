use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::StringRecord;

use super::model::{PlotCountrySet, Record, ReferenceDataset};
use super::translate::CodeTranslationTable;
use crate::config::{CodeInfo, Dialect, GdpInfo};
use crate::error::{DataSourceError, Result};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the GDP table keyed by `key_field` (the country name or the country
/// code column, depending on the join).
pub fn load_reference_dataset(info: &GdpInfo, key_field: &str) -> Result<ReferenceDataset> {
    let dialect = info.dialect()?;
    let file = open(&info.gdpfile)?;
    let ds = read_reference_dataset(file, &source_name(&info.gdpfile), dialect, key_field)?;
    log::info!(
        "Loaded {} GDP rows keyed by '{key_field}' from {}",
        ds.len(),
        info.gdpfile.display()
    );
    Ok(ds)
}

/// Load the plot-code → data-code table described by `info`.
pub fn load_translation_table(info: &CodeInfo) -> Result<CodeTranslationTable> {
    let dialect = info.dialect()?;
    let file = open(&info.codefile)?;
    let table = read_translation_table(
        file,
        &source_name(&info.codefile),
        dialect,
        &info.plot_codes,
        &info.data_codes,
    )?;
    log::info!(
        "Loaded {} code translations from {}",
        table.len(),
        info.codefile.display()
    );
    Ok(table)
}

/// Load the plot library's country catalogue.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – `{ "us": "United States", ... }`
/// * `.csv`  – header row, then `code,name` rows
pub fn load_plot_countries(path: &Path) -> Result<PlotCountrySet> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let name = source_name(path);
    let countries = match ext.as_str() {
        "json" => read_plot_countries_json(open(path)?, &name)?,
        "csv" => read_plot_countries_csv(open(path)?, &name)?,
        other => return Err(DataSourceError::UnsupportedFormat(other.to_string()).into()),
    };
    log::info!("Loaded {} plot countries from {}", countries.len(), path.display());
    Ok(countries)
}

// ---------------------------------------------------------------------------
// GDP table
// ---------------------------------------------------------------------------

/// Every row becomes a [`Record`] of header → cell. Cells past the end of a
/// short row are simply absent from its record; a row that is too short to
/// carry `key_field` aborts the load.
pub fn read_reference_dataset<R: Read>(
    reader: R,
    source: &str,
    dialect: Dialect,
    key_field: &str,
) -> Result<ReferenceDataset> {
    let mut rdr = csv_reader(reader, dialect);
    let headers = headers(&mut rdr, source)?;
    let key_idx = column_index(&headers, key_field, source)?;

    let mut ds = ReferenceDataset::new();
    let mut row = StringRecord::new();
    let mut row_no = 0;
    while next_row(&mut rdr, &mut row, source)? {
        row_no += 1;
        let key = field(&row, key_idx, key_field, source, row_no)?.to_string();

        let record: Record = headers
            .iter()
            .zip(row.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();

        if ds.insert(key.clone(), record).is_some() {
            log::debug!("{source}, row {row_no}: '{key}' repeats an earlier row, keeping the later one");
        }
    }
    Ok(ds)
}

// ---------------------------------------------------------------------------
// Code translation table
// ---------------------------------------------------------------------------

/// Rows missing either code, or with an empty plot code, abort the load.
pub fn read_translation_table<R: Read>(
    reader: R,
    source: &str,
    dialect: Dialect,
    plot_field: &str,
    data_field: &str,
) -> Result<CodeTranslationTable> {
    let mut rdr = csv_reader(reader, dialect);
    let headers = headers(&mut rdr, source)?;
    let plot_idx = column_index(&headers, plot_field, source)?;
    let data_idx = column_index(&headers, data_field, source)?;

    let mut table = CodeTranslationTable::new();
    let mut row = StringRecord::new();
    let mut row_no = 0;
    while next_row(&mut rdr, &mut row, source)? {
        row_no += 1;
        let plot_code = field(&row, plot_idx, plot_field, source, row_no)?;
        let data_code = field(&row, data_idx, data_field, source, row_no)?;
        if plot_code.is_empty() {
            return Err(missing_field(source, row_no, plot_field).into());
        }
        if let Some(prev) = table.insert(plot_code.to_string(), data_code.to_string()) {
            log::debug!("{source}, row {row_no}: '{plot_code}' remapped from '{prev}' to '{data_code}'");
        }
    }
    Ok(table)
}

// ---------------------------------------------------------------------------
// Plot catalogue
// ---------------------------------------------------------------------------

pub fn read_plot_countries_json<R: Read>(reader: R, source: &str) -> Result<PlotCountrySet> {
    let countries: BTreeMap<String, String> = serde_json::from_reader(BufReader::new(reader))
        .map_err(|e| DataSourceError::Json {
            source_name: source.to_string(),
            source: e,
        })?;
    Ok(countries)
}

/// First column is the code, second the name; the header row is skipped.
pub fn read_plot_countries_csv<R: Read>(reader: R, source: &str) -> Result<PlotCountrySet> {
    let mut rdr = csv_reader(reader, Dialect::default());
    let headers = headers(&mut rdr, source)?;
    let code_col = headers.get(0).unwrap_or("code").to_string();
    let name_col = headers.get(1).unwrap_or("name").to_string();

    let mut countries = PlotCountrySet::new();
    let mut row = StringRecord::new();
    let mut row_no = 0;
    while next_row(&mut rdr, &mut row, source)? {
        row_no += 1;
        let code = field(&row, 0, &code_col, source, row_no)?;
        let name = field(&row, 1, &name_col, source, row_no)?;
        countries.insert(code.to_string(), name.to_string());
    }
    Ok(countries)
}

// -- CSV helpers --

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        DataSourceError::Io {
            path: path.to_path_buf(),
            source: e,
        }
        .into()
    })
}

fn source_name(path: &Path) -> String {
    path.display().to_string()
}

/// Short rows are let through so they can be reported per field.
fn csv_reader<R: Read>(reader: R, dialect: Dialect) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(dialect.delimiter)
        .quote(dialect.quote)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader)
}

fn csv_error(source: &str, e: csv::Error) -> DataSourceError {
    DataSourceError::Csv {
        source_name: source.to_string(),
        source: e,
    }
}

fn headers<R: Read>(rdr: &mut csv::Reader<R>, source: &str) -> Result<StringRecord> {
    Ok(rdr.headers().map_err(|e| csv_error(source, e))?.clone())
}

fn next_row<R: Read>(
    rdr: &mut csv::Reader<R>,
    row: &mut StringRecord,
    source: &str,
) -> Result<bool> {
    rdr.read_record(row)
        .map_err(|e| csv_error(source, e).into())
}

fn column_index(headers: &StringRecord, column: &str, source: &str) -> Result<usize> {
    headers.iter().position(|h| h == column).ok_or_else(|| {
        DataSourceError::MissingColumn {
            source_name: source.to_string(),
            column: column.to_string(),
        }
        .into()
    })
}

fn field<'r>(
    row: &'r StringRecord,
    idx: usize,
    name: &str,
    source: &str,
    row_no: usize,
) -> Result<&'r str> {
    row.get(idx)
        .ok_or_else(|| missing_field(source, row_no, name).into())
}

fn missing_field(source: &str, row: usize, field: &str) -> DataSourceError {
    DataSourceError::MissingField {
        source_name: source.to_string(),
        row,
        field: field.to_string(),
    }
}
