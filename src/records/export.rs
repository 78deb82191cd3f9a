use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{AppError, Context, Result};

use super::growth::GrowthRecord;

const DATA_URI_PREFIX: &str = "data:text/csv;charset=utf-8,";

/// Serialize `rows` to CSV text using the first row's key order as the header.
///
/// Strings are double-quoted with embedded quotes doubled. Numbers and
/// booleans are written bare, with integral floats losing their `.0`.
/// Null or missing keys become empty fields. Header keys are quoted only
/// when they would otherwise break the row.
pub fn export_csv(rows: &[&GrowthRecord]) -> Result<String> {
    let Some(first) = rows.first() else {
        return Err(AppError::NoData);
    };
    let header: Vec<&str> = first.fields().keys().map(String::as_str).collect();
    let header_cells: Vec<String> = header.iter().map(|key| format_header(key)).collect();

    // Fields are pre-formatted, so the writer must not add its own quoting.
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&header_cells)?;
    for row in rows {
        let cells = header
            .iter()
            .map(|key| format_cell(row.get(key)))
            .collect::<Vec<_>>();
        writer.write_record(&cells)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| AppError::message(format!("Failed to finish CSV buffer: {err}")))?;
    let text = String::from_utf8(bytes).context("CSV output was not valid UTF-8")?;
    Ok(text)
}

/// Write the export to `path`, replacing any earlier file.
pub fn write_csv_file(rows: &[&GrowthRecord], path: &Path) -> Result<PathBuf> {
    let text = export_csv(rows)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create export directory {}", parent.display()))?;
    }
    fs::write(path, text.as_bytes())
        .with_context(|| format!("Failed to write export file {}", path.display()))?;
    log::info!("exported {} rows to {}", rows.len(), path.display());
    Ok(path.to_path_buf())
}

/// Browser download link form of an export.
pub fn csv_data_uri(text: &str) -> String {
    format!("{DATA_URI_PREFIX}{}", urlencoding::encode(text))
}

fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => quote(s),
        Some(Value::Number(n)) => format_number(n),
        Some(Value::Bool(b)) => b.to_string(),
        Some(nested) => quote(&nested.to_string()),
    }
}

fn format_header(key: &str) -> String {
    if key.contains([',', '"', '\n', '\r']) {
        quote(key)
    } else {
        key.to_string()
    }
}

// Below 2^53 every integral f64 converts to i64 exactly.
const EXACT_INTEGER_LIMIT: f64 = 9_007_199_254_740_992.0;

fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(v) if n.is_f64() && v.fract() == 0.0 && v.abs() < EXACT_INTEGER_LIMIT => {
            (v as i64).to_string()
        }
        _ => n.to_string(),
    }
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::growth::tests::record;
    use serde_json::json;

    #[test]
    fn empty_rows_report_no_data() {
        let err = export_csv(&[]).expect_err("empty export must fail");
        assert!(matches!(err, AppError::NoData));
    }

    #[test]
    fn empty_rows_write_no_file() {
        let path = std::env::temp_dir().join(format!(
            "msme-export-empty-{}.csv",
            std::process::id()
        ));
        let _ = fs::remove_file(&path);

        assert!(write_csv_file(&[], &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn quotes_strings_and_leaves_numbers_bare() {
        let row = record(json!({ "Business_Name": "A", "Growth_Rate (%)": 12.345 }));
        let text = export_csv(&[&row]).expect("export succeeds");
        assert_eq!(text, "Business_Name,Growth_Rate (%)\n\"A\",12.345\n");
    }

    #[test]
    fn follows_first_row_key_order() {
        let first = record(json!({ "b": 1, "a": "x", "flag": true }));
        let second = record(json!({ "a": "y", "extra": 9, "b": 2 }));

        let text = export_csv(&[&first, &second]).expect("export succeeds");
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "b,a,flag");
        assert_eq!(lines[1], "1,\"x\",true");
        assert_eq!(lines[2], "2,\"y\",");
    }

    #[test]
    fn embedded_quotes_and_commas_survive_a_csv_reader() {
        let row = record(json!({ "Business_Name": "Smith, \"Sons\" & Co", "Growth_Rate (%)": 31 }));
        let text = export_csv(&[&row]).expect("export succeeds");

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let parsed = reader
            .records()
            .next()
            .expect("one data row")
            .expect("row parses");
        assert_eq!(&parsed[0], "Smith, \"Sons\" & Co");
        assert_eq!(&parsed[1], "31");
    }

    #[test]
    fn writes_file_to_target_path() {
        let dir = std::env::temp_dir().join(format!("msme-export-{}", std::process::id()));
        let path = dir.join("filtered_data.csv");
        let row = record(json!({ "Business_Name": "Kiln", "Growth_Rate (%)": 44.1 }));

        let written = write_csv_file(&[&row], &path).expect("file written");
        let contents = fs::read_to_string(&written).expect("file readable");
        assert!(contents.starts_with("Business_Name,Growth_Rate (%)\n"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn data_uri_is_percent_encoded() {
        let uri = csv_data_uri("a,b\n\"x\",1\n");
        assert_eq!(uri, "data:text/csv;charset=utf-8,a%2Cb%0A%22x%22%2C1%0A");
    }

    #[test]
    fn integral_floats_drop_trailing_zero() {
        let row = record(json!({ "Business_Name": "X", "Growth_Rate (%)": 25.0, "Loss": -0.0, "Ratio": 2.5 }));
        let text = export_csv(&[&row]).expect("export succeeds");
        assert_eq!(text.lines().nth(1), Some("\"X\",25,0,2.5"));
    }

    #[test]
    fn awkward_header_keys_are_quoted() {
        let row = record(json!({ "Revenue, USD": 10, "Say \"hi\"": "x", "Plain": 1 }));
        let text = export_csv(&[&row]).expect("export succeeds");
        assert_eq!(text.lines().next(), Some("\"Revenue, USD\",\"Say \"\"hi\"\"\",Plain"));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().expect("header parses").clone();
        assert_eq!(headers.len(), 3);
        assert_eq!(&headers[0], "Revenue, USD");
        assert_eq!(&headers[1], "Say \"hi\"");
        let parsed = reader.records().next().expect("one row").expect("row parses");
        assert_eq!(&parsed[0], "10");
        assert_eq!(&parsed[1], "x");
    }
}
