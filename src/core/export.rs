use crate::domain::model::Record;
use crate::utils::error::{Result, SgisError};
use serde_json::Value;
use std::collections::BTreeSet;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unsupported output format '{}'", other)),
        }
    }
}

pub fn render_records(records: &[Record], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Csv => records_to_csv(records),
    }
}

/// Columns are the sorted union of all record keys; absent cells stay empty.
pub fn records_to_csv(records: &[Record]) -> Result<String> {
    let headers: BTreeSet<&str> = records
        .iter()
        .flat_map(|r| r.data.keys().map(String::as_str))
        .collect();

    if headers.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;

    for record in records {
        let row: Vec<String> = headers
            .iter()
            .map(|key| record.data.get(*key).map(cell).unwrap_or_default())
            .collect();
        writer.write_record(&row)?;
    }

    let bytes = writer.into_inner().map_err(|e| SgisError::ProcessingError {
        message: format!("CSV flush failed: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| SgisError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> Record {
        Record {
            data: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<serde_json::Map<_, _>>(),
        }
    }

    #[test]
    fn test_csv_uses_sorted_union_of_keys() {
        let records = vec![
            record(&[("y", Value::from("36.35")), ("x", Value::from("127.38"))]),
            record(&[("x", Value::from("127.40")), ("road_nm", Value::from("청사로"))]),
        ];
        let csv = records_to_csv(&records).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "road_nm,x,y");
        assert_eq!(lines[1], ",127.38,36.35");
        assert_eq!(lines[2], "청사로,127.40,");
    }

    #[test]
    fn test_csv_quotes_and_non_string_values() {
        let records = vec![record(&[
            ("addr", Value::from("대전, 서구")),
            ("n", Value::from(3)),
            ("none", Value::Null),
        ])];
        let csv = records_to_csv(&records).unwrap();
        assert!(csv.contains("\"대전, 서구\",3,"));
    }

    #[test]
    fn test_json_keeps_service_field_order() {
        let raw = r#"[{"sido_nm":"대전광역시","sgg_nm":"서구","adm_nm":"둔산동","road_nm":"청사로","bd_main_num":"189","x":"127.3845","y":"36.3587"}]"#;

        let first: Vec<Record> = serde_json::from_str(raw).unwrap();
        let second: Vec<Record> = serde_json::from_str(raw).unwrap();
        let rendered = render_records(&first, OutputFormat::Json).unwrap();
        assert_eq!(rendered, render_records(&second, OutputFormat::Json).unwrap());

        let positions: Vec<usize> = ["sido_nm", "sgg_nm", "adm_nm", "road_nm", "bd_main_num", "x", "y"]
            .iter()
            .map(|key| rendered.find(&format!("\"{}\"", key)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", rendered);
    }

    #[test]
    fn test_empty_records() {
        assert_eq!(records_to_csv(&[]).unwrap(), "");
        assert_eq!(render_records(&[], OutputFormat::Json).unwrap(), "[]");
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(OutputFormat::default().extension(), "json");
        assert!("xml".parse::<OutputFormat>().is_err());
    }
}
