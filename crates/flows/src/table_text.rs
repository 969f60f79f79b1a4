//! Minimal delimited-text reader for the cleaned bilateral CSV export.
//!
//! Handles a header row, double-quoted fields with `""` escapes and CRLF line
//! endings. Quoted fields may not span lines.

use std::collections::HashMap;

use foundation::iso::IsoCode;

use crate::error::DataLoadError;
use crate::record::CorridorRecord;

const REQUIRED_COLUMNS: [&str; 6] = [
    "year",
    "origin_iso3",
    "destination_iso3",
    "origin_country_name",
    "destination_country_name",
    "migrants_millions",
];

pub fn split_fields(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut field)),
            (c, _) => field.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}

/// Decodes CSV text into normalized records, in file order.
pub fn parse_corridor_csv(text: &str) -> Result<Vec<CorridorRecord>, DataLoadError> {
    let mut lines = text
        .lines()
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(DataLoadError::Empty);
    };
    let header =
        split_fields(header).map_err(|reason| DataLoadError::Malformed { row: 1, reason })?;
    let columns: HashMap<&str, usize> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (name.trim().trim_start_matches('\u{feff}'), i))
        .collect();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.contains_key(*c))
        .map(|c| (*c).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(DataLoadError::MissingColumns(missing));
    }

    let mut records = Vec::new();
    for (line_idx, line) in lines {
        let row = line_idx + 1;
        let malformed = |reason: String| DataLoadError::Malformed { row, reason };
        let fields = split_fields(line).map_err(malformed)?;
        let get = |name: &str| -> &str {
            columns
                .get(name)
                .and_then(|&i| fields.get(i))
                .map_or("", |s| s.trim())
        };

        let year = get("year")
            .parse::<i32>()
            .map_err(|e| malformed(format!("year {:?}: {e}", get("year"))))?;
        let origin_iso = IsoCode::parse(get("origin_iso3")).map_err(|e| malformed(e.to_string()))?;
        let destination_iso =
            IsoCode::parse(get("destination_iso3")).map_err(|e| malformed(e.to_string()))?;
        let migrants_millions = get("migrants_millions").parse::<f64>().map_err(|e| {
            malformed(format!(
                "migrants_millions {:?}: {e}",
                get("migrants_millions")
            ))
        })?;

        let record = CorridorRecord {
            year,
            origin_iso,
            destination_iso,
            origin_name: get("origin_country_name").to_string(),
            destination_name: get("destination_country_name").to_string(),
            origin_subregion: get("origin_subregion").to_string(),
            destination_subregion: get("destination_subregion").to_string(),
            migrants_millions,
        };
        records.push(record.normalized().map_err(malformed)?);
    }
    Ok(records)
}
