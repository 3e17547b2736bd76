use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::ReaderBuilder;
use log::info;

use crate::error::PipelineError;

/// Literal the spreadsheet exporter writes into cells whose formula failed.
pub const INVALID_VALUE_SENTINEL: &str = "#VALUE!";

/// CSV contents exactly as read: every field still textual.
#[derive(Debug)]
pub struct RawDataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawDataset {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn require_columns(&self, columns: &[String]) -> Result<(), PipelineError> {
        for column in columns {
            if !self.headers.iter().any(|header| header == column) {
                return Err(PipelineError::Schema(format!(
                    "required column {column:?} is absent from the header"
                )));
            }
        }

        Ok(())
    }
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<RawDataset, PipelineError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    from_reader(BufReader::new(file))
}

pub fn from_reader<R: Read>(reader: R) -> Result<RawDataset, PipelineError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = reader.headers()?.iter().map(str::to_owned).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_owned).collect());
    }

    Ok(RawDataset { headers, rows })
}

/// Cleaned numeric table: the designated columns of every surviving row,
/// parsed to `f64`, in source order.
#[derive(Debug, Clone)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Dataset {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Result<usize, PipelineError> {
        self.columns
            .iter()
            .position(|column| column == name)
            .ok_or_else(|| PipelineError::Schema(format!("unknown column {name:?}")))
    }

    pub fn value(&self, row: usize, column: usize) -> f64 {
        self.rows[row][column]
    }

    pub fn append_column(&mut self, name: &str, values: Vec<f64>) -> Result<(), PipelineError> {
        if self.columns.iter().any(|column| column == name) {
            return Err(PipelineError::Schema(format!(
                "column {name:?} is already present"
            )));
        }
        assert_eq!(values.len(), self.rows.len());

        self.columns.push(name.to_owned());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }

        Ok(())
    }
}

fn is_missing(field: &str) -> bool {
    let trimmed = field.trim();

    trimmed.is_empty() || trimmed == INVALID_VALUE_SENTINEL
}

/// Drops every row with a missing field in any column, then parses the
/// designated numeric columns. Survivor order matches source order.
pub fn clean(raw: &RawDataset, numeric_columns: &[String]) -> Result<Dataset, PipelineError> {
    let indices = numeric_columns
        .iter()
        .map(|column| {
            raw.headers
                .iter()
                .position(|header| header == column)
                .ok_or_else(|| {
                    PipelineError::Schema(format!(
                        "required column {column:?} is absent from the header"
                    ))
                })
        })
        .collect::<Result<Vec<usize>, PipelineError>>()?;

    let mut rows = Vec::new();
    for (row_number, fields) in raw.rows.iter().enumerate() {
        if fields.iter().any(|field| is_missing(field)) {
            continue;
        }

        let mut values = Vec::with_capacity(indices.len());
        for (&index, column) in indices.iter().zip(numeric_columns) {
            let field = &fields[index];
            let value = field
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| PipelineError::TypeConversion {
                    column: column.clone(),
                    row: row_number,
                    value: field.clone(),
                })?;

            values.push(value);
        }

        rows.push(values);
    }

    info!(
        "cleaned input: kept {} of {} rows",
        rows.len(),
        raw.rows.len()
    );

    Ok(Dataset {
        columns: numeric_columns.to_vec(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|&name| name.to_owned()).collect()
    }

    #[test]
    fn missing_required_column_is_a_schema_error() {
        let raw = from_reader("Heart_Rate\n130\n".as_bytes()).unwrap();

        let result = raw.require_columns(&columns(&["Heart_Rate", "Body_Temperature"]));

        assert!(matches!(result, Err(PipelineError::Schema(_))));
    }

    #[test]
    fn clean_drops_rows_with_the_invalid_value_sentinel() {
        let csv = "Heart_Rate,Body_Temperature\n130,36.0\n#VALUE!,37.0\n100,38.0\n";
        let raw = from_reader(csv.as_bytes()).unwrap();

        let dataset = clean(&raw, &columns(&["Heart_Rate", "Body_Temperature"])).unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.value(0, 0), 130.0);
        assert_eq!(dataset.value(1, 1), 38.0);
    }

    #[test]
    fn sentinel_in_an_unused_column_still_drops_the_row() {
        let csv = "Note,Heart_Rate,Body_Temperature\nok,130,36.0\n#VALUE!,100,38.0\n";
        let raw = from_reader(csv.as_bytes()).unwrap();

        let dataset = clean(&raw, &columns(&["Heart_Rate", "Body_Temperature"])).unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.value(0, 0), 130.0);
    }

    #[test]
    fn blank_fields_count_as_missing() {
        let csv = "Heart_Rate,Body_Temperature\n130,36.0\n,37.0\n";
        let raw = from_reader(csv.as_bytes()).unwrap();

        let dataset = clean(&raw, &columns(&["Heart_Rate", "Body_Temperature"])).unwrap();

        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn unparseable_survivor_is_a_type_conversion_error() {
        let csv = "Heart_Rate,Body_Temperature\nfast,37.0\n";
        let raw = from_reader(csv.as_bytes()).unwrap();

        let result = clean(&raw, &columns(&["Heart_Rate", "Body_Temperature"]));

        match result {
            Err(PipelineError::TypeConversion { column, row, value }) => {
                assert_eq!(column, "Heart_Rate");
                assert_eq!(row, 0);
                assert_eq!(value, "fast");
            }
            other => panic!("expected a type conversion error, got {other:?}"),
        }
    }

    #[test]
    fn clean_preserves_survivor_order() {
        let csv = "Heart_Rate,Body_Temperature\n90,36.0\n#VALUE!,36.1\n100,36.2\n110,36.3\n";
        let raw = from_reader(csv.as_bytes()).unwrap();

        let dataset = clean(&raw, &columns(&["Heart_Rate", "Body_Temperature"])).unwrap();

        let heart_rates: Vec<f64> = (0..dataset.len()).map(|row| dataset.value(row, 0)).collect();
        assert_eq!(heart_rates, vec![90.0, 100.0, 110.0]);
    }

    #[test]
    fn appending_a_duplicate_column_is_a_schema_error() {
        let mut dataset = Dataset::new(columns(&["Heart_Rate"]), vec![vec![90.0]]);

        let result = dataset.append_column("Heart_Rate", vec![1.0]);

        assert!(matches!(result, Err(PipelineError::Schema(_))));
    }
}
