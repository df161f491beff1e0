//! CSV dataset loading, mean imputation and schema validation
//!
//! Input files carry a header row. Feature columns are located by their
//! schema name, so column order is free and unknown columns are ignored.
//! The label column is [`LABEL_COLUMN`].
//!
//! Missing cells (empty, `NA`, `NaN`, `null`, `N/A`) in feature columns are
//! replaced by the mean of the column's observed values. The mean is taken
//! over the whole file, before any train/test split, so held-out rows
//! contribute to the statistics the training rows are filled with.

use crate::core::schema::{FEATURES, LABEL_COLUMN, N_FEATURES};
use crate::core::{Dataset, Label, OncoError, Result, Sample};
use log::{debug, info, warn};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Cell tokens treated as missing values
const MISSING_TOKENS: &[&str] = &["", "na", "nan", "null", "n/a"];

/// Parsed CSV contents before validation
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// Row-major cells; `None` marks a missing value
    pub rows: Vec<Vec<Option<f64>>>,
}

/// One column's imputation outcome
#[derive(Debug, Clone, PartialEq)]
pub struct Imputation {
    pub column: String,
    pub filled: usize,
    pub mean: f64,
}

impl RawTable {
    /// Read a table from a CSV file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| OncoError::from_open(path, e))?;
        Self::from_reader(file)
    }

    /// Read a table from any CSV source.
    ///
    /// Only schema feature columns and the label column are kept; other
    /// columns are skipped without being parsed.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(::csv::Trim::All)
            .from_reader(reader);

        let all_headers: Vec<String> = reader
            .headers()
            .map_err(|e| OncoError::ParseError(format!("Invalid header: {e}")))?
            .iter()
            .map(|h| h.to_string())
            .collect();

        let (kept, ignored): (Vec<usize>, Vec<usize>) =
            (0..all_headers.len()).partition(|&i| is_known_column(&all_headers[i]));
        if !ignored.is_empty() {
            let names: Vec<&str> = ignored.iter().map(|&i| all_headers[i].as_str()).collect();
            warn!("Ignoring columns outside the feature schema: {}", names.join(", "));
        }

        let mut rows = Vec::new();
        for (row_idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| OncoError::ParseError(e.to_string()))?;
            let mut row = Vec::with_capacity(kept.len());
            for &col in &kept {
                let cell = record.get(col).unwrap_or_default();
                row.push(parse_cell(cell).ok_or_else(|| {
                    OncoError::ParseError(format!(
                        "Invalid value '{}' in column '{}' at data row {}",
                        cell,
                        all_headers[col],
                        row_idx + 1
                    ))
                })?);
            }
            rows.push(row);
        }

        let headers = kept.into_iter().map(|i| all_headers[i].clone()).collect();
        Ok(Self { headers, rows })
    }

    /// Index of a column by header name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Replace missing cells in `columns` with the mean of that column's observed values
    pub fn impute_column_means(&mut self, columns: &[usize]) -> Result<Vec<Imputation>> {
        let mut performed = Vec::new();

        for &col in columns {
            let observed: Vec<f64> = self.rows.iter().filter_map(|r| r[col]).collect();
            let missing = self.rows.len() - observed.len();
            if missing == 0 {
                continue;
            }
            if observed.is_empty() {
                return Err(OncoError::Schema(format!(
                    "Column '{}' has no observed values to impute from",
                    self.headers[col]
                )));
            }

            let mean = observed.iter().sum::<f64>() / observed.len() as f64;
            for row in &mut self.rows {
                if row[col].is_none() {
                    row[col] = Some(mean);
                }
            }

            performed.push(Imputation {
                column: self.headers[col].clone(),
                filled: missing,
                mean,
            });
        }

        Ok(performed)
    }
}

fn is_known_column(name: &str) -> bool {
    name == LABEL_COLUMN || FEATURES.iter().any(|f| f.name == name)
}

fn parse_cell(cell: &str) -> Option<Option<f64>> {
    let lowered = cell.to_ascii_lowercase();
    if MISSING_TOKENS.contains(&lowered.as_str()) {
        return Some(None);
    }
    cell.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(Some)
}

/// Validated, fully labeled dataset with no missing feature values
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDataset {
    samples: Vec<Sample>,
}

impl TabularDataset {
    /// Load, impute and validate a CSV file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let table = RawTable::from_file(path)?;
        info!("Read {} rows from {}", table.rows.len(), path.display());
        Self::validate(table)
    }

    /// Load, impute and validate CSV data from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::validate(RawTable::from_reader(reader)?)
    }

    /// Build a dataset from already labeled samples
    pub fn from_samples(samples: Vec<Sample>) -> Result<Self> {
        if let Some(i) = samples.iter().position(|s| s.label.is_none()) {
            return Err(OncoError::InvalidParameter(format!(
                "Sample {i} has no label"
            )));
        }
        Ok(Self { samples })
    }

    /// Check the schema of a raw table, impute missing feature values and build samples
    pub fn validate(mut table: RawTable) -> Result<Self> {
        let label_col = table.column(LABEL_COLUMN).ok_or_else(|| {
            OncoError::Schema(format!("'{LABEL_COLUMN}' column not found in the dataset"))
        })?;

        let missing: Vec<&str> = FEATURES
            .iter()
            .filter(|f| table.column(f.name).is_none())
            .map(|f| f.name)
            .collect();
        if !missing.is_empty() {
            return Err(OncoError::Schema(format!(
                "Missing feature columns: {}",
                missing.join(", ")
            )));
        }

        if table.rows.is_empty() {
            return Err(OncoError::EmptyData(
                "Features or target variable is empty".to_string(),
            ));
        }

        let feature_cols: Vec<usize> = FEATURES
            .iter()
            .filter_map(|f| table.column(f.name))
            .collect();

        for imputation in table.impute_column_means(&feature_cols)? {
            warn!(
                "Imputed {} missing values in '{}' with mean {:.4} computed over the full dataset before splitting",
                imputation.filled, imputation.column, imputation.mean
            );
        }

        let mut samples = Vec::with_capacity(table.rows.len());
        let mut dropped = 0usize;
        for row in &table.rows {
            let label = match row[label_col] {
                Some(value) => Label::from_value(value)?,
                None => {
                    dropped += 1;
                    continue;
                }
            };

            let mut features = [0.0; N_FEATURES];
            for (slot, &col) in features.iter_mut().zip(feature_cols.iter()) {
                // Imputation above leaves no gaps in feature columns
                *slot = row[col].unwrap_or_default();
            }
            samples.push(Sample::new(features, label));
        }

        if dropped > 0 {
            warn!("Dropped {dropped} rows with a missing '{LABEL_COLUMN}' value");
        }
        if samples.is_empty() {
            return Err(OncoError::EmptyData(format!(
                "No rows with a '{LABEL_COLUMN}' value"
            )));
        }

        debug!("Validated dataset with {} samples", samples.len());
        Ok(Self { samples })
    }

    /// All samples in row order
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// New dataset holding the given rows, in the given order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            samples: indices.iter().map(|&i| self.samples[i]).collect(),
        }
    }
}

impl Dataset for TabularDataset {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn get_sample(&self, i: usize) -> Sample {
        self.samples[i]
    }

    fn get_labels(&self) -> Vec<Label> {
        self.samples.iter().filter_map(|s| s.label).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str =
        "Age,Gender,BMI,Smoking,GeneticRisk,PhysicalActivity,AlcoholIntake,CancerHistory,Diagnosis";

    fn load(body: &str) -> Result<TabularDataset> {
        TabularDataset::from_reader(Cursor::new(format!("{HEADER}\n{body}")))
    }

    #[test]
    fn test_csv_basic() {
        let dataset = load("58,1,16.08,0,1,8.14,4.14,1,1\n71,0,30.82,0,1,9.36,3.51,0,0\n").unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dim(), 8);
        let first = dataset.get_sample(0);
        assert_eq!(first.features, [58.0, 1.0, 16.08, 0.0, 1.0, 8.14, 4.14, 1.0]);
        assert_eq!(first.label, Some(Label::Positive));
        assert_eq!(dataset.get_labels(), vec![Label::Positive, Label::Negative]);
    }

    #[test]
    fn test_mean_imputation() {
        let mut table = RawTable {
            headers: vec!["x".to_string()],
            rows: vec![vec![Some(1.0)], vec![None], vec![Some(3.0)]],
        };

        let performed = table.impute_column_means(&[0]).unwrap();
        assert_eq!(table.rows[1][0], Some(2.0));
        assert_eq!(
            performed,
            vec![Imputation {
                column: "x".to_string(),
                filled: 1,
                mean: 2.0
            }]
        );
    }

    #[test]
    fn test_imputation_through_loader() {
        let dataset = load("40,1,,0,1,5,2,0,1\n50,0,20,0,1,5,2,0,0\n60,0,30,NA,1,5,2,0,0\n").unwrap();
        assert_eq!(dataset.get_sample(0).features[2], 25.0);
        assert_eq!(dataset.get_sample(2).features[3], 0.0);
    }

    #[test]
    fn test_missing_label_column() {
        let csv = "Age,Gender,BMI,Smoking,GeneticRisk,PhysicalActivity,AlcoholIntake,CancerHistory\n1,1,1,1,1,1,1,1\n";
        let err = TabularDataset::from_reader(Cursor::new(csv)).unwrap_err();
        assert!(matches!(err, OncoError::Schema(ref msg) if msg.contains("Diagnosis")));
    }

    #[test]
    fn test_missing_feature_columns() {
        let csv = "Age,Gender,BMI,Smoking,PhysicalActivity,CancerHistory,Diagnosis\n1,1,1,1,1,1,1\n";
        let err = TabularDataset::from_reader(Cursor::new(csv)).unwrap_err();
        match err {
            OncoError::Schema(msg) => {
                assert!(msg.contains("GeneticRisk"));
                assert!(msg.contains("AlcoholIntake"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_rows() {
        let err = load("").unwrap_err();
        assert!(matches!(err, OncoError::EmptyData(_)));
    }

    #[test]
    fn test_reordered_and_extra_columns() {
        let csv = "Diagnosis,PatientId,CancerHistory,AlcoholIntake,PhysicalActivity,GeneticRisk,Smoking,BMI,Gender,Age\n\
                   1,p-1,1,4.1,8.1,1,0,16.1,1,58\n";
        let dataset = TabularDataset::from_reader(Cursor::new(csv)).unwrap();
        assert_eq!(
            dataset.get_sample(0).features,
            [58.0, 1.0, 16.1, 0.0, 1.0, 8.1, 4.1, 1.0]
        );
    }

    #[test]
    fn test_non_numeric_feature() {
        let err = load("58,male,16.08,0,1,8.14,4.14,1,1\n").unwrap_err();
        assert!(matches!(err, OncoError::ParseError(ref msg) if msg.contains("Gender")));
    }

    #[test]
    fn test_non_finite_feature() {
        for cell in ["inf", "-inf", "Infinity", "1e400"] {
            let err = load(&format!("58,1,{cell},0,1,8.14,4.14,1,1\n")).unwrap_err();
            assert!(
                matches!(err, OncoError::ParseError(ref msg) if msg.contains("BMI")),
                "{cell}: {err:?}"
            );
        }
    }

    #[test]
    fn test_invalid_label() {
        let err = load("58,1,16.08,0,1,8.14,4.14,1,2\n").unwrap_err();
        assert!(matches!(err, OncoError::InvalidLabel(v) if v == 2.0));
    }

    #[test]
    fn test_missing_label_rows_dropped() {
        let dataset = load("58,1,16.08,0,1,8.14,4.14,1,\n71,0,30.82,0,1,9.36,3.51,0,0\n").unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.get_labels(), vec![Label::Negative]);
    }

    #[test]
    fn test_column_without_observations() {
        let err = load("58,1,,0,1,8.14,4.14,1,1\n71,0,,0,1,9.36,3.51,0,0\n").unwrap_err();
        assert!(matches!(err, OncoError::Schema(ref msg) if msg.contains("BMI")));
    }

    #[test]
    fn test_missing_file() {
        let err = TabularDataset::from_file("/nonexistent/cancer.csv").unwrap_err();
        assert!(matches!(err, OncoError::NotFound(_)));
    }

    #[test]
    fn test_from_samples_requires_labels() {
        let unlabeled = Sample::unlabeled([1.0; N_FEATURES]);
        assert!(TabularDataset::from_samples(vec![unlabeled]).is_err());

        let labeled = Sample::new([1.0; N_FEATURES], Label::Positive);
        let dataset = TabularDataset::from_samples(vec![labeled, labeled]).unwrap();
        assert_eq!(dataset.subset(&[1]).len(), 1);
    }
}
