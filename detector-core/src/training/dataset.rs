//! Datasets - CSV tables, merge and cleaning
//!
//! `RawTable` holds cells as read from disk (strings). Merging happens on
//! raw tables; cleaning turns a raw table into an all-integer `Dataset`.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use ndarray::Array2;
use serde::Serialize;
use thiserror::Error;

use crate::constants::LABEL_COLUMN;

/// Kaggle column → UCI column. Applied before reordering to the UCI layout.
pub const COLUMN_MAPPING: &[(&str, &str)] = &[
    ("UsingIP", "having_IP_Address"),
    ("LongURL", "URL_Length"),
    ("ShortURL", "Shortining_Service"),
    ("Symbol@", "having_At_Symbol"),
    ("Redirecting//", "double_slash_redirecting"),
    ("PrefixSuffix-", "Prefix_Suffix"),
    ("SubDomains", "having_Sub_Domain"),
    ("HTTPS", "SSLfinal_State"),
    ("DomainRegLen", "Domain_registeration_length"),
    ("Favicon", "Favicon"),
    ("NonStdPort", "port"),
    ("HTTPSDomainURL", "HTTPS_token"),
    ("RequestURL", "Request_URL"),
    ("AnchorURL", "URL_of_Anchor"),
    ("LinksInScriptTags", "Links_in_tags"),
    ("ServerFormHandler", "SFH"),
    ("InfoEmail", "Submitting_to_email"),
    ("AbnormalURL", "Abnormal_URL"),
    ("WebsiteForwarding", "Redirect"),
    ("StatusBarCust", "on_mouseover"),
    ("DisableRightClick", "RightClick"),
    ("UsingPopupWindow", "popUpWidnow"),
    ("IframeRedirection", "Iframe"),
    ("AgeofDomain", "age_of_domain"),
    ("DNSRecording", "DNSRecord"),
    ("WebsiteTraffic", "web_traffic"),
    ("PageRank", "Page_Rank"),
    ("GoogleIndex", "Google_Index"),
    ("LinksPointingToPage", "Links_pointing_to_page"),
    ("StatsReport", "Statistical_report"),
    ("class", "Result"),
];

/// Kaggle columns that carry no feature
pub const DROPPED_COLUMNS: &[&str] = &["Index"];

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Column '{column}' missing from {table}")]
    MissingColumn { column: String, table: String },

    #[error("Cannot concatenate tables with different columns: {left:?} vs {right:?}")]
    ColumnMismatch { left: Vec<String>, right: Vec<String> },

    #[error("Row {row}, column '{column}': cannot convert '{value}' to an integer")]
    InvalidValue {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Dataset is empty: {0}")]
    Empty(String),
}

// ============================================================================
// RAW TABLE
// ============================================================================

/// Header plus string cells, as read from CSV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn read_csv(path: &Path) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        let rows = reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;

        log::debug!("Read {} rows from {}", rows.len(), path.display());
        Ok(Self { headers, rows })
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), DatasetError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Drop a column if present. Returns whether it existed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(index) = self.column_index(name) else {
            return false;
        };
        self.headers.remove(index);
        for row in &mut self.rows {
            if index < row.len() {
                row.remove(index);
            }
        }
        true
    }

    /// Rename headers through `mapping`; unmapped headers are kept as is
    pub fn rename_columns(&mut self, mapping: &[(&str, &str)]) {
        for header in &mut self.headers {
            if let Some((_, to)) = mapping.iter().find(|(from, _)| *from == header.as_str()) {
                *header = to.to_string();
            }
        }
    }

    /// Project onto `order`. Extra columns are dropped; a missing one is an error.
    pub fn select_columns(&self, order: &[String], table: &str) -> Result<Self, DatasetError> {
        let indices = order
            .iter()
            .map(|name| {
                self.column_index(name).ok_or_else(|| DatasetError::MissingColumn {
                    column: name.clone(),
                    table: table.to_string(),
                })
            })
            .collect::<Result<Vec<usize>, _>>()?;

        let rows = self
            .rows
            .iter()
            .map(|row| {
                indices
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or_default())
                    .collect()
            })
            .collect();

        Ok(Self {
            headers: order.to_vec(),
            rows,
        })
    }

    /// Append `other`'s rows. Both tables must share one column order.
    pub fn concat(mut self, other: RawTable) -> Result<Self, DatasetError> {
        if self.headers != other.headers {
            return Err(DatasetError::ColumnMismatch {
                left: self.headers,
                right: other.headers,
            });
        }
        self.rows.extend(other.rows);
        Ok(self)
    }
}

/// Bring the Kaggle table onto the UCI schema and append it after the UCI rows
pub fn merge_tables(uci: RawTable, mut kaggle: RawTable) -> Result<RawTable, DatasetError> {
    for column in DROPPED_COLUMNS {
        kaggle.drop_column(column);
    }
    kaggle.rename_columns(COLUMN_MAPPING);
    let kaggle = kaggle.select_columns(&uci.headers, "kaggle dataset")?;

    log::info!(
        "Merging {} UCI rows with {} Kaggle rows ({} columns)",
        uci.len(),
        kaggle.len(),
        uci.headers.len()
    );
    uci.concat(kaggle)
}

// ============================================================================
// CLEANING
// ============================================================================

/// Normalize one cell to an integer.
///
/// Accepts plain integers, integral floats (`1.0`), byte-string literals
/// left behind by ARFF exports (`b'1'`, `b'-1'`) and `True` / `False`.
pub fn clean_value(raw: &str) -> Option<i64> {
    let mut value = raw.trim();

    if let Some(inner) = value
        .strip_prefix("b'")
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix("b\"").and_then(|v| v.strip_suffix('"')))
    {
        value = inner.trim();
    }

    match value {
        "True" => return Some(1),
        "False" => return Some(0),
        _ => {}
    }

    if let Ok(v) = value.parse::<i64>() {
        return Some(v);
    }

    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i64)
}

/// All-integer labeled dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<i64>>,
}

impl Dataset {
    /// Normalize every cell; any unconvertible cell aborts with its position
    pub fn from_table(table: &RawTable) -> Result<Self, DatasetError> {
        let rows = table
            .rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                row.iter()
                    .enumerate()
                    .map(|(c, cell)| {
                        clean_value(cell).ok_or_else(|| DatasetError::InvalidValue {
                            row: r,
                            column: table.headers.get(c).cloned().unwrap_or_default(),
                            value: cell.clone(),
                        })
                    })
                    .collect::<Result<Vec<i64>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            columns: table.headers.clone(),
            rows,
        })
    }

    pub fn read_csv(path: &Path) -> Result<Self, DatasetError> {
        Self::from_table(&RawTable::read_csv(path)?)
    }

    pub fn write_csv(&self, path: &Path) -> Result<(), DatasetError> {
        self.to_table().write_csv(path)
    }

    pub fn to_table(&self) -> RawTable {
        RawTable {
            headers: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Remove exact duplicate rows, keeping first occurrences in order.
    /// Returns the number of rows removed.
    pub fn drop_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::with_capacity(before);
        self.rows.retain(|row| seen.insert(row.clone()));
        before - self.rows.len()
    }

    pub fn label_index(&self) -> Result<usize, DatasetError> {
        self.columns
            .iter()
            .position(|c| c == LABEL_COLUMN)
            .ok_or_else(|| DatasetError::MissingColumn {
                column: LABEL_COLUMN.to_string(),
                table: "dataset".to_string(),
            })
    }

    /// Feature column names (everything but the label), in order
    pub fn feature_names(&self) -> Result<Vec<String>, DatasetError> {
        let label = self.label_index()?;
        Ok(self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label)
            .map(|(_, c)| c.clone())
            .collect())
    }

    /// Feature matrix (label column removed) and label vector
    pub fn features_and_labels(&self) -> Result<(Array2<f64>, Vec<i64>), DatasetError> {
        if self.rows.is_empty() {
            return Err(DatasetError::Empty("no rows to train on".to_string()));
        }

        let label = self.label_index()?;
        let n_features = self.columns.len() - 1;
        let mut values = Vec::with_capacity(self.rows.len() * n_features);
        let mut labels = Vec::with_capacity(self.rows.len());

        for row in &self.rows {
            for (i, v) in row.iter().enumerate() {
                if i != label {
                    values.push(*v as f64);
                }
            }
            labels.push(row[label]);
        }

        let x = Array2::from_shape_vec((self.rows.len(), n_features), values)
            .map_err(|e| DatasetError::Empty(format!("ragged rows: {}", e)))?;
        Ok((x, labels))
    }
}

/// Normalize and deduplicate. Running it on an already clean table is a no-op.
pub fn clean_table(table: &RawTable) -> Result<(Dataset, usize), DatasetError> {
    let mut dataset = Dataset::from_table(table)?;
    let removed = dataset.drop_duplicates();
    log::info!(
        "Cleaned dataset: {} rows kept, {} duplicates removed",
        dataset.len(),
        removed
    );
    Ok((dataset, removed))
}

// ============================================================================
// SUMMARY
// ============================================================================

/// Cell type of a column: every present cell cleans to an integer, or not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Text,
}

/// Per-column statistics over the cells that clean to an integer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    pub name: String,
    pub column_type: ColumnType,
    /// Empty cells
    pub missing: usize,
    /// Numeric cells the statistics cover
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation, 0.0 below two values
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl ColumnStats {
    fn from_cells<'a>(name: &str, cells: impl Iterator<Item = &'a str>) -> Self {
        let mut missing = 0;
        let mut text = false;
        let mut values = Vec::new();

        for cell in cells {
            if cell.trim().is_empty() {
                missing += 1;
                continue;
            }
            match clean_value(cell) {
                Some(v) => values.push(v as f64),
                None => text = true,
            }
        }

        let count = values.len();
        let mean = if count == 0 {
            0.0
        } else {
            values.iter().sum::<f64>() / count as f64
        };
        let std = if count < 2 {
            0.0
        } else {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            var.sqrt()
        };

        Self {
            name: name.to_string(),
            column_type: if text { ColumnType::Text } else { ColumnType::Integer },
            missing,
            count,
            mean,
            std,
            min: values.iter().copied().reduce(f64::min).unwrap_or(0.0),
            max: values.iter().copied().reduce(f64::max).unwrap_or(0.0),
        }
    }
}

/// Shape, types, missing cells, duplicates, balance and per-column statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
    /// Rows repeating an earlier row once cells are normalized
    pub duplicate_rows: usize,
    pub class_distribution: BTreeMap<i64, usize>,
    pub column_stats: Vec<ColumnStats>,
}

impl DatasetSummary {
    /// Summarize a table as read from disk, before or after cleaning.
    /// Cells that do not clean to an integer are compared as trimmed text.
    pub fn from_table(table: &RawTable) -> Result<Self, DatasetError> {
        let label = table
            .column_index(LABEL_COLUMN)
            .ok_or_else(|| DatasetError::MissingColumn {
                column: LABEL_COLUMN.to_string(),
                table: "dataset".to_string(),
            })?;

        let mut seen = HashSet::with_capacity(table.len());
        let mut duplicate_rows = 0;
        let mut class_distribution = BTreeMap::new();

        for row in &table.rows {
            let key: Vec<String> = row
                .iter()
                .map(|cell| match clean_value(cell) {
                    Some(v) => v.to_string(),
                    None => cell.trim().to_string(),
                })
                .collect();
            if !seen.insert(key) {
                duplicate_rows += 1;
            }

            if let Some(value) = row.get(label).and_then(|cell| clean_value(cell)) {
                *class_distribution.entry(value).or_insert(0) += 1;
            }
        }

        let column_stats = table
            .headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                ColumnStats::from_cells(
                    name,
                    table.rows.iter().map(move |row| row.get(i).map(String::as_str).unwrap_or("")),
                )
            })
            .collect();

        Ok(Self {
            rows: table.len(),
            columns: table.headers.len(),
            column_names: table.headers.clone(),
            duplicate_rows,
            class_distribution,
            column_stats,
        })
    }

    /// Add back duplicates a cleaning pass already dropped from the table
    pub fn with_duplicates_removed(mut self, removed: usize) -> Self {
        self.duplicate_rows += removed;
        self
    }

    pub fn missing_cells(&self) -> usize {
        self.column_stats.iter().map(|c| c.missing).sum()
    }

    pub fn log(&self) {
        log::info!("Shape: ({}, {})", self.rows, self.columns);
        log::info!("Columns: {:?}", self.column_names);
        for stats in &self.column_stats {
            log::info!(
                "{:<28} {:?}, {} missing",
                stats.name,
                stats.column_type,
                stats.missing
            );
        }
        log::info!("Missing values: {}", self.missing_cells());
        log::info!("Duplicate rows: {}", self.duplicate_rows);
        for (label, count) in &self.class_distribution {
            log::info!("Target {:>2}: {} rows", label, count);
        }

        log::info!(
            "{:<28} {:>7} {:>8} {:>8} {:>6} {:>6}",
            "Feature statistics", "count", "mean", "std", "min", "max"
        );
        for stats in &self.column_stats {
            log::info!(
                "{:<28} {:>7} {:>8.4} {:>8.4} {:>6} {:>6}",
                stats.name,
                stats.count,
                stats.mean,
                stats.std,
                stats.min,
                stats.max
            );
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
