//! Label space loaded from the reference CSV
//!
//! The reference table provides a `class_label` column whose distinct values
//! define the class set the model was trained against. Labels are encoded in
//! lexicographic order, so the mapping is stable regardless of row order in
//! the file. The set and order must match the model's output layer; a model
//! trained against a different table silently mislabels predictions, which is
//! why the table is loaded once at startup and never mutated.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

#[derive(Debug, Deserialize)]
struct LabelRow {
    class_label: String,
}

/// Deterministic bidirectional mapping between class labels and indices.
#[derive(Debug, Clone)]
pub struct LabelSpace {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl LabelSpace {
    /// Load the label space from a CSV file with a `class_label` column.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path).map_err(|e| {
            Error::Labels(format!("Failed to open {}: {}", path.display(), e))
        })?;

        let mut labels = Vec::new();
        for row in reader.deserialize::<LabelRow>() {
            let row = row.map_err(|e| {
                Error::Labels(format!("Malformed row in {}: {}", path.display(), e))
            })?;
            labels.push(row.class_label);
        }

        let space = Self::from_labels(labels)?;
        info!(
            "Loaded {} distinct class labels from {}",
            space.len(),
            path.display()
        );
        Ok(space)
    }

    /// Build the label space from raw label values (duplicates allowed).
    pub fn from_labels(mut labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::Labels("Label table is empty".to_string()));
        }

        labels.sort();
        labels.dedup();

        let index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();

        Ok(Self { labels, index })
    }

    /// Forward mapping: label string to class index.
    pub fn encode(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Reverse mapping: class index to label string.
    pub fn decode(&self, index: usize) -> Result<&str> {
        self.labels
            .get(index)
            .map(|s| s.as_str())
            .ok_or(Error::UnknownLabel(index))
    }

    /// Number of distinct classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// All labels in index order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn reference_table() -> LabelSpace {
        LabelSpace::from_labels(vec![
            "dog_bark".to_string(),
            "siren".to_string(),
            "car_horn".to_string(),
        ])
        .unwrap()
    }

    #[test]
    fn encoding_is_lexicographic() {
        let space = reference_table();
        assert_eq!(space.encode("car_horn"), Some(0));
        assert_eq!(space.encode("dog_bark"), Some(1));
        assert_eq!(space.encode("siren"), Some(2));
    }

    #[test]
    fn every_index_decodes_to_a_known_label() {
        let space = reference_table();
        for i in 0..space.len() {
            let label = space.decode(i).unwrap();
            assert!(["dog_bark", "siren", "car_horn"].contains(&label));
        }
    }

    #[test]
    fn encoding_ignores_row_order_and_duplicates() {
        let a = LabelSpace::from_labels(vec![
            "siren".into(),
            "dog_bark".into(),
            "siren".into(),
            "car_horn".into(),
        ])
        .unwrap();
        let b = reference_table();
        assert_eq!(a.labels(), b.labels());
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let space = reference_table();
        assert!(matches!(space.decode(3), Err(Error::UnknownLabel(3))));
    }

    #[test]
    fn empty_table_is_rejected() {
        assert!(LabelSpace::from_labels(Vec::new()).is_err());
    }

    #[test]
    fn loads_from_csv_with_extra_columns() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "fold,class_label,duration").unwrap();
        writeln!(file, "1,dog_bark,4.0").unwrap();
        writeln!(file, "2,siren,2.5").unwrap();
        writeln!(file, "1,car_horn,1.0").unwrap();
        writeln!(file, "3,dog_bark,3.2").unwrap();
        file.flush().unwrap();

        let space = LabelSpace::from_csv(file.path()).unwrap();
        assert_eq!(space.len(), 3);
        assert_eq!(space.decode(1).unwrap(), "dog_bark");
    }

    #[test]
    fn missing_csv_is_an_error() {
        let result = LabelSpace::from_csv(Path::new("/nonexistent/labels.csv"));
        assert!(matches!(result, Err(Error::Labels(_))));
    }
}
