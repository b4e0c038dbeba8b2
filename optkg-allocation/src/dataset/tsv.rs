//! Tab-separated response files.
//!
//! One row per (task, worker) response with a header naming at least the
//! `orig_id`, `!amt_worker_ids`, `response` and `gold` columns; any other
//! columns are ignored. Rows are grouped by task in first-appearance order.

use std::path::Path;

use optkg_core::constants::{COLUMN_GOLD, COLUMN_RESPONSE, COLUMN_TASK, COLUMN_WORKER};
use optkg_core::errors::DatasetError;
use optkg_core::types::Label;

use super::Registry;

struct Columns {
    task: usize,
    worker: usize,
    response: usize,
    gold: usize,
}

impl Columns {
    fn from_header(header: &str) -> Result<Self, DatasetError> {
        let names: Vec<&str> = header.split('\t').map(str::trim).collect();
        let find = |column: &'static str| {
            names
                .iter()
                .position(|n| *n == column)
                .ok_or(DatasetError::MissingColumn { column })
        };
        Ok(Self {
            task: find(COLUMN_TASK)?,
            worker: find(COLUMN_WORKER)?,
            response: find(COLUMN_RESPONSE)?,
            gold: find(COLUMN_GOLD)?,
        })
    }

    fn width(&self) -> usize {
        self.task.max(self.worker).max(self.response).max(self.gold) + 1
    }
}

impl Registry {
    /// Load a registry from a TSV file on disk.
    pub fn from_tsv_path(path: &Path) -> Result<Self, DatasetError> {
        let content = std::fs::read_to_string(path).map_err(|_| DatasetError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let registry = Self::from_tsv_str(&content)?;
        tracing::info!(
            path = %path.display(),
            tasks = registry.task_count(),
            workers = registry.worker_count(),
            responses = registry.pair_count(),
            "loaded response registry"
        );
        Ok(registry)
    }

    /// Parse a registry from TSV text.
    pub fn from_tsv_str(content: &str) -> Result<Self, DatasetError> {
        let mut lines = content.lines().enumerate();
        let header = lines
            .by_ref()
            .find(|(_, l)| !l.trim().is_empty())
            .map(|(_, l)| l)
            .ok_or(DatasetError::Empty)?;
        let columns = Columns::from_header(header)?;

        let mut builder = Registry::builder();
        for (i, line) in lines {
            let line_no = i + 1;
            if line.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if fields.len() < columns.width() {
                return Err(DatasetError::MalformedRow {
                    line: line_no,
                    message: format!(
                        "expected at least {} fields, found {}",
                        columns.width(),
                        fields.len()
                    ),
                });
            }
            let task = fields[columns.task];
            let worker = fields[columns.worker];
            if task.is_empty() || worker.is_empty() {
                return Err(DatasetError::MalformedRow {
                    line: line_no,
                    message: "empty task or worker id".to_string(),
                });
            }
            let label = parse_label(fields[columns.response], line_no)?.ok_or_else(|| {
                DatasetError::InvalidLabel {
                    line: line_no,
                    value: fields[columns.response].to_string(),
                }
            })?;
            builder.response(task, worker, label);
            if let Some(gold) = parse_label(fields[columns.gold], line_no)? {
                builder.gold(task, gold)?;
            }
        }
        builder.build()
    }
}

/// `0`/`1` (also `0.0`/`1.0`) map to labels; empty and `NA`-style
/// markers mean "absent".
fn parse_label(raw: &str, line: usize) -> Result<Option<Label>, DatasetError> {
    let invalid = || DatasetError::InvalidLabel {
        line,
        value: raw.to_string(),
    };
    match raw {
        "" | "NA" | "NaN" | "nan" | "null" => Ok(None),
        _ => {
            let value: f64 = raw.parse().map_err(|_| invalid())?;
            if value.fract() != 0.0 {
                return Err(invalid());
            }
            Label::from_raw(value as i64).map(Some).map_err(|_| invalid())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "!amt_annotation_ids\t!amt_worker_ids\torig_id\tresponse\tgold\n\
                          A1\tW1\t12\t1\t1\n\
                          A2\tW2\t12\t0\t1\n\
                          A3\tW1\t7\t0\t0\n\
                          A4\tW3\t12\t1\t1\n";

    #[test]
    fn test_rows_grouped_by_task() {
        let reg = Registry::from_tsv_str(SAMPLE).unwrap();
        assert_eq!(reg.task_count(), 2);
        assert_eq!(reg.worker_count(), 3);
        assert_eq!(reg.pair_count(), 4);

        let t12 = reg.task_id("12").unwrap();
        let workers: Vec<&str> = reg
            .responses(t12)
            .iter()
            .map(|r| reg.worker_name(r.worker))
            .collect();
        assert_eq!(workers, vec!["W1", "W2", "W3"]);
        assert_eq!(reg.gold(t12), Some(Label::Positive));
        assert_eq!(reg.gold(reg.task_id("7").unwrap()), Some(Label::Negative));
    }

    #[test]
    fn test_missing_column() {
        let err = Registry::from_tsv_str("orig_id\tresponse\tgold\n1\t1\t1\n").unwrap_err();
        assert!(matches!(
            err,
            DatasetError::MissingColumn {
                column: "!amt_worker_ids"
            }
        ));
    }

    #[test]
    fn test_absent_gold_allowed() {
        let reg = Registry::from_tsv_str(
            "orig_id\t!amt_worker_ids\tresponse\tgold\nT\tW\t1\tNA\nU\tW\t0\t\n",
        )
        .unwrap();
        assert_eq!(reg.gold(reg.task_id("T").unwrap()), None);
        assert_eq!(reg.gold(reg.task_id("U").unwrap()), None);
    }

    #[test]
    fn test_non_binary_response_rejected() {
        let err =
            Registry::from_tsv_str("orig_id\t!amt_worker_ids\tresponse\tgold\nT\tW\t2\t1\n")
                .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidLabel { line: 2, .. }));
    }

    #[test]
    fn test_short_row_rejected() {
        let err = Registry::from_tsv_str("orig_id\t!amt_worker_ids\tresponse\tgold\nT\tW\n")
            .unwrap_err();
        assert!(matches!(err, DatasetError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_float_labels_accepted() {
        let reg = Registry::from_tsv_str(
            "orig_id\t!amt_worker_ids\tresponse\tgold\nT\tW\t1.0\t0.0\n",
        )
        .unwrap();
        let t = reg.task_id("T").unwrap();
        assert_eq!(reg.responses(t)[0].label, Label::Positive);
        assert_eq!(reg.gold(t), Some(Label::Negative));
    }
}
