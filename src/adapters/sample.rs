use crate::domain::cuts::Cut;
use crate::utils::error::{PlotError, Result};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Columns and rows pulled out of one sample file.
#[derive(Debug, Clone, Default)]
pub struct SampleData {
    pub labels: Vec<i64>,
    pub columns: HashMap<String, Vec<f64>>,
}

/// What to read: the truth label, extra numeric columns, row filters and a row cap.
#[derive(Debug, Clone)]
pub struct SampleRequest<'a> {
    pub label_var: &'a str,
    pub columns: &'a [String],
    pub cuts: &'a [Cut],
    pub max_jets: usize,
}

/// 讀取 CSV/TSV 樣本檔 (`jets` 紀錄)
#[derive(Debug)]
pub struct SampleReader {
    path: PathBuf,
    columns: Vec<String>,
    reader: csv::Reader<File>,
}

impl SampleReader {
    /// Opens the file and reads its header row. `.tsv` files are tab separated.
    pub fn open(path: &Path) -> Result<Self> {
        let delimiter = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
            _ => b',',
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| load_error(path, e))?;
        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| load_error(path, e))?
            .iter()
            .map(str::to_string)
            .collect();
        if columns.is_empty() {
            return Err(PlotError::sample(path.display().to_string(), "no header row"));
        }

        Ok(Self {
            path: path.to_path_buf(),
            columns,
            reader,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn index_of(&self, column: &str) -> Result<usize> {
        self.columns.iter().position(|c| c == column).ok_or_else(|| {
            PlotError::sample(
                self.path.display().to_string(),
                format!("missing column '{}'", column),
            )
        })
    }

    /// Reads rows until `max_jets` rows passed every cut. Consumes the reader,
    /// so the file is closed when this returns.
    pub fn read(mut self, request: &SampleRequest<'_>) -> Result<SampleData> {
        let label_index = self.index_of(request.label_var)?;
        let column_indices = request
            .columns
            .iter()
            .map(|c| -> Result<(String, usize)> { Ok((c.clone(), self.index_of(c)?)) })
            .collect::<Result<Vec<_>>>()?;
        let cut_indices = request
            .cuts
            .iter()
            .map(|cut| -> Result<(Cut, usize)> { Ok((cut.clone(), self.index_of(&cut.column)?)) })
            .collect::<Result<Vec<_>>>()?;

        let mut data = SampleData {
            labels: Vec::new(),
            columns: column_indices
                .iter()
                .map(|(name, _)| (name.clone(), Vec::new()))
                .collect(),
        };

        let source = self.path.display().to_string();
        let parse = |record: &csv::StringRecord, index: usize, row: usize| -> Result<f64> {
            let field = record.get(index).unwrap_or("");
            field.parse::<f64>().map_err(|_| {
                PlotError::sample(
                    source.clone(),
                    format!(
                        "row {}: value '{}' of column '{}' is not a number",
                        row, field, self.columns[index]
                    ),
                )
            })
        };

        let mut record = csv::StringRecord::new();
        let mut row = 0usize;
        while data.labels.len() < request.max_jets {
            let more = self
                .reader
                .read_record(&mut record)
                .map_err(|e| load_error(&self.path, e))?;
            if !more {
                break;
            }
            row += 1;

            let mut keep = true;
            for (cut, index) in &cut_indices {
                if !cut.passes(parse(&record, *index, row)?) {
                    keep = false;
                    break;
                }
            }
            if !keep {
                continue;
            }

            let label = parse(&record, label_index, row)?;
            if !label.is_finite() || label.fract() != 0.0 {
                return Err(PlotError::sample(
                    source.clone(),
                    format!(
                        "row {}: truth label '{}' of column '{}' is not an integer",
                        row, label, request.label_var
                    ),
                ));
            }
            data.labels.push(label as i64);
            for (name, index) in &column_indices {
                let value = parse(&record, *index, row)?;
                if let Some(values) = data.columns.get_mut(name) {
                    values.push(value);
                }
            }
        }

        tracing::debug!(
            "Read {} jet(s) from {} ({} row(s) scanned)",
            data.labels.len(),
            source,
            row
        );
        Ok(data)
    }
}

fn load_error(path: &Path, err: csv::Error) -> PlotError {
    PlotError::sample(path.display().to_string(), err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const CSV: &str = "pt,eta,HadronConeExclTruthLabelID,T_pb\n\
                       25,0.1,5,0.9\n\
                       15,0.2,0,0.1\n\
                       40,-1.0,4,0.3\n\
                       60,2.0,5,0.8\n";

    #[test]
    fn test_open_reads_header() {
        let file = sample_file(CSV, ".csv");
        let reader = SampleReader::open(file.path()).unwrap();
        assert_eq!(reader.columns(), &["pt", "eta", "HadronConeExclTruthLabelID", "T_pb"]);
    }

    #[test]
    fn test_read_applies_cuts_and_cap() {
        let file = sample_file(CSV, ".csv");
        let columns = vec!["T_pb".to_string()];
        let cuts = vec!["pt > 20".parse::<Cut>().unwrap()];
        let request = SampleRequest {
            label_var: "HadronConeExclTruthLabelID",
            columns: &columns,
            cuts: &cuts,
            max_jets: 2,
        };

        let data = SampleReader::open(file.path()).unwrap().read(&request).unwrap();
        assert_eq!(data.labels, vec![5, 4]);
        assert_eq!(data.columns["T_pb"], vec![0.9, 0.3]);
    }

    #[test]
    fn test_tsv_delimiter() {
        let file = sample_file("pt\tHadronConeExclTruthLabelID\n30\t0\n", ".tsv");
        let request = SampleRequest {
            label_var: "HadronConeExclTruthLabelID",
            columns: &["pt".to_string()],
            cuts: &[],
            max_jets: 10,
        };
        let data = SampleReader::open(file.path()).unwrap().read(&request).unwrap();
        assert_eq!(data.columns["pt"], vec![30.0]);
    }

    #[test]
    fn test_missing_column_and_bad_value() {
        let file = sample_file(CSV, ".csv");
        let columns = vec!["T_pc".to_string()];
        let request = SampleRequest {
            label_var: "HadronConeExclTruthLabelID",
            columns: &columns,
            cuts: &[],
            max_jets: 10,
        };
        let err = SampleReader::open(file.path()).unwrap().read(&request).unwrap_err();
        assert!(err.to_string().contains("missing column 'T_pc'"));

        let bad = sample_file("HadronConeExclTruthLabelID\nfive\n", ".csv");
        let request = SampleRequest {
            label_var: "HadronConeExclTruthLabelID",
            columns: &[],
            cuts: &[],
            max_jets: 10,
        };
        let err = SampleReader::open(bad.path()).unwrap().read(&request).unwrap_err();
        assert!(matches!(err, PlotError::SampleLoadError { .. }));
    }

    #[test]
    fn test_non_integer_label_is_rejected() {
        let request = SampleRequest {
            label_var: "HadronConeExclTruthLabelID",
            columns: &[],
            cuts: &[],
            max_jets: 10,
        };
        for content in ["HadronConeExclTruthLabelID\n5\nnan\n", "HadronConeExclTruthLabelID\n5.7\n"] {
            let file = sample_file(content, ".csv");
            let err = SampleReader::open(file.path()).unwrap().read(&request).unwrap_err();
            assert!(matches!(err, PlotError::SampleLoadError { .. }), "{}", content);
            assert!(err.to_string().contains("is not an integer"));
        }

        let file = sample_file("HadronConeExclTruthLabelID\n5.0\n0\n", ".csv");
        let data = SampleReader::open(file.path()).unwrap().read(&request).unwrap();
        assert_eq!(data.labels, vec![5, 0]);
    }

    #[test]
    fn test_missing_file() {
        let err = SampleReader::open(Path::new("/nonexistent/sample.csv")).unwrap_err();
        assert!(matches!(err, PlotError::SampleLoadError { .. }));
    }
}
