//! Generators for synthetic matrix files.
//!
//! Values follow predictable patterns so tests can compute expected
//! percentiles and colours by hand.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Builds the text of a matrix file with a JSON header line.
///
/// # Example
///
/// ```
/// use test_utils::MatrixBuilder;
///
/// let text = MatrixBuilder::new(3).group("genes", 2).build(|row, col| (row * 10 + col) as f64);
/// assert_eq!(text.lines().count(), 3); // header + 2 rows
/// ```
#[derive(Debug, Clone)]
pub struct MatrixBuilder {
    cols: usize,
    groups: Vec<(String, usize)>,
    header: bool,
}

impl MatrixBuilder {
    pub fn new(cols: usize) -> Self {
        Self {
            cols,
            groups: Vec::new(),
            header: true,
        }
    }

    /// Append a group of `rows` regions.
    pub fn group(mut self, label: &str, rows: usize) -> Self {
        self.groups.push((label.to_string(), rows));
        self
    }

    /// Leave out the `@` header line.
    pub fn without_header(mut self) -> Self {
        self.header = false;
        self
    }

    /// Render the file text. `value(row, col)` gives each score, with
    /// `row` counted across all groups; NaN is written as `nan`.
    pub fn build<F>(&self, value: F) -> String
    where
        F: Fn(usize, usize) -> f64,
    {
        let mut text = String::new();

        if self.header {
            let labels: Vec<String> = self.groups.iter().map(|(l, _)| format!("\"{}\"", l)).collect();
            let mut boundaries = vec![0usize];
            for (_, rows) in &self.groups {
                boundaries.push(boundaries.last().copied().unwrap_or(0) + rows);
            }
            let boundaries: Vec<String> = boundaries.iter().map(|b| b.to_string()).collect();
            let _ = writeln!(
                text,
                "@{{\"upstream\":[1000],\"downstream\":[1000],\"bin size\":[10],\
                 \"group_labels\":[{}],\"group_boundaries\":[{}],\
                 \"sample_labels\":[\"sample\"],\"sample_boundaries\":[0,{}]}}",
                labels.join(","),
                boundaries.join(","),
                self.cols
            );
        }

        let mut row = 0;
        for (_, rows) in &self.groups {
            for _ in 0..*rows {
                let start = row * 1000;
                let _ = write!(text, "chr1\t{}\t{}\tregion{}\t.\t+", start, start + 1000, row);
                for col in 0..self.cols {
                    let v = value(row, col);
                    if v.is_nan() {
                        text.push_str("\tnan");
                    } else {
                        let _ = write!(text, "\t{}", v);
                    }
                }
                text.push('\n');
                row += 1;
            }
        }
        text
    }
}

/// A single-group matrix whose cell value is `col * 1000 + row`.
pub fn create_test_matrix(rows: usize, cols: usize) -> String {
    MatrixBuilder::new(cols)
        .group("genes", rows)
        .build(|row, col| (col * 1000 + row) as f64)
}

/// Write matrix text to `dir/name`, gzip-compressed when `gzip` is set.
pub fn write_matrix(dir: &Path, name: &str, content: &str, gzip: bool) -> PathBuf {
    let path = dir.join(name);
    if gzip {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(content.as_bytes())
            .expect("gzip encode");
        fs::write(&path, encoder.finish().expect("gzip finish")).expect("write matrix");
    } else {
        fs::write(&path, content).expect("write matrix");
    }
    path
}
