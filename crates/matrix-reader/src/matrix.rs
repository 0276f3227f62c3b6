//! Parsing of region-by-bin score matrices into named row groups.

use std::io::BufRead;
use std::path::Path;

use tracing::{debug, warn};

use crate::header::MatrixParameters;
use crate::io::open_matrix;
use crate::{MatrixError, MatrixResult};

/// Group name used when the file does not label its rows
pub const DEFAULT_GROUP_LABEL: &str = "genes";

/// Number of region description columns before the values
const REGION_COLUMNS: usize = 6;

/// One genomic region: a row of the matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub name: String,
    pub score: String,
    pub strand: String,
}

/// A labelled block of consecutive rows.
#[derive(Debug, Clone)]
pub struct RegionGroup {
    label: String,
    regions: Vec<Region>,
    /// Row-major, `regions.len() * cols` values
    values: Vec<f64>,
    cols: usize,
}

impl RegionGroup {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn rows(&self) -> usize {
        self.regions.len()
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// All values in row-major order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Values of one row.
    pub fn row(&self, index: usize) -> &[f64] {
        &self.values[index * self.cols..(index + 1) * self.cols]
    }

    /// `(rows, cols)` of this group.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols)
    }
}

/// A parsed matrix file.
#[derive(Debug, Clone)]
pub struct HeatmapMatrix {
    parameters: MatrixParameters,
    groups: Vec<RegionGroup>,
    cols: usize,
}

/// Rows collected before they are split into groups
struct RawRows {
    regions: Vec<Region>,
    values: Vec<f64>,
    cols: Option<usize>,
    /// `(label, end row)` from legacy `#label` lines
    legacy_groups: Vec<(String, usize)>,
}

impl HeatmapMatrix {
    /// Read and parse a matrix file, gzip-compressed or plain.
    pub fn from_path<P: AsRef<Path>>(path: P) -> MatrixResult<Self> {
        let path = path.as_ref();
        let matrix = Self::from_reader(open_matrix(path)?, path)?;

        debug!(
            path = %path.display(),
            groups = ?matrix.groups.iter().map(|g| (g.label(), g.shape())).collect::<Vec<_>>(),
            "Parsed matrix"
        );
        Ok(matrix)
    }

    /// Parse a matrix from any buffered reader.
    ///
    /// `origin` is only used to name the source in errors.
    pub fn from_reader<R: BufRead>(reader: R, origin: &Path) -> MatrixResult<Self> {
        let mut parameters = MatrixParameters::default();
        let mut raw = RawRows {
            regions: Vec::new(),
            values: Vec::new(),
            cols: None,
            legacy_groups: Vec::new(),
        };

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let line = line.trim_end_matches('\r');

            if index == 0 {
                if let Some(json) = line.strip_prefix('@') {
                    parameters = MatrixParameters::from_json(json.trim())?;
                    continue;
                }
            }

            if let Some(label) = line.strip_prefix('#') {
                let end = raw.regions.len();
                let start = raw.legacy_groups.last().map_or(0, |(_, end)| *end);
                if end == start {
                    warn!(line = line_number, label = label.trim(), "Skipping empty group");
                    continue;
                }
                raw.legacy_groups.push((label.trim().to_string(), end));
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }

            parse_row(line, line_number, &mut raw)?;
        }

        if raw.regions.is_empty() {
            return Err(MatrixError::Empty(origin.to_path_buf()));
        }

        let cols = raw.cols.unwrap_or(0);
        let bounds = group_bounds(&parameters, &raw)?;
        let groups = bounds
            .into_iter()
            .map(|(label, start, end)| RegionGroup {
                label,
                regions: raw.regions[start..end].to_vec(),
                values: raw.values[start * cols..end * cols].to_vec(),
                cols,
            })
            .collect();

        Ok(Self {
            parameters,
            groups,
            cols,
        })
    }

    pub fn parameters(&self) -> &MatrixParameters {
        &self.parameters
    }

    /// Row groups in file order.
    pub fn groups(&self) -> &[RegionGroup] {
        &self.groups
    }

    /// Look up a group by label.
    pub fn group(&self, label: &str) -> Option<&RegionGroup> {
        self.groups.iter().find(|g| g.label == label)
    }

    /// Total number of regions over all groups.
    pub fn num_regions(&self) -> usize {
        self.groups.iter().map(RegionGroup::rows).sum()
    }

    /// Number of values per region.
    pub fn num_cols(&self) -> usize {
        self.cols
    }

    /// All finite values of all groups, concatenated in group order.
    pub fn flatten_finite(&self) -> Vec<f64> {
        self.groups
            .iter()
            .flat_map(|g| g.values.iter().copied())
            .filter(|v| v.is_finite())
            .collect()
    }
}

fn parse_row(line: &str, line_number: usize, raw: &mut RawRows) -> MatrixResult<()> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < REGION_COLUMNS {
        return Err(MatrixError::MalformedRow {
            line: line_number,
            reason: format!(
                "expected at least {} columns, found {}",
                REGION_COLUMNS,
                fields.len()
            ),
        });
    }

    let coordinate = |name: &str, value: &str| {
        value.trim().parse::<u64>().map_err(|_| MatrixError::MalformedRow {
            line: line_number,
            reason: format!("invalid {} '{}'", name, value),
        })
    };

    let region = Region {
        chrom: fields[0].to_string(),
        start: coordinate("start", fields[1])?,
        end: coordinate("end", fields[2])?,
        name: fields[3].to_string(),
        score: fields[4].to_string(),
        strand: fields[5].to_string(),
    };

    let values = &fields[REGION_COLUMNS..];
    match raw.cols {
        Some(expected) if expected != values.len() => {
            return Err(MatrixError::RaggedRow {
                line: line_number,
                expected,
                found: values.len(),
            });
        }
        Some(_) => {}
        None => raw.cols = Some(values.len()),
    }

    for cell in values {
        raw.values.push(parse_value(cell).ok_or_else(|| MatrixError::MalformedRow {
            line: line_number,
            reason: format!("invalid value '{}'", cell),
        })?);
    }
    raw.regions.push(region);
    Ok(())
}

/// Parse one score cell. Missing markers become NaN.
fn parse_value(cell: &str) -> Option<f64> {
    match cell.trim() {
        "" | "-" | "NA" | "nan" | "NaN" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}

/// Resolve `(label, start row, end row)` for every group.
fn group_bounds(
    parameters: &MatrixParameters,
    raw: &RawRows,
) -> MatrixResult<Vec<(String, usize, usize)>> {
    let total = raw.regions.len();

    if parameters.has_groups() {
        let bounds = &parameters.group_boundaries;
        let labels = &parameters.group_labels;
        if bounds.len() != labels.len() + 1 {
            return Err(MatrixError::InvalidGroups(format!(
                "{} boundaries for {} labels",
                bounds.len(),
                labels.len()
            )));
        }
        if bounds[0] != 0 || bounds[bounds.len() - 1] != total {
            return Err(MatrixError::InvalidGroups(format!(
                "boundaries {:?} do not span {} rows",
                bounds, total
            )));
        }
        if bounds.windows(2).any(|w| w[0] > w[1]) {
            return Err(MatrixError::InvalidGroups(format!(
                "boundaries {:?} are not sorted",
                bounds
            )));
        }
        return Ok(labels
            .iter()
            .zip(bounds.windows(2))
            .map(|(label, w)| (label.clone(), w[0], w[1]))
            .collect());
    }

    if !raw.legacy_groups.is_empty() {
        let mut groups = Vec::with_capacity(raw.legacy_groups.len() + 1);
        let mut start = 0;
        for (label, end) in &raw.legacy_groups {
            groups.push((label.clone(), start, *end));
            start = *end;
        }
        if start < total {
            groups.push((DEFAULT_GROUP_LABEL.to_string(), start, total));
        }
        return Ok(groups);
    }

    Ok(vec![(DEFAULT_GROUP_LABEL.to_string(), 0, total)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(content: &str) -> MatrixResult<HeatmapMatrix> {
        HeatmapMatrix::from_reader(Cursor::new(content), Path::new("test.mat"))
    }

    #[test]
    fn test_parse_value_missing_markers() {
        assert!(parse_value("nan").unwrap().is_nan());
        assert!(parse_value("NA").unwrap().is_nan());
        assert!(parse_value("").unwrap().is_nan());
        assert_eq!(parse_value("1.5"), Some(1.5));
        assert_eq!(parse_value("-2e3"), Some(-2000.0));
        assert_eq!(parse_value("inf"), Some(f64::INFINITY));
        assert_eq!(parse_value("abc"), None);
    }

    #[test]
    fn test_default_group() {
        let matrix = parse("chr1\t0\t100\tr1\t0\t+\t1\t2\nchr1\t100\t200\tr2\t0\t-\t3\t4\n").unwrap();
        assert_eq!(matrix.groups().len(), 1);

        let group = matrix.group(DEFAULT_GROUP_LABEL).unwrap();
        assert_eq!(group.shape(), (2, 2));
        assert_eq!(group.row(1), &[3.0, 4.0]);
        assert_eq!(group.regions()[1].strand, "-");
    }

    #[test]
    fn test_header_groups() {
        let content = "@{\"group_labels\":[\"a\",\"b\"],\"group_boundaries\":[0,1,3]}\n\
            chr1\t0\t1\tr1\t.\t+\t1\n\
            chr1\t1\t2\tr2\t.\t+\t2\n\
            chr1\t2\t3\tr3\t.\t+\t3\n";
        let matrix = parse(content).unwrap();

        let labels: Vec<_> = matrix.groups().iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(matrix.group("b").unwrap().values(), &[2.0, 3.0]);
        assert_eq!(matrix.num_regions(), 3);
    }

    #[test]
    fn test_legacy_hash_groups_with_trailing_rows() {
        let content = "chr1\t0\t1\tr1\t.\t+\t1\n\
            #first\n\
            chr1\t1\t2\tr2\t.\t+\t2\n\
            #second\n\
            #empty\n\
            chr1\t2\t3\tr3\t.\t+\t3\n";
        let matrix = parse(content).unwrap();

        let labels: Vec<_> = matrix.groups().iter().map(|g| g.label()).collect();
        assert_eq!(labels, vec!["first", "second", DEFAULT_GROUP_LABEL]);
        assert_eq!(matrix.group("second").unwrap().values(), &[2.0]);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = parse("chr1\t0\t1\tr1\t.\t+\t1\t2\nchr1\t1\t2\tr2\t.\t+\t3\n").unwrap_err();
        assert!(matches!(
            err,
            MatrixError::RaggedRow { line: 2, expected: 2, found: 1 }
        ));
    }

    #[test]
    fn test_short_row_rejected() {
        let err = parse("chr1\t0\t1\n").unwrap_err();
        assert!(matches!(err, MatrixError::MalformedRow { line: 1, .. }));
    }

    #[test]
    fn test_bad_coordinate_rejected() {
        let err = parse("chr1\tzero\t1\tr1\t.\t+\t1\n").unwrap_err();
        assert!(matches!(err, MatrixError::MalformedRow { line: 1, .. }));
    }

    #[test]
    fn test_inconsistent_boundaries_rejected() {
        let content = "@{\"group_labels\":[\"a\"],\"group_boundaries\":[0,5]}\n\
            chr1\t0\t1\tr1\t.\t+\t1\n";
        assert!(matches!(parse(content), Err(MatrixError::InvalidGroups(_))));
    }

    #[test]
    fn test_header_only_is_empty() {
        let err = parse("@{}\n").unwrap_err();
        assert!(matches!(err, MatrixError::Empty(_)));
    }

    #[test]
    fn test_flatten_finite_drops_missing() {
        let matrix = parse("chr1\t0\t1\tr1\t.\t+\t1\tnan\tinf\nchr1\t1\t2\tr2\t.\t+\t-inf\t2\t3\n").unwrap();
        assert_eq!(matrix.flatten_finite(), vec![1.0, 2.0, 3.0]);
    }
}
