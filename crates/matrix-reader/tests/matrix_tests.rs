//! Tests for reading matrix files from disk.

use matrix_reader::{count_lines, HeatmapMatrix, MatrixError, DEFAULT_GROUP_LABEL};
use test_utils::{
    create_test_matrix, write_matrix, MatrixBuilder, EMPTY_MATRIX, HEADER_GROUPED_MATRIX,
    LEGACY_GROUPED_MATRIX,
};

// ============================================================================
// Line counting
// ============================================================================

#[test]
fn test_gzip_and_plain_line_counts_match() {
    let dir = tempfile::tempdir().unwrap();
    let text = create_test_matrix(10, 4);

    let plain = write_matrix(dir.path(), "plain.tab", &text, false);
    let gzipped = write_matrix(dir.path(), "packed.gz", &text, true);

    // header + 10 regions
    assert_eq!(count_lines(&plain).unwrap(), 11);
    assert_eq!(count_lines(&gzipped).unwrap(), 11);
}

#[test]
fn test_gzip_detected_without_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_matrix(dir.path(), "matrix.tab", &create_test_matrix(3, 2), true);

    let matrix = HeatmapMatrix::from_path(&path).unwrap();
    assert_eq!(matrix.num_regions(), 3);
}

// ============================================================================
// Group parsing
// ============================================================================

#[test]
fn test_header_grouped_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_matrix(dir.path(), "grouped.gz", HEADER_GROUPED_MATRIX, true);

    let matrix = HeatmapMatrix::from_path(&path).unwrap();
    assert_eq!(matrix.num_cols(), 3);
    assert_eq!(matrix.parameters().sample_labels, vec!["H3K4me3"]);

    let active = matrix.group("active").unwrap();
    assert_eq!(active.shape(), (2, 3));
    assert!(active.row(1)[1].is_nan());
    assert_eq!(active.regions()[0].name, "geneA");

    let silent = matrix.group("silent").unwrap();
    assert_eq!(silent.values(), &[0.0, 0.5, 1.0]);

    assert_eq!(matrix.flatten_finite().len(), 8);
}

#[test]
fn test_legacy_grouped_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_matrix(dir.path(), "legacy.tab", LEGACY_GROUPED_MATRIX, false);

    let matrix = HeatmapMatrix::from_path(&path).unwrap();
    let labels: Vec<_> = matrix.groups().iter().map(|g| g.label().to_string()).collect();
    assert_eq!(labels, vec!["up-regulated", "down-regulated"]);
    assert!(matrix.parameters().group_labels.is_empty());
}

#[test]
fn test_unlabelled_rows_form_default_group() {
    let text = MatrixBuilder::new(2)
        .group("ignored", 4)
        .without_header()
        .build(|row, _| row as f64);
    let dir = tempfile::tempdir().unwrap();
    let path = write_matrix(dir.path(), "plain.tab", &text, false);

    let matrix = HeatmapMatrix::from_path(&path).unwrap();
    assert_eq!(matrix.groups().len(), 1);
    assert_eq!(matrix.group(DEFAULT_GROUP_LABEL).unwrap().shape(), (4, 2));
}

#[test]
fn test_empty_matrix_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_matrix(dir.path(), "empty.gz", EMPTY_MATRIX, true);

    match HeatmapMatrix::from_path(&path) {
        Err(MatrixError::Empty(p)) => assert_eq!(p, path),
        other => panic!("expected empty matrix error, got {:?}", other),
    }
}

#[test]
fn test_invalid_header_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_matrix(dir.path(), "bad.tab", "@{not json\nchr1\t0\t1\tr\t.\t+\t1\n", false);

    assert!(matches!(
        HeatmapMatrix::from_path(&path),
        Err(MatrixError::InvalidHeader(_))
    ));
}
