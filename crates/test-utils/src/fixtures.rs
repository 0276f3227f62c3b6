//! Small fixture matrices covering each way a file can label its groups.

/// Two header-labelled groups over three bins, with one missing value.
pub const HEADER_GROUPED_MATRIX: &str = "@{\"upstream\":[500],\"downstream\":[500],\"body\":[0],\"bin size\":[500],\"ref point\":[\"TSS\"],\"group_labels\":[\"active\",\"silent\"],\"group_boundaries\":[0,2,3],\"sample_labels\":[\"H3K4me3\"],\"sample_boundaries\":[0,3]}
chr1\t1000\t2000\tgeneA\t0\t+\t5.0\t9.0\t7.0
chr1\t3000\t4000\tgeneB\t0\t-\t4.0\tnan\t6.0
chr2\t1000\t2000\tgeneC\t0\t+\t0.0\t0.5\t1.0
";

/// Legacy layout: no header, each group closed by a `#label` line.
pub const LEGACY_GROUPED_MATRIX: &str = "chr1\t1000\t2000\tgeneA\t0\t+\t1\t2
chr1\t3000\t4000\tgeneB\t0\t-\t3\t4
#up-regulated
chr2\t1000\t2000\tgeneC\t0\t+\t5\t6
#down-regulated
";

/// Header line only; no regions.
pub const EMPTY_MATRIX: &str = "@{\"group_labels\":[],\"group_boundaries\":[0]}\n";
