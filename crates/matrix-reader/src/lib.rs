//! Reader for region-by-bin score matrices.
//!
//! A matrix file is tab-delimited text, optionally gzip-compressed:
//!
//! ```text
//! @{"group_labels":["genes"],"group_boundaries":[0,2],...}
//! chr1  1000  2000  geneA  .  +  0.1  0.4  nan ...
//! chr2  5000  6000  geneB  .  -  1.2  0.9  0.3 ...
//! ```
//!
//! The optional `@` line carries the producer's parameters as JSON. Each
//! data line describes one region (six columns) followed by its binned
//! scores. Rows are split into named groups using the header boundaries,
//! legacy `#label` terminator lines, or a single `genes` group.

pub mod error;
pub mod header;
pub mod io;
pub mod matrix;

pub use error::{MatrixError, MatrixResult};
pub use header::MatrixParameters;
pub use io::{count_lines, open_matrix};
pub use matrix::{HeatmapMatrix, Region, RegionGroup, DEFAULT_GROUP_LABEL};
