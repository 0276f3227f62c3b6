//! The `@` parameter line written at the top of a matrix file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters recorded by the tool that computed the matrix.
///
/// Only the grouping fields drive parsing. The region layout fields are
/// kept as raw JSON because they are a scalar or a per-sample list
/// depending on the producer version.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MatrixParameters {
    #[serde(default)]
    pub group_labels: Vec<String>,

    /// Row offsets, `group_labels.len() + 1` entries starting at 0
    #[serde(default)]
    pub group_boundaries: Vec<usize>,

    #[serde(default)]
    pub sample_labels: Vec<String>,

    /// Column offsets of each sample
    #[serde(default)]
    pub sample_boundaries: Vec<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downstream: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    #[serde(default, rename = "bin size", skip_serializing_if = "Option::is_none")]
    pub bin_size: Option<Value>,

    #[serde(default, rename = "ref point", skip_serializing_if = "Option::is_none")]
    pub ref_point: Option<Value>,

    /// Any other key, kept verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MatrixParameters {
    /// Parse the JSON that follows the leading `@`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether the header describes row groups explicitly.
    pub fn has_groups(&self) -> bool {
        !self.group_boundaries.is_empty()
    }
}
