//! Names of the counters emitted by apiop.

/// Normalized operations, labelled `format` and `outcome`.
pub const OPERATIONS_TOTAL: &str = "apiop_operations_total";

/// Extracted request bodies, labelled `source` (`multipart`, `form`, `raw`).
pub const BODY_SOURCE_TOTAL: &str = "apiop_body_source_total";
