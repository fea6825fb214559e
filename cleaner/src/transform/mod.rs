//! Transformation module.
//!
//! - Reshape: composite key split and wide to long melt
//! - Normalize: rename, region filter, decimal extraction
//! - Pipeline: extract / transform / load orchestration

pub mod normalize;
pub mod pipeline;
pub mod reshape;

pub use normalize::{extract_decimal, normalize, NormalizeStats};
pub use pipeline::*;
pub use reshape::{parse_key_header, reshape};
