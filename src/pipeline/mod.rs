//! Batch orchestrators.
//!
//! One run per process: merge several avatar files onto one skeleton, or
//! convert one file to VRM. Both take the scene by `&mut`, reset it first,
//! and fail loudly — there is no partial-output mode and no retry.

pub mod convert;
pub mod merge;

pub use convert::{ConvertReport, convert_file};
pub use merge::{MergeReport, merge_files};
