pub mod language;
pub mod similarity;
pub mod source_key;

pub use language::Language;
pub use similarity::{DimensionMismatch, cosine_similarity, l2_normalize, l2_norm};
pub use source_key::{SourceKey, SourceKind};
