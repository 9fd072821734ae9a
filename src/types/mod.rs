//! Helper traits over core marking types.

mod ext;

pub use ext::MarkingSliceExt;
