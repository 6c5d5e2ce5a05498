//! Storage primitives the document is built from.

mod buffer;
mod handle;
mod rows;

pub use buffer::Buffer;
pub(crate) use handle::define_handle;
pub use handle::SafeIndex;
pub use rows::{RowArena, RowParts};
