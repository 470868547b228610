//! Core data models
//!
//! Identity, relationship and kind types shared by the store, the traversal
//! engine and the graph assembler.

pub mod convert;
pub mod edge;
pub mod kinds;
pub mod labels;
pub mod object_key;

pub use convert::{ConversionError, parse_object, to_dynamic};
pub use edge::{Edge, EdgeKind};
pub use kinds::KnownKind;
pub use labels::selector_matches;
pub use object_key::{GroupVersionKind, ObjectKey};
