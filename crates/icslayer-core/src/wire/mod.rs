//! Wire-level field access.
//!
//! A protocol header is described by a table of typed field descriptors
//! (`field`), and read or written through a borrowing overlay (`view`).
//! All multi-byte integers on the wire are big-endian; values handed out by
//! the view are host integers.
//!
//! The view performs no length check of its own. Layers validate the buffer
//! length once, at construction, against their fixed header length; every
//! field offset in a layout table lies inside that header.

pub mod field;
pub mod view;

pub use field::{FieldDescriptor, WireField, WireInt};
pub use view::HeaderView;
