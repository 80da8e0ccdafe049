//! Layer-stack container.
//!
//! `registry` decides which protocol a run of bytes belongs to, `layer` wraps
//! the closed set of typed layers behind one enum, and `arena` holds the
//! decoded sequence as index-linked records over a borrowed buffer.
//!
//! Decoding is a single left-to-right pass: sniff the bytes at the start
//! offset, build that layer, ask it to delegate its remainder, repeat.

pub mod arena;
pub mod layer;
pub mod registry;

pub use arena::{LayerRecord, LayerStack};
pub use layer::Layer;
pub use registry::{Candidate, Registry, TransportHint};
