//! Buffer-level algorithms for virtualized notes.
//!
//! Everything in this crate is a pure query over an immutable buffer slice:
//! - [`line_index`] maps absolute byte offsets to logical line numbers and back.
//! - [`chunk`] slices the buffer into bounded, tag-safe chunks for incremental
//!   loading into the editing surface.
//! - [`search`] builds query patterns and runs counting and directional scans.
//!
//! Per-document state (what is materialized, what is deferred, what is still
//! loading) lives in the `note-state` crate on top of these.

pub mod chunk;
pub mod line_index;
pub mod search;
