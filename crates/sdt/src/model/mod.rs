//! Data model types for SDT marshalling.
//!
//! This module contains the value tree and the map class machinery:
//! - Values (scalars, lists, maps, records, nested contexts)
//! - Map class definitions and their registry
//! - The marshalling context tying a registry to a root value

pub mod context;
pub mod map_class;
pub mod value;

pub use context::MarshallingContext;
pub use map_class::{MapClassDefinition, MapClassKey, MapClassRegistry};
pub use value::{Record, Value, ValueMap};
