//! SDT: self-describing marshalling for nested string data.
//!
//! This crate provides marshalling, unmarshalling, pretty printing and
//! validation for the `@SDT/` text format. The format carries scalars,
//! lists, maps and map class instances in a single length-prefixed string,
//! and can reconstruct marshalled data nested inside scalars.
//!
//! # Overview
//!
//! - **Self-delimiting**: every production declares its length in characters
//! - **Map classes**: records of a common shape travel as a class name plus
//!   values, with the key list sent once in the context header
//! - **Fail-soft**: malformed data is returned as the literal string
//!
//! # Quick Start
//!
//! ```rust
//! use sdt::{marshall, unmarshall, MapClassDefinition, MarshallingContext, Record, Value};
//!
//! let mut context = MarshallingContext::new();
//! context.set_map_class_definition(
//!     MapClassDefinition::new("Person")
//!         .with_display_key("name", "Name")
//!         .with_display_key("age", "Age"),
//! );
//! context.set_root(Value::List(vec![
//!     Record::new("Person").with("name", "Al").with("age", "30").into(),
//! ]));
//!
//! // Marshall the classes and the root together
//! let data = context.marshall();
//! assert!(data.starts_with("@SDT/*:"));
//!
//! // Unmarshall restores both
//! let decoded = unmarshall(&data);
//! assert!(decoded.has_map_class_definition("Person"));
//! assert_eq!(decoded.to_string(), "[\n  {\n    Name: Al\n    Age : 30\n  }\n]");
//!
//! // Plain values need no context
//! let data = marshall(&Value::scalar("a:b:c"), None);
//! assert_eq!(data, "@SDT/$S:5:a:b:c");
//! ```
//!
//! # Modules
//!
//! - [`model`]: Core data types (Value, Record, MapClassDefinition, MarshallingContext)
//! - [`codec`]: Text marshalling and unmarshalling
//! - [`format`]: Indented human readable rendering
//! - [`validate`]: Record checks against map classes
//! - [`error`]: Error types
//! - [`limits`]: Wire markers and decoding limits
//!
//! # Untrusted input
//!
//! Unmarshalling never panics or fails on arbitrary text. Lengths are
//! checked against the data actually present, list preallocation is bounded
//! by the input size, and nesting beyond [`limits::MAX_NESTING_DEPTH`] is
//! left undecoded.

pub mod codec;
pub mod error;
pub mod format;
pub mod limits;
pub mod model;
pub mod validate;

// Re-export commonly used types at crate root
pub use codec::{
    is_marshalled_data, marshall, marshall_context, unmarshall, unmarshall_with_options,
    UnmarshallOptions, IGNORE_INDIRECT_OBJECTS, UNMARSHALLING_DEFAULTS,
};
pub use error::{DecodeError, MapClassError, ValidationError};
pub use format::{format_value, format_value_with_options, FormatOptions, NONE_STRING};
pub use model::{
    MapClassDefinition, MapClassKey, MapClassRegistry, MarshallingContext, Record, Value, ValueMap,
};
pub use validate::{require_map_class, validate_value};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
