//! Text encoding/decoding for SDT marshalled data.
//!
//! Every production starts with `@SDT/` followed by a one character type
//! marker: `$` scalar (or `$0` for None), `[` list, `{` map, `%` map class
//! instance, `*` context.

pub mod marshall;
pub mod primitives;
pub mod unmarshall;

pub use marshall::{marshall, marshall_context};
pub use primitives::{Reader, Writer};
pub use unmarshall::{
    is_marshalled_data, unmarshall, unmarshall_with_options, UnmarshallOptions,
    IGNORE_INDIRECT_OBJECTS, UNMARSHALLING_DEFAULTS,
};
