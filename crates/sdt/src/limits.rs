//! Wire markers and decoding limits.

/// Prefix shared by every marshalled production.
pub const MARSHALLED_DATA_MARKER: &str = "@SDT/";

/// Complete encoding of the None value.
pub const NONE_MARKER: &str = "@SDT/$0:0:";

pub const SCALAR_MARKER: &str = "@SDT/$";
pub const LIST_MARKER: &str = "@SDT/[";
pub const MAP_MARKER: &str = "@SDT/{";
pub const MC_INSTANCE_MARKER: &str = "@SDT/%";
pub const CONTEXT_MARKER: &str = "@SDT/*";

/// Key under which a map carries the name of its map class.
pub const MAP_CLASS_NAME_KEY: &str = "staf-map-class-name";

/// Key of the map class table inside a marshalled context.
pub const MAP_CLASS_MAP_KEY: &str = "map-class-map";

/// Keys of a marshalled map class definition.
pub const DEFINITION_NAME_KEY: &str = "name";
pub const DEFINITION_KEYS_KEY: &str = "keys";
pub const KEY_NAME_KEY: &str = "key";
pub const DISPLAY_NAME_KEY: &str = "display-name";

/// Maximum nesting of containers and indirect objects accepted while
/// unmarshalling. Deeper nodes fall back to literal scalars.
pub const MAX_NESTING_DEPTH: usize = 256;
