//! Unmarshalling of SDT text into value trees.
//!
//! Unmarshalling never fails. Each production is decoded as an independent
//! node; a node that is malformed comes back as a scalar holding its own
//! text, and its parent carries on. Input that is not marshalled data at all
//! comes back as a single scalar.

use tracing::{debug, trace};

use crate::codec::primitives::Reader;
use crate::error::DecodeError;
use crate::limits::{
    CONTEXT_MARKER, LIST_MARKER, MAP_MARKER, MARSHALLED_DATA_MARKER, MAX_NESTING_DEPTH,
    MC_INSTANCE_MARKER, NONE_MARKER, SCALAR_MARKER,
};
use crate::model::{MapClassRegistry, MarshallingContext, Record, Value, ValueMap};

/// Smallest possible production, `@SDT/$0:0:`.
const MIN_OBJECT_CHARS: usize = NONE_MARKER.len();

/// Options for unmarshalling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnmarshallOptions {
    /// Leave scalars that hold marshalled data as plain scalars instead of
    /// decoding them in place.
    pub ignore_indirect_objects: bool,
    /// Deepest nesting of containers and indirect objects that is decoded.
    pub max_depth: usize,
}

impl Default for UnmarshallOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl UnmarshallOptions {
    /// Default options: indirect objects are decoded.
    pub const fn new() -> Self {
        Self {
            ignore_indirect_objects: false,
            max_depth: MAX_NESTING_DEPTH,
        }
    }

    /// Options that keep indirect objects as scalars.
    pub const fn ignore_indirect_objects() -> Self {
        Self {
            ignore_indirect_objects: true,
            max_depth: MAX_NESTING_DEPTH,
        }
    }

    /// Sets the nesting limit.
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Default unmarshalling options.
pub const UNMARSHALLING_DEFAULTS: UnmarshallOptions = UnmarshallOptions::new();

/// Options that disable decoding of indirect objects.
pub const IGNORE_INDIRECT_OBJECTS: UnmarshallOptions =
    UnmarshallOptions::ignore_indirect_objects();

/// Returns true if `data` starts with the marshalled data marker.
pub fn is_marshalled_data(data: &str) -> bool {
    data.starts_with(MARSHALLED_DATA_MARKER)
}

/// Unmarshalls `data` with default options.
pub fn unmarshall(data: &str) -> MarshallingContext {
    unmarshall_with_options(data, None, UNMARSHALLING_DEFAULTS)
}

/// Unmarshalls `data`.
///
/// Records that are not inside a marshalled context are resolved against
/// the classes of `context`. The context itself is never modified; the
/// result is always a new context.
pub fn unmarshall_with_options(
    data: &str,
    context: Option<&MarshallingContext>,
    options: UnmarshallOptions,
) -> MarshallingContext {
    let empty = MapClassRegistry::new();
    let classes = context.map_or(&empty, MarshallingContext::registry);
    Decoder { options }.node(data, classes, 0)
}

struct Decoder {
    options: UnmarshallOptions,
}

impl Decoder {
    /// Decodes one production, falling back to a scalar of its text.
    fn node(&self, data: &str, classes: &MapClassRegistry, depth: usize) -> MarshallingContext {
        match self.try_node(data, classes, depth) {
            Ok(context) => context,
            Err(err) => {
                debug!(
                    error = %err,
                    len = data.len(),
                    "keeping malformed marshalled data as a scalar"
                );
                MarshallingContext::with_root(data)
            }
        }
    }

    /// Decodes a child production into the value its parent stores.
    fn child(&self, data: &str, classes: &MapClassRegistry, depth: usize) -> Value {
        self.node(data, classes, depth + 1).into_primary_object()
    }

    fn try_node(
        &self,
        data: &str,
        classes: &MapClassRegistry,
        depth: usize,
    ) -> Result<MarshallingContext, DecodeError> {
        if depth > self.options.max_depth {
            return Err(DecodeError::NestingTooDeep {
                max: self.options.max_depth,
            });
        }

        if data.starts_with(NONE_MARKER) {
            Ok(MarshallingContext::new())
        } else if data.starts_with(SCALAR_MARKER) {
            self.scalar(data, classes, depth)
        } else if data.starts_with(LIST_MARKER) {
            self.list(data, classes, depth).map(MarshallingContext::with_root)
        } else if data.starts_with(MAP_MARKER) {
            self.map(data, classes, depth).map(MarshallingContext::with_root)
        } else if data.starts_with(MC_INSTANCE_MARKER) {
            self.record(data, classes, depth).map(MarshallingContext::with_root)
        } else if data.starts_with(CONTEXT_MARKER) {
            self.context(data, depth)
        } else {
            // Plain text, or a marker of a type this decoder does not know.
            Ok(MarshallingContext::with_root(data))
        }
    }

    fn scalar(
        &self,
        data: &str,
        classes: &MapClassRegistry,
        depth: usize,
    ) -> Result<MarshallingContext, DecodeError> {
        // @SDT/$S:<len>:<text>
        let mut reader = Reader::after_marker(data, SCALAR_MARKER);
        reader.read_field("scalar type")?;
        let len = reader.read_length("scalar length")?;
        reader.expect_remaining(len, "scalar")?;
        let text = reader.remaining();

        if is_marshalled_data(text) && !self.options.ignore_indirect_objects {
            trace!(len = text.len(), "decoding indirect object");
            return Ok(self.node(text, classes, depth + 1));
        }
        Ok(MarshallingContext::with_root(text))
    }

    fn list(
        &self,
        data: &str,
        classes: &MapClassRegistry,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        // @SDT/[<count>:<len>:<items>
        let mut reader = Reader::after_marker(data, LIST_MARKER);
        let count = reader.read_length("list count")?;
        let len = reader.read_length("list length")?;
        reader.expect_remaining(len, "list")?;

        let mut items = Vec::with_capacity(count.min(len / MIN_OBJECT_CHARS));
        for _ in 0..count {
            let item = reader.read_object("list item")?;
            items.push(self.child(item, classes, depth));
        }
        Ok(Value::List(items))
    }

    fn map(
        &self,
        data: &str,
        classes: &MapClassRegistry,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        // @SDT/{:<len>: then :<key len>:<key><value> per entry
        let mut reader = Reader::after_marker(data, MAP_MARKER);
        reader.read_field("map header")?;
        let len = reader.read_length("map length")?;
        reader.expect_remaining(len, "map")?;

        let mut map = ValueMap::new();
        while !reader.is_empty() {
            let key = reader.read_string("map key")?;
            let value = reader.read_object("map value")?;
            map.insert(key.to_string(), self.child(value, classes, depth));
        }
        Ok(Value::Map(map))
    }

    fn record(
        &self,
        data: &str,
        classes: &MapClassRegistry,
        depth: usize,
    ) -> Result<Value, DecodeError> {
        // @SDT/%:<len>::<name len>:<name> then one value per class key
        let mut reader = Reader::after_marker(data, MC_INSTANCE_MARKER);
        reader.read_field("record header")?;
        let len = reader.read_length("record length")?;
        reader.expect_remaining(len, "record")?;
        let name = reader.read_string("map class name")?;

        let class = classes.get(name).map_err(|_| DecodeError::UnknownMapClass {
            name: name.to_string(),
        })?;

        let mut record = Record::new(name);
        let mut keys = class.keys().iter();
        while !reader.is_empty() {
            let key = keys.next().ok_or_else(|| DecodeError::TooManyFields {
                name: name.to_string(),
                keys: class.keys().len(),
            })?;
            let value = reader.read_object("record value")?;
            record
                .fields
                .insert(key.key.clone(), self.child(value, classes, depth));
        }
        Ok(Value::Record(record))
    }

    fn context(&self, data: &str, depth: usize) -> Result<MarshallingContext, DecodeError> {
        // @SDT/*:<len>:<map class map><root>
        let mut reader = Reader::after_marker(data, CONTEXT_MARKER);
        reader.read_field("context header")?;
        let len = reader.read_length("context length")?;
        reader.expect_remaining(len, "context")?;

        let table = reader.read_object("map class map")?;
        let table = self.child(table, &MapClassRegistry::new(), depth);
        let classes = MapClassRegistry::from_table(&table)?;

        let root = reader.read_object("context root")?;
        let root = self.child(root, &classes, depth);
        Ok(MarshallingContext::from_parts(classes, root))
    }
}
