//! Marshalling of value trees into SDT text.
//!
//! Output is deterministic: maps are written in key order and records in
//! the key order of their map class.

use crate::codec::primitives::Writer;
use crate::limits::{
    CONTEXT_MARKER, LIST_MARKER, MAP_CLASS_MAP_KEY, MAP_MARKER, MC_INSTANCE_MARKER, NONE_MARKER,
    SCALAR_MARKER,
};
use crate::model::{MapClassDefinition, MapClassRegistry, MarshallingContext, Value, ValueMap};

/// Marshalls a value, resolving records against the classes of `context`.
///
/// Records whose class is not defined in `context` are written as plain maps
/// carrying a `staf-map-class-name` entry.
///
/// Values are written in full at any depth, but [`unmarshall`] leaves
/// containers nested deeper than [`MAX_NESTING_DEPTH`] as literal text. Such
/// values only round-trip when read back with
/// [`UnmarshallOptions::with_max_depth`] set high enough.
///
/// [`unmarshall`]: crate::unmarshall
/// [`MAX_NESTING_DEPTH`]: crate::limits::MAX_NESTING_DEPTH
/// [`UnmarshallOptions::with_max_depth`]: crate::UnmarshallOptions::with_max_depth
pub fn marshall(value: &Value, context: Option<&MarshallingContext>) -> String {
    let empty = MapClassRegistry::new();
    let classes = context.map_or(&empty, MarshallingContext::registry);

    let mut writer = Writer::new();
    write_value(&mut writer, value, classes);
    writer.into_string()
}

/// Marshalls a context: its map class map followed by its root.
///
/// A context without classes is written as its root alone.
pub fn marshall_context(context: &MarshallingContext) -> String {
    let mut writer = Writer::new();
    write_context(&mut writer, context, context.registry());
    writer.into_string()
}

fn write_value(w: &mut Writer, value: &Value, classes: &MapClassRegistry) {
    match value {
        Value::None => w.write_ascii(NONE_MARKER),
        Value::Scalar(s) => write_scalar(w, s),
        Value::List(items) => write_list(w, items, classes),
        Value::Map(map) => match map_class_of(map, classes) {
            Some(class) => write_record(w, class, |key| map.get(key), classes),
            None => write_map(w, map.iter(), classes),
        },
        Value::Record(record) => match classes.get(&record.class_name) {
            Ok(class) => write_record(w, class, |key| record.fields.get(key), classes),
            Err(_) => write_map(w, record.to_map().iter(), classes),
        },
        Value::Context(context) => write_context(w, context, classes),
    }
}

/// Returns the class of a plain map that names a defined class under
/// `staf-map-class-name`.
fn map_class_of<'c>(
    map: &ValueMap,
    classes: &'c MapClassRegistry,
) -> Option<&'c MapClassDefinition> {
    if classes.is_empty() {
        return None;
    }
    let name = Value::map_class_name_of(map)?;
    classes.get(name).ok()
}

fn write_scalar(w: &mut Writer, s: &str) {
    // @SDT/$S:<len>:<text>
    w.write_ascii(SCALAR_MARKER);
    w.write_ascii("S:");
    w.write_length_prefixed(s);
}

fn write_list(w: &mut Writer, items: &[Value], classes: &MapClassRegistry) {
    // @SDT/[<count>:<len>:<items>
    let mut body = Writer::new();
    for item in items {
        write_value(&mut body, item, classes);
    }

    w.write_ascii(LIST_MARKER);
    w.write_number(items.len());
    w.write_ascii(":");
    w.write_number(body.char_len());
    w.write_ascii(":");
    w.append(body);
}

fn write_map<'v>(
    w: &mut Writer,
    entries: impl Iterator<Item = (&'v String, &'v Value)>,
    classes: &MapClassRegistry,
) {
    // @SDT/{:<len>: then :<key len>:<key><value> per entry
    let mut body = Writer::new();
    for (key, value) in entries {
        body.write_ascii(":");
        body.write_length_prefixed(key);
        write_value(&mut body, value, classes);
    }

    w.write_ascii(MAP_MARKER);
    w.write_ascii(":");
    w.write_number(body.char_len());
    w.write_ascii(":");
    w.append(body);
}

fn write_record<'v>(
    w: &mut Writer,
    class: &MapClassDefinition,
    field: impl Fn(&str) -> Option<&'v Value>,
    classes: &MapClassRegistry,
) {
    // @SDT/%:<len>::<name len>:<name> then one value per class key
    let mut body = Writer::new();
    body.write_ascii(":");
    body.write_length_prefixed(class.name());
    for key in class.keys() {
        write_value(&mut body, field(&key.key).unwrap_or(&Value::None), classes);
    }

    w.write_ascii(MC_INSTANCE_MARKER);
    w.write_ascii(":");
    w.write_number(body.char_len());
    w.write_ascii(":");
    w.append(body);
}

fn write_context(w: &mut Writer, context: &MarshallingContext, outer: &MapClassRegistry) {
    let classes = context.registry();
    if classes.is_empty() {
        write_value(w, context.root(), outer);
        return;
    }

    // @SDT/*:<len>:<map class map><root>
    let mut table = ValueMap::new();
    table.insert(MAP_CLASS_MAP_KEY.to_string(), classes.to_value());

    let mut body = Writer::new();
    write_map(&mut body, table.iter(), &MapClassRegistry::new());
    write_value(&mut body, context.root(), classes);

    w.write_ascii(CONTEXT_MARKER);
    w.write_ascii(":");
    w.write_number(body.char_len());
    w.write_ascii(":");
    w.append(body);
}
