//! The value tree carried by marshalled data.
//!
//! Values are a closed set: absence, opaque strings, ordered lists, maps,
//! map class instances and nested marshalling contexts.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::limits::MAP_CLASS_NAME_KEY;
use crate::model::MarshallingContext;

/// A map from string keys to values.
///
/// Iteration is in key order, which is also the order the marshaller emits
/// map entries in.
pub type ValueMap = BTreeMap<String, Value>;

/// A marshallable value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Value {
    /// Absence of a value.
    #[default]
    None,

    /// Opaque string leaf.
    Scalar(String),

    /// Ordered sequence; order survives a round trip exactly.
    List(Vec<Value>),

    /// String-keyed map.
    Map(ValueMap),

    /// Map tagged with the name of its map class.
    Record(Record),

    /// Nested context carrying its own map class definitions.
    Context(Box<MarshallingContext>),
}

impl Value {
    /// Creates a scalar value.
    pub fn scalar(text: impl Into<String>) -> Self {
        Value::Scalar(text.into())
    }

    /// Creates an empty list.
    pub fn list() -> Self {
        Value::List(Vec::new())
    }

    /// Creates an empty map.
    pub fn map() -> Self {
        Value::Map(ValueMap::new())
    }

    /// Returns true for [`Value::None`].
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns the scalar text, if this is a scalar.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the record, if this is a map class instance.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Returns the nested context, if this is one.
    pub fn as_context(&self) -> Option<&MarshallingContext> {
        match self {
            Value::Context(context) => Some(context),
            _ => None,
        }
    }

    /// Views this value as a generic map.
    ///
    /// Plain maps are borrowed. Records are rendered with the synthetic
    /// `staf-map-class-name` key holding their class name, which is how
    /// consumers that treat every record as a map probe for the class.
    pub fn as_map(&self) -> Option<Cow<'_, ValueMap>> {
        match self {
            Value::Map(map) => Some(Cow::Borrowed(map)),
            Value::Record(record) => Some(Cow::Owned(record.to_map())),
            _ => None,
        }
    }

    /// Looks up a key in a map or a field in a record.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            Value::Record(record) => record.fields.get(key),
            _ => None,
        }
    }

    /// Returns the map class name carried by a record, or by a map holding
    /// a scalar `staf-map-class-name` entry.
    pub fn map_class_name(&self) -> Option<&str> {
        match self {
            Value::Record(record) => Some(&record.class_name),
            Value::Map(map) => Self::map_class_name_of(map),
            _ => None,
        }
    }

    pub(crate) fn map_class_name_of(map: &ValueMap) -> Option<&str> {
        map.get(MAP_CLASS_NAME_KEY).and_then(Value::as_scalar)
    }

    /// Returns the size of the value.
    ///
    /// Scalars report their character count, containers their entry count
    /// (a record counts its class name key), and contexts the number of map
    /// classes they define.
    pub fn len(&self) -> usize {
        match self {
            Value::None => 0,
            Value::Scalar(s) => s.chars().count(),
            Value::List(items) => items.len(),
            Value::Map(map) => map.len(),
            Value::Record(record) => record.fields.len() + 1,
            Value::Context(context) => context.registry().len(),
        }
    }

    /// Returns true if [`Value::len`] is zero.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One-line description of the value.
    pub fn summary(&self) -> String {
        match self {
            Value::None => "<None>".to_string(),
            Value::Scalar(s) => s.clone(),
            Value::List(items) => format!("<List>[{}]", items.len()),
            Value::Map(_) | Value::Record(_) => match self.map_class_name() {
                Some(class) => format!("<Map:{}>[{}]", class, self.len()),
                None => format!("<Map>[{}]", self.len()),
            },
            Value::Context(context) => {
                format!("<MarshallingContext>[{}]", context.registry().len())
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::format_value(self, None))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::Map(map)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl From<MarshallingContext> for Value {
    fn from(context: MarshallingContext) -> Self {
        Value::Context(Box::new(context))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::None, Into::into)
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::List(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Map(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// An instance of a map class: a map whose key set is described by a
/// [`MapClassDefinition`](crate::model::MapClassDefinition).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Name of the map class this instance belongs to.
    pub class_name: String,
    /// Field values keyed by the map class keys.
    pub fields: ValueMap,
}

impl Record {
    /// Creates an instance of the named class with no fields set.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fields: ValueMap::new(),
        }
    }

    /// Sets a field, returning the record for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    /// Returns a field value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns the fields plus the `staf-map-class-name` key.
    pub fn to_map(&self) -> ValueMap {
        let mut map = self.fields.clone();
        map.insert(
            MAP_CLASS_NAME_KEY.to_string(),
            Value::Scalar(self.class_name.clone()),
        );
        map
    }

    /// Consumes the record into a plain map carrying `staf-map-class-name`.
    pub fn into_map(self) -> ValueMap {
        let mut map = self.fields;
        map.insert(MAP_CLASS_NAME_KEY.to_string(), Value::Scalar(self.class_name));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_as_map_exposes_class_name() {
        let record = Record::new("Person").with("name", "Al").with("age", "30");
        let value = Value::Record(record);

        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map[MAP_CLASS_NAME_KEY], Value::scalar("Person"));
        assert_eq!(map["name"], Value::scalar("Al"));
        assert_eq!(value.map_class_name(), Some("Person"));
    }

    #[test]
    fn test_plain_map_class_name_probe() {
        let map: Value = [(MAP_CLASS_NAME_KEY, Value::scalar("X")), ("a", Value::None)]
            .into_iter()
            .collect();
        assert_eq!(map.map_class_name(), Some("X"));
        assert_eq!(Value::map().map_class_name(), None);
    }

    #[test]
    fn test_summary() {
        assert_eq!(Value::None.summary(), "<None>");
        assert_eq!(Value::scalar("abc").summary(), "abc");
        assert_eq!(
            Value::List(vec![Value::None, Value::None]).summary(),
            "<List>[2]"
        );
        assert_eq!(Value::map().summary(), "<Map>[0]");
        assert_eq!(
            Value::Record(Record::new("C").with("k", "v")).summary(),
            "<Map:C>[2]"
        );
        assert_eq!(
            Value::from(MarshallingContext::new()).summary(),
            "<MarshallingContext>[0]"
        );
    }

    #[test]
    fn test_scalar_len_counts_characters() {
        assert_eq!(Value::scalar("h\u{e9}llo").len(), 5);
        assert!(Value::scalar("").is_empty());
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(Value::from(None::<&str>), Value::None);
        assert_eq!(Value::from(Some("x")), Value::scalar("x"));
    }
}
