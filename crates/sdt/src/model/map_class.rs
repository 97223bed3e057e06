//! Map class definitions and the registry that holds them.
//!
//! A map class names an ordered list of keys. Instances of the class are
//! marshalled as the class name followed by their values in key order, so
//! the keys themselves only travel once, inside the context's map class map.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{DecodeError, MapClassError};
use crate::limits::{
    DEFINITION_KEYS_KEY, DEFINITION_NAME_KEY, DISPLAY_NAME_KEY, KEY_NAME_KEY, MAP_CLASS_MAP_KEY,
};
use crate::model::{Record, Value, ValueMap};

/// One key of a map class definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapClassKey {
    /// Key name used in instances.
    pub key: String,
    /// Label used when formatting instances; the key name when absent.
    pub display_name: Option<String>,
    /// Extra display properties such as `display-short-name`.
    pub properties: BTreeMap<String, String>,
}

impl MapClassKey {
    /// Creates a key without a display name.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: None,
            properties: BTreeMap::new(),
        }
    }

    /// Returns the display name, falling back to the key name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.key)
    }

    fn to_value(&self) -> Value {
        let mut map: ValueMap = self
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), Value::Scalar(v.clone())))
            .collect();
        map.insert(KEY_NAME_KEY.to_string(), Value::Scalar(self.key.clone()));
        if let Some(display_name) = &self.display_name {
            map.insert(
                DISPLAY_NAME_KEY.to_string(),
                Value::Scalar(display_name.clone()),
            );
        }
        Value::Map(map)
    }

    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        let Value::Map(map) = value else {
            return Err(DecodeError::MalformedMapClassMap {
                reason: "key entry is not a map",
            });
        };

        let mut key = None;
        let mut display_name = None;
        let mut properties = BTreeMap::new();

        for (name, entry) in map {
            let text = entry.as_scalar().ok_or(DecodeError::MalformedMapClassMap {
                reason: "key property is not a scalar",
            })?;
            match name.as_str() {
                KEY_NAME_KEY => key = Some(text.to_string()),
                DISPLAY_NAME_KEY => display_name = Some(text.to_string()),
                _ => {
                    properties.insert(name.clone(), text.to_string());
                }
            }
        }

        let key = key.ok_or(DecodeError::MalformedMapClassMap {
            reason: "key entry has no key name",
        })?;

        Ok(Self {
            key,
            display_name,
            properties,
        })
    }
}

/// Named, ordered list of keys describing a family of records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapClassDefinition {
    name: String,
    keys: Vec<MapClassKey>,
}

impl MapClassDefinition {
    /// Creates a definition with no keys.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: Vec::new(),
        }
    }

    /// Returns the class name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the keys in wire and display order.
    pub fn keys(&self) -> &[MapClassKey] {
        &self.keys
    }

    /// Returns the key with the given name.
    pub fn key(&self, key: &str) -> Option<&MapClassKey> {
        self.keys.iter().find(|k| k.key == key)
    }

    /// Appends a key.
    pub fn add_key(&mut self, key: impl Into<String>) {
        self.keys.push(MapClassKey::new(key));
    }

    /// Appends a key with a display name.
    pub fn add_key_with_display_name(
        &mut self,
        key: impl Into<String>,
        display_name: impl Into<String>,
    ) {
        let mut entry = MapClassKey::new(key);
        entry.display_name = Some(display_name.into());
        self.keys.push(entry);
    }

    /// Appends a key, returning the definition for chaining.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.add_key(key);
        self
    }

    /// Appends a key with a display name, returning the definition for chaining.
    pub fn with_display_key(
        mut self,
        key: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        self.add_key_with_display_name(key, display_name);
        self
    }

    /// Sets a property on every key with the given name.
    ///
    /// `key` renames the key and `display-name` updates its display name.
    /// Any other property is stored as-is and travels with the definition.
    pub fn set_key_property(
        &mut self,
        key: &str,
        property: impl Into<String>,
        value: impl Into<String>,
    ) {
        let property = property.into();
        let value = value.into();

        for entry in self.keys.iter_mut().filter(|k| k.key == key) {
            if property == KEY_NAME_KEY {
                entry.key = value.clone();
            } else if property == DISPLAY_NAME_KEY {
                entry.display_name = Some(value.clone());
            } else {
                entry.properties.insert(property.clone(), value.clone());
            }
        }
    }

    /// Creates an instance of this class with no fields set.
    pub fn create_instance(&self) -> Record {
        Record::new(self.name.clone())
    }

    /// Renders the definition in its wire shape:
    /// `{ "keys": [ { "key": .., "display-name": .. }, .. ], "name": .. }`.
    pub fn to_value(&self) -> Value {
        let mut map = ValueMap::new();
        map.insert(
            DEFINITION_KEYS_KEY.to_string(),
            Value::List(self.keys.iter().map(MapClassKey::to_value).collect()),
        );
        map.insert(
            DEFINITION_NAME_KEY.to_string(),
            Value::Scalar(self.name.clone()),
        );
        Value::Map(map)
    }

    /// Parses a definition from its wire shape.
    ///
    /// The definition is named after the map class map entry it was found
    /// under, since that is the name instances refer to.
    pub(crate) fn from_value(name: &str, value: &Value) -> Result<Self, DecodeError> {
        let Value::Map(map) = value else {
            return Err(DecodeError::MalformedMapClassMap {
                reason: "definition is not a map",
            });
        };

        let keys = match map.get(DEFINITION_KEYS_KEY) {
            Some(Value::List(items)) => items
                .iter()
                .map(MapClassKey::from_value)
                .collect::<Result<Vec<_>, _>>()?,
            Some(Value::None) | None => Vec::new(),
            Some(_) => {
                return Err(DecodeError::MalformedMapClassMap {
                    reason: "definition keys are not a list",
                });
            }
        };

        Ok(Self {
            name: name.to_string(),
            keys,
        })
    }
}

/// Map class definitions keyed by class name.
///
/// Cloning is cheap and copy-on-write: a clone taken before a marshall call
/// never observes definitions added to its source afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapClassRegistry {
    classes: Arc<BTreeMap<String, MapClassDefinition>>,
}

impl MapClassRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a definition under its name, replacing any previous one.
    pub fn define(&mut self, definition: MapClassDefinition) {
        Arc::make_mut(&mut self.classes).insert(definition.name.clone(), definition);
    }

    /// Returns the definition for a class name.
    pub fn get(&self, name: &str) -> Result<&MapClassDefinition, MapClassError> {
        self.classes
            .get(name)
            .ok_or_else(|| MapClassError::DoesNotExist {
                name: name.to_string(),
            })
    }

    /// Returns true if the class is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// Returns the defined class names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    /// Returns the definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = &MapClassDefinition> {
        self.classes.values()
    }

    /// Returns the number of definitions.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if no class is defined.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Renders the registry as the `map-class-map` entry value: class name
    /// to definition.
    pub fn to_value(&self) -> Value {
        Value::Map(
            self.classes
                .iter()
                .map(|(name, def)| (name.clone(), def.to_value()))
                .collect(),
        )
    }

    /// Parses the `{ "map-class-map": { .. } }` table that opens a
    /// marshalled context.
    pub(crate) fn from_table(table: &Value) -> Result<Self, DecodeError> {
        let Value::Map(table) = table else {
            return Err(DecodeError::MalformedMapClassMap {
                reason: "context table is not a map",
            });
        };

        let classes = match table.get(MAP_CLASS_MAP_KEY) {
            Some(Value::Map(classes)) => classes,
            Some(_) => {
                return Err(DecodeError::MalformedMapClassMap {
                    reason: "map class map is not a map",
                });
            }
            None => {
                return Err(DecodeError::MalformedMapClassMap {
                    reason: "context table has no map class map",
                });
            }
        };

        let mut registry = BTreeMap::new();
        for (name, definition) in classes {
            registry.insert(
                name.clone(),
                MapClassDefinition::from_value(name, definition)?,
            );
        }

        Ok(Self {
            classes: Arc::new(registry),
        })
    }
}

impl<'a> IntoIterator for &'a MapClassRegistry {
    type Item = &'a MapClassDefinition;
    type IntoIter = std::collections::btree_map::Values<'a, String, MapClassDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.classes.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> MapClassDefinition {
        MapClassDefinition::new("Person")
            .with_display_key("name", "Name")
            .with_key("age")
    }

    #[test]
    fn test_definition_wire_shape() {
        let value = person().to_value();
        let map = value.as_map().unwrap();

        assert_eq!(map[DEFINITION_NAME_KEY], Value::scalar("Person"));
        let keys = map[DEFINITION_KEYS_KEY].as_list().unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].get(KEY_NAME_KEY), Some(&Value::scalar("name")));
        assert_eq!(keys[0].get(DISPLAY_NAME_KEY), Some(&Value::scalar("Name")));
        assert_eq!(keys[1].get(DISPLAY_NAME_KEY), None);
    }

    #[test]
    fn test_definition_from_value_keeps_order_and_properties() {
        let mut def = person();
        def.set_key_property("age", "display-short-name", "Ag");

        let parsed = MapClassDefinition::from_value("Person", &def.to_value()).unwrap();
        assert_eq!(parsed, def);
        assert_eq!(parsed.keys()[0].label(), "Name");
        assert_eq!(parsed.keys()[1].label(), "age");
        assert_eq!(
            parsed.key("age").unwrap().properties.get("display-short-name"),
            Some(&"Ag".to_string())
        );
    }

    #[test]
    fn test_set_key_property_display_name() {
        let mut def = person();
        def.set_key_property("age", DISPLAY_NAME_KEY, "Age");
        assert_eq!(def.key("age").unwrap().display_name.as_deref(), Some("Age"));
        assert!(def.key("age").unwrap().properties.is_empty());
    }

    #[test]
    fn test_set_key_property_key_renames() {
        let mut def = person();
        def.set_key_property("age", KEY_NAME_KEY, "years");

        assert!(def.key("age").is_none());
        let renamed = def.key("years").unwrap();
        assert!(renamed.properties.is_empty());
        assert_eq!(def.keys()[1].key, "years");

        let parsed = MapClassDefinition::from_value("Person", &def.to_value()).unwrap();
        assert_eq!(parsed, def);
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = MapClassRegistry::new();
        assert!(registry.is_empty());
        registry.define(person());

        assert!(registry.contains("Person"));
        assert_eq!(registry.get("Person").unwrap().keys().len(), 2);
        assert_eq!(
            registry.get("Nobody"),
            Err(MapClassError::DoesNotExist {
                name: "Nobody".to_string()
            })
        );
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Person"]);
    }

    #[test]
    fn test_registry_is_copy_on_write() {
        let mut registry = MapClassRegistry::new();
        registry.define(person());
        let snapshot = registry.clone();

        registry.define(MapClassDefinition::new("Other"));

        assert_eq!(registry.len(), 2);
        assert_eq!(snapshot.len(), 1);
        assert!(!snapshot.contains("Other"));
    }

    #[test]
    fn test_registry_from_table_rejects_bad_shapes() {
        assert!(MapClassRegistry::from_table(&Value::scalar("x")).is_err());
        assert!(MapClassRegistry::from_table(&Value::map()).is_err());

        let definition: Value = [(DEFINITION_KEYS_KEY, Value::scalar("k"))]
            .into_iter()
            .collect();
        let classes: Value = [("C", definition)].into_iter().collect();
        let bad_keys: Value = [(MAP_CLASS_MAP_KEY, classes)].into_iter().collect();
        assert!(matches!(
            MapClassRegistry::from_table(&bad_keys),
            Err(DecodeError::MalformedMapClassMap { .. })
        ));
    }
}
