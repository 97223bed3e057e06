//! Marshalling context: a map class registry plus a root value.

use std::fmt;

use crate::error::MapClassError;
use crate::model::{MapClassDefinition, MapClassRegistry, Value};

/// A map class registry together with the value it describes.
///
/// Unmarshalling always produces a fresh context. Cloning is cheap; the
/// registry is shared until one of the clones defines a class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarshallingContext {
    registry: MapClassRegistry,
    root: Value,
}

impl MarshallingContext {
    /// Creates a context with no classes and a `None` root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with no classes around the given root.
    pub fn with_root(root: impl Into<Value>) -> Self {
        Self {
            registry: MapClassRegistry::new(),
            root: root.into(),
        }
    }

    /// Creates a context from an existing registry and root.
    pub fn from_parts(registry: MapClassRegistry, root: Value) -> Self {
        Self { registry, root }
    }

    pub fn registry(&self) -> &MapClassRegistry {
        &self.registry
    }

    /// Defines or replaces a map class.
    pub fn set_map_class_definition(&mut self, definition: MapClassDefinition) {
        self.registry.define(definition);
    }

    /// Looks up a map class.
    pub fn get_map_class_definition(
        &self,
        name: &str,
    ) -> Result<&MapClassDefinition, MapClassError> {
        self.registry.get(name)
    }

    pub fn has_map_class_definition(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Returns the defined class names in order.
    pub fn map_class_names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn set_root(&mut self, root: impl Into<Value>) {
        self.root = root.into();
    }

    pub fn into_root(self) -> Value {
        self.root
    }

    /// Returns the value that stands for this context inside a parent.
    ///
    /// A context that defines classes is needed to interpret its records,
    /// so it stands for itself. Otherwise the root is enough.
    pub fn primary_object(&self) -> Value {
        if self.registry.is_empty() {
            self.root.clone()
        } else {
            Value::Context(Box::new(self.clone()))
        }
    }

    /// Consuming form of [`primary_object`](Self::primary_object).
    pub fn into_primary_object(self) -> Value {
        if self.registry.is_empty() {
            self.root
        } else {
            Value::Context(Box::new(self))
        }
    }

    /// Marshalls this context, classes first, then the root.
    pub fn marshall(&self) -> String {
        crate::codec::marshall_context(self)
    }
}

impl fmt::Display for MarshallingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format::format_value(&self.root, Some(self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_object() {
        let plain = MarshallingContext::with_root("x");
        assert_eq!(plain.primary_object(), Value::scalar("x"));

        let mut typed = MarshallingContext::with_root("x");
        typed.set_map_class_definition(MapClassDefinition::new("C"));
        assert!(matches!(typed.primary_object(), Value::Context(_)));
        assert!(matches!(typed.into_primary_object(), Value::Context(_)));
    }

    #[test]
    fn test_class_lookup() {
        let mut context = MarshallingContext::new();
        context.set_map_class_definition(MapClassDefinition::new("B").with_key("k"));
        context.set_map_class_definition(MapClassDefinition::new("A"));

        assert!(context.has_map_class_definition("A"));
        assert!(!context.has_map_class_definition("Z"));
        assert_eq!(context.map_class_names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(
            context.get_map_class_definition("B").unwrap().keys()[0].key,
            "k"
        );
        assert!(context.get_map_class_definition("Z").is_err());
    }

    #[test]
    fn test_clone_does_not_share_new_classes() {
        let mut context = MarshallingContext::new();
        context.set_map_class_definition(MapClassDefinition::new("A"));
        let snapshot = context.clone();
        context.set_map_class_definition(MapClassDefinition::new("B"));

        assert!(!snapshot.has_map_class_definition("B"));
        assert_eq!(context.registry().len(), 2);
    }
}
