//! Semantic validation of value trees.
//!
//! Marshalling accepts any tree: records with an unknown class are demoted
//! to maps and missing fields are written as None. Callers that want a
//! clean round trip can check a tree here first.

use crate::error::ValidationError;
use crate::model::{MapClassDefinition, MarshallingContext, Record, Value};

/// Checks every record reachable from `value` against the classes of
/// `context`.
///
/// A record must name a defined class and carry exactly the class's keys.
/// Nested contexts are checked against their own classes, or against the
/// enclosing ones when they define none.
pub fn validate_value(value: &Value, context: &MarshallingContext) -> Result<(), ValidationError> {
    match value {
        Value::None | Value::Scalar(_) => Ok(()),
        Value::List(items) => items
            .iter()
            .try_for_each(|item| validate_value(item, context)),
        Value::Map(map) => map
            .values()
            .try_for_each(|item| validate_value(item, context)),
        Value::Record(record) => {
            validate_record(record, context)?;
            record
                .fields
                .values()
                .try_for_each(|item| validate_value(item, context))
        }
        Value::Context(inner) if inner.registry().is_empty() => {
            validate_value(inner.root(), context)
        }
        Value::Context(inner) => validate_value(inner.root(), inner),
    }
}

/// Looks up a class that a collaborator depends on.
pub fn require_map_class<'c>(
    context: &'c MarshallingContext,
    name: &str,
) -> Result<&'c MapClassDefinition, ValidationError> {
    Ok(context.get_map_class_definition(name)?)
}

fn validate_record(record: &Record, context: &MarshallingContext) -> Result<(), ValidationError> {
    let class = require_map_class(context, &record.class_name)?;

    if let Some(key) = class
        .keys()
        .iter()
        .find(|key| !record.fields.contains_key(&key.key))
    {
        return Err(ValidationError::MissingField {
            class: record.class_name.clone(),
            key: key.key.clone(),
        });
    }

    if let Some(key) = record.fields.keys().find(|key| class.key(key).is_none()) {
        return Err(ValidationError::UnexpectedField {
            class: record.class_name.clone(),
            key: key.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> MarshallingContext {
        let mut context = MarshallingContext::new();
        context.set_map_class_definition(
            MapClassDefinition::new("Person").with_key("name").with_key("age"),
        );
        context
    }

    #[test]
    fn test_valid_tree() {
        let person = Record::new("Person").with("name", "Al").with("age", "30");
        let value = Value::List(vec![person.into(), Value::scalar("x"), Value::map()]);
        assert_eq!(validate_value(&value, &context()), Ok(()));
    }

    #[test]
    fn test_unknown_class() {
        let value = Value::Record(Record::new("Robot"));
        assert_eq!(
            validate_value(&value, &context()),
            Err(ValidationError::UnknownMapClass {
                name: "Robot".to_string()
            })
        );
    }

    #[test]
    fn test_missing_and_unexpected_fields() {
        let missing = Value::Record(Record::new("Person").with("name", "Al"));
        assert_eq!(
            validate_value(&missing, &context()),
            Err(ValidationError::MissingField {
                class: "Person".to_string(),
                key: "age".to_string()
            })
        );

        let extra = Value::Record(
            Record::new("Person")
                .with("name", "Al")
                .with("age", "30")
                .with("shoe", "9"),
        );
        assert_eq!(
            validate_value(&extra, &context()),
            Err(ValidationError::UnexpectedField {
                class: "Person".to_string(),
                key: "shoe".to_string()
            })
        );
    }

    #[test]
    fn test_nested_record_in_map() {
        let bad: Value = [("who", Value::Record(Record::new("Person")))]
            .into_iter()
            .collect();
        assert!(matches!(
            validate_value(&bad, &context()),
            Err(ValidationError::MissingField { .. })
        ));
    }

    #[test]
    fn test_nested_context_uses_own_classes() {
        let mut inner = MarshallingContext::new();
        inner.set_map_class_definition(MapClassDefinition::new("Robot"));
        inner.set_root(Record::new("Robot"));

        let value = Value::List(vec![inner.into()]);
        assert_eq!(validate_value(&value, &context()), Ok(()));
    }

    #[test]
    fn test_require_map_class() {
        let context = context();
        assert_eq!(require_map_class(&context, "Person").unwrap().keys().len(), 2);
        assert!(require_map_class(&context, "Robot").is_err());
    }
}
