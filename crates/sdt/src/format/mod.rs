//! Human readable rendering of value trees.
//!
//! Lists and maps open a bracket, print one entry per line indented one
//! level deeper, and close at the parent's indent. Map keys are padded to
//! the longest key so values line up. Records of a known class print in
//! class key order under their display names.

use crate::model::{MapClassDefinition, MarshallingContext, Value, ValueMap};

/// Text printed for [`Value::None`].
pub const NONE_STRING: &str = "<None>";

/// Options for formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Indent level of the outermost value.
    pub indent_level: usize,
    /// Spaces per indent level.
    pub indent_width: usize,
    /// Text written after each bracket and entry.
    pub line_separator: &'static str,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatOptions {
    pub const fn new() -> Self {
        Self {
            indent_level: 0,
            indent_width: 2,
            line_separator: "\n",
        }
    }

    /// Starts formatting at the given indent level.
    pub const fn with_indent_level(mut self, indent_level: usize) -> Self {
        self.indent_level = indent_level;
        self
    }

    pub const fn with_indent_width(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }

    pub const fn with_line_separator(mut self, line_separator: &'static str) -> Self {
        self.line_separator = line_separator;
        self
    }
}

/// Formats a value, resolving records against the classes of `context`.
pub fn format_value(value: &Value, context: Option<&MarshallingContext>) -> String {
    format_value_with_options(value, context, FormatOptions::new())
}

/// Formats a value with explicit options.
pub fn format_value_with_options(
    value: &Value,
    context: Option<&MarshallingContext>,
    options: FormatOptions,
) -> String {
    let mut formatter = Formatter {
        out: String::new(),
        options,
    };
    formatter.value(value, context, options.indent_level);
    formatter.out
}

struct Formatter {
    out: String,
    options: FormatOptions,
}

/// A map entry as printed: label, then the value.
type Entry<'v> = (&'v str, Option<&'v Value>);

impl Formatter {
    fn value(&mut self, value: &Value, context: Option<&MarshallingContext>, level: usize) {
        match value {
            Value::None => self.out.push_str(NONE_STRING),
            Value::Scalar(s) => self.out.push_str(s),
            Value::List(items) => self.list(items, context, level),
            Value::Map(map) => match class_of(Value::map_class_name_of(map), context) {
                Some(class) => self.record(class, map, context, level),
                None => self.map(map, context, level),
            },
            Value::Record(record) => match class_of(Some(record.class_name.as_str()), context) {
                Some(class) => self.record(class, &record.fields, context, level),
                None => self.map(&record.to_map(), context, level),
            },
            Value::Context(inner) => self.value(inner.root(), Some(inner.as_ref()), level),
        }
    }

    fn list(&mut self, items: &[Value], context: Option<&MarshallingContext>, level: usize) {
        self.out.push('[');
        if !items.is_empty() {
            self.out.push_str(self.options.line_separator);
        }
        for item in items {
            self.indent(level + 1);
            self.value(item, context, level + 1);
            self.out.push_str(self.options.line_separator);
        }
        if !items.is_empty() {
            self.indent(level);
        }
        self.out.push(']');
    }

    fn map(&mut self, map: &ValueMap, context: Option<&MarshallingContext>, level: usize) {
        let entries: Vec<Entry<'_>> = map.iter().map(|(k, v)| (k.as_str(), Some(v))).collect();
        self.entries(&entries, false, context, level);
    }

    fn record(
        &mut self,
        class: &MapClassDefinition,
        fields: &ValueMap,
        context: Option<&MarshallingContext>,
        level: usize,
    ) {
        let entries: Vec<Entry<'_>> = class
            .keys()
            .iter()
            .map(|key| (key.label(), fields.get(&key.key)))
            .collect();
        // A record always carries its class name, so it never prints as `{}`.
        self.entries(&entries, true, context, level);
    }

    fn entries(
        &mut self,
        entries: &[Entry<'_>],
        force_break: bool,
        context: Option<&MarshallingContext>,
        level: usize,
    ) {
        let width = entries
            .iter()
            .map(|(label, _)| label.chars().count())
            .max()
            .unwrap_or(0);

        self.out.push('{');
        let broken = force_break || !entries.is_empty();
        if broken {
            self.out.push_str(self.options.line_separator);
        }
        for (label, value) in entries {
            self.indent(level + 1);
            self.out.push_str(label);
            self.pad(width - label.chars().count());
            self.out.push_str(": ");
            match value {
                Some(value) => self.value(value, context, level + 1),
                None => self.out.push_str(NONE_STRING),
            }
            self.out.push_str(self.options.line_separator);
        }
        if broken {
            self.indent(level);
        }
        self.out.push('}');
    }

    fn indent(&mut self, level: usize) {
        self.pad(level * self.options.indent_width);
    }

    fn pad(&mut self, n: usize) {
        self.out.extend(std::iter::repeat_n(' ', n));
    }
}

fn class_of<'c>(
    name: Option<&str>,
    context: Option<&'c MarshallingContext>,
) -> Option<&'c MapClassDefinition> {
    context?.get_map_class_definition(name?).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::unmarshall;
    use crate::model::Record;

    #[test]
    fn test_format_scalars() {
        assert_eq!(format_value(&Value::None, None), "<None>");
        assert_eq!(format_value(&Value::scalar("abc"), None), "abc");
        assert_eq!(
            format_value_with_options(
                &Value::scalar("abc"),
                None,
                FormatOptions::new().with_indent_level(3)
            ),
            "abc"
        );
    }

    #[test]
    fn test_format_empty_containers() {
        assert_eq!(format_value(&Value::list(), None), "[]");
        assert_eq!(format_value(&Value::map(), None), "{}");
    }

    #[test]
    fn test_format_nested_list_and_map() {
        let map: Value = [
            ("a", Value::scalar("1")),
            ("long", Value::List(vec![Value::scalar("x"), Value::None])),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            format_value(&map, None),
            "{\n  a   : 1\n  long: [\n    x\n    <None>\n  ]\n}"
        );
    }

    #[test]
    fn test_format_golden_context() {
        let data = "@SDT/*:525:@SDT/{:375::13:map-class-map@SDT/{:347::30:STAF/Test/MyMapClassDefinition\
@SDT/{:191::4:keys@SDT/[2:124:@SDT/{:52::12:display-name@SDT/$S:6:Key #1:3:key@SDT/$S:4:key1\
@SDT/{:52::12:display-name@SDT/$S:6:Key #2:3:key@SDT/$S:4:key2:4:name@SDT/$S:30:STAF/Test/MyMapClassDefinition\
:31:STAF/Test/MyMapClassDefinition2@SDT/{:66::4:keys@SDT/[0:0::4:name@SDT/$S:31:STAF/Test/MyMapClassDefinition2\
@SDT/[2:127:@SDT/%:72::30:STAF/Test/MyMapClassDefinition@SDT/$S:9:Value 1 1@SDT/$S:9:Value 2 1\
@SDT/%:35::31:STAF/Test/MyMapClassDefinition2";

        let context = unmarshall(data);
        let expected = "[\n  {\n    Key #1: Value 1 1\n    Key #2: Value 2 1\n  }\n  {\n  }\n]";
        assert_eq!(context.to_string(), expected);
        assert_eq!(format_value(&context.into_primary_object(), None), expected);
    }

    #[test]
    fn test_format_missing_field() {
        let mut context = MarshallingContext::new();
        context.set_map_class_definition(
            MapClassDefinition::new("STAF/Test/MyMapClassDefinition2")
                .with_display_key("KeyYYY", "Key YYY")
                .with_display_key("KeyXXX", "Key XXX"),
        );
        context.set_root(
            Record::new("STAF/Test/MyMapClassDefinition2").with("KeyXXX", "ValueXXX"),
        );

        assert_eq!(
            context.to_string(),
            "{\n  Key YYY: <None>\n  Key XXX: ValueXXX\n}"
        );
    }

    #[test]
    fn test_format_record_without_class_prints_as_map() {
        let record = Value::Record(Record::new("C").with("k", "v"));
        assert_eq!(
            format_value(&record, None),
            "{\n  k                  : v\n  staf-map-class-name: C\n}"
        );
    }

    #[test]
    fn test_format_options() {
        let list = Value::List(vec![Value::scalar("x")]);
        let options = FormatOptions::new()
            .with_indent_level(1)
            .with_indent_width(4)
            .with_line_separator("\r\n");
        assert_eq!(
            format_value_with_options(&list, None, options),
            "[\r\n        x\r\n    ]"
        );
    }
}
