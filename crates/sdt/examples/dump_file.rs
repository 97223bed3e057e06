//! Simple inspector for files holding SDT marshalled data.

use std::fs;

use sdt::{is_marshalled_data, unmarshall, MarshallingContext, Value};

#[derive(Default)]
struct Stats {
    none: usize,
    scalars: usize,
    lists: usize,
    maps: usize,
    records: usize,
    contexts: usize,
    max_depth: usize,
}

impl Stats {
    fn visit(&mut self, value: &Value, depth: usize) {
        self.max_depth = self.max_depth.max(depth);
        match value {
            Value::None => self.none += 1,
            Value::Scalar(_) => self.scalars += 1,
            Value::List(items) => {
                self.lists += 1;
                for item in items {
                    self.visit(item, depth + 1);
                }
            }
            Value::Map(map) => {
                self.maps += 1;
                for item in map.values() {
                    self.visit(item, depth + 1);
                }
            }
            Value::Record(record) => {
                self.records += 1;
                for item in record.fields.values() {
                    self.visit(item, depth + 1);
                }
            }
            Value::Context(context) => {
                self.contexts += 1;
                self.visit(context.root(), depth + 1);
            }
        }
    }
}

fn print_classes(context: &MarshallingContext) {
    for class in context.registry() {
        let keys: Vec<&str> = class.keys().iter().map(|k| k.key.as_str()).collect();
        println!("  {} [{}]", class.name(), keys.join(", "));
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: dump_file <path>");
        std::process::exit(2);
    };

    println!("Reading: {}", path);

    let data = fs::read_to_string(&path).expect("Failed to read file");
    let data = data.trim_end_matches(['\r', '\n']);
    println!("File size: {} bytes, {} characters", data.len(), data.chars().count());

    if !is_marshalled_data(data) {
        println!("Not marshalled data; printing as-is");
    }

    let context = unmarshall(data);

    println!("\n=== Map Classes ({}) ===", context.registry().len());
    print_classes(&context);

    let mut stats = Stats::default();
    stats.visit(context.root(), 0);

    println!("\n=== Nodes ===");
    println!("  None: {}", stats.none);
    println!("  Scalar: {}", stats.scalars);
    println!("  List: {}", stats.lists);
    println!("  Map: {}", stats.maps);
    println!("  Record: {}", stats.records);
    println!("  Context: {}", stats.contexts);
    println!("  Max depth: {}", stats.max_depth);

    println!("\n=== Root ===");
    println!("{}", context.root().summary());

    println!("\n=== Formatted ===");
    println!("{}", context);
}
