//! Benchmark for SDT marshalling using synthetic data.
//!
//! Runs three workloads: a large list of scalars, a large map, and a list of
//! map class instances with ten keys each. Each workload is formatted,
//! marshalled and unmarshalled, and its size compared with a JSON rendering
//! of the same tree.

use std::time::{Duration, Instant};

use sdt::{MapClassDefinition, MarshallingContext, Record, Value, ValueMap};
use serde::Serialize;

const CLASS_NAME: &str = "STAF/Test/MyMapClassDefinition";
const NUM_KEYS: usize = 10;
const DECODE_ITERS: u32 = 3;

/// Result of one workload, printed as JSON at the end of the run.
#[derive(Debug, Serialize)]
struct Report {
    workload: &'static str,
    entries: usize,
    sdt_chars: usize,
    json_bytes: usize,
    format_ms: f64,
    marshall_ms: f64,
    unmarshall_ms: f64,
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

// =============================================================================
// WORKLOADS
// =============================================================================

fn scalar_list(entries: usize) -> MarshallingContext {
    let items = (0..entries)
        .map(|i| Value::scalar(format!("entryValue ##{}", i)))
        .collect();
    MarshallingContext::with_root(Value::List(items))
}

fn scalar_map(entries: usize) -> MarshallingContext {
    let map: ValueMap = (0..entries)
        .map(|i| (format!("key{}", i), Value::scalar(format!("value{}", i))))
        .collect();
    MarshallingContext::with_root(Value::Map(map))
}

fn record_list(entries: usize) -> MarshallingContext {
    let mut class = MapClassDefinition::new(CLASS_NAME);
    for k in 1..=NUM_KEYS {
        class.add_key_with_display_name(format!("key{}", k), format!("Key #{}", k));
    }

    let records = (1..=entries)
        .map(|i| {
            let mut record = class.create_instance();
            for j in 1..=NUM_KEYS {
                record.insert(format!("key{}", j), format!("Value {} {}", j, i));
            }
            Value::Record(record)
        })
        .collect();

    let mut context = MarshallingContext::with_root(Value::List(records));
    context.set_map_class_definition(class);
    context
}

// =============================================================================
// JSON COMPARISON
// =============================================================================

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::None => serde_json::Value::Null,
        Value::Scalar(s) => serde_json::Value::String(s.clone()),
        Value::List(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Map(map) => json_object(map),
        Value::Record(record) => json_object(&Record::to_map(record)),
        Value::Context(context) => to_json(context.root()),
    }
}

fn json_object(map: &ValueMap) -> serde_json::Value {
    serde_json::Value::Object(map.iter().map(|(k, v)| (k.clone(), to_json(v))).collect())
}

// =============================================================================
// RUNNER
// =============================================================================

fn run(workload: &'static str, entries: usize, context: MarshallingContext) -> Report {
    println!("\n=== {} ({} entries) ===", workload, entries);

    let format_start = Instant::now();
    let formatted = context.to_string();
    let format_time = format_start.elapsed();
    println!("Format: {} bytes in {:?}", formatted.len(), format_time);

    let marshall_start = Instant::now();
    let marshalled = context.marshall();
    let marshall_time = marshall_start.elapsed();
    let sdt_chars = marshalled.chars().count();
    println!("Marshall: {} characters in {:?}", sdt_chars, marshall_time);
    println!(
        "  Throughput: {:.2} MB/s",
        (marshalled.len() as f64 / 1_000_000.0) / marshall_time.as_secs_f64()
    );

    // Warmup
    let _ = sdt::unmarshall(&marshalled);

    let unmarshall_start = Instant::now();
    let mut decoded = None;
    for _ in 0..DECODE_ITERS {
        decoded = Some(sdt::unmarshall(&marshalled));
    }
    let unmarshall_time = unmarshall_start.elapsed() / DECODE_ITERS;
    println!(
        "Unmarshall: {:?} (avg of {} iterations)",
        unmarshall_time, DECODE_ITERS
    );
    println!(
        "  Throughput: {:.2} MB/s",
        (marshalled.len() as f64 / 1_000_000.0) / unmarshall_time.as_secs_f64()
    );
    assert_eq!(decoded.as_ref(), Some(&context), "round trip mismatch");

    let json = serde_json::to_string(&to_json(&Value::from(context)))
        .expect("Failed to serialize JSON");
    println!(
        "JSON: {} bytes ({:.2}x of SDT)",
        json.len(),
        json.len() as f64 / marshalled.len() as f64
    );

    Report {
        workload,
        entries,
        sdt_chars,
        json_bytes: json.len(),
        format_ms: ms(format_time),
        marshall_ms: ms(marshall_time),
        unmarshall_ms: ms(unmarshall_time),
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let entries: usize = std::env::args()
        .nth(1)
        .map(|arg| arg.parse().expect("entry count must be a number"))
        .unwrap_or(100_000);

    tracing::info!(entries, version = sdt::VERSION, "starting marshalling benchmark");

    let reports = vec![
        run("list of scalars", entries, scalar_list(entries)),
        run("map of scalars", entries, scalar_map(entries)),
        run(
            "list of map class instances",
            entries / 10,
            record_list(entries / 10),
        ),
    ];

    println!("\n=== Summary ===");
    println!(
        "{}",
        serde_json::to_string_pretty(&reports).expect("Failed to serialize summary")
    );
}
