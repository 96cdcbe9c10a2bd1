//! gldb-inspect - print the state of one graph
//!
//! Usage: gldb-inspect <db-path> <graph> [--output json|text]
//!
//! Reads only; nothing is flushed back to disk.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use gldb::graph::GraphStats;
use gldb::{Database, GraphMetadata};

#[derive(Serialize)]
struct ClassReport {
    id: u8,
    name: String,
    parent: u8,
    count: u32,
    sub_classes: Vec<u8>,
}

#[derive(Serialize)]
struct LabelReport {
    id: u16,
    value: String,
    refs: u64,
}

#[derive(Serialize)]
struct Report {
    metadata: GraphMetadata,
    stats: GraphStats,
    classes: Vec<ClassReport>,
    labels: Vec<LabelReport>,
}

fn usage() -> ! {
    eprintln!("Usage: gldb-inspect <db-path> <graph> [--output json|text]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <db-path>      Path to the database directory");
    eprintln!("  <graph>        Name of the graph to inspect");
    eprintln!("  --output       Output format (default: text)");
    eprintln!();
    eprintln!("Set GLDB_LOG (e.g. GLDB_LOG=debug) for store-level logging.");
    std::process::exit(1);
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("GLDB_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn collect(db_path: &Path, name: &str) -> Result<Report> {
    let mut db = Database::open(db_path).with_context(|| format!("opening database {:?}", db_path))?;
    let graph = db.graph(name).with_context(|| format!("opening graph {:?}", name))?;

    let mut classes = Vec::new();
    for class in graph.classes() {
        let class_name = graph.class_name(class.id)?;
        let sub_classes = graph.sub_classes(&class_name)?.iter().map(|c| c.id).collect();
        classes.push(ClassReport {
            id: class.id,
            name: class_name,
            parent: class.super_class,
            count: class.count,
            sub_classes,
        });
    }

    let labels = graph
        .labels()?
        .into_iter()
        .map(|(id, value, refs)| LabelReport { id, value, refs })
        .collect();

    Ok(Report { metadata: graph.metadata().clone(), stats: graph.stats(), classes, labels })
}

fn print_text(report: &Report) {
    let meta = &report.metadata;
    println!("graph {:?} (format v{})", meta.name, meta.format_version);
    println!("  row size {}  extension .{}", meta.options.row_size, meta.options.extension);
    println!("  created {}  updated {}", meta.created_at, meta.updated_at);

    let s = &report.stats;
    println!();
    println!("allocators");
    println!("  vertex     last id {:>8}  free {}", s.vertex_last_id, s.vertex_free_ids);
    println!("  edge       last id {:>8}  free {}", s.edge_last_id, s.edge_free_ids);
    println!("  attribute  last id {:>8}  free {}", s.attribute_last_id, s.attribute_free_ids);
    println!("  label      last id {:>8}", s.label_last_id);
    println!("  text       next row {:>7}  free runs {}", s.text_next_row, s.text_free_runs);

    println!();
    println!("classes ({})", report.classes.len());
    for class in &report.classes {
        println!(
            "  #{:<3} {:<24} parent #{:<3} vertices {:<8} subs {:?}",
            class.id, class.name, class.parent, class.count, class.sub_classes
        );
    }

    println!();
    println!("labels ({})", report.labels.len());
    for label in &report.labels {
        println!("  #{:<5} refs {:<6} {:?}", label.id, label.refs, label.value);
    }
}

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        usage();
    }

    let db_path = PathBuf::from(&args[1]);
    let name = args[2].as_str();
    let output = args
        .iter()
        .position(|a| a == "--output")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
        .unwrap_or("text");

    init_logging();

    let report = collect(&db_path, name)?;
    match output {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "text" => print_text(&report),
        other => bail!("unknown output format {:?} (expected json or text)", other),
    }
    Ok(())
}
