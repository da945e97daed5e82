use std::fs;
use std::io::{Read, Write};
use std::process;

use clap::{Parser, Subcommand};
use tabwriter::TabWriter;

use texblock_io::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "texblock", version, about = "Block document normalization CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Normalize a block document JSON file and print the canonical result.
    Normalize {
        /// Input JSON path, or `-` for stdin
        input: String,
        /// Reject malformed input with an error instead of emitting `[]`
        #[arg(long)]
        dev: bool,
        /// Output minified canonical JSON
        #[arg(long)]
        min: bool,
        /// Print run telemetry JSON to stderr
        #[arg(long)]
        telemetry: bool,
    },
    /// Normalize a block document and print its rendered markup.
    Render {
        /// Input JSON path, or `-` for stdin
        input: String,
    },
    /// Print a per-block summary table for a normalized document.
    Inspect {
        /// Input JSON path, or `-` for stdin
        input: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let registry = SchemaRegistry::builtin();

    match cli.cmd {
        Command::Normalize {
            input,
            dev,
            min,
            telemetry,
        } => {
            let raw = read_input(&input);
            let outcome = match normalize_str(&raw, &registry, NormalizeOptions { dev }) {
                Ok(outcome) => outcome,
                Err(e) => {
                    // Exact error string, stable for CI / integrations.
                    eprintln!("{e}");
                    process::exit(2);
                }
            };

            if telemetry {
                let stats = NormalizeTelemetry::collect(Some(&raw), &outcome);
                eprintln!("{}", serde_json::to_string(&stats)?);
            }

            let out = if min {
                canonical_json::canonical_blocks_string(&outcome.blocks)?
            } else {
                serde_json::to_string_pretty(&outcome.blocks)?
            };
            println!("{out}");
        }
        Command::Render { input } => {
            let raw = read_input(&input);
            let outcome = normalize_str(&raw, &registry, NormalizeOptions::default())
                .unwrap_or_default();
            println!(
                "{}",
                render_document(&outcome.blocks, &registry, &RenderNames::default())
            );
        }
        Command::Inspect { input } => {
            let raw = read_input(&input);
            let outcome = normalize_str(&raw, &registry, NormalizeOptions::default())
                .unwrap_or_default();

            let mut tw = TabWriter::new(std::io::stdout());
            writeln!(tw, "type\titems\tattrs\tpreview")?;
            for block in &outcome.blocks {
                writeln!(
                    tw,
                    "{}\t{}\t{}\t{}",
                    block.kind,
                    block.data.len(),
                    block.attr.len(),
                    preview(block)
                )?;
            }
            tw.flush()?;
        }
    }

    Ok(())
}

fn read_input(path: &str) -> String {
    let result = if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .map(|_| buf)
    } else {
        fs::read_to_string(path)
    };

    match result {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

const PREVIEW_CHARS: usize = 80;

/// One-line text preview of a block's content, bounded at 80 characters.
fn preview(block: &Block) -> String {
    let mut text = String::new();
    collect_text(&block.data, &mut text);

    if text.chars().count() <= PREVIEW_CHARS {
        return text;
    }
    let mut bounded: String = text.chars().take(PREVIEW_CHARS - 1).collect();
    bounded.push('…');
    bounded
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(s) => {
                if !out.is_empty() {
                    out.push(' ');
                }
                out.push_str(s);
            }
            Node::Element(element) => collect_text(&element.data, out),
            Node::Record(fields) => {
                if let Some(url) = fields.get("url").and_then(serde_json::Value::as_str) {
                    if !out.is_empty() {
                        out.push(' ');
                    }
                    out.push_str(url);
                }
            }
        }
    }
}
