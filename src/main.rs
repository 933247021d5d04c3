//! Cellgrid - evaluate and edit spreadsheets from the command line

mod config;
mod render;

use anyhow::{Context, Result, anyhow, bail};
use cellgrid_core::{CellRef, Document};
use cellgrid_engine::builtins::BUILTINS;
use cellgrid_engine::engine::DataType;
use std::env;
use std::path::PathBuf;

fn print_usage() {
    eprintln!("Usage: cellgrid [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Spreadsheet file to open (.json)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -s, --set <REF=INPUT>     Edit a cell (can be repeated, applied in order)");
    eprintln!("  -t, --type <REF=TYPE>     Set a cell's data type: text, number or date");
    eprintln!("  -o, --output <FILE>       Save the resulting sheet as JSON");
    eprintln!("  --chart <RANGE>           Draw a bar chart of a range (e.g. A1:A10)");
    eprintln!("  --config <FILE>           Read settings from a TOML file");
    eprintln!("  -h, --help                Print help");
    eprintln!();
    eprintln!("Functions:");
    for builtin in BUILTINS {
        eprintln!("  {:<24}  {}", builtin.name, builtin.description);
    }
}

#[derive(Debug, Default)]
struct Options {
    file_path: Option<PathBuf>,
    edits: Vec<(CellRef, String)>,
    types: Vec<(CellRef, DataType)>,
    output_file: Option<PathBuf>,
    chart_range: Option<String>,
    config_file: Option<PathBuf>,
}

/// Split `REF=VALUE` at the first `=`.
fn parse_assignment(arg: &str) -> Result<(CellRef, &str)> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected REF=VALUE, got '{}'", arg))?;
    let cell_ref =
        CellRef::from_str(name).ok_or_else(|| anyhow!("Invalid cell reference: {}", name))?;
    Ok((cell_ref, value))
}

/// Parse the command line. `Ok(None)` means help was printed.
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut opts = Options::default();

    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        let mut value = |flag: &str| -> Result<String> {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| anyhow!("{} requires a value", flag))
        };
        match arg {
            "-h" | "--help" => {
                print_usage();
                return Ok(None);
            }
            "-s" | "--set" => {
                let raw = value("--set")?;
                let (cell_ref, input) = parse_assignment(&raw)?;
                opts.edits.push((cell_ref, input.to_string()));
            }
            "-t" | "--type" => {
                let raw = value("--type")?;
                let (cell_ref, name) = parse_assignment(&raw)?;
                let data_type = name.parse::<DataType>().map_err(|e| anyhow!(e))?;
                opts.types.push((cell_ref, data_type));
            }
            "-o" | "--output" => {
                opts.output_file = Some(PathBuf::from(value("--output")?));
            }
            "--chart" => {
                opts.chart_range = Some(value("--chart")?);
            }
            "--config" => {
                opts.config_file = Some(PathBuf::from(value("--config")?));
            }
            other if other.starts_with('-') => {
                print_usage();
                bail!("Unknown option: {}", other);
            }
            other => {
                if opts.file_path.is_some() {
                    print_usage();
                    bail!("Unexpected argument: {}", other);
                }
                opts.file_path = Some(PathBuf::from(other));
            }
        }
        i += 1;
    }
    Ok(Some(opts))
}

fn run(opts: Options) -> Result<()> {
    let (config, warnings) = config::load_config(opts.config_file.as_ref());
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }
    log::debug!("using {:?}", config);

    let mut doc = Document::with_file(opts.file_path.clone(), config).with_context(|| {
        match &opts.file_path {
            Some(path) => format!("Failed to open {}", path.display()),
            None => "Failed to create document".to_string(),
        }
    })?;

    for (cell_ref, data_type) in &opts.types {
        doc.set_data_type(cell_ref, *data_type)
            .with_context(|| format!("Cannot set type of {}", cell_ref))?;
    }
    for (cell_ref, input) in &opts.edits {
        doc.on_edit(cell_ref, input)
            .with_context(|| format!("Cannot edit {}", cell_ref))?;
    }

    print!("{}", render::format_values(&doc));

    if let Some(range) = &opts.chart_range {
        print_chart(&doc, range)?;
    }

    if let Some(output_path) = &opts.output_file {
        doc.save_as(output_path)
            .with_context(|| format!("Failed to save {}", output_path.display()))?;
        eprintln!("Saved to {}", output_path.display());
    }
    Ok(())
}

#[cfg(feature = "chart")]
fn print_chart(doc: &Document, range: &str) -> Result<()> {
    let data = cellgrid_engine::chart::ChartData::from_range(doc.sheet(), range)
        .map_err(|e| anyhow!(e))?;
    println!("{}", render::render_chart(&data, 120, 60));
    Ok(())
}

#[cfg(not(feature = "chart"))]
fn print_chart(_doc: &Document, _range: &str) -> Result<()> {
    bail!("Charts are not available: built without the 'chart' feature")
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let result = match parse_args(&args) {
        Ok(Some(opts)) => run(opts),
        Ok(None) => Ok(()),
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
