//! xml2csv CLI - convert XML documents to CSV using a JSON mapping
//!
//! ```bash
//! xml2csv -i input.xml -m mapping.json -o output.csv
//! xml2csv -i ./feeds/ -m mapping.json -o output.csv      # directory of XML files
//! xml2csv -i https://example.com/feed.xml -m mapping.json -o out.csv -b
//! ```

use clap::Parser;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use xml2csv::{convert, load_mapping, source};

#[derive(Parser)]
#[command(name = "xml2csv")]
#[command(version)]
#[command(about = "Convert XML documents to CSV using a declarative JSON mapping", long_about = None)]
struct Cli {
    /// XML input file, directory, or URL
    #[arg(short, long)]
    input: String,

    /// Mapping JSON file path or URL
    #[arg(short, long)]
    mapping: String,

    /// CSV output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Write a UTF-8 byte-order mark before the header
    #[arg(short = 'b', long)]
    bom: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("xml2csv v{}", env!("CARGO_PKG_VERSION"));

    let mapping = load_mapping(&cli.mapping)?;
    eprintln!(
        "Mapping: rows {} -> {} column(s)",
        mapping.rows_path,
        mapping.columns.len()
    );

    let sources = source::resolve(&cli.input)?;
    eprintln!("Found {} input document(s)", sources.len());

    let file = File::create(&cli.output)
        .map_err(|e| format!("Cannot create `{}`: {e}", cli.output.display()))?;
    let summary = convert(&sources, &mapping, BufWriter::new(file), cli.bom)?;

    eprintln!(
        "Wrote {} row(s) from {} document(s) to {}",
        summary.rows,
        summary.documents,
        cli.output.display()
    );
    Ok(())
}
