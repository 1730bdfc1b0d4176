use std::io::Read;

use clap::Parser;
use tracing::Level;

use genocl::config::DEFAULT_MODEL_NAME;
use genocl::{Inheritance, Options};

#[derive(Parser)]
#[command(name = "genocl", about = "Generate a USE OCL specification from a textual UML class model")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    file: Option<std::path::PathBuf>,

    /// Qualified name of an element to transform, e.g. `Residences::Core`
    /// (repeatable; defaults to every top-level element)
    #[arg(long, short = 's')]
    select: Vec<String>,

    /// Name written in the `model` header
    #[arg(long, short = 'm', default_value = DEFAULT_MODEL_NAME)]
    model_name: String,

    /// Only list the first parent in `class X < ...` headers
    #[arg(long)]
    first_parent_only: bool,

    /// Log traversal details to stderr
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let input = match cli.file {
        Some(path) => std::fs::read_to_string(&path).unwrap_or_else(|e| {
            eprintln!("ERROR: failed to read {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                eprintln!("ERROR: failed to read stdin: {e}");
                std::process::exit(1);
            });
            buf
        }
    };

    let options = Options {
        model_name: cli.model_name,
        inheritance: if cli.first_parent_only {
            Inheritance::FirstParent
        } else {
            Inheritance::AllParents
        },
    };

    match genocl::transform_with_options(&input, &cli.select, &options) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    }
}
