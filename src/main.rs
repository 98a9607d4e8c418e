// lilc: type-checking front end for a small C-like language

use std::process;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log to stderr, filtered by `RUST_LOG` (default `warn`)
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn main() {
    init_tracing();

    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("lilc");

    if args.len() != 2 {
        eprintln!("Error: expected exactly one input file");
        eprintln!();
        eprintln!("Usage: {} <file>", program_name);
        process::exit(1);
    }

    match lilc::parse_file(&args[1]) {
        Ok(file) => {
            info!(
                file = %file.filepath,
                statements = file.statements.len(),
                "parsed"
            );
        }
        Err(err) => {
            eprintln!("{err}");
            process::exit(1);
        }
    }
}
