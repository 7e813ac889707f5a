//! regsim CLI: check, format, run and trace register-machine programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage, input or load error
//! - 2: Step budget exhausted
//! - 3: Runtime error

mod commands;

use std::process;

use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "check" => commands::check(&args[2..]),
        "fmt" => commands::fmt(&args[2..]),
        "run" => commands::run(&args[2..]),
        "trace" => commands::trace(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Log to stderr, filtered by `RUST_LOG`, warnings only by default.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage() {
    eprintln!("Usage: regsim <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  check <input.asm>                  Load a program and report its size");
    eprintln!("  fmt <input.asm>                    Print the canonical listing");
    eprintln!("  run <input.asm> [options]          Run to halt and print the registers");
    eprintln!("  trace <input.asm> [options]        Run, printing each instruction first");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --stack <bytes>                    Stack capacity (default 1024)");
    eprintln!("  --max-steps <n>                    Step budget (default 10000)");
    eprintln!("  --config <file.json>               Read stack_capacity and max_steps");
}
