//! A line-at-a-time front end over the scan/parse pipeline: reads lines
//! from stdin, parses each against a shared [`ShellContext`], and prints
//! the resulting tree or the diagnostics the parse collected along the
//! way. There is no execution engine behind this — it exists to let the
//! pipeline be driven interactively, not to run a shell.

use std::io::{self, BufRead, Write};

use clap::Parser;
use lusush_shell::{drain_diagnostics, format_tree, init_logging, parse_line, ShellContext};

#[derive(Parser, Debug)]
#[command(name = "lusush", about = "Parse shell input and print its syntax tree")]
struct Args {
    /// Log level used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Use the strict parse budget, appropriate for untrusted input.
    #[arg(long)]
    strict: bool,
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let mut context = ShellContext::new().unwrap_or_else(|err| {
        eprintln!("failed to initialize line buffer: {err}");
        std::process::exit(1);
    });
    if args.strict {
        context = context.with_strict_budget();
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&mut context, &line) {
            Ok(tree) => {
                write!(out, "{}", format_tree(&tree))?;
            }
            Err(err) => {
                writeln!(out, "error: {err}")?;
            }
        }
        for diagnostic in drain_diagnostics(&mut context) {
            writeln!(out, "  {:?}: {}", diagnostic.severity, diagnostic.message)?;
        }
        out.flush()?;
    }
    Ok(())
}
