//! Interactive shell over the workbench
//!
//! Mirrors the four user actions: open a file, analyze it, show charts and
//! save the report. Actions that are not yet available are refused with a
//! hint instead of running.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use salescope_core::{Action, Config, Workbench};

use super::{describe_error, render_panels, render_summary};

const HELP: &str = "Commands:
  open <path>   Choose a .csv, .txt or .xlsx file
  analyze       Analyze the chosen file
  charts        Show sales and price charts
  save          Write the XLSX report next to the file
  status        Show the chosen file and which actions are available
  help          Show this help
  quit          Leave the shell";

pub fn cmd_shell(config: Config) -> Result<()> {
    let mut bench = Workbench::new(config);
    let stdin = io::stdin();
    let stdout = io::stdout();
    run_shell(&mut bench, stdin.lock(), &mut stdout.lock())
}

/// Read commands until `quit` or end of input
pub fn run_shell<R: BufRead, W: Write>(bench: &mut Workbench, input: R, out: &mut W) -> Result<()> {
    writeln!(out, "Salescope shell. Type 'help' for commands.")?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        let line = line?;
        let (command, arg) = match line.trim().split_once(char::is_whitespace) {
            Some((command, arg)) => (command, arg.trim()),
            None => (line.trim(), ""),
        };

        match command {
            "" => {}
            "quit" | "exit" => break,
            "help" => writeln!(out, "{}", HELP)?,
            "status" => write_status(bench, out)?,
            "open" => {
                if arg.is_empty() {
                    writeln!(out, "Usage: open <path>")?;
                } else {
                    bench.choose_file(arg);
                    writeln!(out, "📂 Selected {}", arg)?;
                }
            }
            "analyze" => match bench.analyze() {
                Ok(session) => {
                    let summary = session.summary();
                    let currency = &bench.config().report.currency;
                    writeln!(out, "{}", render_summary(&summary, currency))?;
                }
                Err(e) => writeln!(out, "❌ {}", describe_error(&e))?,
            },
            "charts" => match bench.chart_panels() {
                Ok(panels) => {
                    writeln!(out, "{}", render_panels(&panels, &bench.config().report.currency))?
                }
                Err(e) => writeln!(out, "❌ {}", describe_error(&e))?,
            },
            "save" => match bench.save_report() {
                Ok(path) => writeln!(out, "✅ Report saved to {}", path.display())?,
                Err(e) => writeln!(out, "❌ {}", describe_error(&e))?,
            },
            other => writeln!(out, "Unknown command: {}. Type 'help' for commands.", other)?,
        }

        write!(out, "> ")?;
        out.flush()?;
    }

    writeln!(out)?;
    Ok(())
}

fn write_status<W: Write>(bench: &Workbench, out: &mut W) -> Result<()> {
    match bench.selected() {
        Some(path) => writeln!(out, "   File:     {}", path.display())?,
        None => writeln!(out, "   File:     (none)")?,
    }
    match bench.session() {
        Some(session) => writeln!(
            out,
            "   Analysis: {} ({} rows)",
            session.mode(),
            session.table().row_count()
        )?,
        None => writeln!(out, "   Analysis: (none)")?,
    }

    let enabled: Vec<&str> = Action::ALL
        .iter()
        .filter(|a| bench.is_enabled(**a))
        .map(|a| a.as_str())
        .collect();
    writeln!(out, "   Available: {}", enabled.join(", "))?;
    Ok(())
}
