//! Shared pieces of the run commands: Ctrl-C wiring and summary printing.

use anyhow::Result;
use pkgcheck_core::control::RunControl;
use pkgcheck_core::report::PipelineSummary;
use tokio::task::JoinHandle;

use crate::cli::Completion;

/// Exit status used when a second Ctrl-C cuts the drain short.
const INTERRUPTED_EXIT: i32 = 130;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Interrupt {
    /// First signal: stop submitting, let in-flight packages finish, still report.
    Drain,
    /// Repeated signal: leave immediately.
    Exit,
}

pub(super) fn on_interrupt(control: &RunControl) -> Interrupt {
    if control.is_aborted() {
        Interrupt::Exit
    } else {
        control.abort();
        Interrupt::Drain
    }
}

/// First Ctrl-C aborts `control` so the run drains and reports; a second one exits.
pub(super) fn abort_on_ctrl_c(control: &RunControl) -> JoinHandle<()> {
    let control = control.clone();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            match on_interrupt(&control) {
                Interrupt::Drain => {
                    eprintln!("interrupted, finishing in-flight packages (Ctrl-C again to quit)...")
                }
                Interrupt::Exit => {
                    eprintln!("interrupted again, exiting");
                    std::process::exit(INTERRUPTED_EXIT);
                }
            }
        }
    })
}

pub(super) fn print_summary(summary: &PipelineSummary, json: bool) -> Result<Completion> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print!("{}", summary);
    }
    Ok(completion_of(summary))
}

pub(super) fn completion_of(summary: &PipelineSummary) -> Completion {
    if summary.all_ok() {
        Completion::AllOk
    } else {
        Completion::Failures
    }
}
