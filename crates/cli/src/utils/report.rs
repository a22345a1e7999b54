use colored::Colorize;
use tagreader_core::{SessionOutcome, SessionReport};

/// Print how a session ended. The log lines themselves already went out
/// through `tracing` while the session ran.
pub fn print_summary(report: &SessionReport) {
    if let Some(signal) = report.image_url() {
        println!("{} {}", "Image:".green().bold(), signal.url);
    }

    let errors = report.errors().count();
    let outcome = match report.outcome() {
        SessionOutcome::Completed => report.outcome().to_string().green(),
        SessionOutcome::NotApplicable | SessionOutcome::Unsupported => {
            report.outcome().to_string().yellow()
        }
        SessionOutcome::Failed => report.outcome().to_string().red(),
    };
    if errors > 0 {
        println!("{} {outcome} ({errors} errors)", "Session:".bold());
    } else {
        println!("{} {outcome}", "Session:".bold());
    }
}
