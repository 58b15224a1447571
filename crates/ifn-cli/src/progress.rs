use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::time::Duration;

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS);
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a spinner with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Run a service call behind a spinner. JSON mode stays silent so stdout
/// only carries the result.
pub async fn with_spinner<T, E, F>(quiet: bool, message: &str, done: &str, call: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    if quiet {
        return call.await;
    }

    let pb = create_spinner(message);
    let result = call.await;
    if result.is_ok() {
        finish_success(&pb, done);
    } else {
        // The error is presented by the caller
        pb.finish_and_clear();
    }
    result
}
