//! Colored terminal output for the prepare step
//!
//! Uses owo-colors for terminal colors. Warnings and errors go to stderr so
//! the agent's log parser picks them up separately from regular output.

use owo_colors::OwoColorize;

/// Print an action header (blue, bold)
/// Example: "==> Preparing SonarCloud analysis"
pub fn action(message: &str) {
    println!("{} {}", "==>".blue().bold(), message.bold());
}

/// Print a detail line (dimmed prefix)
/// Example: "     default branch is 'refs/heads/main'"
pub fn detail(message: &str) {
    println!("     {}", message.dimmed());
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    println!("{} {}", "::".cyan(), message);
}

/// Print a success message (green)
pub fn success(message: &str) {
    println!("{} {}", "==>".green().bold(), message.green());
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}
