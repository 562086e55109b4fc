pub mod binomial;
pub mod sequences;
pub mod simulate;

use serde::Serialize;

/// Print an error and exit with status 1.
pub fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    eprintln!("{context}: {err}");
    std::process::exit(1);
}

/// Write `value` as pretty JSON to `path`, reporting the outcome on the terminal.
pub fn write_json<T: Serialize>(path: &str, value: &T) {
    let json = match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => fail("Failed to serialize results", e),
    };
    match std::fs::write(path, json) {
        Ok(()) => println!("\nResults saved to: {path}"),
        Err(e) => eprintln!("Failed to write results to {path}: {e}"),
    }
}

/// Format a probability as a percentage with one decimal.
pub fn percent(p: f64) -> String {
    format!("{:.1}%", p * 100.0)
}
