//! Application configuration from CLI flags and environment.

use clap::Parser;

use matcalc_core::constants::DEFAULT_MATRIX_SIZE;

/// MatCalc-rs — Strassen matrix product calculator.
#[derive(Parser, Debug)]
#[command(name = "matcalc", version, about)]
pub struct AppConfig {
    /// Matrix dimension (multiplies two random SIZE×SIZE matrices).
    #[arg(value_name = "SIZE", default_value_t = DEFAULT_MATRIX_SIZE, env = "MATCALC_SIZE")]
    pub size: usize,

    /// Algorithm to run: naive, strassen, parallel, or all.
    #[arg(long, default_value = "strassen")]
    pub algo: String,

    /// Elementwise engine: serial or parallel.
    #[arg(long, default_value = "serial")]
    pub engine: String,

    /// Seed for the random matrix generator (omit for entropy).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Base-case threshold (0 = calibrated or default).
    #[arg(long, default_value = "0")]
    pub base_threshold: usize,

    /// Parallel fan-out cutoff (0 = calibrated or default).
    #[arg(long, default_value = "0")]
    pub parallel_threshold: usize,

    /// Verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Show detailed information.
    #[arg(short, long)]
    pub details: bool,

    /// Quiet mode (only output the elapsed milliseconds).
    #[arg(short, long)]
    pub quiet: bool,

    /// Output file path for the result matrix.
    #[arg(short, long)]
    pub output: Option<String>,

    /// Timeout duration (e.g., "30s", "5m").
    #[arg(long, default_value = "5m")]
    pub timeout: String,

    /// Memory limit (e.g., "8G", "512M").
    #[arg(long, default_value = "")]
    pub memory_limit: String,

    /// Run full calibration.
    #[arg(long)]
    pub calibrate: bool,

    /// Run automatic calibration.
    #[arg(long)]
    pub auto_calibrate: bool,

    /// Generate shell completion.
    #[arg(long, value_enum)]
    pub completion: Option<clap_complete::Shell>,
}

impl AppConfig {
    /// Parse CLI arguments.
    #[must_use]
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse the timeout string into a Duration.
    #[must_use]
    pub fn timeout_duration(&self) -> std::time::Duration {
        parse_duration(&self.timeout).unwrap_or(std::time::Duration::from_secs(300))
    }
}

/// Parse a duration string like "5m", "1h", "30s".
fn parse_duration(s: &str) -> Option<std::time::Duration> {
    let s = s.trim();
    if let Some(mins) = s.strip_suffix('m') {
        let n: u64 = mins.parse().ok()?;
        Some(std::time::Duration::from_secs(n * 60))
    } else if let Some(hours) = s.strip_suffix('h') {
        let n: u64 = hours.parse().ok()?;
        Some(std::time::Duration::from_secs(n * 3600))
    } else if let Some(ms) = s.strip_suffix("ms") {
        let n: u64 = ms.parse().ok()?;
        Some(std::time::Duration::from_millis(n))
    } else if let Some(secs) = s.strip_suffix('s') {
        let n: u64 = secs.parse().ok()?;
        Some(std::time::Duration::from_secs(n))
    } else {
        let n: u64 = s.parse().ok()?;
        Some(std::time::Duration::from_secs(n))
    }
}
