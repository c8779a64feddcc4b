//! Calibration engine.

use matcalc_core::constants::{DEFAULT_BASE_THRESHOLD, DEFAULT_PARALLEL_THRESHOLD};

use crate::microbench;
use crate::profile::{self, CalibrationProfile};

/// Minimum fan-out speedup before parallelism is considered worthwhile.
const PARALLEL_SPEEDUP_GATE: f64 = 1.1;

/// Mode of calibration.
#[derive(Debug, Clone, Copy)]
pub enum CalibrationMode {
    /// Full calibration: benchmark the complete size ladder.
    Full,
    /// Auto calibration: quick pass over a reduced ladder.
    Auto,
    /// Cached: load from the saved profile file.
    Cached,
}

/// Progress callback for calibration.
pub type ProgressCallback = Box<dyn Fn(CalibrationProgress) + Send>;

/// Progress information during calibration.
#[derive(Debug, Clone)]
pub struct CalibrationProgress {
    /// Current step name.
    pub step: String,
    /// Current step number (1-based).
    pub current: usize,
    /// Total number of steps.
    pub total: usize,
}

/// Calibration engine that measures machine-specific thresholds.
pub struct CalibrationEngine {
    mode: CalibrationMode,
    progress_cb: Option<ProgressCallback>,
}

impl CalibrationEngine {
    /// Create a new calibration engine.
    #[must_use]
    pub fn new(mode: CalibrationMode) -> Self {
        Self {
            mode,
            progress_cb: None,
        }
    }

    /// Set a progress callback.
    #[must_use]
    pub fn with_progress(mut self, cb: ProgressCallback) -> Self {
        self.progress_cb = Some(cb);
        self
    }

    /// Run calibration and produce a profile.
    #[must_use]
    pub fn calibrate(&self) -> CalibrationProfile {
        match self.mode {
            CalibrationMode::Full => self.measure(&[16, 32, 64, 128], &[64, 128, 256]),
            CalibrationMode::Auto => self.measure(&[16, 32, 64], &[64, 128]),
            CalibrationMode::Cached => self.load_cached(),
        }
    }

    fn report_progress(&self, step: &str, current: usize, total: usize) {
        if let Some(cb) = &self.progress_cb {
            cb(CalibrationProgress {
                step: step.to_string(),
                current,
                total,
            });
        }
    }

    fn measure(&self, crossover_sizes: &[usize], parallel_sizes: &[usize]) -> CalibrationProfile {
        let total_steps = 3;

        // Step 1: locate the naive/Strassen crossover. The threshold is the
        // largest size where the direct kernel still wins.
        self.report_progress("Benchmarking naive/Strassen crossover", 1, total_steps);
        let crossovers = microbench::find_crossover(crossover_sizes);
        let base_threshold = crossovers
            .iter()
            .take_while(|c| !c.strassen_is_faster)
            .last()
            .map_or(DEFAULT_BASE_THRESHOLD, |c| c.size);
        tracing::info!(base_threshold, "crossover located");

        // Step 2: find the smallest size where fan-out pays for itself.
        self.report_progress("Measuring parallel fan-out overhead", 2, total_steps);
        let mut parallel_threshold = DEFAULT_PARALLEL_THRESHOLD;
        for &n in parallel_sizes {
            let overhead = microbench::measure_parallel_overhead(n);
            if overhead.speedup > PARALLEL_SPEEDUP_GATE {
                parallel_threshold = n;
                break;
            }
        }
        let parallel_threshold = parallel_threshold.max(base_threshold);

        // Step 3: assemble the profile.
        self.report_progress("Building profile", 3, total_steps);
        CalibrationProfile {
            version: profile::PROFILE_VERSION,
            base_threshold,
            parallel_threshold,
            cpu_model: profile::cpu_model(),
            num_cores: std::thread::available_parallelism()
                .map(std::num::NonZero::get)
                .unwrap_or(4),
            cpu_fingerprint: profile::cpu_fingerprint(),
            timestamp: profile::current_timestamp(),
        }
    }

    fn load_cached(&self) -> CalibrationProfile {
        match crate::io::load_profile() {
            Some(p) if p.is_compatible() && p.is_valid() => {
                let current_fp = profile::cpu_fingerprint();
                if p.matches_cpu(&current_fp) {
                    p
                } else {
                    tracing::warn!("cached profile CPU mismatch, using defaults");
                    CalibrationProfile::default()
                }
            }
            Some(_) => {
                tracing::warn!("cached profile incompatible or invalid, using defaults");
                CalibrationProfile::default()
            }
            None => CalibrationProfile::default(),
        }
    }
}
