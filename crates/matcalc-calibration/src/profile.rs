//! Calibration profile (serializable).

use serde::{Deserialize, Serialize};

use matcalc_core::constants::{DEFAULT_BASE_THRESHOLD, DEFAULT_PARALLEL_THRESHOLD};

/// Current profile format version.
pub const PROFILE_VERSION: u32 = 1;

/// Calibration profile containing measured thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationProfile {
    /// Profile format version for compatibility checking.
    pub version: u32,
    /// Measured base-case threshold (naive/Strassen crossover).
    pub base_threshold: usize,
    /// Measured parallel fan-out cutoff.
    pub parallel_threshold: usize,
    /// CPU model used for calibration.
    pub cpu_model: String,
    /// Number of CPU cores.
    pub num_cores: usize,
    /// CPU fingerprint for invalidation.
    pub cpu_fingerprint: String,
    /// Calibration timestamp.
    pub timestamp: String,
}

impl Default for CalibrationProfile {
    fn default() -> Self {
        Self {
            version: PROFILE_VERSION,
            base_threshold: DEFAULT_BASE_THRESHOLD,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            cpu_model: String::new(),
            num_cores: num_cpus(),
            cpu_fingerprint: String::new(),
            timestamp: String::new(),
        }
    }
}

impl CalibrationProfile {
    /// Check if this profile is compatible with the current version.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.version == PROFILE_VERSION
    }

    /// Check if this profile matches the current CPU.
    #[must_use]
    pub fn matches_cpu(&self, current_fingerprint: &str) -> bool {
        if self.cpu_fingerprint.is_empty() || current_fingerprint.is_empty() {
            return true; // can't verify, assume compatible
        }
        self.cpu_fingerprint == current_fingerprint
    }

    /// Validate that thresholds are within reasonable bounds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.base_threshold >= 1
            && self.parallel_threshold >= 1
            && self.parallel_threshold >= self.base_threshold
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(4)
}

/// Get a CPU fingerprint based on core count.
#[must_use]
pub fn cpu_fingerprint() -> String {
    let cores = num_cpus();
    format!("cores={cores}")
}

/// Get the current CPU model string.
#[must_use]
pub fn cpu_model() -> String {
    use sysinfo::System;
    let sys = System::new_all();
    sys.cpus()
        .first()
        .map(|cpu| cpu.brand().to_string())
        .unwrap_or_default()
}

/// Get the current timestamp.
#[must_use]
pub fn current_timestamp() -> String {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format!("unix:{}", dur.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_serialization() {
        let profile = CalibrationProfile::default();
        let json = serde_json::to_string_pretty(&profile).unwrap();
        let deserialized: CalibrationProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.base_threshold, profile.base_threshold);
        assert_eq!(deserialized.version, PROFILE_VERSION);
    }

    #[test]
    fn profile_compatibility() {
        let profile = CalibrationProfile::default();
        assert!(profile.is_compatible());

        let old = CalibrationProfile {
            version: 0,
            ..Default::default()
        };
        assert!(!old.is_compatible());
    }

    #[test]
    fn profile_cpu_match() {
        let mut profile = CalibrationProfile {
            cpu_fingerprint: "cores=8".to_string(),
            ..Default::default()
        };
        assert!(profile.matches_cpu("cores=8"));
        assert!(!profile.matches_cpu("cores=4"));
        // Empty fingerprint should match anything
        profile.cpu_fingerprint = String::new();
        assert!(profile.matches_cpu("cores=8"));
    }

    #[test]
    fn profile_validation() {
        let profile = CalibrationProfile::default();
        assert!(profile.is_valid());

        let bad = CalibrationProfile {
            base_threshold: 0,
            ..Default::default()
        };
        assert!(!bad.is_valid());

        let inverted = CalibrationProfile {
            base_threshold: 128,
            parallel_threshold: 64,
            ..Default::default()
        };
        assert!(!inverted.is_valid());
    }

    #[test]
    fn cpu_fingerprint_nonempty() {
        let fp = cpu_fingerprint();
        assert!(fp.starts_with("cores="));
    }

    #[test]
    fn current_timestamp_nonempty() {
        let ts = current_timestamp();
        assert!(ts.starts_with("unix:"));
    }
}
