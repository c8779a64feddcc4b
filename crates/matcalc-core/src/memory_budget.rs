//! Memory budget estimation and validation.

/// Memory estimate for one n×n multiplication.
#[derive(Debug, Clone)]
pub struct MemoryEstimate {
    /// Bytes held by the two operand matrices.
    pub operand_bytes: usize,
    /// Bytes for the result matrix.
    pub result_bytes: usize,
    /// Estimated bytes for recursion temporaries.
    pub temp_bytes: usize,
    /// Total estimated memory.
    pub total_bytes: usize,
}

impl MemoryEstimate {
    /// Estimate memory usage for multiplying two n×n matrices.
    ///
    /// A depth-first path through the recursion holds nine half×half
    /// buffers per live frame; the geometric series over levels sums to
    /// roughly three times the result size.
    #[must_use]
    pub fn estimate(n: usize) -> Self {
        let element = std::mem::size_of::<f64>();
        let result_bytes = n.saturating_mul(n).saturating_mul(element);
        let operand_bytes = result_bytes.saturating_mul(2);
        let temp_bytes = result_bytes.saturating_mul(3);
        Self {
            operand_bytes,
            result_bytes,
            temp_bytes,
            total_bytes: operand_bytes
                .saturating_add(result_bytes)
                .saturating_add(temp_bytes),
        }
    }

    /// Check if the computation fits within the given memory limit.
    ///
    /// A limit of 0 means unlimited.
    #[must_use]
    pub fn fits_in(&self, limit: usize) -> bool {
        limit == 0 || self.total_bytes <= limit
    }
}

/// Parse a memory limit string (e.g., "8G", "512M", "1024K").
///
/// # Errors
///
/// Returns an error string if the format is invalid or the number cannot be
/// parsed. An empty string parses as 0 (unlimited).
pub fn parse_memory_limit(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(0);
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('G') {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('M') {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix('K') {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s, 1)
    };

    let value: usize = num_str
        .trim()
        .parse()
        .map_err(|e| format!("invalid memory limit: {e}"))?;
    Ok(value * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_small() {
        let est = MemoryEstimate::estimate(128);
        assert_eq!(est.result_bytes, 128 * 128 * 8);
        assert_eq!(est.operand_bytes, est.result_bytes * 2);
        assert!(est.total_bytes > est.result_bytes);
    }

    #[test]
    fn estimate_scales_quadratically() {
        let small = MemoryEstimate::estimate(64);
        let large = MemoryEstimate::estimate(128);
        assert_eq!(large.result_bytes, small.result_bytes * 4);
    }

    #[test]
    fn fits_in_unlimited() {
        let est = MemoryEstimate::estimate(4096);
        assert!(est.fits_in(0));
    }

    #[test]
    fn fits_in_bounded() {
        let est = MemoryEstimate::estimate(1024);
        assert!(est.fits_in(est.total_bytes));
        assert!(!est.fits_in(est.total_bytes - 1));
    }

    #[test]
    fn parse_memory_limit_values() {
        assert_eq!(parse_memory_limit("8G").unwrap(), 8 * 1024 * 1024 * 1024);
        assert_eq!(parse_memory_limit("512M").unwrap(), 512 * 1024 * 1024);
        assert_eq!(parse_memory_limit("1024K").unwrap(), 1024 * 1024);
        assert_eq!(parse_memory_limit("64B").unwrap(), 64);
        assert_eq!(parse_memory_limit("").unwrap(), 0);
    }

    #[test]
    fn parse_memory_limit_invalid() {
        assert!(parse_memory_limit("abc").is_err());
        assert!(parse_memory_limit("12Q").is_err());
    }
}
