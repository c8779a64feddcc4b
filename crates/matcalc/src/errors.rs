//! Error-to-exit-code mapping.

use matcalc_core::constants::exit_codes;
use matcalc_core::multiplier::MatError;

/// Map a core error to the process exit code.
pub fn exit_code(err: &MatError) -> i32 {
    match err {
        MatError::Dimension(_)
        | MatError::Allocation(_)
        | MatError::InvalidInput(_)
        | MatError::Calculation(_) => exit_codes::ERROR_GENERIC,
        MatError::Config(_) => exit_codes::ERROR_CONFIG,
        MatError::Cancelled => exit_codes::ERROR_CANCELED,
        MatError::Timeout(_) => exit_codes::ERROR_TIMEOUT,
        MatError::Mismatch => exit_codes::ERROR_MISMATCH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes() {
        assert_eq!(exit_code(&MatError::Cancelled), 130);
        assert_eq!(exit_code(&MatError::Timeout("30s".into())), 2);
        assert_eq!(exit_code(&MatError::Mismatch), 3);
        assert_eq!(exit_code(&MatError::Config("bad".into())), 4);
        assert_eq!(exit_code(&MatError::InvalidInput("size 0".into())), 1);
        assert_eq!(exit_code(&MatError::Dimension("6".into())), 1);
    }
}
