//! CLI output formatting.

use std::io::{self, Write};
use std::time::Duration;

use matcalc_core::buffer::Matrix;

/// Dimension up to which matrices print in full by default.
const FULL_PRINT_LIMIT: usize = 8;

/// Rows/columns of the corner preview for large matrices.
const PREVIEW_BLOCK: usize = 4;

/// Format a matrix for display.
///
/// Small matrices (and any matrix in verbose mode) print in full; larger
/// ones show their top-left corner block.
#[must_use]
pub fn format_matrix(m: &Matrix, verbose: bool) -> String {
    let n = m.dim();
    if verbose || n <= FULL_PRINT_LIMIT {
        return format_block(m, n);
    }
    let mut s = format_block(m, PREVIEW_BLOCK);
    s.push_str(&format!(
        "(showing {PREVIEW_BLOCK}x{PREVIEW_BLOCK} of {n}x{n})\n"
    ));
    s
}

fn format_block(m: &Matrix, rows: usize) -> String {
    let mut s = String::new();
    for i in 0..rows {
        s.push('[');
        for j in 0..rows {
            if j > 0 {
                s.push(' ');
            }
            s.push_str(&format!("{:10.3}", m.get(i, j)));
        }
        s.push_str("]\n");
    }
    s
}

/// Format elapsed time as milliseconds.
#[must_use]
pub fn format_millis(d: Duration) -> String {
    format!("{:.3}", d.as_secs_f64() * 1000.0)
}

/// Format a duration for human display.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 0.001 {
        format!("{:.2}µs", secs * 1_000_000.0)
    } else if secs < 1.0 {
        format!("{:.2}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.3}s")
    } else {
        let mins = (secs / 60.0).floor() as u64;
        let remaining = secs - (mins as f64 * 60.0);
        format!("{mins}m{remaining:.1}s")
    }
}

/// Format a number with thousand separators.
#[must_use]
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

/// Write a result matrix to a file, one whitespace-separated row per line.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be created or written.
pub fn write_to_file(path: &str, m: &Matrix) -> io::Result<()> {
    let n = m.dim();
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    for row in m.as_slice().chunks(n) {
        let mut first = true;
        for value in row {
            if !first {
                write!(file, " ")?;
            }
            write!(file, "{value}")?;
            first = false;
        }
        writeln!(file)?;
    }
    file.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_micro() {
        let s = format_duration(Duration::from_nanos(500));
        assert!(s.contains("µs"));
    }

    #[test]
    fn format_duration_milli() {
        let s = format_duration(Duration::from_millis(42));
        assert!(s.contains("ms"));
    }

    #[test]
    fn format_duration_seconds() {
        let s = format_duration(Duration::from_secs_f64(3.14));
        assert!(s.contains('s'));
    }

    #[test]
    fn format_duration_minutes() {
        let s = format_duration(Duration::from_secs(90));
        assert!(s.contains('m'));
    }

    #[test]
    fn format_millis_values() {
        assert_eq!(format_millis(Duration::from_millis(5)), "5.000");
        assert_eq!(format_millis(Duration::from_micros(1500)), "1.500");
    }

    #[test]
    fn format_number_thousands() {
        assert_eq!(format_number(1_000_000), "1,000,000");
        assert_eq!(format_number(42), "42");
        assert_eq!(format_number(1234), "1,234");
    }

    #[test]
    fn small_matrix_prints_in_full() {
        let m = Matrix::identity(2).unwrap();
        let s = format_matrix(&m, false);
        assert_eq!(s.lines().count(), 2);
        assert!(s.contains("1.000"));
    }

    #[test]
    fn large_matrix_prints_preview() {
        let m = Matrix::zeros(32).unwrap();
        let s = format_matrix(&m, false);
        assert!(s.contains("showing 4x4 of 32x32"));
        assert_eq!(s.lines().count(), 5);
    }

    #[test]
    fn verbose_prints_large_matrix_in_full() {
        let m = Matrix::zeros(16).unwrap();
        let s = format_matrix(&m, true);
        assert_eq!(s.lines().count(), 16);
    }

    #[test]
    fn write_to_file_rows() {
        let dir = std::env::temp_dir().join("matcalc-output-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("result.txt");
        let m = Matrix::from_vec(2, vec![1.0, 2.0, 3.0, 4.0]).unwrap();
        write_to_file(path.to_str().unwrap(), &m).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "1 2\n3 4\n");
        std::fs::remove_file(&path).ok();
    }
}
