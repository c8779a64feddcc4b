//! Core orchestration: parallel execution, deadlines, and result analysis.
//!
//! The multiplication algorithms carry no timeout of their own; the
//! orchestrator imposes the deadline externally. A watchdog thread trips
//! the shared cancellation token once the deadline elapses, the recursion
//! unwinds, and the resulting `Cancelled` outcomes surface as `Timeout`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use matcalc_core::buffer::Matrix;
use matcalc_core::constants::COMPARISON_TOLERANCE;
use matcalc_core::multiplier::{MatError, Multiplier};
use matcalc_core::observer::ProgressObserver;
use matcalc_core::observers::NoOpObserver;
use matcalc_core::options::Options;
use matcalc_core::progress::CancellationToken;

use crate::interfaces::MultiplyResult;

/// Execute the multiplication with all given multipliers.
pub fn execute_multiplications(
    multipliers: &[Arc<dyn Multiplier>],
    a: &Matrix,
    b: &Matrix,
    opts: &Options,
    cancel: &CancellationToken,
    timeout: Option<Duration>,
) -> Vec<MultiplyResult> {
    execute_multiplications_with_observer(
        multipliers,
        a,
        b,
        opts,
        cancel,
        timeout,
        &NoOpObserver::new(),
    )
}

/// Execute the multiplication with all given multipliers and a progress
/// observer.
pub fn execute_multiplications_with_observer(
    multipliers: &[Arc<dyn Multiplier>],
    a: &Matrix,
    b: &Matrix,
    opts: &Options,
    cancel: &CancellationToken,
    timeout: Option<Duration>,
    observer: &dyn ProgressObserver,
) -> Vec<MultiplyResult> {
    // Deadline watchdog: cancels in-flight work when the timeout elapses.
    let timed_out = Arc::new(AtomicBool::new(false));
    let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
    let watchdog = timeout.map(|limit| {
        let cancel = cancel.clone();
        let timed_out = Arc::clone(&timed_out);
        std::thread::spawn(move || {
            if matches!(
                done_rx.recv_timeout(limit),
                Err(crossbeam_channel::RecvTimeoutError::Timeout)
            ) {
                tracing::warn!(?limit, "deadline elapsed, cancelling in-flight work");
                timed_out.store(true, Ordering::Relaxed);
                cancel.cancel();
            }
        })
    });

    let run_one = |index: usize, calc: &Arc<dyn Multiplier>| -> MultiplyResult {
        let start = Instant::now();
        let outcome = calc.multiply(cancel, observer, index, a, b, opts);
        MultiplyResult {
            algorithm: calc.name().to_string(),
            outcome,
            duration: start.elapsed(),
        }
    };

    let mut results: Vec<MultiplyResult> = if multipliers.len() == 1 {
        // Single multiplier: run directly
        vec![run_one(0, &multipliers[0])]
    } else {
        // Multiple multipliers: run in parallel using rayon
        use rayon::iter::{IntoParallelIterator, ParallelIterator};

        multipliers
            .iter()
            .enumerate()
            .collect::<Vec<_>>()
            .into_par_iter()
            .map(|(index, calc)| run_one(index, calc))
            .collect()
    };

    let _ = done_tx.send(());
    if let Some(handle) = watchdog {
        let _ = handle.join();
    }

    // Cancellations caused by the watchdog are deadline expiries.
    if timed_out.load(Ordering::Relaxed) {
        let limit = timeout.unwrap_or_default();
        for result in &mut results {
            if matches!(result.outcome, Err(MatError::Cancelled)) {
                result.outcome = Err(MatError::Timeout(format!("{}s", limit.as_secs())));
            }
        }
    }

    results
}

/// Cross-check all successful outcomes against each other.
///
/// Uses a relative tolerance: Strassen reassociates additions, so float
/// results may differ from the direct kernel in low-order bits.
pub fn analyze_comparison_results(results: &[MultiplyResult]) -> Result<(), MatError> {
    let valid: Vec<(&str, &Matrix)> = results
        .iter()
        .filter_map(|r| {
            r.outcome
                .as_ref()
                .ok()
                .map(|m| (r.algorithm.as_str(), m))
        })
        .collect();

    if valid.is_empty() {
        return Err(MatError::Calculation("no valid results to compare".into()));
    }

    let (reference_name, reference) = valid[0];
    let scale = reference.max_abs().max(1.0);
    for &(name, matrix) in &valid[1..] {
        match reference.max_abs_diff(matrix) {
            None => {
                return Err(MatError::Dimension(format!(
                    "{reference_name} and {name} produced different dimensions"
                )));
            }
            Some(diff) if diff > COMPARISON_TOLERANCE * scale => {
                tracing::warn!(
                    reference = reference_name,
                    candidate = name,
                    diff,
                    "algorithm outputs diverge"
                );
                return Err(MatError::Mismatch);
            }
            Some(_) => {}
        }
    }

    Ok(())
}
