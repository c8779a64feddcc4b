#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use matcalc_core::buffer::Matrix;
use matcalc_core::elementwise::SerialElementwise;
use matcalc_core::multiplier::{MatMultiplier, Multiplier};
use matcalc_core::observers::NoOpObserver;
use matcalc_core::options::Options;
use matcalc_core::progress::CancellationToken;
use matcalc_core::strassen::StrassenCore;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // First byte picks the dimension (capped for speed), second the
    // threshold; the rest fills the operands.
    let n = usize::from(data[0] % 32) + 1;
    let threshold = usize::from(data[1] % 8) + 1;
    let fill = |offset: usize| -> Vec<f64> {
        (0..n * n)
            .map(|i| f64::from(data[(offset + i) % data.len()]) - 128.0)
            .collect()
    };

    let a = Matrix::from_vec(n, fill(0)).unwrap();
    let b = Matrix::from_vec(n, fill(7)).unwrap();

    let calc = MatMultiplier::new(Arc::new(StrassenCore::new(Arc::new(
        SerialElementwise::new(),
    ))));
    let cancel = CancellationToken::new();
    let observer = NoOpObserver::new();
    let opts = Options {
        base_threshold: threshold,
        ..Default::default()
    };

    // Should never panic; non-halvable sizes must error cleanly.
    let _ = calc.multiply(&cancel, &observer, 0, &a, &b, &opts);
});
