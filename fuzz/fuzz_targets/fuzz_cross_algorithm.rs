#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

use matcalc_core::buffer::Matrix;
use matcalc_core::elementwise::SerialElementwise;
use matcalc_core::multiplier::CoreMultiplier;
use matcalc_core::naive::NaiveCore;
use matcalc_core::observers::NoOpObserver;
use matcalc_core::options::Options;
use matcalc_core::parallel::ParallelStrassenCore;
use matcalc_core::progress::CancellationToken;
use matcalc_core::strassen::StrassenCore;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    // Power-of-two dimension so every algorithm accepts the input.
    let n = 1usize << (data[0] % 5); // 1..=16
    let fill = |offset: usize| -> Vec<f64> {
        (0..n * n)
            .map(|i| f64::from(i16::from(data[(offset + i) % data.len()]) - 128))
            .collect()
    };

    let a = Matrix::from_vec(n, fill(1)).unwrap();
    let b = Matrix::from_vec(n, fill(3)).unwrap();

    let cancel = CancellationToken::new();
    let observer = NoOpObserver::new();
    let opts = Options {
        base_threshold: 2,
        parallel_threshold: 4,
        ..Default::default()
    };

    let naive = NaiveCore::new()
        .multiply_core(&cancel, &observer, 0, &a, &b, &opts)
        .unwrap();
    let strassen = StrassenCore::new(Arc::new(SerialElementwise::new()))
        .multiply_core(&cancel, &observer, 0, &a, &b, &opts)
        .unwrap();
    let parallel = ParallelStrassenCore::new(Arc::new(SerialElementwise::new()))
        .multiply_core(&cancel, &observer, 0, &a, &b, &opts)
        .unwrap();

    // Integer-valued inputs: all three must agree exactly.
    assert_eq!(naive, strassen);
    assert_eq!(strassen, parallel);
});
