//! Application entry point and dispatch.

use std::sync::Arc;

use matcalc_cli::output::write_to_file;
use matcalc_cli::presenter::CLIResultPresenter;
use matcalc_core::elementwise::{ElementwiseEngine, ParallelElementwise, SerialElementwise};
use matcalc_core::memory_budget::{parse_memory_limit, MemoryEstimate};
use matcalc_core::multiplier::MatError;
use matcalc_core::observers::LoggingObserver;
use matcalc_core::options::Options;
use matcalc_core::progress::CancellationToken;
use matcalc_core::registry::DefaultFactory;
use matcalc_orchestration::interfaces::ResultPresenter;
use matcalc_orchestration::orchestrator::{
    analyze_comparison_results, execute_multiplications, execute_multiplications_with_observer,
};
use matcalc_orchestration::selection::get_multipliers_to_run;

use crate::config::AppConfig;
use crate::generator;

/// Run the application.
pub fn run(config: &AppConfig) -> Result<(), MatError> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        matcalc_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(());
    }

    // Handle calibration
    if config.calibrate || config.auto_calibrate {
        return run_calibration(config);
    }

    run_cli(config)
}

fn build_options(config: &AppConfig) -> Result<Options, MatError> {
    let mut opts = Options {
        base_threshold: config.base_threshold,
        parallel_threshold: config.parallel_threshold,
        memory_limit: parse_memory_limit(&config.memory_limit).map_err(MatError::Config)?,
        verbose: config.verbose,
        details: config.details,
    };

    // Unset thresholds: prefer a calibrated profile over compiled defaults.
    if opts.base_threshold == 0 || opts.parallel_threshold == 0 {
        if let Some(profile) = matcalc_calibration::io::load_validated_profile() {
            tracing::info!(
                base = profile.base_threshold,
                parallel = profile.parallel_threshold,
                "using calibrated thresholds"
            );
            if opts.base_threshold == 0 {
                opts.base_threshold = profile.base_threshold;
            }
            if opts.parallel_threshold == 0 {
                opts.parallel_threshold = profile.parallel_threshold;
            }
        }
    }

    Ok(opts.normalize())
}

fn select_engine(name: &str) -> Result<Arc<dyn ElementwiseEngine>, MatError> {
    match name {
        "serial" => Ok(Arc::new(SerialElementwise::new())),
        "parallel" => Ok(Arc::new(ParallelElementwise::default())),
        _ => Err(MatError::Config(format!("unknown elementwise engine: {name}"))),
    }
}

fn run_cli(config: &AppConfig) -> Result<(), MatError> {
    if config.size == 0 {
        return Err(MatError::InvalidInput(
            "matrix size must be positive".into(),
        ));
    }

    let opts = build_options(config)?;

    // Memory budget check
    let estimate = MemoryEstimate::estimate(config.size);
    if !estimate.fits_in(opts.memory_limit) {
        return Err(MatError::Config(format!(
            "estimated memory ({} MB) exceeds limit ({} MB)",
            estimate.total_bytes / (1024 * 1024),
            opts.memory_limit / (1024 * 1024)
        )));
    }

    let engine = select_engine(&config.engine)?;
    let factory = DefaultFactory::with_engine(engine);
    let multipliers = get_multipliers_to_run(&config.algo, &factory)?;

    let mut rng = generator::seeded_rng(config.seed);
    let a = generator::random_matrix(config.size, &mut rng)?;
    let b = generator::random_matrix(config.size, &mut rng)?;

    let cancel = CancellationToken::new();
    ctrlc_handler(cancel.clone());
    let timeout = Some(config.timeout_duration());

    let results = if config.verbose {
        let observer = LoggingObserver::new();
        execute_multiplications_with_observer(
            &multipliers,
            &a,
            &b,
            &opts,
            &cancel,
            timeout,
            &observer,
        )
    } else {
        execute_multiplications(&multipliers, &a, &b, &opts, &cancel, timeout)
    };

    // Present results
    let presenter = CLIResultPresenter::new(config.verbose, config.quiet);
    for result in &results {
        match &result.outcome {
            Ok(value) => presenter.present_result(
                &result.algorithm,
                config.size,
                value,
                result.duration,
                config.details,
            ),
            Err(error) => presenter.present_error(&format!("{}: {error}", result.algorithm)),
        }
    }
    if results.len() > 1 {
        presenter.present_comparison(&results);
    }

    // Write to file if requested
    if let Some(path) = &config.output {
        if let Some(value) = results.iter().find_map(|r| r.outcome.as_ref().ok()) {
            write_to_file(path, value)
                .map_err(|e| MatError::Calculation(format!("cannot write {path}: {e}")))?;
        }
    }

    // Cross-validate before declaring success.
    let had_failure = results.iter().any(|r| r.outcome.is_err());
    if !had_failure && results.len() > 1 {
        analyze_comparison_results(&results)?;
    }

    // Propagate the first failure so the process exits nonzero.
    for result in results {
        let _ = result.outcome?;
    }
    Ok(())
}

fn run_calibration(config: &AppConfig) -> Result<(), MatError> {
    use matcalc_calibration::calibration::{CalibrationEngine, CalibrationMode};

    let mode = if config.calibrate {
        CalibrationMode::Full
    } else {
        CalibrationMode::Auto
    };

    let engine = CalibrationEngine::new(mode);
    let profile = engine.calibrate();

    if !config.quiet {
        println!("Calibration complete:");
        println!("  Base-case threshold: {}", profile.base_threshold);
        println!("  Parallel cutoff: {}", profile.parallel_threshold);
    }

    matcalc_calibration::io::save_profile(&profile)
        .map_err(|e| MatError::Calculation(format!("cannot save calibration profile: {e}")))?;
    Ok(())
}

fn ctrlc_handler(cancel: CancellationToken) {
    ctrlc::set_handler(move || {
        cancel.cancel();
    })
    .expect("Error setting Ctrl+C handler");
}
