//! Multiplier selection logic.

use std::sync::Arc;

use matcalc_core::multiplier::{MatError, Multiplier};
use matcalc_core::registry::MultiplierFactory;

/// Get multipliers to run based on algorithm selection.
pub fn get_multipliers_to_run(
    algo: &str,
    factory: &dyn MultiplierFactory,
) -> Result<Vec<Arc<dyn Multiplier>>, MatError> {
    match algo {
        "all" => {
            let names = factory.available();
            let mut calcs = Vec::new();
            for name in names {
                calcs.push(factory.get(name)?);
            }
            Ok(calcs)
        }
        name => {
            let calc = factory.get(name)?;
            Ok(vec![calc])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matcalc_core::registry::DefaultFactory;

    #[test]
    fn select_all() {
        let factory = DefaultFactory::new();
        let calcs = get_multipliers_to_run("all", &factory).unwrap();
        assert_eq!(calcs.len(), 3);
    }

    #[test]
    fn select_single() {
        let factory = DefaultFactory::new();
        let calcs = get_multipliers_to_run("parallel", &factory).unwrap();
        assert_eq!(calcs.len(), 1);
        assert_eq!(calcs[0].name(), "ParallelStrassen");
    }

    #[test]
    fn select_unknown() {
        let factory = DefaultFactory::new();
        let result = get_multipliers_to_run("unknown", &factory);
        assert!(result.is_err());
    }
}
