//! Multiplier factory and registry.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::elementwise::{ElementwiseEngine, SerialElementwise};
use crate::multiplier::{MatError, MatMultiplier, Multiplier};
use crate::naive::NaiveCore;
use crate::parallel::ParallelStrassenCore;
use crate::strassen::StrassenCore;

/// Factory trait for creating multipliers.
pub trait MultiplierFactory: Send + Sync {
    /// Get or create a multiplier by name.
    fn get(&self, name: &str) -> Result<Arc<dyn Multiplier>, MatError>;

    /// List all available multiplier names.
    fn available(&self) -> Vec<&str>;
}

/// Default factory with lazy creation and cache.
///
/// The elementwise engine is chosen once at construction and injected into
/// every Strassen core the factory builds.
pub struct DefaultFactory {
    engine: Arc<dyn ElementwiseEngine>,
    cache: RwLock<HashMap<String, Arc<dyn Multiplier>>>,
}

impl DefaultFactory {
    /// Create a factory backed by the serial elementwise engine.
    #[must_use]
    pub fn new() -> Self {
        Self::with_engine(Arc::new(SerialElementwise::new()))
    }

    /// Create a factory backed by the given elementwise engine.
    #[must_use]
    pub fn with_engine(engine: Arc<dyn ElementwiseEngine>) -> Self {
        Self {
            engine,
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn create_multiplier(&self, name: &str) -> Result<Arc<dyn Multiplier>, MatError> {
        match name {
            "naive" => Ok(Arc::new(MatMultiplier::new(Arc::new(NaiveCore::new())))),
            "strassen" => {
                let core = Arc::new(StrassenCore::new(Arc::clone(&self.engine)));
                Ok(Arc::new(MatMultiplier::new(core)))
            }
            "parallel" => {
                let core = Arc::new(ParallelStrassenCore::new(Arc::clone(&self.engine)));
                Ok(Arc::new(MatMultiplier::new(core)))
            }
            _ => Err(MatError::Config(format!("unknown multiplier: {name}"))),
        }
    }
}

impl Default for DefaultFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiplierFactory for DefaultFactory {
    fn get(&self, name: &str) -> Result<Arc<dyn Multiplier>, MatError> {
        // Check cache first
        if let Some(calc) = self.cache.read().get(name) {
            return Ok(Arc::clone(calc));
        }

        // Create and cache
        let calc = self.create_multiplier(name)?;
        self.cache
            .write()
            .insert(name.to_string(), Arc::clone(&calc));
        Ok(calc)
    }

    fn available(&self) -> Vec<&str> {
        vec!["naive", "strassen", "parallel"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elementwise::ParallelElementwise;

    #[test]
    fn factory_creates_naive() {
        let factory = DefaultFactory::new();
        let calc = factory.get("naive");
        assert!(calc.is_ok());
        assert_eq!(calc.unwrap().name(), "Naive");
    }

    #[test]
    fn factory_creates_strassen() {
        let factory = DefaultFactory::new();
        let calc = factory.get("strassen");
        assert!(calc.is_ok());
        assert_eq!(calc.unwrap().name(), "Strassen");
    }

    #[test]
    fn factory_creates_parallel() {
        let factory = DefaultFactory::new();
        let calc = factory.get("parallel");
        assert!(calc.is_ok());
        assert_eq!(calc.unwrap().name(), "ParallelStrassen");
    }

    #[test]
    fn factory_caches() {
        let factory = DefaultFactory::new();
        let first = factory.get("strassen").unwrap();
        let second = factory.get("strassen").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn factory_unknown_name() {
        let factory = DefaultFactory::new();
        assert!(matches!(
            factory.get("nonexistent"),
            Err(MatError::Config(_))
        ));
    }

    #[test]
    fn factory_available() {
        let factory = DefaultFactory::new();
        let available = factory.available();
        assert!(available.contains(&"naive"));
        assert!(available.contains(&"strassen"));
        assert!(available.contains(&"parallel"));
    }

    #[test]
    fn factory_accepts_custom_engine() {
        let factory = DefaultFactory::with_engine(Arc::new(ParallelElementwise::new(64)));
        assert!(factory.get("strassen").is_ok());
    }
}
