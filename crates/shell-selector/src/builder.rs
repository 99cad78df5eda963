//! Selector configuration
//!
//! # Example
//!
//! ```
//! use shell_selector::{parameters, DataSelector};
//!
//! let site = DataSelector::<(), String>::builder()
//!     .name("site")
//!     .parameter_key("env")
//!     .execute(|_, env| format!("https://{}.example", env.unwrap_or("dev")))
//!     .build()
//!     .unwrap();
//!
//! let url = site.get(&parameters([("env", "prod")])).unwrap();
//! assert_eq!(*url, "https://prod.example");
//! ```

use crate::error::SelectorError;
use crate::parameters::Parameters;
use crate::selector::{DataSelector, ExecuteFn, InitFn, InvalidationCheck, SelectorNode};
use std::sync::Arc;
use tracing::warn;

/// Fluent builder for [`DataSelector`].
///
/// Only the execute function is required. The invalidation predicate defaults
/// to always invalidating.
pub struct SelectorBuilder<P, T> {
    name: Option<String>,
    parent: Option<Arc<dyn SelectorNode<P>>>,
    parameter_key: Option<String>,
    init: Option<InitFn>,
    execute: Option<ExecuteFn<P, T>>,
    check_invalidation: Option<InvalidationCheck>,
}

impl<P, T> Default for SelectorBuilder<P, T> {
    fn default() -> Self {
        Self {
            name: None,
            parent: None,
            parameter_key: None,
            init: None,
            execute: None,
            check_invalidation: None,
        }
    }
}

impl<P, T> SelectorBuilder<P, T>
where
    P: 'static,
    T: Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Name used in logs and errors.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Selector whose value feeds the execute function.
    #[must_use]
    pub fn parent(mut self, parent: Arc<dyn SelectorNode<P>>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Partition the cache by the value of this parameter.
    #[must_use]
    pub fn parameter_key(mut self, key: impl Into<String>) -> Self {
        self.parameter_key = Some(key.into());
        self
    }

    /// Run once, before the first value is read.
    #[must_use]
    pub fn init(mut self, init: impl Fn() + Send + Sync + 'static) -> Self {
        self.init = Some(Box::new(init));
        self
    }

    /// Compute the value from the parent value and the parameter value.
    #[must_use]
    pub fn execute(
        mut self,
        execute: impl Fn(Option<&P>, Option<&str>) -> T + Send + Sync + 'static,
    ) -> Self {
        self.execute = Some(Box::new(execute));
        self
    }

    /// Decide whether a parent notification clears this selector's cache.
    #[must_use]
    pub fn check_invalidation(
        mut self,
        check: impl Fn(Option<&Parameters>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.check_invalidation = Some(Box::new(check));
        self
    }

    /// Build the selector and register it with its parent.
    ///
    /// # Errors
    ///
    /// - `SelectorError::MissingExecute` without an execute function
    /// - `SelectorError::DuplicateParameterKey` if the parameter key is already
    ///   declared on the parent chain
    pub fn build(self) -> Result<Arc<DataSelector<P, T>>, SelectorError> {
        let label = self.name.clone().unwrap_or_else(|| "<anonymous>".to_string());

        let Some(execute) = self.execute else {
            return Err(SelectorError::MissingExecute { selector: label });
        };

        if let (Some(key), Some(parent)) = (&self.parameter_key, &self.parent) {
            if parent.parameter_keys().contains(key) {
                warn!(selector = %label, key = %key, "Parameter key collides with parent chain");
                return Err(SelectorError::DuplicateParameterKey {
                    selector: label,
                    key: key.clone(),
                });
            }
        }

        let check_invalidation = self
            .check_invalidation
            .unwrap_or_else(|| Box::new(|_: Option<&Parameters>| true));

        Ok(DataSelector::from_builder(
            self.name,
            self.parent,
            self.parameter_key,
            self.init,
            execute,
            check_invalidation,
        ))
    }
}
