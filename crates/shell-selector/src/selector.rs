//! # Data Selector
//!
//! A node in a selector tree. Each selector derives its value from its
//! parent's value and an optional parameter, caches the result, and tells its
//! listeners when the cache changes.
//!
//! ## Pull on read, push on invalidate
//!
//! ```text
//!   get(params) ──→ cache hit? ──yes──→ return cached Arc
//!                      │ no
//!                      ▼
//!              parent.get(params) ──→ execute(parent, param) ──→ store ──→ notify
//!
//!   clear_cached_result(params) ──→ clear slot ──→ notify
//!                                                    │
//!                                  child.check_update(params)
//!                                                    │ predicate true
//!                                                    ▼
//!                                           clear slot ──→ notify ──→ ...
//! ```
//!
//! ## Re-entrancy
//!
//! Locks are never held while running user functions, so listeners may call
//! back into any selector. A selector that is asked to notify while it is
//! already notifying on the same thread skips the nested round; this breaks
//! listener cycles such as A clearing B while B clears A.

use crate::error::SelectorError;
use crate::metrics::SelectorMetrics;
use crate::parameters::Parameters;
use crate::SelectorBuilder;
use parking_lot::{Mutex, Once};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Callback invoked when a selector's cache changes. Receives the parameters
/// that caused the change, or `None` for a full clear.
pub type UpdateListener = Arc<dyn Fn(Option<&Parameters>) + Send + Sync>;

pub(crate) type InitFn = Box<dyn Fn() + Send + Sync>;
pub(crate) type ExecuteFn<P, T> = Box<dyn Fn(Option<&P>, Option<&str>) -> T + Send + Sync>;
pub(crate) type InvalidationCheck = Box<dyn Fn(Option<&Parameters>) -> bool + Send + Sync>;

/// Parent-facing view of a selector producing values of type `T`.
pub trait SelectorNode<T>: Send + Sync {
    /// Current value for `parameters`, computing it if needed.
    fn get(&self, parameters: &Parameters) -> Result<Arc<T>, SelectorError>;

    /// Parameter keys declared by this selector and all of its ancestors.
    fn parameter_keys(&self) -> Vec<String>;

    fn add_update_listener(&self, listener: UpdateListener);

    fn remove_update_listener(&self, listener: &UpdateListener);
}

thread_local! {
    static NOTIFYING: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// Marks a selector as notifying on this thread until dropped.
struct NotifyGuard {
    key: usize,
}

impl NotifyGuard {
    fn enter(key: usize) -> Option<Self> {
        NOTIFYING
            .with(|active| active.borrow_mut().insert(key))
            .then_some(Self { key })
    }
}

impl Drop for NotifyGuard {
    fn drop(&mut self) {
        NOTIFYING.with(|active| {
            active.borrow_mut().remove(&self.key);
        });
    }
}

/// Memoized selector deriving `T` from a parent producing `P`.
///
/// Root selectors have no parent; use `()` for `P`.
pub struct DataSelector<P, T> {
    name: Option<String>,
    parent: Option<Arc<dyn SelectorNode<P>>>,
    parameter_key: Option<String>,
    init: Option<InitFn>,
    init_once: Once,
    execute: ExecuteFn<P, T>,
    check_invalidation: InvalidationCheck,
    /// Slot `None` is the single slot of an unparameterized selector.
    cache: Mutex<HashMap<Option<String>, Arc<T>>>,
    listeners: Mutex<Vec<UpdateListener>>,
    /// Listener registered on the parent, kept for teardown.
    parent_listener: Mutex<Option<UpdateListener>>,
    metrics: Arc<SelectorMetrics>,
}

impl<P, T> DataSelector<P, T>
where
    P: 'static,
    T: Send + Sync + 'static,
{
    /// Start configuring a selector.
    #[must_use]
    pub fn builder() -> SelectorBuilder<P, T> {
        SelectorBuilder::new()
    }

    pub(crate) fn from_builder(
        name: Option<String>,
        parent: Option<Arc<dyn SelectorNode<P>>>,
        parameter_key: Option<String>,
        init: Option<InitFn>,
        execute: ExecuteFn<P, T>,
        check_invalidation: InvalidationCheck,
    ) -> Arc<Self> {
        let selector = Arc::new_cyclic(|weak: &std::sync::Weak<Self>| {
            let parent_listener = parent.as_ref().map(|_| {
                let weak = weak.clone();
                let listener: UpdateListener = Arc::new(move |params: Option<&Parameters>| {
                    if let Some(selector) = weak.upgrade() {
                        selector.check_update(params);
                    }
                });
                listener
            });

            Self {
                name,
                parent,
                parameter_key,
                init,
                init_once: Once::new(),
                execute,
                check_invalidation,
                cache: Mutex::new(HashMap::new()),
                listeners: Mutex::new(Vec::new()),
                parent_listener: Mutex::new(parent_listener),
                metrics: Arc::new(SelectorMetrics::new()),
            }
        });

        let listener = selector.parent_listener.lock().clone();
        if let (Some(parent), Some(listener)) = (&selector.parent, listener) {
            parent.add_update_listener(listener);
        }

        debug!(
            selector = %selector.label(),
            parameter_key = ?selector.parameter_key,
            has_parent = selector.parent.is_some(),
            "Selector created"
        );
        selector
    }

    /// Name used in logs and errors.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    #[must_use]
    pub fn parameter_key(&self) -> Option<&str> {
        self.parameter_key.as_deref()
    }

    /// Metrics collector for this selector.
    pub fn metrics(&self) -> Arc<SelectorMetrics> {
        self.metrics.clone()
    }

    /// Current value for `parameters`.
    ///
    /// Runs the init function on first use. A cached value is returned as the
    /// same `Arc` without recomputation or notification. On a miss the
    /// parent is resolved with the same parameters, the execute function runs,
    /// the result is stored and listeners are notified.
    ///
    /// # Errors
    ///
    /// `SelectorError::MissingParameter` if a declared parameter key is absent
    /// here or on the parent chain.
    pub fn get(&self, parameters: &Parameters) -> Result<Arc<T>, SelectorError> {
        self.ensure_initialized();
        let slot = self.slot_for(parameters)?;

        let cached = self.cache.lock().get(&slot).cloned();
        if let Some(value) = cached {
            self.metrics.record_hit();
            trace!(selector = %self.label(), "Cache hit");
            return Ok(value);
        }

        self.metrics.record_miss();
        let parent_value = match &self.parent {
            Some(parent) => Some(parent.get(parameters)?),
            None => None,
        };

        let value = Arc::new((self.execute)(parent_value.as_deref(), slot.as_deref()));
        self.cache.lock().insert(slot, value.clone());
        debug!(selector = %self.label(), "Computed value");

        self.notify(Some(parameters));
        Ok(value)
    }

    /// Whether a value is cached for `parameters`.
    #[must_use]
    pub fn is_cached(&self, parameters: &Parameters) -> bool {
        match self.slot_for(parameters) {
            Ok(slot) => self.cache.lock().contains_key(&slot),
            Err(_) => false,
        }
    }

    /// Number of cached slots.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    /// Clear the slot for the parameter value in `parameters`, or the whole
    /// cache when no key is declared or no value is given, then notify every
    /// listener.
    pub fn clear_cached_result(&self, parameters: Option<&Parameters>) {
        self.clear_cache(parameters);
        self.notify(parameters);
    }

    /// React to a parent's notification.
    ///
    /// If the invalidation predicate accepts `parameters`, the matching slot
    /// is cleared and this selector's own listeners are notified.
    pub fn check_update(&self, parameters: Option<&Parameters>) {
        if !(self.check_invalidation)(parameters) {
            trace!(selector = %self.label(), "Invalidation ignored by predicate");
            return;
        }
        self.clear_cache(parameters);
        self.notify(parameters);
    }

    /// Register a listener. Adding the same `Arc` twice is a no-op.
    pub fn add_update_listener(&self, listener: UpdateListener) {
        let mut listeners = self.listeners.lock();
        if !listeners.iter().any(|l| Arc::ptr_eq(l, &listener)) {
            listeners.push(listener);
        }
    }

    pub fn remove_update_listener(&self, listener: &UpdateListener) {
        self.listeners.lock().retain(|l| !Arc::ptr_eq(l, listener));
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Unregister from the parent. Safe to call more than once; also runs on
    /// drop.
    pub fn destroy(&self) {
        let listener = self.parent_listener.lock().take();
        if let (Some(parent), Some(listener)) = (&self.parent, listener) {
            parent.remove_update_listener(&listener);
            debug!(selector = %self.label(), "Selector detached from parent");
        }
    }

    fn ensure_initialized(&self) {
        self.init_once.call_once(|| {
            if let Some(init) = &self.init {
                debug!(selector = %self.label(), "Running init function");
                init();
            }
        });
    }

    fn slot_for(&self, parameters: &Parameters) -> Result<Option<String>, SelectorError> {
        match &self.parameter_key {
            None => Ok(None),
            Some(key) => parameters.get(key).cloned().map(Some).ok_or_else(|| {
                SelectorError::MissingParameter {
                    selector: self.label().to_string(),
                    key: key.clone(),
                }
            }),
        }
    }

    fn clear_cache(&self, parameters: Option<&Parameters>) {
        let value = match (&self.parameter_key, parameters) {
            (Some(key), Some(params)) => params.get(key),
            _ => None,
        };

        let mut cache = self.cache.lock();
        match value {
            Some(value) => {
                cache.remove(&Some(value.clone()));
            }
            None => cache.clear(),
        }
        drop(cache);

        self.metrics.record_invalidation();
        trace!(selector = %self.label(), partition = ?value, "Cache cleared");
    }

    fn notify(&self, parameters: Option<&Parameters>) {
        let key = self as *const Self as *const () as usize;
        let Some(_guard) = NotifyGuard::enter(key) else {
            self.metrics.record_suppressed();
            debug!(selector = %self.label(), "Nested notification suppressed");
            return;
        };

        let listeners = self.listeners.lock().clone();
        self.metrics.record_notification();
        for listener in &listeners {
            listener(parameters);
        }
    }
}

impl<P, T> SelectorNode<T> for DataSelector<P, T>
where
    P: 'static,
    T: Send + Sync + 'static,
{
    fn get(&self, parameters: &Parameters) -> Result<Arc<T>, SelectorError> {
        DataSelector::get(self, parameters)
    }

    fn parameter_keys(&self) -> Vec<String> {
        let mut keys = self
            .parent
            .as_ref()
            .map(|p| p.parameter_keys())
            .unwrap_or_default();
        keys.extend(self.parameter_key.iter().cloned());
        keys
    }

    fn add_update_listener(&self, listener: UpdateListener) {
        DataSelector::add_update_listener(self, listener);
    }

    fn remove_update_listener(&self, listener: &UpdateListener) {
        DataSelector::remove_update_listener(self, listener);
    }
}

impl<P, T> Drop for DataSelector<P, T> {
    fn drop(&mut self) {
        let listener = self.parent_listener.get_mut().take();
        if let (Some(parent), Some(listener)) = (&self.parent, listener) {
            parent.remove_update_listener(&listener);
        }
    }
}
