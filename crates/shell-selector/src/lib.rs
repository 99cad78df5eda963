//! # Shell Selector - Memoized Selector Tree
//!
//! Derived values computed from a parent selector's value plus a
//! selector-specific function, cached per parameter value and invalidated
//! through a listener graph.
//!
//! ## Invariants
//!
//! - The init function runs at most once per selector
//! - A cache hit returns the same `Arc` and notifies nobody
//! - Parameter keys are unique along a parent chain
//! - A child never owns its parent; the parent only holds a weak listener
//!
//! ## Usage Example
//!
//! ```
//! use shell_selector::{DataSelector, Parameters};
//!
//! let base = DataSelector::<(), u64>::builder()
//!     .name("base")
//!     .execute(|_, _| 40)
//!     .build()
//!     .unwrap();
//! let answer = DataSelector::<u64, u64>::builder()
//!     .name("answer")
//!     .parent(base.clone())
//!     .execute(|base, _| base.copied().unwrap_or_default() + 2)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(*answer.get(&Parameters::new()).unwrap(), 42);
//!
//! base.clear_cached_result(None);
//! assert_eq!(answer.cached_len(), 0);
//! ```

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod builder;
pub mod error;
pub mod metrics;
pub mod parameters;
pub mod selector;

pub use builder::SelectorBuilder;
pub use error::SelectorError;
pub use metrics::{SelectorMetrics, SelectorMetricsSnapshot};
pub use parameters::{parameters, Parameters};
pub use selector::{DataSelector, SelectorNode, UpdateListener};
