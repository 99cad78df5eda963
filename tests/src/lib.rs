//! # Shell Messaging Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── benches/
//! │   └── shell_benchmarks.rs   # Selector cache and broker fan-out
//! └── src/integration/
//!     ├── broker_flows.rs       # Publish, origin gate, failure isolation
//!     ├── selector_flows.rs     # Selector trees and invalidation
//!     └── shell_flows.rs        # Broker messages driving selector invalidation
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p shell-tests
//! cargo test -p shell-tests integration::broker_flows
//! cargo bench -p shell-tests
//! ```

#![allow(clippy::unwrap_used)]

pub mod integration;
