//! Cross-crate integration flows.

pub mod selector_flows;
pub mod shell_flows;
