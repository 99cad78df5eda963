//! Selector parameters
//!
//! Parameters are a flat string map. A selector with a parameter key reads
//! its cache partition from the entry under that key.

use std::collections::BTreeMap;

/// Parameters passed to `get`, `clear_cached_result` and `check_update`.
pub type Parameters = BTreeMap<String, String>;

/// Build a parameter map from key/value pairs.
///
/// ```
/// let params = shell_selector::parameters([("env", "dev")]);
/// assert_eq!(params["env"], "dev");
/// ```
pub fn parameters<I, K, V>(pairs: I) -> Parameters
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
