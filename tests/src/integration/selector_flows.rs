//! # Selector Integration Flows
//!
//! Builds a realistic selector tree over a shared store:
//!
//! ```text
//!   settings (root)
//!       │
//!   tenant_settings [tenant]
//!       │
//!   feature_flags [feature]
//! ```
//!
//! and checks memoization, partitioning and push invalidation across it.

#[cfg(test)]
mod tests {
    use parking_lot::RwLock;
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use shell_selector::{parameters, DataSelector, Parameters, SelectorError};

    type Store = Arc<RwLock<BTreeMap<String, BTreeMap<String, bool>>>>;
    type Settings = BTreeMap<String, BTreeMap<String, bool>>;

    struct Tree {
        store: Store,
        settings: Arc<DataSelector<(), Settings>>,
        tenant: Arc<DataSelector<Settings, BTreeMap<String, bool>>>,
        feature: Arc<DataSelector<BTreeMap<String, bool>, bool>>,
        executions: Arc<AtomicUsize>,
    }

    fn tree() -> Tree {
        let store: Store = Arc::new(RwLock::new(BTreeMap::from([
            (
                "acme".to_string(),
                BTreeMap::from([("dark_mode".to_string(), true)]),
            ),
            (
                "globex".to_string(),
                BTreeMap::from([("dark_mode".to_string(), false)]),
            ),
        ])));
        let executions = Arc::new(AtomicUsize::new(0));

        let reader = store.clone();
        let counter = executions.clone();
        let settings = DataSelector::<(), Settings>::builder()
            .name("settings")
            .execute(move |_, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                reader.read().clone()
            })
            .build()
            .unwrap();

        let counter = executions.clone();
        let tenant = DataSelector::<Settings, BTreeMap<String, bool>>::builder()
            .name("tenant_settings")
            .parent(settings.clone())
            .parameter_key("tenant")
            .execute(move |all, tenant| {
                counter.fetch_add(1, Ordering::SeqCst);
                all.zip(tenant)
                    .and_then(|(all, tenant)| all.get(tenant).cloned())
                    .unwrap_or_default()
            })
            .build()
            .unwrap();

        let counter = executions.clone();
        let feature = DataSelector::<BTreeMap<String, bool>, bool>::builder()
            .name("feature_flags")
            .parent(tenant.clone())
            .parameter_key("feature")
            .execute(move |flags, feature| {
                counter.fetch_add(1, Ordering::SeqCst);
                flags
                    .zip(feature)
                    .and_then(|(flags, feature)| flags.get(feature).copied())
                    .unwrap_or(false)
            })
            .build()
            .unwrap();

        Tree {
            store,
            settings,
            tenant,
            feature,
            executions,
        }
    }

    fn query(tenant: &str, feature: &str) -> Parameters {
        parameters([("tenant", tenant), ("feature", feature)])
    }

    #[test]
    fn test_leaf_reads_through_the_tree_once() {
        let tree = tree();

        assert!(*tree.feature.get(&query("acme", "dark_mode")).unwrap());
        assert_eq!(tree.executions.load(Ordering::SeqCst), 3);

        let first = tree.feature.get(&query("acme", "dark_mode")).unwrap();
        let second = tree.feature.get(&query("acme", "dark_mode")).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(tree.executions.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_tenants_are_cached_separately() {
        let tree = tree();
        let acme = parameters([("tenant", "acme")]);
        let globex = parameters([("tenant", "globex")]);

        assert_eq!(tree.tenant.get(&acme).unwrap().get("dark_mode"), Some(&true));
        assert_eq!(tree.tenant.get(&globex).unwrap().get("dark_mode"), Some(&false));

        assert_eq!(tree.tenant.cached_len(), 2);
        assert_eq!(tree.settings.cached_len(), 1);
        assert_eq!(tree.executions.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_leaf_slot_is_keyed_by_its_own_parameter_only() {
        let tree = tree();

        assert!(*tree.feature.get(&query("acme", "dark_mode")).unwrap());
        // Same leaf slot: the tenant change alone does not reach the leaf.
        assert!(*tree.feature.get(&query("globex", "dark_mode")).unwrap());

        tree.tenant
            .clear_cached_result(Some(&parameters([("tenant", "globex")])));
        assert!(!*tree.feature.get(&query("globex", "dark_mode")).unwrap());
    }

    #[test]
    fn test_missing_leaf_parameter_is_rejected() {
        let tree = tree();

        let err = tree
            .feature
            .get(&parameters([("tenant", "acme")]))
            .unwrap_err();

        assert_eq!(
            err,
            SelectorError::MissingParameter {
                selector: "feature_flags".to_string(),
                key: "feature".to_string(),
            }
        );
        assert_eq!(tree.executions.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_root_invalidation_reaches_the_leaf() {
        let tree = tree();
        assert!(*tree.feature.get(&query("acme", "dark_mode")).unwrap());

        tree.store
            .write()
            .get_mut("acme")
            .unwrap()
            .insert("dark_mode".to_string(), false);
        tree.settings.clear_cached_result(None);

        assert_eq!(tree.settings.cached_len(), 0);
        assert_eq!(tree.tenant.cached_len(), 0);
        assert_eq!(tree.feature.cached_len(), 0);
        assert!(!*tree.feature.get(&query("acme", "dark_mode")).unwrap());
    }

    #[test]
    fn test_tenant_invalidation_leaves_other_tenants_cached() {
        let tree = tree();
        tree.tenant.get(&parameters([("tenant", "acme")])).unwrap();
        tree.tenant.get(&parameters([("tenant", "globex")])).unwrap();

        tree.tenant
            .clear_cached_result(Some(&parameters([("tenant", "acme")])));

        assert!(!tree.tenant.is_cached(&parameters([("tenant", "acme")])));
        assert!(tree.tenant.is_cached(&parameters([("tenant", "globex")])));
        assert!(tree.settings.is_cached(&Parameters::new()));
    }

    #[test]
    fn test_listener_sees_root_invalidation_once() {
        let tree = tree();
        tree.feature.get(&query("acme", "dark_mode")).unwrap();

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = seen.clone();
        tree.feature
            .add_update_listener(Arc::new(move |params: Option<&Parameters>| {
                sink.lock().push(params.cloned());
            }));

        tree.settings.clear_cached_result(None);

        assert_eq!(*seen.lock(), vec![None]);
    }

    #[test]
    fn test_destroyed_subtree_stops_receiving_invalidations() {
        let tree = tree();
        tree.feature.get(&query("acme", "dark_mode")).unwrap();

        tree.feature.destroy();
        tree.settings.clear_cached_result(None);

        assert_eq!(tree.tenant.cached_len(), 0);
        assert_eq!(tree.feature.cached_len(), 1);
        assert_eq!(tree.tenant.listener_count(), 0);
    }
}
