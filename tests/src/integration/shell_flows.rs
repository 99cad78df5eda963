//! # Shell Flows
//!
//! A frame announces a settings change over the broker; the host's sync
//! client updates its store and invalidates the selector tree, so the next
//! read observes the new value.
//!
//! ```text
//!   frame ──settings-changed──→ MessageBroker ──→ SettingsSync
//!                                                     │
//!                                     settings.clear_cached_result()
//!                                                     │
//!                                             theme selector recomputes
//! ```

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use parking_lot::RwLock;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use shell_broker::{
        BrokerApi, BrokerMessage, ChannelDescriptor, ClientHandler, DeliveryOutcome,
        HandlerError, InboundEnvelope,
    };
    use shell_runtime::{RuntimeConfig, ShellRuntime};
    use shell_selector::{DataSelector, Parameters};

    type Settings = serde_json::Map<String, Value>;

    /// Applies `settings-changed` messages to the store and invalidates the
    /// selector rooted on it.
    struct SettingsSync {
        store: Arc<RwLock<Settings>>,
        settings: Arc<DataSelector<(), Settings>>,
        theme: Arc<DataSelector<Settings, String>>,
    }

    #[async_trait]
    impl ClientHandler for SettingsSync {
        async fn on_message(&self, message: BrokerMessage) -> Result<Value, HandlerError> {
            if message.message_name != "settings-changed" {
                return Err(HandlerError::new(format!(
                    "unsupported message {}",
                    message.message_name
                )));
            }
            let Value::Object(changes) = message.data else {
                return Err(HandlerError::new("settings payload must be an object"));
            };

            self.store.write().extend(changes);
            self.settings.clear_cached_result(None);

            let theme = self
                .theme
                .get(&Parameters::new())
                .map_err(|e| HandlerError::new(e.to_string()))?;
            Ok(json!({ "theme": theme.as_str() }))
        }
    }

    struct Fixture {
        sync: Arc<SettingsSync>,
        theme_runs: Arc<AtomicUsize>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(RwLock::new(Settings::from_iter([(
            "theme".to_string(),
            json!("light"),
        )])));

        let reader = store.clone();
        let settings = DataSelector::<(), Settings>::builder()
            .name("settings")
            .execute(move |_, _| reader.read().clone())
            .build()
            .unwrap();

        let theme_runs = Arc::new(AtomicUsize::new(0));
        let runs = theme_runs.clone();
        let theme = DataSelector::<Settings, String>::builder()
            .name("theme")
            .parent(settings.clone())
            .execute(move |settings, _| {
                runs.fetch_add(1, Ordering::SeqCst);
                settings
                    .and_then(|s| s.get("theme"))
                    .and_then(Value::as_str)
                    .unwrap_or("light")
                    .to_string()
            })
            .build()
            .unwrap();

        Fixture {
            sync: Arc::new(SettingsSync {
                store,
                settings,
                theme,
            }),
            theme_runs,
        }
    }

    #[tokio::test]
    async fn test_broker_message_invalidates_selector_tree() {
        let fixture = fixture();
        let runtime = ShellRuntime::start(RuntimeConfig {
            accepted_origins: vec!["https://settings.example".to_string()],
            ..RuntimeConfig::default()
        })
        .await
        .unwrap();
        let broker = runtime.broker();
        broker
            .subscribe(
                "settings-sync",
                vec![ChannelDescriptor::new("settings")],
                Value::Null,
                fixture.sync.clone(),
            )
            .await
            .unwrap();

        assert_eq!(*fixture.sync.theme.get(&Parameters::new()).unwrap(), "light");
        assert_eq!(fixture.theme_runs.load(Ordering::SeqCst), 1);

        let report = broker
            .handle_inbound(InboundEnvelope {
                origin: "https://settings.example".to_string(),
                message: BrokerMessage::new("settings", "settings-frame", "settings-changed")
                    .with_data(json!({ "theme": "dark" })),
            })
            .await
            .unwrap();

        assert_eq!(
            report.get("settings-sync"),
            Some(&DeliveryOutcome::Delivered(json!({ "theme": "dark" })))
        );
        assert_eq!(fixture.theme_runs.load(Ordering::SeqCst), 2);
        // The host client listens on "shell" only.
        assert_eq!(runtime.host().received(), 0);
    }

    #[tokio::test]
    async fn test_bad_payload_fails_only_that_delivery() {
        let fixture = fixture();
        let runtime = ShellRuntime::start(RuntimeConfig {
            host_channels: vec!["settings".to_string()],
            ..RuntimeConfig::default()
        })
        .await
        .unwrap();
        let broker = runtime.broker();
        broker
            .subscribe(
                "settings-sync",
                vec![ChannelDescriptor::new("settings")],
                Value::Null,
                fixture.sync.clone(),
            )
            .await
            .unwrap();

        let report = broker
            .publish(
                BrokerMessage::new("settings", "settings-frame", "settings-changed")
                    .with_data(json!("dark")),
            )
            .await
            .unwrap();

        assert_eq!(
            report.get("settings-sync"),
            Some(&DeliveryOutcome::Failed(
                "settings payload must be an object".to_string()
            ))
        );
        assert!(report.get("shell-host").unwrap().is_delivered());
        assert_eq!(runtime.host().received(), 1);
        assert_eq!(fixture.theme_runs.load(Ordering::SeqCst), 0);
    }
}
