//! # Shell Messaging Benchmarks
//!
//! | Component | Operation | Target |
//! |-----------|-----------|--------|
//! | DataSelector | Cache hit on a 3-level tree | < 1µs |
//! | DataSelector | Root invalidation + recompute | < 10µs |
//! | MessageBroker | Broadcast to N subscribers | linear in N |

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::Value;
use shell_broker::{BrokerApi, BrokerMessage, ChannelDescriptor, ClientHandler, HandlerError, MessageBroker};
use shell_selector::{parameters, DataSelector};
use std::sync::Arc;

// ============================================================================
// DataSelector
// ============================================================================

fn selector_tree() -> Arc<DataSelector<u64, u64>> {
    let root = DataSelector::<(), u64>::builder()
        .name("root")
        .execute(|_, _| 1)
        .build()
        .unwrap();
    let middle = DataSelector::<u64, u64>::builder()
        .name("middle")
        .parent(root)
        .parameter_key("tenant")
        .execute(|parent, tenant| parent.copied().unwrap_or(0) + tenant.map_or(0, |t| t.len() as u64))
        .build()
        .unwrap();
    DataSelector::<u64, u64>::builder()
        .name("leaf")
        .parent(middle)
        .parameter_key("feature")
        .execute(|parent, _| parent.copied().unwrap_or(0) * 2)
        .build()
        .unwrap()
}

fn bench_selector(c: &mut Criterion) {
    let mut group = c.benchmark_group("data-selector");
    let params = parameters([("tenant", "acme"), ("feature", "dark_mode")]);

    let leaf = selector_tree();
    leaf.get(&params).unwrap();
    group.bench_function("cache_hit", |b| {
        b.iter(|| black_box(leaf.get(black_box(&params)).unwrap()))
    });

    group.bench_function("invalidate_and_recompute", |b| {
        b.iter(|| {
            leaf.clear_cached_result(None);
            black_box(leaf.get(&params).unwrap())
        })
    });

    group.finish();
}

// ============================================================================
// MessageBroker
// ============================================================================

struct Ack;

#[async_trait]
impl ClientHandler for Ack {
    async fn on_message(&self, _message: BrokerMessage) -> Result<Value, HandlerError> {
        Ok(Value::Bool(true))
    }
}

fn bench_broadcast(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("message-broker");

    for subscribers in [1usize, 10, 100] {
        let broker = MessageBroker::new();
        runtime.block_on(async {
            for i in 0..subscribers {
                broker
                    .subscribe(
                        &format!("client-{i}"),
                        vec![ChannelDescriptor::new("shell")],
                        Value::Null,
                        Arc::new(Ack),
                    )
                    .await
                    .unwrap();
            }
        });

        group.throughput(Throughput::Elements(subscribers as u64));
        group.bench_with_input(
            BenchmarkId::new("broadcast", subscribers),
            &subscribers,
            |b, _| {
                b.to_async(&runtime).iter(|| async {
                    black_box(
                        broker
                            .publish(BrokerMessage::new("shell", "bench", "tick"))
                            .await
                            .unwrap(),
                    )
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_selector, bench_broadcast);
criterion_main!(benches);
