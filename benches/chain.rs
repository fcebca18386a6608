//! Benchmarks for hook-chain churn.
//!
//! Measures the cost of the registry's install/uninstall path - registration
//! insertion, re-linking and redirect bookkeeping - against a no-op
//! interception primitive, so the numbers isolate the chain logic itself.

extern crate layerhook;

use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};

use criterion::{criterion_group, criterion_main, Criterion};
use layerhook::{
    FuncAddress, HookRegistry, OriginalCell, Priority, RedirectMode, Redirection, Redirector,
    StubHandle,
};

/// Primitive that patches nothing and reports synthetic entries.
struct NullEngine {
    next_stub: AtomicUsize,
}

impl NullEngine {
    fn new() -> Self {
        NullEngine {
            next_stub: AtomicUsize::new(1),
        }
    }
}

impl Redirector for NullEngine {
    fn init(&self, _mode: RedirectMode, _debuggable: bool) -> layerhook::Result<()> {
        Ok(())
    }

    fn redirect(
        &self,
        target: FuncAddress,
        _entry: FuncAddress,
    ) -> layerhook::Result<Redirection> {
        Ok(Redirection {
            stub: StubHandle::new(self.next_stub.fetch_add(1, Ordering::Relaxed)),
            previous: FuncAddress::new(target.value() + 0x0100_0000),
        })
    }

    fn remove_redirect(&self, _stub: StubHandle) -> layerhook::Result<()> {
        Ok(())
    }
}

const TARGET: FuncAddress = FuncAddress(0x4000_0000);
const CHAIN_LEN: usize = 16;

fn bench_chain_churn(c: &mut Criterion) {
    let registry = HookRegistry::new(Box::new(NullEngine::new())).unwrap();

    // cells outlive the whole run; the chain only ever stores references
    let cells: Vec<&'static OriginalCell> = (0..CHAIN_LEN)
        .map(|_| &*Box::leak(Box::new(OriginalCell::new())))
        .collect();

    let mut group = c.benchmark_group("chain_churn");
    group.bench_function("install_uninstall_16", |b| {
        b.iter(|| {
            for (index, cell) in cells.iter().enumerate() {
                let detour = FuncAddress::new(0x1000 + index);
                // alternate priorities so insertions land mid-chain
                let priority = Priority((index % 4) as i32 * 100);
                registry
                    .install(black_box(TARGET), detour, *cell, priority)
                    .unwrap();
            }
            for index in 0..CHAIN_LEN {
                let detour = FuncAddress::new(0x1000 + index);
                registry.uninstall(black_box(TARGET), detour).unwrap();
            }
        });
    });
    group.finish();
}

fn bench_chain_midpoint(c: &mut Criterion) {
    let registry = HookRegistry::new(Box::new(NullEngine::new())).unwrap();
    let cells: Vec<&'static OriginalCell> = (0..CHAIN_LEN)
        .map(|_| &*Box::leak(Box::new(OriginalCell::new())))
        .collect();

    // a standing chain; measure the single mid-chain insert/remove pair
    for (index, cell) in cells.iter().enumerate() {
        registry
            .install(TARGET, FuncAddress::new(0x1000 + index), *cell, Priority((index as i32) * 10))
            .unwrap();
    }
    let extra: &'static OriginalCell = Box::leak(Box::new(OriginalCell::new()));

    let mut group = c.benchmark_group("chain_midpoint");
    group.bench_function("insert_remove_mid", |b| {
        b.iter(|| {
            registry
                .install(TARGET, FuncAddress(0x9000), extra, Priority(75))
                .unwrap();
            registry.uninstall(TARGET, FuncAddress(0x9000)).unwrap();
        });
    });
    group.finish();
}

criterion_group!(benches, bench_chain_churn, bench_chain_midpoint);
criterion_main!(benches);
