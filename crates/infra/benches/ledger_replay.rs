use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use klabis_core::{ExpectedVersion, MemberId, MoneyAmount};
use klabis_events::{EventEnvelope, ProjectionRunner};
use klabis_finance::{AccountProjector, Accounts, AccountsProjector, LedgerEvent, rebuild};
use klabis_infra::event_store::{EventStore, InMemoryEventStore, UncommittedEvent};
use klabis_infra::{EventsRepository, Ledger};

const MEMBERS: u64 = 50;

/// A plausible club log: accounts, deposits, fees and transfers.
fn ledger_events(len: usize) -> Vec<LedgerEvent> {
    let mut events: Vec<LedgerEvent> = (0..MEMBERS)
        .map(|m| LedgerEvent::account_created(MemberId::new(m), MoneyAmount::of(1_000)))
        .collect();

    let mut i: u64 = 0;
    while events.len() < len {
        let m = MemberId::new(i % MEMBERS);
        let other = MemberId::new((i + 1) % MEMBERS);
        events.push(match i % 3 {
            0 => LedgerEvent::deposited(m, MoneyAmount::of(10)),
            1 => LedgerEvent::withdrawn(m, MoneyAmount::of(5)),
            _ => LedgerEvent::transferred(m, other, MoneyAmount::of(1)),
        });
        i += 1;
    }
    events
}

fn bench_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("ledger_replay");

    for len in [100usize, 1_000, 10_000] {
        let events = ledger_events(len);
        let envelopes: Vec<EventEnvelope<LedgerEvent>> = events
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, e)| EventEnvelope::for_event(i as u64 + 1, e))
            .collect();
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("rebuild_one_account", len), &events, |b, events| {
            b.iter(|| black_box(rebuild(MemberId::new(7), events).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("account_projector", len), &envelopes, |b, envelopes| {
            b.iter(|| {
                black_box(
                    ProjectionRunner::rebuild_from_scratch(|| AccountProjector::new(MemberId::new(7)), envelopes)
                        .unwrap(),
                )
            });
        });

        group.bench_with_input(BenchmarkId::new("accounts_projector", len), &envelopes, |b, envelopes| {
            b.iter(|| black_box(ProjectionRunner::rebuild_from_scratch(AccountsProjector::new, envelopes).unwrap()));
        });
    }

    group.finish();
}

fn bench_log_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("log_replay");
    group.sample_size(20);

    for len in [1_000usize, 10_000] {
        let store = InMemoryEventStore::new();
        let batch = ledger_events(len)
            .iter()
            .map(|e| UncommittedEvent::from_typed(e).unwrap())
            .collect();
        store.append(batch, ExpectedVersion::Exact(0)).unwrap();
        let repository = EventsRepository::new(store);
        group.throughput(Throughput::Elements(len as u64));

        // Includes JSON decoding of every stored payload.
        group.bench_with_input(BenchmarkId::new("decode_and_project", len), &repository, |b, repo| {
            b.iter(|| black_box(repo.project(AccountsProjector::new()).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("rebuild_source", len), &repository, |b, repo| {
            b.iter(|| {
                let mut accounts = Accounts::new();
                black_box(repo.rebuild(&mut accounts).unwrap());
                accounts
            });
        });
    }

    group.finish();
}

fn bench_write_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_path");

    group.bench_function("deposit_with_1000_event_history", |b| {
        let store = InMemoryEventStore::new();
        let batch = ledger_events(1_000)
            .iter()
            .map(|e| UncommittedEvent::from_typed(e).unwrap())
            .collect();
        store.append(batch, ExpectedVersion::Exact(0)).unwrap();
        let ledger = Ledger::new(Arc::new(EventsRepository::new(store)), 3);

        b.iter(|| black_box(ledger.deposit(MemberId::new(3), MoneyAmount::new(1)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_replay, bench_log_replay, bench_write_path);
criterion_main!(benches);
