//! Performance benchmarks for optimist-engine

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use optimist_engine::{Collection, Role, Settlement, StoreState, User, UserPatch, UserStatus};

fn users(n: usize) -> Vec<User> {
    let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| User {
            id: format!("user_{i}"),
            name: format!("User {i}"),
            email: format!("user{i}@example.com"),
            avatar: None,
            role: Role::User,
            status: UserStatus::Active,
            created_at: t,
            updated_at: t,
        })
        .collect()
}

fn loaded(n: usize) -> StoreState<User> {
    let mut state = StoreState::new();
    state.begin_fetch_list();
    state.settle_fetch_list(Settlement::Confirmed(users(n)), None, None);
    state
}

fn bench_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection");

    for size in [10, 100, 1000] {
        let list = users(size);
        group.bench_with_input(BenchmarkId::new("from_records", size), &list, |b, list| {
            b.iter(|| Collection::from_records(black_box(list.clone())))
        });
    }

    group.bench_function("get_middle_of_1000", |b| {
        let collection = Collection::from_records(users(1000));
        b.iter(|| collection.get(black_box("user_500")))
    });

    group.finish();
}

fn bench_optimistic_cycles(c: &mut Criterion) {
    let mut group = c.benchmark_group("optimistic");
    let patch = UserPatch {
        name: Some("Renamed".into()),
        ..Default::default()
    };

    for size in [10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("update_rollback", size),
            &size,
            |b, &size| {
                let mut state = loaded(size);
                let id = format!("user_{}", size / 2);
                b.iter(|| {
                    let ticket = state.begin_update(&id, &patch, Utc::now()).unwrap();
                    state.settle_update(ticket, Settlement::Failed("x".into()))
                })
            },
        );

        group.bench_with_input(
            BenchmarkId::new("delete_rollback", size),
            &size,
            |b, &size| {
                let mut state = loaded(size);
                let id = format!("user_{}", size / 2);
                b.iter(|| {
                    let ticket = state.begin_delete(&id).unwrap();
                    state.settle_delete(ticket, Settlement::Failed("x".into()))
                })
            },
        );
    }

    group.finish();
}

fn bench_serialization(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialization");

    let list = users(100);
    group.bench_function("users_to_json", |b| {
        b.iter(|| serde_json::to_string(black_box(&list)))
    });

    let json = serde_json::to_string(&list).unwrap();
    group.bench_function("users_from_json", |b| {
        b.iter(|| serde_json::from_str::<Vec<User>>(black_box(&json)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_collection,
    bench_optimistic_cycles,
    bench_serialization,
);
criterion_main!(benches);
