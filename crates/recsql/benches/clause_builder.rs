use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use recsql::{FieldDef, Record, SlotKind, Snapshot, Statement, Value, set_fragment, where_fragment};
use std::borrow::Cow;

/// A record with `n` optional columns; every other one is filled.
struct Wide {
    defs: Vec<FieldDef>,
    values: Vec<Option<i64>>,
}

impl Wide {
    fn new(n: usize) -> Self {
        let defs = (0..n)
            .map(|i| FieldDef {
                name: "Col",
                column: Cow::Owned(format!("col{i}")),
                slot: SlotKind::Optional,
            })
            .collect();
        let values = (0..n as i64)
            .map(|i| (i % 2 == 0).then_some(i))
            .collect();
        Self { defs, values }
    }
}

impl Record for Wide {
    fn field_defs(&self) -> &[FieldDef] {
        &self.defs
    }

    fn field_values(&self) -> Vec<Option<Value>> {
        self.values.iter().map(|v| v.map(Value::Int)).collect()
    }
}

fn bench_where(c: &mut Criterion) {
    let mut group = c.benchmark_group("clause/where");

    for n in [1, 5, 10, 50, 100] {
        let rec = Wide::new(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &rec, |b, rec| {
            b.iter(|| black_box(where_fragment(rec)));
        });
    }

    group.finish();
}

fn bench_update_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("clause/update_render");

    for n in [1, 5, 10, 50, 100] {
        let rec = Wide::new(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &rec, |b, rec| {
            b.iter(|| {
                let mut stmt = Statement::new("UPDATE t");
                stmt.push_clause(set_fragment(rec))
                    .push_clause(where_fragment(rec));
                black_box(stmt.to_pg_sql());
            });
        });
    }

    group.finish();
}

fn bench_capture(c: &mut Criterion) {
    #[derive(serde::Serialize)]
    struct Filter {
        name: Option<String>,
        age: Option<i32>,
        email: Option<String>,
        site_id: i64,
    }

    let filter = Filter {
        name: Some("alice".into()),
        age: None,
        email: Some("alice@example.com".into()),
        site_id: 3,
    };

    c.bench_function("capture/snapshot", |b| {
        b.iter(|| black_box(Snapshot::capture(&filter)));
    });
}

criterion_group!(benches, bench_where, bench_update_render, bench_capture);
criterion_main!(benches);
