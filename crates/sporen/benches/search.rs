use criterion::{Criterion, criterion_group, criterion_main};
use sporen::{Catalog, EmptyQueryPolicy, SearchFilter, SpeciesRecord};
use std::hint::black_box;

fn large_catalog() -> Catalog {
    let genera = ["Amanita", "Boletus", "Russula", "Lactarius", "Cortinarius", "Inocybe"];
    let records = (0..5_000).map(|i| {
        let genus = genera[i % genera.len()];
        SpeciesRecord::new(format!("{genus} species{i}"), "8-10x6-8", "ellipsoid")
    });
    Catalog::from_records(records).expect("valid catalog")
}

fn bench_filter(c: &mut Criterion) {
    let catalog = large_catalog();
    let mut group = c.benchmark_group("search");
    for query in ["", "aman", "SPECIES49", "nomatch"] {
        group.bench_function(format!("filter/{query:?}"), |b| {
            let mut filter = SearchFilter::new(&catalog, EmptyQueryPolicy::ShowAll);
            b.iter(|| {
                filter.set_query(&catalog, black_box(query));
                black_box(filter.visible_len())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_filter);
criterion_main!(benches);
