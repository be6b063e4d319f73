//! Benchmarks for product filtering.

use catalog_crawler::query::{filter_products, ProductQuery};
use catalog_crawler::testing::product_fixture;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const GRADES: [&str; 5] = ["A", "B", "C", "D", "E"];

fn catalog(size: usize) -> Vec<catalog_crawler::extract::Product> {
    (0..size)
        .map(|i| {
            let mut product = product_fixture(&i.to_string(), GRADES[i % 5], &(i % 4 + 1).to_string());
            if i % 3 == 0 {
                product.is_vegan = "Vegano".to_string();
            }
            product
        })
        .collect()
}

fn filter_benchmark(c: &mut Criterion) {
    let products = catalog(10_000);

    c.bench_function("filter_unconstrained", |b| {
        let query = ProductQuery::new();
        b.iter(|| filter_products(black_box(&products), black_box(&query)));
    });

    c.bench_function("filter_nutrition_nova_vegan", |b| {
        let query = ProductQuery::new()
            .with_nutrition("A")
            .with_nova("4")
            .with_is_vegan("Vegano");
        b.iter(|| filter_products(black_box(&products), black_box(&query)));
    });
}

criterion_group!(benches, filter_benchmark);
criterion_main!(benches);
