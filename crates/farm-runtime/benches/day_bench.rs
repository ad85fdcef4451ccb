use criterion::{black_box, criterion_group, criterion_main, Criterion};
use farm_core::{FarmConfig, Weather};
use farm_econ::Economy;
use farm_runtime::SharedEconomy;

fn busy_farm() -> Economy {
    let cfg = FarmConfig {
        starting_currency: 10_000,
        ..FarmConfig::default()
    };
    let mut eco = Economy::with_standard_catalog(&cfg);
    let crops = ["wheat", "carrot", "corn", "tomato", "wheat", "corn"];
    for (slot, crop) in crops.iter().enumerate() {
        eco.rest();
        let _ = eco.plant_crop(&(*crop).into(), slot);
    }
    for animal in ["chicken", "cow", "sheep", "chicken", "cow"] {
        let _ = eco.buy_animal(&animal.into());
    }
    eco
}

fn bench_days(c: &mut Criterion) {
    c.bench_function("advance_day (random weather)", |b| {
        let mut eco = busy_farm();
        b.iter(|| black_box(eco.advance_day()))
    });
    c.bench_function("advance_day (stormy)", |b| {
        let mut eco = busy_farm();
        b.iter(|| black_box(eco.advance_day_under(Weather::Stormy)))
    });
    c.bench_function("shared advance_day", |b| {
        let shared = SharedEconomy::new(busy_farm());
        b.iter(|| black_box(shared.advance_day()))
    });
}

criterion_group!(benches, bench_days);
criterion_main!(benches);
