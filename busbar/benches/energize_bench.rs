use criterion::{black_box, criterion_group, criterion_main, Criterion};
use busbar::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// A long radial feeder: source, then repeated breaker/bus/rectifier/inverter
/// sections, with a load hung off every bus.
fn long_feeder(sections: usize) -> Diagram {
    let mut devices = vec![Device::source("SRC", SignalKind::Ac)];
    let mut conductors = Vec::new();
    let mut upstream = PinId::new("SRC", 0);

    for i in 0..sections {
        let brk = format!("BRK{}", i);
        let bus = format!("BUS{}", i);
        let rect = format!("RECT{}", i);
        let inv = format!("INV{}", i);
        let load = format!("LOAD{}", i);
        devices.push(Device::breaker(&brk, true));
        devices.push(Device::bus(&bus));
        devices.push(Device::rectifier(&rect));
        devices.push(Device::inverter(&inv));
        devices.push(Device::load(&load));

        conductors.push(Conductor::new(format!("a{}", i), upstream, PinId::new(&brk, 0)));
        conductors.push(Conductor::new(format!("b{}", i), PinId::new(&brk, 1), PinId::new(&bus, 0)));
        conductors.push(Conductor::new(format!("c{}", i), PinId::new(&bus, 1), PinId::new(&load, 0)));
        conductors.push(Conductor::new(format!("d{}", i), PinId::new(&bus, 1), PinId::new(&rect, 0)));
        conductors.push(Conductor::new(format!("e{}", i), PinId::new(&rect, 1), PinId::new(&inv, 0)));
        upstream = PinId::new(&inv, 1);
    }

    Diagram::new(devices, conductors).expect("generated ids are unique")
}

fn bench_energize_feeder(c: &mut Criterion) {
    let diagram = long_feeder(200);
    let options = EngineOptions::default();

    c.bench_function("energize_long_feeder", |b| {
        b.iter(|| BusbarCore::energize(black_box(&diagram), black_box(&options)));
    });
}

fn bench_energize_file(c: &mut Criterion) {
    let options = EngineOptions::default();

    c.bench_function("energize_file", |b| {
        b.iter(|| {
            BusbarCore::energize_file(
                black_box(&fixture_path("conversion_chain.json")),
                black_box(&options),
            )
        });
    });
}

criterion_group!(benches, bench_energize_feeder, bench_energize_file);
criterion_main!(benches);
