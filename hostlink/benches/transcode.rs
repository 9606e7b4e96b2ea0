// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

use std::rc::Rc;

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use hostlink::{Bridge, BridgeConfig, HostObject, NativeModule, VecMemory};

fn bridge(ascii_fast_path: bool) -> Bridge {
    let memory = Rc::new(VecMemory::new(4, None));
    let module = Rc::new(NativeModule::new(memory.clone()));
    Bridge::new(
        memory,
        module,
        HostObject::plain(),
        BridgeConfig::default().with_ascii_fast_path(ascii_fast_path),
    )
}

fn benchmark_encode(c: &mut Criterion) {
    let inputs = [
        ("ascii", "the quick brown fox jumps over the lazy dog ".repeat(64)),
        ("mixed", format!("{}ünïcödé tail", "prefix ".repeat(256))),
        ("cjk", "漢字かな交じり文".repeat(64)),
    ];

    let mut group = c.benchmark_group("encode_string");
    for (name, text) in &inputs {
        for (path, fast) in [("fast_path", true), ("general", false)] {
            group.bench_function(format!("{name}/{path}"), |b| {
                b.iter_batched(
                    || bridge(fast),
                    |bridge| black_box(bridge.encode_string(black_box(text)).unwrap()),
                    BatchSize::SmallInput,
                );
            });
        }
    }
    group.finish();
}

fn benchmark_decode(c: &mut Criterion) {
    let bridge = bridge(true);
    let text = "décodé ".repeat(512);
    let encoded = bridge.encode_string(&text).unwrap();

    c.bench_function("decode_string", |b| {
        b.iter(|| black_box(bridge.decode_string(encoded.ptr, encoded.len).unwrap()));
    });
}

criterion_group!(benches, benchmark_encode, benchmark_decode);
criterion_main!(benches);
