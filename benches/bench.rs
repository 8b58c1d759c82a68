// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::*;

use survey_depth::{compute_depth_map, DepthMapParams, PixelOrdering};

/// Deterministic, roughly uniform sources over the sky.
fn fake_catalog(num_sources: usize) -> [Vec<f64>; 4] {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    let mut ra = Vec::with_capacity(num_sources);
    let mut dec = Vec::with_capacity(num_sources);
    let mut mag = Vec::with_capacity(num_sources);
    let mut snr = Vec::with_capacity(num_sources);
    for _ in 0..num_sources {
        ra.push(next() * 360.0);
        dec.push((next() * 2.0 - 1.0).asin().to_degrees());
        let m = 22.0 + next() * 6.0;
        mag.push(m);
        snr.push(10.0 * 10_f64.powf(-0.4 * (m - 25.0)));
    }
    [ra, dec, mag, snr]
}

fn depth_maps(c: &mut Criterion) {
    let [ra, dec, mag, snr] = fake_catalog(1_000_000);

    let mut group = c.benchmark_group("depth map");
    group.sample_size(10);
    for (nside, ordering) in [
        (64, PixelOrdering::Ring),
        (64, PixelOrdering::Nested),
        (1024, PixelOrdering::Ring),
    ] {
        let params = DepthMapParams {
            nside,
            ordering,
            ..Default::default()
        };
        group.bench_function(format!("1M sources, nside {nside} {ordering}"), |b| {
            b.iter(|| compute_depth_map(&ra, &dec, &mag, &snr, &params).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, depth_maps);
criterion_main!(benches);
