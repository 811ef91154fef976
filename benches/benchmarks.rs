//! Performance benchmarks for wg-panel
//!
//! Run with: cargo bench

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use wg_panel::config::TomlConfig;
use wg_panel::monitoring::{format_bytes, format_last_seen};
use wg_panel::roster::{next_address, Client};
use wg_panel::wireguard::{parse_dump, KeyMaterial};

fn dump_output(peers: usize) -> String {
    let mut out = String::from("cHJpdmF0ZQ==\tcHVibGlj\t51820\toff\n");
    for i in 0..peers {
        out.push_str(&format!(
            "peer{:039}=\t(none)\t198.51.100.{}:51820\t10.8.0.{}/32\t1700000000\t{}\t{}\t25\n",
            i,
            i % 250,
            i % 250,
            i * 1024,
            i * 2048
        ));
    }
    out
}

fn roster(size: u8) -> Vec<Client> {
    let now = Utc::now();
    (0..size)
        .map(|i| {
            let keys = KeyMaterial::new(
                &BASE64.encode([i; 32]),
                &BASE64.encode([i.wrapping_add(1); 32]),
                &BASE64.encode([0x42u8; 32]),
            )
            .unwrap();
            Client::new(
                format!("peer{}", i),
                keys,
                format!("10.8.0.{}/32", u16::from(i) + 2),
                None,
                String::new(),
                now,
            )
        })
        .collect()
}

fn bench_parse_dump(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_dump");

    for peers in [10, 100, 250] {
        let output = dump_output(peers);
        group.bench_with_input(BenchmarkId::from_parameter(peers), &output, |b, output| {
            b.iter(|| parse_dump(black_box(output)));
        });
    }

    group.finish();
}

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");

    group.bench_function("format_bytes", |b| {
        b.iter(|| format_bytes(black_box(5_368_709_120)));
    });

    group.bench_function("format_last_seen", |b| {
        b.iter(|| format_last_seen(black_box(1_700_000_000), black_box(1_700_007_200)));
    });

    group.finish();
}

fn bench_next_address(c: &mut Criterion) {
    let mut group = c.benchmark_group("next_address");

    for size in [0u8, 100, 252] {
        let clients = roster(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &clients, |b, clients| {
            b.iter(|| next_address(black_box("10.8.0.x"), black_box(clients)));
        });
    }

    group.finish();
}

fn bench_config_parsing(c: &mut Criterion) {
    let toml_data = r#"
[server]
bind_address = "127.0.0.1"
port = 51821

[wireguard]
interface = "wg0"
host = "vpn.example.com"
default_address = "10.8.0.x"
persistent_keepalive = 25
"#;

    c.bench_function("config_parsing_toml", |b| {
        b.iter(|| TomlConfig::parse(black_box(toml_data)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_parse_dump,
    bench_format,
    bench_next_address,
    bench_config_parsing
);
criterion_main!(benches);
