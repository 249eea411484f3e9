//! # WiFi Sockets Benchmarks
//!
//! | Path | What is measured |
//! |------|------------------|
//! | open / disconnect | slot allocation and release under the table lock |
//! | echo | one send plus one receive through the channel lock |
//! | contended echo | the same with other threads queued on the channel |

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use wifi_sockets::{LoopbackDriver, SocketService, SocketsApi, SocketsConfig};

const ECHO_PORT: u16 = 7;

fn service() -> impl SocketsApi {
    SocketService::with_system_defaults(SocketsConfig::default(), LoopbackDriver::new())
        .expect("default config is valid")
}

// ============================================================================
// Socket table
// ============================================================================

fn bench_open_close(c: &mut Criterion) {
    let mut group = c.benchmark_group("socket-table");
    let sockets = service();

    group.bench_function("open_close", |b| {
        b.iter(|| {
            let handle = sockets.open().unwrap();
            sockets.close(black_box(handle)).unwrap();
        })
    });

    group.bench_function("open_connect_disconnect", |b| {
        b.iter(|| {
            let handle = sockets.open().unwrap();
            sockets.connect(handle, "localhost", ECHO_PORT).unwrap();
            sockets.disconnect(black_box(handle)).unwrap();
        })
    });

    group.finish();
}

// ============================================================================
// Echo through the channel
// ============================================================================

fn bench_echo(c: &mut Criterion) {
    let mut group = c.benchmark_group("echo");
    group.measurement_time(Duration::from_secs(5));

    for size in [16usize, 256, 1200] {
        let sockets = service();
        let handle = sockets.open().unwrap();
        sockets.connect(handle, "localhost", ECHO_PORT).unwrap();
        let payload: Vec<u8> = (0..size).map(|_| rand::thread_rng().gen()).collect();
        let mut buf = vec![0u8; size];

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("send_recv", size), &size, |b, _| {
            b.iter(|| {
                sockets.send(handle, black_box(&payload)).unwrap();
                black_box(sockets.recv(handle, &mut buf).unwrap());
            })
        });
    }

    group.finish();
}

fn bench_contended_echo(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended-echo");
    group.measurement_time(Duration::from_secs(5));

    let sockets = Arc::new(
        SocketService::with_system_defaults(SocketsConfig::default(), LoopbackDriver::new())
            .expect("default config is valid"),
    );
    let handle = sockets.open().unwrap();
    sockets.connect(handle, "localhost", ECHO_PORT).unwrap();

    // Background clients keep the channel busy on the other slots.
    let stop = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let background: Vec<_> = (1..sockets.config().max_sockets)
        .map(|_| {
            let sockets = Arc::clone(&sockets);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                let handle = sockets.open().unwrap();
                sockets.connect(handle, "localhost", ECHO_PORT).unwrap();
                let mut buf = [0u8; 64];
                while !stop.load(std::sync::atomic::Ordering::Relaxed) {
                    sockets.send(handle, &[0xAB; 64]).unwrap();
                    sockets.recv(handle, &mut buf).unwrap();
                }
                sockets.disconnect(handle).unwrap();
            })
        })
        .collect();

    let payload = [0x42u8; 64];
    let mut buf = [0u8; 64];
    group.bench_function("send_recv_64", |b| {
        b.iter(|| {
            sockets.send(handle, &payload).unwrap();
            black_box(sockets.recv(handle, &mut buf).unwrap());
        })
    });

    stop.store(true, std::sync::atomic::Ordering::Relaxed);
    for worker in background {
        worker.join().unwrap();
    }
    group.finish();
}

criterion_group!(benches, bench_open_close, bench_echo, bench_contended_echo);
criterion_main!(benches);
