//! # Concurrency Stress
//!
//! More threads than sockets, random payloads, one co-processor channel.

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::{Duration, Instant};

    use parking_lot::Mutex;
    use rand::{rngs::StdRng, Rng, SeedableRng};
    use wifi_sockets::{
        LoopbackDriver, SocketError, SocketHandle, SocketOption, SocketService, SocketsApi,
        SocketsConfig,
    };

    use crate::fixtures::{loopback_service, ExclusiveDriver, HostService, ECHO_PORT};

    const EXTRA_THREADS: usize = 12;

    fn exclusive_service() -> HostService<ExclusiveDriver<LoopbackDriver>> {
        SocketService::with_system_defaults(
            SocketsConfig::for_testing(),
            ExclusiveDriver::new(LoopbackDriver::new()),
        )
        .unwrap()
    }

    /// Open, retrying while the table is full.
    fn open_eventually<A: SocketsApi>(sockets: &A) -> SocketHandle {
        loop {
            match sockets.open() {
                Ok(handle) => return handle,
                Err(SocketError::NoResourceAvailable) => thread::yield_now(),
                Err(e) => panic!("open failed: {e}"),
            }
        }
    }

    // =============================================================================
    // TEST GROUP 1: Allocation under contention
    // =============================================================================

    #[test]
    fn test_oversubscribed_open_grants_each_slot_once() {
        let sockets = Arc::new(loopback_service());
        let capacity = sockets.config().max_sockets;
        let threads = capacity + EXTRA_THREADS;
        let barrier = Arc::new(Barrier::new(threads));
        let granted = Arc::new(Mutex::new(Vec::new()));

        let workers: Vec<_> = (0..threads)
            .map(|_| {
                let sockets = Arc::clone(&sockets);
                let barrier = Arc::clone(&barrier);
                let granted = Arc::clone(&granted);
                thread::spawn(move || {
                    barrier.wait();
                    match sockets.open() {
                        Ok(handle) => granted.lock().push(handle),
                        Err(e) => assert_eq!(e, SocketError::NoResourceAvailable),
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let granted = granted.lock();
        assert_eq!(granted.len(), capacity);
        let indexes: HashSet<_> = granted.iter().map(SocketHandle::index).collect();
        assert_eq!(indexes.len(), capacity);
    }

    // =============================================================================
    // TEST GROUP 2: Echo traffic
    // =============================================================================

    #[test]
    fn test_concurrent_echo_keeps_one_command_in_flight() {
        let sockets = Arc::new(exclusive_service());
        let threads = sockets.config().max_sockets + EXTRA_THREADS;
        let limit = sockets.config().max_transfer_size;

        let workers: Vec<_> = (0..threads)
            .map(|id| {
                let sockets = Arc::clone(&sockets);
                thread::spawn(move || {
                    let mut rng = StdRng::seed_from_u64(id as u64);
                    for _ in 0..3 {
                        let len = rng.gen_range(1..=limit * 3);
                        let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();

                        let handle = open_eventually(sockets.as_ref());
                        sockets.connect(handle, "localhost", ECHO_PORT).unwrap();

                        let mut sent = 0;
                        while sent < payload.len() {
                            sent += sockets.send(handle, &payload[sent..]).unwrap();
                        }

                        let mut echoed = Vec::with_capacity(len);
                        let mut buf = vec![0u8; limit];
                        while echoed.len() < len {
                            let n = sockets.recv(handle, &mut buf).unwrap();
                            assert!(n > 0, "echo stalled for client {id}");
                            echoed.extend_from_slice(&buf[..n]);
                        }
                        assert_eq!(echoed, payload, "client {id} got foreign bytes");

                        sockets.disconnect(handle).unwrap();
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        assert_eq!(sockets.driver().max_in_flight(), 1);
        assert!(sockets.driver().commands() > threads * 3);
        assert_eq!(sockets.stats().table.in_use, 0);
        assert_eq!(sockets.driver().inner().open_connections(), 0);
    }

    // =============================================================================
    // TEST GROUP 3: Lock timeouts under contention
    // =============================================================================

    #[test]
    fn test_receiver_lock_timeout_does_not_open_channel_to_others() {
        let sockets = Arc::new(exclusive_service());
        let connect = |sockets: &HostService<ExclusiveDriver<LoopbackDriver>>| {
            let handle = sockets.open().unwrap();
            sockets.connect(handle, "localhost", ECHO_PORT).unwrap();
            handle
        };
        let owner = connect(&sockets);
        let receiver = connect(&sockets);
        let latecomer = connect(&sockets);
        sockets
            .set_option(receiver, SocketOption::ReceiveTimeout(Duration::from_millis(10)))
            .unwrap();
        sockets.driver().hold_sends(Duration::from_millis(250));

        let slow_send = {
            let sockets = Arc::clone(&sockets);
            thread::spawn(move || sockets.send(owner, b"slow"))
        };
        thread::sleep(Duration::from_millis(40));

        // Gives up on the lock while the owner is still inside its send.
        let started = Instant::now();
        let mut buf = [0u8; 8];
        assert_eq!(sockets.recv(receiver, &mut buf), Ok(0));
        assert!(started.elapsed() < Duration::from_millis(200));

        // Must queue behind the owner instead of slipping in.
        assert_eq!(sockets.send(latecomer, b"late"), Ok(4));
        assert_eq!(slow_send.join().unwrap(), Ok(4));

        assert_eq!(sockets.driver().max_in_flight(), 1);
    }
}
