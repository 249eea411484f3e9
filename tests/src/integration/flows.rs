//! # Socket Lifecycle Flows
//!
//! Open, connect, echo, disconnect on the loopback co-processor, plus the
//! wall-clock behaviour of the emulated receive timeout.

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use wifi_sockets::{
        ChannelDriver, LoopbackDriver, SocketError, SocketOption, SocketsApi, SocketsConfig,
    };

    use crate::fixtures::{loopback_service, loopback_service_with, ECHO_PORT};

    // =============================================================================
    // TEST GROUP 1: End-to-end echo
    // =============================================================================

    #[test]
    fn test_echo_round_trip() {
        let sockets = loopback_service();
        sockets.init().unwrap();

        let handle = sockets.open().unwrap();
        sockets.connect(handle, "localhost", ECHO_PORT).unwrap();
        assert!(sockets.socket_info(handle).unwrap().flags.is_connected());

        assert_eq!(sockets.send(handle, b"hello co-processor").unwrap(), 18);
        let mut buf = [0u8; 32];
        let n = sockets.recv(handle, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello co-processor");

        sockets.disconnect(handle).unwrap();
        assert_eq!(sockets.driver().open_connections(), 0);
        assert_eq!(sockets.stats().table.in_use, 0);
    }

    #[test]
    fn test_sockets_on_separate_channels_do_not_cross_talk() {
        let sockets = loopback_service();
        let a = sockets.open().unwrap();
        let b = sockets.open().unwrap();
        sockets.connect(a, "localhost", ECHO_PORT).unwrap();
        sockets.connect(b, "127.0.0.1", ECHO_PORT).unwrap();

        sockets.send(a, b"from-a").unwrap();
        sockets.send(b, b"from-b").unwrap();

        let mut buf = [0u8; 16];
        let n = sockets.recv(b, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"from-b");
        let n = sockets.recv(a, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"from-a");
    }

    #[test]
    fn test_connect_to_unknown_host_fails_resolution() {
        let sockets = loopback_service();
        let handle = sockets.open().unwrap();

        let result = sockets.connect(handle, "nowhere.invalid", ECHO_PORT);

        assert_eq!(
            result,
            Err(SocketError::AddressResolutionFailed {
                host: "nowhere.invalid".to_string()
            })
        );
        assert!(!sockets.socket_info(handle).unwrap().flags.is_connected());
        assert_eq!(sockets.driver().open_connections(), 0);
    }

    #[test]
    fn test_custom_host_resolves_through_driver() {
        let driver = LoopbackDriver::new().with_host("echo.lan", "10.1.2.3".parse().unwrap());
        let sockets = wifi_sockets::SocketService::with_system_defaults(
            SocketsConfig::for_testing(),
            driver,
        )
        .unwrap();
        let handle = sockets.open().unwrap();

        sockets.connect(handle, "echo.lan", 9000).unwrap();

        let channel = sockets.socket_info(handle).unwrap().channel;
        let peer = sockets.driver().peer(channel).unwrap();
        assert_eq!(peer.to_string(), "10.1.2.3:9000");
    }

    #[test]
    fn test_send_is_partial_past_transfer_limit() {
        let config = SocketsConfig::for_testing();
        let limit = config.max_transfer_size;
        let sockets = loopback_service_with(config);
        let handle = sockets.open().unwrap();
        sockets.connect(handle, "localhost", ECHO_PORT).unwrap();

        let payload = vec![0x5A; limit * 2 + 3];
        let mut sent = 0;
        let mut calls = 0;
        while sent < payload.len() {
            let n = sockets.send(handle, &payload[sent..]).unwrap();
            assert!(n <= limit);
            sent += n;
            calls += 1;
        }
        assert_eq!(calls, 3);

        let mut echoed = Vec::new();
        let mut buf = vec![0u8; limit * 4];
        while echoed.len() < payload.len() {
            let n = sockets.recv(handle, &mut buf).unwrap();
            assert!(n > 0 && n <= limit);
            echoed.extend_from_slice(&buf[..n]);
        }
        assert_eq!(echoed, payload);
    }

    // =============================================================================
    // TEST GROUP 2: Emulated receive timeout on the wall clock
    // =============================================================================

    #[test]
    fn test_recv_without_data_returns_zero_after_timeout() {
        let sockets = loopback_service();
        let handle = sockets.open().unwrap();
        sockets.connect(handle, "localhost", ECHO_PORT).unwrap();
        sockets
            .set_option(handle, SocketOption::ReceiveTimeout(Duration::from_millis(60)))
            .unwrap();

        let started = Instant::now();
        let mut buf = [0u8; 8];
        let n = sockets.recv(handle, &mut buf).unwrap();
        let elapsed = started.elapsed();

        assert_eq!(n, 0);
        assert!(elapsed >= Duration::from_millis(60), "returned after {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2), "returned after {elapsed:?}");
    }

    #[test]
    fn test_recv_picks_up_data_arriving_mid_wait() {
        let sockets = std::sync::Arc::new(loopback_service());
        let handle = sockets.open().unwrap();
        sockets.connect(handle, "localhost", ECHO_PORT).unwrap();
        sockets
            .set_option(handle, SocketOption::ReceiveTimeout(Duration::from_secs(2)))
            .unwrap();
        let channel = sockets.socket_info(handle).unwrap().channel;

        let peer = {
            let sockets = std::sync::Arc::clone(&sockets);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(40));
                assert!(sockets.driver().push_incoming(channel, b"late"));
            })
        };

        let started = Instant::now();
        let mut buf = [0u8; 8];
        let n = sockets.recv(handle, &mut buf).unwrap();
        peer.join().unwrap();

        assert_eq!(&buf[..n], b"late");
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_zero_receive_timeout_polls_once() {
        let sockets = loopback_service();
        let handle = sockets.open().unwrap();
        sockets.connect(handle, "localhost", ECHO_PORT).unwrap();
        sockets
            .set_option(handle, SocketOption::ReceiveTimeout(Duration::ZERO))
            .unwrap();

        let started = Instant::now();
        let mut buf = [0u8; 8];
        assert_eq!(sockets.recv(handle, &mut buf).unwrap(), 0);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    // =============================================================================
    // TEST GROUP 3: Handle lifetime
    // =============================================================================

    #[test]
    fn test_handle_is_stale_after_disconnect() {
        let sockets = loopback_service();
        let old = sockets.open().unwrap();
        sockets.connect(old, "localhost", ECHO_PORT).unwrap();
        sockets.disconnect(old).unwrap();

        let new = sockets.open().unwrap();
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());

        assert!(matches!(
            sockets.send(old, b"x"),
            Err(SocketError::InvalidHandle { .. })
        ));
        assert!(matches!(
            sockets.disconnect(old),
            Err(SocketError::InvalidHandle { .. })
        ));
        assert!(sockets.socket_info(new).unwrap().in_use);
    }

    #[test]
    fn test_close_is_local_and_keeps_module_connection() {
        let sockets = loopback_service();
        let handle = sockets.open().unwrap();
        sockets.connect(handle, "localhost", ECHO_PORT).unwrap();

        sockets.close(handle).unwrap();

        assert_eq!(sockets.stats().table.in_use, 0);
        // Close never talks to the co-processor.
        assert_eq!(sockets.driver().open_connections(), 1);
        let channel = sockets.sockets()[handle.index()].channel;
        assert!(sockets.driver().close_connection(channel).is_ok());
    }
}
