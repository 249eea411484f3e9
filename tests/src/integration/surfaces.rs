//! # Configuration and Async Surfaces
//!
//! A service built from a TOML file, and the tokio facade driving the same
//! blocking core from many tasks.

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::time::Duration;

    use tempfile::NamedTempFile;
    use wifi_sockets::{
        AsyncSockets, ConfigError, LoopbackDriver, MutexChannelLock, SocketError, SocketService,
        SocketsApi, SystemTimeSource, ThreadScheduler, TomlConfigProvider,
    };

    use crate::fixtures::{loopback_service, ECHO_PORT};

    // =============================================================================
    // TEST GROUP 1: TOML configuration
    // =============================================================================

    #[test]
    fn test_service_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[sockets]\nmax_sockets = 2\nreceive_timeout_ms = 40\nmax_transfer_size = 16"
        )
        .unwrap();

        let provider = TomlConfigProvider::load(file.path()).unwrap();
        let sockets = SocketService::from_provider(
            &provider,
            LoopbackDriver::new(),
            MutexChannelLock::new(),
            SystemTimeSource::new(),
            ThreadScheduler,
        )
        .unwrap();

        let a = sockets.open().unwrap();
        let _b = sockets.open().unwrap();
        assert_eq!(sockets.open(), Err(SocketError::NoResourceAvailable));

        let info = sockets.socket_info(a).unwrap();
        assert_eq!(info.receive_timeout, Duration::from_millis(40));

        sockets.connect(a, "localhost", ECHO_PORT).unwrap();
        assert_eq!(sockets.send(a, &[1u8; 40]).unwrap(), 16);
    }

    #[test]
    fn test_invalid_toml_values_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[sockets]\nmax_sockets = 0").unwrap();

        assert!(matches!(
            TomlConfigProvider::load(file.path()),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_config_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        match TomlConfigProvider::load(&path) {
            Err(ConfigError::Io { path: reported, .. }) => {
                assert!(reported.ends_with("absent.toml"));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    // =============================================================================
    // TEST GROUP 2: Async facade
    // =============================================================================

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_async_clients_share_the_table() {
        let sockets = AsyncSockets::new(Arc::new(loopback_service()));
        let capacity = sockets.blocking().config().max_sockets;

        let mut tasks = Vec::new();
        for id in 0..capacity {
            let sockets = sockets.clone();
            tasks.push(tokio::spawn(async move {
                let handle = sockets.open().await.unwrap();
                sockets.connect(handle, "localhost", ECHO_PORT).await.unwrap();
                let payload = vec![id as u8; 24];
                assert_eq!(sockets.send(handle, payload.clone()).await.unwrap(), 24);
                let echoed = sockets.recv(handle, 64).await.unwrap();
                sockets.disconnect(handle).await.unwrap();
                echoed == payload
            }));
        }

        for task in tasks {
            assert!(task.await.unwrap());
        }
        assert_eq!(sockets.blocking().stats().table.in_use, 0);
    }

    #[tokio::test]
    async fn test_async_recv_timeout_yields_empty_vec() {
        let sockets = AsyncSockets::new(Arc::new(loopback_service()));
        let handle = sockets.open().await.unwrap();
        sockets.connect(handle, "localhost", ECHO_PORT).await.unwrap();
        sockets
            .set_option(
                handle,
                wifi_sockets::SocketOption::ReceiveTimeout(Duration::from_millis(20)),
            )
            .await
            .unwrap();

        let data = sockets.recv(handle, 32).await.unwrap();

        assert!(data.is_empty());
    }
}
