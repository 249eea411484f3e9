//! # Async Facade
//!
//! Runs the blocking sockets API on tokio's blocking pool so async callers
//! never stall a runtime worker on the channel lock or the receive loop.

use std::sync::Arc;

use tokio::task;
use tracing::warn;

use crate::domain::errors::{SocketError, SocketResult};
use crate::domain::options::SocketOption;
use crate::domain::slot::SocketHandle;
use crate::ports::inbound::SocketsApi;

/// Async wrapper around any `SocketsApi`.
pub struct AsyncSockets<A> {
    inner: Arc<A>,
}

impl<A> Clone for AsyncSockets<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: SocketsApi + 'static> AsyncSockets<A> {
    pub fn new(inner: Arc<A>) -> Self {
        Self { inner }
    }

    /// The wrapped blocking API.
    pub fn blocking(&self) -> &Arc<A> {
        &self.inner
    }

    pub async fn open(&self) -> SocketResult<SocketHandle> {
        self.run("open", |api| api.open()).await
    }

    pub async fn close(&self, handle: SocketHandle) -> SocketResult<()> {
        self.run("close", move |api| api.close(handle)).await
    }

    pub async fn connect(
        &self,
        handle: SocketHandle,
        host: impl Into<String>,
        port: u16,
    ) -> SocketResult<()> {
        let host = host.into();
        self.run("connect", move |api| api.connect(handle, &host, port))
            .await
    }

    pub async fn disconnect(&self, handle: SocketHandle) -> SocketResult<()> {
        self.run("disconnect", move |api| api.disconnect(handle))
            .await
    }

    /// Receive up to `max_len` bytes. An empty vector means the receive timed out.
    ///
    /// The buffer never exceeds the API's transfer limit, whatever `max_len` asks for.
    pub async fn recv(&self, handle: SocketHandle, max_len: usize) -> SocketResult<Vec<u8>> {
        self.run("recv", move |api| {
            let mut buffer = vec![0u8; max_len.min(api.max_transfer_size())];
            let received = api.recv(handle, &mut buffer)?;
            buffer.truncate(received);
            Ok(buffer)
        })
        .await
    }

    pub async fn send(&self, handle: SocketHandle, data: Vec<u8>) -> SocketResult<usize> {
        self.run("send", move |api| api.send(handle, &data)).await
    }

    pub async fn set_option(&self, handle: SocketHandle, option: SocketOption) -> SocketResult<()> {
        self.run("set_option", move |api| api.set_option(handle, option))
            .await
    }

    async fn run<R, F>(&self, operation: &'static str, f: F) -> SocketResult<R>
    where
        R: Send + 'static,
        F: FnOnce(&A) -> SocketResult<R> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        task::spawn_blocking(move || f(inner.as_ref()))
            .await
            .map_err(|e| {
                warn!(operation, error = %e, "[wifi-sockets] blocking socket task failed");
                SocketError::TaskFailed { operation }
            })?
    }
}
