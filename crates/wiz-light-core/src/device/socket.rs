//! Async UDP transport for talking to WiZ lights.
//!
//! A [`WizSocket`] can be awaited directly with `send`/`recv`, or drive
//! exchanges in the background with `begin_send`/`begin_recv`, which
//! hand back an [`Operation`] to await later. Closing the socket wakes
//! every pending operation.

use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::debug;

use crate::device::handle::WizHandle;
use crate::error::TransportError;
use crate::protocol::WizMessage;

/// UDP port lights listen on for commands and discovery traffic.
pub const DEVICE_PORT: u16 = 38899;

/// UDP port the host binds to receive state updates pushed by lights.
pub const PILOT_PORT: u16 = 38900;

/// Upper bound on background operations in flight at once.
pub const MAX_INFLIGHT_OPS: usize = 32;

/// Receive buffer size; fits every known reply with room to spare.
const BUFFER_SIZE: usize = 1024;

/// How often a blocked receive re-checks the closed flag.
const CLOSE_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Create a UDP socket with SO_REUSEADDR/SO_REUSEPORT on a fixed port,
/// so listeners can coexist with other processes on the host.
pub fn create_reusable_socket(port: u16) -> io::Result<std::net::UdpSocket> {
    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;

    socket.set_reuse_address(true)?;

    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    socket.bind(&addr.into())?;

    socket.set_nonblocking(true)?;

    Ok(socket.into())
}

struct Inner {
    socket: UdpSocket,
    closed: AtomicBool,
    ops: Semaphore,
}

impl Inner {
    fn check_open(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(TransportError::Closed)
        } else {
            Ok(())
        }
    }

    /// Wait for the next datagram and decode it, re-checking the closed
    /// flag every `CLOSE_CHECK_INTERVAL` so `close` cannot strand us.
    async fn recv_message(&self) -> Result<(WizMessage, SocketAddr), TransportError> {
        let mut buf = vec![0u8; BUFFER_SIZE];

        loop {
            self.check_open()?;

            match timeout(CLOSE_CHECK_INTERVAL, self.socket.recv_from(&mut buf)).await {
                Ok(Ok((len, addr))) => {
                    debug!("received {} bytes from {}", len, addr);
                    let msg = WizMessage::parse(&buf[..len])?;
                    return Ok((msg, addr));
                }
                Ok(Err(e)) => return Err(TransportError::Io(e)),
                Err(_) => {
                    // Timeout, go around and look at the flag again
                }
            }
        }
    }
}

/// UDP socket wrapper for the WiZ protocol.
///
/// Cloning is cheap and every clone drives the same socket, so a clone
/// can be parked in a receive loop while another sends. Requests go to
/// the device port; replies arrive from whichever source answers, and
/// correlating them is the caller's concern.
#[derive(Clone)]
pub struct WizSocket {
    inner: Arc<Inner>,
}

impl WizSocket {
    /// Open a socket on an ephemeral port for request/reply exchanges.
    pub async fn open() -> io::Result<Self> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
        Ok(Self::from_socket(socket))
    }

    /// Bind the fixed pilot port to receive state updates pushed by
    /// registered lights.
    pub async fn bind() -> io::Result<Self> {
        let std_socket = create_reusable_socket(PILOT_PORT)?;
        let socket = UdpSocket::from_std(std_socket)?;
        Ok(Self::from_socket(socket))
    }

    fn from_socket(socket: UdpSocket) -> Self {
        Self {
            inner: Arc::new(Inner {
                socket,
                closed: AtomicBool::new(false),
                ops: Semaphore::new(MAX_INFLIGHT_OPS),
            }),
        }
    }

    /// Encode `msg` and send it to the device behind `handle`.
    ///
    /// Returns the number of bytes put on the wire, which for UDP is
    /// always the full encoded length.
    pub async fn send(&self, msg: &WizMessage, handle: &WizHandle) -> Result<usize, TransportError> {
        self.inner.check_open()?;

        let data = msg.encode();
        let dest = SocketAddr::from((handle.ip(), DEVICE_PORT));
        let sent = self.inner.socket.send_to(&data, dest).await?;
        debug!("sent {} ({} bytes) to {}", msg.method, sent, dest);

        Ok(sent)
    }

    /// Wait for the next datagram from anyone and decode it.
    pub async fn recv(&self) -> Result<(WizMessage, SocketAddr), TransportError> {
        self.inner.recv_message().await
    }

    /// Like [`recv`](Self::recv), giving up after `wait`.
    pub async fn recv_timeout(
        &self,
        wait: Duration,
    ) -> Result<(WizMessage, SocketAddr), TransportError> {
        match timeout(wait, self.recv()).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Io(io::Error::new(
                io::ErrorKind::TimedOut,
                "no reply within the receive window",
            ))),
        }
    }

    /// Start a send on a background task and return immediately.
    ///
    /// `token` is any caller value to be carried through to completion,
    /// typically whatever is needed to make sense of the outcome.
    pub fn begin_send<C>(
        &self,
        msg: &WizMessage,
        handle: &WizHandle,
        token: C,
    ) -> Operation<usize, C> {
        let inner = Arc::clone(&self.inner);
        let data = msg.encode();
        let dest = SocketAddr::from((handle.ip(), DEVICE_PORT));

        let task = tokio::spawn(async move {
            let _permit = inner
                .ops
                .acquire()
                .await
                .map_err(|_| TransportError::Closed)?;
            inner.check_open()?;

            let sent = inner.socket.send_to(&data, dest).await?;
            Ok(sent)
        });

        Operation { task, token }
    }

    /// Start a receive on a background task and return immediately.
    pub fn begin_recv<C>(&self, token: C) -> Operation<(WizMessage, SocketAddr), C> {
        let inner = Arc::clone(&self.inner);

        let task = tokio::spawn(async move {
            let _permit = inner
                .ops
                .acquire()
                .await
                .map_err(|_| TransportError::Closed)?;
            inner.recv_message().await
        });

        Operation { task, token }
    }

    /// Close the socket.
    ///
    /// Idempotent and callable from any task. Pending operations finish
    /// with [`TransportError::Closed`] within one flag-check interval;
    /// operations started afterwards fail immediately.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.ops.close();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Local address of the underlying socket.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.inner.socket.local_addr()
    }
}

/// A background transfer started with `begin_send` or `begin_recv`.
///
/// Completes exactly once: either the transfer's value or a transport
/// error, alongside the caller's token.
pub struct Operation<T, C> {
    task: JoinHandle<Result<T, TransportError>>,
    token: C,
}

impl<T, C> Operation<T, C> {
    /// The token this operation was started with.
    pub fn token(&self) -> &C {
        &self.token
    }

    /// Wait for the transfer to finish and give the token back.
    ///
    /// An operation whose task was torn down before completing reports
    /// [`TransportError::Interrupted`].
    pub async fn wait(self) -> (Result<T, TransportError>, C) {
        let result = match self.task.await {
            Ok(outcome) => outcome,
            Err(_) => Err(TransportError::Interrupted),
        };

        (result, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::WizMethod;

    fn loopback_handle() -> WizHandle {
        WizHandle::new("a8bb5006033d", Ipv4Addr::LOCALHOST).unwrap()
    }

    #[tokio::test]
    async fn test_send_reports_encoded_length() {
        let socket = WizSocket::open().await.unwrap();
        let msg = WizMessage::get_pilot();

        let sent = socket.send(&msg, &loopback_handle()).await.unwrap();
        assert_eq!(sent, msg.encode().len());
    }

    #[tokio::test]
    async fn test_begin_send_completes_with_token() {
        let socket = WizSocket::open().await.unwrap();
        let msg = WizMessage::get_pilot();

        let op = socket.begin_send(&msg, &loopback_handle(), 42u32);
        let (result, token) = op.wait().await;

        assert_eq!(token, 42);
        assert_eq!(result.unwrap(), msg.encode().len());
    }

    #[tokio::test]
    async fn test_recv_rejects_garbage_datagram() {
        let socket = WizSocket::open().await.unwrap();
        let port = socket.local_addr().unwrap().port();

        let sender = UdpSocket::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        sender
            .send_to(b"not json", (Ipv4Addr::LOCALHOST, port))
            .await
            .unwrap();

        let err = socket.recv().await.unwrap_err();
        assert!(matches!(err, TransportError::Parse(_)));
    }

    #[tokio::test]
    async fn test_recv_timeout_elapses() {
        let socket = WizSocket::open().await.unwrap();

        let err = socket
            .recv_timeout(Duration::from_millis(50))
            .await
            .unwrap_err();
        match err {
            TransportError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::TimedOut),
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_request_reply_roundtrip() {
        // Fake light bound to the real device port on loopback
        let device = UdpSocket::bind((Ipv4Addr::LOCALHOST, DEVICE_PORT))
            .await
            .unwrap();
        let socket = WizSocket::open().await.unwrap();

        let op = socket.begin_recv("query");
        socket
            .send(&WizMessage::get_pilot(), &loopback_handle())
            .await
            .unwrap();

        let mut buf = [0u8; 256];
        let (len, from) = device.recv_from(&mut buf).await.unwrap();
        let request = WizMessage::parse(&buf[..len]).unwrap();
        assert_eq!(request.method, WizMethod::GetPilot);

        let reply = br#"{"method":"getPilot","env":"pro","result":{"mac":"a8bb5006033d","rssi":-58,"state":true,"dimming":100}}"#;
        device.send_to(reply, from).await.unwrap();

        let (result, token) = op.wait().await;
        assert_eq!(token, "query");

        let (msg, _) = result.unwrap();
        assert_eq!(msg.method, WizMethod::GetPilot);
        assert_eq!(msg.result.unwrap().params.state, Some(true));
    }

    #[tokio::test]
    async fn test_close_unblocks_pending_receive() {
        let socket = WizSocket::open().await.unwrap();

        let op = socket.begin_recv("pending");
        tokio::time::sleep(Duration::from_millis(50)).await;
        socket.close();

        let (result, token) = op.wait().await;
        assert!(matches!(result, Err(TransportError::Closed)));
        assert_eq!(token, "pending");
    }

    #[tokio::test]
    async fn test_closed_socket_refuses_new_operations() {
        let socket = WizSocket::open().await.unwrap();
        socket.close();
        assert!(socket.is_closed());

        let err = socket
            .send(&WizMessage::get_pilot(), &loopback_handle())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Closed));

        let (result, _) = socket.begin_recv(()).wait().await;
        assert!(matches!(result, Err(TransportError::Closed)));
    }

    #[tokio::test]
    async fn test_close_completes_every_pending_operation() {
        let socket = WizSocket::open().await.unwrap();

        // More operations than permits, so some are queued when we close
        let ops: Vec<_> = (0..MAX_INFLIGHT_OPS + 4)
            .map(|i| socket.begin_recv(i))
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        socket.close();

        for op in ops {
            let (result, _) = op.wait().await;
            assert!(matches!(result, Err(TransportError::Closed)));
        }
    }
}
