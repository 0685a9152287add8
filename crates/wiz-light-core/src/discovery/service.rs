//! Broadcast discovery of WiZ lights on the local network.
//!
//! A registration request is broadcast to the device port, and every
//! light that answers with its MAC is reported through a callback, once
//! per device per run.

use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::device::handle::WizHandle;
use crate::device::socket::{create_reusable_socket, DEVICE_PORT};
use crate::error::Result;
use crate::protocol::WizMessage;

/// Port the discovery socket binds and broadcasts to.
pub const DISCOVERY_PORT: u16 = DEVICE_PORT;

/// Receive poll interval, so a stop request is noticed even when no
/// packets arrive.
const RECEIVE_TIMEOUT: Duration = Duration::from_millis(500);

const BUFFER_SIZE: usize = 1024;

/// Background service that finds lights by broadcasting a registration
/// request and listening for their replies.
///
/// One run reports each light once. Run it again to pick up address
/// changes or newly powered lights.
pub struct DiscoveryService {
    host_ip: Ipv4Addr,
    host_mac: [u8; 6],
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DiscoveryService {
    /// Create a service that registers `host_ip`/`host_mac` with the
    /// lights it finds.
    pub fn new(host_ip: Ipv4Addr, host_mac: [u8; 6]) -> Self {
        Self {
            host_ip,
            host_mac,
            running: Arc::new(AtomicBool::new(false)),
            worker: Mutex::new(None),
        }
    }

    /// Start listening and broadcast the registration request.
    ///
    /// `on_discover` runs on the worker task, once per light found.
    /// A no-op when the service is already running or `home_id` is 0.
    /// The listener is live before the broadcast goes out, so replies
    /// cannot race it. A worker whose loop died on a socket error needs
    /// [`stop`](Self::stop) before the service can start again.
    pub async fn start<F>(&self, home_id: u32, on_discover: F) -> Result<()>
    where
        F: FnMut(WizHandle) + Send + 'static,
    {
        if home_id == 0 {
            warn!("discovery not started: home id 0 matches no lights");
            return Ok(());
        }

        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            warn!("discovery already running");
            return Ok(());
        }

        let std_socket = create_reusable_socket(DISCOVERY_PORT)?;
        let socket = UdpSocket::from_std(std_socket)?;
        socket.set_broadcast(true)?;
        let socket = Arc::new(socket);

        self.running.store(true, Ordering::SeqCst);
        let (ready_tx, ready_rx) = oneshot::channel();
        let task = tokio::spawn(receive_loop(
            Arc::clone(&socket),
            Arc::clone(&self.running),
            ready_tx,
            on_discover,
        ));
        let _ = ready_rx.await;

        let registration = WizMessage::registration(home_id, self.host_ip, self.host_mac);
        let dest = SocketAddr::from((Ipv4Addr::BROADCAST, DISCOVERY_PORT));
        if let Err(e) = socket.send_to(&registration.encode(), dest).await {
            self.running.store(false, Ordering::SeqCst);
            let _ = task.await;
            return Err(e.into());
        }

        info!("discovery started for home {}", home_id);
        *worker = Some(task);
        Ok(())
    }

    /// Stop the receive loop and wait for it to finish.
    ///
    /// A no-op when the service never started or already stopped.
    /// Afterwards the service can be started again.
    pub async fn stop(&self) {
        let mut worker = self.worker.lock().await;
        let task = match worker.take() {
            Some(task) => task,
            None => return,
        };

        self.running.store(false, Ordering::SeqCst);
        if task.await.is_err() {
            warn!("discovery worker ended by panic");
        }
        info!("discovery stopped");
    }

    /// Whether the receive loop is live.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

/// Poll for replies until the running flag drops. A socket error ends
/// the loop; everything else is logged and skipped.
async fn receive_loop<F>(
    socket: Arc<UdpSocket>,
    running: Arc<AtomicBool>,
    ready: oneshot::Sender<()>,
    mut on_discover: F,
) where
    F: FnMut(WizHandle) + Send + 'static,
{
    let mut buf = vec![0u8; BUFFER_SIZE];
    let mut seen: HashSet<String> = HashSet::new();

    let _ = ready.send(());

    while running.load(Ordering::SeqCst) {
        match timeout(RECEIVE_TIMEOUT, socket.recv_from(&mut buf)).await {
            Ok(Ok((len, addr))) => {
                register_reply(&mut seen, &buf[..len], addr, &mut on_discover);
            }
            Ok(Err(e)) => {
                error!("discovery receive failed: {}", e);
                break;
            }
            Err(_) => {
                // Timeout, go around and look at the flag again
            }
        }
    }

    running.store(false, Ordering::SeqCst);
    debug!("discovery loop ended");
}

/// Handle one datagram from the discovery socket: classify it, drop
/// duplicate MACs, and report a first sighting to the callback.
fn register_reply<F>(seen: &mut HashSet<String>, data: &[u8], src: SocketAddr, on_discover: &mut F)
where
    F: FnMut(WizHandle),
{
    let handle = match parse_reply(data, src) {
        Some(handle) => handle,
        None => return,
    };

    if seen.insert(handle.mac().to_string()) {
        info!("discovered {}", handle);
        on_discover(handle);
    }
}

/// Extract a light's handle from one discovery datagram.
///
/// Standalone so reply classification is testable without a socket.
/// Returns `None` for anything that is not a well-formed success reply
/// carrying a MAC. The discovery socket also hears requests in flight
/// on the port, our own broadcast included; those carry no `result` and
/// fall through silently.
pub fn parse_reply(data: &[u8], src: SocketAddr) -> Option<WizHandle> {
    let msg = match WizMessage::parse(data) {
        Ok(msg) => msg,
        Err(e) => {
            warn!("ignoring malformed datagram from {}: {}", src, e);
            return None;
        }
    };

    if let Some(error) = &msg.error {
        warn!("device at {} answered {} with an error: {}", src, msg.method, error);
        return None;
    }

    let result = msg.result?;
    let mac = match result.params.mac {
        Some(mac) => mac,
        None => {
            debug!("reply from {} carries no MAC, ignoring", src);
            return None;
        }
    };

    let ip = match src {
        SocketAddr::V4(addr) => *addr.ip(),
        SocketAddr::V6(_) => {
            warn!("ignoring reply from non-IPv4 source {}", src);
            return None;
        }
    };

    match WizHandle::new(&mac, ip) {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("device at {} reported a bad MAC: {}", src, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOST_MAC: [u8; 6] = [0xf0, 0x18, 0x98, 0x09, 0x1a, 0xd8];

    fn src(last: u8) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::new(192, 168, 0, last), DEVICE_PORT))
    }

    fn reply(mac: &str) -> Vec<u8> {
        format!(
            r#"{{"method":"registration","env":"pro","result":{{"mac":"{}","success":true}}}}"#,
            mac
        )
        .into_bytes()
    }

    #[test]
    fn test_parse_reply_extracts_handle() {
        let handle = parse_reply(&reply("A8BB5006033D"), src(52)).unwrap();
        assert_eq!(handle.mac(), "a8bb5006033d");
        assert_eq!(handle.ip(), Ipv4Addr::new(192, 168, 0, 52));
    }

    #[test]
    fn test_parse_reply_skips_malformed() {
        assert!(parse_reply(b"", src(52)).is_none());
        assert!(parse_reply(b"{torn off mid", src(52)).is_none());
        assert!(parse_reply(b"\x00\x01\x02", src(52)).is_none());
    }

    #[test]
    fn test_parse_reply_skips_error_reply() {
        let data = br#"{"method":"registration","error":{"code":-32600,"message":"Invalid Request"}}"#;
        assert!(parse_reply(data, src(52)).is_none());
    }

    #[test]
    fn test_parse_reply_needs_result_and_mac() {
        // A request seen on the port, our own broadcast for instance
        let request = br#"{"method":"registration","params":{"phoneIp":"192.168.0.100","register":true}}"#;
        assert!(parse_reply(request, src(100)).is_none());

        let no_mac = br#"{"method":"registration","result":{"success":true}}"#;
        assert!(parse_reply(no_mac, src(52)).is_none());
    }

    #[test]
    fn test_parse_reply_rejects_bad_mac() {
        assert!(parse_reply(&reply("nonsense"), src(52)).is_none());
        assert!(parse_reply(&reply("a8bb5006033d00"), src(52)).is_none());
    }

    #[test]
    fn test_same_mac_reported_once_first_address_wins() {
        let mut seen = HashSet::new();
        let mut found: Vec<WizHandle> = Vec::new();

        {
            let mut on_discover = |handle| found.push(handle);
            register_reply(&mut seen, &reply("a8bb5006033d"), src(52), &mut on_discover);
            // Same light again, from a new address and in upper case
            register_reply(&mut seen, &reply("a8bb5006033d"), src(99), &mut on_discover);
            register_reply(&mut seen, &reply("A8BB5006033D"), src(120), &mut on_discover);
            register_reply(&mut seen, &reply("f0189809091a"), src(60), &mut on_discover);
        }

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].mac(), "a8bb5006033d");
        assert_eq!(found[0].ip(), Ipv4Addr::new(192, 168, 0, 52));
        assert_eq!(found[1].mac(), "f0189809091a");
    }

    #[test]
    fn test_malformed_then_wellformed_still_reports() {
        let mut seen = HashSet::new();
        let mut count = 0;

        let mut on_discover = |_handle| count += 1;
        register_reply(&mut seen, b"\xffgarbage", src(52), &mut on_discover);
        register_reply(&mut seen, &reply("a8bb5006033d"), src(52), &mut on_discover);

        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let service = DiscoveryService::new(Ipv4Addr::new(192, 168, 0, 100), HOST_MAC);
        service.stop().await;
        service.stop().await;
        assert!(!service.is_running());
    }

    #[tokio::test]
    async fn test_start_rejects_zero_home_id() {
        let service = DiscoveryService::new(Ipv4Addr::new(192, 168, 0, 100), HOST_MAC);
        service.start(0, |_| {}).await.unwrap();
        assert!(!service.is_running());
    }
}
