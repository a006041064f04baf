//! Shared test doubles for the client integration tests.
//!
//! - [`ScriptedConnector`]: in-memory connector whose connects and writes
//!   follow a script, for exercising the reset and error paths exactly.
//! - [`FakeDevice`]: a real TCP listener that decodes incoming frames.
//! - [`RecordingObserver`]: collects observer events as strings.

#![allow(dead_code)]

use magichome_client::transport::Connector;
use magichome_client::{ConnectionObserver, Frame, MagicHomeError};
use magichome_protocol::frame::{OPCODE_SET_COLOR, OPCODE_SET_POWER};
use magichome_protocol::socket::DeviceSocket;
use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::io::{AsyncReadExt, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Split a byte log into frames, asserting every checksum.
pub fn split_frames(mut bytes: &[u8]) -> Vec<Frame> {
    let mut frames = Vec::new();
    while !bytes.is_empty() {
        let len = frame_len(bytes[0]);
        assert!(bytes.len() >= len, "truncated frame in {:02X?}", bytes);
        let frame = Frame::from_bytes(bytes[..len].to_vec())
            .unwrap_or_else(|e| panic!("corrupt frame {:02X?}: {}", &bytes[..len], e));
        frames.push(frame);
        bytes = &bytes[len..];
    }
    frames
}

fn frame_len(opcode: u8) -> usize {
    match opcode {
        OPCODE_SET_COLOR => 8,
        OPCODE_SET_POWER => 4,
        other => panic!("unknown opcode {:#04x}", other),
    }
}

#[derive(Default)]
struct ScriptState {
    connect_errors: VecDeque<Option<io::ErrorKind>>,
    write_errors: VecDeque<Option<io::ErrorKind>>,
    chunk_size: Option<usize>,
    stall_connects: bool,
    stall_writes: bool,
    connects: usize,
    shutdowns: usize,
    open: usize,
    max_open: usize,
    written: Vec<u8>,
}

/// In-memory connector driven by a script.
///
/// Each connect pops the next connect outcome and each `poll_write` pops
/// the next write outcome; an empty queue means success.
#[derive(Clone, Default)]
pub struct ScriptedConnector {
    state: Arc<Mutex<ScriptState>>,
}

impl ScriptedConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue connect outcomes: `None` succeeds, `Some(kind)` fails.
    pub fn with_connects(
        self,
        outcomes: impl IntoIterator<Item = Option<io::ErrorKind>>,
    ) -> Self {
        self.state.lock().unwrap().connect_errors.extend(outcomes);
        self
    }

    /// Queue write outcomes: `None` succeeds, `Some(kind)` fails.
    pub fn with_writes(
        self,
        outcomes: impl IntoIterator<Item = Option<io::ErrorKind>>,
    ) -> Self {
        self.state.lock().unwrap().write_errors.extend(outcomes);
        self
    }

    /// Accept at most `size` bytes per write and return `Pending` between
    /// chunks, so a frame takes several polls to go out.
    pub fn with_chunked_writes(self, size: usize) -> Self {
        self.state.lock().unwrap().chunk_size = Some(size);
        self
    }

    /// Connection attempts never complete.
    pub fn with_stalled_connects(self) -> Self {
        self.state.lock().unwrap().stall_connects = true;
        self
    }

    /// Writes stay `Pending` forever without waking the task.
    pub fn with_stalled_writes(self) -> Self {
        self.state.lock().unwrap().stall_writes = true;
        self
    }

    pub fn connects(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn shutdowns(&self) -> usize {
        self.state.lock().unwrap().shutdowns
    }

    pub fn open_streams(&self) -> usize {
        self.state.lock().unwrap().open
    }

    pub fn max_open_streams(&self) -> usize {
        self.state.lock().unwrap().max_open
    }

    pub fn pending_write_outcomes(&self) -> usize {
        self.state.lock().unwrap().write_errors.len()
    }

    /// Every frame successfully written, across all connections.
    pub fn frames(&self) -> Vec<Frame> {
        split_frames(&self.state.lock().unwrap().written)
    }
}

impl Connector for ScriptedConnector {
    type Stream = ScriptedStream;

    async fn connect(&self, host: &str, port: u16) -> io::Result<ScriptedStream> {
        let stall = {
            let mut state = self.state.lock().unwrap();
            state.connects += 1;
            state.stall_connects
        };
        if stall {
            std::future::pending::<()>().await;
        }

        {
            let mut state = self.state.lock().unwrap();
            if let Some(Some(kind)) = state.connect_errors.pop_front() {
                return Err(io::Error::from(kind));
            }
            state.open += 1;
            state.max_open = state.max_open.max(state.open);
        }

        Ok(ScriptedStream {
            state: Arc::clone(&self.state),
            peer: format!("{}:{}", host, port),
            yield_next: true,
        })
    }
}

pub struct ScriptedStream {
    state: Arc<Mutex<ScriptState>>,
    peer: String,
    yield_next: bool,
}

impl DeviceSocket for ScriptedStream {
    fn peer_endpoint(&self) -> String {
        self.peer.clone()
    }
}

impl AsyncWrite for ScriptedStream {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let (chunk_size, stall) = {
            let state = self.state.lock().unwrap();
            (state.chunk_size, state.stall_writes)
        };
        if stall {
            return Poll::Pending;
        }
        if let Some(size) = chunk_size {
            if self.yield_next {
                self.yield_next = false;
                cx.waker().wake_by_ref();
                return Poll::Pending;
            }
            self.yield_next = true;
            let n = size.min(buf.len());
            self.state
                .lock()
                .unwrap()
                .written
                .extend_from_slice(&buf[..n]);
            return Poll::Ready(Ok(n));
        }

        let mut state = self.state.lock().unwrap();
        if let Some(Some(kind)) = state.write_errors.pop_front() {
            return Poll::Ready(Err(io::Error::from(kind)));
        }
        state.written.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.state.lock().unwrap().shutdowns += 1;
        Poll::Ready(Ok(()))
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.open -= 1;
        }
    }
}

/// Observer that records every event as a short string.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ConnectionObserver for RecordingObserver {
    fn on_connecting(&self, addr: &str) {
        self.push(format!("connecting {}", addr));
    }

    fn on_connected(&self, peer: &str) {
        self.push(format!("connected {}", peer));
    }

    fn on_connection_reset(&self, addr: &str, _error: &MagicHomeError) {
        self.push(format!("reset {}", addr));
    }

    fn on_disconnected(&self, peer: &str) {
        self.push(format!("disconnected {}", peer));
    }

    fn on_frame_sent(&self, _peer: &str, frame: &Frame) {
        self.push(format!("sent {}", frame));
    }
}

/// A device stand-in listening on a real TCP port.
///
/// Every decoded frame is forwarded with the index of the connection it
/// arrived on. With `reset_after` set, each connection is torn down with an
/// RST after that many frames.
pub struct FakeDevice {
    pub port: u16,
    accepts: Arc<AtomicUsize>,
    frames: mpsc::UnboundedReceiver<(usize, Frame)>,
}

impl FakeDevice {
    pub async fn start() -> Self {
        Self::start_with_reset(None).await
    }

    pub async fn start_with_reset(reset_after: Option<usize>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepts = Arc::new(AtomicUsize::new(0));
        let (tx, frames) = mpsc::unbounded_channel();

        let counter = Arc::clone(&accepts);
        tokio::spawn(async move {
            loop {
                let Ok((socket, _)) = listener.accept().await else {
                    return;
                };
                let index = counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(socket, index, reset_after, tx.clone()));
            }
        });

        Self {
            port,
            accepts,
            frames,
        }
    }

    pub fn accepts(&self) -> usize {
        self.accepts.load(Ordering::SeqCst)
    }

    /// Wait for the next decoded frame.
    pub async fn next_frame(&mut self) -> (usize, Frame) {
        tokio::time::timeout(std::time::Duration::from_secs(5), self.frames.recv())
            .await
            .expect("timed out waiting for frame")
            .expect("device task ended")
    }
}

async fn serve(
    mut socket: TcpStream,
    index: usize,
    reset_after: Option<usize>,
    tx: mpsc::UnboundedSender<(usize, Frame)>,
) {
    let mut received = 0;
    loop {
        let mut opcode = [0u8; 1];
        if socket.read_exact(&mut opcode).await.is_err() {
            return;
        }
        let mut rest = vec![0u8; frame_len(opcode[0]) - 1];
        if socket.read_exact(&mut rest).await.is_err() {
            return;
        }
        let mut bytes = opcode.to_vec();
        bytes.extend_from_slice(&rest);
        let frame = Frame::from_bytes(bytes).expect("device received corrupt frame");
        let _ = tx.send((index, frame));

        received += 1;
        if reset_after == Some(received) {
            #[allow(deprecated)]
            let _ = socket.set_linger(Some(std::time::Duration::ZERO));
            return;
        }
    }
}
