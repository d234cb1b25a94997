use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::ProviderEvent;
use super::error::ScanError;

/// Buffered reads per session before the reader waits for the consumer.
const SESSION_BUFFER: usize = 16;

/// Failure reason when a session ends without delivering a code.
const SCANNER_CLOSED: &str = "scanner closed";

/// What a scan session reports to the event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A code was decoded. The payload is accepted verbatim.
    Decoded(String),
    /// The scanner could not be started, or closed without a read.
    Failed(String),
}

/// A continuously active scan: one item per code that enters the frame.
#[derive(Debug)]
pub struct ScanSession {
    reads: mpsc::Receiver<String>,
    reader: Option<JoinHandle<()>>,
}

impl ScanSession {
    /// Wraps a channel of decoded payloads.
    pub fn from_channel(reads: mpsc::Receiver<String>) -> Self {
        Self {
            reads,
            reader: None,
        }
    }

    fn with_reader(reads: mpsc::Receiver<String>, reader: JoinHandle<()>) -> Self {
        Self {
            reads,
            reader: Some(reader),
        }
    }

    /// Waits for the next decoded payload; `None` once the scanner is gone.
    pub async fn next_read(&mut self) -> Option<String> {
        self.reads.recv().await
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}

/// A QR decoding service.
pub trait QrDecoder: Send + Sync {
    /// Opens a scanning session.
    fn start(&self) -> BoxFuture<'_, Result<ScanSession, ScanError>>;

    /// Short description shown while scanning.
    fn describe(&self) -> String;
}

/// Collapses bursts of identical reads into one.
///
/// A payload is accepted unless it equals the last accepted payload and
/// arrives within `window` of it.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Returns `true` if `payload` read at `now` should be delivered.
    pub fn accept(&mut self, payload: &str, now: Instant) -> bool {
        if let Some((last, at)) = &self.last
            && last == payload
            && now.saturating_duration_since(*at) < self.window
        {
            return false;
        }
        self.last = Some((payload.to_string(), now));
        true
    }
}

/// Starts `decoder` and forwards debounced reads to `events` until the session
/// ends or the receiver is dropped.
///
/// Every event is stamped with `activation` so the event loop can drop reads
/// that belong to a scanner it has already closed. A session that ends before
/// delivering anything is reported as a failure.
pub async fn run_scan(
    decoder: &dyn QrDecoder,
    activation: u64,
    window: Duration,
    events: &mpsc::UnboundedSender<ProviderEvent>,
) {
    let send = |event: ScanEvent| events.send(ProviderEvent::Scan { activation, event });

    let mut session = match decoder.start().await {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!(%err, "scanner failed to start");
            let _ = send(ScanEvent::Failed(err.to_string()));
            return;
        }
    };
    tracing::debug!(scanner = %decoder.describe(), activation, "scan session started");

    let mut debouncer = Debouncer::new(window);
    let mut delivered = false;
    while let Some(payload) = session.next_read().await {
        if !debouncer.accept(&payload, Instant::now()) {
            tracing::trace!("duplicate scan suppressed");
            continue;
        }
        if send(ScanEvent::Decoded(payload)).is_err() {
            return;
        }
        delivered = true;
    }
    if !delivered {
        tracing::warn!(scanner = %decoder.describe(), "scanner closed without a read");
        let _ = send(ScanEvent::Failed(SCANNER_CLOSED.to_string()));
    }
    tracing::debug!(activation, "scan session ended");
}

/// Decoder for scanners that emit one line per code.
///
/// Hand-held scanners in serial mode show up as a device node (for example
/// `/dev/ttyACM0`); a plain file of payloads works the same way.
///
/// The device is opened once and read by a single thread for as long as it
/// stays open. Sessions subscribe to that feed, so closing a session never
/// leaves a read pending that would swallow the next code. Lines read while no
/// session is listening are discarded.
#[derive(Debug)]
pub struct LineQrDecoder {
    path: PathBuf,
    feed: Mutex<Option<broadcast::WeakSender<String>>>,
}

impl LineQrDecoder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            feed: Mutex::new(None),
        }
    }

    /// Subscribes to the running reader, if there is one.
    fn subscribe(&self) -> Option<broadcast::Receiver<String>> {
        let feed = self.feed.lock().ok()?;
        feed.as_ref()?.upgrade().map(|sender| sender.subscribe())
    }

    fn open_error(&self, source: io::Error) -> ScanError {
        ScanError::Open {
            path: self.path.clone(),
            source,
        }
    }

    /// Opens the device and starts its reader thread.
    async fn open_feed(&self) -> Result<broadcast::Receiver<String>, ScanError> {
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|source| self.open_error(source))?
            .into_std()
            .await;

        let (sender, reads) = broadcast::channel(SESSION_BUFFER);
        let weak = sender.downgrade();
        let path = self.path.clone();
        thread::Builder::new()
            .name("qr-reader".to_string())
            .spawn(move || read_lines(&path, file, &sender))
            .map_err(|source| self.open_error(source))?;

        if let Ok(mut feed) = self.feed.lock() {
            *feed = Some(weak);
        }
        Ok(reads)
    }
}

/// Publishes each trimmed, non-empty line of `file` until EOF or an error.
fn read_lines(path: &Path, file: std::fs::File, sender: &broadcast::Sender<String>) {
    for line in std::io::BufReader::new(file).lines() {
        match line {
            Ok(line) => {
                let payload = line.trim();
                if payload.is_empty() {
                    continue;
                }
                // Fails only when no session is listening.
                let _ = sender.send(payload.to_string());
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "scanner read failed");
                break;
            }
        }
    }
    tracing::debug!(path = %path.display(), "scanner reader stopped");
}

/// Moves reads from the shared feed into one session's channel.
async fn forward(mut feed: broadcast::Receiver<String>, session: mpsc::Sender<String>) {
    loop {
        match feed.recv().await {
            Ok(payload) => {
                if session.send(payload).await.is_err() {
                    break;
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "scanner reads dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

impl QrDecoder for LineQrDecoder {
    fn start(&self) -> BoxFuture<'_, Result<ScanSession, ScanError>> {
        async move {
            let feed = match self.subscribe() {
                Some(feed) => feed,
                None => self.open_feed().await?,
            };
            let (tx, rx) = mpsc::channel(SESSION_BUFFER);
            let forwarder = tokio::spawn(forward(feed, tx));
            Ok(ScanSession::with_reader(rx, forwarder))
        }
        .boxed()
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
