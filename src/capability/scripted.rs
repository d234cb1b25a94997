//! Canned providers for tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::mpsc;

use super::error::ScanError;
use super::photo::{PhotoCapture, PhotoSource};
use super::qr::{QrDecoder, ScanSession};
use crate::model::ImageRef;

/// Photo provider with a fixed permission answer and capture result.
#[derive(Debug)]
pub(crate) struct ScriptedPhotoCapture {
    granted: bool,
    image: Option<ImageRef>,
    pub(crate) captures: AtomicUsize,
}

impl ScriptedPhotoCapture {
    pub(crate) fn granted(image: Option<ImageRef>) -> Self {
        Self {
            granted: true,
            image,
            captures: AtomicUsize::new(0),
        }
    }

    pub(crate) fn denied() -> Self {
        Self {
            granted: false,
            image: None,
            captures: AtomicUsize::new(0),
        }
    }
}

impl PhotoCapture for ScriptedPhotoCapture {
    fn request_permission(&self) -> BoxFuture<'_, bool> {
        futures::future::ready(self.granted).boxed()
    }

    fn capture(&self, _source: PhotoSource) -> BoxFuture<'_, Option<ImageRef>> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        futures::future::ready(self.image.clone()).boxed()
    }
}

/// QR decoder that replays a fixed list of reads, or fails to start.
#[derive(Debug, Default)]
pub(crate) struct ScriptedQrDecoder {
    reads: Vec<String>,
    broken: bool,
}

impl ScriptedQrDecoder {
    pub(crate) fn reads(reads: &[&str]) -> Self {
        Self {
            reads: reads.iter().map(|r| r.to_string()).collect(),
            broken: false,
        }
    }

    pub(crate) fn broken() -> Self {
        Self {
            reads: Vec::new(),
            broken: true,
        }
    }
}

impl QrDecoder for ScriptedQrDecoder {
    fn start(&self) -> BoxFuture<'_, Result<ScanSession, ScanError>> {
        async move {
            if self.broken {
                return Err(ScanError::Open {
                    path: "/dev/null/scanner".into(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            let (tx, rx) = mpsc::channel(self.reads.len().max(1));
            for read in &self.reads {
                // Capacity covers every read, so this never waits.
                let _ = tx.send(read.clone()).await;
            }
            Ok(ScanSession::from_channel(rx))
        }
        .boxed()
    }

    fn describe(&self) -> String {
        "scripted scanner".to_string()
    }
}
