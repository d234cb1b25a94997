use std::fmt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::model::ImageRef;

/// File extensions treated as images, with their MIME types.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("heic", "image/heic"),
    ("gif", "image/gif"),
];

/// Where a photo should come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhotoSource {
    Camera,
    Gallery,
}

#[mutants::skip]
impl fmt::Display for PhotoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Camera => f.write_str("camera"),
            Self::Gallery => f.write_str("gallery"),
        }
    }
}

/// Result of one photo request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoOutcome {
    Captured(ImageRef),
    /// The user backed out of the picker; nothing to do.
    Cancelled,
    PermissionDenied(PhotoSource),
}

/// A permission-gated photo provider.
pub trait PhotoCapture: Send + Sync {
    /// Asks for access to the camera and image storage.
    fn request_permission(&self) -> BoxFuture<'_, bool>;

    /// Produces one image, or `None` if the user cancelled.
    ///
    /// Must only be called once permission has been granted.
    fn capture(&self, source: PhotoSource) -> BoxFuture<'_, Option<ImageRef>>;
}

/// Runs a full photo request: permission first, then capture.
///
/// A denied permission short-circuits without calling
/// [`PhotoCapture::capture`].
pub async fn request_photo(provider: &dyn PhotoCapture, source: PhotoSource) -> PhotoOutcome {
    if !provider.request_permission().await {
        tracing::info!(%source, "photo permission denied");
        return PhotoOutcome::PermissionDenied(source);
    }
    match provider.capture(source).await {
        Some(image) => {
            tracing::debug!(%source, uri = %image.uri, "photo selected");
            PhotoOutcome::Captured(image)
        }
        None => {
            tracing::debug!(%source, "photo request cancelled");
            PhotoOutcome::Cancelled
        }
    }
}

/// Photo provider backed by an image directory.
///
/// Access to the directory stands in for the runtime permission. The gallery
/// yields the most recently modified image; the camera waits for a new image
/// to appear (e.g. from a tethered camera) until the timeout elapses.
#[derive(Debug, Clone)]
pub struct DirectoryPhotoCapture {
    dir: PathBuf,
    camera_timeout: Duration,
    poll_interval: Duration,
}

impl DirectoryPhotoCapture {
    pub fn new(dir: impl Into<PathBuf>, camera_timeout: Duration) -> Self {
        Self {
            dir: dir.into(),
            camera_timeout,
            poll_interval: Duration::from_millis(250),
        }
    }

    /// Overrides how often the camera poll re-reads the directory.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Returns the watched directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn wait_for_new_image(&self) -> Option<ImageRef> {
        let started = SystemTime::now();
        let deadline = tokio::time::Instant::now() + self.camera_timeout;
        loop {
            if let Some(image) = newest_image(&self.dir, Some(started)).await {
                return Some(image);
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::info!(dir = %self.dir.display(), "no new photo before camera timeout");
                return None;
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

impl PhotoCapture for DirectoryPhotoCapture {
    fn request_permission(&self) -> BoxFuture<'_, bool> {
        async move {
            match tokio::fs::read_dir(&self.dir).await {
                Ok(_) => true,
                Err(err) => {
                    tracing::warn!(dir = %self.dir.display(), %err, "photo directory not accessible");
                    false
                }
            }
        }
        .boxed()
    }

    fn capture(&self, source: PhotoSource) -> BoxFuture<'_, Option<ImageRef>> {
        async move {
            match source {
                PhotoSource::Gallery => newest_image(&self.dir, None).await,
                PhotoSource::Camera => self.wait_for_new_image().await,
            }
        }
        .boxed()
    }
}

/// Returns the MIME type for an image path, or `None` if it is not an image.
fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Finds the most recently modified image in `dir`, optionally only those
/// modified after `since`.
async fn newest_image(dir: &Path, since: Option<SystemTime>) -> Option<ImageRef> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "could not list photo directory");
            return None;
        }
    };

    let mut newest: Option<(SystemTime, PathBuf, &'static str)> = None;
    while let Ok(Some(entry)) = entries.next_entry().await {
        let path = entry.path();
        let Some(mime) = image_mime_type(&path) else {
            continue;
        };
        let Ok(meta) = entry.metadata().await else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let Ok(modified) = meta.modified() else {
            continue;
        };
        if since.is_some_and(|since| modified <= since) {
            continue;
        }
        if newest.as_ref().is_none_or(|(t, _, _)| modified > *t) {
            newest = Some((modified, path, mime));
        }
    }

    newest.map(|(_, path, mime)| ImageRef {
        uri: format!("file://{}", path.display()),
        file_name: path.file_name().map(|n| n.to_string_lossy().into_owned()),
        mime_type: Some(mime.to_string()),
    })
}
