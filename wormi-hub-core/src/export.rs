//! Calendar file export.
//!
//! An export wraps the generated document in a [`Blob`], exposes it through a
//! short-lived [`ObjectUrl`], and activates a transient [`DownloadAnchor`]
//! pointing at it. The anchor is detached and the URL revoked after activation,
//! whatever its outcome.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use uuid::Uuid;

use crate::{CalendarEvent, Error, Result, ics::IcsGenerator};

pub const CALENDAR_MIME_TYPE: &str = "text/calendar;charset=utf-8";

/// In-memory binary object tagged with a MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    data: Vec<u8>,
    mime_type: String,
}

impl Blob {
    pub fn new(data: impl Into<Vec<u8>>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn calendar(document: String) -> Self {
        Self::new(document, CALENDAR_MIME_TYPE)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Process-local reference to a [`Blob`] held by a host
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Invisible link that saves `href` under the `download` name when activated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadAnchor {
    pub id: Uuid,
    pub href: ObjectUrl,
    pub download: String,
}

impl DownloadAnchor {
    pub fn new(href: ObjectUrl, download: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            href,
            download: download.into(),
        }
    }
}

/// Result of an activated download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDownload {
    pub filename: String,
    pub size: usize,
    /// Where the host put the file, when it has a filesystem
    pub location: Option<PathBuf>,
}

/// The environment a download runs in
pub trait DownloadHost {
    fn create_object_url(&self, blob: Blob) -> Result<ObjectUrl>;

    fn attach_anchor(&self, anchor: &DownloadAnchor) -> Result<()>;

    /// Activate an attached anchor once
    fn activate(&self, anchor: &DownloadAnchor) -> Result<SavedDownload>;

    fn detach_anchor(&self, anchor: &DownloadAnchor);

    fn revoke_object_url(&self, url: &ObjectUrl);
}

/// Generate the calendar document for `event` and save it through `host` as `filename`.
///
/// The anchor is detached and the object URL revoked after activation, on
/// success and on failure alike.
pub fn export_and_download<H>(
    host: &H,
    generator: &IcsGenerator,
    event: &CalendarEvent,
    filename: &str,
) -> Result<SavedDownload>
where
    H: DownloadHost + ?Sized,
{
    let blob = Blob::calendar(generator.generate(event));
    let url = host.create_object_url(blob)?;
    let anchor = DownloadAnchor::new(url.clone(), filename);

    if let Err(e) = host.attach_anchor(&anchor) {
        host.revoke_object_url(&url);
        tracing::warn!(filename, "could not attach download anchor: {}", e);
        return Err(e);
    }

    let outcome = host.activate(&anchor);
    host.detach_anchor(&anchor);
    host.revoke_object_url(&url);

    match &outcome {
        Ok(saved) => tracing::info!(filename, size = saved.size, "calendar file exported"),
        Err(e) => tracing::warn!(filename, "calendar download refused: {}", e),
    }

    outcome
}

/// Host that writes activated downloads into a directory
#[derive(Debug)]
pub struct FsDownloadHost {
    download_dir: PathBuf,
    objects: Mutex<HashMap<ObjectUrl, Blob>>,
    anchors: Mutex<Vec<DownloadAnchor>>,
}

impl FsDownloadHost {
    pub fn new(download_dir: impl Into<PathBuf>) -> Result<Self> {
        let download_dir = download_dir.into();
        if !download_dir.exists() {
            fs::create_dir_all(&download_dir).map_err(|e| {
                Error::Config(format!(
                    "Failed to create download directory {}: {}",
                    download_dir.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            download_dir,
            objects: Mutex::new(HashMap::new()),
            anchors: Mutex::new(Vec::new()),
        })
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Object URLs created and not yet revoked
    pub fn live_object_urls(&self) -> usize {
        lock(&self.objects).len()
    }

    /// Anchors currently attached
    pub fn attached_anchors(&self) -> usize {
        lock(&self.anchors).len()
    }

    fn target_path(&self, filename: &str) -> Result<PathBuf> {
        let invalid = filename.trim().is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\']);
        if invalid {
            return Err(Error::Download(format!(
                "invalid download filename: {:?}",
                filename
            )));
        }
        Ok(self.download_dir.join(filename))
    }
}

impl DownloadHost for FsDownloadHost {
    fn create_object_url(&self, blob: Blob) -> Result<ObjectUrl> {
        let url = ObjectUrl::new(format!("blob:wormi-hub/{}", Uuid::new_v4()));
        tracing::debug!(%url, mime = blob.mime_type(), size = blob.len(), "object url created");
        lock(&self.objects).insert(url.clone(), blob);
        Ok(url)
    }

    fn attach_anchor(&self, anchor: &DownloadAnchor) -> Result<()> {
        let mut anchors = lock(&self.anchors);
        if anchors.iter().any(|a| a.id == anchor.id) {
            return Err(Error::Download("anchor already attached".to_string()));
        }
        anchors.push(anchor.clone());
        Ok(())
    }

    fn activate(&self, anchor: &DownloadAnchor) -> Result<SavedDownload> {
        if !lock(&self.anchors).iter().any(|a| a.id == anchor.id) {
            return Err(Error::Download("anchor is not attached".to_string()));
        }

        let path = self.target_path(&anchor.download)?;
        let data = lock(&self.objects)
            .get(&anchor.href)
            .map(|blob| blob.data().to_vec())
            .ok_or_else(|| Error::Download(format!("object url {} was revoked", anchor.href)))?;

        fs::write(&path, &data)?;

        Ok(SavedDownload {
            filename: anchor.download.clone(),
            size: data.len(),
            location: Some(path),
        })
    }

    fn detach_anchor(&self, anchor: &DownloadAnchor) {
        lock(&self.anchors).retain(|a| a.id != anchor.id);
    }

    fn revoke_object_url(&self, url: &ObjectUrl) {
        if lock(&self.objects).remove(url).is_some() {
            tracing::debug!(%url, "object url revoked");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
