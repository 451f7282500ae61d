use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine;
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::{interval_at, sleep, Instant};

use crate::database::{to_fields, DocumentStore, MEDIA};
use crate::models::{MediaAsset, MediaCategory};
use crate::services::activity_service;
use crate::utils::AppError;

const TICK: Duration = Duration::from_millis(200);
const MAX_STEP: f64 = 30.0;
const RESET_DELAY: Duration = Duration::from_secs(2);

/// File descriptor as posted by the admin page.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadFile {
    pub name: String,
    #[serde(default)]
    pub size: i64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// Base64 file body. Only its length is used.
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadRequest {
    pub files: Vec<UploadFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingFile {
    pub name: String,
    pub size: i64,
    pub mime_type: String,
}

/// Checks the posted descriptors. Names lose any path component; a body,
/// when sent, decides the size.
pub fn prepare(files: Vec<UploadFile>) -> Result<Vec<PendingFile>, AppError> {
    if files.is_empty() {
        return Err(AppError::InvalidRequest("No files to upload".to_string()));
    }

    files
        .into_iter()
        .map(|file| {
            let name = file
                .name
                .rsplit(|c: char| c == '/' || c == '\\')
                .next()
                .unwrap_or("")
                .trim()
                .to_string();
            if name.is_empty() {
                return Err(AppError::InvalidRequest("File name is required".to_string()));
            }

            let size = match &file.content {
                Some(content) => base64::engine::general_purpose::STANDARD
                    .decode(content.trim())
                    .map(|bytes| bytes.len() as i64)
                    .map_err(|e| AppError::InvalidRequest(format!("Invalid content for {}: {}", name, e)))?,
                None if file.size < 0 => {
                    return Err(AppError::InvalidRequest(format!("Invalid size for {}", name)));
                }
                None => file.size,
            };

            Ok(PendingFile {
                name,
                size,
                mime_type: file.mime_type.trim().to_string(),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum UploadState {
    #[default]
    Idle,
    #[serde(rename_all = "camelCase")]
    InProgress {
        file: String,
        index: usize,
        total: usize,
        percent: f64,
    },
    Complete {
        count: usize,
    },
}

/// Latest upload state per uploader.
#[derive(Default)]
pub struct UploadTracker {
    channels: Mutex<HashMap<String, Arc<watch::Sender<UploadState>>>>,
}

impl UploadTracker {
    fn channel(&self, uid: &str) -> Arc<watch::Sender<UploadState>> {
        let mut channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(uid.to_string())
            .or_insert_with(|| Arc::new(watch::channel(UploadState::Idle).0))
            .clone()
    }

    /// Claims the uploader's channel for a new batch. `None` while a previous
    /// batch has not returned to `Idle`.
    pub fn try_begin(&self, uid: &str, first_file: &str, total: usize) -> Option<Arc<watch::Sender<UploadState>>> {
        let sender = self.channel(uid);
        let claimed = sender.send_if_modified(|state| {
            if *state != UploadState::Idle {
                return false;
            }
            *state = UploadState::InProgress {
                file: first_file.to_string(),
                index: 0,
                total,
                percent: 0.0,
            };
            true
        });
        claimed.then_some(sender)
    }

    pub fn state_of(&self, uid: &str) -> UploadState {
        let channels = self.channels.lock().unwrap_or_else(|e| e.into_inner());
        channels
            .get(uid)
            .map(|sender| sender.borrow().clone())
            .unwrap_or_default()
    }

    pub fn is_busy(&self, uid: &str) -> bool {
        self.state_of(uid) != UploadState::Idle
    }
}

/// Ticks every 200 ms, adding a random step below 30, until 100 is reached.
async fn simulate_progress<R: Rng>(rng: &mut R, mut on_tick: impl FnMut(f64)) {
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    let mut percent = 0.0;
    while percent < 100.0 {
        ticker.tick().await;
        percent = (percent + rng.gen::<f64>() * MAX_STEP).min(100.0);
        on_tick(percent);
    }
}

fn media_url(base: &str, millis: i64, name: &str) -> String {
    format!("{}/{}_{}", base.trim_end_matches('/'), millis, urlencoding::encode(name))
}

/// Runs a batch strictly one file at a time, writing each MediaAsset once its
/// simulated transfer reaches 100. Returns the number of assets written.
pub async fn run_upload<R: Rng + Send>(
    store: &dyn DocumentStore,
    files: Vec<PendingFile>,
    uploader: &str,
    media_base_url: &str,
    rng: &mut R,
    mut report: impl FnMut(UploadState) + Send,
) -> usize {
    let total = files.len();
    let mut written = 0;

    for (index, file) in files.into_iter().enumerate() {
        log::info!("📤 Uploading {} ({}/{})", file.name, index + 1, total);

        simulate_progress(rng, |percent| {
            report(UploadState::InProgress {
                file: file.name.clone(),
                index,
                total,
                percent,
            })
        })
        .await;

        let now = Utc::now();
        let asset = MediaAsset {
            id: String::new(),
            url: media_url(media_base_url, now.timestamp_millis(), &file.name),
            category: MediaCategory::from_mime(&file.mime_type),
            name: file.name,
            size: file.size,
            mime_type: file.mime_type,
            uploaded_by: uploader.to_string(),
            uploaded_at: now.timestamp(),
        };

        let saved = match to_fields(&asset) {
            Ok(fields) => store.create(MEDIA, fields).await,
            Err(e) => Err(e),
        };
        match saved {
            Ok(id) => {
                written += 1;
                log::info!("✅ Media saved: {} ({})", asset.name, id);
            }
            Err(e) => log::error!("❌ Failed to save media {}: {}", asset.name, e),
        }
    }

    report(UploadState::Complete { count: written });
    activity_service::record_quietly(
        store,
        "upload",
        format!("{} file(s) uploaded", written),
        Utc::now().timestamp(),
    )
    .await;

    sleep(RESET_DELAY).await;
    report(UploadState::Idle);
    written
}
