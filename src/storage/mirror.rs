//! Best-effort remote mirror of the persisted files (Google Drive folder).
//!
//! The mirror is a convenience backup channel, never the system of record:
//! callers log failures and move on, no retries, and a committed local
//! write is never rolled back because a push failed.

use serde::Deserialize;
use std::time::Duration;

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Mirror errors. These are logged by callers, never surfaced to users.
#[derive(Debug)]
pub enum MirrorError {
    /// Credentials env var set but unreadable or malformed.
    BadCredentials(String),
    Http(reqwest::Error),
    /// The service answered with a non-success status.
    Status(reqwest::StatusCode),
}

impl std::fmt::Display for MirrorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MirrorError::BadCredentials(msg) => write!(f, "Bad mirror credentials: {}", msg),
            MirrorError::Http(e) => write!(f, "Mirror request failed: {}", e),
            MirrorError::Status(code) => write!(f, "Mirror service returned {}", code),
        }
    }
}

impl std::error::Error for MirrorError {}

impl From<reqwest::Error> for MirrorError {
    fn from(e: reqwest::Error) -> Self {
        MirrorError::Http(e)
    }
}

/// Credentials for the remote folder: a bearer token and the folder id.
#[derive(Clone, Debug, Deserialize)]
pub struct MirrorCredentials {
    pub access_token: String,
    pub folder_id: String,
}

impl MirrorCredentials {
    /// Read `GDRIVE_CREDENTIALS`: either inline JSON or a path to a JSON
    /// file with `access_token` and `folder_id`. None when the var is
    /// unset (mirroring disabled).
    pub fn from_env() -> Result<Option<Self>, MirrorError> {
        let raw = match std::env::var("GDRIVE_CREDENTIALS") {
            Ok(v) if !v.trim().is_empty() => v,
            _ => return Ok(None),
        };
        let text = if raw.trim_start().starts_with('{') {
            raw
        } else {
            std::fs::read_to_string(raw.trim())
                .map_err(|e| MirrorError::BadCredentials(e.to_string()))?
        };
        let creds: MirrorCredentials = serde_json::from_str(&text)
            .map_err(|e| MirrorError::BadCredentials(e.to_string()))?;
        Ok(Some(creds))
    }
}

#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    id: String,
}

/// Client for pushing named files into one fixed remote folder with
/// overwrite-in-place (find-by-name-or-create) semantics.
#[derive(Clone, Debug)]
pub struct Mirror {
    http: reqwest::Client,
    creds: MirrorCredentials,
}

impl Mirror {
    pub fn new(creds: MirrorCredentials) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { http, creds }
    }

    /// Mirror from env credentials; None when mirroring is not configured.
    pub fn from_env() -> Result<Option<Self>, MirrorError> {
        Ok(MirrorCredentials::from_env()?.map(Self::new))
    }

    /// Upload one file into the mirror folder, replacing any existing file
    /// of the same name.
    pub async fn push_file(&self, name: &str, content: Vec<u8>) -> Result<(), MirrorError> {
        match self.find_by_name(name).await? {
            Some(id) => self.update_content(&id, content).await,
            None => {
                let id = self.create_named(name).await?;
                self.update_content(&id, content).await
            }
        }
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<String>, MirrorError> {
        let query = format!(
            "name = '{}' and '{}' in parents and trashed = false",
            name.replace('\'', "\\'"),
            self.creds.folder_id
        );
        let resp = self
            .http
            .get(DRIVE_FILES_URL)
            .bearer_auth(&self.creds.access_token)
            .query(&[("q", query.as_str()), ("fields", "files(id)")])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(MirrorError::Status(resp.status()));
        }
        let list: FileList = resp.json().await?;
        Ok(list.files.into_iter().next().map(|f| f.id))
    }

    async fn create_named(&self, name: &str) -> Result<String, MirrorError> {
        let resp = self
            .http
            .post(DRIVE_FILES_URL)
            .bearer_auth(&self.creds.access_token)
            .json(&serde_json::json!({
                "name": name,
                "parents": [self.creds.folder_id],
            }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(MirrorError::Status(resp.status()));
        }
        let file: FileRef = resp.json().await?;
        Ok(file.id)
    }

    async fn update_content(&self, id: &str, content: Vec<u8>) -> Result<(), MirrorError> {
        let resp = self
            .http
            .patch(format!("{}/{}?uploadType=media", DRIVE_UPLOAD_URL, id))
            .bearer_auth(&self.creds.access_token)
            .header("Content-Type", "application/json")
            .body(content)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(MirrorError::Status(resp.status()));
        }
        Ok(())
    }
}
