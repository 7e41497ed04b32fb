//! Candidate submission log and resume archival.
//!
//! Every completed intake is appended to a JSON-lines log under the
//! submissions directory, and the uploaded resume is archived beside it.
//! Both are append-only audit artifacts; nothing in the running service
//! reads them back.

use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::models::candidate::CandidateRecord;

const SUBMISSIONS_LOG: &str = "candidates.jsonl";
const RESUMES_SUBDIR: &str = "resumes";

/// Appends one candidate record to the submission log, creating the
/// directory and log file on first use.
pub async fn append_submission(dir: &Path, record: &CandidateRecord) -> anyhow::Result<()> {
    fs::create_dir_all(dir).await?;
    let path = dir.join(SUBMISSIONS_LOG);

    let mut line = serde_json::to_string(record)?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    file.write_all(line.as_bytes()).await?;

    info!("Logged submission for {} to {}", record.full_name(), path.display());
    Ok(())
}

/// Archives an uploaded resume under `<dir>/resumes/<session_id>_<filename>`.
/// The session id prefix keeps concurrent uploads with identical filenames
/// from clobbering each other.
pub async fn archive_resume(
    dir: &Path,
    session_id: uuid::Uuid,
    original_filename: &str,
    bytes: &[u8],
) -> anyhow::Result<PathBuf> {
    let resumes = dir.join(RESUMES_SUBDIR);
    fs::create_dir_all(&resumes).await?;

    let safe_name = sanitize_component(original_filename);
    let path = resumes.join(format!("{session_id}_{safe_name}"));
    fs::write(&path, bytes).await?;
    Ok(path)
}

/// Strips path separators and anything else odd from a client-supplied
/// filename, keeping the extension intact.
fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches('_').is_empty() {
        "resume.bin".to_owned()
    } else {
        cleaned
    }
}
