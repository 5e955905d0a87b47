//! On-disk log encoding: one JSON object per line, LF-terminated.
//!
//! This module owns the only two ways VecFS ever touches the log file: a
//! full read on first use, and a write (append or atomic rewrite) on every
//! mutation. Malformed lines are skipped here and never reach the cache.

use std::path::{Path, PathBuf};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::error::{Result, VecfsError};
use crate::store::Entry;

/// Read every entry from `path`, creating the parent directory and an empty
/// file if neither exists yet. Lines that fail to parse as an `Entry` are
/// logged and skipped; reading continues with the next line (§6.1).
pub async fn read_log(path: &Path) -> Result<Vec<Entry>> {
    ensure_file_exists(path).await?;

    let file = tokio::fs::File::open(path).await.map_err(VecfsError::Io)?;
    let mut lines = BufReader::new(file).lines();

    let mut entries = Vec::new();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await.map_err(VecfsError::Io)? {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Some(entry) => entries.push(entry),
            None => {
                tracing::warn!(line = line_no, "skipping malformed log line");
            }
        }
    }
    Ok(entries)
}

fn parse_line(line: &str) -> Option<Entry> {
    serde_json::from_str::<Entry>(line).ok()
}

async fn ensure_file_exists(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(VecfsError::Io)?;
        }
    }
    match tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
    {
        Ok(_) => Ok(()),
        Err(e) => Err(VecfsError::Io(e)),
    }
}

/// Append a single encoded entry to the log. Relies on POSIX `O_APPEND`
/// atomicity for the single `write()` call this performs — safe for the
/// small, single-line records this function emits.
pub async fn append_entry(path: &Path, entry: &Entry) -> Result<()> {
    let line = encode_line(entry)?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(VecfsError::Io)?;
    file.write_all(line.as_bytes())
        .await
        .map_err(VecfsError::Io)?;
    file.flush().await.map_err(VecfsError::Io)?;
    Ok(())
}

/// Rewrite the entire log from `entries`: write to a sibling temp file, then
/// rename over the original. `rename` is atomic on the same filesystem, so a
/// crash mid-write leaves the original log untouched (§4.3, §9).
pub async fn rewrite_log(path: &Path, entries: &[Entry]) -> Result<()> {
    let tmp_path = temp_path(path);

    let mut body = String::new();
    for entry in entries {
        body.push_str(&encode_line(entry)?);
    }

    {
        let mut tmp = tokio::fs::File::create(&tmp_path)
            .await
            .map_err(VecfsError::Io)?;
        tmp.write_all(body.as_bytes())
            .await
            .map_err(VecfsError::Io)?;
        tmp.flush().await.map_err(VecfsError::Io)?;
        tmp.sync_all().await.map_err(VecfsError::Io)?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(VecfsError::Io)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let pid = std::process::id();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "vecfs-data".to_string());
    path.with_file_name(format!("{file_name}.tmp-{pid}"))
}

fn encode_line(entry: &Entry) -> Result<String> {
    let mut line =
        serde_json::to_string(entry).map_err(|e| VecfsError::StorageFailure(e.to_string()))?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::SparseVector;
    use serde_json::json;

    fn sample_entry(id: &str) -> Entry {
        Entry {
            id: id.to_string(),
            vector: SparseVector::from_map([(1, 1.0)].into_iter().collect()),
            metadata: json!({"text": "hello"}).as_object().unwrap().clone(),
            score: 0.0,
            timestamp: 1000,
            extra: Default::default(),
        }
    }

    #[tokio::test]
    async fn read_log_creates_missing_file_and_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("log.jsonl");
        let entries = read_log(&path).await.unwrap();
        assert!(entries.is_empty());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn append_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        let entry = sample_entry("a");
        append_entry(&path, &entry).await.unwrap();

        let entries = read_log(&path).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "a");
    }

    #[tokio::test]
    async fn rewrite_replaces_file_contents_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        append_entry(&path, &sample_entry("a")).await.unwrap();

        rewrite_log(&path, &[sample_entry("b"), sample_entry("c")])
            .await
            .unwrap();

        let entries = read_log(&path).await.unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn rewrite_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        rewrite_log(&path, &[sample_entry("a")]).await.unwrap();

        let tmp = temp_path(&path);
        assert!(!tmp.exists());
    }

    #[tokio::test]
    async fn malformed_line_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        tokio::fs::write(&path, b"not json\n{\"id\":\"a\",\"vector\":{},\"score\":0.0,\"timestamp\":1}\n")
            .await
            .unwrap();

        let entries = read_log(&path).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "a");
    }

    #[tokio::test]
    async fn unknown_top_level_keys_round_trip_via_extra() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.jsonl");
        tokio::fs::write(
            &path,
            b"{\"id\":\"a\",\"vector\":{},\"score\":0.0,\"timestamp\":1,\"future_field\":42}\n",
        )
        .await
        .unwrap();

        let entries = read_log(&path).await.unwrap();
        assert_eq!(entries[0].extra.get("future_field"), Some(&json!(42)));

        rewrite_log(&path, &entries).await.unwrap();
        let reread = read_log(&path).await.unwrap();
        assert_eq!(reread[0].extra.get("future_field"), Some(&json!(42)));
    }
}
