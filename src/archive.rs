use crate::nike_client::ActivityRecord;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::put_object::PutObjectError;
use aws_sdk_s3::primitives::ByteStream;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub enum SinkError {
    Io(std::io::Error),
    Encode(serde_json::Error),
    Upload(SdkError<PutObjectError>),
}

impl std::fmt::Display for SinkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkError::Io(e) => write!(f, "Staging file error: {e}"),
            SinkError::Encode(e) => write!(f, "Failed to encode record: {e}"),
            SinkError::Upload(e) => write!(f, "Upload failed: {e}"),
        }
    }
}

impl std::error::Error for SinkError {}

/// Newline-delimited JSON staging file. Creating the archive truncates any
/// previous content at the path, so a re-run never accumulates stale lines.
#[derive(Debug)]
pub struct ActivityArchive {
    file: File,
}

impl ActivityArchive {
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path).map_err(SinkError::Io)?;
        Ok(Self { file })
    }

    /// Append one record as a single JSON line.
    pub fn append(&mut self, record: &ActivityRecord) -> Result<(), SinkError> {
        let line = serde_json::to_string(record).map_err(SinkError::Encode)?;
        self.file.write_all(line.as_bytes()).map_err(SinkError::Io)?;
        self.file.write_all(b"\n").map_err(SinkError::Io)?;
        Ok(())
    }
}

/// Upload the staging file's full contents to S3 under `key`. The local file
/// is left on disk whether or not the upload succeeds.
pub async fn upload_archive(
    s3_client: &S3Client,
    bucket: &str,
    key: &str,
    path: &Path,
) -> Result<(), SinkError> {
    let body = tokio::fs::read(path).await.map_err(SinkError::Io)?;
    info!("Uploading {} bytes to s3://{bucket}/{key}", body.len());

    s3_client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type("application/json")
        .send()
        .await
        .map_err(SinkError::Upload)?;

    info!("Archive uploaded to S3: {key}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nike_client::MetricSummary;
    use std::fs;
    use tempdir::TempDir;

    fn record(id: &str) -> ActivityRecord {
        ActivityRecord {
            activity_id: id.to_string(),
            metric_summary: MetricSummary {
                distance: "3.1".to_string(),
                extra: serde_json::Map::new(),
            },
            gps_start: None,
            gps_end: None,
            postal: None,
            city: None,
            state: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn appends_one_json_line_per_record_in_order() {
        let tmp = TempDir::new("archive").unwrap();
        let path = tmp.path().join("runs.json");

        let mut archive = ActivityArchive::create(&path).unwrap();
        archive.append(&record("run-1")).unwrap();
        archive.append(&record("run-2")).unwrap();
        drop(archive);

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first["activityId"], "run-1");
        assert_eq!(second["activityId"], "run-2");
    }

    #[test]
    fn create_truncates_previous_content() {
        let tmp = TempDir::new("archive").unwrap();
        let path = tmp.path().join("runs.json");
        fs::write(&path, "stale line from an earlier run\n").unwrap();

        let mut archive = ActivityArchive::create(&path).unwrap();
        archive.append(&record("run-1")).unwrap();
        drop(archive);

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert!(!contents.contains("stale"));
    }

    #[test]
    fn create_fails_on_an_unwritable_path() {
        let tmp = TempDir::new("archive").unwrap();
        let path = tmp.path().join("missing-dir").join("runs.json");

        let err = ActivityArchive::create(&path).unwrap_err();
        assert!(matches!(err, SinkError::Io(_)));
    }
}
