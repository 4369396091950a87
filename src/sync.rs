use crate::archive::{self, ActivityArchive};
use crate::geocoder::{Geocoder, Location};
use crate::nike_client::NikeClient;
use crate::transform::enrich_record;
use anyhow::{Result, anyhow};
use aws_sdk_s3::Client as S3Client;
use std::path::Path;
use tracing::info;

#[derive(Debug, Default)]
pub struct SyncStats {
    pub archived: usize,
    pub without_gps: usize,
}

pub struct SyncJob {
    nike: NikeClient,
    geocoder: Geocoder,
    s3_client: S3Client,
    runs: u32,
    bucket: String,
    key: String,
}

impl SyncJob {
    pub fn new(
        nike: NikeClient,
        geocoder: Geocoder,
        s3_client: S3Client,
        runs: u32,
        bucket: String,
        key: String,
    ) -> Self {
        Self {
            nike,
            geocoder,
            s3_client,
            runs,
            bucket,
            key,
        }
    }

    /// Fetch, enrich, and archive the configured number of recent runs, then
    /// upload the staging file to S3. Activities are processed strictly in
    /// the order the listing returned them, one at a time.
    pub async fn run(&self) -> Result<SyncStats> {
        let activities = self.nike.fetch_activities(self.runs).await?;
        info!("Fetched {} activities", activities.len());

        let mut stats = SyncStats::default();

        // The staging file handle is scoped to the write phase; the upload
        // re-reads the path from scratch afterwards.
        {
            let mut archive = ActivityArchive::create(Path::new(&self.key))?;

            for activity in activities {
                let activity_id = activity.activity_id.clone();
                info!("Processing activity {activity_id}");

                let (gps_start, gps_end) = self.nike.fetch_gps(&activity_id).await?;

                let location = if gps_start.has_fix() {
                    self.geocoder
                        .reverse(gps_start.latitude, gps_start.longitude)
                        .await?
                } else {
                    stats.without_gps += 1;
                    Location::unknown()
                };

                let enriched = enrich_record(activity, gps_start, gps_end, location)
                    .map_err(|e| {
                        anyhow!("activity {activity_id}: invalid distance in metric summary: {e}")
                    })?;

                archive.append(&enriched)?;
                stats.archived += 1;
            }
        }

        archive::upload_archive(&self.s3_client, &self.bucket, &self.key, Path::new(&self.key))
            .await?;

        info!(
            "Sync summary: {} activities archived, {} without a GPS fix",
            stats.archived, stats.without_gps
        );

        Ok(stats)
    }
}
