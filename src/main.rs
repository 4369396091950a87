use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use clap::Parser;
use runstash::cli::Cli;
use runstash::geocoder::Geocoder;
use runstash::nike_client::NikeClient;
use runstash::sync::SyncJob;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Cli::parse();
    info!(
        "Syncing {} most recent runs to s3://{}/{}",
        args.runs, args.bucket, args.key
    );

    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_client = S3Client::new(&config);

    let job = SyncJob::new(
        NikeClient::new(args.token),
        Geocoder::new(),
        s3_client,
        args.runs,
        args.bucket,
        args.key,
    );

    match job.run().await {
        Ok(stats) => {
            info!(
                "Sync complete: {} activities archived ({} without GPS data)",
                stats.archived, stats.without_gps
            );
        }
        Err(e) => {
            error!("Sync failed: {e:#}");
            std::process::exit(1);
        }
    }
}
