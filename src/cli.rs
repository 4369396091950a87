use clap::Parser;

/// Fetch recent Nike+ runs, enrich them with GPS locations, and archive them
/// to S3 as newline-delimited JSON for querying with Athena.
#[derive(Debug, Parser)]
#[command(name = "runstash", version)]
pub struct Cli {
    /// Nike API access token
    #[arg(short, long, env = "NIKE_ACCESS_TOKEN", hide_env_values = true)]
    pub token: String,

    /// Number of most-recent runs to fetch
    #[arg(short, long)]
    pub runs: u32,

    /// Destination S3 bucket
    #[arg(short, long)]
    pub bucket: String,

    /// Local staging path for the output file, also used as the S3 object key
    #[arg(short, long)]
    pub key: String,
}
