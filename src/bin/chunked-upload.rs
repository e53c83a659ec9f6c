//! Upload a local file through the presigned URL API.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use presign_uploads::client::{UploadClient, DEFAULT_CONCURRENCY};
use presign_uploads::upload::CHUNK_SIZE;

const DEFAULT_API_URL: &str = "http://localhost:3000/api/v1/uploads";

#[derive(Parser)]
#[command(version, about = "Upload a file to S3 through presigned URLs")]
struct Cli {
    /// File to upload
    file: PathBuf,

    /// Base URL of the uploads API
    #[arg(long, env = "UPLOAD_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// MIME type, guessed from the extension when omitted
    #[arg(long)]
    content_type: Option<String>,

    /// Parts uploaded at the same time
    #[arg(long, default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Part size in bytes; smaller files use a single PUT
    #[arg(long, default_value_t = CHUNK_SIZE)]
    chunk_size: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "presign_uploads=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let content_type = match cli.content_type {
        Some(content_type) => content_type,
        None => mime_guess::from_path(&cli.file)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .with_context(|| format!("Cannot guess content type of {}", cli.file.display()))?,
    };

    let client = UploadClient::new(cli.api_url)
        .with_chunk_size(cli.chunk_size)
        .with_concurrency(cli.concurrency);

    let outcome = client
        .upload_file(&cli.file, &content_type)
        .await
        .with_context(|| format!("Upload of {} failed", cli.file.display()))?;

    tracing::info!(
        key = %outcome.key,
        size = outcome.size,
        parts = outcome.parts,
        "File uploaded successfully"
    );
    println!("{}", outcome.public_link);

    Ok(())
}
