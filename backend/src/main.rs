use anyhow::Result;
use backend::axum_http::http_serve;
use backend::config::config_loader;
use crates::infra::{
    db::postgres::postgres_connection,
    storages::{
        lazy_bucket::LazyObjectStorage,
        s3::S3Config,
        s3_bucket::{DEFAULT_PART_SIZE_BYTES, S3BucketConfig},
    },
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Backend exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    crates::observability::init_observability("backend")?;

    let dotenvy_env = config_loader::load()?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&dotenvy_env.database.url)?;
    info!("Postgres connection has been established");

    let storage = &dotenvy_env.object_storage;
    // Connected on the first upload, not here.
    let object_storage = LazyObjectStorage::s3(S3BucketConfig {
        s3: S3Config::new(
            storage.endpoint.clone(),
            storage.region.clone(),
            storage.access_key.clone(),
            storage.secret_key.clone(),
        ),
        bucket: storage.bucket.clone(),
        key_prefix: storage.key_prefix.clone(),
        part_size_bytes: DEFAULT_PART_SIZE_BYTES,
    });

    http_serve::start(
        Arc::new(dotenvy_env),
        Arc::new(postgres_pool),
        Arc::new(object_storage),
    )
    .await?;

    Ok(())
}
