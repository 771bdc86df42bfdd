//! Story Store - content storage service for story drafts and canvases.
//!
//! This binary starts the HTTP server and configures all components.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use story_store::{
    config::{CheckConfig, Cli, Command, ServeConfig},
    create_router, create_s3_client, AppState, BedrockImageModel, GenerationPipeline,
    ObjectStore, RouterConfig, S3ObjectStore,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(config) => run_serve(config).await,
        Command::Check(config) => run_check(config).await,
    }
}

// =============================================================================
// Serve Command
// =============================================================================

async fn run_serve(config: ServeConfig) -> ExitCode {
    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let service = config.service_config();

    info!("Story Store v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration:");
    info!("  S3 bucket: {}", service.bucket);
    if let Some(ref endpoint) = service.s3_endpoint {
        info!("  S3 endpoint: {}", endpoint);
    }
    info!("  S3 region: {}", service.s3_region);
    info!("  Model region: {}", service.model_region);

    let s3_client = create_s3_client(service.s3_endpoint.as_deref(), &service.s3_region).await;
    let store = Arc::new(S3ObjectStore::new(s3_client, service.bucket.clone()));

    info!("Connecting to S3...");
    match store.list(None).await {
        Ok(objects) => {
            let stories = objects.iter().filter(|o| o.key.ends_with(".txt")).count();
            info!("  Connected successfully, {} stor(ies) in bucket", stories);
        }
        Err(e) => {
            error!("  Failed to connect to S3: {}", e);
            error!("  Please check:");
            error!("    - Your AWS credentials are configured correctly");
            error!("    - The bucket '{}' exists and is accessible", service.bucket);
            error!("    - The S3 endpoint is correct (if using MinIO/custom S3)");
            return ExitCode::FAILURE;
        }
    }

    let model = Arc::new(BedrockImageModel::connect(&service.model_region, &service.model_id).await);
    info!("Image model: {}", model.model_id());

    let pipeline =
        GenerationPipeline::new(Arc::clone(&store), model).with_url_ttl(service.url_ttl);
    info!("Signed URL TTL: {}s", pipeline.url_ttl().as_secs());

    let router = create_router(
        AppState::new(store, pipeline),
        RouterConfig::default().with_tracing(!config.no_tracing),
    );

    let addr = config.bind_address();
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            return ExitCode::FAILURE;
        }
    };

    info!("Server listening on: http://{}", addr);
    info!("  curl http://{}/health", addr);
    info!("  curl http://{}/list", addr);

    if let Err(e) = axum::serve(listener, router).await {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "story_store=debug,tower_http=debug"
    } else {
        "story_store=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

// =============================================================================
// Check Command
// =============================================================================

async fn run_check(config: CheckConfig) -> ExitCode {
    if config.verbose {
        init_logging(true);
    }

    let storage = &config.storage;

    println!("Story Store Configuration Check");
    println!("═══════════════════════════════");
    println!();
    println!("✓ Bucket: {}", storage.s3_bucket);
    if let Some(ref endpoint) = storage.s3_endpoint {
        println!("✓ Endpoint: {}", endpoint);
    }
    println!("✓ Region: {}", storage.s3_region);
    println!();

    print!("Testing S3 connection... ");

    let client = create_s3_client(storage.s3_endpoint.as_deref(), &storage.s3_region).await;
    let store = S3ObjectStore::new(client, storage.s3_bucket.clone());

    let objects = match store.list(None).await {
        Ok(objects) => {
            println!("✓ success");
            objects
        }
        Err(e) => {
            println!("✗ failed");
            println!();
            println!("Error: {}", e);
            println!();
            println!("Please check:");
            println!("  - Your AWS credentials are configured correctly");
            println!(
                "  - The bucket '{}' exists and is accessible",
                storage.s3_bucket
            );
            if storage.s3_endpoint.is_some() {
                println!("  - The S3 endpoint is correct and reachable");
            }
            return ExitCode::FAILURE;
        }
    };

    if config.list_stories {
        println!();
        println!("Stories in bucket:");
        println!("──────────────────");

        let stories: Vec<_> = objects
            .iter()
            .filter(|o| o.key.ends_with(".txt"))
            .collect();
        if stories.is_empty() {
            println!("  (no stories found)");
        } else {
            for story in &stories {
                println!("  {} ({} bytes)", story.key, story.size);
            }
            println!();
            println!("Total: {} story(ies)", stories.len());
        }
    }

    println!();
    println!("═══════════════════════════════");
    println!("✓ All checks passed!");

    ExitCode::SUCCESS
}
