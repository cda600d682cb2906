use clap::Parser;

use pagelens::api::{create_router, AppState};
use pagelens::cli::{self, Cli, Command};
use pagelens::config::Config;
use pagelens::ocr::OcrPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    let config = Config::from_env();
    cli::init_tracing(config.server.log_format);

    match cli.into_command() {
        Command::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Extract {
            image,
            lang,
            binarization,
        } => {
            let extracted = tokio::task::spawn_blocking(move || {
                cli::extract(&config, &image, lang.as_deref(), binarization)
            })
            .await??;

            println!("Extracted Text:");
            println!("{}", extracted.text);
            Ok(())
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        tessdata = config.ocr.tessdata_path.as_deref().unwrap_or("<tesseract default>"),
        language = %config.ocr.default_language,
        binarization = %config.ocr.binarization,
        "Initializing OCR pipeline..."
    );
    let pipeline = OcrPipeline::from_config(&config.ocr);
    let state = AppState::new(config.clone(), pipeline);
    if !state.engine.is_available() {
        tracing::warn!("OCR engine unavailable - /api/v1/ocr requests will fail until it is installed");
    }

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Pagelens starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/v1/health", addr);
    tracing::info!("  OCR endpoint: http://{}/api/v1/ocr", addr);
    tracing::info!("  API docs:     http://{}/api/v1/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/v1/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining in-flight requests...");
}
