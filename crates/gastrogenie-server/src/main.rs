//! GastroGenie HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use gastrogenie::config::Config;
use gastrogenie::corpus::RecipeTable;
use gastrogenie::embedding::{CrossEncoder, CrossEncoderConfig, MiniLmConfig, MiniLmEmbedder};
use gastrogenie::generation::ModelRegistry;
use gastrogenie::index::{AnnIndex, EmbeddingMatrix};
use gastrogenie::pipeline::RecipePipeline;
use gastrogenie_server::gateway::{HandlerState, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!(
        r#"
   ___         _               ___           _
  / __|__ _ __| |_ _ _ ___    / __|___ _ _  (_)___
 | (_ / _` (_-<  _| '_/ _ \  | (_ / -_) ' \ | / -_)
  \___\__,_/__/\__|_| \___/   \___\___|_||_||_\___|

        ASK. RETRIEVE. RERANK.
                                        AGPL-3.0
"#
    );

    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "GastroGenie starting"
    );

    let table = Arc::new(RecipeTable::load(&config.corpus_path)?);
    let matrix = EmbeddingMatrix::load(&config.embeddings_path)?;
    let index = AnnIndex::build(&matrix)?;

    let embedder_config = if let Some(path) = &config.embedder_path {
        MiniLmConfig::new(path.clone())
    } else {
        tracing::warn!("No GASTRO_EMBEDDER_PATH configured, running embedder in stub mode");
        MiniLmConfig::stub()
    };
    let embedder = MiniLmEmbedder::load(embedder_config)?;

    let reranker_config = if let Some(path) = &config.reranker_path {
        CrossEncoderConfig::new(path.clone())
    } else {
        tracing::warn!("No GASTRO_RERANKER_PATH configured, running reranker in stub mode");
        CrossEncoderConfig::stub()
    };
    let reranker = CrossEncoder::load(reranker_config)?;

    let registry = ModelRegistry::with_genai(Duration::from_secs(config.llm_timeout_secs));

    let pipeline = Arc::new(RecipePipeline::new(
        table, index, embedder, reranker, registry,
    )?);

    let state = HandlerState::new(pipeline);
    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("GastroGenie shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("GASTRO_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime");

    rt.block_on(async {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("failed to build client");

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
