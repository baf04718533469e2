//! Test server harness.
//!
//! Spawns a server with every model backend stubbed or mocked:
//! - **Embedder**: stub (deterministic hash embeddings)
//! - **Reranker**: stub (deterministic lexical scores)
//! - **Generative models**: `MockTextGenerator` with a scripted reply
//! - **ANN index**: built in-memory over the fixture corpus
//!
//! Useful for testing HTTP routing, response shapes, and pipeline wiring
//! without model files or external services.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use gastrogenie::{
    AnnIndex, CrossEncoder, EmbeddingMatrix, MiniLmConfig, MiniLmEmbedder, MockTextGenerator,
    ModelRegistry, Recipe, RecipePipeline, RecipeTable, TextGenerator,
};
use gastrogenie_server::gateway::{HandlerState, create_router_with_state};

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

/// Reply that serves both generative stages: the extractor finds the JSON
/// object, the selector finds its two lines.
pub const DEFAULT_MODEL_REPLY: &str = "{\"ingredients\": [], \"cuisine\": \"\", \
     \"meal_type\": \"dinner\", \"time_constraint\": \"\", \"occasion\": \"\", \
     \"cooking_method\": \"\", \"dietary\": []}\n\
     SELECTED_RECIPES: 1, 2, 3\n\
     EXPLANATION: These are the closest fits for your request.";

#[derive(Debug, Clone)]
pub struct TestServerConfig {
    /// Scripted generative-model output. `None` makes every model call fail.
    pub model_reply: Option<String>,
}

impl Default for TestServerConfig {
    fn default() -> Self {
        Self {
            model_reply: Some(DEFAULT_MODEL_REPLY.to_string()),
        }
    }
}

impl TestServerConfig {
    pub fn failing_models() -> Self {
        Self { model_reply: None }
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub fn fixture_recipes() -> Vec<Recipe> {
    let rows = [
        ("Paneer Tikka", "Grilled paneer skewers with spices", Some(30.0), Some("Punjab")),
        ("Vegetable Biryani", "Fragrant rice with mixed vegetables", Some(50.0), Some("Hyderabad")),
        ("Masoor Dal", "Red lentil curry, quick vegetarian dinner", Some(25.0), None),
        ("Chocolate Cake", "Rich baked dessert", Some(60.0), None),
        ("Chana Masala", "Chickpea curry, high protein vegetarian", Some(35.0), Some("Punjab")),
        ("Fish Moilee", "Coconut fish stew", Some(40.0), Some("Kerala")),
        ("Aloo Paratha", "Potato stuffed flatbread", Some(30.0), Some("Punjab")),
        ("Tomato Rasam", "Tangy pepper soup", Some(20.0), Some("Tamil")),
    ];

    rows.iter()
        .map(|(title, description, minutes, region)| Recipe {
            title: (*title).to_string(),
            description: (*description).to_string(),
            prep_time_minutes: *minutes,
            calories: None,
            protein_g: None,
            sub_region: region.map(str::to_string),
            img_url: None,
        })
        .collect()
}

fn build_pipeline(config: &TestServerConfig) -> RecipePipeline {
    let recipes = fixture_recipes();
    let embedder = MiniLmEmbedder::load(MiniLmConfig::stub_with_dim(32)).expect("stub embedder");

    let vectors: Vec<Vec<f32>> = recipes
        .iter()
        .map(|recipe| embedder.embed(&recipe.pair_text()).expect("embed recipe"))
        .collect();
    let matrix = EmbeddingMatrix::from_vectors(vectors).expect("matrix");
    let index = AnnIndex::build(&matrix).expect("index");

    let model_reply = config.model_reply.clone();
    let registry = ModelRegistry::new(Box::new(move |_spec| {
        let generator: Arc<dyn TextGenerator> = match &model_reply {
            Some(reply) => Arc::new(MockTextGenerator::with_reply(reply)),
            None => Arc::new(MockTextGenerator::failing()),
        };
        Ok(generator)
    }));

    RecipePipeline::new(
        Arc::new(RecipeTable::from_recipes(recipes)),
        index,
        embedder,
        CrossEncoder::stub().expect("stub reranker"),
        registry,
    )
    .expect("pipeline")
}

pub async fn find_available_port() -> std::io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    Ok(addr.port())
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
}

/// Spawns a fully-stubbed test server on an ephemeral port.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    let pipeline = Arc::new(build_pipeline(&config));
    let state = HandlerState::new(pipeline);
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
    })
}
