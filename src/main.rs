use clap::{Parser, ValueEnum};
use docseek_api::{AppState, RestApi, SessionStore};
use docseek_core::{Corpus, HashingEncoder, QueryService, TextEncoder};
use docseek_resources::AzCliProvider;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Text encoder used to index the corpus and embed queries
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum EncoderKind {
    /// all-MiniLM-L6-v2 sentence embeddings (model downloaded on first run)
    Fastembed,
    /// Offline feature hashing over words and character trigrams
    Hashing,
}

/// Semantic search over internal documents, plus a cloud resource browser
#[derive(Parser, Debug)]
#[command(name = "docseek")]
#[command(about = "Semantic document search and resource browser", long_about = None)]
struct Args {
    /// Corpus file, one document per line
    #[arg(short, long, env = "DOCSEEK_CORPUS", default_value = "data/documentos.txt")]
    corpus: PathBuf,

    /// HTTP API port
    #[arg(long, env = "DOCSEEK_HTTP_PORT", default_value_t = 8000)]
    http_port: u16,

    /// Address to bind the HTTP API to
    #[arg(long, env = "DOCSEEK_BIND", default_value = "0.0.0.0")]
    bind: String,

    /// Text encoder
    #[arg(long, env = "DOCSEEK_ENCODER", value_enum, default_value_t = EncoderKind::Fastembed)]
    encoder: EncoderKind,

    /// Directory for downloaded model files (fastembed encoder)
    #[arg(long, env = "DOCSEEK_MODEL_CACHE_DIR")]
    model_cache_dir: Option<PathBuf>,

    /// Embedding dimension (hashing encoder only)
    #[arg(long, env = "DOCSEEK_DIM", default_value_t = docseek_core::DEFAULT_DIM)]
    dim: usize,

    /// Seconds a browser session may stay unused before it is dropped
    #[arg(long, env = "DOCSEEK_SESSION_IDLE_SECS", default_value_t = docseek_api::DEFAULT_IDLE_TIMEOUT.as_secs())]
    session_idle_secs: u64,

    /// Resource group listed by the inventory endpoints
    #[arg(long, env = "DOCSEEK_RESOURCE_GROUP", default_value = "RSGYAPE001")]
    resource_group: String,

    /// Azure CLI executable
    #[arg(long, env = "DOCSEEK_AZ_BINARY", default_value = "az")]
    az_binary: String,

    /// Timeout for one inventory call, in seconds
    #[arg(long, env = "DOCSEEK_PROVIDER_TIMEOUT_SECS", default_value_t = 30)]
    provider_timeout_secs: u64,

    /// Log level
    #[arg(long, env = "DOCSEEK_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn build_encoder(args: &Args) -> anyhow::Result<Box<dyn TextEncoder>> {
    match args.encoder {
        #[cfg(feature = "fastembed")]
        EncoderKind::Fastembed => {
            info!("Encoder: fastembed (all-MiniLM-L6-v2)");
            let encoder = docseek_core::FastEmbedEncoder::new(args.model_cache_dir.clone())?;
            Ok(Box::new(encoder))
        }
        #[cfg(not(feature = "fastembed"))]
        EncoderKind::Fastembed => {
            anyhow::bail!("built without the `fastembed` feature; use --encoder hashing")
        }
        EncoderKind::Hashing => {
            info!("Encoder: feature hashing, dim {}", args.dim);
            Ok(Box::new(HashingEncoder::new(args.dim)?))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting docseek v{}", env!("CARGO_PKG_VERSION"));
    info!("Corpus: {:?}", args.corpus);
    info!("Resource group: {}", args.resource_group);

    // Nothing is served unless the corpus loads and indexes
    let corpus = Corpus::load(&args.corpus)?;
    let encoder = build_encoder(&args)?;
    let search = Arc::new(QueryService::new(corpus, encoder)?);
    info!("Search index ready: {} documents, dim {}", search.len(), search.dim());

    let provider = Arc::new(AzCliProvider::new(
        args.az_binary.clone(),
        Duration::from_secs(args.provider_timeout_secs),
    ));
    let sessions = SessionStore::with_idle_timeout(Duration::from_secs(args.session_idle_secs));
    let state = Arc::new(AppState::with_sessions(
        search,
        provider,
        args.resource_group.clone(),
        sessions,
    ));

    let bind = args.bind.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on {}:{}", bind, http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(state, &bind, http_port).await {
                error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://{}:{}/", args.bind, args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
