//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use kw_master::adapters::ai::{GeminiAdapter, MockLlmAdapter};
use kw_master::adapters::knowledge::TextKnowledgeLoader;
use kw_master::adapters::persistence::{JsonCatalog, TimetableJson};
use kw_master::adapters::ui::tui::TuiInputPort;
use kw_master::ports::{CatalogPort, InputPort, KnowledgePort, LlmPort, TimetableStorePort};
use kw_master::shared::config::AppConfig;
use kw_master::usecases::{AdvisorService, CreditService, TimetableService};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    kw_master::adapters::ui::init_ui();

    let cfg = match AppConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(error = %e, "config load failed, using defaults");
            AppConfig::default()
        }
    };

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let data_dir_abs = data_path
        .canonicalize()
        .unwrap_or_else(|_| data_path.clone());
    info!(path = %data_dir_abs.display(), "data directory");

    // --- Knowledge base (loaded once, shared by the advisor) ---
    let loader = Arc::new(TextKnowledgeLoader::new(&data_path));
    let knowledge = loader
        .load()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    if knowledge.is_empty() {
        warn!(
            path = %data_dir_abs.display(),
            "no handbook text found; Q&A is disabled until documents are added"
        );
    } else {
        info!(documents = knowledge.documents.len(), "knowledge base ready");
    }

    // --- LLM ---
    let llm: Arc<dyn LlmPort> = match cfg.gemini_api_key() {
        Some(key) => {
            info!(
                model = %cfg.gemini_model_or_default(),
                url = %cfg.gemini_api_url_or_default(),
                "Q&A enabled with Gemini adapter"
            );
            Arc::new(GeminiAdapter::new(
                cfg.gemini_api_url_or_default(),
                key,
                cfg.gemini_model_or_default(),
            ))
        }
        None => {
            warn!("GOOGLE_API_KEY not set, using mock LLM adapter");
            Arc::new(MockLlmAdapter::new())
        }
    };

    let policy = cfg.retry_policy();
    info!(
        max_attempts = policy.max_attempts(),
        total_backoff_ms = policy.total_backoff().as_millis() as u64,
        "retry policy for AI calls"
    );

    // --- Services ---
    let advisor = AdvisorService::new(llm, Arc::new(knowledge), policy);
    let credits = CreditService::new(cfg.required_credits_or_default());

    let catalog: Arc<dyn CatalogPort> = Arc::new(JsonCatalog::new(data_path.join("courses.json")));
    let store: Arc<dyn TimetableStorePort> =
        Arc::new(TimetableJson::new(data_path.join("timetable.json")));
    let timetable = Arc::new(TimetableService::new(catalog, store));
    timetable
        .load()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        advisor,
        Arc::clone(&loader),
        credits,
        Arc::clone(&timetable),
    ));

    // --- Run (main menu -> Q&A / Credits / Timetable) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
