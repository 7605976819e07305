//! CLI entrypoint for date-planner
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use planner_application::{
    AnalyzeIntentUseCase, ConversationLogger, KeywordIntentClassifier, KnowledgeStore,
    NoConversationLogger, RunTurnUseCase, SessionController,
};
use planner_domain::{TurnStatus, UserLocation};
use planner_infrastructure::{
    ConfigLoader, FileConfig, InMemoryChatHistory, InMemoryKnowledgeStore, JsonSchemaToolConverter,
    JsonlConversationLogger, OpenAiGateway, ParallelToolExecutor, ResultCache, build_registry,
};
use planner_presentation::{ChatRepl, Cli, OutputFormat, RenderOptions, TurnRenderer};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };

    let _log_guard = init_logging(cli.verbose, config.logging.file.as_deref())?;
    info!("Starting date-planner");

    for issue in config.ensure_valid()? {
        warn!("Config: {}", issue.message);
    }

    // === Dependency Injection ===
    let controller = build_controller(&config)?;

    let options = RenderOptions {
        format: cli.output_format(),
        show_progress: !cli.quiet,
        show_summary: cli.verbose > 0,
    };

    // Interactive mode
    let Some(utterance) = cli.utterance.as_deref() else {
        if cli.output_format() == OutputFormat::Json {
            return Err(anyhow!("--json needs an UTTERANCE; interactive mode is text only"));
        }
        let location = cli.lat.zip(cli.lon).map(|(lat, lon)| UserLocation::new(lat, lon));
        ChatRepl::new(&controller, cli.session.clone())
            .with_options(options)
            .with_constraints(cli.constraints())
            .with_location(location)
            .run()
            .await?;
        return Ok(ExitCode::SUCCESS);
    };

    // Single request mode
    let request = cli.request(utterance)?;
    let turn = TurnRenderer::new(&controller, options).run(request).await?;

    Ok(match turn.status {
        TurnStatus::Done => ExitCode::SUCCESS,
        TurnStatus::Cancelled => ExitCode::from(130),
        _ => ExitCode::FAILURE,
    })
}

/// Wire adapters into a [`SessionController`]
fn build_controller(config: &FileConfig) -> Result<SessionController> {
    let store: Arc<dyn KnowledgeStore> = match &config.tools.knowledge_seed {
        Some(path) => Arc::new(
            InMemoryKnowledgeStore::from_json_file(path)
                .with_context(|| format!("Failed to load knowledge seed {}", path.display()))?,
        ),
        None => Arc::new(InMemoryKnowledgeStore::builtin()?),
    };

    let orchestration = &config.orchestration;
    let registry = build_registry(
        &config.tools,
        store,
        reqwest::Client::new(),
        usize::try_from(orchestration.knowledge_top_k).unwrap_or(usize::MAX),
    )?;
    let executor = ParallelToolExecutor::new(
        Arc::new(registry),
        Arc::new(ResultCache::new(orchestration.cache_ttl())),
    )
    .with_max_workers(orchestration.max_workers);

    let gateway = OpenAiGateway::from_config(&config.llm)?;
    if config.llm.api_key().is_none() {
        warn!(
            "{} is not set; requests to {} are sent without credentials",
            config.llm.api_key_env,
            gateway.endpoint()
        );
    }

    let conversation_logger: Arc<dyn ConversationLogger> = match &config.logging.conversation_log {
        Some(path) => match JsonlConversationLogger::open(path) {
            Some(logger) => {
                info!("Writing turn transcript to {}", logger.path().display());
                Arc::new(logger)
            }
            None => Arc::new(NoConversationLogger),
        },
        None => Arc::new(NoConversationLogger),
    };

    let intent_analyzer = AnalyzeIntentUseCase::new(Arc::new(KeywordIntentClassifier));

    let run_turn = RunTurnUseCase::new(
        Arc::new(gateway),
        Arc::new(executor),
        Arc::new(JsonSchemaToolConverter),
        intent_analyzer,
    )
    .with_params(orchestration.to_params())
    .with_history(Arc::new(InMemoryChatHistory::new()))
    .with_conversation_logger(conversation_logger);

    Ok(SessionController::new(run_turn))
}

/// Stderr logging by `-v` count, plus an optional daily-rolling file.
///
/// `RUST_LOG` overrides the verbosity flags. The returned guard flushes the
/// file writer and must live until exit.
fn init_logging(verbose: u8, file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(filter());

    let (file_layer, guard) = match file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path
                .file_name()
                .context("[logging] file must name a file")?;
            std::fs::create_dir_all(directory)
                .with_context(|| format!("Failed to create log directory {}", directory.display()))?;

            let appender = tracing_appender::rolling::daily(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}
