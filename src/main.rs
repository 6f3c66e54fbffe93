use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dashboard_graph::{
    api,
    config::Config,
    graph::EngineConnector,
    mcp,
    models::{EpisodeKind, RecordKind, SyncReport},
    service::AppState,
    source::fetch_or_empty,
};

#[derive(Parser)]
#[command(name = "dgraph")]
#[command(about = "Knowledge-graph sync and query service for dashboard records")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP query service
    Serve {
        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Start MCP server via stdio
    Mcp,
    /// Sync dashboard records into the knowledge graph
    Sync {
        /// tasks, projects, content or all
        #[arg(default_value = "all")]
        kind: String,

        /// Only sync the first N records of each collection
        #[arg(short, long)]
        limit: Option<usize>,

        /// Records submitted concurrently within a collection
        #[arg(short, long)]
        concurrency: Option<usize>,
    },
    /// Ask the knowledge graph a question
    Query { question: String },
    /// Check source and graph engine connectivity
    Check,
}

/// Initialize tracing with output to stderr (for MCP mode) or stdout
fn init_tracing(use_stderr: bool) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "dashboard_graph=debug,tower_http=debug".into()),
    );

    if use_stderr {
        // stdout is the protocol channel
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let use_stderr = matches!(cli.command, Some(Commands::Mcp));
    init_tracing(use_stderr);

    let mut config = Config::load();

    match cli.command {
        Some(Commands::Serve { port }) => {
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await?;
        }
        None => serve(config).await?,
        Some(Commands::Mcp) => {
            let state = AppState::from_config(&config)?;
            if let Err(e) = state.init().await {
                tracing::warn!("Graph engine not reachable, queries will fail: {}", e);
            }
            let result = mcp::run_stdio_server(state.clone()).await;
            state.shutdown().await;
            result?;
        }
        Some(Commands::Sync {
            kind,
            limit,
            concurrency,
        }) => {
            config.sync.limit = limit;
            if let Some(n) = concurrency {
                config.sync.concurrency = n.max(1);
            }
            let state = AppState::from_config(&config)?;

            let report = if kind == "all" {
                state.sync_all().await?
            } else {
                let kind = EpisodeKind::from_str(&kind).ok_or_else(|| {
                    anyhow::anyhow!("Unknown kind '{}'; use tasks, projects, content or all", kind)
                })?;
                SyncReport {
                    outcomes: vec![state.sync_collection(kind).await?],
                }
            };

            for outcome in &report.outcomes {
                println!(
                    "{:<10} {}/{}",
                    outcome.kind.as_str(),
                    outcome.succeeded,
                    outcome.attempted
                );
            }
            println!("Synced {} item(s)", report.total());
        }
        Some(Commands::Query { question }) => {
            let state = AppState::from_config(&config)?;
            state.init().await?;
            let result = state.query(&question).await;
            state.shutdown().await;

            let answer = result?;
            println!("{}", answer.text);
            println!("(confidence: {})", answer.confidence.as_str());
        }
        Some(Commands::Check) => check(&config).await?,
    }

    Ok(())
}

async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting dashboard-graph server on {}", addr);

    let state = AppState::from_config(&config)?;
    if let Err(e) = state.init().await {
        tracing::warn!("Graph engine not reachable, queries will return 503: {}", e);
    }

    let app = api::create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("dashboard-graph server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    state.shutdown().await;
    Ok(())
}

async fn check(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let source = state.source();

    println!("Source:");
    for kind in RecordKind::ALL {
        let rows = fetch_or_empty(source.as_ref(), kind).await;
        println!("  {:<18} {} row(s)", kind.table(), rows.len());
    }

    println!("Graph engine at {}:", config.graph.url);
    let engine = config.graph.connect().await?;
    let hits = engine.search("task", 1).await;
    engine.close().await;

    match hits {
        Ok(hits) => println!("  search ok ({} hit(s))", hits.len()),
        Err(e) => anyhow::bail!("search failed: {}", e),
    }

    Ok(())
}
