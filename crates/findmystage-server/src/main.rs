//! FindMyStage: speaker profile analysis backend.

use std::path::PathBuf;
use std::sync::Arc;

use findmystage_chat::LLMConfig;
use findmystage_core::AppConfig;
use findmystage_ingest::{DocumentBlob, ProfileInput, ReferenceChannel};
use findmystage_profile::ProfileState;
use findmystage_runtime::{Analyzer, ProfileBoard};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;

fn resolve_data_dir() -> PathBuf {
    std::env::var("FINDMYSTAGE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn print_usage() {
    println!("FindMyStage: speaker profile analysis");
    println!();
    println!("Usage: findmystage [command]");
    println!();
    println!("Commands:");
    println!("  (none)                       Start the server");
    println!("  analyze <file.pdf> [links]   Analyze a document and print the report");
    println!("  help                         Show this help message");
    println!();
    println!("Links for analyze:");
    println!("  --video URL  --website URL  --linkedin URL  --book URL");
}

/// Parse `analyze` arguments into an input. The document is optional when at
/// least one link is given.
fn parse_analyze_args(args: &[String]) -> anyhow::Result<ProfileInput> {
    let mut input = ProfileInput::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let channel = match arg.as_str() {
            "--video" => Some(ReferenceChannel::Video),
            "--website" => Some(ReferenceChannel::Website),
            "--linkedin" => Some(ReferenceChannel::ProfessionalNetwork),
            "--book" => Some(ReferenceChannel::Book),
            _ => None,
        };
        match channel {
            Some(channel) => {
                let url = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("{} requires a URL", arg))?;
                input = input.with_link(channel, url.clone());
            }
            None if arg.starts_with("--") => anyhow::bail!("Unknown option: {}", arg),
            None => {
                if input.document.is_some() {
                    anyhow::bail!("Only one document may be analyzed at a time");
                }
                let blob = DocumentBlob::from_path(&PathBuf::from(arg))?;
                input = input.with_document(blob);
            }
        }
    }
    Ok(input)
}

async fn run_analyze(args: &[String]) -> anyhow::Result<bool> {
    let input = parse_analyze_args(args)?;
    let config = AppConfig::from_env(resolve_data_dir())?;
    let llm = LLMConfig::load(&config.data_paths.llm_config_file);
    let analyzer = Analyzer::from_config(&llm, &reqwest::Client::new(), &config.profile_api_url);

    let board = ProfileBoard::new();
    let report = analyzer.run(&board, input).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.profile.state == ProfileState::Ready)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "analyze" => {
                if args.len() < 3 {
                    eprintln!("Usage: findmystage analyze <file.pdf> [--video URL] [--website URL] [--linkedin URL] [--book URL]");
                    std::process::exit(1);
                }
                let ok = run_analyze(&args[2..]).await?;
                std::process::exit(if ok { 0 } else { 1 });
            }
            "--help" | "-h" | "help" => {
                print_usage();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown command: {}. Use 'findmystage help' for usage.", args[1]);
                std::process::exit(1);
            }
        }
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());

    let config = AppConfig::from_env(&data_dir)?;
    let port = config.port;

    let state = Arc::new(AppState::new(config));
    if state.llm_config.read().resolve_provider().is_none() {
        info!("No LLM provider configured; document analysis will fail until a key is set");
    }

    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("FindMyStage server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
