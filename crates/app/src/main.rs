use chrono::Utc;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use web_research_core::clients::gemini::DEFAULT_GEMINI_URL;
use web_research_core::clients::serpapi::DEFAULT_SERPAPI_URL;
use web_research_core::orchestrator::format_error;
use web_research_core::{
    BudgetPolicy, GeminiClient, HtmlScraper, LlmRelevanceScorer, ResearchPipeline, SerpApiClient,
};

#[derive(Parser)]
#[command(name = "web-research", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_api_key: String,

    /// SerpAPI key, required for `research`
    #[arg(long, env = "SERPAPI_KEY", hide_env_values = true)]
    serpapi_key: Option<String>,

    /// Gemini API base URL
    #[arg(long, default_value = DEFAULT_GEMINI_URL)]
    gemini_url: String,

    /// SerpAPI base URL
    #[arg(long, default_value = DEFAULT_SERPAPI_URL)]
    serpapi_url: String,

    /// Model used for intent analysis and report synthesis
    #[arg(long, default_value = "gemini-2.0-flash")]
    intent_model: String,

    /// Model used for relevance scoring
    #[arg(long, default_value = "gemini-1.5-pro")]
    scoring_model: String,
}

#[derive(Subcommand)]
enum Command {
    /// Research a question and print a cited report.
    Research {
        /// Research question
        #[arg(long)]
        query: String,
        /// Wall-clock limit for the whole run.
        #[arg(long, default_value = "300")]
        timeout_secs: u64,
        /// Print `{"result": ...}` instead of plain text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the analyzed search intent for a question.
    Intent {
        /// Research question
        #[arg(long)]
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    if let Err(error) = dotenvy::dotenv() {
        if !error.not_found() {
            eprintln!("ignoring unreadable .env file: {error}");
        }
    }

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let budget = BudgetPolicy::from_env()?;

    let http = Arc::new(reqwest_client()?);
    let generator = GeminiClient::new(&cli.gemini_url, &cli.intent_model, &cli.gemini_api_key)
        .with_client(Arc::clone(&http));
    let scorer = LlmRelevanceScorer::new(
        GeminiClient::new(&cli.gemini_url, &cli.scoring_model, &cli.gemini_api_key)
            .with_client(Arc::clone(&http)),
        budget.max_scoring_input_chars,
    );
    let serpapi_key = cli.serpapi_key.clone().unwrap_or_default();
    let web = SerpApiClient::new(&cli.serpapi_url, &serpapi_key).with_client(Arc::clone(&http));
    let news = SerpApiClient::new(&cli.serpapi_url, &serpapi_key).with_client(http);
    let scraper = HtmlScraper::new(budget.max_page_chars)?;

    let pipeline = ResearchPipeline::new(generator, web, news, scraper, scorer, budget);
    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        intent_model = %cli.intent_model,
        scoring_model = %cli.scoring_model,
        "web-research boot"
    );

    match cli.command {
        Command::Research {
            query,
            timeout_secs,
            json,
        } => {
            if serpapi_key.trim().is_empty() {
                anyhow::bail!("a SerpAPI key is required for research (--serpapi-key or SERPAPI_KEY)");
            }

            let limit = Duration::from_secs(timeout_secs);
            let result = match tokio::time::timeout(limit, pipeline.research(&query)).await {
                Ok(text) => text,
                Err(_) => {
                    warn!(timeout_secs, "research run timed out");
                    format_error(&format!("research timed out after {timeout_secs} seconds"))
                }
            };

            if json {
                println!("{}", serde_json::json!({ "result": result }));
            } else {
                println!("{result}");
            }
        }
        Command::Intent { query } => {
            let intent = pipeline.analyze(&query).await;
            println!("{}", serde_json::to_string_pretty(&intent)?);
        }
    }

    Ok(())
}

fn reqwest_client() -> anyhow::Result<web_research_core::clients::HttpClient> {
    Ok(web_research_core::clients::HttpClient::builder().build()?)
}
