//! AI Term Explainer CLI entry point

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use anyhow::Result;

use term_explainer::agent::{AgentLoop, Context, LlmClient, ProviderRegistry};
use term_explainer::config::Config;
use term_explainer::explain::{Difficulty, Explainer};
use term_explainer::lookup::{Lookup, LookupSettings};
use term_explainer::wiki::WikipediaClient;

#[derive(Parser)]
#[command(name = "term-explainer")]
#[command(about = "Explain AI/ML terms at beginner, intermediate and expert level")]
#[command(version)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Explain a term with the agent
    Explain {
        /// The AI/ML term
        term: String,

        /// Difficulty level
        #[arg(short, long, value_enum, default_value_t = Difficulty::All)]
        level: Difficulty,
    },

    /// Print the Wikipedia definition for a term (no LLM needed)
    Define {
        /// The AI/ML term
        term: String,

        /// Truncate the summary to this many characters
        #[arg(short, long)]
        max_length: Option<usize>,
    },

    /// Print categories and related terms for a term (no LLM needed)
    Context {
        /// The AI/ML term
        term: String,
    },

    /// Interactive session with feedback (default)
    Interactive,

    /// Show configuration and the selected provider
    Status,

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Setup Global Ctrl+C handler
    let exit_flag = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(false));
    let r = exit_flag.clone();

    ctrlc::set_handler(move || {
        if r.load(std::sync::atomic::Ordering::SeqCst) {
            println!("\n\nShutting down...");
            std::process::exit(0);
        } else {
            println!("\n⚠️  Press Ctrl+C again to exit");
            r.store(true, std::sync::atomic::Ordering::SeqCst);

            // Reset flag after 3 seconds
            let r2 = r.clone();
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_secs(3));
                r2.store(false, std::sync::atomic::Ordering::SeqCst);
            });
        }
    }).ok();

    let command = cli.command.unwrap_or(Commands::Interactive);

    // init must work even when the existing config does not load
    if let Commands::Init { force } = command {
        return run_init(force);
    }

    let config = term_explainer::config::load()?;

    match command {
        Commands::Explain { term, level } => {
            let mut channel = build_channel(&config)?;
            let response = channel.run_once(&term, level).await?;
            println!("{}", response.content);
        }

        Commands::Define { term, max_length } => {
            let lookup = build_lookup(&config)?;
            let max_length = max_length.unwrap_or(config.wiki.max_length);
            let result = lookup.lookup(&term, max_length).await;
            println!("{}", term_explainer::tools::render_definition(&term, result));
        }

        Commands::Context { term } => {
            let lookup = build_lookup(&config)?;
            let result = lookup.context(&term).await;
            println!("{}", term_explainer::tools::render_context(&term, result));
        }

        Commands::Interactive => {
            let mut channel = build_channel(&config)?;
            channel.run_interactive().await?;
        }

        Commands::Status => print_status(&config),

        Commands::Init { force } => run_init(force)?,
    }

    Ok(())
}

fn build_lookup(config: &Config) -> Result<Lookup<WikipediaClient>> {
    let client = WikipediaClient::new(&config.wiki)?;
    Ok(Lookup::new(client, LookupSettings { max_length: config.wiki.max_length }))
}

fn build_channel(
    config: &Config,
) -> Result<term_explainer::adapters::cli::CliChannel<Box<dyn LlmClient>>> {
    use term_explainer::ui;

    ui::print_thinking("Initializing AI Term Explainer agent");

    let (client, settings) = ProviderRegistry::create(config)?;
    let context = Context::new(build_lookup(config)?, config.wiki.language.clone());
    let agent = AgentLoop::new(client, config.max_steps);

    ui::print_header(&settings.model, &settings.provider.to_string());
    tracing::info!(?settings, "Agent ready");

    Ok(term_explainer::adapters::cli::CliChannel::new(Explainer::new(agent, context)))
}

fn print_status(config: &Config) {
    use term_explainer::agent::{llm::mask, ProviderSettings};
    use term_explainer::ui;

    println!("AI Term Explainer Status\n");
    println!("Config: {:?}", term_explainer::config::config_path());
    println!("Wikipedia language: {}", config.wiki.language);
    println!("User agent: {}", config.wiki.user_agent);
    println!("Max summary length: {}", config.wiki.max_length);
    println!("Max agent steps: {}", config.max_steps);

    match ProviderSettings::from_env(config.model.as_deref()) {
        Ok(settings) => {
            println!("Provider: {}", settings.provider);
            println!("Model: {}", settings.model);
            println!("API key ({}): {}", settings.provider.env_var(), mask(&settings.api_key));
        }
        Err(e) => ui::print_warning(&e.to_string()),
    }
}

fn run_init(force: bool) -> Result<()> {
    use term_explainer::ui;

    let (path, written) = term_explainer::config::init(force)?;
    if !written {
        ui::print_warning(&format!("Config already exists at {:?} (use --force to overwrite)", path));
        return Ok(());
    }

    ui::print_success(&format!("Wrote default config to {:?}", path));
    ui::print_step("Set one of OPENROUTER_API_KEY, TOGETHER_API_KEY, GROQ_API_KEY, HF_TOKEN or OPENAI_API_KEY");
    Ok(())
}
