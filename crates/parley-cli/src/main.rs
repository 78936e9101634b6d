use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use parley_core::domain::{Action, GameResult, ReflectionStyle};
use parley_core::impls::OllamaClient;
use parley_core::ports::InferenceClient;
use parley_core::{ExperimentConfig, GameBuilder, Preset};
use tracing_subscriber::EnvFilter;

/// Play an iterated prisoner's dilemma between two language models.
#[derive(Debug, Parser)]
#[command(name = "parley", version, about)]
struct Cli {
    /// TOML experiment file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Start from a named preset instead of the defaults (ignored with --config).
    #[arg(long, value_parser = preset_names())]
    preset: Option<String>,

    #[arg(long)]
    episodes: Option<usize>,

    /// Rounds per episode.
    #[arg(long)]
    rounds: Option<usize>,

    /// Past rounds shown in each round prompt.
    #[arg(long)]
    window: Option<usize>,

    /// Forcing prompts after an ambiguous answer.
    #[arg(long)]
    forced_retries: Option<u32>,

    #[arg(long)]
    model_0: Option<String>,

    #[arg(long)]
    model_1: Option<String>,

    #[arg(long)]
    endpoint_0: Option<String>,

    #[arg(long)]
    endpoint_1: Option<String>,

    /// Sampling temperature for both agents.
    #[arg(long)]
    temperature: Option<f32>,

    /// Keep conversations across episodes.
    #[arg(long)]
    no_reset: bool,

    /// Do not re-inject reflections after a reset.
    #[arg(long)]
    no_carry_reflection: bool,

    #[arg(long, value_enum)]
    reflection_style: Option<StyleArg>,

    /// Custom reflection template; implies the custom style.
    #[arg(long, conflicts_with = "reflection_style")]
    reflection_template: Option<PathBuf>,

    /// Action used when no decision can be obtained.
    #[arg(long, value_enum)]
    fallback: Option<FallbackArg>,

    /// Write the result record as JSON.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StyleArg {
    Minimal,
    Standard,
    Detailed,
}

impl From<StyleArg> for ReflectionStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Minimal => ReflectionStyle::Minimal,
            StyleArg::Standard => ReflectionStyle::Standard,
            StyleArg::Detailed => ReflectionStyle::Detailed,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FallbackArg {
    Cooperate,
    Defect,
}

impl From<FallbackArg> for Action {
    fn from(action: FallbackArg) -> Self {
        match action {
            FallbackArg::Cooperate => Action::Cooperate,
            FallbackArg::Defect => Action::Defect,
        }
    }
}

fn preset_names() -> clap::builder::PossibleValuesParser {
    clap::builder::PossibleValuesParser::new(Preset::ALL.map(Preset::name))
}

fn initialize_tracing(log_level: &str) -> Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level '{log_level}'"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

fn load_config(cli: &Cli) -> Result<ExperimentConfig> {
    let mut config = match (&cli.config, &cli.preset) {
        (Some(path), _) => ExperimentConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        (None, Some(name)) => {
            let preset = Preset::from_name(name).with_context(|| format!("unknown preset '{name}'"))?;
            ExperimentConfig::preset(preset)
        }
        (None, None) => ExperimentConfig::default(),
    };

    let game = &mut config.game;
    if let Some(n) = cli.episodes {
        game.num_episodes = n;
    }
    if let Some(n) = cli.rounds {
        game.rounds_per_episode = n;
    }
    if let Some(n) = cli.window {
        game.history_window = n;
    }
    if let Some(n) = cli.forced_retries {
        game.forced_retries = n;
    }
    if cli.no_reset {
        game.reset_between_episodes = false;
    }
    if cli.no_carry_reflection {
        game.carry_reflection = false;
    }
    if let Some(style) = cli.reflection_style {
        game.reflection.style = style.into();
    }
    if let Some(path) = &cli.reflection_template {
        game.reflection.style = ReflectionStyle::Custom;
        game.reflection.template = None;
        game.reflection.template_path = Some(path.clone());
    }
    if let Some(action) = cli.fallback {
        game.fallback_action = action.into();
    }

    let seats = [
        (cli.model_0.as_ref(), cli.endpoint_0.as_ref()),
        (cli.model_1.as_ref(), cli.endpoint_1.as_ref()),
    ];
    for (agent, (model, endpoint)) in config.agents.iter_mut().zip(seats) {
        if let Some(model) = model {
            agent.model = model.clone();
        }
        if let Some(endpoint) = endpoint {
            agent.endpoint = endpoint.clone();
        }
        if let Some(t) = cli.temperature {
            agent.temperature = t;
        }
    }

    config
        .resolve_files(Path::new("."))
        .context("failed to read referenced files")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn print_summary(result: &GameResult) {
    println!("{}  ({} rounds, {:.1}s)", result.game_id, result.total_rounds, result.elapsed_seconds);
    for episode in &result.episodes {
        println!(
            "  period {:>2}: {:>4} - {:<4}  cooperation {:>5.1}% / {:>5.1}%",
            episode.episode,
            episode.agents[0].episode_score,
            episode.agents[1].episode_score,
            episode.agents[0].cooperation_rate * 100.0,
            episode.agents[1].cooperation_rate * 100.0,
        );
    }
    for agent in &result.agents {
        println!(
            "{} ({}): score {}, cooperated {} ({:.1}%), forced {}, fallbacks {}",
            agent.id,
            agent.model,
            agent.final_score,
            agent.cooperations,
            agent.cooperation_rate * 100.0,
            agent.forced_decisions,
            agent.fallbacks,
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(&cli.log_level)?;

    let config = load_config(&cli)?;
    let [identity_0, identity_1] = config.identities()?;
    let client_0: Arc<dyn InferenceClient> = Arc::new(
        OllamaClient::new(&identity_0.endpoint).context("agent_0 endpoint")?,
    );
    let client_1: Arc<dyn InferenceClient> = Arc::new(
        OllamaClient::new(&identity_1.endpoint).context("agent_1 endpoint")?,
    );

    let game = GameBuilder::new(config.game.clone())
        .agent(identity_0, client_0)
        .agent(identity_1, client_1)
        .build()
        .context("failed to set up game")?;
    let result = game.play().await;

    print_summary(&result);

    if let Some(path) = &cli.output {
        let json = serde_json::to_string_pretty(&result).context("failed to serialize result")?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "result written");
    }
    Ok(())
}
