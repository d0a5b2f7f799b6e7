use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tokio::sync::{mpsc, watch};

use feelien::backend::{AlienBackend, AlienUpdate, BackendReply, HttpBackend, PersonalityPatch, Poller};
use feelien::config::{load_config, FeelienConfig};
use feelien::mood::describe;
use feelien::{AppState, AreaTouched, Environment, MissionBoard, MoodReport, Trait};

#[derive(Parser)]
#[command(name = "feelien")]
#[command(about = "Talk to Feelien and watch its mood change", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    /// Backend base URL, overriding the config file
    #[arg(long, global = true)]
    backend_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Keep everything local; commands that need the backend fail
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Command,
}

/// Personality and surroundings to evaluate.
#[derive(Args, Debug)]
struct StateArgs {
    /// JSON file with some or all personality traits
    #[arg(long)]
    personality: Option<PathBuf>,

    /// Override a single trait, e.g. `--set anger=80`
    #[arg(long = "set", value_name = "TRAIT=VALUE", value_parser = parse_assignment)]
    set: Vec<(Trait, f64)>,

    /// Distance to the alien in cm
    #[arg(long)]
    distance: Option<f64>,

    /// Touch force, 0-100
    #[arg(long)]
    force: Option<f64>,

    /// Motion intensity, 0-100
    #[arg(long)]
    motion: Option<f64>,

    /// Ambient temperature in °C
    #[arg(long)]
    temperature: Option<f64>,

    /// Touched area: eyes, mouth, forehead or face
    #[arg(long)]
    area: Option<AreaTouched>,
}

#[derive(Subcommand)]
enum Command {
    /// Show the mood the alien derives from a personality and environment
    Mood {
        #[command(flatten)]
        state: StateArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Say something to the alien
    Say {
        text: String,

        #[command(flatten)]
        state: StateArgs,
    },
    /// Transcribe a recording, optionally sending it on as a message
    Listen {
        file: PathBuf,

        /// Send the transcript to the alien
        #[arg(long)]
        send: bool,

        #[command(flatten)]
        state: StateArgs,
    },
    /// Reset the alien on the backend
    Reset,
    /// Let the alien vocalise about its surroundings
    Vocalize {
        #[command(flatten)]
        state: StateArgs,
    },
    /// Poll the backend and print every new state
    Watch {
        /// Poll interval, overriding the config
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Evaluate the mission board
    Missions {
        #[command(flatten)]
        state: StateArgs,

        /// Conversations held so far
        #[arg(long, default_value_t = 0)]
        conversations: u32,

        /// Print the board as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_assignment(s: &str) -> Result<(Trait, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TRAIT=VALUE, got `{s}`"))?;
    let name: Trait = name.parse().map_err(|e| format!("{e}"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {name}: {e}"))?;
    Ok((name, value))
}

fn load_personality(path: &Path) -> anyhow::Result<PersonalityPatch> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid personality in {}", path.display()))
}

fn build_state(args: &StateArgs) -> anyhow::Result<AppState> {
    let mut state = AppState::default();

    if let Some(path) = &args.personality {
        let patch = load_personality(path)?;
        for name in Trait::ALL {
            if let Some(value) = patch.get(name) {
                state.set_trait(name, value)?;
            }
        }
    }
    for (name, value) in &args.set {
        state.set_trait(*name, *value)?;
    }

    let defaults = Environment::default();
    let environment = Environment {
        distance: args.distance.unwrap_or(defaults.distance),
        force: args.force.unwrap_or(defaults.force),
        motion: args.motion.unwrap_or(defaults.motion),
        temperature: args.temperature.unwrap_or(defaults.temperature),
        area_touched: args.area.unwrap_or(defaults.area_touched),
    };
    if environment != defaults {
        state.set_environment(environment)?;
    }
    Ok(state)
}

fn backend_config(cli: &Cli) -> anyhow::Result<FeelienConfig> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(url) = &cli.backend_url {
        config.backend_url.clone_from(url);
        config.validate()?;
    }
    Ok(config)
}

/// Build a backend client, failing with `BackendDisabled` when traffic is off.
fn connect(cli: &Cli, state: &mut AppState) -> anyhow::Result<(HttpBackend, FeelienConfig)> {
    let config = backend_config(cli)?;
    state.backend_enabled = config.backend_enabled && !cli.offline;
    state.ensure_backend()?;
    Ok((HttpBackend::new(&config)?, config))
}

#[allow(clippy::print_stdout)]
fn print_report(state: &AppState, report: &MoodReport) {
    println!(
        "Feelien is {} {} ({:.1})",
        report.emotion.name, report.emotion.emoji, report.emotion.score
    );
    for info in &report.scores {
        println!("  {:<9} {} {:>6.1}", info.name.name(), info.emoji, info.score);
    }

    println!();
    for name in Trait::ALL {
        let value = state.personality.get(name);
        println!(
            "  {:<13} {:>5.1}  [{:<6}] {}",
            name.name(),
            value,
            describe::band_color(value),
            name.describe(value)
        );
    }

    let env = &state.environment;
    println!();
    println!("  distance     {:>6.1} cm  {}", env.distance, describe::distance(env.distance));
    println!("  force        {:>6.1}     {}", env.force, describe::force(env.force));
    println!("  motion       {:>6.1}     {}", env.motion, describe::motion(env.motion));
    println!(
        "  temperature  {:>6.1} °C  {}",
        env.temperature,
        describe::temperature(env.temperature)
    );
    if !env.area_touched.as_str().is_empty() {
        println!("  touched      {}", env.area_touched.as_str());
    }

    println!();
    println!(
        "Shell: {} | Tail: every {:.2}s, {}°",
        if report.puffed { "deflated" } else { "puffed up" },
        report.tail.delay_secs,
        report.tail.step_degrees
    );
    println!("Face: {}  Status: {}", report.face, report.disposition);
}

#[allow(clippy::print_stdout)]
fn print_update(state: &AppState, update: &AlienUpdate) -> anyhow::Result<()> {
    let report = state.mood()?;
    let sequence = update
        .sequence
        .map_or_else(|| "-".to_string(), |s| s.to_string());
    println!(
        "[{}] #{} {} {} | {} {} {}{}",
        update.received_at.format("%H:%M:%S"),
        sequence,
        report.emotion.emoji,
        report.emotion.name,
        state.output.status(),
        state.output.css_rgb(),
        if state.output.is_shaking() { "shaking " } else { "" },
        if state.processing { "(thinking)" } else { "" }
    );
    if let Some(text) = &update.text {
        println!("  Feelien: {text}");
    }
    Ok(())
}

/// Apply a backend reply to `state` and print what changed.
fn show_reply(state: &mut AppState, reply: BackendReply) -> anyhow::Result<()> {
    let update = reply.into_update(&state.personality);
    state.apply(update.clone());
    print_update(state, &update)
}

async fn converse(
    backend: &HttpBackend,
    state: &mut AppState,
    text: &str,
) -> anyhow::Result<()> {
    state.ensure_backend()?;
    state.processing = true;
    let reply = backend.process_text(text, &state.personality).await?;
    state.processing = false;
    show_reply(state, reply)?;
    state.record_communication();
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn watch_backend(backend: HttpBackend, interval: Duration) -> anyhow::Result<()> {
    let mut state = AppState::default();
    let mut board = MissionBoard::new();
    let poller = Poller::new(Arc::new(backend), interval, state.personality);

    let (tx, mut rx) = mpsc::channel(32);
    let (stop_tx, stop_rx) = watch::channel(false);
    let handle = poller.spawn(tx, stop_rx);

    loop {
        tokio::select! {
            update = rx.recv() => {
                let Some(update) = update else { break };
                state.apply(update.clone());
                print_update(&state, &update)?;
                for id in board.check(&state)? {
                    if let Some(mission) = board.get(id) {
                        println!("  {} Mission complete: {} (+{} pts)", mission.icon, mission.title, mission.points);
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, stopping");
                break;
            }
        }
    }

    let _ = stop_tx.send(true);
    handle.await.context("Poller task failed")?;
    let (done, total) = board.progress();
    println!("Missions: {done}/{total}, {} pts", board.total_points());
    Ok(())
}

#[allow(clippy::print_stdout)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    match &cli.command {
        Command::Mood { state, json } => {
            let state = build_state(state)?;
            let report = state.mood()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&state, &report);
            }
        }
        Command::Say { text, state } => {
            if text.trim().is_empty() {
                bail!("Nothing to say");
            }
            let mut state = build_state(state)?;
            let (backend, _) = connect(&cli, &mut state)?;
            converse(&backend, &mut state, text).await?;
        }
        Command::Listen { file, send, state } => {
            let mut state = build_state(state)?;
            let (backend, _) = connect(&cli, &mut state)?;
            let transcript = backend.transcribe(file, &state.personality).await?;
            println!("You said: {transcript}");
            if *send {
                converse(&backend, &mut state, &transcript).await?;
            }
        }
        Command::Reset => {
            let mut state = AppState::default();
            let (backend, _) = connect(&cli, &mut state)?;
            let reply = backend.reset().await?;
            show_reply(&mut state, reply)?;
        }
        Command::Vocalize { state } => {
            let mut state = build_state(state)?;
            let (backend, _) = connect(&cli, &mut state)?;
            let reply = backend.vocalize(&state.environment).await?;
            state.env_changed = false;
            show_reply(&mut state, reply)?;
        }
        Command::Watch { interval_ms } => {
            let mut state = AppState::default();
            let (backend, config) = connect(&cli, &mut state)?;
            let interval = Duration::from_millis(interval_ms.unwrap_or(config.poll_interval_ms));
            if interval.is_zero() {
                bail!("Interval must be greater than 0");
            }
            watch_backend(backend, interval).await?;
        }
        Command::Missions {
            state,
            conversations,
            json,
        } => {
            let mut state = build_state(state)?;
            state.communication_count = *conversations;
            let mut board = MissionBoard::new();
            board.check(&state)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&board)?);
            } else {
                for mission in board.missions() {
                    let mark = if mission.completed { "x" } else { " " };
                    println!(
                        "[{mark}] {} {:<24} {:>3} pts",
                        mission.icon, mission.title, mission.points
                    );
                }
                let (done, total) = board.progress();
                println!("{done}/{total} complete, {} / {} pts", board.total_points(), board.max_points());
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    tracing::debug!("feelien {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        return Err(e);
    }
    Ok(())
}
