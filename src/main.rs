use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

mod app;
mod assist;
mod config;
mod handler;
mod logging;
mod plans;
mod state;
mod trigger;
mod tui;
mod ui;

use app::App;
use assist::AssistClient;
use config::Config;
use plans::PlanId;
use state::UiStateStore;

#[derive(Parser)]
#[command(name = "concierge")]
#[command(about = "Terminal assistant widget with AI suggestions and plan-aware limits")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Plan to run under (free, standard, custom)
    #[arg(short, long, global = true)]
    plan: Option<String>,

    /// Model to use for assist queries
    #[arg(short, long, global = true)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the assistant TUI (default)
    Chat,
    /// Show the plan catalog and limits
    Plans,
    /// One-shot question to the assist endpoint
    Ask {
        /// Your question
        question: String,
    },
    /// List available models on the assist endpoint
    Models,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().unwrap_or_else(|_| Config::new());
    if let Some(model) = cli.model {
        // A model given on the command line becomes the new default
        config.default_model = Some(model);
        let _ = config.save();
    }

    // Plan resolution: CLI flag wins over config, unknown names are
    // reported, nothing falls back silently.
    let plan_id = match &cli.plan {
        Some(s) => s.parse::<PlanId>()?,
        None => config.plan_id()?.unwrap_or(PlanId::Free),
    };

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_tui(config, plan_id).await?,
        Commands::Plans => print_plans(plan_id),
        Commands::Ask { question } => ask(&config, &question).await?,
        Commands::Models => list_models(&config).await?,
    }

    Ok(())
}

async fn run_tui(config: Config, plan_id: PlanId) -> Result<()> {
    if let Ok(log_dir) = logging::init() {
        tracing::info!(plan = %plan_id, log_dir = %log_dir.display(), "starting TUI");
    }

    let store = UiStateStore::new();
    let mut app = App::new(&config, store.clone(), plan_id);
    let mut state_rx = store.subscribe();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = tui::EventHandler::new();

    let result = loop {
        if let Err(err) = terminal.draw(|frame| ui::render(&mut app, frame)) {
            break Err(err.into());
        }

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(event) => {
                        if let Err(err) = handler::handle_event(&mut app, event).await {
                            break Err(err);
                        }
                    }
                    None => break Ok(()),
                }
            }
            // Shared-state mutations redraw on the next loop turn
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                state_rx.borrow_and_update();
            }
        }

        if app.should_quit {
            break Ok(());
        }
    };

    tui::restore()?;
    tracing::info!("TUI stopped");
    result
}

fn print_plans(active: PlanId) {
    println!("\n{}", "Plan catalog".bold().blue());
    println!("{}", "=".repeat(40).dimmed());

    for &id in PlanId::all() {
        let details = plans::lookup(id);
        let marker = if id == active { " (active)" } else { "" };
        println!(
            "\n{}{}",
            details.name.bold().green(),
            marker.dimmed()
        );
        println!("  modules: {}", details.limits.modules.to_string().yellow());
        println!("  tenants: {}", details.limits.tenants.to_string().yellow());
        println!("  users:   {}", details.limits.users.to_string().yellow());
    }
    println!();
}

async fn ask(config: &Config, question: &str) -> Result<()> {
    let client = assist_client(config);
    let model = default_model(config);

    println!("🤖 Asking {}...\n", model.bold().magenta());

    match client.query(&model, question).await {
        Ok(response) => {
            println!("{}", "Response:".bold().green());
            println!("{}", response);
        }
        Err(e) => {
            println!("{}: {}", "Error querying the assist endpoint".red(), e);
            println!("Make sure it is running: {}", "ollama serve".bold());
        }
    }

    Ok(())
}

async fn list_models(config: &Config) -> Result<()> {
    let client = assist_client(config);

    println!("\n{}", "Available models".bold().blue());
    println!("{}", "=".repeat(30).dimmed());

    match client.list_models().await {
        Ok(models) => {
            if models.is_empty() {
                println!(
                    "{}",
                    "No models found. Pull one with: ollama pull gemma3".yellow()
                );
            } else {
                for model in models {
                    println!("  • {}", model.green());
                }
            }
        }
        Err(e) => {
            println!("{}: {}", "Error contacting the assist endpoint".red(), e);
            println!("Make sure it is running: {}", "ollama serve".bold());
        }
    }

    Ok(())
}

fn assist_client(config: &Config) -> AssistClient {
    AssistClient::new(
        config
            .assist_url
            .as_deref()
            .unwrap_or("http://localhost:11434"),
    )
}

fn default_model(config: &Config) -> String {
    config
        .default_model
        .clone()
        .unwrap_or_else(|| "gemma3:latest".to_string())
}
