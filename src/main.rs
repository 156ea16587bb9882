use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use ui_navigator::cli::commands::{
    OllamaSettings, cmd_flatten, cmd_plan, cmd_plan_intent, cmd_simulate,
};
use ui_navigator::cli::config::{Cli, Commands, load_config};

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref());

    // Resolve settings: CLI > config > defaults
    let ollama = OllamaSettings {
        endpoint: cli
            .ollama_endpoint
            .as_deref()
            .or(config.ollama.endpoint.as_deref()),
        model: cli
            .ollama_model
            .as_deref()
            .or(config.ollama.model.as_deref()),
    };
    let trace_path = cli.trace.as_deref().or(config.trace.path.as_deref());

    let succeeded = match &cli.command {
        Commands::Plan {
            map,
            target,
            start,
            strategy,
        } => {
            let strategy = strategy.unwrap_or(config.planner.strategy);
            cmd_plan(map, target, start, strategy, cli.verbose)?
        }
        Commands::PlanIntent {
            ui_map,
            intent,
            start,
            resolver,
        } => cmd_plan_intent(ui_map, intent, start.as_deref(), resolver, &config, ollama)?,
        Commands::Flatten { ui_map, output } => {
            cmd_flatten(ui_map, output, cli.verbose)?;
            true
        }
        Commands::Simulate {
            ui_map,
            intent,
            start,
            resolver,
        } => cmd_simulate(
            ui_map,
            intent,
            start.as_deref(),
            resolver,
            &config,
            ollama,
            trace_path,
        )?,
    };

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
