use anyhow::Context;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use wayfarer::cli::{
    init::{self, InitConfig, InitResult},
    output::Output,
    repl, Cli, Commands,
};
use wayfarer::utils::config::Secrets;
use wayfarer::utils::toml_config::WayfarerConfig;

fn init_tracing(level: &str, verbose: bool, json: bool) {
    let fallback = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        eprintln!("tracing already initialized: {}", e);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    match run(cli, &output).await {
        Ok(code) => code,
        Err(e) => {
            output.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output) -> anyhow::Result<ExitCode> {
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Init { path, force, ollama } => {
            let result = init::run(&InitConfig { path, force, ollama }, output);
            Ok(match result {
                InitResult::Success => ExitCode::SUCCESS,
                InitResult::AlreadyExists | InitResult::Error(_) => ExitCode::FAILURE,
            })
        }
        Commands::Config { validate } => {
            let config = WayfarerConfig::load(&cli.config)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            let warnings = config.validate_with_warnings()?;
            if !validate {
                output.header("Configuration");
                print!("{}", config.to_toml()?);
            }
            for warning in &warnings {
                output.warning(&warning.message);
            }
            output.success(&format!("{} is valid", cli.config.display()));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Run => {
            let mut config = WayfarerConfig::load_or_default(&cli.config)
                .with_context(|| format!("loading {}", cli.config.display()))?;
            if let Some(lang) = cli.lang {
                config.app.language = lang;
            }
            init_tracing(&config.app.log_level, cli.verbose, cli.log_json);
            tracing::info!(config = %cli.config.display(), "Starting wayfarer");

            let secrets = Secrets::resolve(&config);
            let mut app = config.build_app(&secrets);
            repl::run(&mut app, output).await?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
