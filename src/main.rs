mod cli;

use clap::Parser;
use cli::{Cli, Commands, DocumentKind, ValidateArgs};
use jobqueue_staging::app_proxy::AppProxyConfiguration;
use jobqueue_staging::configuration::Configuration;
use jobqueue_staging::loader::{INPUT_FILES_DIR, INPUT_TABLES_DIR, OUTPUT_FILES_DIR, OUTPUT_TABLES_DIR};
use jobqueue_staging::schema::{ComponentSpecificationDefinition, Definition};
use jobqueue_staging::settings::Settings;
use jobqueue_staging::specification::ComponentSpecification;
use jobqueue_staging::state::State;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    let settings = match cli.settings {
        Some(path) => Settings::load_from_path(path)?,
        None => Settings::load()?,
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Validate(args) => validate(args).await?,
        Commands::Paths => {
            for relative in [INPUT_TABLES_DIR, INPUT_FILES_DIR, OUTPUT_TABLES_DIR, OUTPUT_FILES_DIR] {
                println!("{}", settings.data_dir.join(relative).display());
            }
        }
    }

    Ok(())
}

async fn validate(args: ValidateArgs) -> Result<(), BoxError> {
    let content = tokio::fs::read_to_string(&args.file).await?;
    let raw: Value = serde_json::from_str(&content)?;

    let normalized = match args.kind {
        DocumentKind::Component => {
            let component = ComponentSpecification::new(raw.clone())?;
            tracing::info!(
                component_id = component.id(),
                memory_bytes = component.memory_limit_bytes(),
                "Component definition is valid"
            );
            ComponentSpecificationDefinition.process_configuration(&raw)?
        }
        DocumentKind::Configuration => Configuration::from_value(&raw)?.to_value(),
        DocumentKind::State => State::from_value(&raw)?.to_value(),
        DocumentKind::AppProxy => serde_json::to_value(AppProxyConfiguration::from_value(&raw)?)?,
    };

    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}
