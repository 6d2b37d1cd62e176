use clap::{Parser, Subcommand};
use log::debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use recipe_generator::{
    build_prompt, extract_from_text, AppConfig, GeneratorError, MemoryStore, RecipeGenerator,
    RecipeRequest, StaticGenerator,
};

#[derive(Parser)]
#[command(name = "recipe-generator", version, about = "Generate and parse structured recipes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a saved generation response and print the structured recipe as JSON
    Extract {
        /// File holding the raw response text
        response: PathBuf,
        /// Optional request JSON the response was generated for
        #[arg(long)]
        request: Option<PathBuf>,
    },
    /// Validate a request and print the prompt that would be sent
    Prompt {
        /// Request JSON file
        request: PathBuf,
    },
    /// Run the full workflow, replaying a saved response as the generation service
    Generate {
        #[arg(long)]
        request: PathBuf,
        #[arg(long)]
        response: PathBuf,
    },
}

async fn read_request(path: &Path) -> Result<RecipeRequest, GeneratorError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&raw)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Command::Extract { response, request } => {
            let raw = tokio::fs::read_to_string(&response).await?;
            let request = match request {
                Some(path) => Some(read_request(&path).await?),
                None => None,
            };
            let recipe = extract_from_text(&raw, request.as_ref());
            println!("{}", serde_json::to_string_pretty(&recipe)?);
        }
        Command::Prompt { request } => {
            let request = read_request(&request).await?;
            request.validate()?;
            println!("{}", build_prompt(&request));
        }
        Command::Generate { request, response } => {
            let request = read_request(&request).await?;
            let raw = tokio::fs::read_to_string(&response).await?;

            let generator = RecipeGenerator::builder()
                .generator(StaticGenerator::new(raw).with_model(config.generation.model.clone()))
                .store(Arc::new(MemoryStore::new()))
                .config(config.generation)
                .build()?;

            let recipe = generator.generate(&request).await?;
            println!("{}", serde_json::to_string_pretty(&recipe)?);
        }
    }

    Ok(())
}
