use std::path::PathBuf;

use engine::{image_model, llm};

#[derive(Debug, clap::Parser)]
#[command(version, about = "Finding the on-Trent version of your favourite thing")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Subcommand)]
pub enum Command {
    /// Find the budget alternative of something and draw it
    Find(Find),
    /// Store API keys and model choices in the config file
    Configure(Configure),
}

#[derive(Debug, clap::Args)]
pub struct Find {
    /// A luxury brand, a thing, or a famous person
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Where to write the image. Defaults to `trentified.<ext>` in the working directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also print what the on-Trent version is
    #[arg(short, long)]
    pub reveal: bool,

    #[arg(long)]
    pub text_model: Option<llm::Model>,

    #[arg(long)]
    pub image_model: Option<image_model::Model>,

    #[command(flatten)]
    pub keys: ApiKeys,
}

#[derive(Debug, Default, clap::Args)]
pub struct ApiKeys {
    /// Google AI Studio (Gemini) API key
    #[arg(long)]
    pub google_key: Option<String>,

    /// OpenRouter API key
    #[arg(long)]
    pub openrouter_key: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct Configure {
    #[arg(long)]
    pub text_model: Option<llm::Model>,

    #[arg(long)]
    pub image_model: Option<image_model::Model>,

    #[command(flatten)]
    pub keys: ApiKeys,
}
