use clap::Parser;
use color_eyre::Result;
use engine::{
    llm::Model,
    resolver::{ConceptQuery, ConceptResolver},
};

#[derive(clap::Parser)]
pub struct Cli {
    model: Model,
    api_key: String,
    query: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    pretty_env_logger::init();
    color_eyre::install()?;

    let resolver = ConceptResolver::new(args.model.make(args.api_key));
    let resolution = resolver.resolve(&ConceptQuery::new(&args.query)?).await?;

    println!(
        "{} -> {} (person: {})",
        args.query, resolution.substitute, resolution.is_person
    );
    Ok(())
}
