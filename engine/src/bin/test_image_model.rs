use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use engine::{
    image_model::Model,
    renderer::ImageRenderer,
    resolver::ConceptResolution,
};

#[derive(clap::Parser)]
struct Arg {
    model: Model,
    key: String,
    substitute: String,
    #[arg(long)]
    person: bool,
    #[arg(short, long, default_value = "output.png")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;
    let Arg {
        model,
        key,
        substitute,
        person,
        output,
    } = Arg::parse();
    let renderer = ImageRenderer::new(model.make(key));

    let image = renderer
        .render(&ConceptResolution {
            substitute,
            is_person: person,
        })
        .await?;
    let bytes = image.decode()?;
    std::fs::write(&output, &bytes)?;
    println!(
        "Saved {} image to {}, {} bytes",
        image.mime_type,
        output.display(),
        bytes.len()
    );

    Ok(())
}
