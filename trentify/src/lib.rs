use std::{
    fs,
    path::{Path, PathBuf},
};

use color_eyre::{
    Result,
    eyre::{WrapErr as _, bail, eyre},
};
use engine::{
    pipeline::Pipeline,
    session::{Session, Submission},
};
use log::info;
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    cli::{Cli, Command, Configure, Find},
    config::Config,
};

pub mod cli;
pub mod config;
pub mod display;

const CONFIG_FILE_NAME: &str = "trentify.ron";

pub async fn run(cli: Cli) -> Result<()> {
    let path = match cli.config {
        Some(path) => path,
        None => config_path()?,
    };
    let cfg = load_config(&path)?.unwrap_or_default();

    match cli.command {
        Command::Find(args) => find(cfg, args).await,
        Command::Configure(args) => configure(cfg, args, &path),
    }
}

async fn find(cfg: Config, args: Find) -> Result<()> {
    let text_model = args.text_model.unwrap_or(cfg.text_model);
    let image_model = args.image_model.unwrap_or(cfg.image_model);
    info!("Using {text_model} for text and {image_model} for images");

    let llm = text_model.make(cfg.api_key(text_model.provider(), &args.keys)?);
    let imgmod = image_model.make(cfg.api_key(image_model.provider(), &args.keys)?);
    let session = Session::new(Pipeline::from_models(llm, imgmod));

    eprintln!("{}\n{}\n", display::TITLE, display::TAGLINE);
    let narrator = tokio::spawn(display::narrate(session.subscribe()));
    let submission = session.submit(&args.query.join(" ")).await;
    drop(session);
    narrator.await?;

    match submission {
        Submission::Completed(outcome) => {
            display::show_outcome(&outcome, args.output.as_deref(), args.reveal)?;
            Ok(())
        }
        Submission::Failed(e) => {
            display::show_failure(&e);
            Err(e.into())
        }
        Submission::Empty => bail!("Nothing to trentify, the query is blank"),
        Submission::Busy => bail!("A submission is already in flight"),
    }
}

fn configure(mut cfg: Config, args: Configure, path: &Path) -> Result<()> {
    if let Some(model) = args.text_model {
        cfg.text_model = model;
    }
    if let Some(model) = args.image_model {
        cfg.image_model = model;
    }
    cfg.store_keys(&args.keys);

    save_config(path, &cfg)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

pub fn load_ron_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let src = fs::read_to_string(path)?;
    Ok(ron::from_str(&src)?)
}

pub fn save_ron_file<T: Serialize>(path: &Path, x: &T) -> Result<()> {
    let src = ron::ser::to_string_pretty(x, ron::ser::PrettyConfig::default())?;
    Ok(fs::write(path, src)?)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(dirs::config_local_dir()
        .ok_or(eyre!("Couldn't get config dir"))?
        .join(CONFIG_FILE_NAME))
}

pub fn load_config(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        Ok(None)
    } else {
        load_ron_file(path)
            .map(Some)
            .wrap_err_with(|| format!("loading config from {}", path.display()))
    }
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    save_ron_file(path, cfg)
}
