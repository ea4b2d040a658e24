//! Terminal rendition of the on-Trent theme.

use std::path::{Path, PathBuf};

use color_eyre::{Result, eyre::Context};
use engine::{
    pipeline::{Outcome, PipelineError},
    renderer::RenderedImage,
    resolver::ConceptQuery,
    session::Phase,
};
use log::debug;
use tokio::sync::watch;

pub const TITLE: &str = "ON-TRENTIFY";
pub const TAGLINE: &str = "THE BUDGET ALTERNATIVE";

/// The caption laid over the picture.
pub fn headline(query: &ConceptQuery) -> String {
    format!("{}-ON-TRENT", query.as_str().to_uppercase())
}

pub fn reveal_line(outcome: &Outcome) -> String {
    format!(
        "The Championship version of {} is: {}",
        outcome.query,
        outcome.resolution.substitute.to_uppercase()
    )
}

pub fn banner(phase: &Phase) -> Option<String> {
    match phase {
        Phase::Idle => Some(
            indoc::indoc!(
                "
                READY FOR KICK-OFF
                Enter your Premier League choice
                We'll match you with the Championship equivalent"
            )
            .to_string(),
        ),
        Phase::Resolving { .. } => {
            Some("SCOUTING THE CHAMPIONSHIP...\nFinding you a proper bargain".to_string())
        }
        Phase::Rendering { query } => Some(format!("Getting {query}'s stand-in into the kit...")),
        Phase::Done(_) | Phase::Failed { .. } => None,
    }
}

/// Prints a banner for every phase change until the session goes away.
pub async fn narrate(mut phases: watch::Receiver<Phase>) {
    while phases.changed().await.is_ok() {
        let phase = phases.borrow_and_update().clone();
        debug!("Phase: {phase:?}");
        if let Some(text) = banner(&phase) {
            eprintln!("{text}");
        }
    }
}

pub fn output_path(requested: Option<&Path>, image: &RenderedImage) -> PathBuf {
    match requested {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format!("trentified.{}", image.file_extension())),
    }
}

pub fn show_outcome(outcome: &Outcome, output: Option<&Path>, reveal: bool) -> Result<PathBuf> {
    let bytes = outcome
        .image
        .decode()
        .context("image payload is not valid base64")?;
    let path = output_path(output, &outcome.image);
    std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;

    println!("{}", headline(&outcome.query));
    println!("Saved the picture to {} ({} bytes)", path.display(), bytes.len());
    if reveal {
        println!("{}", reveal_line(outcome));
    } else {
        println!("Run again with --reveal to see the squad player");
    }
    Ok(path)
}

pub fn show_failure(err: &PipelineError) {
    eprintln!("OWN GOAL!\n{err}\nEven the budget version let us down");
}
