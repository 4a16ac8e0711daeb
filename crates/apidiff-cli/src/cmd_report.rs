use anyhow::{Context, Result};
use apidiff::v1::diff_with;
use apidiff_md::RenderOptions;
use std::path::PathBuf;
use tracing::info;

use crate::args::{EngineArgs, InputArgs};

pub fn run(
    inputs: InputArgs,
    engine: EngineArgs,
    output: Option<PathBuf>,
    inline_limit: usize,
) -> Result<()> {
    let report = build_report(&inputs, &engine, inline_limit)?;

    if let Some(path) = &output {
        std::fs::write(path, &report).with_context(|| format!("Failed to write {:?}", path))?;
        info!(path = ?path, bytes = report.len(), "report written");
    } else {
        print!("{}", report);
    }

    Ok(())
}

fn build_report(inputs: &InputArgs, engine: &EngineArgs, inline_limit: usize) -> Result<String> {
    let (previous, current) = inputs.load()?;
    let changes = diff_with(&previous, &current, &engine.to_options());
    if changes.is_empty() {
        info!("no API changes detected");
    }

    let options = RenderOptions {
        inline_affected_paths: inline_limit,
    };
    Ok(apidiff_md::render(&changes, &current, &options))
}
