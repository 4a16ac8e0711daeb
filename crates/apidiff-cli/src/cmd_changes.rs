use anyhow::Result;
use apidiff::v1::{ChangeSet, diff_with};

use crate::args::{EngineArgs, InputArgs};

pub fn run(inputs: InputArgs, engine: EngineArgs, pretty: bool) -> Result<()> {
    let (previous, current) = inputs.load()?;
    let changes = diff_with(&previous, &current, &engine.to_options());
    println!("{}", to_json(&changes, pretty)?);
    Ok(())
}

fn to_json(changes: &ChangeSet, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(changes)?
    } else {
        serde_json::to_string(changes)?
    };
    Ok(json)
}
