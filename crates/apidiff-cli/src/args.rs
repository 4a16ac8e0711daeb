use anyhow::{Context, Result, bail};
use apidiff::v1::{
    DiffOptions, Document, Equality, FieldSet, IdentityMode, Propagation, RenameMatching,
};
use clap::{Args, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Previous revision of the API document (use - for stdin)
    #[arg(short, long)]
    pub previous: PathBuf,

    /// Current revision of the API document (use - for stdin)
    #[arg(short, long)]
    pub current: PathBuf,
}

fn is_stdin(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn read_document(path: &Path) -> Result<Document> {
    let content = if is_stdin(path) {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?
    };
    Document::from_json(&content).with_context(|| format!("Failed to parse {:?}", path))
}

impl InputArgs {
    /// Load `(previous, current)`.
    pub fn load(&self) -> Result<(Document, Document)> {
        if is_stdin(&self.previous) && is_stdin(&self.current) {
            bail!("Only one of --previous and --current can be read from stdin");
        }
        let previous = read_document(&self.previous)?;
        let current = read_document(&self.current)?;
        Ok((previous, current))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PropagationArg {
    /// One scan: mark components whose references reach a changed one
    SinglePass,
    /// Rescan until nothing new is marked
    Closure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IdentityArg {
    /// Components with the same name are one component
    Name,
    /// Components are identified by category and name
    Qualified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EqualityArg {
    /// Compare compact serializations (key order matters)
    Serialized,
    /// Compare values (key order ignored)
    Structural,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FieldsArg {
    /// operationId, parameters, requestBody, responses
    Core,
    /// Core plus summary and description
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenamesArg {
    /// Report every move as a removal plus an addition
    Off,
    /// Take the first qualifying candidate in document order
    FirstMatch,
    /// Take the highest-scoring candidates first
    BestScore,
}

#[derive(Args, Debug, Clone, Default)]
pub struct EngineArgs {
    /// Start from the strict profile instead of the default one
    #[arg(long)]
    pub strict: bool,

    /// How component changes propagate to referrers
    #[arg(long, value_enum)]
    pub propagation: Option<PropagationArg>,

    /// What makes two components the same component
    #[arg(long, value_enum)]
    pub identity: Option<IdentityArg>,

    /// How values are compared between revisions
    #[arg(long, value_enum)]
    pub equality: Option<EqualityArg>,

    /// Operation fields that count as a modification
    #[arg(long, value_enum)]
    pub fields: Option<FieldsArg>,

    /// How removed and added endpoints are paired as renames
    #[arg(long, value_enum)]
    pub renames: Option<RenamesArg>,

    /// Minimum similarity score for a rename
    #[arg(long)]
    pub rename_threshold: Option<u32>,
}

impl EngineArgs {
    pub fn to_options(&self) -> DiffOptions {
        let mut options = if self.strict {
            DiffOptions::strict()
        } else {
            DiffOptions::default()
        };

        if let Some(propagation) = self.propagation {
            options.propagation = match propagation {
                PropagationArg::SinglePass => Propagation::SinglePass,
                PropagationArg::Closure => Propagation::Closure,
            };
        }
        if let Some(identity) = self.identity {
            options.identity = match identity {
                IdentityArg::Name => IdentityMode::NameOnly,
                IdentityArg::Qualified => IdentityMode::Qualified,
            };
        }
        if let Some(equality) = self.equality {
            options.equality = match equality {
                EqualityArg::Serialized => Equality::Serialized,
                EqualityArg::Structural => Equality::Structural,
            };
        }
        if let Some(fields) = self.fields {
            options.fields = match fields {
                FieldsArg::Core => FieldSet::Core,
                FieldsArg::Extended => FieldSet::Extended,
            };
        }
        if let Some(renames) = self.renames {
            options.renames = match renames {
                RenamesArg::Off => RenameMatching::Off,
                RenamesArg::FirstMatch => RenameMatching::FirstMatch,
                RenamesArg::BestScore => RenameMatching::BestScore,
            };
        }
        if let Some(threshold) = self.rename_threshold {
            options.rename_threshold = threshold;
        }

        options
    }
}
