use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::{Scale, Tier};

#[derive(Parser, Debug)]
#[command(
    name = "wikigate",
    version,
    about = "Quality gate for generated Markdown documentation wikis"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grade a single page against the rubric.
    Page(PageArgs),
    /// Grade every page in a wiki directory and check the wiki structure.
    Wiki(WikiArgs),
    /// Print the requirement profiles, scale guidelines and section catalog.
    Rubric(RubricArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    pub file: PathBuf,

    /// Overrides the tier inferred from the file name.
    #[arg(long, value_enum)]
    pub importance: Option<Tier>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct WikiArgs {
    pub dir: PathBuf,

    /// Applies one tier to every page instead of inferring it per file name.
    #[arg(long, value_enum)]
    pub importance: Option<Tier>,

    /// Overrides the scale inferred from the page count.
    #[arg(long, value_enum)]
    pub scale: Option<Scale>,

    #[arg(long, default_value_t = false)]
    pub json: bool,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RubricArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}
