use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Bundle lighting-related source files into a single markdown document.",
    long_about = "lightbundle collects every eligible file under the lighting crate, plus any file \nelsewhere in the repository that mentions lighting, and writes them with a table \nof contents to LightingBundle.md in the repository root.",
    help_template = "{about-section}\nUsage: {usage}\n\n{all-args}{after-help}"
)]
pub struct Cli {
    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase message verbosity (-v, -vv).")]
    pub verbose: u8,

    #[arg(short, long, help = "Silence informational messages and warnings.")]
    pub quiet: bool,

    #[arg(
        long,
        help = "Repository to scan (default: current dir).",
        help_heading = "Project Setup",
        value_name = "PATH"
    )]
    pub project_root: Option<PathBuf>,

    #[arg(
        long,
        help = "TOML file overriding the built-in selection rules (default: lightbundle.toml if present).",
        help_heading = "Project Setup",
        value_name = "FILE"
    )]
    pub config: Option<PathBuf>,
}
