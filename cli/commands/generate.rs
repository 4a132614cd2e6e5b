use crate::cli_args::Cli;
use anyhow::{Context, Result};
use lightbundle_core::{self as core, BundleConfig, BundleOutcome};
use log;

pub fn handle_generate_command(args: &Cli) -> Result<BundleOutcome> {
    let project_root = BundleConfig::determine_project_root(args.project_root.as_ref())
        .context("Failed to determine project root")?;
    log::info!("Project root determined: {}", project_root.display());

    let config = BundleConfig::load(&project_root, args.config.as_ref())
        .context("Failed to load configuration")?;
    log::debug!("Effective configuration: {:?}", config);

    core::generate_bundle(&project_root, &config).context("Failed to generate lighting bundle")
}
