use colored::*;
use lightbundle_core::BundleOutcome;

pub fn print_outcome(outcome: &BundleOutcome, quiet: bool) {
    if quiet {
        return;
    }
    match outcome {
        BundleOutcome::NothingFound => {
            println!("{}", "No lighting-related files found.".yellow());
        }
        BundleOutcome::Written {
            file_count,
            output_path,
        } => {
            println!(
                "Wrote {} files to {}",
                file_count,
                output_path.display().to_string().blue()
            );
        }
    }
}
