//! Interactive patching run

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::style;
use riivo::layout::DEFAULT_OUTPUT_NAME;
use riivo::tool::DEFAULT_WIT;
use riivo::{Layout, RunSummary, Wit};

use crate::utils::{SpinnerTool, TerminalPrompter, format_bytes};

#[derive(Args)]
pub struct PatchArgs {
    /// Base directory holding sd_files/, disc_image/ and the output folders
    #[arg(long, default_value = ".", env = "RIIVO_ROOT")]
    pub root: PathBuf,

    /// Wiimms ISO Tools executable
    #[arg(long, default_value = DEFAULT_WIT, env = "RIIVO_WIT")]
    pub wit: PathBuf,

    /// File name of the patched image inside patched_disc_image/
    #[arg(long, default_value = DEFAULT_OUTPUT_NAME)]
    pub output_name: String,
}

pub fn execute(args: PatchArgs, quiet: bool) -> Result<()> {
    let layout = Layout::new(&args.root).with_output_name(args.output_name);
    log::debug!("Using layout {layout:?}");

    let tool = SpinnerTool::new(Wit::new(args.wit), !quiet);
    let mut prompter = TerminalPrompter;

    let summary = riivo::run(&layout, &mut prompter, &tool)?;
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", style("Selected patches:").green().bold());
    for id in &summary.patches {
        println!("- {id}");
    }

    println!(
        "Folders copied: {}, files copied: {}, memory patches: {} applied, {} skipped",
        style(summary.overlay.folders_copied).cyan(),
        style(summary.overlay.files_copied).cyan(),
        style(summary.memory.applied).cyan(),
        style(summary.memory.skipped).yellow()
    );

    if !summary.overlay.skipped.is_empty() {
        println!("{}", style("Skipped missing sources:").yellow());
        for path in &summary.overlay.skipped {
            println!("  {}", style(path.display()).red());
        }
    }

    if summary.work_dir_removed {
        println!("{}", style("Removed tmp files.").yellow());
    } else {
        println!("{}", style("Keeping tmp files.").red());
    }

    let size = fs::metadata(&summary.output_image)
        .map(|m| format!(" ({})", format_bytes(m.len())))
        .unwrap_or_default();
    println!(
        "{} Patched file is located at \"{}\"{size}.",
        style("Done!").green().bold(),
        summary.output_image.display()
    );
}
