use anyhow::bail;
use anyhow::Context;
use clap::Parser;
use log::error;
use std::io;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use volume_sheet::config::Settings;
use volume_sheet::config::VolumeMode;
use volume_sheet::config::DEFAULT_SETTINGS_FILE;
use volume_sheet::VolumeSheetError;
use volume_sheet::DEFAULT_OUTPUT_FILE;

/// Builds cut/fill volume sheets from HTML cross-section reports.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Directory containing the HTML files; asked for on stdin when omitted
    directory: Option<PathBuf>,

    /// Settings file
    #[arg(short, long, env = "VOLUME_SHEET_CONFIG", default_value = DEFAULT_SETTINGS_FILE)]
    config: PathBuf,

    /// Write computed volumes instead of formulas
    #[arg(long)]
    values: bool,

    /// Leave out the summary row
    #[arg(long)]
    no_sum_row: bool,

    /// Output workbook name, created inside the directory
    #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
    output: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    match execute(&args) {
        Ok(()) => {
            println!("Done!");
            ExitCode::SUCCESS
        }
        Err(error) => match error.downcast_ref::<VolumeSheetError>() {
            Some(error) => {
                error!("{error}");
                ExitCode::from(error.kind().exit_code())
            }
            None => {
                error!("{error:#}");
                ExitCode::FAILURE
            }
        },
    }
}

fn execute(args: &Args) -> anyhow::Result<()> {
    let mut settings = Settings::load(&args.config).map_err(VolumeSheetError::from)?;
    if args.values {
        settings.volume_mode = VolumeMode::Values;
    }
    if args.no_sum_row {
        settings.include_sum_row = false;
    }

    let directory = match &args.directory {
        Some(directory) => directory.clone(),
        None => prompt_directory()?,
    };
    let summary = volume_sheet::run(&settings, &directory, &args.output)?;
    log::info!(
        "Wrote {} sheets from {} files to {}",
        summary.sheets.len(),
        summary.files.len(),
        summary.output.display()
    );
    Ok(())
}

fn prompt_directory() -> anyhow::Result<PathBuf> {
    print!("Path to directory containing HTML files: ");
    io::stdout().flush().context("Failed to write prompt")?;
    let mut line = String::new();
    io::stdin()
        .read_line(&mut line)
        .context("Failed to read directory from stdin")?;
    let directory = line.trim();
    if directory.is_empty() {
        bail!("No directory given");
    }
    Ok(PathBuf::from(directory))
}
