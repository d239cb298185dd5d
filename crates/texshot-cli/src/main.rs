use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use texshot_build::{Pipeline, RenderConfig};

#[derive(Parser)]
#[command(name = "texshot")]
#[command(about = "Validate LaTeX fragments and render them to images", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a fragment for structural errors without rendering it
    Check {
        /// File holding the LaTeX source; stdin when omitted or `-`
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
    },
    /// Validate a fragment and render it to a JPEG
    Render {
        /// File holding the LaTeX source; stdin when omitted or `-`
        #[arg(value_name = "FILE")]
        path: Option<PathBuf>,
        /// JSON configuration file
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Output image path
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Where failures are written
        #[arg(long, value_name = "PATH")]
        error_log: Option<PathBuf>,
        /// Headless browser executable
        #[arg(long, value_name = "PATH")]
        browser: Option<PathBuf>,
        /// JPEG quality
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
        quality: Option<u8>,
    },
    /// Write the default configuration as JSON
    InitConfig {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

fn read_source(path: Option<&Path>) -> anyhow::Result<String> {
    match path {
        Some(path) if path != Path::new("-") => Ok(fs::read_to_string(path)?),
        _ => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { path } => {
            let source = read_source(path.as_deref())?;
            match texshot_core::validate(&source) {
                Ok(()) => {
                    println!("OK");
                    Ok(ExitCode::SUCCESS)
                }
                Err(diagnostic) => {
                    println!("{}", serde_json::to_string_pretty(&diagnostic)?);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::Render {
            path,
            config,
            output,
            error_log,
            browser,
            quality,
        } => {
            let mut config = match config {
                Some(config_path) => RenderConfig::load(&config_path)?,
                None => RenderConfig::default(),
            };
            if let Some(output) = output {
                config.output_image = output;
            }
            if let Some(error_log) = error_log {
                config.error_log = error_log;
            }
            if browser.is_some() {
                config.browser = browser;
            }
            if let Some(quality) = quality {
                config.jpeg_quality = quality;
            }

            let source = read_source(path.as_deref())?;
            match Pipeline::new(config).run(&source) {
                Ok(image) => {
                    println!("{}  sha256:{}", image.path().display(), image.fingerprint());
                    Ok(ExitCode::SUCCESS)
                }
                // Already logged and written to the error log by the pipeline.
                Err(_) => Ok(ExitCode::FAILURE),
            }
        }
        Commands::InitConfig { path } => {
            RenderConfig::default().save(&path)?;
            log::info!("Wrote default configuration to {:?}", path);
            Ok(ExitCode::SUCCESS)
        }
    }
}
