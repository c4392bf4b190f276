// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, warn};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use xliffwai::app_config::{self, Config};
use xliffwai::app_controller::Controller;
use xliffwai::file_utils::FileManager;

/// Exit code for usage errors and a missing input folder
const EXIT_USAGE: u8 = 2;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for xliffwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// XLIFFwAI - XLIFF translation with AI
///
/// Translates every XLIFF 1.2 file of a folder tree through an
/// OpenAI-compatible chat completions endpoint.
#[derive(Parser, Debug)]
#[command(name = "xliffwai")]
#[command(version)]
#[command(about = "AI-powered XLIFF 1.2 translation tool")]
#[command(long_about = "XLIFFwAI translates the trans-units of XLIFF 1.2 files with an OpenAI-compatible endpoint,
keeping inline markup and placeholders intact. Output files mirror the input tree.

EXAMPLES:
    xliffwai ./xlf ./out fr                                   # Translate into French
    xliffwai ./xlf ./out es-ES http://localhost:1234/v1/chat/completions
    xliffwai ./xlf ./out German http://host/v1/chat/completions my-model
    xliffwai --only-missing ./xlf ./out it                    # Keep targets equal to the source
    xliffwai --config xliffwai.json ./xlf ./out pt            # Load settings from a JSON file
    xliffwai completions bash > xliffwai.bash                 # Generate bash completions

CONFIGURATION:
    Settings are read from the JSON file given with --config, if any. Positional
    arguments and flags override the file.

EXIT CODES:
    0  success, or no .xlf/.xliff files found
    1  translation failure or interrupted run
    2  usage error or missing input folder")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Folder searched recursively for .xlf/.xliff files
    #[arg(value_name = "INPUT_FOLDER")]
    input_folder: Option<PathBuf>,

    /// Folder receiving the translated files
    #[arg(value_name = "OUTPUT_FOLDER")]
    output_folder: Option<PathBuf>,

    /// Target language as a name or code (e.g. 'French', 'fr', 'es-ES')
    #[arg(value_name = "TARGET_LANGUAGE")]
    target_language: Option<String>,

    /// Chat completions endpoint URL
    #[arg(value_name = "ENDPOINT")]
    endpoint: Option<String>,

    /// Model name sent to the endpoint
    #[arg(value_name = "MODEL")]
    model: Option<String>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Do not reuse translations of identical units
    #[arg(long)]
    no_cache: bool,

    /// Only translate units whose target is empty
    #[arg(long)]
    only_missing: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        // The logger accepts everything; the max level does the filtering
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Error: could not initialize logging: {}", e);
    }

    let cli = match CommandLineOptions::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "xliffwai", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    run_translate(cli).await
}

async fn run_translate(options: CommandLineOptions) -> ExitCode {
    let (Some(input_folder), Some(output_folder), Some(target_language)) = (
        options.input_folder.clone(),
        options.output_folder.clone(),
        options.target_language.clone(),
    ) else {
        eprintln!("Usage: xliffwai <INPUT_FOLDER> <OUTPUT_FOLDER> <TARGET_LANGUAGE> [ENDPOINT] [MODEL]");
        eprintln!("Run 'xliffwai --help' for more information.");
        return ExitCode::from(EXIT_USAGE);
    };

    if !FileManager::dir_exists(&input_folder) {
        eprintln!("Error: input folder not found: {}", input_folder.display());
        return ExitCode::from(EXIT_USAGE);
    }

    let config = match build_config(&options, target_language) {
        Ok(config) => config,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    log::set_max_level(config.log_level.to_level_filter());

    let controller = match Controller::with_config(config) {
        Ok(controller) => controller,
        Err(e) => {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };
    controller.install_ctrl_c_handler();

    match controller.run_folder(&input_folder, &output_folder).await {
        Ok(summary) if summary.files == 0 => {
            println!("No .xlf/.xliff files found.");
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            println!("{}", summary.summary());
            if summary.cancelled {
                warn!("Run interrupted; the file in progress was not written");
                ExitCode::FAILURE
            } else if summary.failed_files > 0 {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Load the optional config file and apply command line overrides
fn build_config(options: &CommandLineOptions, target_language: String) -> Result<Config> {
    let mut config = Config::load_or_default(options.config.as_deref())?;

    config.target_language = target_language;
    if let Some(endpoint) = &options.endpoint {
        config.translation.endpoint = endpoint.clone();
    }
    if let Some(model) = &options.model {
        config.translation.model = model.clone();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    if options.no_cache {
        config.processing.use_cache = false;
    }
    if options.only_missing {
        config.processing.translate_if_target_same_as_source = false;
    }

    Ok(config)
}
