// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::BufReader;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::{Config, KNOWN_VOICES};
use app_controller::Controller;

mod app_config;
mod app_controller;
mod engine;
mod errors;
mod file_utils;
mod job_store;
mod merger;
mod subtitles;
mod synthesis;
mod text_segmenter;

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
    /// Convert text to narrated audio with subtitles (default command)
    #[command(alias = "convert")]
    Convert(ConvertArgs),

    /// List the known voices
    Voices,

    /// Generate shell completions for talespeak
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input text file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// Output directory (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Voice name (e.g., 'en-US-JennyNeural')
    #[arg(short, long)]
    voice: Option<String>,

    /// Speaking rate adjustment (e.g., '+10%')
    #[arg(short, long)]
    rate: Option<String>,

    /// Maximum number of chunks synthesized at once
    #[arg(short, long)]
    concurrent_chunks: Option<usize>,

    /// Skip subtitle generation
    #[arg(long)]
    no_subtitles: bool,

    /// Keep per-chunk audio files, skip the ffmpeg merge
    #[arg(long)]
    no_merge: bool,

    /// Configuration file path
    #[arg(long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Check the engine connection before converting
    #[arg(long)]
    check_engine: bool,
}

/// Talespeak - text to narrated audio with subtitles
///
/// Converts long-form text files into audio using a remote streaming speech
/// engine, reconstructing SRT subtitles from the engine's timing events.
#[derive(Parser, Debug)]
#[command(name = "talespeak")]
#[command(version = "1.0.0")]
#[command(about = "Text-to-speech conversion tool with subtitle generation")]
#[command(long_about = "Talespeak splits long text into chunks, synthesizes them concurrently
against a streaming speech engine, and merges the audio with ffmpeg.

EXAMPLES:
    talespeak story.txt                        # Convert using default config
    talespeak -f story.txt                     # Force overwrite existing files
    talespeak -v en-GB-RyanNeural story.txt    # Use a specific voice
    talespeak -c 5 story.txt                   # Synthesize 5 chunks at once
    talespeak --no-merge story.txt             # Keep per-chunk audio files
    talespeak /books/                          # Convert every .txt in a directory
    talespeak voices                           # List known voices
    talespeak completions bash > talespeak.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a
    different file with --config-path. If the config file doesn't exist, a
    default one will be created automatically.

MERGING:
    ffmpeg is optional. When it is not installed the per-chunk audio files
    are left in place instead of being merged.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input text file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Output directory (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Voice name (e.g., 'en-US-JennyNeural')
    #[arg(short, long)]
    voice: Option<String>,

    /// Speaking rate adjustment (e.g., '+10%')
    #[arg(short, long)]
    rate: Option<String>,

    /// Maximum number of chunks synthesized at once
    #[arg(short, long)]
    concurrent_chunks: Option<usize>,

    /// Skip subtitle generation
    #[arg(long)]
    no_subtitles: bool,

    /// Keep per-chunk audio files, skip the ffmpeg merge
    #[arg(long)]
    no_merge: bool,

    /// Configuration file path
    #[arg(long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Check the engine connection before converting
    #[arg(long)]
    check_engine: bool,
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
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
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
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    // Handle subcommands
    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "talespeak", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Voices) => {
            for (voice, description) in KNOWN_VOICES {
                println!("{:<26} {}", voice, description);
            }
            Ok(())
        }
        Some(Commands::Convert(args)) => run_convert(args).await,
        None => {
            // Default behavior - use top-level args for backwards compatibility
            let input_path = cli
                .input_path
                .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

            let convert_args = ConvertArgs {
                input_path,
                output_dir: cli.output_dir,
                force_overwrite: cli.force_overwrite,
                voice: cli.voice,
                rate: cli.rate,
                concurrent_chunks: cli.concurrent_chunks,
                no_subtitles: cli.no_subtitles,
                no_merge: cli.no_merge,
                config_path: cli.config_path,
                log_level: cli.log_level,
                check_engine: cli.check_engine,
            };
            run_convert(convert_args).await
        }
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

async fn run_convert(options: ConvertArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    // Load or create configuration
    let config_path = &options.config_path;
    let mut config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader::<_, Config>(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;
        config
    };

    // Override config with CLI options if provided
    if let Some(voice) = &options.voice {
        config.synthesis.voice = voice.clone();
    }
    if let Some(rate) = &options.rate {
        config.synthesis.rate = rate.clone();
    }
    if let Some(concurrent) = options.concurrent_chunks {
        config.synthesis.concurrent_chunks = concurrent;
    }
    if options.no_subtitles {
        config.synthesis.generate_subtitles = false;
    }
    if options.no_merge {
        config.output.merge_audio = false;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    // Validate the configuration after loading and overriding
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    // Create controller
    let controller = Controller::with_config(config)?;

    if options.check_engine {
        controller.check_engine().await?;
    }

    // Run the controller with the input file(s) and output directory
    if options.input_path.is_file() {
        // Process a single file
        let output_dir = options.output_dir.clone().unwrap_or_else(|| {
            options
                .input_path
                .parent()
                .unwrap_or(Path::new("."))
                .to_path_buf()
        });
        controller
            .run(options.input_path.clone(), output_dir, options.force_overwrite)
            .await?;
    } else if options.input_path.is_dir() {
        // Process a directory
        controller
            .run_folder(options.input_path.clone(), options.output_dir.clone(), options.force_overwrite)
            .await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", options.input_path));
    }

    Ok(())
}
