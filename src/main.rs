// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::too_many_arguments)]

use anyhow::{Result, anyhow, Context};
use log::{LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use narrasrt::app_config::{self, Config, SynthesisBackend};
use narrasrt::app_controller::Controller;
use narrasrt::file_utils::FileManager;
use narrasrt::segmenter::CaptionPlatform;
use narrasrt::timing::DurationMode;
use narrasrt::voices::VoiceId;

/// CLI Wrapper for SynthesisBackend to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSynthesisBackend {
    EdgeTts,
    Remote,
}

impl From<CliSynthesisBackend> for SynthesisBackend {
    fn from(cli_backend: CliSynthesisBackend) -> Self {
        match cli_backend {
            CliSynthesisBackend::EdgeTts => SynthesisBackend::EdgeTts,
            CliSynthesisBackend::Remote => SynthesisBackend::Remote,
        }
    }
}

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

fn parse_voice(selector: &str) -> Result<VoiceId, String> {
    Ok(VoiceId::from_selector(selector))
}

fn parse_platform(label: &str) -> Result<CaptionPlatform, String> {
    Ok(CaptionPlatform::from_label(label))
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Narrate text into audio and SRT captions (default command)
    #[command(alias = "narrate")]
    Generate(GenerateArgs),

    /// Generate shell completions for narrasrt
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct GenerateArgs {
    /// Input .txt file or directory of .txt files
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Narrate this text instead of reading a file
    #[arg(long, conflicts_with = "input_path")]
    text: Option<String>,

    /// Directory for the audio and SRT outputs (defaults to the input's directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output base name (defaults to the input file name, or "output")
    #[arg(short = 'n', long)]
    name: Option<String>,

    /// Voice: thiha, nilar, ryan, sonia, or a voice label
    #[arg(short, long, value_parser = parse_voice)]
    voice: Option<VoiceId>,

    /// Speaking rate offset in percent
    #[arg(short, long, allow_negative_numbers = true)]
    speed: Option<i32>,

    /// Pitch offset in Hz
    #[arg(short, long, allow_negative_numbers = true)]
    pitch: Option<i32>,

    /// Volume boost in dB
    #[arg(long)]
    volume: Option<f64>,

    /// Caption profile: tiktok or youtube
    #[arg(long, value_parser = parse_platform)]
    platform: Option<CaptionPlatform>,

    /// File of `pattern = replacement` pronunciation rules
    #[arg(short, long)]
    rules_file: Option<PathBuf>,

    /// Estimate caption durations from text length instead of measuring audio
    #[arg(long)]
    estimate: bool,

    /// Synthesis backend
    #[arg(short, long, value_enum)]
    backend: Option<CliSynthesisBackend>,

    /// Remote narration endpoint (with --backend remote)
    #[arg(long)]
    endpoint: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// narrasrt - Myanmar and English narration with synchronized captions
///
/// Turns text into narrated audio and a matching SRT caption file.
#[derive(Parser, Debug)]
#[command(name = "narrasrt")]
#[command(version)]
#[command(about = "Text-to-speech narration with SRT captions")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "narrasrt splits text into sentences, narrates each one with a neural voice and writes the joined audio together with SRT captions timed to it.

EXAMPLES:
    narrasrt story.txt                          # Narrate using default config
    narrasrt -f story.txt                       # Force overwrite existing files
    narrasrt -v nilar -s 10 -p -5 story.txt     # Female voice, faster, lower pitch
    narrasrt --platform youtube story.txt       # Wide captions for 16:9 video
    narrasrt --text \"Hello world.\" -n hello     # Narrate inline text
    narrasrt --estimate /stories/               # Process a directory without measuring audio
    narrasrt completions bash > narrasrt.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

VOICES:
    thiha  - Myanmar, male (default)
    nilar  - Myanmar, female
    ryan   - English (UK), male
    sonia  - English (UK), female")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    generate: GenerateArgs,
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
        let logger = Box::new(CustomLogger::new(LevelFilter::Trace));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
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
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(level), now, Self::get_emoji_for_level(level), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config or the command line says otherwise
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "narrasrt", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Generate(args)) => run_generate(args).await,
        None => run_generate(cli.generate).await,
    }
}

fn apply_overrides(config: &mut Config, options: &GenerateArgs) {
    if let Some(voice) = options.voice {
        config.voice = voice;
    }

    if let Some(speed) = options.speed {
        config.speed_percent = speed;
    }

    if let Some(pitch) = options.pitch {
        config.pitch_offset_hz = pitch;
    }

    if let Some(volume) = options.volume {
        config.volume_boost_db = volume;
    }

    if let Some(platform) = options.platform {
        config.platform = platform;
    }

    if let Some(rules_file) = &options.rules_file {
        config.rules_file = Some(rules_file.clone());
    }

    if options.estimate {
        config.timing.mode = DurationMode::Estimated;
    }

    if let Some(backend) = &options.backend {
        config.synthesis.backend = backend.clone().into();
    }

    if let Some(endpoint) = &options.endpoint {
        config.synthesis.endpoint = endpoint.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

async fn run_generate(options: GenerateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);

    // Validate the configuration after loading and overriding
    config.validate()
        .context("Configuration validation failed")?;

    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;
    controller.check_backend().await?;

    if let Some(text) = &options.text {
        let output_dir = options.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        controller.run_text(text, output_dir, options.name.clone(), options.force_overwrite).await?;
        return Ok(());
    }

    let input_path = options.input_path
        .ok_or_else(|| anyhow!("INPUT_PATH is required unless --text is given"))?;

    if FileManager::file_exists(&input_path) {
        let output_dir = options.output_dir.unwrap_or_else(|| {
            input_path.parent().unwrap_or(Path::new(".")).to_path_buf()
        });
        controller.run(input_path.clone(), output_dir, options.name, options.force_overwrite).await?;
    } else if FileManager::dir_exists(&input_path) {
        controller.run_folder(input_path, options.output_dir, options.force_overwrite).await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", input_path));
    }

    Ok(())
}
