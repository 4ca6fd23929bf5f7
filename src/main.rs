// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use parking_lot::Mutex;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

use svg_slicer::app_config::{self, Config};
use svg_slicer::app_controller::Controller;
use svg_slicer::compositor;
use svg_slicer::display::SvgFileSurface;
use svg_slicer::events::{slicer_channel, EventSender, SlicerEvent};
use svg_slicer::file_utils::FileManager;
use svg_slicer::pins::{PinSignal, PinTransport, PinValue, SignalBus};
use svg_slicer::svg_document::SvgDocument;

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
    /// List the layers of a drawing
    Layers {
        /// Layered SVG drawing
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compose a single layer into a standalone SVG
    Compose {
        /// Layered SVG drawing
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Layer id to compose
        #[arg(short = 'n', long, allow_hyphen_values = true)]
        layer: i32,

        /// Write the composite here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the pin-driven slicer, reading host commands from stdin
    Run {
        /// Drawing to load on start
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Override the configured output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions for svg-slicer
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// svg-slicer - show one slice of a layered SVG at a time
#[derive(Parser, Debug)]
#[command(name = "svg-slicer")]
#[command(version)]
#[command(about = "Layer selection and recomposition for sliced SVG drawings")]
#[command(long_about = "svg-slicer extracts the layer groups of a sliced SVG drawing and recomposes one of them into a standalone SVG.

EXAMPLES:
    svg-slicer layers part.svg                  # List layer ids
    svg-slicer compose part.svg -n 12           # Print layer 12 as SVG
    svg-slicer run part.svg -o current.svg      # Pin-driven mode

RUN MODE COMMANDS (one per line on stdin):
    load <path>     Load or reload a drawing
    layer <n>       Drive the layer.in pin
    enable <0|1>    Drive the enable pin
    status          Print all pin values
    quit            Stop

CONFIGURATION:
    Run mode reads svgslicer.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", default_value = "svgslicer.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,
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

    // @returns: ANSI colour and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
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
            let (colour, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                colour, now, tag, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the max level filters
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    match cli.command {
        Commands::Layers { file, json } => list_layers(file, json),
        Commands::Compose { file, layer, output } => compose_layer(file, layer, output),
        Commands::Run { file, output } => {
            run_slicer(&cli.config_path, file, output, cli.log_level.is_some()).await
        }
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "svg-slicer", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn list_layers(file: PathBuf, json: bool) -> Result<()> {
    let document = SvgDocument::load(&file)?;
    let summary = document.summary();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}: {} layers", summary.source_file.display(), summary.layer_count);
    for (position, id) in summary.layer_ids.iter().enumerate() {
        println!("  #{:<4} layer{}", position, id);
    }
    if !summary.duplicate_ids.is_empty() {
        println!("duplicate ids: {:?}", summary.duplicate_ids);
    }

    Ok(())
}

fn compose_layer(file: PathBuf, layer: i32, output: Option<PathBuf>) -> Result<()> {
    let document = SvgDocument::load(&file)?;
    let composite = compositor::compose(&document, layer);

    if composite.is_blank() {
        warn!("No layer {} in {}, output is blank", layer, file.display());
    }

    match output {
        Some(path) => {
            FileManager::write_to_file(&path, &composite.to_svg_string())?;
            info!("Success: {}", path.display());
        }
        None => print!("{}", composite),
    }

    Ok(())
}

// @struct: Pin names the stdin host drives
struct HostPins {
    enable: String,
    layer_in: String,
}

async fn run_slicer(config_path: &str, file: Option<PathBuf>, output: Option<PathBuf>, level_from_cli: bool) -> Result<()> {
    let mut config = Config::load_or_create(config_path)?;

    // If log level was not set via command line, update it from config now
    if !level_from_cli {
        log::set_max_level(config.log_level.to_level_filter());
    }

    if let Some(output) = output {
        config.display.output_path = output.to_string_lossy().to_string();
    }

    let (sender, receiver) = slicer_channel();
    let bus = Arc::new(Mutex::new(SignalBus::new(sender.clone())));
    let surface = SvgFileSurface::new(&config.display.output_path, config.display.initially_enabled);

    let mut controller = Controller::with_config(config, Arc::clone(&bus), surface)?;
    controller.initialize()?;

    let pins = HostPins {
        enable: controller.pin_name(PinSignal::Enable)
            .ok_or_else(|| anyhow!("enable pin not registered"))?
            .to_string(),
        layer_in: controller.pin_name(PinSignal::LayerIn)
            .ok_or_else(|| anyhow!("layer.in pin not registered"))?
            .to_string(),
    };

    if let Some(file) = file {
        sender.notifier().notify(file)?;
    }

    let host = tokio::spawn(read_host_commands(bus, sender, pins));
    controller.run(receiver).await?;
    host.await??;

    Ok(())
}

// @enum: One line of host input
#[derive(Debug, PartialEq)]
enum HostCommand {
    Load(PathBuf),
    Layer(i32),
    Enable(bool),
    Status,
    Quit,
}

fn parse_host_command(line: &str) -> Result<Option<HostCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    let command = match word {
        "load" if !rest.is_empty() => HostCommand::Load(PathBuf::from(rest)),
        "layer" => HostCommand::Layer(rest.parse().map_err(|_| anyhow!("Invalid layer index: {:?}", rest))?),
        "enable" => match rest {
            "1" | "true" | "on" => HostCommand::Enable(true),
            "0" | "false" | "off" => HostCommand::Enable(false),
            _ => return Err(anyhow!("Invalid enable value: {:?}", rest)),
        },
        "status" => HostCommand::Status,
        "quit" | "exit" => HostCommand::Quit,
        _ => return Err(anyhow!("Unknown command: {}", line)),
    };

    Ok(Some(command))
}

// @stops: The controller loop once stdin ends, even on a read error
async fn read_host_commands(bus: Arc<Mutex<SignalBus>>, sender: EventSender, pins: HostPins) -> Result<()> {
    let result = drive_from_stdin(&bus, &sender, &pins).await;
    sender.send(SlicerEvent::Shutdown)?;
    result
}

async fn drive_from_stdin(bus: &Mutex<SignalBus>, sender: &EventSender, pins: &HostPins) -> Result<()> {
    let notifier = sender.notifier();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let command = match parse_host_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        let result = match command {
            HostCommand::Load(path) => notifier.notify(path).map_err(anyhow::Error::from),
            HostCommand::Layer(index) => bus.lock()
                .drive(&pins.layer_in, PinValue::S32(index))
                .map(|_| ())
                .map_err(anyhow::Error::from),
            HostCommand::Enable(enabled) => bus.lock()
                .drive(&pins.enable, PinValue::Bit(enabled))
                .map(|_| ())
                .map_err(anyhow::Error::from),
            HostCommand::Status => {
                let bus = bus.lock();
                for name in bus.pin_names() {
                    if let Some(value) = bus.value(&name) {
                        println!("{} = {}", name, value);
                    }
                }
                Ok(())
            }
            HostCommand::Quit => break,
        };

        if let Err(e) = result {
            warn!("{}", e);
        }
    }

    Ok(())
}
