use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use devices_core::{
    decode_devices_payload, html, DevicesLoader, Effect, FieldClassification, LoadState,
    LoaderEvent, SchemaStrategy, ViewModel,
};
use devices_fetch::{ClientConfig, DevicesController, HttpDeviceSource, LoadPhase};

mod table;

#[derive(Debug, Parser)]
#[command(name = "devices")]
#[command(about = "List devices from the sensors API as a table shaped by the data itself.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Fetch `GET {base}/devices` and print the device table.
    List(ListArgs),
    /// Render a `{"devices": [...]}` payload from a file or stdin without touching the network.
    Render(RenderArgs),
}

#[derive(Debug, Parser)]
struct ListArgs {
    /// API base URL. Defaults to `$DEVICES_API_BASE_URL`, then `http://localhost:5000/api`.
    #[arg(long)]
    base_url: Option<String>,

    /// Client request timeout in seconds (0 disables it). Defaults to `$DEVICES_API_TIMEOUT_SECS`.
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(Debug, Parser)]
struct RenderArgs {
    /// Payload file. If omitted, reads from stdin.
    #[arg(long)]
    input: Option<PathBuf>,

    #[command(flatten)]
    view: ViewArgs,
}

#[derive(Debug, Args)]
struct ViewArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// JSON file with the field classification (`identifierField`, `structuredFields`,
    /// `overrides`).
    #[arg(long)]
    classification: Option<PathBuf>,

    /// Build columns from every record's keys instead of the first record's only.
    #[arg(long)]
    union_columns: bool,

    /// Truncate text cells wider than this many columns (0 = no limit).
    #[arg(long, default_value_t = 60)]
    max_cell_width: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Html,
    Json,
}

impl ViewArgs {
    fn classification(&self) -> Result<FieldClassification> {
        let Some(path) = &self.classification else {
            return Ok(FieldClassification::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read classification {}", path.display()))?;
        FieldClassification::from_json_str(&text)
            .with_context(|| format!("parse classification {}", path.display()))
    }

    fn strategy(&self) -> SchemaStrategy {
        if self.union_columns {
            SchemaStrategy::Union
        } else {
            SchemaStrategy::FirstRecord
        }
    }

    fn print(&self, view: &ViewModel) -> Result<()> {
        let rendered = match self.format {
            OutputFormat::Text => table::render_text(view, self.max_cell_width),
            OutputFormat::Html => format!("{}\n", html::render_view(view)),
            OutputFormat::Json => format!("{}\n", serde_json::to_string_pretty(view)?),
        };
        write_stdout(&rendered)
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .try_init();
}

/// Write to stdout, treating a closed pipe (e.g. `devices list | head`) as success.
fn write_stdout(text: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("write stdout"),
    }
}

fn alert(message: &str) {
    eprintln!("error: {message}");
}

fn run_list(args: ListArgs) -> Result<bool> {
    let mut config = ClientConfig::from_env().context("load client config")?;
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(secs) = args.timeout_secs {
        config = config.with_timeout((secs > 0).then(|| Duration::from_secs(secs)));
    }
    tracing::debug!(url = %config.devices_url(), "listing devices");

    let classification = args.view.classification()?;
    let source = HttpDeviceSource::new(config).context("build http client")?;

    // Single cooperative thread, like the page this mirrors.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start tokio runtime")?;

    let (phase, view) = runtime.block_on(async {
        let controller = DevicesController::with_view_options(
            source,
            alert,
            classification,
            args.view.strategy(),
        );
        controller.activate();
        let phase = controller.settled().await;
        (phase, controller.view())
    });

    args.view.print(&view)?;
    Ok(phase == LoadPhase::Ready)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("read payload {}", path.display())),
        None => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .context("read payload from stdin")?;
            Ok(text)
        }
    }
}

fn run_render(args: RenderArgs) -> Result<bool> {
    let text = read_input(args.input.as_deref())?;
    let classification = args.view.classification()?;

    let mut loader = DevicesLoader::new();
    let Some(activation) = loader
        .handle(LoaderEvent::Activate)
        .into_iter()
        .find_map(|effect| match effect {
            Effect::StartFetch(activation) => Some(activation),
            _ => None,
        })
    else {
        anyhow::bail!("activation did not start a load");
    };

    let event = match decode_devices_payload(&text) {
        Ok(devices) => LoaderEvent::FetchSucceeded {
            activation,
            devices,
        },
        Err(err) => LoaderEvent::FetchFailed {
            activation,
            error: err.to_string(),
        },
    };
    for effect in loader.handle(event) {
        if let Effect::Notify(message) = effect {
            alert(&message);
        }
    }

    let ok = matches!(loader.state(), LoadState::Ready(_));
    args.view
        .print(&loader.view(&classification, args.view.strategy()))?;
    Ok(ok)
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::List(args) => run_list(args),
        Command::Render(args) => run_render(args),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
