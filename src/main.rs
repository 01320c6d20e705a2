use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use loadbars::config::{Settings, config_path};
use loadbars::{BarWidget, TerminalTarget, WaveformKind};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "loadbars")]
#[command(about = "Oscillating bar loading indicator")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Overrides for values from the config file
#[derive(clap::Args, Debug)]
struct WidgetArgs {
    /// Number of bars
    #[arg(long)]
    bars: Option<usize>,

    /// Waveform: sin or linear
    #[arg(long)]
    animate: Option<WaveformKind>,

    /// Render loop period in milliseconds
    #[arg(long)]
    interval: Option<u64>,
}

impl WidgetArgs {
    fn apply(&self, settings: &mut Settings) {
        if let Some(bars) = self.bars {
            settings.bar_count = bars;
        }
        if let Some(animate) = self.animate {
            settings.animate = animate;
        }
        if let Some(interval) = self.interval {
            settings.update_interval_ms = interval;
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Animate the bars in the terminal until Ctrl-C or the duration elapses
    Run {
        #[command(flatten)]
        widget: WidgetArgs,

        /// Hide the bars after this many seconds
        #[arg(long)]
        duration: Option<u64>,
    },

    /// Render one frame of the bars to a PNG file
    Snapshot {
        #[command(flatten)]
        widget: WidgetArgs,

        /// Output PNG path
        #[arg(long, default_value = "loadbars.png")]
        out: PathBuf,

        /// Elapsed animation time to capture, in milliseconds
        #[arg(long, default_value = "1000")]
        at: u64,

        /// Canvas width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Canvas height in pixels
        #[arg(long)]
        height: Option<u32>,
    },

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file location
    Path,
    /// Print the effective settings as TOML
    Show,
    /// Write default settings to the config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_terminal(settings: Settings, duration: Option<u64>) -> Result<()> {
    let close = async move {
        match duration {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                }
            }
            None => {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for Ctrl-C: {}", e);
                }
            }
        }
    };

    let poll = Duration::from_millis(settings.update_interval_ms.max(1));
    let widget = BarWidget::new(settings.container_config().on_close(close));
    widget.attach(TerminalTarget::new());
    widget.build()?;

    while widget.is_visible() {
        tokio::time::sleep(poll).await;
    }

    if let Some(e) = widget.last_error() {
        return Err(anyhow!("Animation failed: {}", e));
    }
    Ok(())
}

async fn snapshot(settings: Settings, at: u64, out: PathBuf) -> Result<()> {
    let widget = BarWidget::new(settings.canvas_config());
    widget.build()?;
    widget.render_at(Duration::from_millis(at))?;

    let canvas = widget
        .canvas()
        .ok_or_else(|| anyhow!("Widget has no canvas to export"))?;
    canvas
        .save_png(&out)
        .map_err(|e| anyhow!("Failed to save {}: {}", out.display(), e))?;

    println!(
        "Saved {}x{} frame at {}ms to {}",
        canvas.size().0,
        canvas.size().1,
        at,
        out.display()
    );
    Ok(())
}

fn config_command(action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => {
            let path = config_path().ok_or_else(|| anyhow!("Could not determine config directory"))?;
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            print!("{}", Settings::load().to_toml()?);
        }
        ConfigAction::Init { force } => {
            let path = config_path().ok_or_else(|| anyhow!("Could not determine config directory"))?;
            if path.exists() && !force {
                println!(
                    "Config already exists at {} (use --force to overwrite)",
                    path.display()
                );
                return Ok(());
            }
            let path = Settings::default().save()?;
            println!("Wrote default settings to {}", path.display());
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { widget, duration } => {
            let mut settings = Settings::load();
            widget.apply(&mut settings);
            run_terminal(settings, duration).await
        }
        Commands::Snapshot {
            widget,
            out,
            at,
            width,
            height,
        } => {
            let mut settings = Settings::load();
            widget.apply(&mut settings);
            if let Some(width) = width {
                settings.width = width;
            }
            if let Some(height) = height {
                settings.height = height;
            }
            snapshot(settings, at, out).await
        }
        Commands::Config { action } => config_command(action),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
