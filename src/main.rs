use std::io::stdout;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use crossterm::event::KeyEventKind;
use handlescope::app::{App, AppContext};
use handlescope::config::{self, load_config, load_config_from_path};
use handlescope::dump;
use handlescope::event::{Event, EventHandler};
use handlescope::logging::init_file_logging;
use handlescope::system::directory::{ProcessDirectory, SysinfoSource};
use handlescope::system::sampler::SystemSampler;
use handlescope::ui;

#[derive(Parser)]
#[command(
    name = "handlescope",
    about = "Watch handle counts and memory of GUI processes"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling interval for the selected process, in milliseconds
    #[arg(long)]
    scan_interval: Option<u64>,

    /// Process list refresh interval, in milliseconds
    #[arg(long)]
    refresh_rate: Option<u64>,

    /// Theme: dark, light, mono
    #[arg(long)]
    theme: Option<String>,

    /// Also list processes without a main window
    #[arg(long, default_value_t = false)]
    all: bool,

    /// Print one JSON capture of all listed processes and exit.
    #[arg(long, default_value_t = false)]
    dump: bool,

    /// Write tracing output to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Maximum tracing level for --log-file.
    #[arg(long, default_value = "info")]
    log_level: tracing::Level,

    /// Write --log-file as JSON lines.
    #[arg(long, default_value_t = false)]
    log_json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        init_file_logging(path, cli.log_level, cli.log_json)?;
    }
    let config = load_config_for_cli(&cli);
    tracing::info!(
        scan_interval_ms = config.general.scan_interval_ms,
        directory_refresh_ms = config.general.directory_refresh_ms,
        require_window = config.filter.require_window,
        "starting"
    );

    if cli.dump {
        return run_dump(&config);
    }

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, config).await;

    ratatui::restore();

    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, config: config::Config) -> Result<()> {
    let refresh_rate = Duration::from_millis(config.general.directory_refresh_ms.max(1));
    let mut events = EventHandler::new(refresh_rate);

    // Scans finish on the blocking pool; they only ever post a message here.
    let repaint = events.sender();
    let mut app = App::new(
        AppContext::from_config(&config),
        SysinfoSource::new(),
        SystemSampler::new(),
        move || {
            let _ = repaint.send(Event::Repaint);
        },
    );
    app.start_scanning();

    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        if let Some(event) = events.next().await {
            let should_draw = match event {
                Event::Key(key) => {
                    if key.kind == KeyEventKind::Press {
                        let action = app.map_key(key);
                        app.dispatch(action);
                        true
                    } else {
                        false
                    }
                }
                Event::Tick => {
                    app.refresh_directory();
                    true
                }
                Event::Repaint | Event::Resize => true,
            };
            if should_draw {
                terminal.draw(|frame| ui::draw(frame, &app))?;
            }
        }
    }

    app.stop_scanning();
    tracing::info!("exiting");
    Ok(())
}

fn run_dump(config: &config::Config) -> Result<()> {
    let ctx = AppContext::from_config(config);
    let mut directory = ProcessDirectory::new(SysinfoSource::new(), ctx.filter, ctx.self_pid);
    let entries = dump::capture(&mut directory, &mut SystemSampler::new());
    dump::write_json(&entries, stdout().lock())
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(rate) = cli.scan_interval {
        config.general.scan_interval_ms = rate;
    }
    if let Some(rate) = cli.refresh_rate {
        config.general.directory_refresh_ms = rate;
    }
    if let Some(ref theme) = cli.theme {
        config.general.theme = theme.clone();
    }
    if cli.all {
        config.filter.require_window = false;
    }

    config
}
