use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use linewatch::logging::{self, LogTarget};
use linewatch::sim::{alert, seeded, Simulation, SimulationClock};
use linewatch::ui::{self, Theme};
use linewatch::{events, export, App, Settings};

#[derive(Parser, Debug)]
#[command(name = "linewatch")]
#[command(about = "LT feeder-line voltage monitoring simulator")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of simulated feeder lines
    #[arg(long)]
    lines: Option<usize>,

    /// Simulation tick interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Minimum safe voltage
    #[arg(long)]
    min: Option<f64>,

    /// Maximum safe voltage
    #[arg(long)]
    max: Option<f64>,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write log output to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Run headless and export the final state to a JSON file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Number of ticks to run before exporting
    #[arg(long, default_value = "100", requires = "export")]
    ticks: u64,
}

impl Args {
    /// Layer command-line overrides on top of loaded settings.
    fn apply(&self, settings: &mut Settings) {
        if let Some(lines) = self.lines {
            settings.line_count = lines;
        }
        if let Some(ms) = self.interval_ms {
            settings.tick_interval_ms = ms;
        }
        if let Some(min) = self.min {
            settings.threshold_min = min;
        }
        if let Some(max) = self.max {
            settings.threshold_max = max;
        }
        if self.seed.is_some() {
            settings.seed = self.seed;
        }
        if self.log_file.is_some() {
            settings.log_file = self.log_file.clone();
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(args.config.as_deref())?;
    args.apply(&mut settings);
    settings.validate()?;

    // Handle export mode (non-interactive)
    if let Some(ref export_path) = args.export {
        let target = match settings.log_file {
            Some(ref path) => LogTarget::File(path),
            None => LogTarget::Stderr,
        };
        logging::init(target)?;
        return export_headless(&settings, args.ticks, export_path);
    }

    let target = match settings.log_file {
        Some(ref path) => LogTarget::File(path),
        None => LogTarget::Disabled,
    };
    logging::init(target)?;
    run_tui(&settings)
}

/// Run the simulation without a terminal and write the final snapshot.
fn export_headless(settings: &Settings, ticks: u64, export_path: &std::path::Path) -> Result<()> {
    let snapshot = export::run_headless(settings, ticks)?;
    export::write_snapshot(&snapshot, export_path)?;
    println!("Exported simulation state to: {}", export_path.display());
    Ok(())
}

/// Start the clock and run the dashboard until the operator quits.
fn run_tui(settings: &Settings) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;

    let (alert_tx, alert_rx) = alert::channel();
    let simulation = Simulation::new(
        settings.simulation_params()?,
        Box::new(seeded(settings.seed)),
        alert_tx,
        Utc::now(),
    );
    let clock = {
        let _guard = rt.enter();
        SimulationClock::new(simulation)
            .interval(settings.tick_interval())
            .start()
    };
    info!(
        lines = settings.line_count,
        interval_ms = settings.tick_interval_ms,
        "simulation started"
    );

    // Detect the theme before raw mode takes over the terminal
    let theme = Theme::auto_detect();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(clock, alert_rx, settings.threshold_step, theme);
    app.reload_data();

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    rt.block_on(app.shutdown());
    info!("simulation stopped");

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse),
                // Redrawn on the next iteration
                Event::Resize(_, _) => {}
                _ => {}
            }
        }

        app.reload_data();
    }

    Ok(())
}
