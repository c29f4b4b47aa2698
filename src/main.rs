use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{fs, io, path::PathBuf, time::{Duration, Instant}};
use nodistractions::{
    app::{AppState, Status},
    config::{self, Config},
    store::SessionLog,
    timer::FocusTimer,
    ui,
};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

// ============================================================================
// Type Aliases & Constants
// ============================================================================

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
const TICK_RATE: Duration = Duration::from_millis(50);
const LOG_ENV: &str = "NODISTRACTIONS_LOG";

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Clone)]
#[command(author, version, about = "🎯 nodistractions - focus timer with a plain text work log")]
struct Args {
    /// Work log file (default: work_log.txt)
    #[arg(short, long)]
    log: Option<PathBuf>,
    /// Config file (default: ./nodistractions/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Disable the desktop notification on save
    #[arg(long)]
    no_notify: bool,
    /// Print the stored sessions and exit
    #[arg(long)]
    list: bool,
}

// ============================================================================
// Startup
// ============================================================================

fn init_logging() -> Option<WorkerGuard> {
    let dir = PathBuf::from(".").join(config::APP_DIR);
    fs::create_dir_all(&dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, "nodistractions.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

fn load_config(args: &Args) -> Config {
    let path = args.config.clone().unwrap_or_else(|| config::get_path("config.json"));
    let mut config = match config::load(&path) {
        Ok(Some(config)) => config,
        Ok(None) => {
            let config = Config::default();
            if let Err(err) = config::save(&path, &config) {
                warn!(error = %err, path = %path.display(), "could not write default config");
            }
            config
        }
        Err(err) => {
            warn!(error = %err, path = %path.display(), "using default config");
            Config::default()
        }
    };

    // CLI overrides
    if let Some(log) = &args.log { config.log_path = log.clone(); }
    if args.no_notify { config.notifications = false; }
    config
}

fn print_sessions(log: &SessionLog) {
    if log.is_empty() {
        println!("No sessions in {}", log.path().display());
        return;
    }
    for s in log.sessions() {
        println!("{}  ({})", s.name, s.subtitle());
        if !s.description.is_empty() {
            println!("    {}", s.description);
        }
    }
    println!("{} sessions • {:.1} min total", log.len(), log.total_minutes());
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging();
    let config = load_config(&args);

    let (log, problem) = match SessionLog::open(config.log_path.clone()) {
        Ok(log) => (log, None),
        Err(err) => {
            warn!(error = %err, "starting with an empty session list");
            let problem = err.to_string();
            (SessionLog::new(config.log_path.clone()), Some(problem))
        }
    };

    if args.list {
        print_sessions(&log);
        return Ok(());
    }

    let mut app = AppState::new(FocusTimer::new(config.tick()), log, config.notifications);
    if let Some(problem) = problem {
        app.status = Status::Problem(problem);
    }
    info!(log = %config.log_path.display(), "starting");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    info!("exiting");
    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::render_ui(f, app))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_input(key) {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            app.on_tick(Instant::now());
            last_tick = Instant::now();
        }
    }
}
