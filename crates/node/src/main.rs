mod app;
mod config;
mod device;
mod tui;

use std::io;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use app::App;
use config::NodeConfig;
use device::Motion;

const FRAME_INTERVAL: Duration = Duration::from_millis(33);

#[derive(Parser, Debug)]
#[command(name = "tether-node")]
#[command(about = "One end of a bilateral haptic teleoperation link")]
pub struct Args {
    #[arg(short, long, default_value = "primary", help = "primary or secondary")]
    pub role: String,

    #[arg(short, long, default_value = "0.0.0.0:25000")]
    pub bind: String,

    #[arg(short, long, default_value = "127.0.0.1:25001")]
    pub peer: String,

    #[arg(long, default_value_t = tether::control::DEFAULT_HISTORY_CAPACITY)]
    pub history: usize,

    #[arg(short, long, default_value_t = tether::control::DEFAULT_PERCEPTUAL_K, help = "Weber fraction")]
    pub k: f64,

    #[arg(long, default_value_t = tether::control::DEFAULT_EPSILON)]
    pub epsilon: f64,

    #[arg(long, default_value_t = tether::control::DEFAULT_STRENGTH)]
    pub strength: f64,

    #[arg(long, default_value_t = tether::control::DEFAULT_CHARGE, allow_hyphen_values = true)]
    pub charge: f64,

    #[arg(short, long, default_value_t = tether::DEFAULT_TICK_RATE)]
    pub tick_rate: u32,

    #[arg(short, long, help = "Stop after this many seconds")]
    pub duration: Option<f64>,

    #[arg(long, help = "Write snd/rcv/err CSV event logs into this directory")]
    pub log_dir: Option<PathBuf>,

    #[arg(long, default_value_t = 0.0, help = "Outbound packet loss percentage (0-100)")]
    pub loss_percent: f32,

    #[arg(short, long, value_enum, default_value_t = Motion::Hold)]
    pub motion: Motion,

    #[arg(long)]
    pub headless: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = NodeConfig::from_args(&args)?;

    if args.headless {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let mut app = App::new(config)?;

    if args.headless {
        log::info!(
            "{} node on {} linked to {}",
            app.role(),
            app.local_addr(),
            app.peer_addr()
        );
        app.run();
        app.shutdown();
        log::info!("Node shut down");
    } else {
        let result = run_with_tui(&mut app);
        app.shutdown();
        result?;
    }

    Ok(())
}

fn run_with_tui(app: &mut App) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let running = app.running();
    let mut last_frame: Option<Instant> = None;

    while running.load(Ordering::SeqCst) {
        app.tick_once();

        // Input and drawing share the tick thread, so only service them at
        // frame rate.
        if last_frame.is_none_or(|t| t.elapsed() >= FRAME_INTERVAL) {
            last_frame = Some(Instant::now());

            while event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press
                        && matches!(key.code, KeyCode::Char('q') | KeyCode::Esc)
                    {
                        running.store(false, Ordering::SeqCst);
                    }
                }
            }

            let status = app.status();
            terminal.draw(|frame| {
                tui::render(frame, &status);
            })?;
        }

        app.wait_for_next_tick();
    }

    terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, cursor::Show)?;

    Ok(())
}
