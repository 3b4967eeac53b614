mod app;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use village_nird::config::{Config, DEFAULT_CONFIG_FILE};
use village_nird::content::load_content;
use village_nird::Session;

use app::{App, GameState};
use ui::draw_ui;

#[derive(Parser, Debug)]
#[command(name = "village-nird", about = "Free the village from Big Tech, one choice at a time")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Where progress is saved (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Forget all saved progress and exit
    #[arg(long)]
    reset: bool,
}

fn init_tracing(config: &Config) -> Result<()> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.logging.file)
        .with_context(|| format!("opening log file {}", config.logging.file.display()))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir;
    }
    init_tracing(&config)?;
    info!(
        config = %cli.config.display(),
        data_dir = %config.storage.data_dir.display(),
        "starting village-nird"
    );

    let mut session = Session::open(&config.storage.data_dir);
    if cli.reset {
        session.reset();
        println!("Progress in {} has been reset.", config.storage.data_dir.display());
        return Ok(());
    }

    let scenarios_dir: &Path = &config.content.scenarios_dir;
    let content = load_content(scenarios_dir)
        .with_context(|| format!("loading scenarios from {}", scenarios_dir.display()))?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(content, session);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    result?;

    let achievements = app.session.achievements();
    println!(
        "\nThe village thanks you. {} badges, {} XP.\n",
        achievements.unlocked_badges().len(),
        achievements.total_xp()
    );
    Ok(())
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| draw_ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        // any key dismisses a badge notification first
        if app.session.achievements().recent_badge().is_some() {
            app.session.clear_recent_badge();
            continue;
        }

        match app.state {
            GameState::TitleScreen => match key.code {
                KeyCode::Down | KeyCode::Char('j') => {
                    app.menu_selection = app.menu_selection.next();
                }
                KeyCode::Up | KeyCode::Char('k') => {
                    app.menu_selection = app.menu_selection.prev();
                }
                KeyCode::Enter => {
                    if !app.select_menu() {
                        break;
                    }
                }
                KeyCode::Char('q') => break,
                _ => {}
            },
            GameState::Badges => app.back_to_title(),
            GameState::Summary => {
                if key.code == KeyCode::Enter {
                    app.back_to_title();
                }
            }
            GameState::Feedback => match key.code {
                KeyCode::Enter => app.continue_after_feedback(),
                KeyCode::PageDown => {
                    let lines = app.message.lines().count() as u16;
                    if app.message_scroll < lines.saturating_sub(5) {
                        app.message_scroll += 3;
                    }
                }
                KeyCode::PageUp => {
                    app.message_scroll = app.message_scroll.saturating_sub(3);
                }
                KeyCode::Esc => app.back_to_title(),
                _ => {}
            },
            GameState::Teaser | GameState::Playing | GameState::Quiz => match key.code {
                KeyCode::Down | KeyCode::Char('j') => app.cursor_down(),
                KeyCode::Up | KeyCode::Char('k') => app.cursor_up(),
                KeyCode::Enter => app.confirm(),
                KeyCode::Esc => app.back_to_title(),
                _ => {}
            },
        }
    }
    Ok(())
}
