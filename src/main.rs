use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use popmap::app::{App, Focus};
use popmap::config::{AreaMode, Config, Settings, ShareBasis, Source, DEFAULT_GEOMETRY_URL, DEFAULT_POPULATION_URL};
use popmap::report::{self, Format};
use popmap::selector::Selection;
use popmap::stats::ExactName;

/// Country statistics, map and population chart in the terminal.
#[derive(Parser)]
#[command(name = "popmap", version, about = "Terminal population dashboard")]
struct Args {
    /// Country boundaries: GeoJSON FeatureCollection with a `name` property (URL or path)
    #[arg(long, value_name = "SOURCE", default_value = DEFAULT_GEOMETRY_URL)]
    geometry: String,

    /// Population table: CSV with "Country/Territory" and "<year> Population" columns (URL or path)
    #[arg(long, value_name = "SOURCE", default_value = DEFAULT_POPULATION_URL)]
    population: String,

    /// Optional populated places GeoJSON used to place capitals (URL or path)
    #[arg(long, value_name = "SOURCE")]
    cities: Option<String>,

    /// How country areas are measured
    #[arg(long, value_enum, default_value_t = AreaMode::Native)]
    area: AreaMode,

    /// Denominator of the world population percentage
    #[arg(long, value_enum, default_value_t = ShareBasis::PercentageSum)]
    share_basis: ShareBasis,

    /// Country selected at startup
    #[arg(long)]
    country: Option<String>,

    /// Years selected at startup, comma separated (default: first two in the file)
    #[arg(long, value_delimiter = ',')]
    years: Vec<String>,

    /// Print the dashboard for --country and exit instead of starting the UI
    #[arg(long)]
    report: bool,

    /// Output format for --report
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log file for the interactive UI (report mode logs to stderr)
    #[arg(long, value_name = "PATH", default_value = "popmap.log")]
    log_file: PathBuf,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> Config {
        Config {
            geometry: Source::parse(&self.geometry),
            population: Source::parse(&self.population),
            cities: self.cities.as_deref().map(Source::parse),
            settings: Settings {
                area_mode: self.area,
                share_basis: self.share_basis,
            },
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = args.config();
    if !args.report {
        eprintln!("Loading {} and {} ...", config.geometry, config.population);
    }
    let tables = popmap::load(&config)?;

    let mut selection = Selection::initial(&tables.population);
    if let Some(country) = &args.country {
        selection.country = country.clone();
    }
    if !args.years.is_empty() {
        selection = Selection::new(selection.country, args.years.clone());
    }

    if args.report {
        let dashboard = popmap::build(&selection, &tables, &config.settings, &ExactName)?;
        println!("{}", report::render(&dashboard, args.format)?);
        return Ok(());
    }

    let mut terminal = ratatui::init();
    terminal.clear()?;
    execute!(std::io::stdout(), EnableMouseCapture)?;

    let result = run(&mut terminal, tables, config.settings, selection);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Logs go to a file while the terminal belongs to the UI
fn init_logging(args: &Args) -> Result<()> {
    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("popmap={}", level)));

    if args.report {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        let file = File::create(&args.log_file)
            .with_context(|| format!("cannot create log file {}", args.log_file.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
    Ok(())
}

fn run(terminal: &mut DefaultTerminal, tables: popmap::Tables, settings: Settings, selection: Selection) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(tables, settings, selection, size.width, size.height)?;

    loop {
        terminal.draw(|frame| popmap::ui::render(frame, &app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                // Only key presses, not releases
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key)?,
                Event::Mouse(mouse) => handle_mouse(&mut app, mouse),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    info!("session closed");
    Ok(())
}

/// Keys by focused pane. Recompute errors end the session.
fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    if app.searching {
        match key.code {
            KeyCode::Enter => app.finish_search(true)?,
            KeyCode::Esc => app.finish_search(false)?,
            KeyCode::Backspace => app.pop_search(),
            KeyCode::Char(c) => app.push_search(c),
            _ => {}
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Tab => app.focus_next(),
        KeyCode::BackTab => app.focus_prev(),
        _ => match app.focus {
            Focus::Countries => match key.code {
                KeyCode::Down | KeyCode::Char('j') => app.move_country(1)?,
                KeyCode::Up | KeyCode::Char('k') => app.move_country(-1)?,
                KeyCode::PageDown => app.move_country(10)?,
                KeyCode::PageUp => app.move_country(-10)?,
                KeyCode::Home | KeyCode::Char('g') => app.first_country()?,
                KeyCode::End | KeyCode::Char('G') => app.last_country()?,
                KeyCode::Char('/') => app.start_search(),
                _ => {}
            },
            Focus::Years => match key.code {
                KeyCode::Down | KeyCode::Char('j') => app.move_year_cursor(1),
                KeyCode::Up | KeyCode::Char('k') => app.move_year_cursor(-1),
                KeyCode::Char(' ') | KeyCode::Enter => app.toggle_year()?,
                _ => {}
            },
            Focus::Map => match key.code {
                KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
                KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
                KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
                KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),
                KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
                KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
                KeyCode::Char('r') | KeyCode::Char('0') => app.recenter(),
                KeyCode::Char('w') | KeyCode::Char('W') => app.map_renderer.toggle_world(),
                KeyCode::Char('L') => app.map_renderer.toggle_labels(),
                _ => {}
            },
        },
    }
    Ok(())
}

/// Scroll zooms at the pointer, left-drag pans
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        MouseEventKind::Down(MouseButton::Left) => app.start_drag(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.end_drag(),
        _ => {}
    }
}
