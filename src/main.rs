mod app;
mod event;
mod ui;

use std::fs::{self, File};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::widgets::{Block, Paragraph};
use tracing_subscriber::EnvFilter;

use spantask::config::Config;
use spantask::items::pool::{BUNDLED_PROCESSING_ITEMS, BUNDLED_TARGETS};
use spantask::items::{ItemPool, Material};
use spantask::session::script::{ScriptChain, standard_script};
use spantask::store::results_file::{self, ResultsFile};

use app::App;
use event::{AppEvent, EventHandler};
use ui::components::entry_line::EntryLine;
use ui::components::stimulus::StimulusPanel;
use ui::layout::ScreenLayout;
use ui::theme::Theme;

#[derive(Parser)]
#[command(name = "spantask", version, about = "Complex-span working memory task for the terminal")]
struct Cli {
    #[arg(
        required_unless_present_any = ["print_default_config", "list_themes"],
        help = "Configuration file (TOML)"
    )]
    config: Option<PathBuf>,

    #[arg(help = "Results file; defaults to <subject id>.tsv")]
    results_file: Option<PathBuf>,

    #[arg(short, long, help = "Subject id (letters and digits)")]
    subject: Option<String>,

    #[arg(short, long, help = "Do not ask before overwriting results or starting despite warnings")]
    yes: bool,

    #[arg(long, help = "Log file; defaults to <data dir>/spantask/spantask.log")]
    log_file: Option<PathBuf>,

    #[arg(short, long, help = "Theme name, overrides the configuration")]
    theme: Option<String>,

    #[arg(long, help = "Print the default configuration and exit")]
    print_default_config: bool,

    #[arg(long, help = "List the bundled themes and exit")]
    list_themes: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print!("{}", toml::to_string_pretty(&Config::default())?);
        return Ok(());
    }
    if cli.list_themes {
        for name in Theme::available_themes() {
            println!("{name}");
        }
        return Ok(());
    }
    let Some(config_path) = cli.config.as_deref() else {
        bail!("no configuration file given");
    };

    let log_path = init_logging(cli.log_file.as_deref())?;
    tracing::info!(config = %config_path.display(), log = %log_path.display(), "spantask starting");

    let config = Config::load(config_path)?;
    let processing_pool =
        ItemPool::load(config.processing_items_path().as_deref(), BUNDLED_PROCESSING_ITEMS)?;
    let processing_items = processing_pool.processing_items()?;
    let targets = ItemPool::load(config.target_items_path().as_deref(), BUNDLED_TARGETS)?;

    let warnings = config.validate(&processing_pool, &processing_items, &targets)?;
    for warning in &warnings {
        tracing::warn!(%warning, "configuration warning");
        eprintln!("Warning: {warning}");
    }
    if !warnings.is_empty() && !cli.yes && !confirm("Start anyway?")? {
        return Ok(());
    }

    let (subject, results_path) = choose_results_file(&cli)?;
    let results = ResultsFile::create(&results_path, &subject, &config)?;

    let mut rng = SmallRng::from_entropy();
    let material = Material::new(
        processing_items,
        &targets,
        config.pseudo_random_targets,
        SmallRng::from_rng(&mut rng)?,
    );
    let chain = ScriptChain::new(standard_script(&config, &mut rng), material);

    let theme_name = cli.theme.as_deref().unwrap_or(&config.theme);
    let theme = Theme::load(theme_name).unwrap_or_else(|| {
        tracing::warn!(theme = theme_name, "unknown theme, using default");
        Theme::default()
    });

    let mut app = App::new(chain, results, theme);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.hide_cursor()?;

    let events = EventHandler::new(Duration::from_millis(20));
    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    match result {
        Ok(()) if app.finished => {
            println!("Results written to {}", results_path.display());
            Ok(())
        }
        Ok(()) => {
            eprintln!("Run aborted; {} holds the settings only.", results_path.display());
            Ok(())
        }
        Err(err) => {
            tracing::error!("{err:?}");
            Err(err)
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    app.start()?;
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next(app.wait_time())? {
            AppEvent::Key(key) => app.handle_key(key)?,
            AppEvent::Tick | AppEvent::Resize => {}
        }
        app.tick()?;

        if app.should_quit {
            return Ok(());
        }
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    let layout = ScreenLayout::new(area);
    frame.render_widget(
        StimulusPanel::new(&app.host.screen, app.host.align, &app.theme),
        layout.stimulus,
    );
    frame.render_widget(EntryLine::new(&app.host.entry, &app.theme), layout.entry);

    let footer = Paragraph::new(Line::from(format!("  {}", app.footer_hint())))
        .style(Style::default().fg(colors.text_dim()).bg(colors.bg()));
    frame.render_widget(footer, layout.footer);
}

fn init_logging(path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("spantask")
            .join("spantask.log"),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;

    // The terminal belongs to the task, so logs only go to the file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spantask=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(path)
}

/// Settles on a subject id and a results file that may be (over)written.
fn choose_results_file(cli: &Cli) -> Result<(String, PathBuf)> {
    let (mut subject, mut path) = match (&cli.results_file, &cli.subject) {
        (Some(path), _) => (results_file::subject_from_path(path), path.clone()),
        (None, Some(subject)) => {
            let subject = results_file::parse_subject_id(subject)?;
            let path = results_file::path_for_subject(&subject);
            (subject, path)
        }
        (None, None) => {
            let subject = ask_subject_id()?;
            let path = results_file::path_for_subject(&subject);
            (subject, path)
        }
    };

    while path.exists() && !cli.yes {
        println!("A results file for this subject id already exists: {}", path.display());
        if confirm("Do you want to overwrite it?")? {
            break;
        }
        subject = ask_subject_id()?;
        path = results_file::path_for_subject(&subject);
    }
    Ok((subject, path))
}

fn ask_subject_id() -> Result<String> {
    loop {
        let answer = prompt("Please enter a subject id consisting of letters and digits:")?;
        match results_file::parse_subject_id(&answer) {
            Ok(subject) => return Ok(subject),
            Err(err) => eprintln!("{err}"),
        }
    }
}

fn confirm(question: &str) -> Result<bool> {
    loop {
        match prompt(&format!("{question} (y/n)"))?.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => {}
        }
    }
}

fn prompt(question: &str) -> Result<String> {
    print!("{question} ");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("standard input closed");
    }
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_is_required_unless_printing_defaults() {
        assert!(Cli::try_parse_from(["spantask"]).is_err());
        let cli = Cli::try_parse_from(["spantask", "--print-default-config"]).unwrap();
        assert!(cli.print_default_config);

        let cli = Cli::try_parse_from(["spantask", "run.toml", "p01.tsv", "--yes"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("run.toml")));
        assert_eq!(cli.results_file.as_deref(), Some(Path::new("p01.tsv")));
        assert!(cli.yes);
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.levels, Config::default().levels);
        assert_eq!(parsed.responses, Config::default().responses);
    }
}
