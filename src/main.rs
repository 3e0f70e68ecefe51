//! plipy: translate a PL/I procedure to Python, optionally run or view it

use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use plipy::config::CredentialSource;
use plipy::exec::DEFAULT_PYTHON;
use plipy::ui::App;
use plipy::{CredentialResolver, Executor, Translator, TranslatorConfig};

const LOG_FILE: &str = "plipy.log";

/// Translate a PL/I subset procedure into a Python program.
#[derive(clap::Parser)]
#[command(name = "plipy", version, about)]
struct Cli {
    /// PL/I source file.
    file: PathBuf,

    /// Write the generated program here instead of stdout.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Run the generated program with an external Python interpreter.
    #[arg(long)]
    run: bool,

    /// Show source, generated code and output side by side.
    #[arg(long)]
    tui: bool,

    /// Database credentials file (host=, user=, password=, database=).
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Python interpreter used by --run.
    #[arg(long, default_value = DEFAULT_PYTHON)]
    python: PathBuf,

    /// Spaces per indentation level in the generated code.
    #[arg(long)]
    indent: Option<usize>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli) {
        eprintln!("Error: failed to set up logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// stderr normally; a log file while the TUI owns the terminal
fn init_tracing(cli: &Cli) -> io::Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else if cli.verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };

    if cli.tui {
        let log_file = fs::File::create(LOG_FILE)?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(log_file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let source = fs::read_to_string(&cli.file)
        .map_err(|e| format!("cannot read '{}': {}", cli.file.display(), e))?;

    let mut config = TranslatorConfig::new();
    if let Some(width) = cli.indent {
        config = config.with_indent_width(width)?;
    }

    let resolver = match &cli.credentials {
        Some(path) => CredentialResolver::with_file(path),
        None => CredentialResolver::new(),
    };
    match resolver.resolve()? {
        Some((credentials, origin)) => {
            let from = match origin {
                CredentialSource::File => "file",
                CredentialSource::Environment => "environment",
            };
            tracing::info!(from, "embedding database credentials");
            config = config.with_credentials(credentials);
        }
        None => tracing::debug!("no credentials configured; generated code reads PLIPY_DB_*"),
    }

    let translator = Translator::new(config);
    tracing::debug!(
        file = %cli.file.display(),
        indent = translator.config().indent_width,
        embedded_credentials = translator.config().credentials.is_some(),
        "translating"
    );
    let translation = translator.translate(&source);
    let executor = cli.run.then(|| Executor::opt_in(&cli.python));

    if cli.tui {
        return run_tui(source, translation, executor).map(|()| ExitCode::SUCCESS);
    }

    let program = translation?;
    for diagnostic in &program.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    match &cli.out {
        Some(path) => fs::write(path, &program.code)
            .map_err(|e| format!("cannot write '{}': {}", path.display(), e))?,
        // Running the program prints its own output; keep stdout for it
        None if executor.is_some() => {}
        None => print!("{}", program.code),
    }

    let Some(mut executor) = executor else {
        return Ok(ExitCode::SUCCESS);
    };

    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut input = String::new();
        stdin.lock().read_to_string(&mut input)?;
        executor = executor.with_stdin(input);
    }

    let output = executor.execute(&program)?;
    print!("{}", output.stdout);
    eprint!("{}", output.stderr);

    Ok(match output.status {
        Some(0) => ExitCode::SUCCESS,
        Some(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        None => ExitCode::FAILURE,
    })
}

fn run_tui(
    source: String,
    translation: Result<plipy::GeneratedProgram, plipy::TranslateError>,
    executor: Option<Executor>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Restore the terminal before the default hook prints the panic
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(source, translation, executor);
    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}
