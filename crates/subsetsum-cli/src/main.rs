mod app;
mod input;
mod render;
mod theme;

use anyhow::{bail, Context, Result};
use app::{App, AppAction};
use clap::{ArgAction, Parser};
use crossterm::{
    event::{self, Event},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use render::Renderer;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use subsetsum_core::{
    CancelToken, GeneratorConfig, InstanceGenerator, Mode, Problem, SessionState, Solver,
    SolverConfig,
};
use theme::Theme;
use tracing::{debug, Level};

/// Find subsets of a list of numbers that add up to a target
#[derive(Parser, Debug)]
#[command(name = "subsetsum", version, about)]
struct Cli {
    /// File of positive integers separated by whitespace or commas (stdin if omitted)
    file: Option<PathBuf>,

    /// Sum the chosen numbers must reach (defaults to the planted sum with --generate)
    #[arg(short, long)]
    target: Option<f64>,

    /// Smallest number of values in a combination
    #[arg(long, default_value_t = 1)]
    min: usize,

    /// Largest number of values in a combination (defaults to all of them)
    #[arg(long)]
    max: Option<usize>,

    /// Enumerate every combination instead of stopping at the first
    #[arg(short, long)]
    all: bool,

    /// Stop enumerating after this many combinations
    #[arg(long)]
    max_results: Option<usize>,

    /// Search nodes per batch between progress updates
    #[arg(long)]
    budget: Option<u64>,

    /// Cancel the search after this many seconds
    #[arg(long, value_name = "SECONDS")]
    time_limit: Option<f64>,

    /// Never use meet-in-the-middle
    #[arg(long)]
    dfs_only: bool,

    /// Search a random instance of SIZE values instead of reading input
    #[arg(long, value_name = "SIZE")]
    generate: Option<usize>,

    /// Seed for --generate
    #[arg(long, requires = "generate")]
    seed: Option<u64>,

    /// Print JSON lines instead of text
    #[arg(long)]
    json: bool,

    /// Use colors for light terminal backgrounds
    #[arg(long)]
    light: bool,

    /// Log engine decisions to stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn solver_config(&self, interactive: bool) -> SolverConfig {
        let mut config = if interactive {
            SolverConfig::interactive()
        } else {
            SolverConfig::default()
        };
        if self.dfs_only {
            config.mitm_threshold = SolverConfig::dfs_only().mitm_threshold;
        }
        if let Some(budget) = self.budget {
            config.node_budget = budget;
        }
        if let Some(max_results) = self.max_results {
            config.max_results = max_results;
        }
        config
    }
}

/// Keeps the terminal in raw mode so single keys arrive without Enter
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let (numbers, target) = load_input(&cli)?;
    let max = cli.max.unwrap_or(numbers.len());
    // Values are checked first, then the count range, then the target
    let problem = Problem::from_host(&numbers, target, cli.min, max).context("invalid input")?;

    let found = if cli.all {
        run_all(&cli, problem)?
    } else {
        run_one(&cli, problem)?
    };

    Ok(if found { ExitCode::SUCCESS } else { ExitCode::from(1) })
}

/// Numbers and the raw target, read from input or generated
fn load_input(cli: &Cli) -> Result<(Vec<f64>, f64)> {
    if let Some(size) = cli.generate {
        let config = GeneratorConfig {
            size,
            ..GeneratorConfig::default()
        };
        let mut generator = match cli.seed {
            Some(seed) => InstanceGenerator::with_seed(seed),
            None => InstanceGenerator::new(),
        }
        .with_config(config);
        let instance = generator.generate();
        debug!(size, target = instance.target, planted = ?instance.planted, "generated instance");

        let target = cli.target.unwrap_or(instance.target as f64);
        return Ok((instance.numbers(), target));
    }

    let Some(target) = cli.target else {
        bail!("--target is required unless --generate is given");
    };
    let numbers = input::read_numbers(cli.file.as_deref())?;
    Ok((numbers, target))
}

/// Raise `cancel` after `--time-limit` seconds, if one was given
fn start_timer(cli: &Cli, cancel: CancelToken) -> Result<()> {
    if let Some(seconds) = cli.time_limit {
        let limit = Duration::try_from_secs_f64(seconds).context("invalid --time-limit")?;
        thread::spawn(move || {
            thread::sleep(limit);
            debug!(?limit, "time limit reached");
            cancel.cancel();
        });
    }
    Ok(())
}

fn run_one(cli: &Cli, problem: Problem) -> Result<bool> {
    let solver = Solver::with_config(cli.solver_config(false));
    debug!(strategy = %solver.strategy(Mode::FindOne, problem.len()), "find_one");
    let cancel = CancelToken::new();
    start_timer(cli, cancel.clone())?;
    let result = solver.find_one_with(&problem, &cancel);

    let mut renderer = Renderer::new(theme(cli), cli.json, false, false);
    renderer.find_one(&mut io::stdout().lock(), &result)?;
    Ok(result.is_found())
}

fn run_all(cli: &Cli, problem: Problem) -> Result<bool> {
    // Keys are only read when nothing else is using the terminal's input
    let interactive = io::stderr().is_terminal() && io::stdin().is_terminal() && !cli.json;
    let config = cli.solver_config(interactive);
    let mut app = App::new(problem, &config)?;
    start_timer(cli, app.cancel_token())?;

    let _raw = if interactive {
        Some(RawModeGuard::enable()?)
    } else {
        None
    };
    let raw_terminal = interactive && io::stdout().is_terminal();
    let mut renderer = Renderer::new(theme(cli), cli.json, interactive, raw_terminal);
    let mut out = io::stdout().lock();
    let mut err = io::stderr();

    loop {
        if interactive {
            while event::poll(Duration::ZERO)? {
                if let Event::Key(key) = event::read()? {
                    if app.handle_key(key) == AppAction::Cancel {
                        break;
                    }
                }
            }
        }

        let record = app.step()?;
        renderer.batch(&mut out, &mut err, &record)?;
        if record.finished {
            break;
        }
    }

    let summary = app.summary();
    renderer.summary(&mut out, &mut err, &summary)?;
    if summary.state == SessionState::Cancelled {
        debug!(found = summary.total_found, "enumeration cancelled");
    }
    Ok(summary.total_found > 0)
}

fn theme(cli: &Cli) -> Theme {
    if cli.light {
        Theme::light()
    } else {
        Theme::dark()
    }
}
