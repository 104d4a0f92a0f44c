mod repl;

use std::path::{Path, PathBuf};

use cardstack::stack::Stack;
use cardstack::store::FileStore;
use cardstack::Engine;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cardstack")]
#[command(about = "A message box for stacks of cards")]
#[command(version)]
struct Cli {
    /// File of message-box lines to run, one per line
    script: Option<PathBuf>,

    /// Run a message-box line (may be repeated)
    #[arg(short = 'e', long = "exec")]
    exec: Vec<String>,

    /// Load the stack definition from a JSON file
    #[arg(long)]
    stack: Option<PathBuf>,

    /// Directory for saved state (interactive default: ~/.cardstack)
    #[arg(long, env = "CARDSTACK_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Neither restore nor save state
    #[arg(long)]
    no_save: bool,

    /// Diagnostic verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stack = match &cli.stack {
        Some(path) => load_stack(path),
        None => Stack::builtin(),
    };

    let interactive = cli.exec.is_empty() && cli.script.is_none();
    let state_dir = if cli.no_save {
        None
    } else if interactive {
        cli.state_dir.clone().or_else(FileStore::default_dir)
    } else {
        cli.state_dir.clone()
    };
    let mut engine = match state_dir {
        Some(dir) => Engine::with_store(stack, Box::new(FileStore::new(dir))),
        None => Engine::new(stack),
    };

    if !cli.exec.is_empty() {
        for line in &cli.exec {
            println!("{}", engine.execute(line));
        }
    } else if let Some(path) = &cli.script {
        match std::fs::read_to_string(path) {
            Ok(source) => run_script(&source, &mut engine),
            Err(e) => {
                eprintln!("cardstack: cannot read {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    } else {
        repl::run(&mut engine);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env("CARDSTACK_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_stack(path: &Path) -> Stack {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("cardstack: cannot read {}: {}", path.display(), e);
            std::process::exit(1);
        }
    };
    match Stack::from_json(&source) {
        Ok(stack) => stack,
        Err(e) => {
            eprintln!("cardstack: {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

/// Blank lines and `--` comments are skipped.
fn run_script(source: &str, engine: &mut Engine) {
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        println!("{}", engine.execute(line));
    }
}
