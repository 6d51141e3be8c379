// Forbid unwrap() in production code so a bad line never takes the shell down.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use std::io::{self, BufRead, Write};

use avltree::config::Config;
use avltree::session::{Command, Session};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "avltree=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Load configuration from environment variables
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Loaded configuration: snapshot_path={}, render_max_depth={}, render_width={}",
        config.snapshot_path.display(),
        config.render_max_depth,
        config.render_width
    );

    let load_on_start = config.load_on_start;
    let mut session = Session::new(config);

    if load_on_start {
        match session.execute(Command::Load(None)) {
            Ok(message) => println!("{message}"),
            // A missing or corrupt snapshot should not stop the shell.
            Err(e) => tracing::warn!("Starting with an empty tree: {e}"),
        }
    }

    if let Err(e) = run(&mut session) {
        tracing::error!("I/O error: {e}");
        std::process::exit(1);
    }
    tracing::info!("session ended with {} records", session.tree().len());
}

/// Read commands from stdin until `quit` or end of input.
fn run(session: &mut Session) -> io::Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("{}", session.render());
    println!("type 'help' for a list of commands");

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        let quit = command == Command::Quit;
        let mutation = command.is_mutation();

        match session.execute(command) {
            Ok(output) => {
                println!("{output}");
                if mutation {
                    println!("{}", session.render());
                }
            }
            Err(e) => println!("error: {e}"),
        }

        if quit {
            return Ok(());
        }
    }
}
