//! Gnosis terminal - play the number soup and math quizzes in a shell.
//!
//! Earned stars are deposited into `stars.json` in the data directory:
//! - Linux: ~/.local/share/gnosis/
//! - Windows: %APPDATA%\gnosis\
//! - MacOS: ~/Library/Application Support/gnosis/
//!
//! `GNOSIS_DATA_DIR` overrides the location, `GNOSIS_SEED` fixes the boards
//! and `GNOSIS_LOG` sets the log filter (logs go to stderr).

use std::io::{self, BufRead, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use gnosis::stars::JsonFileStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod game;
mod paths;
mod settings;

use game::{parse_command, App};
use paths::AppPaths;
use settings::Settings;

fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5EED)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    let filter = EnvFilter::try_from_env("GNOSIS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let paths = AppPaths::new()?;
    let settings = Settings::load(&paths)?;
    let store = JsonFileStore::open(paths.stars_file())?;
    info!("Persistence initialized ({:?})", paths.data_dir());

    let seed = settings.seed.unwrap_or_else(seed_from_clock);
    info!(seed, "boards seeded");

    let mut app = App::new(settings, seed, Box::new(store));

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", app.render())?;

    for line in stdin.lock().lines() {
        let line = line?;
        let cmd = match parse_command(&line) {
            Ok(cmd) => cmd,
            Err(msg) => {
                writeln!(stdout, "{msg}")?;
                continue;
            }
        };

        let reply = app.handle(cmd);
        writeln!(stdout, "{}", reply.text)?;
        stdout.flush()?;
        if reply.quit {
            return Ok(());
        }
    }

    // EOF: keep whatever was earned.
    let reply = app.handle(game::Command::Quit);
    writeln!(stdout, "{}", reply.text)?;
    Ok(())
}
