use std::env;
use std::process::ExitCode;

use itertools::Itertools;
use tracing::{debug, error};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use morse_tree::morse::{Flags, Standard};

const DEFAULT_MESSAGE: &str = "What hath God wrought";

fn setup_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter),
        )
        .init();
}

pub fn main() -> ExitCode {
    setup_logging();

    let morse = match Standard::new() {
        Ok(morse) => morse,
        Err(err) => {
            error!(%err, "cannot build the code tree");
            return ExitCode::from(1);
        }
    };
    debug!("Morse tree:\n{}", morse.render());
    debug!(size = morse.tree().size(), "tree size");

    let message = env::args().skip(1).join(" ");
    let message = if message.is_empty() {
        DEFAULT_MESSAGE
    } else {
        &message
    };

    let encoded = match morse.encode(message, Flags::SEPARATORS | Flags::PROSIGNS) {
        Ok(encoded) => encoded,
        Err(err) => {
            error!(%err, "encoding failed");
            return ExitCode::from(2);
        }
    };
    println!("Encoded:\n{}", encoded);

    let decoded = morse.decode(&encoded, Flags::SEPARATORS);
    println!("Decoded: '{}'", decoded);

    ExitCode::SUCCESS
}
