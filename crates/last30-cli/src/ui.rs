use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{Cli, EmitFormat};

#[derive(Clone, Copy, Debug)]
pub struct UiPrefs {
    pub progress: bool,
    pub term_width: Option<usize>,
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(cli: &Cli) {
    // Spinner draws on stderr; the report owns stdout.
    let is_tty = std::io::stderr().is_terminal();
    let progress = is_tty && !cli.quiet && cli.emit != EmitFormat::Json;

    let term_width = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 40);

    let _ = UI_PREFS.set(UiPrefs {
        progress,
        term_width,
    });
}

#[must_use]
pub fn prefs() -> UiPrefs {
    *UI_PREFS.get().unwrap_or(&UiPrefs {
        progress: false,
        term_width: None,
    })
}
