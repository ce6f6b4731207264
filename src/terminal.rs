//! Raw-mode terminal setup for the quiz UI.

use std::io::{self, Stdout};
use std::panic;
use std::sync::Once;

use crossterm::{
    ExecutableCommand,
    cursor::{Hide, Show},
    event::{DisableBracketedPaste, EnableBracketedPaste},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

pub type QuizTerminal = Terminal<CrosstermBackend<Stdout>>;

static PANIC_HOOK: Once = Once::new();

/// Switch to the alternate screen in raw mode, with pastes delivered as
/// single events.
pub fn init() -> io::Result<QuizTerminal> {
    PANIC_HOOK.call_once(install_panic_hook);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout
        .execute(EnterAlternateScreen)?
        .execute(Hide)?
        .execute(EnableBracketedPaste)?;
    debug!("terminal initialized");

    Terminal::new(CrosstermBackend::new(stdout))
}

/// Leave the alternate screen. Safe to call when `init` failed halfway.
pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    io::stdout()
        .execute(DisableBracketedPaste)?
        .execute(Show)?
        .execute(LeaveAlternateScreen)?;
    debug!("terminal restored");
    Ok(())
}

/// Restore the terminal before the default hook prints the panic.
fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = stdout.execute(DisableBracketedPaste);
        let _ = stdout.execute(Show);
        let _ = stdout.execute(LeaveAlternateScreen);
        previous(info);
    }));
}
