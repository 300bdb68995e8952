// UI layer: renders the command table as a numbered menu, reads one line
// and hands it to the dispatcher until the user picks "Exit".

use anyhow::{Context, Result};

use crate::api::StorageGateway;
use crate::auth::CredentialProvider;
use crate::commands::{dispatch, CommandContext, Flow, COMMANDS};
use crate::console::{Console, TerminalConsole};
use crate::session::Session;

/// Main interactive menu on the real terminal. Blocks until the user exits.
pub fn main_menu(gateway: &dyn StorageGateway, credentials: &dyn CredentialProvider) -> Result<()> {
    let mut console = TerminalConsole::new();
    let mut session = Session::new();
    run_session(&mut session, &mut console, gateway, credentials)
}

/// The menu loop over any console. Stays RUNNING whatever a command does;
/// only the exit command (or a console that can no longer be read) stops it.
pub fn run_session(
    session: &mut Session,
    console: &mut dyn Console,
    gateway: &dyn StorageGateway,
    credentials: &dyn CredentialProvider,
) -> Result<()> {
    let mut ctx = CommandContext {
        session,
        console,
        gateway,
        credentials,
    };
    loop {
        render_menu(&mut *ctx.console, &*ctx.session);
        let choice = ctx
            .console
            .read_line("Enter your choice")
            .context("Failed to read menu choice")?;
        let flow = dispatch(&choice, &mut ctx).context("Failed to read command input")?;
        if flow == Flow::Exit {
            break;
        }
    }
    Ok(())
}

/// Print the active selections followed by one line per command.
pub fn render_menu(console: &mut dyn Console, session: &Session) {
    console.show("");
    if let Some(container) = &session.active_container {
        console.show(&format!("Active container: {}", container.display_name));
    }
    if let Some(document) = &session.active_document {
        console.show(&format!("Active document: {}", document.name));
    }
    console.show("Select an option:");
    for command in COMMANDS {
        console.show(&format!("{}. {}", command.key, command.label));
    }
}
