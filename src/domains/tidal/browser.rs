//! System browser launcher used by the login flow.

use std::io;
use std::process::{Command, Stdio};

use tracing::debug;

/// Open `url` in the default browser.
///
/// Returns as soon as the opener process is started; some openers only exit
/// when the browser closes. The opener's stdio is detached: under the stdio
/// transport anything it printed would corrupt the protocol stream.
pub async fn open(url: &str) -> io::Result<()> {
    launch(opener_command(url))
}

/// Start `command` detached and reap it on a blocking worker.
fn launch(mut command: Command) -> io::Result<()> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    tokio::task::spawn_blocking(move || match child.wait() {
        Ok(status) if !status.success() => debug!("Browser opener exited with {}", status),
        Ok(_) => {}
        Err(e) => debug!("Could not wait for browser opener: {}", e),
    });
    Ok(())
}

#[cfg(target_os = "macos")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("open");
    command.arg(url);
    command
}

#[cfg(target_os = "windows")]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("cmd");
    command.args(["/C", "start", "", url]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener_command(url: &str) -> Command {
    let mut command = Command::new("xdg-open");
    command.arg(url);
    command
}
