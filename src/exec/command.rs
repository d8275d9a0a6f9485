// src/exec/command.rs

use tokio::process::Command;

/// Build a shell command appropriate for the platform.
///
/// Command lines come from config templates and may contain pipes, quoting
/// or redirections, so they always go through the shell.
pub fn shell_command(cmd_line: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd_line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_line);
        c
    }
}
