//! Local execution of test commands under `sh -c`.
use crate::error::{LaunchError, LaunchResult};
use crate::launcher::TestInvocation;
use std::process::{Command, ExitStatus};

/// Run the invocation through the shell found on `PATH`, exporting the given
/// cluster context, and hand back the raw exit status.
pub fn run_invocation(invocation: &TestInvocation, context: &[(String, String)]) -> LaunchResult<i32> {
    let shell = which::which("sh")
        .map_err(|err| LaunchError::TestExecution(format!("locate sh on PATH: {err}")))?;
    let command_line = invocation.command_line();
    tracing::info!(command = %command_line, "running test command");

    let status = Command::new(&shell)
        .arg("-c")
        .arg(&command_line)
        .envs(context.iter().map(|(key, value)| (key.as_str(), value.as_str())))
        .status()
        .map_err(|err| {
            LaunchError::TestExecution(format!("spawn {}: {err}", shell.display()))
        })?;

    let code = exit_code(status);
    tracing::info!(code, "test command finished");
    Ok(code)
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> i32 {
    status.code().unwrap_or(1)
}
