//! @ai:module:intent Spawn a rendered command, capture its output and enforce a wall-clock limit
//! @ai:module:layer infrastructure
//! @ai:module:public_api execute, ProcessOutput
//! @ai:module:stateless true

use crate::template::CommandLine;
use std::fs::File;
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// @ai:intent Captured result of one child process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
}

impl ProcessOutput {
    /// @ai:intent Exited on its own with status zero
    /// @ai:effects pure
    pub fn success(&self) -> bool {
        !self.timed_out && self.status.success()
    }
}

/// @ai:intent Translate a CommandLine into a std Command with piped output
/// @ai:effects fs:read
fn build_command(command: &CommandLine, own_group: bool) -> std::io::Result<Command> {
    let mut cmd = if command.shell {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(&command.program);
        cmd
    } else {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        cmd
    };

    let stdin = match &command.stdin {
        Some(path) => Stdio::from(File::open(path)?),
        None => Stdio::null(),
    };

    cmd.stdin(stdin).stdout(Stdio::piped()).stderr(Stdio::piped());

    // A timed child leads its own process group so the whole tree can be killed.
    if own_group {
        lead_own_group(&mut cmd);
    }
    Ok(cmd)
}

#[cfg(unix)]
fn lead_own_group(cmd: &mut Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

#[cfg(not(unix))]
fn lead_own_group(_cmd: &mut Command) {}

/// @ai:intent Run a command to completion, killing it once `timeout` elapses
/// @ai:pre the redirected stdin file, if any, is readable
/// @ai:effects io
pub fn execute(command: &CommandLine, timeout: Option<Duration>) -> std::io::Result<ProcessOutput> {
    let mut child = build_command(command, timeout.is_some())?.spawn()?;
    tracing::debug!("Spawned `{}` (pid {})", command, child.id());

    let Some(limit) = timeout else {
        let output = child.wait_with_output()?;
        return Ok(ProcessOutput {
            status: output.status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            timed_out: false,
        });
    };

    // Drain both pipes while polling, otherwise a chatty child blocks on a full pipe.
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let (status, timed_out) = wait_with_deadline(&mut child, limit)?;

    Ok(ProcessOutput {
        status,
        stdout: join_reader(stdout)?,
        stderr: join_reader(stderr)?,
        timed_out,
    })
}

fn spawn_reader<R: Read + Send + 'static>(
    pipe: Option<R>,
) -> Option<JoinHandle<std::io::Result<Vec<u8>>>> {
    pipe.map(|mut reader| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            reader.read_to_end(&mut buf)?;
            Ok(buf)
        })
    })
}

fn join_reader(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> std::io::Result<String> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| std::io::Error::other("output reader thread panicked"))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// @ai:intent Poll the child until it exits or the deadline passes
/// @ai:post the child is reaped on every path, including errors
/// @ai:effects io
fn wait_with_deadline(child: &mut Child, limit: Duration) -> std::io::Result<(ExitStatus, bool)> {
    let deadline = Instant::now() + limit;

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((status, false)),
            Ok(None) => {}
            Err(e) => {
                kill_tree(child);
                let _ = child.wait();
                return Err(e);
            }
        }
        if Instant::now() >= deadline {
            tracing::debug!("Killing process group {} after {:?}", child.id(), limit);
            // The leader is not reaped yet, so its group id cannot have been reused.
            kill_tree(child);
            let status = child.wait()?;
            return Ok((status, true));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// @ai:intent Kill the child and everything it started in its process group
/// @ai:pre the child was spawned as a process group leader and is not yet reaped
/// @ai:effects io
#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let pgid = Pid::from_raw(child.id() as i32);
    if let Err(e) = killpg(pgid, Signal::SIGKILL) {
        tracing::debug!("killpg({}) failed: {}, killing the child only", pgid, e);
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}
