#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    ffi::{OsStr, OsString},
    path::Path,
    process::{ExitStatus, Stdio},
    time::Duration,
};

use anyhow::{Context, Result};
use tokio::{
    io::AsyncReadExt,
    process::{Child, ChildStderr, ChildStdout, Command},
    time::timeout,
};

/// Kills a spawned child if it is dropped before being reaped, e.g. when the
/// wait times out.
struct KillOnDrop(Option<Child>);

impl KillOnDrop {
    /// Returns the guarded child.
    fn child_mut(&mut self) -> Result<&mut Child> {
        self.0.as_mut().context("child process already reaped")
    }

    /// Releases the child without killing it.
    fn release(mut self) {
        self.0 = None;
    }
}

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        if let Some(child) = self.0.as_mut() {
            let _ = child.start_kill();
        }
    }
}

/// Output of a finished subprocess.
#[derive(Debug)]
pub struct Collected {
    /// Exit status returned by the process.
    pub status: ExitStatus,
    /// Contents written to stdout.
    pub stdout: Vec<u8>,
    /// Contents written to stderr.
    pub stderr: Vec<u8>,
}

impl Collected {
    /// Stdout as trimmed, lossily decoded text.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).trim().to_string()
    }

    /// Stderr as trimmed, lossily decoded text.
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Reads a pipe to the end on its own task.
fn drain<R>(pipe: R, label: &'static str) -> tokio::task::JoinHandle<Result<Vec<u8>>>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut pipe = pipe;
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf)
            .await
            .with_context(|| format!("failed to read {label}"))?;
        Ok(buf)
    })
}

/// Spawns `program` with stdin closed, and collects its exit status and
/// output.
///
/// * `cwd`: working directory, or the current one
/// * `deadline`: kill the process and fail if it runs longer than this
pub async fn run_collect(
    program: impl AsRef<OsStr>,
    args: &[OsString],
    cwd: Option<&Path>,
    deadline: Option<Duration>,
) -> Result<Collected> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let mut guard = KillOnDrop(Some(cmd.spawn().context("failed to spawn process")?));
    let stdout: ChildStdout = guard
        .child_mut()?
        .stdout
        .take()
        .context("missing stdout pipe")?;
    let stderr: ChildStderr = guard
        .child_mut()?
        .stderr
        .take()
        .context("missing stderr pipe")?;
    let out_task = drain(stdout, "stdout");
    let err_task = drain(stderr, "stderr");

    let wait = async move {
        let mut guard = guard;
        let status = guard
            .child_mut()?
            .wait()
            .await
            .context("failed to wait on process")?;
        let stdout = out_task.await.context("stdout task join error")??;
        let stderr = err_task.await.context("stderr task join error")??;
        guard.release();
        Ok(Collected {
            status,
            stdout,
            stderr,
        })
    };

    match deadline {
        Some(limit) => timeout(limit, wait)
            .await
            .context("subprocess timed out")?,
        None => wait.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collects_output_of_a_missing_program_as_error() {
        let err = run_collect("definitely-not-a-real-binary-xyz", &[], None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to spawn process"));
    }
}
