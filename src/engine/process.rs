use anyhow::{anyhow, Context, Result};
use std::ffi::{OsStr, OsString};
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How a child process ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Exited {
        success: bool,
        code: Option<i32>,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
    TimedOut {
        after: Duration,
        stderr: Vec<u8>,
    },
    /// The process could not be started or waited on.
    InvokeError(String),
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Exited { success: true, .. })
    }

    pub fn stderr_lossy(&self) -> String {
        match self {
            ExitOutcome::Exited { stderr, .. } | ExitOutcome::TimedOut { stderr, .. } => {
                String::from_utf8_lossy(stderr).trim().to_string()
            }
            ExitOutcome::InvokeError(msg) => msg.clone(),
        }
    }
}

/// Spawns a program and waits for it, bounded by `timeout` (zero disables it).
pub trait ProcessRunner {
    fn invoke(&self, program: &OsStr, args: &[OsString], timeout: Duration) -> ExitOutcome;
}

impl<R: ProcessRunner + ?Sized> ProcessRunner for &R {
    fn invoke(&self, program: &OsStr, args: &[OsString], timeout: Duration) -> ExitOutcome {
        (**self).invoke(program, args, timeout)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn invoke(&self, program: &OsStr, args: &[OsString], timeout: Duration) -> ExitOutcome {
        debug!(
            "spawn {} {:?} timeout={:?}",
            program.to_string_lossy(),
            args,
            timeout
        );
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            // Own process group, so a timeout also takes down forked helpers
            // such as soffice.bin.
            cmd.process_group(0);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                return ExitOutcome::InvokeError(format!(
                    "spawning {}: {e}",
                    program.to_string_lossy()
                ));
            }
        };

        match wait_with_timeout(&mut child, timeout) {
            Ok(outcome) => outcome,
            Err(e) => ExitOutcome::InvokeError(format!("{e:#}")),
        }
    }
}

struct Captured {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitOutcome> {
    // Drain pipes while waiting so a chatty engine can't block on a full
    // stdout/stderr buffer.
    let stdout_reader = child.stdout.take();
    let stderr_reader = child.stderr.take();

    let stdout_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut out) = stdout_reader {
            out.read_to_end(&mut buf).with_context(|| "read stdout")?;
        }
        Ok(buf)
    });

    let stderr_thread = std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut err) = stderr_reader {
            err.read_to_end(&mut buf).with_context(|| "read stderr")?;
        }
        Ok(buf)
    });

    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait().with_context(|| "try_wait")? {
            let out = join_readers(status, stdout_thread, stderr_thread)?;
            return Ok(ExitOutcome::Exited {
                success: out.status.success(),
                code: out.status.code(),
                stdout: out.stdout,
                stderr: out.stderr,
            });
        }

        if !timeout.is_zero() && start.elapsed() > timeout {
            warn!("process timed out after {:?}", timeout);
            kill_tree(child);
            child.wait().with_context(|| "wait after kill")?;
            // A helper that left the process group can still hold the pipes
            // open, so the readers are left detached here.
            drop(stdout_thread);
            drop(stderr_thread);
            return Ok(ExitOutcome::TimedOut {
                after: timeout,
                stderr: Vec::new(),
            });
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(unix)]
fn kill_tree(child: &mut Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(e) = killpg(Pid::from_raw(child.id() as i32), Signal::SIGKILL) {
        debug!("killpg failed ({e}); killing child only");
        let _ = child.kill();
    }
}

#[cfg(not(unix))]
fn kill_tree(child: &mut Child) {
    let _ = child.kill();
}

fn join_readers(
    status: ExitStatus,
    stdout_thread: JoinHandle<Result<Vec<u8>>>,
    stderr_thread: JoinHandle<Result<Vec<u8>>>,
) -> Result<Captured> {
    let stdout = stdout_thread
        .join()
        .map_err(|_| anyhow!("stdout reader thread panicked"))??;
    let stderr = stderr_thread
        .join()
        .map_err(|_| anyhow!("stderr reader thread panicked"))??;
    Ok(Captured {
        status,
        stdout,
        stderr,
    })
}
