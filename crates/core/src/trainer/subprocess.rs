//! Real trainer processes via [`tokio::process`].
//!
//! The child inherits stdout/stderr so trainer progress shows up in the
//! terminal as usual. Termination sends SIGTERM first and falls back to a
//! hard kill if the trainer has not exited within the grace period.

use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::process::{Child, Command};

use crate::error::TrainerError;

use super::invocation::{SupervisionMode, TrainerInvocation, TrainerProgram};
use super::launcher::{ExitReport, TrainerLauncher, TrainerProcess};

/// Default time a trainer gets to exit after SIGTERM before it is killed.
pub const DEFAULT_TERMINATE_GRACE: Duration = Duration::from_secs(10);

/// Launches `<interpreter> <script> <args…>` as a child process.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: TrainerProgram,
    terminate_grace: Duration,
}

impl ProcessLauncher {
    pub fn new(program: TrainerProgram) -> Self {
        Self {
            program,
            terminate_grace: DEFAULT_TERMINATE_GRACE,
        }
    }

    pub fn with_terminate_grace(mut self, grace: Duration) -> Self {
        self.terminate_grace = grace;
        self
    }

    pub fn program(&self) -> &TrainerProgram {
        &self.program
    }
}

impl TrainerLauncher for ProcessLauncher {
    type Process = ChildProcess;

    fn launch(&self, invocation: &TrainerInvocation) -> Result<ChildProcess, TrainerError> {
        let mode = invocation.mode();

        let mut cmd = Command::new(&self.program.interpreter);
        cmd.arg(&self.program.script)
            .args(invocation.args())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            // Never leave an orphaned trainer behind if the handle is dropped.
            .kill_on_drop(true);

        if let Some(dir) = &self.program.working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd.spawn().map_err(|source| TrainerError::Spawn {
            mode: mode.as_str(),
            program: self.program.to_string(),
            source,
        })?;

        tracing::info!(
            mode = %mode,
            pid = child.id(),
            model_dir = %invocation.model_dir().display(),
            "Trainer process started",
        );

        Ok(ChildProcess {
            mode,
            child,
            terminate_grace: self.terminate_grace,
        })
    }
}

/// A trainer started by [`ProcessLauncher`].
#[derive(Debug)]
pub struct ChildProcess {
    mode: SupervisionMode,
    child: Child,
    terminate_grace: Duration,
}

impl ChildProcess {
    fn report(&self, status: ExitStatus) -> ExitReport {
        ExitReport {
            mode: self.mode,
            exit_code: status.code().unwrap_or(-1),
        }
    }

    fn wait_error(&self, source: std::io::Error) -> TrainerError {
        TrainerError::Wait {
            mode: self.mode.as_str(),
            source,
        }
    }

    #[cfg(unix)]
    fn request_stop(&mut self) -> Result<(), TrainerError> {
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        // SAFETY: kill(2) takes plain integers; `pid` is our own unreaped child.
        let rc = unsafe { libc::kill(pid as libc::pid_t, libc::SIGTERM) };
        if rc == 0 {
            Ok(())
        } else {
            Err(TrainerError::Terminate {
                mode: self.mode.as_str(),
                pid,
                source: std::io::Error::last_os_error(),
            })
        }
    }

    #[cfg(not(unix))]
    fn request_stop(&mut self) -> Result<(), TrainerError> {
        let pid = self.child.id().unwrap_or_default();
        self.child
            .start_kill()
            .map_err(|source| TrainerError::Terminate {
                mode: self.mode.as_str(),
                pid,
                source,
            })
    }
}

impl TrainerProcess for ChildProcess {
    fn mode(&self) -> SupervisionMode {
        self.mode
    }

    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> Result<ExitReport, TrainerError> {
        let status = self.child.wait().await.map_err(|e| self.wait_error(e))?;
        let report = self.report(status);
        tracing::info!(mode = %self.mode, exit_code = report.exit_code, "Trainer process exited");
        Ok(report)
    }

    async fn terminate(&mut self) -> Result<ExitReport, TrainerError> {
        if let Some(status) = self.child.try_wait().map_err(|e| self.wait_error(e))? {
            return Ok(self.report(status));
        }

        tracing::info!(mode = %self.mode, pid = self.child.id(), "Terminating trainer process");
        self.request_stop()?;

        match tokio::time::timeout(self.terminate_grace, self.child.wait()).await {
            Ok(status) => {
                let status = status.map_err(|e| self.wait_error(e))?;
                Ok(self.report(status))
            }
            Err(_elapsed) => {
                tracing::warn!(
                    mode = %self.mode,
                    grace_secs = self.terminate_grace.as_secs(),
                    "Trainer ignored SIGTERM, killing",
                );
                self.child.kill().await.map_err(|e| self.wait_error(e))?;
                let status = self.child.wait().await.map_err(|e| self.wait_error(e))?;
                Ok(self.report(status))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(all(test, unix))]
mod tests {
    use std::path::{Path, PathBuf};

    use assert_matches::assert_matches;

    use super::*;

    /// A launcher running `sh <script>` where the script body is `body`.
    fn shell_launcher(dir: &Path, body: &str) -> ProcessLauncher {
        let script = dir.join("fake_train.sh");
        std::fs::write(&script, body).unwrap();
        ProcessLauncher::new(TrainerProgram {
            interpreter: "sh".to_string(),
            script,
            working_dir: None,
        })
        .with_terminate_grace(Duration::from_secs(2))
    }

    fn invocation(dir: &Path) -> TrainerInvocation {
        TrainerInvocation::weak(Path::new("scene"), Path::new("depth"), dir)
    }

    #[tokio::test]
    async fn wait_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = shell_launcher(dir.path(), "exit 3\n");

        let mut process = launcher.launch(&invocation(dir.path())).unwrap();
        let report = process.wait().await.unwrap();

        assert_eq!(report.mode, SupervisionMode::Weak);
        assert_eq!(report.exit_code, 3);
    }

    #[tokio::test]
    async fn trainer_receives_invocation_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("args.txt");
        let body = format!("echo \"$@\" > '{}'\n", out.display());
        let launcher = shell_launcher(dir.path(), &body);

        let mut process = launcher.launch(&invocation(dir.path())).unwrap();
        assert!(process.wait().await.unwrap().success());

        let recorded = std::fs::read_to_string(&out).unwrap();
        assert!(recorded.starts_with("-s scene -d depth -m "));
        assert!(recorded.trim_end().ends_with("--iterations 30000"));
    }

    #[tokio::test]
    async fn terminate_stops_a_running_trainer() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = shell_launcher(dir.path(), "exec sleep 30\n");

        let mut process = launcher.launch(&invocation(dir.path())).unwrap();
        assert!(process.id().is_some());

        let report = process.terminate().await.unwrap();
        assert_eq!(report.exit_code, -1);
    }

    #[tokio::test]
    async fn terminate_after_exit_returns_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = shell_launcher(dir.path(), "exit 0\n");

        let mut process = launcher.launch(&invocation(dir.path())).unwrap();
        process.wait().await.unwrap();
        let report = process.terminate().await.unwrap();
        assert_eq!(report.exit_code, 0);
    }

    #[tokio::test]
    async fn missing_interpreter_is_a_spawn_error() {
        let launcher = ProcessLauncher::new(TrainerProgram {
            interpreter: "definitely-not-a-python-binary".to_string(),
            script: PathBuf::from("train.py"),
            working_dir: None,
        });
        let err = launcher
            .launch(&invocation(Path::new("out")))
            .unwrap_err();
        assert_matches!(err, TrainerError::Spawn { mode: "weak", .. });
    }
}
