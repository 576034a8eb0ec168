#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;

use std::process::Output;
use std::time::Duration;
use std::time::Instant;

use tempfile::TempDir;
use tokio::process::Command;
use tokio::time;

use super::scan_imports;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ExecutionPhase;
use crate::domain::models::ExecutionResult;

#[cfg(windows)]
const VENV_PYTHON: &str = "Scripts/python.exe";
#[cfg(not(windows))]
const VENV_PYTHON: &str = "bin/python";

/// Runs a command to completion with a wall-clock bound. `Ok(None)` means
/// the bound elapsed; the child is killed when the output future drops.
async fn run_command(cmd: &mut Command, timeout: Duration) -> std::io::Result<Option<Output>> {
    cmd.kill_on_drop(true);

    match time::timeout(timeout, cmd.output()).await {
        Ok(res) => return res.map(Some),
        Err(_) => return Ok(None),
    }
}

/// Executes untrusted scripts in a scratch directory that is removed no
/// matter how execution ends. Dependencies are installed into an ephemeral
/// virtual environment created inside the scratch directory, so no
/// process-wide interpreter state is ever touched and concurrent
/// executions cannot race each other.
pub struct Sandbox {
    python_bin: String,
    install_timeout: Duration,
    run_timeout: Duration,
}

impl Default for Sandbox {
    fn default() -> Sandbox {
        let install_secs = Config::get(ConfigKey::SandboxInstallTimeout)
            .parse::<u64>()
            .unwrap_or(120);
        let run_secs = Config::get(ConfigKey::SandboxRunTimeout)
            .parse::<u64>()
            .unwrap_or(60);

        return Sandbox::new(
            &Config::get(ConfigKey::PythonBin),
            Duration::from_secs(install_secs),
            Duration::from_secs(run_secs),
        );
    }
}

impl Sandbox {
    pub fn new(python_bin: &str, install_timeout: Duration, run_timeout: Duration) -> Sandbox {
        return Sandbox {
            python_bin: python_bin.to_string(),
            install_timeout,
            run_timeout,
        };
    }

    pub async fn execute(&self, source_code: &str) -> ExecutionResult {
        let scratch = match TempDir::new() {
            Ok(dir) => dir,
            Err(err) => return ExecutionResult::sandbox_failed(err.to_string()),
        };

        let script_path = scratch.path().join("main.py");
        if let Err(err) = tokio::fs::write(&script_path, source_code).await {
            return ExecutionResult::sandbox_failed(err.to_string());
        }

        let mut python = self.python_bin.to_string();

        let manifest = scan_imports(source_code);
        if !manifest.is_empty() {
            tracing::debug!(packages = ?manifest, "Installing script dependencies");
            let install_started = Instant::now();

            let venv_dir = scratch.path().join(".venv");
            let mut venv_cmd = Command::new(&self.python_bin);
            venv_cmd.args(["-m", "venv"]).arg(&venv_dir);

            match run_command(&mut venv_cmd, self.install_timeout).await {
                Err(err) => return ExecutionResult::sandbox_failed(err.to_string()),
                Ok(None) => return ExecutionResult::timed_out(ExecutionPhase::Install),
                Ok(Some(output)) => {
                    if !output.status.success() {
                        return ExecutionResult::install_failed(format!(
                            "Error creating virtual environment:\n{}",
                            String::from_utf8_lossy(&output.stderr)
                        ));
                    }
                }
            }

            python = venv_dir.join(VENV_PYTHON).to_string_lossy().to_string();

            let remaining = self.install_timeout.saturating_sub(install_started.elapsed());
            let mut pip_cmd = Command::new(&python);
            pip_cmd.args(["-m", "pip", "install", "--quiet"]).args(&manifest);

            match run_command(&mut pip_cmd, remaining).await {
                Err(err) => return ExecutionResult::sandbox_failed(err.to_string()),
                Ok(None) => return ExecutionResult::timed_out(ExecutionPhase::Install),
                Ok(Some(output)) => {
                    if !output.status.success() {
                        return ExecutionResult::install_failed(format!(
                            "Error installing dependencies:\n{}",
                            String::from_utf8_lossy(&output.stderr)
                        ));
                    }
                }
            }
        }

        let mut run_cmd = Command::new(&python);
        run_cmd.arg("main.py").current_dir(scratch.path());

        match run_command(&mut run_cmd, self.run_timeout).await {
            Err(err) => return ExecutionResult::sandbox_failed(err.to_string()),
            Ok(None) => return ExecutionResult::timed_out(ExecutionPhase::Run),
            Ok(Some(output)) => {
                return ExecutionResult::completed(
                    String::from_utf8_lossy(&output.stdout).to_string(),
                    String::from_utf8_lossy(&output.stderr).to_string(),
                );
            }
        }
    }
}
