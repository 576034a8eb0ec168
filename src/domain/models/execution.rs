use std::fmt;

/// Phase of a sandboxed execution that can exceed its wall-clock budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionPhase {
    Install,
    Run,
}

impl fmt::Display for ExecutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecutionPhase::Install => return write!(f, "dependency install"),
            ExecutionPhase::Run => return write!(f, "script execution"),
        }
    }
}

/// Outcome category of a sandboxed execution. A script that ran but raised
/// is `Completed` with a non-empty stderr; the other variants never reach
/// the script itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStatus {
    Completed,
    InstallFailed,
    TimedOut(ExecutionPhase),
    SandboxFailed,
}

/// Captured result of one sandboxed execution. Produced once per request,
/// never raised as an error to the caller.
#[derive(Clone, Debug)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub timed_out: bool,
    pub status: ExecutionStatus,
}

impl ExecutionResult {
    pub fn completed(stdout: String, stderr: String) -> ExecutionResult {
        return ExecutionResult {
            stdout,
            stderr,
            timed_out: false,
            status: ExecutionStatus::Completed,
        };
    }

    pub fn install_failed(stderr: String) -> ExecutionResult {
        return ExecutionResult {
            stdout: "".to_string(),
            stderr,
            timed_out: false,
            status: ExecutionStatus::InstallFailed,
        };
    }

    pub fn timed_out(phase: ExecutionPhase) -> ExecutionResult {
        return ExecutionResult {
            stdout: "".to_string(),
            stderr: format!("{phase} timed out."),
            timed_out: true,
            status: ExecutionStatus::TimedOut(phase),
        };
    }

    pub fn sandbox_failed(reason: String) -> ExecutionResult {
        return ExecutionResult {
            stdout: "".to_string(),
            stderr: format!("An unexpected error occurred during execution: {reason}"),
            timed_out: false,
            status: ExecutionStatus::SandboxFailed,
        };
    }

    /// True when the script ran to completion without writing to stderr.
    pub fn is_clean(&self) -> bool {
        return self.status == ExecutionStatus::Completed && self.stderr.is_empty();
    }
}
