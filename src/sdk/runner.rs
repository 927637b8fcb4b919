//! Running the external Fabric tools

use crate::error::{CliError, Result};
use std::fmt;
use std::process::Command;
use tracing::{debug, trace};

/// One tool call: program, arguments and extra environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: &str, value: impl Into<String>) -> Self {
        self.env.push((key.to_string(), value.into()));
        self
    }

    pub fn envs(mut self, vars: Vec<(String, String)>) -> Self {
        self.env.extend(vars);
        self
    }

    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value following `flag` in the argument list.
    pub fn flag_value(&self, flag: &str) -> Option<&str> {
        self.args
            .iter()
            .position(|a| a == flag)
            .and_then(|i| self.args.get(i + 1))
            .map(String::as_str)
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

pub trait CommandRunner {
    /// Run to completion. A non-zero exit is an `Sdk` error carrying the
    /// tool's own message.
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput> {
        debug!("Running {}", invocation);
        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)))
            .output()
            .map_err(|e| {
                CliError::sdk(format!("failed to run {}: {}", invocation.program, e))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        trace!(%stdout, %stderr, "{} finished", invocation.program);

        if !output.status.success() {
            return Err(CliError::sdk(failure_message(
                &invocation.program,
                &stderr,
                &stdout,
                output.status.code(),
            )));
        }
        Ok(ToolOutput { stdout, stderr })
    }
}

/// The tools print their own `Error: ...` line on failure; prefer it over
/// the surrounding log noise.
pub fn failure_message(program: &str, stderr: &str, stdout: &str, code: Option<i32>) -> String {
    let error_line = stderr
        .lines()
        .chain(stdout.lines())
        .map(str::trim)
        .rfind(|line| line.starts_with("Error:"));
    if let Some(line) = error_line {
        return line.to_string();
    }

    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }

    match code {
        Some(code) => format!("{} exited with status {}", program, code),
        None => format!("{} was terminated by a signal", program),
    }
}
