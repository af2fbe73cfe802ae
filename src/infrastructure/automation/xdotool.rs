//! # xdotool Driver
//!
//! X11 automation by shelling out to `xdotool`. Every call runs under a timeout and
//! the child is killed if the timeout fires.

use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::domain::automation::{KeyChord, TargetError, WindowHandle};
use crate::domain::traits::AutomationTarget;

pub struct XdotoolTarget {
    program: String,
    leading_args: Vec<String>,
    timeout: Duration,
}

impl XdotoolTarget {
    /// `command` is the program followed by any leading arguments.
    pub fn new(command: &[String], timeout: Duration) -> Result<Self, TargetError> {
        let Some((program, leading_args)) = command.split_first() else {
            return Err(TargetError::Unavailable("empty xdotool command".into()));
        };
        Ok(Self {
            program: program.clone(),
            leading_args: leading_args.to_vec(),
            timeout,
        })
    }

    /// Runs one xdotool invocation and returns its stdout.
    /// `allow_failure` accepts a non-zero exit (xdotool exits 1 when a search matches nothing).
    async fn run(
        &self,
        args: &[&str],
        extra_time: Duration,
        allow_failure: bool,
    ) -> Result<String, TargetError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let limit = self.timeout + extra_time;
        let output = match tokio::time::timeout(limit, cmd.output()).await {
            Err(_) => return Err(TargetError::Timeout(limit.as_millis() as u64)),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TargetError::Unavailable(format!(
                    "'{}' not found on PATH",
                    self.program
                )));
            }
            Ok(Err(e)) => return Err(TargetError::Driver(e.to_string())),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() && !allow_failure {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TargetError::Driver(format!(
                "xdotool {} exited with {}: {}",
                args.first().unwrap_or(&""),
                output.status,
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl AutomationTarget for XdotoolTarget {
    async fn find_windows(&self, marker: &str) -> Result<Vec<WindowHandle>, TargetError> {
        // xdotool matches names as a case-insensitive regex
        let pattern = regex::escape(marker);
        let ids = self
            .run(&["search", "--onlyvisible", "--name", &pattern], Duration::ZERO, true)
            .await?;

        let mut windows = Vec::new();
        for id in ids.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let title = self
                .run(&["getwindowname", id], Duration::ZERO, false)
                .await?;
            windows.push(WindowHandle {
                id: id.to_string(),
                title: title.trim().to_string(),
            });
        }
        Ok(windows)
    }

    async fn focus(&self, window: &WindowHandle) -> Result<(), TargetError> {
        // windowactivate also maps (restores) a minimised window
        self.run(&["windowactivate", "--sync", &window.id], Duration::ZERO, false)
            .await
            .map(|_| ())
    }

    async fn send_chord(&self, chord: &KeyChord) -> Result<(), TargetError> {
        self.run(&["key", "--clearmodifiers", &chord.to_string()], Duration::ZERO, false)
            .await
            .map(|_| ())
    }

    async fn type_text(&self, text: &str, interval: Duration) -> Result<(), TargetError> {
        let delay = interval.as_millis().to_string();
        let typing_time = interval * text.chars().count() as u32;
        self.run(&["type", "--delay", &delay, "--", text], typing_time, false)
            .await
            .map(|_| ())
    }
}
