mod client;

pub use client::{CommandOutput, SshSession};

use crate::error::{Error, RemoteCommandFailedDetails, Result};

/// One authenticated remote-execution channel.
///
/// Implementations run exactly one command per call, synchronously, each in
/// a fresh remote execution context (no shared shell state between calls).
/// The channel is not safe for concurrent use; callers issue one command at
/// a time.
pub trait RemoteSession {
    /// Run one command and capture everything. Never fails the caller:
    /// transport-level problems are folded into a failing [`CommandOutput`].
    fn execute(&self, command: &str) -> CommandOutput;

    /// Release the underlying transport. Idempotent; safe after failures.
    fn close(&self);

    /// Run one command, returning stdout on success and a
    /// `remote.command_failed` error otherwise.
    fn run(&self, command: &str) -> Result<String> {
        let output = self.execute(command);
        if output.success {
            Ok(output.stdout)
        } else {
            Err(Error::remote_command_failed(RemoteCommandFailedDetails {
                command: command.to_string(),
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            }))
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Scripted session double: commands matching a failure predicate fail,
    /// everything else succeeds with a canned stdout. Records every command
    /// sent and counts close calls.
    pub struct ScriptedSession {
        pub executed: RefCell<Vec<String>>,
        pub close_calls: Cell<u32>,
        fail_when: Box<dyn Fn(&str) -> bool>,
        stdout_for: Box<dyn Fn(&str) -> String>,
    }

    impl ScriptedSession {
        pub fn succeeding() -> Self {
            Self::failing_when(|_| false)
        }

        pub fn failing_when(predicate: impl Fn(&str) -> bool + 'static) -> Self {
            Self {
                executed: RefCell::new(Vec::new()),
                close_calls: Cell::new(0),
                fail_when: Box::new(predicate),
                stdout_for: Box::new(|_| "ok".to_string()),
            }
        }

        pub fn with_stdout(mut self, f: impl Fn(&str) -> String + 'static) -> Self {
            self.stdout_for = Box::new(f);
            self
        }

        pub fn executed_commands(&self) -> Vec<String> {
            self.executed.borrow().clone()
        }

        pub fn sent(&self, fragment: &str) -> bool {
            self.executed.borrow().iter().any(|c| c.contains(fragment))
        }
    }

    impl RemoteSession for ScriptedSession {
        fn execute(&self, command: &str) -> CommandOutput {
            self.executed.borrow_mut().push(command.to_string());
            if (self.fail_when)(command) {
                CommandOutput {
                    stdout: String::new(),
                    stderr: format!("scripted failure: {}", command),
                    success: false,
                    exit_code: 1,
                }
            } else {
                CommandOutput {
                    stdout: (self.stdout_for)(command),
                    stderr: String::new(),
                    success: true,
                    exit_code: 0,
                }
            }
        }

        fn close(&self) {
            self.close_calls.set(self.close_calls.get() + 1);
        }
    }
}
