// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::ffi::OsString;
use std::io;
use std::os::unix::process::{CommandExt, ExitStatusExt};
use std::process::{ExitStatus, Stdio};

use futures::future::FutureExt;
use futures::select;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info, warn};

use crate::config::LaunchOptions;
use crate::error::ErrorKind;
use crate::Error;

pub struct StdIoConf {
    pub stdin: Stdio,
    pub stderr: Stdio,
    pub stdout: Stdio,
}

impl Default for StdIoConf {
    /// The application owns the terminal
    fn default() -> Self {
        StdIoConf {
            stdin: Stdio::inherit(),
            stderr: Stdio::inherit(),
            stdout: Stdio::inherit(),
        }
    }
}

/// Program and argument vector for the application's runner
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<OsString>,
}

impl LaunchCommand {
    /// `interpreter [runner] target [args...]`
    pub fn from_options(options: &LaunchOptions) -> Self {
        let mut args: Vec<OsString> = Vec::with_capacity(options.args.len() + 2);
        if let Some(runner) = &options.runner {
            args.push(runner.into());
        }
        args.push(options.target.clone().into_os_string());
        args.extend(options.args.iter().map(OsString::from));

        Self {
            program: options.interpreter.clone(),
            args,
        }
    }

    fn std_command(&self, stdio: StdIoConf) -> std::process::Command {
        let mut command = std::process::Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(stdio.stdin)
            .stdout(stdio.stdout)
            .stderr(stdio.stderr);
        command
    }

    fn startup_error(&self, err: io::Error) -> Error {
        match err.kind() {
            io::ErrorKind::NotFound => ErrorKind::InterpreterNotFound(self.program.clone()).into(),
            io::ErrorKind::PermissionDenied => ErrorKind::NotExecutable(self.program.clone()).into(),
            _ => err.into(),
        }
    }
}

/// Termination requests the launcher listens for while the application runs
struct Signals {
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    interrupt: tokio::signal::unix::Signal,
}

impl Signals {
    fn register() -> Result<Self, Error> {
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }
}

pub struct Child {
    pub child: tokio::process::Child,
    pub pid: Option<Pid>,
    signals: Signals,
}

impl Child {
    /// Wait for the child to exit, forwarding termination requests to it
    ///
    /// SIGTERM and SIGHUP are passed on. SIGINT is only absorbed, the terminal already delivers it to
    /// the whole foreground process group.
    pub async fn wait(&mut self) -> Result<ExitStatus, Error> {
        let Signals {
            terminate,
            hangup,
            interrupt,
        } = &mut self.signals;

        loop {
            let forward = select! {
                status = self.child.wait().fuse() => return Ok(status?),
                _ = terminate.recv().fuse() => Some(Signal::SIGTERM),
                _ = hangup.recv().fuse() => Some(Signal::SIGHUP),
                _ = interrupt.recv().fuse() => None,
            };

            match (forward, self.pid) {
                (Some(sig), Some(pid)) => {
                    info!("forwarding {} to {}", sig, pid);
                    if let Err(e) = kill(pid, sig) {
                        warn!("failed to forward {} to {}: {}", sig, pid, e);
                    }
                }
                (None, _) => debug!("interrupt received, waiting on application"),
                (Some(_), None) => (),
            }
        }
    }
}

/// Spawn the command with kill-on-drop
///
/// Signal handlers are in place before the child exists, so a termination request can never leave it
/// orphaned.
pub fn new_process(command: &LaunchCommand, stdio: StdIoConf) -> Result<Child, Error> {
    let signals = Signals::register()?;

    // the environment is inherited, it was configured before the launch
    let child = tokio::process::Command::from(command.std_command(stdio))
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| command.startup_error(e))?;

    let pid = child.id().map(|id| Pid::from_raw(id as i32));
    info!("started {} ({:?})", command.program, pid);

    Ok(Child {
        child,
        pid,
        signals,
    })
}

/// Replace this process with the command, only returns on failure
pub fn exec_process(command: &LaunchCommand, stdio: StdIoConf) -> Error {
    info!("exec {}", command.program);
    let err = command.std_command(stdio).exec();
    command.startup_error(err)
}

/// Exit code mirroring the child, `128 + signo` when it was killed by a signal
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    match status.signal() {
        Some(signo) => {
            match Signal::try_from(signo) {
                Ok(sig) => warn!("application terminated by {}", sig),
                Err(_) => warn!("application terminated by signal {}", signo),
            }
            128 + signo
        }
        None => crate::error::EXIT_FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> LaunchCommand {
        LaunchCommand {
            program: "sh".to_string(),
            args: vec!["-c".into(), script.into()],
        }
    }

    fn quiet() -> StdIoConf {
        StdIoConf {
            stdin: Stdio::null(),
            stderr: Stdio::null(),
            stdout: Stdio::null(),
        }
    }

    #[test]
    fn test_command_from_defaults() {
        let command = LaunchCommand::from_options(&LaunchOptions::default());
        assert_eq!(command.program, "streamlit");
        assert_eq!(command.args, vec![OsString::from("run"), OsString::from("app.py")]);
    }

    #[test]
    fn test_command_without_runner() {
        let options = LaunchOptions::new()
            .with_interpreter("python3")
            .with_runner("")
            .with_target("main.py")
            .with_args(vec!["--port", "9000"]);
        let command = LaunchCommand::from_options(&options);

        assert_eq!(command.program, "python3");
        assert_eq!(
            command.args,
            vec![
                OsString::from("main.py"),
                OsString::from("--port"),
                OsString::from("9000")
            ]
        );
    }

    #[test]
    fn test_exit_code_from_status() {
        assert_eq!(exit_code(ExitStatus::from_raw(0)), 0);
        assert_eq!(exit_code(ExitStatus::from_raw(3 << 8)), 3);
        // killed by SIGKILL
        assert_eq!(exit_code(ExitStatus::from_raw(9)), 137);
    }

    #[tokio::test]
    async fn test_child_exit_codes() {
        for code in &[0, 1, 42] {
            let mut child = new_process(&sh(&format!("exit {}", code)), quiet()).unwrap();
            let status = child.wait().await.unwrap();
            assert_eq!(exit_code(status), *code);
        }
    }

    #[tokio::test]
    async fn test_child_killed_by_signal() {
        let mut child = new_process(&sh("kill -TERM $$"), quiet()).unwrap();
        let status = child.wait().await.unwrap();
        assert_eq!(exit_code(status), 128 + 15);
    }

    #[tokio::test]
    async fn test_missing_interpreter() {
        let command = LaunchCommand {
            program: "litlaunch-no-such-interpreter".to_string(),
            args: vec![],
        };

        let err = new_process(&command, quiet()).err().unwrap();
        assert!(matches!(err.kind(), ErrorKind::InterpreterNotFound(_)));
        assert_eq!(err.exit_code(), 127);
    }
}
