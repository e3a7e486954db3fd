// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::fmt::Debug;
use std::io::Write;
use std::marker::PhantomData;

use tracing::{debug, info};

use crate::banner;
use crate::config::{LaunchConfiguration, LaunchOptions};
use crate::credentials;
use crate::error::ErrorKind;
use crate::spawn::{self, LaunchCommand, StdIoConf};
use crate::Error;

#[derive(Clone, Copy, Debug)]
pub struct Configuring;
#[derive(Clone, Copy, Debug)]
pub struct Announcing;
#[derive(Clone, Copy, Debug)]
pub struct Launching;

// A marker trait to designate the stage of the launch
pub trait Stage: Clone + Copy + Debug {
    type Next: Stage;

    fn display() -> &'static str;
}

impl Stage for Configuring {
    type Next = Announcing;

    fn display() -> &'static str {
        "Configuring"
    }
}

impl Stage for Announcing {
    type Next = Launching;

    fn display() -> &'static str {
        "Announcing"
    }
}

/// Launching hands off to the application, there is nothing after it
impl Stage for Launching {
    type Next = Launching;

    fn display() -> &'static str {
        "Launching"
    }
}

/// Prepare the environment and hand off to the application
///
/// Rules:
/// - configuration is fully applied before the banner is printed
/// - the banner is fully printed before the application is started
/// - the application's exit code becomes ours, no retries
#[derive(Debug)]
pub struct Launcher<S: Stage> {
    options: LaunchOptions,
    config: LaunchConfiguration,
    ghost: PhantomData<S>,
}

impl<S: Stage> Launcher<S> {
    pub fn options(&self) -> &LaunchOptions {
        &self.options
    }

    pub fn configuration(&self) -> &LaunchConfiguration {
        &self.config
    }

    fn advance(self) -> Launcher<S::Next> {
        debug!("{} -> {}", S::display(), S::Next::display());
        Launcher {
            options: self.options,
            config: self.config,
            ghost: PhantomData,
        }
    }
}

impl Launcher<Configuring> {
    pub fn new(options: LaunchOptions) -> Result<Self, Error> {
        options.validate()?;
        let config = options.configuration()?;

        Ok(Self {
            options,
            config,
            ghost: PhantomData,
        })
    }

    /// Apply the configuration to the process environment and write first-run settings
    ///
    /// Settings are only written next to a target that exists, a launch that is going to fail leaves
    /// the filesystem alone.
    pub fn configure(self) -> Result<Launcher<Announcing>, Error> {
        self.config.apply();

        if self.options.write_credentials {
            if self.options.target.is_file() {
                credentials::ensure_credentials(&self.options.app_dir())?;
            } else {
                debug!(
                    "target missing, skipping credentials: {}",
                    self.options.target.display()
                );
            }
        }

        Ok(self.advance())
    }
}

impl Launcher<Announcing> {
    pub fn announce<W: Write>(self, out: &mut W) -> Result<Launcher<Launching>, Error> {
        banner::announce(out)?;
        Ok(self.advance())
    }
}

impl Launcher<Launching> {
    /// Run the application, returning its exit code
    ///
    /// In exec mode this only returns on failure.
    pub async fn launch(self) -> Result<i32, Error> {
        let target = &self.options.target;
        if !target.is_file() {
            return Err(ErrorKind::TargetNotFound(target.clone()).into());
        }

        let command = LaunchCommand::from_options(&self.options);
        debug!("launching: {:?}", command);

        if self.options.exec {
            return Err(spawn::exec_process(&command, StdIoConf::default()));
        }

        let mut child = spawn::new_process(&command, StdIoConf::default())?;
        let status = child.wait().await?;
        info!("application exited: {}", status);

        Ok(spawn::exit_code(status))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serial_test::serial;

    use super::*;
    use crate::config::Toggle;

    fn options_in(dir: &std::path::Path) -> LaunchOptions {
        LaunchOptions::new().with_target(dir.join("app.py"))
    }

    #[test]
    #[serial]
    fn test_configure_sets_environment() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.py"), "").unwrap();
        for toggle in Toggle::CORE.iter() {
            std::env::set_var(toggle.env_var(), "true");
        }

        let launcher = Launcher::new(options_in(dir.path())).unwrap();
        for toggle in Toggle::CORE.iter() {
            assert_eq!(launcher.configuration().get(*toggle), Some(false));
        }
        launcher.configure().unwrap();

        for toggle in Toggle::CORE.iter() {
            assert_eq!(std::env::var(toggle.env_var()).unwrap(), "false");
        }
        assert!(dir.path().join(".streamlit/credentials.toml").is_file());
    }

    #[test]
    #[serial]
    fn test_configure_missing_target_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let options = LaunchOptions::new().with_target(dir.path().join("typo/nested/app.py"));

        Launcher::new(options).unwrap().configure().unwrap();
        assert!(!dir.path().join("typo").exists());
    }

    #[test]
    #[serial]
    fn test_configure_without_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_in(dir.path()).with_credentials(false);

        Launcher::new(options).unwrap().configure().unwrap();
        assert!(!dir.path().join(".streamlit").exists());
    }

    #[test]
    #[serial]
    fn test_announce_after_configure() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();

        let launcher = Launcher::new(options_in(dir.path()))
            .unwrap()
            .configure()
            .unwrap()
            .announce(&mut out)
            .unwrap();

        assert_eq!(out, banner::banner().into_bytes());
        assert_eq!(launcher.options().target, dir.path().join("app.py"));
    }

    #[test]
    fn test_new_rejects_invalid_options() {
        let err = Launcher::new(LaunchOptions::new().with_target("")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Config(_)));
    }

    #[tokio::test]
    #[serial]
    async fn test_launch_missing_target() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_in(dir.path())
            .with_interpreter("sh")
            .with_runner("")
            .with_credentials(false);

        let launcher = Launcher::new(options)
            .unwrap()
            .configure()
            .unwrap()
            .announce(&mut Vec::new())
            .unwrap();

        let err = launcher.launch().await.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TargetNotFound(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    #[serial]
    async fn test_launch_propagates_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("app.py");

        for code in &[0, 1] {
            fs::write(&target, format!("exit {}\n", code)).unwrap();
            let options = options_in(dir.path())
                .with_interpreter("sh")
                .with_runner("")
                .with_credentials(false);

            let launcher = Launcher::new(options)
                .unwrap()
                .configure()
                .unwrap()
                .announce(&mut Vec::new())
                .unwrap();

            assert_eq!(launcher.launch().await.unwrap(), *code);
        }
    }

    #[tokio::test]
    #[serial]
    async fn test_child_inherits_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("app.py");
        fs::write(
            &target,
            "test \"$STREAMLIT_SERVER_HEADLESS\" = false && test \"$STREAMLIT_SERVER_ENABLE_CORS\" = false\n",
        )
        .unwrap();

        let options = options_in(dir.path())
            .with_interpreter("sh")
            .with_runner("")
            .with_credentials(false);
        let launcher = Launcher::new(options)
            .unwrap()
            .configure()
            .unwrap()
            .announce(&mut Vec::new())
            .unwrap();

        assert_eq!(launcher.launch().await.unwrap(), 0);
    }
}
