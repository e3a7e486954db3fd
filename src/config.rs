// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Launch configuration: the environment toggles handed to the framework and the options for the launch itself

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::ErrorKind;
use crate::Error;

pub const DEFAULT_INTERPRETER: &str = "streamlit";
pub const DEFAULT_RUNNER: &str = "run";
pub const DEFAULT_TARGET: &str = "app.py";

/// A boolean switch consumed by the application framework through its environment
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Toggle {
    GatherUsageStats,
    HeadlessMode,
    XsrfProtection,
    CorsProtection,
    DevelopmentMode,
    ShowWarningOnDirectExecution,
    DisableWatchdogWarning,
}

impl Toggle {
    /// Always applied, each is switched off
    pub const CORE: [Toggle; 4] = [
        Toggle::GatherUsageStats,
        Toggle::HeadlessMode,
        Toggle::XsrfProtection,
        Toggle::CorsProtection,
    ];

    /// Applied when warnings are suppressed
    pub const QUIET: [Toggle; 3] = [
        Toggle::DevelopmentMode,
        Toggle::ShowWarningOnDirectExecution,
        Toggle::DisableWatchdogWarning,
    ];

    /// The framework independent name of the option
    pub fn key(self) -> &'static str {
        match self {
            Toggle::GatherUsageStats => "gather-usage-stats",
            Toggle::HeadlessMode => "headless-mode",
            Toggle::XsrfProtection => "xsrf-protection",
            Toggle::CorsProtection => "cors-protection",
            Toggle::DevelopmentMode => "development-mode",
            Toggle::ShowWarningOnDirectExecution => "show-warning-on-direct-execution",
            Toggle::DisableWatchdogWarning => "disable-watchdog-warning",
        }
    }

    /// The environment variable the framework reads the option from
    pub fn env_var(self) -> &'static str {
        match self {
            Toggle::GatherUsageStats => "STREAMLIT_BROWSER_GATHER_USAGE_STATS",
            Toggle::HeadlessMode => "STREAMLIT_SERVER_HEADLESS",
            Toggle::XsrfProtection => "STREAMLIT_SERVER_ENABLE_XSRF_PROTECTION",
            Toggle::CorsProtection => "STREAMLIT_SERVER_ENABLE_CORS",
            Toggle::DevelopmentMode => "STREAMLIT_GLOBAL_DEVELOPMENT_MODE",
            Toggle::ShowWarningOnDirectExecution => {
                "STREAMLIT_GLOBAL_SHOW_WARNING_ON_DIRECT_EXECUTION"
            }
            Toggle::DisableWatchdogWarning => "STREAMLIT_GLOBAL_DISABLE_WATCHDOG_WARNING",
        }
    }

    pub fn value(self) -> bool {
        matches!(self, Toggle::DisableWatchdogWarning)
    }

    pub fn is_env_var(name: &str) -> bool {
        Self::CORE
            .iter()
            .chain(Self::QUIET.iter())
            .any(|t| t.env_var() == name)
    }
}

impl fmt::Display for Toggle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The environment applied before the application is started
///
/// Constructed once and never mutated afterwards; every key maps to exactly one value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfiguration {
    toggles: BTreeMap<Toggle, bool>,
    extra: BTreeMap<String, String>,
}

impl LaunchConfiguration {
    pub fn new(suppress_warnings: bool, extra: BTreeMap<String, String>) -> Result<Self, Error> {
        if let Some(name) = extra.keys().find(|k| Toggle::is_env_var(k)) {
            return Err(ErrorKind::Config(format!(
                "{} is controlled by the launcher and cannot be overridden",
                name
            ))
            .into());
        }

        if let Some(name) = extra
            .keys()
            .find(|k| k.is_empty() || k.contains('=') || k.contains('\0'))
        {
            return Err(ErrorKind::Config(format!("invalid environment name: {:?}", name)).into());
        }

        if let Some((name, _)) = extra.iter().find(|(_, v)| v.contains('\0')) {
            return Err(
                ErrorKind::Config(format!("value for {} contains a nul byte", name)).into(),
            );
        }

        let mut toggles: BTreeMap<Toggle, bool> =
            Toggle::CORE.iter().map(|t| (*t, t.value())).collect();
        if suppress_warnings {
            toggles.extend(Toggle::QUIET.iter().map(|t| (*t, t.value())));
        }

        Ok(Self { toggles, extra })
    }

    pub fn get(&self, toggle: Toggle) -> Option<bool> {
        self.toggles.get(&toggle).copied()
    }

    /// All variable and value pairs, toggles first in table order
    pub fn entries(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.toggles
            .iter()
            .map(|(t, v)| (t.env_var(), v.to_string()))
            .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v.clone())))
    }

    /// Write every entry into the environment of this process, which all children inherit
    pub fn apply(&self) {
        for (name, value) in self.entries() {
            debug!("setting {}={}", name, value);
            std::env::set_var(name, value);
        }
    }

    /// Render the entries as `export` lines for a POSIX shell
    pub fn exports(&self) -> String {
        self.entries()
            .map(|(name, value)| format!("export {}={}\n", name, shell_quote(&value)))
            .collect()
    }
}

impl Default for LaunchConfiguration {
    fn default() -> Self {
        Self {
            toggles: Toggle::CORE.iter().map(|t| (*t, t.value())).collect(),
            extra: BTreeMap::new(),
        }
    }
}

fn shell_quote(value: &str) -> String {
    let plain = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:,@%+=".contains(c));

    if plain {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// The on-disk form of [`LaunchOptions`], every field is optional
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchFile {
    pub interpreter: Option<String>,
    pub runner: Option<String>,
    pub target: Option<PathBuf>,
    pub args: Option<Vec<String>>,
    pub suppress_warnings: Option<bool>,
    pub credentials: Option<bool>,
    pub exec: Option<bool>,
    pub env: BTreeMap<String, String>,
}

impl LaunchFile {
    pub fn read(path: &Path) -> Result<Self, Error> {
        debug!("reading launch file: {}", path.display());
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }
}

/// Everything needed to start the application
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchOptions {
    pub interpreter: String,
    /// Subcommand of the interpreter that runs a module, skipped when `None`
    pub runner: Option<String>,
    pub target: PathBuf,
    pub args: Vec<String>,
    pub suppress_warnings: bool,
    pub write_credentials: bool,
    /// Replace this process instead of waiting on a child
    pub exec: bool,
    pub env: BTreeMap<String, String>,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            interpreter: DEFAULT_INTERPRETER.to_string(),
            runner: Some(DEFAULT_RUNNER.to_string()),
            target: PathBuf::from(DEFAULT_TARGET),
            args: Vec::new(),
            suppress_warnings: false,
            write_credentials: true,
            exec: false,
            env: BTreeMap::new(),
        }
    }
}

impl LaunchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer the launch file over the current options
    pub fn merge_file(mut self, file: LaunchFile) -> Self {
        if let Some(interpreter) = file.interpreter {
            self.interpreter = interpreter;
        }
        if let Some(runner) = file.runner {
            self = self.with_runner(runner);
        }
        if let Some(target) = file.target {
            self.target = target;
        }
        if let Some(args) = file.args {
            self.args = args;
        }
        if let Some(suppress) = file.suppress_warnings {
            self.suppress_warnings = suppress;
        }
        if let Some(credentials) = file.credentials {
            self.write_credentials = credentials;
        }
        if let Some(exec) = file.exec {
            self.exec = exec;
        }
        self.env.extend(file.env);
        self
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<String>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    /// An empty runner invokes the interpreter on the target directly
    pub fn with_runner(mut self, runner: impl Into<String>) -> Self {
        let runner = runner.into();
        self.runner = if runner.is_empty() { None } else { Some(runner) };
        self
    }

    pub fn with_target(mut self, target: impl Into<PathBuf>) -> Self {
        self.target = target.into();
        self
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_suppress_warnings(mut self, suppress: bool) -> Self {
        self.suppress_warnings = suppress;
        self
    }

    pub fn with_credentials(mut self, write: bool) -> Self {
        self.write_credentials = write;
        self
    }

    pub fn with_exec(mut self, exec: bool) -> Self {
        self.exec = exec;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.interpreter.is_empty() {
            return Err(ErrorKind::Config("interpreter cannot be empty".to_string()).into());
        }

        if self.target.as_os_str().is_empty() {
            return Err(ErrorKind::Config("target cannot be empty".to_string()).into());
        }

        Ok(())
    }

    /// Build the environment this launch applies
    pub fn configuration(&self) -> Result<LaunchConfiguration, Error> {
        LaunchConfiguration::new(self.suppress_warnings, self.env.clone())
    }

    /// Directory holding the target, where the framework looks for its settings
    pub fn app_dir(&self) -> PathBuf {
        match self.target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }
}
