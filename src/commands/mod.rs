// Copyright 2019 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

mod banner;
mod env;
mod run;

pub use self::banner::Banner;
pub use self::env::Env;
pub use self::run::Run;

use std::path::PathBuf;

use async_trait::async_trait;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::config::{LaunchFile, LaunchOptions};
use crate::Error;

pub const CONFIG: &str = "config";
pub const SUPPRESS_WARNINGS: &str = "suppress-warnings";
pub const INTERPRETER: &str = "interpreter";
pub const RUNNER: &str = "runner";
pub const TARGET: &str = "target";
pub const SKIP_CREDENTIALS: &str = "skip-credentials";
pub const EXEC: &str = "exec";
pub const APP_ARGS: &str = "app-args";

/// A trait to define common construction of a subcommand
#[async_trait]
pub trait Subcommand: Sized + Send + 'static {
    const NAME: &'static str;

    fn sub_command() -> Command;

    /// Returns the exit code for the launcher
    async fn run(args: &ArgMatches) -> Result<i32, Error>;
}

pub trait SetupClapApp {
    fn setup_clap_app(self) -> Self;
    fn config_opts(self) -> Self;
    fn launch_opts(self) -> Self;
}

impl SetupClapApp for Command {
    fn setup_clap_app(self) -> Self {
        self.version(env!("CARGO_PKG_VERSION"))
            .author(env!("CARGO_PKG_AUTHORS"))
    }

    fn config_opts(self) -> Self {
        self.arg(
            Arg::new(CONFIG)
                .short('c')
                .long(CONFIG)
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML launch file, command line options take precedence"),
        )
        .arg(
            Arg::new(SUPPRESS_WARNINGS)
                .long(SUPPRESS_WARNINGS)
                .action(ArgAction::SetTrue)
                .help("also switch off the framework's development mode and its warnings"),
        )
    }

    fn launch_opts(self) -> Self {
        self.arg(
            Arg::new(INTERPRETER)
                .long(INTERPRETER)
                .value_name("PROGRAM")
                .help("program that runs the application [default: streamlit]"),
        )
        .arg(
            Arg::new(RUNNER)
                .long(RUNNER)
                .value_name("SUBCOMMAND")
                .help("subcommand of the interpreter that runs the target, empty for none [default: run]"),
        )
        .arg(
            Arg::new(TARGET)
                .long(TARGET)
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .help("application entry point [default: app.py]"),
        )
        .arg(
            Arg::new(SKIP_CREDENTIALS)
                .long(SKIP_CREDENTIALS)
                .action(ArgAction::SetTrue)
                .help("do not create the framework's credentials file"),
        )
        .arg(
            Arg::new(EXEC)
                .long(EXEC)
                .action(ArgAction::SetTrue)
                .help("replace the launcher with the application instead of waiting on it"),
        )
        .arg(
            Arg::new(APP_ARGS)
                .value_name("APP_ARGS")
                .num_args(1..)
                .last(true)
                .help("arguments passed through to the application"),
        )
    }
}

/// The full command tree, running without a subcommand is the same as `run`
pub fn app() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .setup_clap_app()
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .args_conflicts_with_subcommands(true)
        .config_opts()
        .launch_opts()
        .subcommand(Run::sub_command().setup_clap_app().config_opts().launch_opts())
        .subcommand(Env::sub_command().setup_clap_app().config_opts())
        .subcommand(Banner::sub_command().setup_clap_app())
}

/// Defaults, then the launch file, then the flags from `config_opts`
pub fn config_options(args: &ArgMatches) -> Result<LaunchOptions, Error> {
    let mut options = LaunchOptions::new();

    if let Some(path) = args.get_one::<PathBuf>(CONFIG) {
        options = options.merge_file(LaunchFile::read(path)?);
    }

    if args.get_flag(SUPPRESS_WARNINGS) {
        options = options.with_suppress_warnings(true);
    }

    Ok(options)
}

/// Layer the flags from `launch_opts` over the options
pub fn launch_options(mut options: LaunchOptions, args: &ArgMatches) -> LaunchOptions {
    if let Some(interpreter) = args.get_one::<String>(INTERPRETER) {
        options = options.with_interpreter(interpreter.as_str());
    }
    if let Some(runner) = args.get_one::<String>(RUNNER) {
        options = options.with_runner(runner.as_str());
    }
    if let Some(target) = args.get_one::<PathBuf>(TARGET) {
        options = options.with_target(target.clone());
    }
    if let Some(app_args) = args.get_many::<String>(APP_ARGS) {
        options = options.with_args(app_args.cloned());
    }
    if args.get_flag(SKIP_CREDENTIALS) {
        options = options.with_credentials(false);
    }
    if args.get_flag(EXEC) {
        options = options.with_exec(true);
    }

    options
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn resolve(argv: &[&str]) -> LaunchOptions {
        let matches = app().try_get_matches_from(argv).unwrap();
        let args = match matches.subcommand() {
            Some((Run::NAME, sub)) => sub.clone(),
            _ => matches,
        };
        launch_options(config_options(&args).unwrap(), &args)
    }

    #[test]
    fn test_app_definition() {
        app().debug_assert();
    }

    #[test]
    fn test_defaults_without_subcommand() {
        assert_eq!(resolve(&["litlaunch"]), LaunchOptions::default());
        assert_eq!(resolve(&["litlaunch", "run"]), LaunchOptions::default());
    }

    #[test]
    fn test_flags() {
        let options = resolve(&[
            "litlaunch",
            "run",
            "--interpreter",
            "python3",
            "--runner",
            "",
            "--target",
            "main.py",
            "--skip-credentials",
            "--exec",
            "--suppress-warnings",
            "--",
            "--server.port",
            "8502",
        ]);

        assert_eq!(options.interpreter, "python3");
        assert_eq!(options.runner, None);
        assert_eq!(options.target, PathBuf::from("main.py"));
        assert_eq!(options.args, vec!["--server.port", "8502"]);
        assert!(!options.write_credentials);
        assert!(options.exec);
        assert!(options.suppress_warnings);
    }

    #[test]
    fn test_cli_overrides_launch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("launch.toml");
        fs::write(&path, "interpreter = \"python3\"\ntarget = \"main.py\"\n").unwrap();
        let path = path.to_str().unwrap();

        let options = resolve(&["litlaunch", "--config", path, "--target", "other.py"]);
        assert_eq!(options.interpreter, "python3");
        assert_eq!(options.target, PathBuf::from("other.py"));
    }

    #[test]
    fn test_root_args_conflict_with_subcommands() {
        assert!(app()
            .try_get_matches_from(&["litlaunch", "--exec", "banner"])
            .is_err());
    }
}
