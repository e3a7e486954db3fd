// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io;

use async_trait::async_trait;
use clap::{ArgMatches, Command};
use tracing::info;

use crate::commands::{config_options, launch_options, Subcommand};
use crate::launcher::Launcher;
use crate::Error;

/// Configure, announce and launch the application
///
/// Rules:
/// - runs in the foreground, the application owns the terminal
/// - exits with the application's exit code
#[derive(Debug)]
pub struct Run;

#[async_trait]
impl Subcommand for Run {
    const NAME: &'static str = "run";

    fn sub_command() -> Command {
        Command::new(Self::NAME).about("Launch the application (the default)")
    }

    async fn run(args: &ArgMatches) -> Result<i32, Error> {
        let options = launch_options(config_options(args)?, args);
        info!("launching {}", options.target.display());

        let launcher = Launcher::new(options)?.configure()?;

        let stdout = io::stdout();
        let launcher = launcher.announce(&mut stdout.lock())?;

        launcher.launch().await
    }
}
