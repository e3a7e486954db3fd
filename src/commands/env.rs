// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::{self, Write};

use async_trait::async_trait;
use clap::{ArgMatches, Command};

use crate::commands::{config_options, Subcommand};
use crate::Error;

/// Print the launch configuration as shell exports
#[derive(Debug)]
pub struct Env;

#[async_trait]
impl Subcommand for Env {
    const NAME: &'static str = "env";

    fn sub_command() -> Command {
        Command::new(Self::NAME).about("Print the environment the application is launched with")
    }

    async fn run(args: &ArgMatches) -> Result<i32, Error> {
        let config = config_options(args)?.configuration()?;

        let stdout = io::stdout();
        let mut out = stdout.lock();
        out.write_all(config.exports().as_bytes())?;
        out.flush()?;

        Ok(0)
    }
}
