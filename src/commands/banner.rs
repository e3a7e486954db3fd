// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io;

use async_trait::async_trait;
use clap::{ArgMatches, Command};

use crate::banner::announce;
use crate::commands::Subcommand;
use crate::Error;

#[derive(Debug)]
pub struct Banner;

#[async_trait]
impl Subcommand for Banner {
    const NAME: &'static str = "banner";

    fn sub_command() -> Command {
        Command::new(Self::NAME).about("Print the startup banner")
    }

    async fn run(_args: &ArgMatches) -> Result<i32, Error> {
        announce(&mut io::stdout().lock())?;
        Ok(0)
    }
}
