// Copyright 2019 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use tokio::runtime;
use tracing_subscriber::EnvFilter;

use litlaunch::commands::{self, Banner, Env, Run, Subcommand};
use litlaunch::Error;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // stdout belongs to the banner and the application
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = commands::app().get_matches();
    init_tracing();

    let runtime = runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .expect("Failed to initialize Tokio Runtime");

    let result: Result<i32, Error> = runtime.block_on(async move {
        match args.subcommand() {
            Some((Run::NAME, args)) => Run::run(args).await,
            Some((Env::NAME, args)) => Env::run(args).await,
            Some((Banner::NAME, args)) => Banner::run(args).await,
            None => Run::run(&args).await,
            Some((arg, _)) => Err(Error::from(format!("unexpected subcommand: {}", arg))),
        }
    });
    drop(runtime);

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", env!("CARGO_PKG_NAME"), e);
            std::process::exit(e.exit_code());
        }
    }
}
