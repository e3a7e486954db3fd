// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Launcher for framework-served web applications
//!
//! A launch runs in three stages, strictly in order: the launch configuration is applied to the
//! process environment, the startup banner is printed, then the application's runner is started and
//! its exit code becomes the launcher's.

pub mod banner;
pub mod commands;
pub mod config;
pub mod credentials;
mod error;
pub mod launcher;
pub mod spawn;

pub use error::{Error, ErrorKind};
