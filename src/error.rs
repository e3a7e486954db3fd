// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit code used by shells when a command cannot be found
pub const EXIT_NOT_FOUND: i32 = 127;
/// Exit code used by shells when a command is found but cannot be executed
pub const EXIT_NOT_EXECUTABLE: i32 = 126;
/// Exit code for a missing target module, matching the interpreter's "can't open file"
pub const EXIT_TARGET_MISSING: i32 = 2;
/// Exit code for every other startup failure
pub const EXIT_FAILURE: i32 = 1;

#[derive(Error, Debug)]
pub enum ErrorKind {
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("nix error: {0}")]
    NixError(#[from] nix::Error),
    #[error("invalid launch file: {0}")]
    ConfigParse(#[from] toml::de::Error),
    #[error("invalid launch configuration: {0}")]
    Config(String),
    #[error("interpreter not found: {0}")]
    InterpreterNotFound(String),
    #[error("interpreter is not executable: {0}")]
    NotExecutable(String),
    #[error("target application not found: {}", .0.display())]
    TargetNotFound(PathBuf),
    #[error("an error occured: {0}")]
    ErrorMsg(String),
    #[error("an error occured: {0}")]
    ErrorStr(&'static str),
}

impl From<&'static str> for ErrorKind {
    fn from(err: &'static str) -> Self {
        ErrorKind::ErrorStr(err)
    }
}

impl From<String> for ErrorKind {
    fn from(err: String) -> Self {
        ErrorKind::ErrorMsg(err)
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct Error(ErrorKind);

impl Error {
    fn from_kind(kind: ErrorKind) -> Self {
        Self(kind)
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.0
    }

    /// The process exit code this error should be reported with
    pub fn exit_code(&self) -> i32 {
        match self.0 {
            ErrorKind::InterpreterNotFound(_) => EXIT_NOT_FOUND,
            ErrorKind::NotExecutable(_) => EXIT_NOT_EXECUTABLE,
            ErrorKind::TargetNotFound(_) => EXIT_TARGET_MISSING,
            _ => EXIT_FAILURE,
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<ErrorKind>,
{
    fn from(err: E) -> Self {
        Self::from_kind(err.into())
    }
}
