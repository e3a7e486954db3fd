// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! First-run settings the framework would otherwise prompt for

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::Error;

pub const SETTINGS_DIR: &str = ".streamlit";
pub const CREDENTIALS_FILE: &str = "credentials.toml";
pub const CREDENTIALS: &str = "[general]\nemail = \"\"\n";

/// Create the credentials file with an empty email under `app_dir`
///
/// An existing file is left untouched. Returns the path when a file was written.
pub fn ensure_credentials(app_dir: &Path) -> Result<Option<PathBuf>, Error> {
    let dir = app_dir.join(SETTINGS_DIR);
    fs::create_dir_all(&dir)?;

    let path = dir.join(CREDENTIALS_FILE);
    let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            debug!("credentials already present: {}", path.display());
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    file.write_all(CREDENTIALS.as_bytes())?;
    info!("wrote credentials: {}", path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_once() {
        let dir = tempfile::tempdir().unwrap();

        let written = ensure_credentials(dir.path()).unwrap();
        let path = dir.path().join(".streamlit").join("credentials.toml");
        assert_eq!(written.as_deref(), Some(path.as_path()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[general]\nemail = \"\"\n");

        assert_eq!(ensure_credentials(dir.path()).unwrap(), None);
    }

    #[test]
    fn test_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = dir.path().join(".streamlit");
        fs::create_dir(&settings).unwrap();
        fs::write(settings.join("credentials.toml"), "[general]\nemail = \"a@b.c\"\n").unwrap();

        assert_eq!(ensure_credentials(dir.path()).unwrap(), None);
        assert_eq!(
            fs::read_to_string(settings.join("credentials.toml")).unwrap(),
            "[general]\nemail = \"a@b.c\"\n"
        );
    }
}
