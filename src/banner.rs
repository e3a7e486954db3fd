// Copyright 2019-2020 Benjamin Fry <benjaminfry@me.com>
//
// Licensed under the Apache License, Version 2.0, <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

use std::io::Write;

use crate::Error;

pub const APP_URL: &str = "http://localhost:8501";

const SEPARATOR: &str = "==================================================";

/// The startup banner, identical on every call
pub fn banner() -> String {
    format!(
        "\n{sep}\nSTREAMLIT APP RUNNING AT: {url}\n{sep}\n\n",
        sep = SEPARATOR,
        url = APP_URL
    )
}

/// Write the banner and flush, so it lands before anything a child writes
pub fn announce<W: Write>(out: &mut W) -> Result<(), Error> {
    out.write_all(banner().as_bytes())?;
    out.flush()?;
    Ok(())
}
