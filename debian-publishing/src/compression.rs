// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Index file compression.

Published index files (`Packages`, `Sources`) are served in plain form and as
`.gz` and `.bz2` siblings so that clients can pick the cheapest transfer.
[compress_file] produces both siblings next to a freshly written plain file.
*/

use std::{
    io,
    path::{Path, PathBuf},
};

/// Compression formats applied to published index files.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Compression {
    /// Gzip compression (`.gz` extension).
    Gzip,
    /// Bzip2 compression (`.bz2` extension).
    Bzip2,
}

impl Compression {
    /// Filename extension for files compressed in this format, with leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
            Self::Bzip2 => ".bz2",
        }
    }
}

fn sibling_path(path: &Path, compression: Compression) -> PathBuf {
    let mut sibling = path.as_os_str().to_owned();
    sibling.push(compression.extension());

    PathBuf::from(sibling)
}

/// Produce the `.gz` and `.bz2` siblings of a plain file.
///
/// The source file is re-read once per format; each sibling is written next
/// to it with the format's extension appended. The source file is left
/// untouched.
pub fn compress_file(path: &Path) -> io::Result<()> {
    let mut source = std::fs::File::open(path)?;
    let mut encoder = flate2::write::GzEncoder::new(
        std::fs::File::create(sibling_path(path, Compression::Gzip))?,
        flate2::Compression::default(),
    );
    io::copy(&mut source, &mut encoder)?;
    encoder.finish()?;

    let mut source = std::fs::File::open(path)?;
    let mut encoder = bzip2::write::BzEncoder::new(
        std::fs::File::create(sibling_path(path, Compression::Bzip2))?,
        bzip2::Compression::default(),
    );
    io::copy(&mut source, &mut encoder)?;
    encoder.finish()?;

    Ok(())
}
