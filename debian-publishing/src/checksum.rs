// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Checksum computation.

Debian index files are announced in `Release` with their size and MD5, SHA-1,
and SHA-256 digests. [MultiDigester] computes all three in a single pass and
[ChecksumInfo] carries the result.
*/

use {
    md5::{Digest, Md5},
    sha1::Sha1,
    sha2::Sha256,
    std::{
        io::Read,
        path::Path,
    },
};

/// Size and hex digests describing a stored file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChecksumInfo {
    /// Size of the file in bytes.
    pub size: u64,
    /// Hex-encoded MD5 digest.
    pub md5: String,
    /// Hex-encoded SHA-1 digest.
    pub sha1: String,
    /// Hex-encoded SHA-256 digest.
    pub sha256: String,
}

impl ChecksumInfo {
    /// Compute checksums for a file on the local filesystem.
    ///
    /// The file is streamed; it is never held in memory whole.
    pub fn for_file(path: &Path) -> std::io::Result<Self> {
        let mut file = std::fs::File::open(path)?;
        let mut digester = MultiDigester::new();
        let mut buf = [0u8; 16384];

        loop {
            let size = file.read(&mut buf)?;
            if size == 0 {
                break;
            }

            digester.update(&buf[0..size]);
        }

        Ok(digester.finish())
    }

    /// Compute checksums for a byte slice.
    pub fn for_bytes(data: &[u8]) -> Self {
        let mut digester = MultiDigester::new();
        digester.update(data);

        digester.finish()
    }
}

/// A digester that simultaneously computes MD5, SHA-1, and SHA-256.
pub struct MultiDigester {
    size: u64,
    md5: Md5,
    sha1: Sha1,
    sha256: Sha256,
}

impl Default for MultiDigester {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiDigester {
    /// Construct a new instance with empty digest state.
    pub fn new() -> Self {
        Self {
            size: 0,
            md5: Md5::new(),
            sha1: Sha1::new(),
            sha256: Sha256::new(),
        }
    }

    /// Write content into the digesters.
    pub fn update(&mut self, data: &[u8]) {
        self.size += data.len() as u64;
        self.md5.update(data);
        self.sha1.update(data);
        self.sha256.update(data);
    }

    /// Finish digesting, consuming the instance.
    pub fn finish(self) -> ChecksumInfo {
        ChecksumInfo {
            size: self.size,
            md5: hex::encode(self.md5.finalize()),
            sha1: hex::encode(self.sha1.finalize()),
            sha256: hex::encode(self.sha256.finalize()),
        }
    }
}
