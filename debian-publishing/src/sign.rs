// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Release signing contract.

Signing is performed by an external collaborator (typically a GPG process or
agent). The pipeline only needs the two operations Debian clients expect:
a detached `Release.gpg` and a clearsigned `InRelease`.
*/

use {crate::error::Result, std::path::Path};

/// Produces archive signatures.
///
/// Publishing without a signer simply skips `Release.gpg` and `InRelease`.
pub trait Signer {
    /// Write a detached armored signature of `source` to `destination`.
    fn detached_sign(&self, source: &Path, destination: &Path) -> Result<()>;

    /// Write a clearsigned copy of `source` to `destination`.
    fn clear_sign(&self, source: &Path, destination: &Path) -> Result<()>;
}
