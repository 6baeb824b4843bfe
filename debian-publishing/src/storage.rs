// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Storage contracts.

The publishing pipeline writes through two narrow seams: [PublishedStorage]
is the archive tree being served, [PackagePool] is the content-addressed
store package files are hard-linked out of. Filesystem implementations live
in [crate::filesystem]; alternative backends only need to satisfy these
traits.
*/

use {
    crate::{checksum::ChecksumInfo, error::Result, package::Package},
    std::{
        io::Write,
        path::{Path, PathBuf},
    },
};

/// Join an archive prefix with a path inside the archive.
///
/// The root prefix `"."` collapses, so paths handed to storage never carry a
/// leading `./` component.
pub fn prefix_join(prefix: &str, path: &str) -> String {
    if prefix == "." {
        path.to_string()
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// A file being written into published storage.
///
/// In addition to the `Write` sink, the handle exposes the real path of the
/// file so that siblings (compressed variants, signatures) can be placed next
/// to it.
pub trait WritableFile: Write {
    /// Absolute path of the file on the backing storage.
    fn path(&self) -> &Path;
}

/// The archive tree packages are published into.
///
/// All paths are relative to the storage root and `/`-separated.
pub trait PublishedStorage {
    /// Create a directory and any missing parents. Pre-existing directories
    /// are not an error.
    fn mk_dir(&self, path: &str) -> Result<()>;

    /// Create (truncate) a file for writing.
    fn create_file(&self, path: &str) -> Result<Box<dyn WritableFile>>;

    /// Remove a directory tree.
    fn remove_dirs(&self, path: &str) -> Result<()>;

    /// Compute size and digests of a stored file.
    fn checksums_for_file(&self, path: &str) -> Result<ChecksumInfo>;

    /// Root directory of the served tree.
    fn public_path(&self) -> PathBuf;
}

/// The content-addressed store holding package files.
///
/// Pool files are immutable; publishing hard-links them into the served tree
/// and never copies or mutates them.
pub trait PackagePool {
    /// Link every file of `package` into
    /// `<prefix>/pool/<component>/<pool dir>/` under `storage`, recording the
    /// published locations back onto the package so its index stanza can
    /// reference them.
    fn link_from_pool(
        &self,
        storage: &dyn PublishedStorage,
        prefix: &str,
        component: &str,
        package: &mut Package,
    ) -> Result<()>;
}
