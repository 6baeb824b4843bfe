// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Filesystem-backed storage.

[FilesystemPublishedStorage] serves an archive tree from a local directory,
suitable for exposing through any static HTTP server.
[FilesystemPackagePool] is the content-addressed package store; published
trees hard-link out of it, so a package published under many distributions
occupies disk space once.
*/

use {
    crate::{
        checksum::ChecksumInfo,
        error::{PublishError, Result},
        package::Package,
        storage::{prefix_join, PackagePool, PublishedStorage, WritableFile},
    },
    std::{
        io::Write,
        path::{Path, PathBuf},
    },
};

fn io_path<P: AsRef<Path>>(path: P) -> impl FnOnce(std::io::Error) -> PublishError {
    let path = path.as_ref().display().to_string();
    move |e| PublishError::IoPath(path, e)
}

/// A file created inside [FilesystemPublishedStorage].
pub struct FilesystemFile {
    path: PathBuf,
    file: std::fs::File,
}

impl Write for FilesystemFile {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.file.flush()
    }
}

impl WritableFile for FilesystemFile {
    fn path(&self) -> &Path {
        &self.path
    }
}

/// A published archive tree backed by a local directory.
#[derive(Clone, Debug)]
pub struct FilesystemPublishedStorage {
    root_dir: PathBuf,
}

impl FilesystemPublishedStorage {
    /// Construct an instance bound to the root directory specified.
    ///
    /// The directory does not need to exist.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root_dir: path.as_ref().to_path_buf(),
        }
    }
}

impl PublishedStorage for FilesystemPublishedStorage {
    fn mk_dir(&self, path: &str) -> Result<()> {
        let dir = self.root_dir.join(path);

        std::fs::create_dir_all(&dir).map_err(io_path(&dir))
    }

    fn create_file(&self, path: &str) -> Result<Box<dyn WritableFile>> {
        let dest = self.root_dir.join(path);

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(io_path(parent))?;
        }

        let file = std::fs::File::create(&dest).map_err(io_path(&dest))?;

        Ok(Box::new(FilesystemFile { path: dest, file }))
    }

    fn remove_dirs(&self, path: &str) -> Result<()> {
        let dir = self.root_dir.join(path);

        std::fs::remove_dir_all(&dir).map_err(io_path(&dir))
    }

    fn checksums_for_file(&self, path: &str) -> Result<ChecksumInfo> {
        let file = self.root_dir.join(path);

        ChecksumInfo::for_file(&file).map_err(io_path(&file))
    }

    fn public_path(&self) -> PathBuf {
        self.root_dir.clone()
    }
}

/// Content-addressed store of package files on the local filesystem.
///
/// Files are addressed as `<md5[0..2]>/<md5[2..4]>/<filename>`, which keeps
/// directory fan-out flat regardless of archive size.
#[derive(Clone, Debug)]
pub struct FilesystemPackagePool {
    root_dir: PathBuf,
}

impl FilesystemPackagePool {
    /// Construct an instance bound to the pool root directory.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            root_dir: path.as_ref().to_path_buf(),
        }
    }

    /// Location of a file inside the pool.
    pub fn path(&self, filename: &str, md5: &str) -> PathBuf {
        self.root_dir.join(&md5[0..2]).join(&md5[2..4]).join(filename)
    }

    /// Copy file content into the pool, returning its checksums.
    pub fn import(&self, filename: &str, data: &[u8]) -> Result<ChecksumInfo> {
        let checksums = ChecksumInfo::for_bytes(data);
        let dest = self.path(filename, &checksums.md5);

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(io_path(parent))?;
        }

        std::fs::write(&dest, data).map_err(io_path(&dest))?;

        Ok(checksums)
    }
}

impl PackagePool for FilesystemPackagePool {
    fn link_from_pool(
        &self,
        storage: &dyn PublishedStorage,
        prefix: &str,
        component: &str,
        package: &mut Package,
    ) -> Result<()> {
        let pool_dir = package.pool_directory();
        let relative_dir = format!("pool/{}/{}", component, pool_dir);
        let is_source = package.is_source();

        let files = package
            .files_mut()
            .ok_or(PublishError::PackageFilesMissing)?;

        for file in files.iter_mut() {
            let source = self.path(&file.filename, &file.checksums.md5);

            let dest_dir = storage
                .public_path()
                .join(prefix_join(prefix, &relative_dir));
            std::fs::create_dir_all(&dest_dir).map_err(io_path(&dest_dir))?;

            let dest = dest_dir.join(&file.filename);

            // Republishing relinks the same content; stale links are replaced.
            if dest.exists() {
                std::fs::remove_file(&dest).map_err(io_path(&dest))?;
            }
            std::fs::hard_link(&source, &dest).map_err(io_path(&dest))?;

            file.published_path = format!("{}/{}", relative_dir, file.filename);
        }

        if is_source {
            package.set_directory(relative_dir);
        }

        Ok(())
    }
}
