// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Package model.

A [Package] carries the metadata needed to emit a `Packages` or `Sources`
index stanza and to place the package's files into the published pool. The
heavyweight parts (file list, dependency set, uncommon control fields) are
held as droppable state so that streaming a large snapshot does not
accumulate them.

Packages are loaded on demand: a [PackageRefList] names packages by their
persistent keys and [PackageList::from_ref_list] materializes them through a
[PackageCollection].
*/

use {
    crate::{
        checksum::ChecksumInfo,
        control::Stanza,
        error::{PublishError, Result},
        progress::Progress,
    },
    std::collections::HashSet,
};

/// A single file belonging to a package.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PackageFile {
    /// Base name of the file, e.g. `mars-invaders_1.03_amd64.deb`.
    pub filename: String,
    /// Path relative to the archive prefix once linked into the published
    /// pool. Empty until the package has been linked.
    pub published_path: String,
    /// Checksums of the file content.
    pub checksums: ChecksumInfo,
}

impl PackageFile {
    /// Construct a file entry that has not been published yet.
    pub fn new(filename: impl Into<String>, checksums: ChecksumInfo) -> Self {
        Self {
            filename: filename.into(),
            published_path: String::new(),
            checksums,
        }
    }
}

/// Inter-package relationship fields.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PackageDependencies {
    pub pre_depends: Vec<String>,
    pub depends: Vec<String>,
    pub recommends: Vec<String>,
    pub suggests: Vec<String>,
}

/// A binary or source package, described by its index metadata.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Package {
    name: String,
    version: String,
    architecture: String,
    /// `Source` field override when the source package name differs.
    source: Option<String>,
    /// Directory in the published tree holding this package's files.
    /// Set when the package is linked into the pool; used by `Sources`
    /// stanzas.
    directory: Option<String>,
    files: Option<Vec<PackageFile>>,
    deps: Option<PackageDependencies>,
    extra: Option<Stanza>,
}

impl Package {
    /// Construct a package from its identity fields.
    ///
    /// `architecture` may be the pseudo-architecture `source` for source
    /// packages.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        architecture: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            architecture: architecture.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn architecture(&self) -> &str {
        &self.architecture
    }

    /// Set the `Source` field for packages built from a differently named
    /// source package.
    pub fn set_source(&mut self, source: impl Into<String>) {
        self.source = Some(source.into());
    }

    pub fn set_files(&mut self, files: Vec<PackageFile>) {
        self.files = Some(files);
    }

    pub fn files(&self) -> Option<&[PackageFile]> {
        self.files.as_deref()
    }

    pub fn files_mut(&mut self) -> Option<&mut Vec<PackageFile>> {
        self.files.as_mut()
    }

    pub fn set_dependencies(&mut self, deps: PackageDependencies) {
        self.deps = Some(deps);
    }

    /// Attach control fields beyond the ones modeled explicitly.
    pub fn set_extra(&mut self, extra: Stanza) {
        self.extra = Some(extra);
    }

    /// Record the published directory for this package's files.
    pub fn set_directory(&mut self, directory: impl Into<String>) {
        self.directory = Some(directory.into());
    }

    /// Persistent key identifying this package.
    pub fn key(&self) -> Vec<u8> {
        format!("P{} {} {}", self.architecture, self.name, self.version).into_bytes()
    }

    /// Whether this is a source package.
    pub fn is_source(&self) -> bool {
        self.architecture == "source"
    }

    /// Whether the package belongs in the index for `arch`.
    ///
    /// `all` packages match every binary architecture but never `source`.
    pub fn matches_architecture(&self, arch: &str) -> bool {
        if self.architecture == "all" && arch != "source" {
            return true;
        }

        self.architecture == arch
    }

    /// Name of the source package these files belong to.
    pub fn source_name(&self) -> &str {
        self.source.as_deref().unwrap_or(&self.name)
    }

    /// Directory under `pool/<component>/` holding this package's files.
    ///
    /// Follows the archive convention: `lib<c>/<source>` for `lib`-prefixed
    /// source names, `<c>/<source>` otherwise.
    pub fn pool_directory(&self) -> String {
        let source = self.source_name();

        let prefix = if source.starts_with("lib") && source.len() >= 4 {
            &source[0..4]
        } else {
            &source[0..1]
        };

        format!("{}/{}", prefix, source)
    }

    /// Build the index stanza for this package.
    ///
    /// For binary packages this is a `Packages` paragraph with `Filename`,
    /// `Size`, and digest fields describing the pool file. For source
    /// packages it is a `Sources` paragraph with `Directory` and a multiline
    /// `Files` list. The package must have been linked into the pool first so
    /// that published paths are known.
    pub fn stanza(&self) -> Stanza {
        let mut stanza = Stanza::new();
        stanza.set("Package", self.name.clone());
        stanza.set("Version", self.version.clone());

        if let Some(source) = &self.source {
            stanza.set("Source", source.clone());
        }

        if self.is_source() {
            stanza.set("Architecture", "any");

            if let Some(directory) = &self.directory {
                stanza.set("Directory", directory.clone());
            }

            if let Some(files) = &self.files {
                let mut value = String::from("\n");
                for file in files {
                    value.push_str(&format!(
                        " {} {} {}\n",
                        file.checksums.md5, file.checksums.size, file.filename
                    ));
                }
                stanza.set("Files", value);
            }
        } else {
            stanza.set("Architecture", self.architecture.clone());

            if let Some(deps) = &self.deps {
                for (field, list) in [
                    ("Pre-Depends", &deps.pre_depends),
                    ("Depends", &deps.depends),
                    ("Recommends", &deps.recommends),
                    ("Suggests", &deps.suggests),
                ] {
                    if !list.is_empty() {
                        stanza.set(field, list.join(", "));
                    }
                }
            }

            if let Some(file) = self.files.as_ref().and_then(|files| files.first()) {
                stanza.set("Filename", file.published_path.clone());
                stanza.set("Size", file.checksums.size.to_string());
                stanza.set("MD5sum", file.checksums.md5.clone());
                stanza.set("SHA1", file.checksums.sha1.clone());
                stanza.set("SHA256", file.checksums.sha256.clone());
            }
        }

        if let Some(extra) = &self.extra {
            for field in extra.iter_fields() {
                if !stanza.has(field.name()) {
                    stanza.set(field.name().to_string(), field.value().to_string());
                }
            }
        }

        stanza
    }

    /// Release droppable per-package state after the stanza has been
    /// serialized. Caps memory when streaming large snapshots.
    pub fn drop_transient_data(&mut self) {
        self.files = None;
        self.deps = None;
        self.extra = None;
    }
}

/// Lookup contract for the persistent package store.
pub trait PackageCollection {
    /// Load a package by its persistent key.
    fn by_key(&self, key: &[u8]) -> Result<Package>;
}

/// An ordered list of package references (persistent keys).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PackageRefList {
    refs: Vec<Vec<u8>>,
}

impl PackageRefList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a reference to a package.
    pub fn push(&mut self, key: Vec<u8>) {
        self.refs.push(key);
    }

    /// Append a reference derived from a package.
    pub fn push_package(&mut self, package: &Package) {
        self.refs.push(package.key());
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.refs.iter().map(|r| r.as_slice())
    }
}

/// A materialized list of packages.
#[derive(Clone, Debug, Default)]
pub struct PackageList {
    packages: Vec<Package>,
}

impl PackageList {
    /// Materialize a package list by resolving every reference through the
    /// package collection.
    ///
    /// A missing package aborts the load; a snapshot must never reference
    /// packages that are gone from the store.
    pub fn from_ref_list(
        refs: &PackageRefList,
        collection: &dyn PackageCollection,
        progress: Option<&dyn Progress>,
    ) -> Result<Self> {
        if let Some(progress) = progress {
            progress.init_bar(refs.len() as u64);
        }

        let mut packages = Vec::with_capacity(refs.len());

        for key in refs.iter() {
            packages.push(collection.by_key(key)?);

            if let Some(progress) = progress {
                progress.add_bar(1);
            }
        }

        if let Some(progress) = progress {
            progress.shutdown_bar();
        }

        Ok(Self { packages })
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Unique architectures present in the list.
    ///
    /// The `all` pseudo-architecture never appears in the result; `source`
    /// appears only when `include_source` is set. Order follows first
    /// appearance.
    pub fn architectures(&self, include_source: bool) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for package in &self.packages {
            let arch = package.architecture();

            if arch == "all" || (arch == "source" && !include_source) {
                continue;
            }

            if seen.insert(arch.to_string()) {
                result.push(arch.to_string());
            }
        }

        result
    }

    pub fn iter(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Package> {
        self.packages.iter_mut()
    }
}

impl FromIterator<Package> for PackageList {
    fn from_iter<I: IntoIterator<Item = Package>>(iter: I) -> Self {
        Self {
            packages: iter.into_iter().collect(),
        }
    }
}

/// Convenience implementation used by tests and embedders: an in-memory
/// package store keyed by package key.
#[derive(Debug, Default)]
pub struct MemoryPackageCollection {
    packages: std::collections::HashMap<Vec<u8>, Package>,
}

impl MemoryPackageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a package to the store, indexed under its key.
    pub fn add(&mut self, package: Package) {
        self.packages.insert(package.key(), package);
    }
}

impl PackageCollection for MemoryPackageCollection {
    fn by_key(&self, key: &[u8]) -> Result<Package> {
        self.packages.get(key).cloned().ok_or_else(|| {
            PublishError::PackageNotFound(String::from_utf8_lossy(key).into_owned())
        })
    }
}
