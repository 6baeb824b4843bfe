// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Published archives.

A [PublishedArchive] is the http/ftp representation of a snapshot or local
repository as a Debian archive tree: `dists/<distribution>` index files plus
packages hard-linked into a shared `pool/`. [PublishedArchiveCollection] is
the persistent registry of such archives, enforcing the
`(prefix, distribution)` identity invariant and accounting for archives that
share an on-disk prefix when one of them is removed.
*/

use {
    crate::{
        checksum::ChecksumInfo,
        compression::compress_file,
        control::Stanza,
        database::KeyValueStore,
        error::{PublishError, Result},
        package::PackageList,
        progress::Progress,
        sign::Signer,
        source::{CollectionFactory, LocalRepo, RemoteRepo, Snapshot, SnapshotSourceKind},
        storage::{prefix_join, PackagePool, PublishedStorage},
    },
    chrono::Utc,
    serde::{Deserialize, Serialize},
    std::{
        collections::{BTreeMap, HashSet, VecDeque},
        io::{BufWriter, Write},
    },
    uuid::Uuid,
};

/// Format of the `Date` field in `Release` files.
pub const DATE_FORMAT: &str = "%a, %-d %b %Y %H:%M:%S %Z";

/// What kind of entity an archive publishes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SourceKind {
    Snapshot,
    Local,
}

impl SourceKind {
    /// Stable string form used by the persistent record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Snapshot => "snapshot",
            Self::Local => "local",
        }
    }
}

/// The entity an archive publishes: a snapshot or a local repository.
#[derive(Clone, Debug)]
pub enum ArchiveSource {
    Snapshot(Snapshot),
    Local(LocalRepo),
}

impl ArchiveSource {
    fn kind(&self) -> SourceKind {
        match self {
            Self::Snapshot(_) => SourceKind::Snapshot,
            Self::Local(_) => SourceKind::Local,
        }
    }

    fn uuid(&self) -> &str {
        match self {
            Self::Snapshot(snapshot) => snapshot.uuid(),
            Self::Local(repo) => repo.uuid(),
        }
    }
}

impl std::fmt::Display for ArchiveSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Snapshot(snapshot) => snapshot.fmt(f),
            Self::Local(repo) => repo.fmt(f),
        }
    }
}

/// Lexically clean a `/`-separated path.
///
/// Collapses repeated separators, resolves `.` and `..` components without
/// touching the filesystem, and returns `.` for an empty relative result.
fn clean_path(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                match out.last() {
                    Some(&"..") | None => {
                        if !rooted {
                            out.push("..");
                        }
                    }
                    Some(_) => {
                        out.pop();
                    }
                }
            }
            _ => out.push(segment),
        }
    }

    let joined = out.join("/");

    if rooted {
        format!("/{}", joined)
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}

/// Normalize and validate an archive prefix.
///
/// Cleaned, then stripped of a single leading and trailing slash, then
/// cleaned again. `.` denotes the storage root. Segments that would collide
/// with archive structure (`..`, `dists`, `pool`) are rejected.
fn normalize_prefix(prefix: &str) -> Result<String> {
    let mut prefix = clean_path(prefix);

    if let Some(stripped) = prefix.strip_prefix('/') {
        prefix = stripped.to_string();
    }
    if let Some(stripped) = prefix.strip_suffix('/') {
        prefix = stripped.to_string();
    }

    let prefix = clean_path(&prefix);

    for segment in prefix.split('/') {
        if segment == ".." || segment == "dists" || segment == "pool" {
            return Err(PublishError::InvalidPrefix(prefix));
        }
    }

    Ok(prefix)
}

/// A node of the source graph during the guessing walk.
enum WalkNode {
    Snapshot(Snapshot),
    Local(LocalRepo),
    Remote(RemoteRepo),
}

impl WalkNode {
    fn visit_key(&self) -> (&'static str, String) {
        match self {
            Self::Snapshot(snapshot) => ("snapshot", snapshot.uuid().to_string()),
            Self::Local(repo) => ("local", repo.uuid().to_string()),
            Self::Remote(repo) => ("repo", repo.uuid().to_string()),
        }
    }
}

/// Walk from a publishing source back to its roots, collecting the default
/// distributions and components the roots advertise.
///
/// Snapshots are interior nodes; local and remote repos are roots. Entities
/// that no longer exist in their collection are skipped. A visited set keyed
/// by `(kind, uuid)` guards against reference cycles.
fn walk_source_roots(
    source: &ArchiveSource,
    factory: &dyn CollectionFactory,
) -> (Vec<String>, Vec<String>) {
    let mut frontier: VecDeque<WalkNode> = VecDeque::new();
    let mut visited: HashSet<(&'static str, String)> = HashSet::new();
    let mut root_distributions = Vec::new();
    let mut root_components = Vec::new();

    frontier.push_back(match source {
        ArchiveSource::Snapshot(snapshot) => WalkNode::Snapshot(snapshot.clone()),
        ArchiveSource::Local(repo) => WalkNode::Local(repo.clone()),
    });

    while let Some(head) = frontier.pop_front() {
        if !visited.insert(head.visit_key()) {
            continue;
        }

        match head {
            WalkNode::Snapshot(snapshot) => {
                for uuid in &snapshot.source_uuids {
                    match snapshot.source_kind {
                        SnapshotSourceKind::Repo => {
                            if let Ok(repo) = factory.remote_repo_collection().by_uuid(uuid) {
                                frontier.push_back(WalkNode::Remote(repo));
                            }
                        }
                        SnapshotSourceKind::Local => {
                            if let Ok(repo) = factory.local_repo_collection().by_uuid(uuid) {
                                frontier.push_back(WalkNode::Local(repo));
                            }
                        }
                        SnapshotSourceKind::Snapshot => {
                            if let Ok(snap) = factory.snapshot_collection().by_uuid(uuid) {
                                frontier.push_back(WalkNode::Snapshot(snap));
                            }
                        }
                    }
                }
            }
            WalkNode::Local(repo) => {
                if !repo.default_distribution.is_empty() {
                    root_distributions.push(repo.default_distribution.clone());
                }
                if !repo.default_component.is_empty() {
                    root_components.push(repo.default_component.clone());
                }
            }
            WalkNode::Remote(repo) => {
                if !repo.distribution.is_empty() {
                    root_distributions.push(repo.distribution.clone());
                }
                root_components.extend(repo.components.iter().cloned());
            }
        }
    }

    (root_distributions, root_components)
}

/// Persistent record layout.
///
/// Field names are fixed by the on-disk format; the source UUID keeps its
/// legacy name `SnapshotUUID` from the era when only snapshots could be
/// published, and `SourceKind` may be absent in old records.
#[derive(Debug, Deserialize, Serialize)]
struct ArchiveRecord {
    #[serde(rename = "UUID")]
    uuid: String,
    #[serde(rename = "Prefix")]
    prefix: String,
    #[serde(rename = "Distribution")]
    distribution: String,
    #[serde(rename = "Component")]
    component: String,
    #[serde(rename = "Architectures")]
    architectures: Vec<String>,
    #[serde(rename = "SourceKind", default)]
    source_kind: String,
    #[serde(rename = "SnapshotUUID")]
    source_uuid: String,
}

fn wrap(err: impl Into<PublishError>, context: fn(Box<PublishError>) -> PublishError) -> PublishError {
    context(Box::new(err.into()))
}

/// A snapshot or local repository published as a Debian archive tree.
#[derive(Clone, Debug)]
pub struct PublishedArchive {
    uuid: String,
    prefix: String,
    distribution: String,
    component: String,
    architectures: Vec<String>,
    source_kind: SourceKind,
    source_uuid: String,
    /// Resolved source entity; absent until [PublishedArchiveCollection::load_complete].
    source: Option<ArchiveSource>,
}

impl PublishedArchive {
    /// Construct a new published archive.
    ///
    /// `prefix` is normalized and validated. When `distribution` or
    /// `component` is empty, the source graph is walked back to its root
    /// repositories to guess them: the distribution must be unambiguous,
    /// the component falls back to `main`.
    pub fn new(
        prefix: &str,
        distribution: &str,
        component: &str,
        architectures: Vec<String>,
        source: ArchiveSource,
        factory: &dyn CollectionFactory,
    ) -> Result<Self> {
        let prefix = normalize_prefix(prefix)?;

        let mut distribution = distribution.to_string();
        let mut component = component.to_string();

        if distribution.is_empty() || component.is_empty() {
            let (mut root_distributions, mut root_components) =
                walk_source_roots(&source, factory);

            if distribution.is_empty() {
                root_distributions.sort();

                if !root_distributions.is_empty()
                    && root_distributions.first() == root_distributions.last()
                {
                    distribution = root_distributions.remove(0);
                } else {
                    return Err(PublishError::AmbiguousDistribution);
                }
            }

            if component.is_empty() {
                root_components.sort();

                if !root_components.is_empty()
                    && root_components.first() == root_components.last()
                {
                    component = root_components.remove(0);
                } else {
                    component = "main".to_string();
                }
            }
        }

        Ok(Self {
            uuid: Uuid::new_v4().to_string(),
            prefix,
            distribution,
            component,
            architectures,
            source_kind: source.kind(),
            source_uuid: source.uuid().to_string(),
            source: Some(source),
        })
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn distribution(&self) -> &str {
        &self.distribution
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    /// Architectures published, in sorted order once a publish has run.
    pub fn architectures(&self) -> &[String] {
        &self.architectures
    }

    pub fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    pub fn source_uuid(&self) -> &str {
        &self.source_uuid
    }

    /// Persistent key identifying this archive.
    ///
    /// `(prefix, distribution)` is the natural identity; the key embeds both.
    pub fn key(&self) -> Vec<u8> {
        format!("U{}>>{}", self.prefix, self.distribution).into_bytes()
    }

    /// Serialize to the persistent record form.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let record = ArchiveRecord {
            uuid: self.uuid.clone(),
            prefix: self.prefix.clone(),
            distribution: self.distribution.clone(),
            component: self.component.clone(),
            architectures: self.architectures.clone(),
            source_kind: self.source_kind.as_str().to_string(),
            source_uuid: self.source_uuid.clone(),
        };

        Ok(rmp_serde::encode::to_vec_named(&record)?)
    }

    /// Deserialize from the persistent record form.
    ///
    /// Records written before local repositories could be published carry no
    /// `SourceKind`; those decode as [SourceKind::Snapshot].
    pub fn decode(data: &[u8]) -> Result<Self> {
        let record: ArchiveRecord = rmp_serde::from_slice(data)?;

        let source_kind = match record.source_kind.as_str() {
            "" | "snapshot" => SourceKind::Snapshot,
            "local" => SourceKind::Local,
            other => return Err(PublishError::UnknownSourceKind(other.to_string())),
        };

        Ok(Self {
            uuid: record.uuid,
            prefix: record.prefix,
            distribution: record.distribution,
            component: record.component,
            architectures: record.architectures,
            source_kind,
            source_uuid: record.source_uuid,
            source: None,
        })
    }

    /// The resolved source entity, when attached.
    pub fn source(&self) -> Option<&ArchiveSource> {
        self.source.as_ref()
    }

    /// Attach a resolved source entity.
    ///
    /// The entity must match the recorded source kind and UUID; the registry's
    /// [PublishedArchiveCollection::load_complete] is the usual caller.
    pub fn set_source(&mut self, source: ArchiveSource) {
        self.source = Some(source);
    }

    /// Materialize the archive: link packages into the pool, generate
    /// per-architecture index files, and write the signed `Release`.
    ///
    /// The source must be attached (construction does this; archives loaded
    /// from the registry need `load_complete` first). When the archive was
    /// created without an explicit architecture list, the list is computed
    /// from the packages on first publish and retained.
    pub fn publish(
        &mut self,
        package_pool: &dyn PackagePool,
        storage: &dyn PublishedStorage,
        factory: &dyn CollectionFactory,
        signer: Option<&dyn Signer>,
        progress: Option<&dyn Progress>,
    ) -> Result<()> {
        storage.mk_dir(&prefix_join(&self.prefix, "pool"))?;

        let base_path = prefix_join(&self.prefix, &format!("dists/{}", self.distribution));
        storage.mk_dir(&base_path)?;

        if let Some(progress) = progress {
            progress.printf("Loading packages...");
        }

        let ref_list = match self.source.as_ref().ok_or(PublishError::SourceNotLoaded)? {
            ArchiveSource::Snapshot(snapshot) => snapshot.ref_list(),
            ArchiveSource::Local(repo) => repo.ref_list(),
        };

        let mut list = PackageList::from_ref_list(ref_list, factory.package_collection(), progress)
            .map_err(|e| wrap(e, PublishError::LoadPackages))?;

        if list.is_empty() {
            return Err(PublishError::EmptySource);
        }

        if self.architectures.is_empty() {
            self.architectures = list.architectures(true);
        }
        if self.architectures.is_empty() {
            return Err(PublishError::NoArchitectures);
        }
        self.architectures.sort();

        if let Some(progress) = progress {
            progress.printf("Generating metadata files and linking package files...");
        }

        let architectures = self.architectures.clone();
        let mut generated_files: BTreeMap<String, ChecksumInfo> = BTreeMap::new();

        for (arch_index, arch) in architectures.iter().enumerate() {
            if let Some(progress) = progress {
                progress.init_bar(list.len() as u64);
            }

            let relative_path = if arch == "source" {
                format!("{}/source/Sources", self.component)
            } else {
                format!("{}/binary-{}/Packages", self.component, arch)
            };

            if let Some((parent, _)) = relative_path.rsplit_once('/') {
                storage.mk_dir(&format!("{}/{}", base_path, parent))?;
            }

            let index_file = storage
                .create_file(&format!("{}/{}", base_path, relative_path))
                .map_err(|e| wrap(e, PublishError::CreateIndexFile))?;
            let index_path = index_file.path().to_path_buf();
            let mut writer = BufWriter::new(index_file);

            for package in list.iter_mut() {
                if let Some(progress) = progress {
                    progress.add_bar(1);
                }

                if !package.matches_architecture(arch) {
                    continue;
                }

                package_pool
                    .link_from_pool(storage, &self.prefix, &self.component, package)
                    .map_err(|e| wrap(e, PublishError::ProcessPackages))?;

                package
                    .stanza()
                    .write_to(&mut writer)
                    .map_err(|e| wrap(e, PublishError::ProcessPackages))?;
                writer
                    .write_all(b"\n")
                    .map_err(|e| wrap(e, PublishError::ProcessPackages))?;

                // An `all` package appears in every binary index; its buffers
                // can only go once the last matching architecture is done.
                let matches_later = architectures[arch_index + 1..]
                    .iter()
                    .any(|later| package.matches_architecture(later));
                if !matches_later {
                    package.drop_transient_data();
                }
            }

            writer
                .flush()
                .map_err(|e| wrap(e, PublishError::WriteIndexFile))?;
            drop(writer);

            compress_file(&index_path).map_err(|e| wrap(e, PublishError::CompressIndexFile))?;

            for suffix in ["", ".gz", ".bz2"] {
                let indexed_path = format!("{}{}", relative_path, suffix);
                let checksums = storage
                    .checksums_for_file(&format!("{}/{}", base_path, indexed_path))
                    .map_err(|e| wrap(e, PublishError::CollectChecksums))?;

                generated_files.insert(indexed_path, checksums);
            }

            if let Some(progress) = progress {
                progress.shutdown_bar();
            }
        }

        let mut release = Stanza::new();
        release.set("Origin", format!("{} {}", self.prefix, self.distribution));
        release.set("Label", format!("{} {}", self.prefix, self.distribution));
        release.set("Codename", self.distribution.clone());
        release.set("Date", Utc::now().format(DATE_FORMAT).to_string());
        release.set("Components", self.component.clone());
        release.set(
            "Architectures",
            architectures
                .iter()
                .filter(|arch| arch.as_str() != "source")
                .map(|arch| arch.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        );
        release.set("Description", " Generated by debian-publishing\n");

        for field in ["MD5Sum", "SHA1", "SHA256"] {
            let mut value = String::from("\n");

            for (path, info) in &generated_files {
                let digest = match field {
                    "MD5Sum" => &info.md5,
                    "SHA1" => &info.sha1,
                    _ => &info.sha256,
                };

                value.push_str(&format!(" {} {:8} {}\n", digest, info.size, path));
            }

            release.set(field, value);
        }

        let release_file = storage
            .create_file(&format!("{}/Release", base_path))
            .map_err(|e| wrap(e, PublishError::CreateReleaseFile))?;
        let release_path = release_file.path().to_path_buf();

        let mut writer = BufWriter::new(release_file);
        release
            .write_to(&mut writer)
            .map_err(|e| wrap(e, PublishError::CreateReleaseFile))?;
        writer
            .flush()
            .map_err(|e| wrap(e, PublishError::CreateReleaseFile))?;
        drop(writer);

        // Signing may prompt on the console; let progress output drain first.
        if let Some(progress) = progress {
            progress.flush();
        }

        if let Some(signer) = signer {
            let mut detached = release_path.as_os_str().to_owned();
            detached.push(".gpg");

            signer
                .detached_sign(&release_path, std::path::Path::new(&detached))
                .map_err(|e| wrap(e, PublishError::SignReleaseFile))?;

            signer
                .clear_sign(&release_path, &release_path.with_file_name("InRelease"))
                .map_err(|e| wrap(e, PublishError::SignReleaseFile))?;
        }

        Ok(())
    }

    /// Remove the files created by [Self::publish].
    ///
    /// `remove_prefix` drops the whole `dists/` and `pool/` trees under the
    /// prefix; otherwise only this archive's distribution tree goes, plus the
    /// pool component subtree when `remove_pool_component` says no surviving
    /// archive shares it.
    pub fn remove_files(
        &self,
        storage: &dyn PublishedStorage,
        remove_prefix: bool,
        remove_pool_component: bool,
    ) -> Result<()> {
        if remove_prefix {
            storage.remove_dirs(&prefix_join(&self.prefix, "dists"))?;

            return storage.remove_dirs(&prefix_join(&self.prefix, "pool"));
        }

        storage.remove_dirs(&prefix_join(
            &self.prefix,
            &format!("dists/{}", self.distribution),
        ))?;

        if remove_pool_component {
            storage.remove_dirs(&prefix_join(
                &self.prefix,
                &format!("pool/{}", self.component),
            ))?;
        }

        Ok(())
    }
}

impl std::fmt::Display for PublishedArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} ({}) [{}]",
            self.prefix,
            self.distribution,
            self.component,
            self.architectures.join(", ")
        )?;

        if let Some(source) = &self.source {
            write!(f, " publishes {}", source)?;
        }

        Ok(())
    }
}

/// Persistent collection of published archives.
///
/// A single instance owns the registry for its store; the engine's contract
/// is single-writer per process.
pub struct PublishedArchiveCollection<S: KeyValueStore> {
    db: S,
    list: Vec<PublishedArchive>,
}

impl<S: KeyValueStore> PublishedArchiveCollection<S> {
    /// Load the collection from the store.
    ///
    /// Records that fail to decode are logged and skipped; one corrupt
    /// record must not take the registry down.
    pub fn load(db: S) -> Self {
        let blobs = db.fetch_by_prefix(b"U");
        let mut list = Vec::with_capacity(blobs.len());

        for blob in blobs {
            match PublishedArchive::decode(&blob) {
                Ok(archive) => list.push(archive),
                Err(e) => log::error!("error decoding published archive record: {}", e),
            }
        }

        Self { db, list }
    }

    /// Find an existing archive with the same `(prefix, distribution)`.
    pub fn check_duplicate(&self, archive: &PublishedArchive) -> Option<&PublishedArchive> {
        self.list
            .iter()
            .find(|r| r.prefix == archive.prefix && r.distribution == archive.distribution)
    }

    /// Persist a new archive and add it to the collection.
    pub fn add(&mut self, archive: PublishedArchive) -> Result<()> {
        if self.check_duplicate(&archive).is_some() {
            return Err(PublishError::DuplicateArchive {
                prefix: archive.prefix,
                distribution: archive.distribution,
            });
        }

        self.update(&archive)?;
        self.list.push(archive);

        Ok(())
    }

    /// Persist updated state for an archive already in the collection.
    pub fn update(&self, archive: &PublishedArchive) -> Result<()> {
        self.db.put(&archive.key(), &archive.encode()?)
    }

    /// Resolve and attach the source entity for an archive loaded from the
    /// store.
    pub fn load_complete(
        &self,
        archive: &mut PublishedArchive,
        factory: &dyn CollectionFactory,
    ) -> Result<()> {
        let source = match archive.source_kind {
            SourceKind::Snapshot => ArchiveSource::Snapshot(
                factory
                    .snapshot_collection()
                    .by_uuid(&archive.source_uuid)?,
            ),
            SourceKind::Local => ArchiveSource::Local(
                factory
                    .local_repo_collection()
                    .by_uuid(&archive.source_uuid)?,
            ),
        };

        archive.set_source(source);

        Ok(())
    }

    /// Look up an archive by its natural key.
    pub fn by_prefix_distribution(
        &self,
        prefix: &str,
        distribution: &str,
    ) -> Result<&PublishedArchive> {
        self.list
            .iter()
            .find(|r| r.prefix == prefix && r.distribution == distribution)
            .ok_or_else(|| PublishError::ArchiveNotFound {
                prefix: prefix.to_string(),
                distribution: distribution.to_string(),
            })
    }

    /// Look up an archive by UUID.
    pub fn by_uuid(&self, uuid: &str) -> Result<&PublishedArchive> {
        self.list
            .iter()
            .find(|r| r.uuid == uuid)
            .ok_or_else(|| PublishError::ArchiveUuidNotFound(uuid.to_string()))
    }

    /// All archives publishing a given snapshot.
    pub fn by_snapshot(&self, snapshot: &Snapshot) -> Vec<&PublishedArchive> {
        self.list
            .iter()
            .filter(|r| {
                r.source_kind == SourceKind::Snapshot && r.source_uuid == snapshot.uuid()
            })
            .collect()
    }

    /// All archives publishing a given local repository.
    pub fn by_local_repo(&self, repo: &LocalRepo) -> Vec<&PublishedArchive> {
        self.list
            .iter()
            .filter(|r| r.source_kind == SourceKind::Local && r.source_uuid == repo.uuid())
            .collect()
    }

    /// Run a handler over every archive, stopping on the first error.
    pub fn for_each(
        &self,
        mut handler: impl FnMut(&PublishedArchive) -> Result<()>,
    ) -> Result<()> {
        for archive in &self.list {
            handler(archive)?;
        }

        Ok(())
    }

    /// Iterate over all archives.
    pub fn iter(&self) -> impl Iterator<Item = &PublishedArchive> {
        self.list.iter()
    }

    /// Number of archives in the collection.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Remove an archive: de-materialize its files and delete the persisted
    /// record.
    ///
    /// Archives may share an on-disk prefix. The whole `dists/` and `pool/`
    /// trees go only when no other archive lives under the prefix; the pool
    /// component subtree goes only when no survivor shares both prefix and
    /// component.
    pub fn remove(
        &mut self,
        storage: &dyn PublishedStorage,
        prefix: &str,
        distribution: &str,
    ) -> Result<()> {
        let index = self
            .list
            .iter()
            .position(|r| r.prefix == prefix && r.distribution == distribution)
            .ok_or_else(|| PublishError::ArchiveNotFound {
                prefix: prefix.to_string(),
                distribution: distribution.to_string(),
            })?;

        let mut remove_prefix = true;
        let mut remove_pool_component = true;

        for (i, r) in self.list.iter().enumerate() {
            if i == index {
                continue;
            }

            if r.prefix == self.list[index].prefix {
                remove_prefix = false;

                if r.component == self.list[index].component {
                    remove_pool_component = false;
                }
            }
        }

        let archive = &self.list[index];
        archive.remove_files(storage, remove_prefix, remove_pool_component)?;
        self.db.delete(&archive.key())?;

        self.list.swap_remove(index);

        Ok(())
    }
}
