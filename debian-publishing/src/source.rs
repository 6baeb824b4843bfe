// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Publishing sources.

A published archive is fed by either a [Snapshot] (immutable named package
set) or a [LocalRepo] (mutable, locally curated package set). Snapshots form
a DAG: interior nodes reference other snapshots, roots reference the remote
mirrors or local repos they were taken from. [RemoteRepo] carries the
distribution and component names the guessing walk harvests from those roots.

Lookup of entities by UUID goes through per-kind collection traits, bundled
by [CollectionFactory]. The persistent implementations live with the embedding
application; [MemoryCollectionFactory] serves tests and small embedders.
*/

use {
    crate::{
        error::{PublishError, Result},
        package::{MemoryPackageCollection, Package, PackageCollection, PackageRefList},
    },
    chrono::{DateTime, Utc},
    std::collections::HashMap,
    uuid::Uuid,
};

/// What kind of entities a snapshot was taken from.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SnapshotSourceKind {
    /// Remote repositories (mirrors).
    Repo,
    /// Local repositories.
    Local,
    /// Other snapshots (merge or filter results).
    Snapshot,
}

/// An immutable named reference list of packages.
#[derive(Clone, Debug)]
pub struct Snapshot {
    uuid: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub source_kind: SnapshotSourceKind,
    pub source_uuids: Vec<String>,
    ref_list: PackageRefList,
}

impl Snapshot {
    /// Construct a snapshot over a reference list, recording its provenance.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        source_kind: SnapshotSourceKind,
        source_uuids: Vec<String>,
        ref_list: PackageRefList,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
            source_kind,
            source_uuids,
            ref_list,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn ref_list(&self) -> &PackageRefList {
        &self.ref_list
    }
}

impl std::fmt::Display for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.name, self.description)
    }
}

/// A mutable, locally curated named package set.
#[derive(Clone, Debug)]
pub struct LocalRepo {
    uuid: String,
    pub name: String,
    pub comment: String,
    /// Distribution adopted when publishing without an explicit one.
    pub default_distribution: String,
    /// Component adopted when publishing without an explicit one.
    pub default_component: String,
    ref_list: PackageRefList,
}

impl LocalRepo {
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            name: name.into(),
            comment: comment.into(),
            default_distribution: String::new(),
            default_component: String::new(),
            ref_list: PackageRefList::new(),
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn ref_list(&self) -> &PackageRefList {
        &self.ref_list
    }

    /// Replace the package set of this repository.
    pub fn update_ref_list(&mut self, ref_list: PackageRefList) {
        self.ref_list = ref_list;
    }
}

impl std::fmt::Display for LocalRepo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.name, self.comment)
    }
}

/// A mirror of an upstream repository.
///
/// Only the attributes the publishing engine consumes are modeled: mirror
/// maintenance itself is a separate concern.
#[derive(Clone, Debug)]
pub struct RemoteRepo {
    uuid: String,
    pub name: String,
    pub archive_root: String,
    pub distribution: String,
    pub components: Vec<String>,
}

impl RemoteRepo {
    pub fn new(
        name: impl Into<String>,
        archive_root: impl Into<String>,
        distribution: impl Into<String>,
        components: Vec<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4().to_string(),
            name: name.into(),
            archive_root: archive_root.into(),
            distribution: distribution.into(),
            components,
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }
}

/// Lookup contract for the snapshot store.
pub trait SnapshotCollection {
    fn by_uuid(&self, uuid: &str) -> Result<Snapshot>;
}

/// Lookup contract for the local repository store.
pub trait LocalRepoCollection {
    fn by_uuid(&self, uuid: &str) -> Result<LocalRepo>;
}

/// Lookup contract for the mirror store.
pub trait RemoteRepoCollection {
    fn by_uuid(&self, uuid: &str) -> Result<RemoteRepo>;
}

/// Bundle of the collection lookups the publishing engine consumes.
pub trait CollectionFactory {
    fn snapshot_collection(&self) -> &dyn SnapshotCollection;
    fn local_repo_collection(&self) -> &dyn LocalRepoCollection;
    fn remote_repo_collection(&self) -> &dyn RemoteRepoCollection;
    fn package_collection(&self) -> &dyn PackageCollection;
}

/// In-memory [CollectionFactory] for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCollectionFactory {
    snapshots: HashMap<String, Snapshot>,
    local_repos: HashMap<String, LocalRepo>,
    remote_repos: HashMap<String, RemoteRepo>,
    packages: MemoryPackageCollection,
}

impl MemoryCollectionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_snapshot(&mut self, snapshot: Snapshot) {
        self.snapshots.insert(snapshot.uuid().to_string(), snapshot);
    }

    pub fn add_local_repo(&mut self, repo: LocalRepo) {
        self.local_repos.insert(repo.uuid().to_string(), repo);
    }

    pub fn add_remote_repo(&mut self, repo: RemoteRepo) {
        self.remote_repos.insert(repo.uuid().to_string(), repo);
    }

    pub fn add_package(&mut self, package: Package) {
        self.packages.add(package);
    }
}

impl SnapshotCollection for MemoryCollectionFactory {
    fn by_uuid(&self, uuid: &str) -> Result<Snapshot> {
        self.snapshots
            .get(uuid)
            .cloned()
            .ok_or_else(|| PublishError::SnapshotNotFound(uuid.to_string()))
    }
}

impl LocalRepoCollection for MemoryCollectionFactory {
    fn by_uuid(&self, uuid: &str) -> Result<LocalRepo> {
        self.local_repos
            .get(uuid)
            .cloned()
            .ok_or_else(|| PublishError::LocalRepoNotFound(uuid.to_string()))
    }
}

impl RemoteRepoCollection for MemoryCollectionFactory {
    fn by_uuid(&self, uuid: &str) -> Result<RemoteRepo> {
        self.remote_repos
            .get(uuid)
            .cloned()
            .ok_or_else(|| PublishError::RemoteRepoNotFound(uuid.to_string()))
    }
}

impl CollectionFactory for MemoryCollectionFactory {
    fn snapshot_collection(&self) -> &dyn SnapshotCollection {
        self
    }

    fn local_repo_collection(&self) -> &dyn LocalRepoCollection {
        self
    }

    fn remote_repo_collection(&self) -> &dyn RemoteRepoCollection {
        self
    }

    fn package_collection(&self) -> &dyn PackageCollection {
        &self.packages
    }
}
