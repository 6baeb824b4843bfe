// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Error handling. */

use thiserror::Error;

/// Primary crate error type.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    #[error("I/O error on path {0}: {1:?}")]
    IoPath(String, std::io::Error),

    #[error("encode error: {0:?}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("decode error: {0:?}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("invalid prefix {0}")]
    InvalidPrefix(String),

    #[error("unable to guess distribution name, please specify explicitly")]
    AmbiguousDistribution,

    #[error("snapshot is empty")]
    EmptySource,

    #[error("unable to figure out list of architectures, please supply explicit list")]
    NoArchitectures,

    #[error("published repo with prefix/distribution {prefix}/{distribution} already exists")]
    DuplicateArchive {
        prefix: String,
        distribution: String,
    },

    #[error("published repo with prefix/distribution {prefix}/{distribution} not found")]
    ArchiveNotFound {
        prefix: String,
        distribution: String,
    },

    #[error("published repo with uuid {0} not found")]
    ArchiveUuidNotFound(String),

    #[error("snapshot with uuid {0} not found")]
    SnapshotNotFound(String),

    #[error("local repo with uuid {0} not found")]
    LocalRepoNotFound(String),

    #[error("mirror with uuid {0} not found")]
    RemoteRepoNotFound(String),

    #[error("package {0} not found")]
    PackageNotFound(String),

    #[error("unknown source kind {0}")]
    UnknownSourceKind(String),

    #[error("source is not loaded, call load_complete() first")]
    SourceNotLoaded,

    #[error("package has no file information")]
    PackageFilesMissing,

    #[error("unable to load packages: {0}")]
    LoadPackages(#[source] Box<PublishError>),

    #[error("unable to process packages: {0}")]
    ProcessPackages(#[source] Box<PublishError>),

    #[error("unable to create Packages file: {0}")]
    CreateIndexFile(#[source] Box<PublishError>),

    #[error("unable to write Packages file: {0}")]
    WriteIndexFile(#[source] Box<PublishError>),

    #[error("unable to compress Packages files: {0}")]
    CompressIndexFile(#[source] Box<PublishError>),

    #[error("unable to collect checksums: {0}")]
    CollectChecksums(#[source] Box<PublishError>),

    #[error("unable to create Release file: {0}")]
    CreateReleaseFile(#[source] Box<PublishError>),

    #[error("unable to sign Release file: {0}")]
    SignReleaseFile(#[source] Box<PublishError>),

    #[error("database error: {0}")]
    Database(String),
}

/// Result wrapper for this crate.
pub type Result<T> = std::result::Result<T, PublishError>;
