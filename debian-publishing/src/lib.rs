// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

/*! Debian archive publishing.

This crate implements the publishing engine of a Debian repository management
tool: it takes a named, immutable package set (a *snapshot*) or a mutable
*local repository* and materializes a standards-compliant Debian archive tree
on a backing storage, so standard clients (`apt`, `apt-get`) can fetch from it
over HTTP. It also maintains a persistent registry of published archives with
identity, duplicate prevention, and cleanup semantics that stay consistent
when multiple archives share an on-disk prefix.

See <https://wiki.debian.org/DebianRepository/Format> for the format of
repositories.

# A Tour of Functionality

[publish::PublishedArchive] is the central entity. It is constructed over an
[publish::ArchiveSource] (a snapshot or a local repository), normalizing its
publishing prefix and, when asked, guessing the distribution and component by
walking the snapshot graph back to its root repositories.
[publish::PublishedArchive::publish] materializes the archive: packages are
hard-linked from the pool into `pool/<component>/…`, per-architecture
`Packages`/`Sources` indices are generated with `.gz` and `.bz2` siblings,
and a `Release` file carrying MD5/SHA-1/SHA-256 sums is written and
optionally signed.

[publish::PublishedArchiveCollection] is the registry: archives persist as
compact binary records in a key-value store, `(prefix, distribution)` is
enforced unique, and removal accounts for archives sharing a prefix before
deleting shared trees.

The engine talks to its surroundings through narrow contracts:
[storage::PublishedStorage] and [storage::PackagePool] for the served tree
and the content-addressed package store (filesystem implementations in
[filesystem]), [database::KeyValueStore] for persistence
([database::MemoryStore] for tests and embedding), [sign::Signer] for GPG
material, and [progress::Progress] for console reporting.

Support primitives: [control::Stanza] serializes ordered key/value blocks in
Debian control-file format, [checksum::MultiDigester] computes all announced
digests in one pass, and [compression::compress_file] produces the compressed
index siblings.
*/

pub mod checksum;
pub mod compression;
pub mod control;
pub mod database;
pub mod error;
pub mod filesystem;
pub mod package;
pub mod progress;
pub mod publish;
pub mod sign;
pub mod source;
pub mod storage;
