// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end publishing scenarios against a real filesystem tree.

use {
    debian_publishing::{
        checksum::ChecksumInfo,
        error::{PublishError, Result},
        filesystem::{FilesystemPackagePool, FilesystemPublishedStorage},
        package::{Package, PackageFile, PackageRefList},
        progress::Progress,
        publish::{ArchiveSource, PublishedArchive},
        sign::Signer,
        source::{MemoryCollectionFactory, Snapshot, SnapshotSourceKind},
    },
    std::{
        path::Path,
        sync::Mutex,
    },
};

struct Fixture {
    dir: tempfile::TempDir,
    pool: FilesystemPackagePool,
    storage: FilesystemPublishedStorage,
    factory: MemoryCollectionFactory,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let pool = FilesystemPackagePool::new(dir.path().join("pool"));
        let storage = FilesystemPublishedStorage::new(dir.path().join("public"));

        Self {
            dir,
            pool,
            storage,
            factory: MemoryCollectionFactory::new(),
        }
    }

    fn public(&self, path: &str) -> std::path::PathBuf {
        self.dir.path().join("public").join(path)
    }

    /// Import a binary package into the pool and register it.
    fn add_deb(&mut self, name: &str, version: &str, arch: &str, content: &[u8]) -> Package {
        let filename = format!("{}_{}_{}.deb", name, version, arch);
        let checksums = self.pool.import(&filename, content).unwrap();

        let mut package = Package::new(name, version, arch);
        package.set_files(vec![PackageFile::new(filename, checksums)]);
        self.factory.add_package(package.clone());

        package
    }

    /// Import a source package (dsc + tarball) into the pool and register it.
    fn add_source_package(&mut self, name: &str, version: &str) -> Package {
        let dsc = format!("{}_{}.dsc", name, version);
        let tarball = format!("{}_{}.tar.gz", name, version);
        let dsc_sums = self.pool.import(&dsc, b"dsc content").unwrap();
        let tar_sums = self.pool.import(&tarball, b"tarball content").unwrap();

        let mut package = Package::new(name, version, "source");
        package.set_files(vec![
            PackageFile::new(dsc, dsc_sums),
            PackageFile::new(tarball, tar_sums),
        ]);
        self.factory.add_package(package.clone());

        package
    }

    fn snapshot(&mut self, packages: &[&Package]) -> Snapshot {
        let mut refs = PackageRefList::new();
        for package in packages {
            refs.push_package(package);
        }

        let snapshot = Snapshot::new(
            "snap",
            "test snapshot",
            SnapshotSourceKind::Repo,
            vec![],
            refs,
        );
        self.factory.add_snapshot(snapshot.clone());

        snapshot
    }
}

/// Collect the `(digest, size, path)` entries listed under a checksum field.
fn release_entries(release: &str, field: &str) -> Vec<(String, u64, String)> {
    let mut entries = Vec::new();
    let mut in_section = false;

    for line in release.lines() {
        if let Some(entry) = line.strip_prefix(' ') {
            if in_section {
                let mut parts = entry.split_whitespace();
                let digest = parts.next().unwrap().to_string();
                let size = parts.next().unwrap().parse().unwrap();
                let path = parts.next().unwrap().to_string();
                entries.push((digest, size, path));
            }
        } else {
            in_section = line == format!("{}:", field);
        }
    }

    entries
}

fn release_field(release: &str, field: &str) -> Option<String> {
    release
        .lines()
        .find_map(|line| line.strip_prefix(&format!("{}: ", field)))
        .map(|value| value.to_string())
}

#[test]
fn publish_binary_and_source_packages() {
    let mut fixture = Fixture::new();

    let deb = fixture.add_deb("mars-invaders", "1.03", "amd64", b"deb content");
    let dsc = fixture.add_source_package("mars-invaders", "1.03");
    let snapshot = fixture.snapshot(&[&deb, &dsc]);

    let mut archive = PublishedArchive::new(
        ".",
        "stable",
        "main",
        vec![],
        ArchiveSource::Snapshot(snapshot),
        &fixture.factory,
    )
    .unwrap();

    archive
        .publish(
            &fixture.pool,
            &fixture.storage,
            &fixture.factory,
            None,
            None,
        )
        .unwrap();

    // architectures were inferred from the package list and sorted
    assert_eq!(archive.architectures(), ["amd64", "source"]);

    let expected = [
        "main/binary-amd64/Packages",
        "main/binary-amd64/Packages.gz",
        "main/binary-amd64/Packages.bz2",
        "main/source/Sources",
        "main/source/Sources.gz",
        "main/source/Sources.bz2",
    ];
    for path in expected {
        assert!(
            fixture.public(&format!("dists/stable/{}", path)).exists(),
            "missing {}",
            path
        );
    }

    let release = std::fs::read_to_string(fixture.public("dists/stable/Release")).unwrap();

    assert_eq!(release_field(&release, "Origin").as_deref(), Some(". stable"));
    assert_eq!(release_field(&release, "Label").as_deref(), Some(". stable"));
    assert_eq!(release_field(&release, "Codename").as_deref(), Some("stable"));
    assert_eq!(release_field(&release, "Components").as_deref(), Some("main"));
    // the source pseudo-architecture is not announced
    assert_eq!(
        release_field(&release, "Architectures").as_deref(),
        Some("amd64")
    );
    assert!(release_field(&release, "Date").is_some());

    // every checksum section lists all six generated files, and the sums
    // match the bytes on disk
    for field in ["MD5Sum", "SHA1", "SHA256"] {
        let entries = release_entries(&release, field);
        assert_eq!(entries.len(), 6, "{} should list 6 entries", field);

        let mut listed: Vec<&str> = entries.iter().map(|(_, _, path)| path.as_str()).collect();
        listed.sort_unstable();
        let mut wanted = expected.to_vec();
        wanted.sort_unstable();
        assert_eq!(listed, wanted);

        for (digest, size, path) in &entries {
            let info =
                ChecksumInfo::for_file(&fixture.public(&format!("dists/stable/{}", path)))
                    .unwrap();
            assert_eq!(*size, info.size, "size mismatch for {}", path);

            let want = match field {
                "MD5Sum" => &info.md5,
                "SHA1" => &info.sha1,
                _ => &info.sha256,
            };
            assert_eq!(digest, want, "{} mismatch for {}", field, path);
        }
    }

    // Packages index carries the stanza with the pool location
    let packages =
        std::fs::read_to_string(fixture.public("dists/stable/main/binary-amd64/Packages"))
            .unwrap();
    assert!(packages.contains("Package: mars-invaders\n"));
    assert!(packages.contains(
        "Filename: pool/main/m/mars-invaders/mars-invaders_1.03_amd64.deb\n"
    ));
    assert!(packages.ends_with("\n\n"));

    let sources =
        std::fs::read_to_string(fixture.public("dists/stable/main/source/Sources")).unwrap();
    assert!(sources.contains("Directory: pool/main/m/mars-invaders\n"));
    assert!(sources.contains(" mars-invaders_1.03.dsc\n"));

    // package files were hard-linked into the published pool
    assert_eq!(
        std::fs::read(fixture.public("pool/main/m/mars-invaders/mars-invaders_1.03_amd64.deb"))
            .unwrap(),
        b"deb content"
    );
    assert!(fixture
        .public("pool/main/m/mars-invaders/mars-invaders_1.03.tar.gz")
        .exists());
}

#[test]
fn publish_under_prefix() {
    let mut fixture = Fixture::new();

    let deb = fixture.add_deb("libmars", "2.0", "i386", b"lib content");
    let snapshot = fixture.snapshot(&[&deb]);

    let mut archive = PublishedArchive::new(
        "ppa/games",
        "wheezy",
        "main",
        vec![],
        ArchiveSource::Snapshot(snapshot),
        &fixture.factory,
    )
    .unwrap();

    archive
        .publish(
            &fixture.pool,
            &fixture.storage,
            &fixture.factory,
            None,
            None,
        )
        .unwrap();

    assert!(fixture
        .public("ppa/games/dists/wheezy/main/binary-i386/Packages")
        .exists());
    assert!(fixture
        .public("ppa/games/pool/main/libm/libmars/libmars_2.0_i386.deb")
        .exists());

    let release =
        std::fs::read_to_string(fixture.public("ppa/games/dists/wheezy/Release")).unwrap();
    assert_eq!(
        release_field(&release, "Origin").as_deref(),
        Some("ppa/games wheezy")
    );
}

#[test]
fn publish_empty_snapshot_fails() {
    let mut fixture = Fixture::new();
    let snapshot = fixture.snapshot(&[]);

    let mut archive = PublishedArchive::new(
        ".",
        "stable",
        "main",
        vec![],
        ArchiveSource::Snapshot(snapshot),
        &fixture.factory,
    )
    .unwrap();

    let err = archive
        .publish(
            &fixture.pool,
            &fixture.storage,
            &fixture.factory,
            None,
            None,
        )
        .unwrap_err();

    assert_eq!(err.to_string(), "snapshot is empty");
}

#[test]
fn explicit_architectures_limit_indices() {
    let mut fixture = Fixture::new();

    let deb = fixture.add_deb("mars-invaders", "1.03", "amd64", b"deb content");
    let dsc = fixture.add_source_package("mars-invaders", "1.03");
    let snapshot = fixture.snapshot(&[&deb, &dsc]);

    let mut archive = PublishedArchive::new(
        ".",
        "stable",
        "main",
        vec!["amd64".to_string()],
        ArchiveSource::Snapshot(snapshot),
        &fixture.factory,
    )
    .unwrap();

    archive
        .publish(
            &fixture.pool,
            &fixture.storage,
            &fixture.factory,
            None,
            None,
        )
        .unwrap();

    assert!(fixture
        .public("dists/stable/main/binary-amd64/Packages")
        .exists());
    assert!(!fixture.public("dists/stable/main/source").exists());
}

#[test]
fn arch_all_package_appears_in_every_binary_index() {
    let mut fixture = Fixture::new();

    let amd64 = fixture.add_deb("mars-invaders", "1.03", "amd64", b"amd64 content");
    let i386 = fixture.add_deb("mars-invaders", "1.03", "i386", b"i386 content");
    let all = fixture.add_deb("pluto-themes", "2.0", "all", b"theme content");
    let snapshot = fixture.snapshot(&[&amd64, &i386, &all]);

    let mut archive = PublishedArchive::new(
        ".",
        "stable",
        "main",
        vec![],
        ArchiveSource::Snapshot(snapshot),
        &fixture.factory,
    )
    .unwrap();

    archive
        .publish(
            &fixture.pool,
            &fixture.storage,
            &fixture.factory,
            None,
            None,
        )
        .unwrap();

    assert_eq!(archive.architectures(), ["amd64", "i386"]);

    for arch in ["amd64", "i386"] {
        let packages = std::fs::read_to_string(
            fixture.public(&format!("dists/stable/main/binary-{}/Packages", arch)),
        )
        .unwrap();

        assert!(packages.contains("Package: pluto-themes\n"), "{}", arch);
        assert!(
            packages
                .contains("Filename: pool/main/p/pluto-themes/pluto-themes_2.0_all.deb\n"),
            "arch {} index lost the pool location of the all package",
            arch
        );
    }
}

#[test]
fn publish_local_repo() {
    let mut fixture = Fixture::new();

    let deb = fixture.add_deb("mars-invaders", "1.03", "amd64", b"deb content");
    let mut refs = PackageRefList::new();
    refs.push_package(&deb);

    let mut repo = debian_publishing::source::LocalRepo::new("my-repo", "local packages");
    repo.default_distribution = "bunsen".to_string();
    repo.update_ref_list(refs);

    let mut archive = PublishedArchive::new(
        ".",
        "",
        "",
        vec![],
        ArchiveSource::Local(repo),
        &fixture.factory,
    )
    .unwrap();

    assert_eq!(archive.distribution(), "bunsen");
    assert_eq!(archive.component(), "main");

    archive
        .publish(
            &fixture.pool,
            &fixture.storage,
            &fixture.factory,
            None,
            None,
        )
        .unwrap();

    assert!(fixture
        .public("dists/bunsen/main/binary-amd64/Packages")
        .exists());
}

#[test]
fn republish_is_idempotent() {
    let mut fixture = Fixture::new();

    let deb = fixture.add_deb("mars-invaders", "1.03", "amd64", b"deb content");
    let snapshot = fixture.snapshot(&[&deb]);

    let mut archive = PublishedArchive::new(
        ".",
        "stable",
        "main",
        vec![],
        ArchiveSource::Snapshot(snapshot),
        &fixture.factory,
    )
    .unwrap();

    for _ in 0..2 {
        archive
            .publish(
                &fixture.pool,
                &fixture.storage,
                &fixture.factory,
                None,
                None,
            )
            .unwrap();
    }

    let packages =
        std::fs::read_to_string(fixture.public("dists/stable/main/binary-amd64/Packages"))
            .unwrap();
    assert_eq!(packages.matches("Package: mars-invaders\n").count(), 1);
}

struct StubSigner;

impl Signer for StubSigner {
    fn detached_sign(&self, source: &Path, destination: &Path) -> Result<()> {
        assert!(source.exists());
        std::fs::write(destination, b"-----BEGIN PGP SIGNATURE-----\nstub\n")?;

        Ok(())
    }

    fn clear_sign(&self, source: &Path, destination: &Path) -> Result<()> {
        let content = std::fs::read_to_string(source)?;
        std::fs::write(
            destination,
            format!("-----BEGIN PGP SIGNED MESSAGE-----\n\n{}", content),
        )?;

        Ok(())
    }
}

#[test]
fn publish_with_signer_writes_signatures() {
    let mut fixture = Fixture::new();

    let deb = fixture.add_deb("mars-invaders", "1.03", "amd64", b"deb content");
    let snapshot = fixture.snapshot(&[&deb]);

    let mut archive = PublishedArchive::new(
        ".",
        "stable",
        "main",
        vec![],
        ArchiveSource::Snapshot(snapshot),
        &fixture.factory,
    )
    .unwrap();

    archive
        .publish(
            &fixture.pool,
            &fixture.storage,
            &fixture.factory,
            Some(&StubSigner),
            None,
        )
        .unwrap();

    let detached = std::fs::read_to_string(fixture.public("dists/stable/Release.gpg")).unwrap();
    assert!(detached.starts_with("-----BEGIN PGP SIGNATURE-----"));

    let inrelease = std::fs::read_to_string(fixture.public("dists/stable/InRelease")).unwrap();
    assert!(inrelease.contains("Codename: stable\n"));
}

struct FailingSigner;

impl Signer for FailingSigner {
    fn detached_sign(&self, _source: &Path, _destination: &Path) -> Result<()> {
        Err(PublishError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "gpg exited with status 2",
        )))
    }

    fn clear_sign(&self, _source: &Path, _destination: &Path) -> Result<()> {
        unreachable!("clear_sign should not be reached after detached_sign fails")
    }
}

#[test]
fn signing_failure_is_surfaced() {
    let mut fixture = Fixture::new();

    let deb = fixture.add_deb("mars-invaders", "1.03", "amd64", b"deb content");
    let snapshot = fixture.snapshot(&[&deb]);

    let mut archive = PublishedArchive::new(
        ".",
        "stable",
        "main",
        vec![],
        ArchiveSource::Snapshot(snapshot),
        &fixture.factory,
    )
    .unwrap();

    let err = archive
        .publish(
            &fixture.pool,
            &fixture.storage,
            &fixture.factory,
            Some(&FailingSigner),
            None,
        )
        .unwrap_err();

    assert!(err.to_string().starts_with("unable to sign Release file:"));
}

#[derive(Default)]
struct RecordingProgress {
    lines: Mutex<Vec<String>>,
    bars: Mutex<u32>,
    open_bar: Mutex<bool>,
}

impl Progress for RecordingProgress {
    fn printf(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }

    fn init_bar(&self, _total: u64) {
        *self.open_bar.lock().unwrap() = true;
        *self.bars.lock().unwrap() += 1;
    }

    fn add_bar(&self, _delta: u64) {
        assert!(*self.open_bar.lock().unwrap());
    }

    fn shutdown_bar(&self) {
        *self.open_bar.lock().unwrap() = false;
    }

    fn flush(&self) {}
}

#[test]
fn progress_protocol() {
    let mut fixture = Fixture::new();

    let deb = fixture.add_deb("mars-invaders", "1.03", "amd64", b"deb content");
    let dsc = fixture.add_source_package("mars-invaders", "1.03");
    let snapshot = fixture.snapshot(&[&deb, &dsc]);

    let mut archive = PublishedArchive::new(
        ".",
        "stable",
        "main",
        vec![],
        ArchiveSource::Snapshot(snapshot),
        &fixture.factory,
    )
    .unwrap();

    let progress = RecordingProgress::default();

    archive
        .publish(
            &fixture.pool,
            &fixture.storage,
            &fixture.factory,
            None,
            Some(&progress),
        )
        .unwrap();

    let lines = progress.lines.lock().unwrap();
    assert!(lines.iter().any(|line| line.contains("Loading packages")));

    // one bar per architecture plus one for the package load
    assert_eq!(*progress.bars.lock().unwrap(), 3);
    assert!(!*progress.open_bar.lock().unwrap());
}
