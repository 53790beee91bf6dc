use std::fs::{self, File};
use std::path::{Path, PathBuf};

use homesync_archive::{ArchiveBuilder, ArchiveReader, Error, MemberKind, contain_member};

fn dummy_home() -> tempfile::TempDir {
    let home = tempfile::Builder::new()
        .prefix("homesync-test-home-")
        .tempdir()
        .expect("Failed to create temp dir");
    let root = home.path().join("subdir/dummy_files");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("test1.txt"), "Hi! 1").unwrap();
    fs::write(root.join("test2.txt"), "Hi! 2").unwrap();
    home
}

#[test]
fn build_then_unpack_reproduces_tree() {
    let home = dummy_home();
    let out = tempfile::tempdir().unwrap();
    let archive = out.path().join("archive.tar.gz");

    ArchiveBuilder::new(home.path(), "subdir/dummy_files")
        .write_to(&archive)
        .unwrap();

    let reader = ArchiveReader::open(&archive).unwrap();
    let members = reader.members().unwrap();
    assert_eq!(members.len(), 3);
    assert_eq!(members[0].kind, MemberKind::Directory);

    let dest = tempfile::tempdir().unwrap();
    let report = reader
        .unpack_within(dest.path(), Path::new("subdir/dummy_files"))
        .unwrap();

    assert_eq!(report.members, 3);
    assert_eq!(report.total_bytes, 10);
    let root = dest.path().join("subdir/dummy_files");
    assert_eq!(fs::read_to_string(root.join("test1.txt")).unwrap(), "Hi! 1");
    assert_eq!(fs::read_to_string(root.join("test2.txt")).unwrap(), "Hi! 2");
}

#[test]
fn exclusion_is_exact_path() {
    let home = dummy_home();
    let out = tempfile::tempdir().unwrap();
    let archive = out.path().join("archive.tar.gz");

    let report = ArchiveBuilder::new(home.path(), "subdir/dummy_files")
        .exclude(["subdir/dummy_files/test2.txt"])
        .write_to(&archive)
        .unwrap();

    assert_eq!(report.skipped, vec![PathBuf::from("subdir/dummy_files/test2.txt")]);
    let mut names: Vec<PathBuf> = ArchiveReader::open(&archive)
        .unwrap()
        .members()
        .unwrap()
        .into_iter()
        .map(|m| m.path)
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            PathBuf::from("subdir/dummy_files"),
            PathBuf::from("subdir/dummy_files/test1.txt"),
        ]
    );
}

#[test]
fn symlinks_round_trip_as_symlinks() {
    let home = dummy_home();
    let root = home.path().join("subdir/dummy_files");
    std::os::unix::fs::symlink("test1.txt", root.join("alias")).unwrap();
    std::os::unix::fs::symlink("gone.txt", root.join("dangling")).unwrap();
    let out = tempfile::tempdir().unwrap();
    let archive = out.path().join("archive.tar.gz");

    ArchiveBuilder::new(home.path(), "subdir/dummy_files")
        .write_to(&archive)
        .unwrap();

    let reader = ArchiveReader::open(&archive).unwrap();
    let alias = reader
        .members()
        .unwrap()
        .into_iter()
        .find(|m| m.path.ends_with("alias"))
        .unwrap();
    assert_eq!(
        alias.kind,
        MemberKind::Symlink {
            target: PathBuf::from("test1.txt")
        }
    );

    let dest = tempfile::tempdir().unwrap();
    reader
        .unpack_within(dest.path(), Path::new("subdir/dummy_files"))
        .unwrap();
    let restored = dest.path().join("subdir/dummy_files");
    assert_eq!(fs::read_link(restored.join("dangling")).unwrap(), Path::new("gone.txt"));
    assert_eq!(fs::read_to_string(restored.join("alias")).unwrap(), "Hi! 1");
}

#[test]
fn foreign_member_is_illegal() {
    let out = tempfile::tempdir().unwrap();
    let archive = out.path().join("archive_with_unexpected_file.tar.gz");
    {
        let encoder = flate2::write::GzEncoder::new(
            File::create(&archive).unwrap(),
            flate2::Compression::default(),
        );
        let mut builder = tar::Builder::new(encoder);
        let mut header = tar::Header::new_gnu();
        header.set_size(3);
        header.set_mode(0o644);
        builder
            .append_data(&mut header, "unexpected/file.txt", &b"bad"[..])
            .unwrap();
        builder.into_inner().unwrap().finish().unwrap();
    }

    let reader = ArchiveReader::open(&archive).unwrap();
    let member = &reader.members().unwrap()[0];
    let err = contain_member(&member.path, "subdir/dummy_files").unwrap_err();
    assert!(matches!(err, Error::IllegalMember { ref member_name, .. } if member_name == "unexpected"));

    let dest = tempfile::tempdir().unwrap();
    let result = reader.unpack_within(dest.path(), Path::new("subdir/dummy_files"));
    assert!(matches!(result, Err(Error::IllegalMember { .. })));
    assert!(!dest.path().join("unexpected").exists());
}
