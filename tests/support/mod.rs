#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use drizzle2typeorm::convert::{convert_sources, Conversion, ConvertOptions};
use drizzle2typeorm::generator::model::{Entity, Relation, SourceFile};

pub(crate) fn fixture_dir(fixture: &str) -> PathBuf {
    PathBuf::from("tests/fixtures").join(fixture)
}

/// Read fixture files in the given order.
pub(crate) fn load_fixture_sources(fixture: &str, files: &[&str]) -> Vec<SourceFile> {
    files
        .iter()
        .map(|file| {
            let path = fixture_dir(fixture).join(file);
            let content = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
            SourceFile::new(*file, content)
        })
        .collect()
}

pub(crate) fn convert_fixture(fixture: &str, files: &[&str]) -> Conversion {
    convert_sources(
        &load_fixture_sources(fixture, files),
        &ConvertOptions::default(),
    )
    .expect("fixture should convert")
}

/// Convert inline `(file name, content)` pairs.
pub(crate) fn convert_inline(files: &[(&str, &str)]) -> Conversion {
    let sources: Vec<SourceFile> = files
        .iter()
        .map(|(name, content)| SourceFile::new(*name, *content))
        .collect();
    convert_sources(&sources, &ConvertOptions::default()).expect("inline sources should convert")
}

pub(crate) fn entity<'a>(conversion: &'a Conversion, name: &str) -> &'a Entity {
    conversion
        .entities
        .iter()
        .find(|e| e.name == name)
        .unwrap_or_else(|| panic!("entity {name} should exist"))
}

pub(crate) fn relation<'a>(conversion: &'a Conversion, entity_name: &str, local: &str) -> &'a Relation {
    entity(conversion, entity_name)
        .relation(local)
        .unwrap_or_else(|| panic!("relation {entity_name}.{local} should exist"))
}

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    std::fs::create_dir_all(&dir).expect("should create temp dir");
    dir
}

pub(crate) fn git(dir: &std::path::Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .status()
        .expect("git should be installed");
    assert!(status.success(), "git {args:?} failed");
}

/// Commit the files of `fixture` under `subfolder` of a fresh local repository.
pub(crate) fn fixture_repository(fixture: &str, subfolder: &str) -> PathBuf {
    let repo = unique_temp_dir(&format!("d2t_repo_{fixture}"));
    let target = repo.join(subfolder);
    std::fs::create_dir_all(&target).expect("should create subfolder");
    for entry in std::fs::read_dir(fixture_dir(fixture)).expect("fixture dir should exist") {
        let path = entry.expect("fixture entry").path();
        let name = path.file_name().expect("fixture file name");
        std::fs::copy(&path, target.join(name)).expect("should copy fixture file");
    }
    git(&repo, &["init", "--quiet"]);
    git(&repo, &["add", "."]);
    git(
        &repo,
        &["-c", "user.name=test", "-c", "user.email=test@example.com", "commit", "--quiet", "-m", "schema"],
    );
    repo
}
