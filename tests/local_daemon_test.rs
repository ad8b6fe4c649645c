#![cfg(unix)]

use ipfs_etl::config::{LocalDaemonConfig, PacingConfig, SplitConfig};
use ipfs_etl::core::pipeline::PipelineSettings;
use ipfs_etl::{EtlEngine, LocalDaemonUploader, LocalStorage, UploadPipeline};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Writes a stand-in `ipfs` executable that logs its arguments.
/// `add` prints `Qm<file stem>`; `pin` and `files` exit with the given codes.
fn fake_ipfs(dir: &Path, pin_exit: i32, files_exit: i32) -> PathBuf {
    let log = dir.join("ipfs.log");
    let script = format!(
        r#"#!/bin/sh
echo "$@" >> "{log}"
case "$1" in
  add)
    name=$(basename "$3" .json)
    case "$name" in
      broken*) echo "Error: merkledag: not found" >&2; exit 1 ;;
    esac
    echo "Qm$name"
    ;;
  pin) exit {pin_exit} ;;
  files)
    if [ {files_exit} -ne 0 ]; then echo "Error: directory already has entry by that name" >&2; fi
    exit {files_exit}
    ;;
esac
"#,
        log = log.display(),
        pin_exit = pin_exit,
        files_exit = files_exit,
    );

    let path = dir.join("fake-ipfs");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn settings() -> PipelineSettings {
    PipelineSettings {
        input_path: "genomic_data_with_did_hash.json".to_string(),
        split: SplitConfig::default(),
        output_path: "genomic_output.json".to_string(),
    }
}

fn write_input(dir: &Path, json: &str) {
    std::fs::write(dir.join("genomic_data_with_did_hash.json"), json).unwrap();
}

fn read_output(dir: &Path) -> Vec<serde_json::Value> {
    serde_json::from_str(&std::fs::read_to_string(dir.join("genomic_output.json")).unwrap()).unwrap()
}

#[tokio::test]
async fn test_add_pin_and_copy_for_each_record() {
    let temp_dir = TempDir::new().unwrap();
    let ipfs_bin = fake_ipfs(temp_dir.path(), 0, 0);
    write_input(
        temp_dir.path(),
        r#"[{"Patient DID":"did:x:1","SHA-256 Hash":"abc","Sample ID":"S1"},{"Patient DID":"did:x:2"}]"#,
    );

    let uploader = LocalDaemonUploader::new(LocalDaemonConfig {
        ipfs_bin: ipfs_bin.to_str().unwrap().to_string(),
        ..LocalDaemonConfig::default()
    });
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
    let pipeline = UploadPipeline::new(storage, uploader, settings(), PacingConfig::Fixed { delay_ms: 1 });

    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.uploaded, 2);
    assert_eq!(summary.incomplete, 0);

    let output = read_output(temp_dir.path());
    assert_eq!(
        output[0],
        serde_json::json!({"dataHash":"abc","ipfsLink":"https://ipfs.io/ipfs/QmS1","ownerDID":"did:x:1"})
    );
    assert_eq!(output[1]["ipfsLink"], "https://ipfs.io/ipfs/QmSample_1");
    assert_eq!(output[1]["dataHash"], "hash_1");

    let log = std::fs::read_to_string(temp_dir.path().join("ipfs.log")).unwrap();
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 6);
    assert!(lines[0].starts_with("add -Q "));
    assert!(lines[0].ends_with("split_json_files/S1.json"));
    assert_eq!(lines[1], "pin add QmS1");
    assert_eq!(lines[2], "files cp /ipfs/QmS1 /S1.json");
}

#[tokio::test]
async fn test_failed_add_skips_record() {
    let temp_dir = TempDir::new().unwrap();
    let ipfs_bin = fake_ipfs(temp_dir.path(), 0, 0);
    write_input(
        temp_dir.path(),
        r#"[{"Sample ID":"broken-1"},{"Sample ID":"S2","SHA-256 Hash":"h2"}]"#,
    );

    let uploader = LocalDaemonUploader::new(LocalDaemonConfig {
        ipfs_bin: ipfs_bin.to_str().unwrap().to_string(),
        ..LocalDaemonConfig::default()
    });
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
    let pipeline = UploadPipeline::new(storage, uploader, settings(), PacingConfig::None);

    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.failed, 1);
    let output = read_output(temp_dir.path());
    assert_eq!(output.len(), 1);
    assert_eq!(output[0]["dataHash"], "h2");
}

#[tokio::test]
async fn test_copy_failure_is_informational_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let ipfs_bin = fake_ipfs(temp_dir.path(), 0, 1);
    write_input(temp_dir.path(), r#"[{"Sample ID":"S1"}]"#);

    let uploader = LocalDaemonUploader::new(LocalDaemonConfig {
        ipfs_bin: ipfs_bin.to_str().unwrap().to_string(),
        ..LocalDaemonConfig::default()
    });
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
    let pipeline = UploadPipeline::new(storage, uploader, settings(), PacingConfig::None);

    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.incomplete, 1);
    assert_eq!(read_output(temp_dir.path()).len(), 1);
}

#[tokio::test]
async fn test_strict_pinning_demotes_record() {
    let temp_dir = TempDir::new().unwrap();
    let ipfs_bin = fake_ipfs(temp_dir.path(), 1, 0);
    write_input(temp_dir.path(), r#"[{"Sample ID":"S1"}]"#);

    let uploader = LocalDaemonUploader::new(LocalDaemonConfig {
        ipfs_bin: ipfs_bin.to_str().unwrap().to_string(),
        strict_pinning: true,
        ..LocalDaemonConfig::default()
    });
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap());
    let pipeline = UploadPipeline::new(storage, uploader, settings(), PacingConfig::None);

    let summary = EtlEngine::new(pipeline).run().await.unwrap();

    assert_eq!(summary.uploaded, 0);
    assert_eq!(summary.failed, 1);
    assert!(read_output(temp_dir.path()).is_empty());
}
