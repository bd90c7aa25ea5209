//! CLI integration tests
//!
//! These run the real binary. Interactive patching needs a terminal, so the
//! patch command is only exercised up to the point where it would prompt.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MANIFEST: &str = r#"<wiidisc version="1" root="/mymod">
  <patch id="textures">
    <folder disc="/Stage/Texture" external="tex" />
    <file disc="/Layout/title.arc" external="title.arc" />
  </patch>
  <patch id="speed">
    <memory offset="0x80004000" value="38600001" />
  </patch>
</wiidisc>
"#;

fn riivo_patcher() -> Command {
    let mut cmd = Command::cargo_bin("riivo-patcher").unwrap();
    cmd.env_remove("RIIVO_ROOT").env_remove("RIIVO_WIT");
    cmd
}

fn write_manifest(root: &Path, text: &str) -> std::path::PathBuf {
    let dir = root.join("sd_files/riivolution");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("mymod.xml");
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_help_lists_subcommands() {
    riivo_patcher()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("patch"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("completions"));
}

#[test]
fn test_patch_without_manifest_directory() {
    let temp = TempDir::new().unwrap();

    riivo_patcher()
        .args(["patch", "--root"])
        .arg(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_patch_reads_root_from_environment() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join("sd_files/riivolution")).unwrap();

    riivo_patcher()
        .arg("patch")
        .env("RIIVO_ROOT", temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No XML files found"));
}

#[test]
fn test_patch_without_terminal_fails_at_prompt() {
    let temp = TempDir::new().unwrap();
    write_manifest(temp.path(), MANIFEST);

    riivo_patcher()
        .args(["patch", "--root"])
        .arg(temp.path())
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));

    assert!(!temp.path().join("tmp").exists());
}

#[test]
fn test_list_shows_patches_and_rules() {
    let temp = TempDir::new().unwrap();
    let manifest = write_manifest(temp.path(), MANIFEST);
    fs::create_dir_all(temp.path().join("sd_files/mymod/tex")).unwrap();

    riivo_patcher()
        .arg("list")
        .arg(&manifest)
        .arg("--root")
        .arg(temp.path())
        .arg("--no-color")
        .assert()
        .success()
        .stdout(predicate::str::contains("[manifest] mymod.xml"))
        .stdout(predicate::str::contains("root: /mymod"))
        .stdout(predicate::str::contains("[patch] textures"))
        .stdout(predicate::str::contains("[patch] speed"))
        .stdout(predicate::str::contains("[folder] /Stage/Texture"))
        .stdout(predicate::str::contains("title.arc (missing)"))
        .stdout(predicate::str::contains("[memory] 0x80004000 = 38600001"));
}

#[test]
fn test_list_malformed_manifest() {
    let temp = TempDir::new().unwrap();
    let manifest = write_manifest(temp.path(), "<wiidisc><patch id=\"a\">");

    riivo_patcher()
        .arg("list")
        .arg(&manifest)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to parse manifest"));
}

#[test]
fn test_list_wrong_root_element() {
    let temp = TempDir::new().unwrap();
    let manifest = write_manifest(temp.path(), "<disc><patch id=\"a\" /></disc>");

    riivo_patcher()
        .arg("list")
        .arg(&manifest)
        .assert()
        .code(3);
}

#[test]
fn test_completions_bash() {
    riivo_patcher()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("riivo-patcher"));
}
