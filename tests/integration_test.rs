use assert_cmd::Command;
use assert_cmd::cargo;
use mockito::Server;
use predicates::prelude::*;
use tempfile::tempdir;

const LINUX_AMD64_SHA256: &str =
    "6de1f89ad4981333e2b33b42460eaa1f31ef68048b04d0b66bb92a7e8d9eb6f2";

fn sd_install() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("sd-install"));
    cmd.env_remove("GITHUB_TOKEN")
        .env_remove("SD_INSTALL_BIN_DIR")
        .env_remove("SD_INSTALL_BASE_URL");
    cmd
}

#[test]
fn test_platforms_lists_builtin_table() {
    sd_install()
        .arg("platforms")
        .assert()
        .success()
        .stdout(predicate::str::contains("linux/amd64"))
        .stdout(predicate::str::contains("macos/arm64"))
        .stdout(predicate::str::contains(
            "https://github.com/screwdriver-cd/sd-local/releases/download/v1.0.58/sd-local_darwin_amd64",
        ))
        .stdout(predicate::str::contains("windows").not());
}

#[test]
fn test_resolve_json_with_base_url() {
    let output = sd_install()
        .args([
            "resolve",
            "--os",
            "linux",
            "--arch",
            "x86_64",
            "--json",
            "--base-url",
            "http://mirror.local/sd-local",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        json["url"],
        "http://mirror.local/sd-local/download/v1.0.58/sd-local_linux_amd64"
    );
    assert_eq!(json["sha256"], LINUX_AMD64_SHA256);
    assert_eq!(json["version"], "1.0.58");
}

#[test]
fn test_resolve_unsupported_platform() {
    sd_install()
        .args(["resolve", "--os", "windows", "--arch", "amd64"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "No release of sd-local 1.0.58 for windows/amd64",
        ));
}

#[test]
fn test_resolve_unknown_version() {
    sd_install()
        .args(["resolve", "--os", "linux", "--arch", "arm64", "--version", "1.0.57"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No release of sd-local 1.0.57"));
}

#[test]
fn test_install_integrity_mismatch_writes_nothing() {
    let mut server = Server::new();
    let download = server
        .mock("GET", "/download/v1.0.58/sd-local_linux_amd64")
        .with_status(200)
        .with_body("definitely not sd-local")
        .expect(1)
        .create();

    let bin_dir = tempdir().unwrap();

    sd_install()
        .env("SD_INSTALL_BIN_DIR", bin_dir.path())
        .args(["install", "--os", "linux", "--arch", "amd64", "-y"])
        .args(["--base-url", &server.url()])
        .assert()
        .failure()
        .stdout(predicate::str::contains(" downloading"))
        .stderr(predicate::str::contains("Integrity check failed"))
        .stderr(predicate::str::contains(LINUX_AMD64_SHA256));

    download.assert();
    assert_eq!(std::fs::read_dir(bin_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_install_mismatch_keeps_existing_binary() {
    let mut server = Server::new();
    let _download = server
        .mock("GET", "/download/v1.0.58/sd-local_darwin_arm64")
        .with_status(200)
        .with_body("tampered")
        .create();

    let bin_dir = tempdir().unwrap();
    let target = bin_dir.path().join("sd-local");
    std::fs::write(&target, b"previous release").unwrap();

    sd_install()
        .args(["install", "--os", "macos", "--arch", "arm64", "--yes"])
        .args(["--base-url", &server.url()])
        .arg("--bin-dir")
        .arg(bin_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Integrity check failed"));

    assert_eq!(std::fs::read(&target).unwrap(), b"previous release");
    assert_eq!(std::fs::read_dir(bin_dir.path()).unwrap().count(), 1);
}

#[test]
fn test_install_unsupported_platform_downloads_nothing() {
    let mut server = Server::new();
    let download = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create();

    let bin_dir = tempdir().unwrap();

    sd_install()
        .args(["install", "--os", "windows", "--arch", "amd64"])
        .args(["--base-url", &server.url()])
        .arg("--bin-dir")
        .arg(bin_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No release of sd-local"));

    download.assert();
    assert_eq!(std::fs::read_dir(bin_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_install_download_failure() {
    let mut server = Server::new();
    let download = server
        .mock("GET", "/download/v1.0.58/sd-local_linux_arm64")
        .with_status(404)
        .expect(1)
        .create();

    let bin_dir = tempdir().unwrap();

    sd_install()
        .args(["install", "--os", "linux", "--arch", "arm64", "--retries", "1"])
        .args(["--base-url", &server.url()])
        .arg("--bin-dir")
        .arg(bin_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to download"))
        .stderr(predicate::str::contains("sd-local_linux_arm64"));

    download.assert();
    assert_eq!(std::fs::read_dir(bin_dir.path()).unwrap().count(), 0);
}

#[test]
fn test_install_declined_without_tty() {
    let mut server = Server::new();
    let download = server
        .mock("GET", mockito::Matcher::Any)
        .expect(0)
        .create();

    let bin_dir = tempdir().unwrap();
    let target = bin_dir.path().join("sd-local");
    std::fs::write(&target, b"previous release").unwrap();

    // EOF on stdin counts as "no"
    sd_install()
        .args(["install", "--os", "linux", "--arch", "amd64"])
        .args(["--base-url", &server.url()])
        .arg("--bin-dir")
        .arg(bin_dir.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Installation cancelled."));

    download.assert();
    assert_eq!(std::fs::read(&target).unwrap(), b"previous release");
}

#[test]
fn test_verify_local_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("sd-local_linux_amd64");
    std::fs::write(&file, b"not the release").unwrap();

    sd_install()
        .args(["verify", "--os", "linux", "--arch", "amd64"])
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Integrity check failed"));

    sd_install()
        .args(["verify", "--os", "linux", "--arch", "amd64"])
        .arg(dir.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_version_command() {
    sd_install()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("sd-install "))
        .stdout(predicate::str::contains("sd-local: 1.0.58"));
}
