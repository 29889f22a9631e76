//! Stamps the rumi-api binary with the revision it was built from
//!
//! Sets `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE` for `env!`. The
//! values are logged at startup and reported by `GET /health`.

use std::path::Path;
use std::process::Command;

/// `git describe` output, e.g. `a1b2c3d4` or `a1b2c3d4-dirty`
fn describe_revision() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=8", "--exclude=*"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let revision = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!revision.is_empty()).then_some(revision)
}

fn main() {
    let revision = describe_revision().unwrap_or_else(|| "unknown".to_string());

    // RFC 3339 in UTC so /health reports the same string on every host
    let built_at = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);

    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", revision);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", built_at);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);

    // Re-stamp on commit or checkout, not on every source edit
    let git_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../.git");
    if git_dir.exists() {
        println!("cargo:rerun-if-changed={}", git_dir.join("HEAD").display());
        println!("cargo:rerun-if-changed={}", git_dir.join("index").display());
    }
    println!("cargo:rerun-if-changed=build.rs");
}
