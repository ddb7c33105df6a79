//! End-to-end tests driving the compiled `undoo` binary, mirroring the
//! scenarios the original Go test suite covered for the same helper.
//!
//! Namespace and mount manipulation require `CAP_SYS_ADMIN`; tests that need
//! it are marked `#[ignore]` so a default `cargo test` run in an
//! unprivileged sandbox still exercises the parts that don't.

use std::fs;
use std::process::Command;

fn undoo_bin() -> &'static str {
    env!("CARGO_BIN_EXE_undoo")
}

#[test]
fn executes_the_command_line_passed_as_args() {
    let output = Command::new(undoo_bin())
        .args(["mountsRoot", "keep-id", "echo", "yabadabadoo"])
        .output()
        .expect("failed to run undoo");

    let combined = String::from_utf8_lossy(&output.stdout) + String::from_utf8_lossy(&output.stderr);
    assert!(combined.contains("yabadabadoo"), "output was: {combined}");
}

#[test]
fn forwards_any_error_message_and_exit_code() {
    let output = Command::new(undoo_bin())
        .args(["mountsRoot", "keep-id", "ls", "scooobydoo-does-not-exist"])
        .output()
        .expect("failed to run undoo");

    assert!(!output.status.success());
    let combined = String::from_utf8_lossy(&output.stdout) + String::from_utf8_lossy(&output.stderr);
    assert!(
        combined.contains("No such file or directory") || combined.contains("scooobydoo"),
        "output was: {combined}"
    );
}

#[test]
fn rejects_too_few_arguments() {
    let output = Command::new(undoo_bin())
        .args(["only-one-arg"])
        .output()
        .expect("failed to run undoo");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage"), "stderr was: {stderr}");
}

#[test]
#[ignore = "needs CAP_SYS_ADMIN to unshare a mount namespace"]
fn creates_a_new_mount_namespace_distinct_from_the_parent() {
    let parent_ns = fs::read_link("/proc/self/ns/mnt").expect("read parent mnt ns");

    let output = Command::new(undoo_bin())
        .args(["mountsRoot", "keep-id", "readlink", "/proc/self/ns/mnt"])
        .output()
        .expect("failed to run undoo");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let child_ns = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    assert_ne!(child_ns, parent_ns.to_string_lossy());
}

#[test]
#[ignore = "needs CAP_SYS_ADMIN to bind-mount and unmount"]
fn unmounts_all_unneeded_mounts_from_the_child_namespace_only() {
    let base = tempfile::tempdir().expect("tempdir");
    let depot_path = base.path().join("aufs");
    fs::create_dir_all(&depot_path).expect("mkdir depot");

    bind_mount_self(&depot_path);

    let mnt1 = depot_path.join("mnt1");
    let mnt2 = depot_path.join("mnt2");
    fs::create_dir_all(&mnt1).expect("mkdir mnt1");
    fs::create_dir_all(&mnt2).expect("mkdir mnt2");
    mount_tmpfs(&mnt1);
    mount_tmpfs(&mnt2);

    let output = Command::new(undoo_bin())
        .arg(&depot_path)
        .args(["mnt2", "cat", "/proc/mounts"])
        .output()
        .expect("failed to run undoo");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let child_mounts = String::from_utf8_lossy(&output.stdout);
    assert!(!child_mounts.contains("mnt1"));
    assert!(child_mounts.contains("mnt2"));

    let parent_mounts = fs::read_to_string("/proc/self/mounts").expect("read parent mounts");
    assert!(parent_mounts.contains("mnt1"));
    assert!(parent_mounts.contains("mnt2"));

    nix::mount::umount(&mnt1).ok();
    nix::mount::umount(&mnt2).ok();
    nix::mount::umount(&depot_path).ok();
}

fn bind_mount_self(path: &std::path::Path) {
    nix::mount::mount(
        Some(path),
        path,
        None::<&str>,
        nix::mount::MsFlags::MS_BIND,
        None::<&str>,
    )
    .expect("bind-mount depot onto itself");
}

fn mount_tmpfs(path: &std::path::Path) {
    nix::mount::mount(
        Some("tmpfs"),
        path,
        Some("tmpfs"),
        nix::mount::MsFlags::empty(),
        None::<&str>,
    )
    .expect("mount tmpfs");
}
