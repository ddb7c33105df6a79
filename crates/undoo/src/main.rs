//! `undoo` runs inside a freshly-unshared mount namespace, unmounts every
//! bind mount left behind under a depot directory except the one layer the
//! caller wants kept, then execs the real command in its place.
//!
//! Invocation: `undoo <mounts-root> <layer-to-keep> <cmd> [args...]`.
//!
//! The binary re-execs itself (`/proc/self/exe`) with a leading `namespaced`
//! marker so the unshare + cleanup + exec sequence runs inside the child
//! that actually owns the new namespace, the same two-phase shape as the
//! re-exec dance `youki` relies on to avoid operating on a shared namespace
//! by mistake (see `CVE-2019-5736`; `crates/youki/src/main.rs` carries the
//! same concern for its own re-exec).

mod mounts;

use std::env;
use std::ffi::CString;
use std::fs;
use std::os::unix::process::CommandExt;
use std::process::Command;

use nix::sched::{unshare, CloneFlags};
use nix::unistd::{execvp, setpgid, Pid};

const NAMESPACED_MARKER: &str = "namespaced";

fn main() {
    let args: Vec<String> = env::args().collect();

    let exit_code = if args.get(1).map(String::as_str) == Some(NAMESPACED_MARKER) {
        run_namespaced(&args[2..])
    } else {
        reexec_in_namespace(&args[1..])
    };

    std::process::exit(exit_code);
}

/// Re-execs `/proc/self/exe namespaced <args...>` in a child that has its
/// own process group and mount namespace, and waits for it.
fn reexec_in_namespace(args: &[String]) -> i32 {
    if args.len() < 3 {
        eprintln!("undoo usage: undoo <mounts-root> <layer-to-keep> <cmd> [args...]");
        return 1;
    }

    let mut command = Command::new("/proc/self/exe");
    command.arg(NAMESPACED_MARKER).args(args);

    // Safety: the closure only calls async-signal-safe syscalls
    // (setpgid, unshare) between fork and exec, and touches no
    // shared heap state.
    unsafe {
        command.pre_exec(|| {
            setpgid(Pid::from_raw(0), Pid::from_raw(0))
                .map_err(|errno| std::io::Error::from_raw_os_error(errno as i32))?;
            unshare(CloneFlags::CLONE_NEWNS)
                .map_err(|errno| std::io::Error::from_raw_os_error(errno as i32))?;
            Ok(())
        });
    }

    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) => {
            eprintln!("undoo failed to re-exec into a new namespace: {err}");
            return 1;
        }
    };

    match child.wait() {
        Ok(status) => status.code().unwrap_or(1),
        Err(err) => {
            eprintln!("undoo failed to wait for namespaced child: {err}");
            1
        }
    }
}

/// Runs inside the unshared namespace: prunes stale bind mounts under
/// `mounts_root` (everything except `layer_to_keep`), then execs `cmd`.
fn run_namespaced(args: &[String]) -> i32 {
    let (mounts_root, layer_to_keep, cmd, cmd_args) = match args {
        [mounts_root, layer_to_keep, cmd, rest @ ..] => (mounts_root, layer_to_keep, cmd, rest),
        _ => {
            eprintln!("undoo usage: undoo <mounts-root> <layer-to-keep> <cmd> [args...]");
            return 1;
        }
    };

    let proc_mounts = match fs::read_to_string("/proc/self/mounts") {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("undoo failed to read /proc/self/mounts: {err}");
            return 2;
        }
    };

    for mount_point in mounts::mounts_to_prune(&proc_mounts, mounts_root, layer_to_keep) {
        if let Err(err) = nix::mount::umount(mount_point) {
            eprintln!("undoo failed to unmount {mount_point}: {err}");
            return 2;
        }
    }

    let cmd_c = match CString::new(cmd.as_bytes()) {
        Ok(cmd_c) => cmd_c,
        Err(_) => {
            eprintln!("undoo {cmd}: command contains an interior nul byte");
            return 3;
        }
    };
    let mut argv = vec![cmd_c.clone()];
    for arg in cmd_args {
        match CString::new(arg.as_bytes()) {
            Ok(arg_c) => argv.push(arg_c),
            Err(_) => {
                eprintln!("undoo {cmd}: argument contains an interior nul byte");
                return 3;
            }
        }
    }

    if let Err(err) = execvp(&cmd_c, &argv) {
        eprintln!("undoo {cmd}: {err}");
        return 3;
    }

    unreachable!("execvp only returns on error")
}
