//! Pure mount-table filtering, kept separate from the actual `umount(2)`
//! calls so the skip logic can be unit tested without root or a mount
//! namespace, mirroring how namespace-flag bookkeeping is kept separate
//! from the syscalls that act on it.

/// Picks the mount points under `mounts_root` that should be unmounted,
/// reading `proc_mounts` in `/proc/self/mounts` format (whitespace-separated
/// fields, mount point is the second field).
///
/// A line is kept (i.e. its mount point is returned) unless:
/// - the full line does not contain `mounts_root`, or
/// - the full line contains `layer_to_keep`, or
/// - the mount point is exactly `mounts_root` itself (never unmount the
///   root of the tree).
pub fn mounts_to_prune<'a>(
    proc_mounts: &'a str,
    mounts_root: &str,
    layer_to_keep: &str,
) -> Vec<&'a str> {
    proc_mounts
        .lines()
        .filter(|line| line.contains(mounts_root) && !line.contains(layer_to_keep))
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter(|mount_point| *mount_point != mounts_root)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
none / rootfs rw 0 0
tmpfs /tmp/depot/aufs none rw,bind 0 0
tmpfs /tmp/depot/aufs/mnt1 tmpfs rw 0 0
tmpfs /tmp/depot/aufs/mnt2 tmpfs rw 0 0
tmpfs /unrelated/path tmpfs rw 0 0
";

    #[test]
    fn keeps_only_the_named_layer_and_drops_unrelated_mounts() {
        let pruned = mounts_to_prune(SAMPLE, "/tmp/depot/aufs", "mnt2");
        assert_eq!(pruned, vec!["/tmp/depot/aufs/mnt1"]);
    }

    #[test]
    fn never_prunes_the_tree_root_itself() {
        let pruned = mounts_to_prune(SAMPLE, "/tmp/depot/aufs", "nonexistent-layer");
        assert!(!pruned.contains(&"/tmp/depot/aufs"));
        assert!(pruned.contains(&"/tmp/depot/aufs/mnt1"));
        assert!(pruned.contains(&"/tmp/depot/aufs/mnt2"));
    }

    #[test]
    fn ignores_mounts_outside_the_depot() {
        let pruned = mounts_to_prune(SAMPLE, "/tmp/depot/aufs", "mnt1");
        assert!(!pruned.iter().any(|m| m.contains("/unrelated/path")));
    }

    #[test]
    fn empty_mount_table_prunes_nothing() {
        assert!(mounts_to_prune("", "/tmp/depot/aufs", "mnt2").is_empty());
    }
}
