//! The five capabilities the orchestrator is built from, plus the two small
//! one-shot policies (`Starter`, `Restorer`, `IdGenerator`) it also takes at
//! construction time. Every trait here is object-safe: the orchestrator is
//! wired from `Box<dyn Trait>`/`Arc<dyn Trait>` values, never a generic
//! parameter, since the set of implementations is open-ended (production
//! backends live outside this crate; tests use hand-rolled fakes).

use std::io::{Read, Write};

use crate::error::GardenError;
use crate::handle::Handle;
use crate::properties::Properties;
use crate::spec::{
    ActualContainerSpec, ContainerMetrics, DesiredContainerSpec, NetOutRule, PortMapping,
};

/// Runs and manages the OS-level container itself: namespaces, cgroups, the
/// bundle directory, the init process. Implemented outside this crate, but
/// its contract is load-bearing for the orchestrator, so it is specified
/// precisely here.
pub trait Containerizer: Send + Sync {
    fn create(&self, spec: &DesiredContainerSpec) -> Result<(), GardenError>;
    fn handles(&self) -> Result<Vec<Handle>, GardenError>;
    fn destroy(&self, handle: &str) -> Result<(), GardenError>;
    fn info(&self, handle: &str) -> Result<ActualContainerSpec, GardenError>;
    fn metrics(&self, handle: &str) -> Result<ContainerMetrics, GardenError>;

    fn run(&self, handle: &str, process_guid: &str, command: &[String])
        -> Result<(), GardenError>;
    fn attach(&self, handle: &str, process_guid: &str) -> Result<(), GardenError>;
    fn stop(&self, handle: &str, kill: bool) -> Result<(), GardenError>;
    fn stream_in(&self, handle: &str, destination: &str, data: &mut dyn Read)
        -> Result<(), GardenError>;
    fn stream_out(&self, handle: &str, source: &str, out: &mut dyn Write)
        -> Result<(), GardenError>;
}

/// Creates per-container networking (bridges, veth pairs, iptables rules,
/// IP allocation) and is responsible for writing the `garden.network.*`
/// properties once it has done so.
pub trait Networker: Send + Sync {
    fn network(&self, spec: &crate::spec::NetworkSpec, handle: &str, pid: i32)
        -> Result<(), GardenError>;
    fn destroy(&self, handle: &str) -> Result<(), GardenError>;
    fn capacity(&self) -> u64;
    fn net_in(&self, handle: &str, mapping: PortMapping) -> Result<PortMapping, GardenError>;
    fn net_out(&self, handle: &str, rule: &NetOutRule) -> Result<(), GardenError>;
    fn restore(&self, handle: &str) -> Result<(), GardenError>;
}

/// Provisions layered root filesystems and garbage-collects unreferenced
/// layers.
pub trait VolumeCreator: Send + Sync {
    /// Returns the on-disk rootfs path and a list of `KEY=VALUE` env
    /// entries to prepend to the container's environment.
    fn create(
        &self,
        handle: &str,
        url: &crate::rootfs_url::RootfsUrl,
        quota_bytes: u64,
        quota_scope: &str,
        namespaced: bool,
    ) -> Result<(std::path::PathBuf, Vec<String>), GardenError>;
    fn destroy(&self, handle: &str) -> Result<(), GardenError>;
    fn metrics(&self, handle: &str) -> Result<crate::spec::DiskStat, GardenError>;
    /// Best-effort; failures are logged by the caller and swallowed.
    fn gc(&self) -> Result<(), GardenError>;
}

/// Per-handle `name -> value` map with key-space destruction: set, get,
/// remove, snapshot the whole map, test a filter against it, or destroy
/// the entire key space for a handle in one call.
pub trait PropertyManager: Send + Sync {
    fn set(&self, handle: &str, name: &str, value: &str);
    fn get(&self, handle: &str, name: &str) -> Option<String>;
    fn remove(&self, handle: &str, name: &str) -> Result<(), GardenError>;
    fn all(&self, handle: &str) -> Properties;
    fn matches_all(&self, handle: &str, filter: &Properties) -> bool;
    /// Idempotent: removing an already-absent key space is not an error.
    fn destroy_key_space(&self, handle: &str);
}

/// One-shot startup routine (e.g. mounting the cgroup hierarchy), run in
/// registration order before the first container is restored. Any error
/// aborts startup.
pub trait Starter: Send + Sync {
    fn start(&self) -> Result<(), GardenError>;
}

/// Decides, from the containerizer's full surviving handle list, which
/// handles should be reaped.
///
/// Contract: `restore` returns only the subset of `handles` to *destroy*.
/// Any handle it does not return is assumed kept — re-attached by side
/// effect inside the `Restorer` implementation itself. The orchestrator
/// does not re-register survivors on their behalf.
pub trait Restorer: Send + Sync {
    fn restore(&self, handles: &[Handle]) -> Vec<Handle>;
}

pub trait SysInfoProvider: Send + Sync {
    fn total_memory(&self) -> Result<u64, GardenError>;
    fn total_disk(&self) -> Result<u64, GardenError>;
}

/// Generates a unique handle when a caller does not supply one. Uniqueness
/// is assumed by the orchestrator, not re-checked.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Handle;
}
