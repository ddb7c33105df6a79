use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::handle::Handle;
use crate::properties::Properties;

/// How a bind mount is exposed inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindMountMode {
    Ro,
    Rw,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindMount {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub mode: BindMountMode,
}

/// Disk quota scope, as handed verbatim to the volume provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskLimit {
    pub byte_hard: u64,
    pub scope: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Limits {
    pub cpu_shares: u64,
    pub memory_bytes: u64,
    pub disk: DiskLimit,
    pub pid_limit: u64,
}

/// Caller-supplied network spec. An empty subnet means "let the networker
/// pick a default".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub subnet: String,
}

/// Input to [`crate::traits::Orchestrator::create`](../garden-core).
///
/// Kept distinct from [`DesiredContainerSpec`]: this is what a caller
/// asks for (an unresolved rootfs URL, an optional handle, grace time and
/// user properties the orchestrator itself consumes); `DesiredContainerSpec`
/// is what the containerizer actually receives, after rootfs provisioning
/// has turned the URL into a path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerSpec {
    pub handle: Option<Handle>,
    pub rootfs_path: String,
    pub hostname: Option<String>,
    pub bind_mounts: Vec<BindMount>,
    pub privileged: bool,
    pub limits: Limits,
    pub env: Vec<String>,
    pub grace_time: Duration,
    pub properties: Properties,
    pub network: NetworkSpec,
}

/// Input to the containerizer's `Create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesiredContainerSpec {
    pub handle: Handle,
    pub rootfs_path: PathBuf,
    pub hostname: String,
    pub bind_mounts: Vec<BindMount>,
    pub privileged: bool,
    pub limits: Limits,
    pub env: Vec<String>,
}

/// What the containerizer observes about a live container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActualContainerSpec {
    pub pid: i32,
    pub bundle_path: PathBuf,
    pub stopped: bool,
    pub process_ids: Vec<String>,
    pub events: Vec<String>,
    pub limits: Limits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CpuStat {
    pub usage_usec: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStat {
    pub usage_bytes: u64,
    pub limit_bytes: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerMetrics {
    pub cpu: CpuStat,
    pub memory: MemoryStat,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiskStat {
    pub bytes_used: u64,
    pub bytes_exclusive: u64,
}

/// Total capacity reported by [`crate::traits::SysInfoProvider`] combined
/// with the networker's own ceiling.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Capacity {
    pub memory_in_bytes: u64,
    pub disk_in_bytes: u64,
    pub max_containers: u64,
}

/// A `NetIn` mapping request/response: host port, container port.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PortMapping {
    pub host_port: u32,
    pub container_port: u32,
}

/// A single outbound traffic rule, opaque to the orchestrator beyond being
/// handed verbatim to the networker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetOutRule {
    pub protocol: String,
    pub destination: String,
}

/// Per-handle result of a bulk info/metrics call: never aborts the batch,
/// wraps any per-handle failure as a string instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkEntry<T> {
    pub value: Option<T>,
    pub error: Option<String>,
}

impl<T> BulkEntry<T> {
    pub fn ok(value: T) -> Self {
        BulkEntry {
            value: Some(value),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        BulkEntry {
            value: None,
            error: Some(message.into()),
        }
    }
}
