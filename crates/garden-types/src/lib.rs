//! Data model, collaborator traits, and error types shared by the garden
//! orchestrator crates. Plays the role `oci-spec` plays for a container
//! runtime: a pure contract crate with no behavior of its own.

pub mod error;
pub mod handle;
pub mod properties;
pub mod rootfs_url;
pub mod spec;
pub mod traits;

pub use error::{CollaboratorResultExt, GardenError, SimpleError};
pub use handle::{validate_handle, Handle};
pub use properties::{
    Properties, CONTAINER_IP_KEY, EXTERNAL_IP_KEY, GRACE_TIME_KEY, HOST_IP_KEY, MAPPED_PORTS_KEY,
    STATE_CREATED, STATE_KEY,
};
pub use rootfs_url::{RootfsUrl, RAW_ROOTFS_SCHEME};
pub use spec::{
    ActualContainerSpec, BindMount, BindMountMode, BulkEntry, Capacity, ContainerMetrics,
    ContainerSpec, CpuStat, DesiredContainerSpec, DiskLimit, DiskStat, Limits, MemoryStat,
    NetOutRule, NetworkSpec, PortMapping,
};
pub use traits::{Containerizer, IdGenerator, Networker, PropertyManager, Restorer, Starter,
    SysInfoProvider, VolumeCreator};
