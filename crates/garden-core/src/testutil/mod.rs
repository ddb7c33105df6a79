//! Hand-rolled fake collaborators: plain structs recording calls behind a
//! mutex, rather than a mocking-framework macro. Gated behind the
//! `test_utils` feature so integration tests in other crates could pull
//! them in too.

use std::sync::Mutex;

use garden_types::{
    ActualContainerSpec, ContainerMetrics, DesiredContainerSpec, GardenError, Handle, NetOutRule,
    Networker, NetworkSpec, PortMapping, Restorer, RootfsUrl, Starter, SysInfoProvider,
    VolumeCreator,
};

/// A [`garden_types::Containerizer`] whose `create` hands out incrementing
/// fake PIDs and whose `handles` reflects whatever has been created/not yet
/// destroyed.
#[derive(Default)]
pub struct FakeContainerizer {
    inner: Mutex<FakeContainerizerState>,
}

#[derive(Default)]
struct FakeContainerizerState {
    handles: Vec<Handle>,
    next_pid: i32,
    fail_create: Option<String>,
    fail_destroy_handle: Option<Handle>,
    destroyed: Vec<Handle>,
}

impl FakeContainerizer {
    pub fn new() -> Self {
        FakeContainerizer {
            inner: Mutex::new(FakeContainerizerState {
                next_pid: 100,
                ..Default::default()
            }),
        }
    }

    pub fn fail_create(self, message: impl Into<String>) -> Self {
        self.inner.lock().unwrap().fail_create = Some(message.into());
        self
    }

    /// Makes `destroy` fail the first time it is called for `handle`, then
    /// succeed on any later retry (matching the real containerizer once the
    /// underlying process is actually gone).
    pub fn fail_destroy_once(self, handle: impl Into<Handle>) -> Self {
        self.inner.lock().unwrap().fail_destroy_handle = Some(handle.into());
        self
    }

    pub fn destroyed(&self) -> Vec<Handle> {
        self.inner.lock().unwrap().destroyed.clone()
    }
}

impl garden_types::Containerizer for FakeContainerizer {
    fn create(&self, spec: &DesiredContainerSpec) -> Result<(), GardenError> {
        let mut state = self.inner.lock().unwrap();
        if let Some(message) = state.fail_create.clone() {
            return Err(GardenError::collaborator(
                "containerizer.create",
                garden_types::SimpleError::new(message),
            ));
        }
        if state.handles.contains(&spec.handle) {
            return Err(GardenError::handle_conflict(spec.handle.clone()));
        }
        state.handles.push(spec.handle.clone());
        Ok(())
    }

    fn handles(&self) -> Result<Vec<Handle>, GardenError> {
        Ok(self.inner.lock().unwrap().handles.clone())
    }

    fn destroy(&self, handle: &str) -> Result<(), GardenError> {
        let mut state = self.inner.lock().unwrap();
        if state.fail_destroy_handle.as_deref() == Some(handle) {
            state.fail_destroy_handle = None;
            return Err(GardenError::collaborator(
                "containerizer.destroy",
                garden_types::SimpleError::new(format!("destroy failed for {handle}")),
            ));
        }
        state.handles.retain(|h| h != handle);
        state.destroyed.push(handle.to_owned());
        Ok(())
    }

    fn info(&self, handle: &str) -> Result<ActualContainerSpec, GardenError> {
        let mut state = self.inner.lock().unwrap();
        if !state.handles.contains(&handle.to_owned()) {
            return Err(GardenError::not_found(handle));
        }
        state.next_pid += 1;
        Ok(ActualContainerSpec {
            pid: state.next_pid,
            bundle_path: format!("/run/garden/{handle}").into(),
            stopped: false,
            process_ids: Vec::new(),
            events: Vec::new(),
            limits: Default::default(),
        })
    }

    fn metrics(&self, _handle: &str) -> Result<ContainerMetrics, GardenError> {
        Ok(ContainerMetrics::default())
    }

    fn run(&self, _handle: &str, _process_guid: &str, _command: &[String]) -> Result<(), GardenError> {
        Ok(())
    }

    fn attach(&self, _handle: &str, _process_guid: &str) -> Result<(), GardenError> {
        Ok(())
    }

    fn stop(&self, _handle: &str, _kill: bool) -> Result<(), GardenError> {
        Ok(())
    }

    fn stream_in(
        &self,
        _handle: &str,
        _destination: &str,
        _data: &mut dyn std::io::Read,
    ) -> Result<(), GardenError> {
        Ok(())
    }

    fn stream_out(
        &self,
        _handle: &str,
        _source: &str,
        _out: &mut dyn std::io::Write,
    ) -> Result<(), GardenError> {
        Ok(())
    }
}

/// A [`Networker`] that can be configured to fail, to exercise the
/// rollback path in `Orchestrator::create`.
#[derive(Default)]
pub struct FakeNetworker {
    fail_network: Mutex<Option<String>>,
    destroyed: Mutex<Vec<Handle>>,
}

impl FakeNetworker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_network(self, message: impl Into<String>) -> Self {
        *self.fail_network.lock().unwrap() = Some(message.into());
        self
    }

    pub fn destroyed(&self) -> Vec<Handle> {
        self.destroyed.lock().unwrap().clone()
    }
}

impl Networker for FakeNetworker {
    fn network(&self, _spec: &NetworkSpec, _handle: &str, _pid: i32) -> Result<(), GardenError> {
        if let Some(message) = self.fail_network.lock().unwrap().clone() {
            return Err(GardenError::collaborator(
                "networker.network",
                garden_types::SimpleError::new(message),
            ));
        }
        Ok(())
    }

    fn destroy(&self, handle: &str) -> Result<(), GardenError> {
        self.destroyed.lock().unwrap().push(handle.to_owned());
        Ok(())
    }

    fn capacity(&self) -> u64 {
        64
    }

    fn net_in(&self, _handle: &str, mapping: PortMapping) -> Result<PortMapping, GardenError> {
        Ok(mapping)
    }

    fn net_out(&self, _handle: &str, _rule: &NetOutRule) -> Result<(), GardenError> {
        Ok(())
    }

    fn restore(&self, _handle: &str) -> Result<(), GardenError> {
        Ok(())
    }
}

/// A [`VolumeCreator`] that records every handle it was asked to destroy
/// and never actually touches a filesystem.
#[derive(Default)]
pub struct FakeVolumeCreator {
    destroyed: Mutex<Vec<Handle>>,
    created: Mutex<Vec<Handle>>,
}

impl FakeVolumeCreator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn destroyed(&self) -> Vec<Handle> {
        self.destroyed.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<Handle> {
        self.created.lock().unwrap().clone()
    }
}

impl VolumeCreator for FakeVolumeCreator {
    fn create(
        &self,
        handle: &str,
        url: &RootfsUrl,
        _quota_bytes: u64,
        _quota_scope: &str,
        _namespaced: bool,
    ) -> Result<(std::path::PathBuf, Vec<String>), GardenError> {
        self.created.lock().unwrap().push(handle.to_owned());
        Ok((
            format!("/var/garden/volumes/{handle}").into(),
            vec![format!("ROOTFS_SOURCE={}", url.as_str())],
        ))
    }

    fn destroy(&self, handle: &str) -> Result<(), GardenError> {
        self.destroyed.lock().unwrap().push(handle.to_owned());
        Ok(())
    }

    fn metrics(&self, _handle: &str) -> Result<garden_types::DiskStat, GardenError> {
        Ok(garden_types::DiskStat::default())
    }

    fn gc(&self) -> Result<(), GardenError> {
        Ok(())
    }
}

/// A [`Restorer`] whose to-destroy set is fixed at construction time.
pub struct FakeRestorer {
    to_destroy: Vec<Handle>,
}

impl FakeRestorer {
    pub fn new(to_destroy: Vec<Handle>) -> Self {
        FakeRestorer { to_destroy }
    }
}

impl Restorer for FakeRestorer {
    fn restore(&self, _handles: &[Handle]) -> Vec<Handle> {
        self.to_destroy.clone()
    }
}

pub struct FakeSysInfoProvider {
    pub memory: u64,
    pub disk: u64,
}

impl Default for FakeSysInfoProvider {
    fn default() -> Self {
        FakeSysInfoProvider {
            memory: 8 * 1024 * 1024 * 1024,
            disk: 100 * 1024 * 1024 * 1024,
        }
    }
}

impl SysInfoProvider for FakeSysInfoProvider {
    fn total_memory(&self) -> Result<u64, GardenError> {
        Ok(self.memory)
    }

    fn total_disk(&self) -> Result<u64, GardenError> {
        Ok(self.disk)
    }
}

/// Deterministic id generator for tests: `generated-0`, `generated-1`, ...
#[derive(Default)]
pub struct FakeIdGenerator {
    next: Mutex<u64>,
}

impl FakeIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl garden_types::IdGenerator for FakeIdGenerator {
    fn generate(&self) -> Handle {
        let mut next = self.next.lock().unwrap();
        let handle = format!("generated-{next}");
        *next += 1;
        handle
    }
}

/// A [`Starter`] that records whether it ran and can be made to fail.
#[derive(Default)]
pub struct FakeStarter {
    ran: Mutex<bool>,
    fail: bool,
}

impl FakeStarter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        FakeStarter {
            ran: Mutex::new(false),
            fail: true,
        }
    }

    pub fn ran(&self) -> bool {
        *self.ran.lock().unwrap()
    }
}

impl Starter for FakeStarter {
    fn start(&self) -> Result<(), GardenError> {
        *self.ran.lock().unwrap() = true;
        if self.fail {
            return Err(GardenError::collaborator(
                "starter.start",
                garden_types::SimpleError::new("starter failed"),
            ));
        }
        Ok(())
    }
}
