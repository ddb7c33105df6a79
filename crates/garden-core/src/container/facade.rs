use std::io::{Read, Write};
use std::sync::Arc;

use garden_types::{
    Containerizer, GardenError, Handle, NetOutRule, Networker, PortMapping, PropertyManager,
    Properties, VolumeCreator,
};

use super::Capabilities;

/// Binds one handle to the capability set. Holds no state beyond the
/// handle and references into the shared capabilities — every operation
/// is a forward to the appropriate collaborator, keyed by the handle,
/// rather than a copy of container state.
#[derive(Clone)]
pub struct Container {
    handle: Handle,
    caps: Arc<Capabilities>,
}

impl Container {
    pub(crate) fn new(handle: Handle, caps: Arc<Capabilities>) -> Self {
        Container { handle, caps }
    }

    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn run(&self, process_guid: &str, command: &[String]) -> Result<(), GardenError> {
        self.caps
            .containerizer
            .run(&self.handle, process_guid, command)
    }

    pub fn attach(&self, process_guid: &str) -> Result<(), GardenError> {
        self.caps.containerizer.attach(&self.handle, process_guid)
    }

    pub fn stop(&self, kill: bool) -> Result<(), GardenError> {
        self.caps.containerizer.stop(&self.handle, kill)
    }

    pub fn info(&self) -> Result<garden_types::ActualContainerSpec, GardenError> {
        self.caps.containerizer.info(&self.handle)
    }

    pub fn metrics(&self) -> Result<garden_types::ContainerMetrics, GardenError> {
        self.caps.containerizer.metrics(&self.handle)
    }

    pub fn stream_in(&self, destination: &str, data: &mut dyn Read) -> Result<(), GardenError> {
        self.caps
            .containerizer
            .stream_in(&self.handle, destination, data)
    }

    pub fn stream_out(&self, source: &str, out: &mut dyn Write) -> Result<(), GardenError> {
        self.caps
            .containerizer
            .stream_out(&self.handle, source, out)
    }

    pub fn net_in(&self, mapping: PortMapping) -> Result<PortMapping, GardenError> {
        self.caps.networker.net_in(&self.handle, mapping)
    }

    pub fn net_out(&self, rule: &NetOutRule) -> Result<(), GardenError> {
        self.caps.networker.net_out(&self.handle, rule)
    }

    pub fn set_grace_time(&self, grace_time: std::time::Duration) -> Result<(), GardenError> {
        self.set_property(
            garden_types::GRACE_TIME_KEY,
            &grace_time.as_nanos().to_string(),
        )
    }

    pub fn set_property(&self, name: &str, value: &str) -> Result<(), GardenError> {
        self.caps.properties.set(&self.handle, name, value);
        Ok(())
    }

    pub fn get_property(&self, name: &str) -> Option<String> {
        self.caps.properties.get(&self.handle, name)
    }

    pub fn remove_property(&self, name: &str) -> Result<(), GardenError> {
        self.caps.properties.remove(&self.handle, name)
    }

    pub fn properties(&self) -> Properties {
        self.caps.properties.all(&self.handle)
    }
}

/// The shared capability set every [`Container`] and the
/// [`crate::orchestrator::Orchestrator`] itself are built from.
pub(crate) struct Capabilities {
    pub containerizer: Arc<dyn Containerizer>,
    pub networker: Arc<dyn Networker>,
    pub volumes: Arc<dyn VolumeCreator>,
    pub properties: Arc<dyn PropertyManager>,
}
