use std::sync::Arc;
use std::time::Duration;

use garden_types::{
    validate_handle, ActualContainerSpec, BulkEntry, Capacity, CollaboratorResultExt,
    ContainerMetrics, ContainerSpec, DesiredContainerSpec, GardenError, Handle, IdGenerator,
    Networker, PropertyManager, Properties, RootfsUrl, Restorer, Starter, SysInfoProvider,
    VolumeCreator, STATE_CREATED, STATE_KEY,
};
use garden_types::Containerizer;

use crate::container::{Capabilities, Container};

/// Composes a filesystem provisioner, a container runtime, a network
/// provisioner and a property store into a single transactional
/// create/destroy pipeline with deterministic ordering and cleanup on
/// partial failure.
pub struct Orchestrator {
    containerizer: Arc<dyn Containerizer>,
    networker: Arc<dyn Networker>,
    volumes: Arc<dyn VolumeCreator>,
    properties: Arc<dyn PropertyManager>,
    sysinfo: Arc<dyn SysInfoProvider>,
    id_generator: Arc<dyn IdGenerator>,
    restorer: Arc<dyn Restorer>,
    starters: Vec<Arc<dyn Starter>>,
    max_containers: u64,
    caps: Arc<Capabilities>,
}

/// Builds an [`Orchestrator`] from its capability set.
///
/// # Example
///
/// ```no_run
/// use garden_core::OrchestratorBuilder;
/// # fn wire() -> garden_core::Orchestrator {
/// # unimplemented!()
/// # }
/// let orchestrator = wire();
/// ```
pub struct OrchestratorBuilder {
    containerizer: Arc<dyn Containerizer>,
    networker: Arc<dyn Networker>,
    volumes: Arc<dyn VolumeCreator>,
    properties: Arc<dyn PropertyManager>,
    sysinfo: Arc<dyn SysInfoProvider>,
    id_generator: Arc<dyn IdGenerator>,
    restorer: Arc<dyn Restorer>,
    starters: Vec<Arc<dyn Starter>>,
    max_containers: u64,
}

impl OrchestratorBuilder {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        containerizer: Arc<dyn Containerizer>,
        networker: Arc<dyn Networker>,
        volumes: Arc<dyn VolumeCreator>,
        properties: Arc<dyn PropertyManager>,
        sysinfo: Arc<dyn SysInfoProvider>,
        id_generator: Arc<dyn IdGenerator>,
        restorer: Arc<dyn Restorer>,
    ) -> Self {
        OrchestratorBuilder {
            containerizer,
            networker,
            volumes,
            properties,
            sysinfo,
            id_generator,
            restorer,
            starters: Vec::new(),
            max_containers: 0,
        }
    }

    pub fn with_starter(mut self, starter: Arc<dyn Starter>) -> Self {
        self.starters.push(starter);
        self
    }

    /// Zero (the default) means unlimited.
    pub fn with_max_containers(mut self, max_containers: u64) -> Self {
        self.max_containers = max_containers;
        self
    }

    pub fn build(self) -> Orchestrator {
        let caps = Arc::new(Capabilities {
            containerizer: self.containerizer.clone(),
            networker: self.networker.clone(),
            volumes: self.volumes.clone(),
            properties: self.properties.clone(),
        });

        Orchestrator {
            containerizer: self.containerizer,
            networker: self.networker,
            volumes: self.volumes,
            properties: self.properties,
            sysinfo: self.sysinfo,
            id_generator: self.id_generator,
            restorer: self.restorer,
            starters: self.starters,
            max_containers: self.max_containers,
            caps,
        }
    }
}

impl Orchestrator {
    fn exists(&self, handle: &str) -> Result<bool, GardenError> {
        let handles = self.containerizer.handles().at("containerizer.handles")?;
        Ok(handles.iter().any(|h| h == handle))
    }

    /// The create pipeline: reject a duplicate caller-supplied handle,
    /// assign one from the id generator if none was supplied, parse the
    /// rootfs URL, garbage-collect the volume store, provision the
    /// rootfs, create the container, wire its network, then stamp grace
    /// time, user properties, and finally `garden.state=created` to make
    /// it externally visible. Any failure after the handle is resolved
    /// triggers the same cleanup sequence `destroy` uses before the
    /// original error is returned.
    pub fn create(&self, mut spec: ContainerSpec) -> Result<Container, GardenError> {
        // Step 1: reject duplicate caller-supplied handles.
        if let Some(handle) = &spec.handle {
            if self.exists(handle)? {
                return Err(GardenError::handle_conflict(handle.clone()));
            }
        }

        // Step 2: assign a handle if the caller left it blank; reject an
        // explicitly-supplied empty string rather than silently accepting
        // it as a real handle.
        let handle = spec.handle.clone().unwrap_or_else(|| self.id_generator.generate());
        validate_handle(&handle)?;
        spec.handle = Some(handle.clone());

        let span = tracing::info_span!("create", handle = %handle);
        let _enter = span.enter();
        tracing::info!("start");

        match self.create_inner(&handle, &spec) {
            Ok(container) => {
                tracing::info!("created");
                Ok(container)
            }
            Err(err) => {
                tracing::info!(cause = %err, "create-failed-cleaningup");
                if let Err(cleanup_err) = self.destroy_unchecked(&handle) {
                    tracing::error!(cause = %cleanup_err, "destroy-failed");
                }
                tracing::info!("cleanedup");
                Err(err)
            }
        }
    }

    fn create_inner(&self, handle: &str, spec: &ContainerSpec) -> Result<Container, GardenError> {
        // Step 4: parse the rootfs URL.
        let rootfs_url = RootfsUrl::parse(&spec.rootfs_path)?;

        // Step 5: volume GC is best-effort.
        if let Err(err) = self.volumes.gc() {
            tracing::warn!(cause = %err, "graph-cleanup-failed");
        }

        // Step 6: provision the rootfs.
        let (rootfs_path, mut env) = if rootfs_url.is_raw() {
            (rootfs_url.path(), Vec::new())
        } else {
            self.volumes
                .create(
                    handle,
                    &rootfs_url,
                    spec.limits.disk.byte_hard,
                    &spec.limits.disk.scope,
                    !spec.privileged,
                )
                .at("volumes.create")?
        };

        // Step 7: provider env first, then user env, plain concatenation.
        env.extend(spec.env.iter().cloned());

        let hostname = spec.hostname.clone().unwrap_or_else(|| handle.to_owned());

        self.containerizer
            .create(&DesiredContainerSpec {
                handle: handle.to_owned(),
                rootfs_path,
                hostname,
                bind_mounts: spec.bind_mounts.clone(),
                privileged: spec.privileged,
                limits: spec.limits.clone(),
                env,
            })
            .at("containerizer.create")?;

        // Step 8: read back the init pid.
        let actual = self
            .containerizer
            .info(handle)
            .at("containerizer.info")?;

        // Step 9: wire networking; the networker writes garden.network.*.
        self.networker
            .network(&spec.network, handle, actual.pid)
            .at("networker.network")?;

        // Step 10: look up the facade.
        let container = self.lookup(handle);

        // Step 11: grace time, if any.
        if !spec.grace_time.is_zero() {
            container.set_grace_time(spec.grace_time)?;
        }

        // Step 12: user-supplied properties, verbatim.
        for (name, value) in &spec.properties {
            container.set_property(name, value)?;
        }

        // Step 13: external visibility, last.
        container.set_property(STATE_KEY, STATE_CREATED)?;

        Ok(container)
    }

    pub fn lookup(&self, handle: &str) -> Container {
        Container::new(handle.to_owned(), self.caps.clone())
    }

    /// Public, checked destroy: errors with `NotFound` if the handle is
    /// not known to the containerizer.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn destroy(&self, handle: &str) -> Result<(), GardenError> {
        tracing::info!("start");
        if !self.exists(handle)? {
            return Err(GardenError::not_found(handle));
        }
        let result = self.destroy_unchecked(handle);
        tracing::info!("finished");
        result
    }

    /// The idempotent inner destroy sequence, used both by the public
    /// `destroy` and by `create`'s failure-path cleanup (which skips the
    /// not-found check so partial state is still cleaned up).
    ///
    /// Ordering is load-bearing: the container must be stopped before the
    /// network is torn down (to avoid leaking sockets that hold references
    /// to it); the network is torn down before the rootfs is unmounted
    /// (bind mounts may live under the bundle); properties are removed
    /// last so operators can inspect them if an earlier step fails
    /// mid-way on a future run.
    fn destroy_unchecked(&self, handle: &str) -> Result<(), GardenError> {
        self.containerizer.destroy(handle).at("containerizer.destroy")?;
        self.networker.destroy(handle).at("networker.destroy")?;
        self.volumes.destroy(handle).at("volumes.destroy")?;
        self.properties.destroy_key_space(handle);
        Ok(())
    }

    /// Runs registered starters, then reaps whatever the restorer says to
    /// destroy among the containerizer's surviving handles.
    #[tracing::instrument(level = "info", skip(self))]
    pub fn start(&self) -> Result<(), GardenError> {
        tracing::info!("starting");
        for starter in &self.starters {
            starter.start().at("starter.start")?;
        }

        let handles = self.containerizer.handles().at("containerizer.handles")?;
        for handle in self.restorer.restore(&handles) {
            let span = tracing::info_span!("clean-up-container", handle = %handle);
            let _enter = span.enter();
            tracing::info!("start");
            if let Err(err) = self.destroy_unchecked(&handle) {
                tracing::error!(cause = %err, "failed");
                continue;
            }
            tracing::info!("cleaned-up");
        }

        tracing::info!("completed");
        Ok(())
    }

    /// Enumerates containers whose `garden.state` is `created` and which
    /// match every entry in `filter`.
    pub fn containers(&self, filter: Properties) -> Result<Vec<Container>, GardenError> {
        let handles = self.containerizer.handles().at("containerizer.handles")?;

        let mut filter = filter;
        filter.insert(STATE_KEY.to_owned(), STATE_CREATED.to_owned());

        Ok(handles
            .into_iter()
            .filter(|handle| self.properties.matches_all(handle, &filter))
            .map(|handle| self.lookup(&handle))
            .collect())
    }

    pub fn bulk_info(
        &self,
        handles: &[Handle],
    ) -> std::collections::BTreeMap<Handle, BulkEntry<ActualContainerSpec>> {
        handles
            .iter()
            .map(|handle| {
                let container = self.lookup(handle);
                let entry = match container.info() {
                    Ok(info) => BulkEntry::ok(info),
                    Err(err) => BulkEntry::err(err.to_string()),
                };
                (handle.clone(), entry)
            })
            .collect()
    }

    pub fn bulk_metrics(
        &self,
        handles: &[Handle],
    ) -> std::collections::BTreeMap<Handle, BulkEntry<ContainerMetrics>> {
        handles
            .iter()
            .map(|handle| {
                let container = self.lookup(handle);
                let entry = match container.metrics() {
                    Ok(metrics) => BulkEntry::ok(metrics),
                    Err(err) => BulkEntry::err(err.to_string()),
                };
                (handle.clone(), entry)
            })
            .collect()
    }

    pub fn capacity(&self) -> Result<Capacity, GardenError> {
        let memory_in_bytes = self.sysinfo.total_memory().at("sysinfo.total_memory")?;
        let disk_in_bytes = self.sysinfo.total_disk().at("sysinfo.total_disk")?;

        let mut max_containers = self.networker.capacity();
        if self.max_containers > 0 && self.max_containers < max_containers {
            max_containers = self.max_containers;
        }

        Ok(Capacity {
            memory_in_bytes,
            disk_in_bytes,
            max_containers,
        })
    }

    /// Parses `garden.grace-time` as decimal nanoseconds; missing or
    /// malformed is treated as zero (no expiry), never as an error.
    pub fn grace_time(&self, container: &Container) -> Duration {
        self.properties
            .get(container.handle(), garden_types::GRACE_TIME_KEY)
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_nanos)
            .unwrap_or_default()
    }

    /// Trivial liveness check, kept for parity with the original's `Ping`.
    pub fn ping(&self) -> Result<(), GardenError> {
        Ok(())
    }

    /// No-op today: there is no background work for the orchestrator
    /// itself to quiesce. Kept for symmetry with `start`.
    pub fn stop(&self) {}
}
