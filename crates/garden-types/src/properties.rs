use std::collections::BTreeMap;

/// Per-handle string-to-string property map.
///
/// A `BTreeMap` rather than a `HashMap`: property listings and the
/// `Containers` filter are easiest to reason about (and to test) when
/// iteration order is deterministic. The original Go map gave no order
/// guarantee either, so this is not a behavioral narrowing.
pub type Properties = BTreeMap<String, String>;

/// Written by the networker once it has wired up a container's network.
pub const CONTAINER_IP_KEY: &str = "garden.network.container-ip";
pub const HOST_IP_KEY: &str = "garden.network.host-ip";
pub const EXTERNAL_IP_KEY: &str = "garden.network.external-ip";
pub const MAPPED_PORTS_KEY: &str = "garden.network.mapped-ports";

/// Decimal nanoseconds. Absent means "no expiry" (grace time zero).
pub const GRACE_TIME_KEY: &str = "garden.grace-time";

/// Set to [`STATE_CREATED`] as the last step of a successful `Create`.
/// Its presence is what makes a handle visible to `Containers`/`List`.
pub const STATE_KEY: &str = "garden.state";
pub const STATE_CREATED: &str = "created";
