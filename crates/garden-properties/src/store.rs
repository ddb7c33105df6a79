use std::collections::BTreeMap;

use garden_types::{GardenError, Handle, PropertyManager, Properties};
use parking_lot::Mutex;

/// In-memory `handle -> (name -> value)` map.
///
/// A single mutex covers the whole structure; per-handle locks would be a
/// valid optimization but nothing here is contended enough to need one.
/// `parking_lot::Mutex` rather than `std::sync::Mutex`: no poisoning to
/// thread through every call site.
#[derive(Default)]
pub struct PropertyStore {
    handles: Mutex<BTreeMap<Handle, Properties>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PropertyManager for PropertyStore {
    fn set(&self, handle: &str, name: &str, value: &str) {
        let mut handles = self.handles.lock();
        handles
            .entry(handle.to_owned())
            .or_default()
            .insert(name.to_owned(), value.to_owned());
    }

    fn get(&self, handle: &str, name: &str) -> Option<String> {
        let handles = self.handles.lock();
        handles.get(handle)?.get(name).cloned()
    }

    fn remove(&self, handle: &str, name: &str) -> Result<(), GardenError> {
        let mut handles = self.handles.lock();
        let present = handles
            .get_mut(handle)
            .map(|props| props.remove(name).is_some())
            .unwrap_or(false);

        if present {
            Ok(())
        } else {
            Err(GardenError::not_found(format!("{handle}:{name}")))
        }
    }

    fn all(&self, handle: &str) -> Properties {
        let handles = self.handles.lock();
        handles.get(handle).cloned().unwrap_or_default()
    }

    fn matches_all(&self, handle: &str, filter: &Properties) -> bool {
        let handles = self.handles.lock();
        let props = match handles.get(handle) {
            Some(props) => props,
            None => return filter.is_empty(),
        };
        filter
            .iter()
            .all(|(k, v)| props.get(k).is_some_and(|actual| actual == v))
    }

    fn destroy_key_space(&self, handle: &str) {
        let mut handles = self.handles.lock();
        handles.remove(handle);
        tracing::debug!(handle, "property key-space destroyed");
    }
}
