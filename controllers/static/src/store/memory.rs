//! In-memory resource store for unit tests.
//!
//! Behaves like a minimal API server: it assigns uids and resource versions,
//! rejects stale updates, keeps status untouched on spec updates and allocates
//! node ports and cluster IPs for LoadBalancer services. Every call is
//! recorded so tests can assert on the exact mutations a pass performed.

use super::{ObjectStore, StatusStore, StoreError, object_key};
use async_trait::async_trait;
use kube::Resource;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Store operation, as recorded in the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Create,
    Update,
    UpdateStatus,
}

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub verb: Verb,
    pub kind: String,
    pub name: String,
}

#[derive(Default)]
struct State {
    objects: HashMap<(String, String, String), Value>,
    calls: Vec<StoreCall>,
    failures: HashSet<(Verb, String)>,
    next_version: u64,
    next_node_port: i64,
}

/// Mock resource store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

fn kind_of<K: Resource<DynamicType = ()>>() -> String {
    K::kind(&()).to_string()
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an object directly, bypassing the call log (test setup).
    pub fn insert<K>(&self, object: &K)
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let (namespace, name) = object_key(object).unwrap();
        let mut value = serde_json::to_value(object).unwrap();
        let mut state = self.state.lock().unwrap();
        state.next_version += 1;
        let version = state.next_version.to_string();
        let meta = &mut value["metadata"];
        if meta.get("uid").is_none() {
            meta["uid"] = Value::String(format!("uid-{name}"));
        }
        meta["resourceVersion"] = Value::String(version);
        state.objects.insert((kind_of::<K>(), namespace, name), value);
    }

    /// Reads an object directly, bypassing the call log (test assertions).
    pub fn fetch<K>(&self, namespace: &str, name: &str) -> Option<K>
    where
        K: Resource<DynamicType = ()> + DeserializeOwned,
    {
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(kind_of::<K>(), namespace.to_string(), name.to_string()))
            .map(|v| serde_json::from_value(v.clone()).unwrap())
    }

    /// Makes every `verb` call on `K` fail with `StoreError::Unavailable`.
    pub fn fail<K: Resource<DynamicType = ()>>(&self, verb: Verb) {
        self.state.lock().unwrap().failures.insert((verb, kind_of::<K>()));
    }

    /// Recorded calls, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Recorded mutating calls (create, update, status update).
    pub fn mutations(&self) -> Vec<StoreCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.verb != Verb::Get)
            .collect()
    }

    /// Number of recorded `verb` calls on `K`.
    pub fn count<K: Resource<DynamicType = ()>>(&self, verb: Verb) -> usize {
        let kind = kind_of::<K>();
        self.calls()
            .iter()
            .filter(|c| c.verb == verb && c.kind == kind)
            .count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, verb: Verb, kind: &str, name: &str) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(StoreCall {
            verb,
            kind: kind.to_string(),
            name: name.to_string(),
        });
        if state.failures.contains(&(verb, kind.to_string())) {
            return Err(StoreError::Unavailable(format!("injected {verb:?} failure for {kind} {name}")));
        }
        Ok(())
    }
}

/// Emulates the allocator: every LoadBalancer port gets a node port and the
/// service gets a cluster IP, unless already set.
fn allocate_service_fields(value: &mut Value, next_node_port: &mut i64) {
    let spec = &mut value["spec"];
    if spec.get("clusterIP").is_none() {
        spec["clusterIP"] = Value::String("10.96.0.10".to_string());
    }
    if spec.get("type").and_then(Value::as_str) != Some("LoadBalancer") {
        return;
    }
    if let Some(ports) = spec.get_mut("ports").and_then(Value::as_array_mut) {
        for port in ports {
            if port.get("nodePort").is_none() {
                *next_node_port += 1;
                port["nodePort"] = Value::from(30_000 + *next_node_port);
            }
        }
    }
}

#[async_trait]
impl<K> ObjectStore<K> for MemoryStore
where
    K: Resource<DynamicType = ()> + Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<Option<K>, StoreError> {
        let kind = kind_of::<K>();
        self.record(Verb::Get, &kind, name)?;
        let state = self.state.lock().unwrap();
        state
            .objects
            .get(&(kind, namespace.to_string(), name.to_string()))
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn create(&self, object: &K) -> Result<K, StoreError> {
        let kind = kind_of::<K>();
        let (namespace, name) = object_key(object)?;
        self.record(Verb::Create, &kind, &name)?;

        let mut value = serde_json::to_value(object)?;
        let mut state = self.state.lock().unwrap();
        let key = (kind.clone(), namespace, name.clone());
        if state.objects.contains_key(&key) {
            return Err(StoreError::Conflict(format!("{kind} {name} already exists")));
        }
        state.next_version += 1;
        value["metadata"]["uid"] = Value::String(format!("uid-{name}"));
        value["metadata"]["resourceVersion"] = Value::String(state.next_version.to_string());
        if kind == "Service" {
            allocate_service_fields(&mut value, &mut state.next_node_port);
        }
        state.objects.insert(key, value.clone());
        Ok(serde_json::from_value(value)?)
    }

    async fn update(&self, object: &K) -> Result<K, StoreError> {
        let kind = kind_of::<K>();
        let (namespace, name) = object_key(object)?;
        self.record(Verb::Update, &kind, &name)?;

        let mut value = serde_json::to_value(object)?;
        let mut state = self.state.lock().unwrap();
        let key = (kind.clone(), namespace, name.clone());
        let Some(stored) = state.objects.get(&key).cloned() else {
            return Err(StoreError::Unavailable(format!("{kind} {name} not found")));
        };
        let sent_version = value["metadata"].get("resourceVersion").cloned();
        if let Some(sent) = sent_version {
            if Some(&sent) != stored["metadata"].get("resourceVersion") {
                return Err(StoreError::Conflict(format!("{kind} {name} was modified")));
            }
        }

        state.next_version += 1;
        value["metadata"]["uid"] = stored["metadata"]["uid"].clone();
        value["metadata"]["resourceVersion"] = Value::String(state.next_version.to_string());
        match stored.get("status") {
            Some(status) => value["status"] = status.clone(),
            None => {
                if let Some(obj) = value.as_object_mut() {
                    obj.remove("status");
                }
            }
        }
        if kind == "Service" {
            allocate_service_fields(&mut value, &mut state.next_node_port);
        }
        state.objects.insert(key, value.clone());
        Ok(serde_json::from_value(value)?)
    }
}

#[async_trait]
impl<K> StatusStore<K> for MemoryStore
where
    K: Resource<DynamicType = ()> + Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    async fn update_status(&self, object: &K) -> Result<K, StoreError> {
        let kind = kind_of::<K>();
        let (namespace, name) = object_key(object)?;
        self.record(Verb::UpdateStatus, &kind, &name)?;

        let value = serde_json::to_value(object)?;
        let mut state = self.state.lock().unwrap();
        state.next_version += 1;
        let version = state.next_version.to_string();
        let Some(stored) = state.objects.get_mut(&(kind.clone(), namespace, name.clone())) else {
            return Err(StoreError::Unavailable(format!("{kind} {name} not found")));
        };
        stored["status"] = value.get("status").cloned().unwrap_or_default();
        stored["metadata"]["resourceVersion"] = Value::String(version);
        Ok(serde_json::from_value(stored.clone())?)
    }
}
