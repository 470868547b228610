//! Traversal accumulator

use crate::models::{Edge, EdgeKind, ObjectKey};
use crate::objectvisitor::{HandlerError, ObjectHandler};
use kube::core::DynamicObject;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lookup error texts by the object they concern
pub type LookupErrors = BTreeMap<ObjectKey, Vec<String>>;

pub(crate) static NO_LOOKUP_ERRORS: LookupErrors = BTreeMap::new();

/// Everything one traversal discovered
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub root: Option<ObjectKey>,
    pub objects: BTreeMap<ObjectKey, DynamicObject>,
    pub edges: BTreeSet<Edge>,
    pub lookup_errors: LookupErrors,
}

/// [`ObjectHandler`] that records objects, edges and lookup errors.
///
/// Refuses to grow past `max_objects` distinct objects.
pub struct Collector {
    inner: Mutex<Snapshot>,
    max_objects: usize,
}

impl Collector {
    pub fn new(max_objects: usize) -> Self {
        Self {
            inner: Mutex::new(Snapshot::default()),
            max_objects,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(
        snapshot: &mut Snapshot,
        object: &DynamicObject,
        max_objects: usize,
    ) -> Result<ObjectKey, HandlerError> {
        let key = ObjectKey::from_object(object);
        if !snapshot.objects.contains_key(&key) {
            if snapshot.objects.len() >= max_objects {
                return Err(HandlerError::TooManyObjects { limit: max_objects });
            }
            snapshot.objects.insert(key.clone(), object.clone());
        }
        Ok(key)
    }

    pub fn object_count(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ObjectHandler for Collector {
    fn process(&self, object: &DynamicObject) -> Result<(), HandlerError> {
        let mut snapshot = self.lock();
        let key = Self::insert(&mut snapshot, object, self.max_objects)?;
        snapshot.root.get_or_insert(key);
        Ok(())
    }

    fn add_edge(
        &self,
        from: &DynamicObject,
        to: &DynamicObject,
        kind: EdgeKind,
    ) -> Result<(), HandlerError> {
        let mut snapshot = self.lock();
        let from = Self::insert(&mut snapshot, from, self.max_objects)?;
        let to = Self::insert(&mut snapshot, to, self.max_objects)?;
        snapshot.edges.insert(Edge::new(from, to, kind));
        Ok(())
    }

    fn add_lookup_error(&self, object: &DynamicObject, error: String) {
        let key = ObjectKey::from_object(object);
        let mut snapshot = self.lock();
        let errors = snapshot.lookup_errors.entry(key).or_default();
        if !errors.contains(&error) {
            errors.push(error);
        }
    }
}
