//! Collected relationships of one object, ready to be followed

use super::{ObjectHandler, TraversalError, Visitor};
use crate::models::{EdgeKind, to_dynamic};
use futures::stream::{self, TryStreamExt};
use kube::core::DynamicObject;
use serde::Serialize;
use std::fmt::Display;

/// Edge direction relative to the object being visited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// visited object -> related object
    Outgoing,
    /// related object -> visited object
    Incoming,
}

#[derive(Debug, Clone)]
pub struct Relation {
    pub object: DynamicObject,
    pub kind: EdgeKind,
    pub direction: Direction,
}

/// Relationship accumulator used by kind visitors.
///
/// Lookup failures are kept alongside the related objects so that one failed
/// query degrades the object instead of aborting its siblings.
pub struct Relations<'a> {
    object: &'a DynamicObject,
    related: Vec<Relation>,
    errors: Vec<String>,
}

impl<'a> Relations<'a> {
    pub fn new(object: &'a DynamicObject) -> Self {
        Self {
            object,
            related: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn outgoing(&mut self, object: DynamicObject, kind: EdgeKind) {
        self.related.push(Relation {
            object,
            kind,
            direction: Direction::Outgoing,
        });
    }

    pub fn incoming(&mut self, object: DynamicObject, kind: EdgeKind) {
        self.related.push(Relation {
            object,
            kind,
            direction: Direction::Incoming,
        });
    }

    pub fn outgoing_typed<K>(&mut self, resource: &K, kind: EdgeKind)
    where
        K: k8s_openapi::Resource + Serialize,
    {
        if let Some(object) = self.record(to_dynamic(resource)) {
            self.outgoing(object, kind);
        }
    }

    pub fn incoming_typed<K>(&mut self, resource: &K, kind: EdgeKind)
    where
        K: k8s_openapi::Resource + Serialize,
    {
        if let Some(object) = self.record(to_dynamic(resource)) {
            self.incoming(object, kind);
        }
    }

    /// Keep the value of a lookup, or remember its error
    pub fn record<T, E: Display>(&mut self, result: Result<T, E>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    "Lookup failed for {}: {}",
                    self.object.metadata.name.as_deref().unwrap_or_default(),
                    e
                );
                self.errors.push(e.to_string());
                None
            }
        }
    }

    pub fn related(&self) -> &[Relation] {
        &self.related
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Report lookup errors, then record each edge and visit each related
    /// object with bounded concurrency
    pub async fn follow(
        self,
        handler: &dyn ObjectHandler,
        visitor: &dyn Visitor,
    ) -> Result<(), TraversalError> {
        let Relations {
            object,
            related,
            errors,
        } = self;

        for error in errors {
            handler.add_lookup_error(object, error);
        }

        stream::iter(related.into_iter().map(Ok::<_, TraversalError>))
            .try_for_each_concurrent(visitor.max_concurrency(), |relation| async move {
                match relation.direction {
                    Direction::Outgoing => handler.add_edge(object, &relation.object, relation.kind)?,
                    Direction::Incoming => handler.add_edge(&relation.object, object, relation.kind)?,
                }
                visitor.visit(&relation.object, handler, false).await
            })
            .await
    }
}
