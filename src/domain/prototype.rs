//! Prototype registry: named templates cloned on demand.
//!
//! Spawning deep-copies a template and places the copy; the template itself
//! is only ever changed by [`PrototypeRegistry::register`].

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::domain::error::{DomainError, DomainResult};

/// Identifier handed out to each spawned instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@({},{})", self.x, self.y)
    }
}

/// Source of strictly increasing identifiers.
///
/// Construct once and share through an `Arc`; concurrent callers never
/// receive the same identifier. The counter never wraps: `u64::MAX` is the
/// exhausted state and is itself never handed out.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl IdAllocator {
    pub fn new(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// # Errors
    /// [`DomainError::Exhausted`] once the counter has reached `u64::MAX`.
    pub fn next_id(&self) -> DomainResult<EntityId> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_add(1))
            .map(EntityId)
            .map_err(|n| DomainError::Exhausted(format!("no identifiers left after #{}", n)))
    }

    /// The identifier the next call to [`IdAllocator::next_id`] will return.
    pub fn peek(&self) -> EntityId {
        EntityId(self.next.load(Ordering::Relaxed))
    }
}

/// An object that can act as a template.
///
/// `Clone` must be a deep copy: every owned sub-object of the clone is
/// independent of its source.
pub trait Prototype: Clone + Send + Sync {
    /// Give a freshly cloned instance its identity and placement.
    fn place(&mut self, id: EntityId, at: Position);
}

/// Keyed store of templates plus the identifier service used when spawning.
pub struct PrototypeRegistry<P: Prototype> {
    templates: RwLock<HashMap<String, P>>,
    ids: Arc<IdAllocator>,
}

impl<P: Prototype> fmt::Debug for PrototypeRegistry<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrototypeRegistry")
            .field("keys", &self.keys())
            .field("next_id", &self.ids.peek())
            .finish()
    }
}

impl<P: Prototype> PrototypeRegistry<P> {
    pub fn new(ids: Arc<IdAllocator>) -> Self {
        Self {
            templates: RwLock::new(HashMap::new()),
            ids,
        }
    }

    /// Store `prototype` under `key`, returning the template it replaces.
    #[instrument(level = "debug", skip(self, prototype))]
    pub fn register(&self, key: &str, prototype: P) -> Option<P> {
        let previous = self.templates.write().insert(key.to_string(), prototype);
        if previous.is_some() {
            debug!("replaced existing template");
        }
        previous
    }

    /// Clone the template at `key`, place the clone and hand it over.
    ///
    /// # Errors
    /// [`DomainError::NotFound`] when nothing is registered under `key`. No
    /// identifier is consumed in that case. [`DomainError::Exhausted`] when
    /// the identifier service has run out.
    #[instrument(level = "debug", skip(self))]
    pub fn spawn(&self, key: &str, at: Position) -> DomainResult<P> {
        let mut instance = self
            .templates
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(key.to_string()))?;
        let id = self.ids.next_id()?;
        instance.place(id, at);
        debug!(%id, %at, "spawned");
        Ok(instance)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.templates.read().contains_key(key)
    }

    /// Registered keys in sorted order.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.templates.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// A copy of the template at `key`, without placing it.
    pub fn template(&self, key: &str) -> Option<P> {
        self.templates.read().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.templates.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.read().is_empty()
    }

    pub fn ids(&self) -> &Arc<IdAllocator> {
        &self.ids
    }
}
