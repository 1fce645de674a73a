//! Identity-stable database handle.
//!
//! A `Database` is an immutable row sequence with a process-unique id.
//! Clones share rows and id; building a new `Database`, even from equal
//! rows, yields a new id. Evaluation caches key on the id, never on row
//! equality.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

static NEXT_DATABASE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a database snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DatabaseId(u64);

impl fmt::Display for DatabaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "db#{}", self.0)
    }
}

/// Fixed, ordered sequence of items mined over.
pub struct Database<T> {
    id: DatabaseId,
    items: Arc<[T]>,
}

impl<T> Database<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            id: DatabaseId(NEXT_DATABASE_ID.fetch_add(1, Ordering::Relaxed)),
            items: items.into(),
        }
    }

    pub fn id(&self) -> DatabaseId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }
}

impl<T> Clone for Database<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> FromIterator<T> for Database<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> fmt::Debug for Database<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("id", &self.id)
            .field("len", &self.items.len())
            .finish()
    }
}
