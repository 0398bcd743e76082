use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use ahash::AHashMap;

use super::matrix::Buffer;
use super::{Element, Handle, Shape, StoreError};

struct Entry {
    item: &'static str,
    buffer: Arc<dyn Any + Send + Sync>,
}

impl Entry {
    fn holds<T: Element>(&self, buffer: &Arc<Buffer<T>>) -> bool {
        Arc::as_ptr(&self.buffer) as *const () == Arc::as_ptr(buffer) as *const ()
    }
}

/// Registry of named shared buffers.
///
/// A buffer is allocated once, attached by any number of workers, and destroyed by its
/// owner after every other view was released. Names are unique within a store.
#[derive(Default)]
pub struct Store {
    entries: Mutex<AHashMap<String, Entry>>,
}

static GLOBAL: OnceLock<Arc<Store>> = OnceLock::new();

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide store.
    pub fn global() -> Arc<Store> {
        GLOBAL.get_or_init(|| Arc::new(Store::new())).clone()
    }

    /// Creates a zero-initialized buffer registered under `name`.
    pub fn allocate<T: Element>(&self, name: &str, shape: Shape) -> Result<Handle<T>, StoreError> {
        if shape.is_empty() {
            return Err(StoreError::EmptyShape {
                name: name.to_string(),
                shape,
            });
        }

        let mut entries = self.entries();
        if entries.contains_key(name) {
            return Err(StoreError::AlreadyAllocated {
                name: name.to_string(),
            });
        }

        let buffer = Arc::new(Buffer::<T>::zeroed(shape));
        let entry = Entry {
            item: T::NAME,
            buffer: buffer.clone(),
        };
        entries.insert(name.to_string(), entry);
        log::trace!("Allocated buffer '{name}' ({shape} x {})", T::NAME);

        Ok(Handle::new(name.to_string(), buffer))
    }

    /// Returns a new view over the buffer registered under `name`.
    pub fn attach<T: Element>(&self, name: &str) -> Result<Handle<T>, StoreError> {
        let entries = self.entries();
        let Some(entry) = entries.get(name) else {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        };

        match entry.buffer.clone().downcast::<Buffer<T>>() {
            Ok(buffer) => Ok(Handle::new(name.to_string(), buffer)),
            Err(_) => Err(StoreError::TypeMismatch {
                name: name.to_string(),
                requested: T::NAME,
                actual: entry.item,
            }),
        }
    }

    /// Detaches the view. With `destroy` the buffer is also unregistered and freed, which
    /// is only allowed once every other view of it has been released.
    pub fn release<T: Element>(&self, handle: Handle<T>, destroy: bool) -> Result<(), StoreError> {
        if !destroy {
            return Ok(());
        }

        let mut entries = self.entries();
        let entry = match entries.get(handle.name()) {
            Some(entry) if entry.holds(&handle.buffer) => entry,
            _ => {
                return Err(StoreError::NotFound {
                    name: handle.name().to_string(),
                })
            }
        };

        // Minus the registry entry and the released handle
        let others = Arc::strong_count(&entry.buffer).saturating_sub(2);
        if others > 0 {
            return Err(StoreError::InUse {
                name: handle.name().to_string(),
                handles: others,
            });
        }

        entries.remove(handle.name());
        log::trace!("Destroyed buffer '{}'", handle.name());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries().contains_key(name)
    }

    /// Number of registered buffers.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn entries(&self) -> MutexGuard<'_, AHashMap<String, Entry>> {
        // The map is never left half-updated, so a poisoned lock is still usable
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
