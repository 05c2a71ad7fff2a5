//! Shared mutable state for single-threaded owners.

use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// A single-threaded, reference-counted resource with interior mutability.
///
/// `StResource` shares a value of type `T` between owners on the game thread, such as a
/// collaborator that appends to a log and the code that later reads it. It uses
/// `Rc<RefCell<T>>` internally; the core is frame-driven and single-threaded, so no
/// atomic reference counting or locking is needed.
///
/// # Type Parameters
/// - `T`: The type of the contained resource
///
/// # Examples
///
/// ```ignore
/// let log = StResource::new(Vec::new());
/// let writer = log.clone();
///
/// writer.get_mut().push(4);
/// assert_eq!(log.get().len(), 1);
/// ```
///
/// # Panics
/// - Panics if a shared borrow is held while trying to borrow mutably
/// - Panics if a mutable borrow is held while trying to borrow at all
#[derive(Debug, Default)]
pub struct StResource<T> {
    resource: Rc<RefCell<T>>,
}

impl<T> StResource<T> {
    /// Creates a new `StResource` containing the given value.
    ///
    /// # Arguments
    /// * `resource` - The value to be stored in the resource
    ///
    /// # Returns
    /// A new `StResource` containing the provided value
    pub fn new(resource: T) -> Self {
        Self {
            resource: Rc::new(RefCell::new(resource)),
        }
    }

    /// Returns a guard that allows reading the contained value.
    pub fn get(&self) -> Ref<'_, T> {
        self.resource.borrow()
    }

    /// Returns a guard that allows modifying the contained value.
    pub fn get_mut(&self) -> RefMut<'_, T> {
        self.resource.borrow_mut()
    }

    /// Replaces the contained value, returning the old one.
    pub fn replace(&self, value: T) -> T {
        self.resource.replace(value)
    }
}

impl<T> Clone for StResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
