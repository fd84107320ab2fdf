// cartflow/src/core/context_data.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::fmt;
use std::sync::Arc;

/// Shared, lock-protected pipeline context.
///
/// Every handler receives its own clone; all clones point at the same data,
/// so values written by one step are visible to the next one and to the
/// caller once the run returns.
///
/// The guards are blocking locks. Drop them before any `.await`.
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Clones a projection of the context out under a short read lock.
  ///
  /// This is the usual way for an async step to pick up its inputs without
  /// holding a guard across an await point.
  pub fn snapshot<U, F>(&self, f: F) -> U
  where
    F: FnOnce(&T) -> U,
  {
    f(&self.0.read())
  }

  /// Applies `f` under a short write lock.
  pub fn update<U, F>(&self, f: F) -> U
  where
    F: FnOnce(&mut T) -> U,
  {
    f(&mut self.0.write())
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + fmt::Debug + 'static> fmt::Debug for ContextData<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.0.try_read() {
      Some(guard) => f.debug_tuple("ContextData").field(&*guard).finish(),
      None => f.write_str("ContextData(<locked>)"),
    }
  }
}

impl<T: Send + Sync + Default + 'static> Default for ContextData<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}
