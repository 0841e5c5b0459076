// storefront-flow/src/context.rs

//! Shared context wrapper and the boxed handler type.

use crate::control::PipelineControl;
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Shared, lockable pipeline state.
///
/// Cloning is cheap: every clone points at the same data. Guards returned by
/// [`read`](Self::read) and [`write`](Self::write) block, so they must be
/// dropped before the next `.await`. Inside a handler, copy what is needed out
/// of a short-lived guard, await the I/O, then take a write guard to store the
/// result.
#[derive(Debug)]
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

  /// Read guard narrowed to one part of the data, e.g. `ctx.map_read(|d| &d.cart_key)`.
  pub fn map_read<F, U: ?Sized>(&self, f: F) -> MappedRwLockReadGuard<'_, U>
  where
    F: FnOnce(&T) -> &U,
  {
    RwLockReadGuard::map(self.read(), f)
  }

  /// Clones the inner value out of the lock.
  pub fn snapshot(&self) -> T
  where
    T: Clone,
  {
    self.read().clone()
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + Default + 'static> Default for ContextData<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}

/// A step handler: takes a clone of the context and yields a control signal or
/// the pipeline's error type.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, Err>> + Send>>
    + Send
    + Sync,
>;
