//! Substitute implementations
//!
//! A [`Substitute`] has exactly the signature of the unit it replaces.
//! Registries hold substitutes of many different signatures, so they are
//! stored type-erased as [`ErasedSubstitute`] and recovered by downcast.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// Replacement implementation for a unit `Fn(A) -> R`
///
/// Units taking several arguments use a tuple for `A`.
pub struct Substitute<A, R> {
    inner: Arc<dyn Fn(A) -> R + Send + Sync>,
}

impl<A, R> Substitute<A, R> {
    /// Wrap a closure or function item
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    /// Wrap an already shared callable
    #[inline]
    #[must_use]
    pub fn from_arc(inner: Arc<dyn Fn(A) -> R + Send + Sync>) -> Self {
        Self { inner }
    }

    /// Invoke with the call arguments
    #[inline]
    pub fn call(&self, args: A) -> R {
        (self.inner)(args)
    }
}

impl<A: 'static, R: Clone + Send + Sync + 'static> Substitute<A, R> {
    /// Substitute that ignores its arguments and returns a fixed value
    #[must_use]
    pub fn value(value: R) -> Self {
        Self::new(move |_| value.clone())
    }
}

impl<A, R> Clone for Substitute<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, R> fmt::Debug for Substitute<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substitute")
            .field("signature", &type_name::<fn(A) -> R>())
            .finish()
    }
}

/// Signature key of a unit `Fn(A) -> R`
#[inline]
#[must_use]
pub fn signature_of<A: 'static, R: 'static>() -> TypeId {
    TypeId::of::<Substitute<A, R>>()
}

/// Type-erased [`Substitute`]
#[derive(Clone)]
pub struct ErasedSubstitute {
    signature: TypeId,
    signature_name: &'static str,
    inner: Arc<dyn Any + Send + Sync>,
}

impl ErasedSubstitute {
    /// Erase a typed substitute
    #[must_use]
    pub fn new<A: 'static, R: 'static>(substitute: Substitute<A, R>) -> Self {
        Self {
            signature: signature_of::<A, R>(),
            signature_name: type_name::<fn(A) -> R>(),
            inner: Arc::new(substitute),
        }
    }

    /// Signature key, comparable with [`signature_of`]
    #[inline]
    #[must_use]
    pub fn signature(&self) -> TypeId {
        self.signature
    }

    /// Human-readable signature, e.g. `fn(i64) -> Counter`
    #[inline]
    #[must_use]
    pub fn signature_name(&self) -> &'static str {
        self.signature_name
    }

    /// Recover the typed substitute; `None` when the signature differs
    #[must_use]
    pub fn downcast<A: 'static, R: 'static>(&self) -> Option<Substitute<A, R>> {
        self.inner.downcast_ref::<Substitute<A, R>>().cloned()
    }
}

impl fmt::Debug for ErasedSubstitute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedSubstitute")
            .field("signature", &self.signature_name)
            .finish_non_exhaustive()
    }
}
