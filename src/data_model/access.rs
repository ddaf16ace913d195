//! Capability-gated reads of computed attributes.
//!
//! A data provider reports [`Error::UnsupportedFeature`] when the platform
//! cannot supply a value. Readers then serve the type's zero value (or an
//! empty list) with a successful status. Every other error is returned
//! unchanged, the caller must not guess a default for it.

use crate::Error;

/// Read a scalar through `getter`, substituting `T::default()` when the
/// capability is absent.
pub fn read_if_supported<P, T, F>(provider: &P, getter: F) -> Result<T, Error>
where
    P: ?Sized,
    T: Default,
    F: FnOnce(&P) -> Result<T, Error>,
{
    match getter(provider) {
        Err(Error::UnsupportedFeature) => Ok(T::default()),
        other => other,
    }
}

/// Read a list through `getter`, substituting an empty list when the
/// capability is absent.
pub fn read_list_if_supported<P, L, T, F>(provider: &P, getter: F) -> Result<Vec<T>, Error>
where
    P: ?Sized,
    L: IntoIterator<Item = T>,
    F: FnOnce(&P) -> Result<L, Error>,
{
    match getter(provider) {
        Ok(list) => Ok(list.into_iter().collect()),
        Err(Error::UnsupportedFeature) => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}
