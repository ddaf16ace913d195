//! Attribute storage owned by the host.
//!
//! Cluster servers never cache attribute values: every read and write goes
//! through the store so that other observers see a write as soon as it
//! returns.

use crate::{
    constants::ATTRIBUTE_STORE_CAPACITY,
    interaction_model::{AttributePathIB, Status},
};

use super::AttributeValue;

pub trait AttributeStore {
    /// Returns [`Status::UnsupportedAttribute`] when nothing is stored at `path`.
    fn get(&self, path: &AttributePathIB) -> Result<AttributeValue, Status>;

    fn set(&mut self, path: &AttributePathIB, value: AttributeValue) -> Result<(), Status>;

    fn get_as<T>(&self, path: &AttributePathIB) -> Result<T, Status>
    where
        T: TryFrom<AttributeValue, Error = Status>,
    {
        T::try_from(self.get(path)?)
    }

    fn set_as<T>(&mut self, path: &AttributePathIB, value: T) -> Result<(), Status>
    where
        T: Into<AttributeValue>,
    {
        self.set(path, value.into())
    }
}

impl<S> AttributeStore for &mut S
where
    S: AttributeStore,
{
    fn get(&self, path: &AttributePathIB) -> Result<AttributeValue, Status> {
        (**self).get(path)
    }

    fn set(&mut self, path: &AttributePathIB, value: AttributeValue) -> Result<(), Status> {
        (**self).set(path, value)
    }
}

/// A fixed-capacity in-memory store.
#[derive(Debug, Default)]
pub struct MemoryAttributeStore {
    values: heapless::Vec<(AttributePathIB, AttributeValue), ATTRIBUTE_STORE_CAPACITY>,
}

impl MemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl AttributeStore for MemoryAttributeStore {
    fn get(&self, path: &AttributePathIB) -> Result<AttributeValue, Status> {
        self.values
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, value)| value.clone())
            .ok_or(Status::UnsupportedAttribute)
    }

    fn set(&mut self, path: &AttributePathIB, value: AttributeValue) -> Result<(), Status> {
        if let Some((_, existing)) = self.values.iter_mut().find(|(p, _)| p == path) {
            *existing = value;
            return Ok(());
        }
        self.values
            .push((*path, value))
            .map_err(|_| Status::ResourceExhausted)
    }
}
