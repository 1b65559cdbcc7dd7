//! Typed item containers attached to rooms.
//!
//! A container is an ordered list with two optional constraints: a verifier
//! deciding what kinds of item belong in it, and a size limit. Rooms use
//! one container per content role ("terrain", "large", "small", ...) and
//! rescale limited containers to their floor space.

use crate::errors::GenError;

/// Membership predicate for container items.
pub type Verifier<I> = fn(&I) -> bool;

/// Capacity- and predicate-constrained item list.
#[derive(Debug, Clone)]
pub struct TypedContainer<I> {
    items: Vec<I>,
    verifier: Option<Verifier<I>>,
    limit: Option<usize>,
}

impl<I> TypedContainer<I> {
    /// Create a container. `limit` of `None` means unlimited.
    pub fn new(verifier: Option<Verifier<I>>, limit: Option<usize>) -> Self {
        Self {
            items: Vec::new(),
            verifier,
            limit,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[I] {
        &self.items
    }

    pub fn size_limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn has_size_limit(&self) -> bool {
        self.limit.is_some()
    }

    /// Whether the verifier accepts the item. Capacity is not consulted.
    pub fn can_fit(&self, item: &I) -> bool {
        match self.verifier {
            Some(verify) => verify(item),
            None => true,
        }
    }

    /// Add an item, reporting verifier and capacity violations.
    pub fn add(&mut self, item: I) -> Result<(), GenError> {
        if !self.can_fit(&item) {
            return Err(GenError::VerifierRejected);
        }
        if let Some(limit) = self.limit
            && self.items.len() >= limit
        {
            return Err(GenError::ContainerFull { limit });
        }
        self.items.push(item);
        Ok(())
    }

    /// Add an item if possible; never fails.
    pub fn offer(&mut self, item: I) -> bool {
        self.add(item).is_ok()
    }

    /// Swap in a new size limit and return the previous one.
    ///
    /// Shrinking below the current occupancy is rejected and leaves the
    /// limit unchanged; items are never truncated.
    pub fn set_size_limit(&mut self, limit: Option<usize>) -> Result<Option<usize>, GenError> {
        if let Some(requested) = limit
            && requested < self.items.len()
        {
            return Err(GenError::LimitBelowOccupancy {
                requested,
                held: self.items.len(),
            });
        }
        Ok(std::mem::replace(&mut self.limit, limit))
    }
}

impl<I: Clone> TypedContainer<I> {
    /// Snapshot of the items the verifier accepts.
    ///
    /// Fails when the container carries no verifier.
    pub fn get_similar(&self) -> Result<Vec<I>, GenError> {
        let verify = self.verifier.ok_or(GenError::NoVerifier)?;
        Ok(self.items.iter().filter(|i| verify(i)).cloned().collect())
    }
}

impl<I> Default for TypedContainer<I> {
    fn default() -> Self {
        Self::new(None, None)
    }
}
