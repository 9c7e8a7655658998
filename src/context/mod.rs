//! Binding of an identifier to its entity and its persistence adapter.

mod entity;

pub use entity::{EntityBuilder, EntityCache, EntityError, IdentityBuilder};

use crate::core::Identifier;
use crate::persistence::PersistenceAdapter;
use std::sync::Arc;

/// Everything a machine needs to know about the entity it drives.
///
/// The only mutable state a context owns is the cached entity.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use switchyard::context::{Context, IdentityBuilder};
/// use switchyard::core::Identifier;
/// use switchyard::persistence::MemoryAdapter;
///
/// let mut context = Context::new(
///     Identifier::new("1", "plain"),
///     IdentityBuilder,
///     Arc::new(MemoryAdapter::new()),
/// );
/// assert_eq!(context.get_entity(false).unwrap().entity_id(), "1");
/// ```
pub struct Context<E> {
    entity: EntityCache<E>,
    adapter: Arc<dyn PersistenceAdapter>,
}

impl<E> Context<E> {
    pub fn new<B>(identifier: Identifier, builder: B, adapter: Arc<dyn PersistenceAdapter>) -> Self
    where
        B: EntityBuilder<E> + 'static,
    {
        Self {
            entity: EntityCache::new(identifier, Box::new(builder)),
            adapter,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        self.entity.identifier()
    }

    pub fn adapter(&self) -> &Arc<dyn PersistenceAdapter> {
        &self.adapter
    }

    /// The entity bound to this identifier, built on first use.
    pub fn get_entity(&mut self, force_rebuild: bool) -> Result<&mut E, EntityError> {
        self.entity.get_entity(force_rebuild)
    }

    pub fn is_entity_built(&self) -> bool {
        self.entity.is_built()
    }
}
