//! Lazy, memoized construction of the domain entity.

use crate::core::Identifier;
use crate::effects::BoxError;
use thiserror::Error;
use tracing::{debug, trace};

/// Fault raised while building the domain entity.
#[derive(Debug, Error)]
#[error("failed to build entity for {identifier}: {source}")]
pub struct EntityError {
    pub identifier: Identifier,
    #[source]
    pub source: BoxError,
}

/// Constructs the domain entity bound to an identifier.
///
/// Any `Fn(&Identifier) -> Result<E, BoxError>` closure is a builder.
///
/// # Example
///
/// ```rust
/// use switchyard::context::EntityCache;
/// use switchyard::core::Identifier;
/// use switchyard::effects::BoxError;
///
/// struct Order { id: String }
///
/// let builder = |id: &Identifier| -> Result<Order, BoxError> {
///     Ok(Order { id: id.entity_id().to_string() })
/// };
/// let mut cache = EntityCache::new(Identifier::new("17", "shop"), Box::new(builder));
///
/// assert_eq!(cache.get_entity(false).unwrap().id, "17");
/// ```
pub trait EntityBuilder<E>: Send + Sync {
    fn build(&self, identifier: &Identifier) -> Result<E, BoxError>;
}

impl<E, F> EntityBuilder<E> for F
where
    F: Fn(&Identifier) -> Result<E, BoxError> + Send + Sync,
{
    fn build(&self, identifier: &Identifier) -> Result<E, BoxError> {
        self(identifier)
    }
}

/// Builder for machines without a domain object: the entity is the
/// identifier itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityBuilder;

impl EntityBuilder<Identifier> for IdentityBuilder {
    fn build(&self, identifier: &Identifier) -> Result<Identifier, BoxError> {
        Ok(identifier.clone())
    }
}

/// Holds the entity built for one identifier.
///
/// The first [`get_entity`](EntityCache::get_entity) call builds the entity;
/// later calls return the same instance, so every guard and action run for
/// this identifier observes one object. `force_rebuild` builds a new entity
/// and replaces the cached one.
pub struct EntityCache<E> {
    identifier: Identifier,
    builder: Box<dyn EntityBuilder<E>>,
    entity: Option<E>,
}

impl<E> EntityCache<E> {
    pub fn new(identifier: Identifier, builder: Box<dyn EntityBuilder<E>>) -> Self {
        Self {
            identifier,
            builder,
            entity: None,
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn get_entity(&mut self, force_rebuild: bool) -> Result<&mut E, EntityError> {
        let entity = match self.entity.take() {
            Some(entity) if !force_rebuild => {
                trace!(identifier = %self.identifier, "entity cache hit");
                entity
            }
            previous => {
                debug!(identifier = %self.identifier, force_rebuild, "building entity");
                match self.builder.build(&self.identifier) {
                    Ok(entity) => entity,
                    Err(source) => {
                        self.entity = previous;
                        return Err(EntityError {
                            identifier: self.identifier.clone(),
                            source,
                        });
                    }
                }
            }
        };
        Ok(self.entity.insert(entity))
    }

    pub fn is_built(&self) -> bool {
        self.entity.is_some()
    }

    /// Drop the cached entity; the next access builds a new one.
    pub fn clear(&mut self) {
        self.entity = None;
    }
}
