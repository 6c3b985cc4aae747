use crate::entity::Entity;
use crate::error::HelixError;
use crate::expr::Predicate;
use crate::fields::HelixField;
use crate::query::Query;
use crate::session::{QueryFactory, Session};

///
/// EntityService
///
/// Convenience base for persistence-context-bound services: query
/// openers plus CRUD pass-throughs. Implementors supply the factory;
/// everything else is provided.
///

pub trait EntityService<S: Session> {
    type Entity: Entity;

    fn factory(&self) -> &QueryFactory<S>;

    // ------------------------------------------------------------------
    // Query openers
    // ------------------------------------------------------------------

    fn find(&self) -> Query<'_, S, Self::Entity> {
        self.factory().query()
    }

    fn find_by<F, V>(&self, field: F, value: V) -> Query<'_, S, Self::Entity>
    where
        F: HelixField<Self::Entity>,
        V: Into<F::Value>,
    {
        self.find().filter(field.eq(value))
    }

    /// Membership opener; an **empty** collection constrains the query
    /// with the explicit contradiction (no rows), unlike the builder's
    /// `where_in` no-op.
    fn find_by_in<F, I, V>(&self, field: F, values: I) -> Query<'_, S, Self::Entity>
    where
        F: HelixField<Self::Entity>,
        I: IntoIterator<Item = V>,
        V: Into<F::Value>,
    {
        match field.in_list(values) {
            Some(predicate) => self.find().filter(predicate),
            None => self.find().filter(Predicate::always_false()),
        }
    }

    fn find_where(&self, predicate: Predicate) -> Query<'_, S, Self::Entity> {
        self.find().filter(predicate)
    }

    // ------------------------------------------------------------------
    // CRUD pass-throughs
    // ------------------------------------------------------------------

    fn persist(&self, entity: &mut Self::Entity) -> Result<(), HelixError> {
        Ok(self.factory().session().persist(entity)?)
    }

    fn merge(&self, entity: &Self::Entity) -> Result<Self::Entity, HelixError> {
        Ok(self.factory().session().merge(entity)?)
    }

    /// Persist-or-merge policy: a transient instance (null identifier)
    /// is persisted and handed back; a detached one is merged and the
    /// managed copy returned.
    fn save(&self, entity: Self::Entity) -> Result<Self::Entity, HelixError> {
        if entity.id().is_none() {
            let mut entity = entity;
            self.persist(&mut entity)?;
            Ok(entity)
        } else {
            self.merge(&entity)
        }
    }

    fn remove(&self, entity: &Self::Entity) -> Result<(), HelixError> {
        Ok(self.factory().session().remove(entity)?)
    }

    fn flush(&self) -> Result<(), HelixError> {
        Ok(self.factory().session().flush()?)
    }

    fn refresh(&self, entity: &mut Self::Entity) -> Result<(), HelixError> {
        Ok(self.factory().session().refresh(entity)?)
    }

    fn detach(&self, entity: &Self::Entity) {
        self.factory().session().detach(entity);
    }

    fn find_by_id(
        &self,
        id: &<Self::Entity as Entity>::Id,
    ) -> Result<Option<Self::Entity>, HelixError> {
        Ok(self.factory().session().find_by_id(id)?)
    }
}
