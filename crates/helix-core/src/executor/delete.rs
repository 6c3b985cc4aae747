use super::load::{run_count, run_list};
use crate::compile::CriteriaContext;
use crate::criteria::CriteriaDelete;
use crate::entity::Entity;
use crate::error::{ExpectationError, HelixError};
use crate::query::{Query, QueryState};
use crate::session::{QueryFactory, Session};

/// Select matching entities through the normal query path, then remove
/// each through the persistence context, lifecycle callbacks and
/// cascade included.
fn managed_delete<S: Session, E: Entity>(
    factory: &QueryFactory<S>,
    state: QueryState<E>,
) -> Result<Vec<E>, HelixError> {
    let entities = run_list(factory, state)?;
    let session = factory.session();
    for entity in &entities {
        session.remove(entity)?;
    }
    Ok(entities)
}

/// Lower the builder's predicate into a DELETE statement. Delete
/// criteria carry no joins; paths resolve root-relative.
fn lower_delete<E: Entity>(state: &QueryState<E>) -> Result<CriteriaDelete, HelixError> {
    let mut ctx = CriteriaContext::for_delete();
    let filter = match &state.predicate {
        Some(predicate) => Some(ctx.lower_predicate(predicate)?),
        None => None,
    };
    Ok(CriteriaDelete {
        entity: E::ENTITY_NAME,
        primary_key: E::PRIMARY_KEY,
        filter,
    })
}

impl<S: Session, E: Entity> Query<'_, S, E> {
    /// Managed deletion of all matching rows. Refuses to run without a
    /// predicate; use [`Self::delete_all`] for a deliberate full wipe.
    pub fn delete(self) -> Result<u64, HelixError> {
        if self.state.predicate.is_none() {
            return Err(HelixError::UnboundedMutation {
                operation: "delete",
            });
        }
        Ok(managed_delete(self.factory, self.state)?.len() as u64)
    }

    /// Managed deletion without a predicate requirement.
    pub fn delete_all(self) -> Result<u64, HelixError> {
        Ok(managed_delete(self.factory, self.state)?.len() as u64)
    }

    /// Managed deletion that fails fast when nothing matches.
    pub fn delete_if_exists(self) -> Result<u64, HelixError> {
        let count = run_count(self.factory, &self.state)?;
        if count == 0 {
            return Err(ExpectationError::NoMatchingRows {
                operation: "delete_if_exists",
            }
            .into());
        }
        Ok(managed_delete(self.factory, self.state)?.len() as u64)
    }

    /// Managed deletion guarded by an exact match count; aborts before
    /// any mutation when the count differs.
    pub fn delete_expecting(self, expected: u64) -> Result<u64, HelixError> {
        let actual = run_count(self.factory, &self.state)?;
        if actual != expected {
            return Err(ExpectationError::CountMismatch {
                operation: "delete_expecting",
                expected,
                actual,
            }
            .into());
        }
        Ok(managed_delete(self.factory, self.state)?.len() as u64)
    }

    /// Managed deletion returning the removed entities.
    pub fn delete_and_return(self) -> Result<Vec<E>, HelixError> {
        managed_delete(self.factory, self.state)
    }

    /// Managed deletion followed by a flush, forcing write order.
    pub fn delete_and_flush(self) -> Result<u64, HelixError> {
        let removed = managed_delete(self.factory, self.state)?.len() as u64;
        self.factory.session().flush()?;
        Ok(removed)
    }

    /// Bulk DELETE statement, bypassing the persistence context,
    /// lifecycle callbacks, and cascade. Requires a predicate.
    pub fn delete_bulk(self) -> Result<u64, HelixError> {
        if self.state.predicate.is_none() {
            return Err(HelixError::UnboundedMutation {
                operation: "delete_bulk",
            });
        }
        let delete = lower_delete(&self.state)?;
        Ok(self.factory.session().execute_update(&delete)?)
    }

    /// Bulk DELETE without a predicate requirement.
    pub fn delete_bulk_all(self) -> Result<u64, HelixError> {
        let delete = lower_delete(&self.state)?;
        Ok(self.factory.session().execute_update(&delete)?)
    }
}
