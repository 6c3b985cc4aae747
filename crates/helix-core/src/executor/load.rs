use super::{FetchMode, SelectionSpec, lower_state, two_phase};
use crate::entity::Entity;
use crate::error::{ExpectationError, HelixError, RuntimeError};
use crate::query::{Page, PageRequest, Query, QueryState};
use crate::session::{QueryFactory, Session};
use crate::value::Value;

/// List terminal over explicit state; routed through the two-phase
/// rewrite when a collection fetch meets pagination.
pub(crate) fn run_list<S: Session, E: Entity>(
    factory: &QueryFactory<S>,
    state: QueryState<E>,
) -> Result<Vec<E>, HelixError> {
    if two_phase::required(&state) {
        return two_phase::list(factory, state);
    }
    let query = lower_state(&state, FetchMode::Materialize, SelectionSpec::Root)?;
    Ok(factory.session().execute_entities(&query)?)
}

/// Count terminal; fetch joins are downgraded to plain joins and the
/// count is promoted to `COUNT(DISTINCT root)` when the distinct flag
/// is set or any collection fetch is registered. Never two-phase.
pub(crate) fn run_count<S: Session, E: Entity>(
    factory: &QueryFactory<S>,
    state: &QueryState<E>,
) -> Result<u64, HelixError> {
    let query = lower_state(state, FetchMode::Downgrade, SelectionSpec::Count)?;
    let rows = factory.session().execute_rows(&query)?;
    match rows.first().and_then(|row| row.first()) {
        Some(Value::Int(count)) => u64::try_from(*count)
            .map_err(|_| RuntimeError::Internal("negative count".to_string()).into()),
        other => Err(RuntimeError::Internal(format!(
            "count query returned unexpected shape: {other:?}"
        ))
        .into()),
    }
}

impl<S: Session, E: Entity> Query<'_, S, E> {
    /// Execute and return all matching rows.
    pub fn list(self) -> Result<Vec<E>, HelixError> {
        run_list(self.factory, self.state)
    }

    /// Execute expecting at most one row. Fetches at most two rows to
    /// distinguish "empty" from "multiple"; more than one is an
    /// expectation violation.
    pub fn one(self) -> Result<Option<E>, HelixError> {
        let results = self.bounded(2)?;
        match results.len() {
            0 | 1 => Ok(results.into_iter().next()),
            _ => Err(ExpectationError::NonUniqueResult {
                entity: E::ENTITY_NAME,
            }
            .into()),
        }
    }

    /// Execute and return the first row, if any.
    pub fn first(self) -> Result<Option<E>, HelixError> {
        Ok(self.bounded(1)?.into_iter().next())
    }

    /// Bounded fetch shared by the single-result terminals. A
    /// collection fetch join forces two-phase execution with the bound
    /// as a synthetic limit.
    fn bounded(self, bound: u64) -> Result<Vec<E>, HelixError> {
        let mut state = self.state;
        state.offset = None;
        state.limit = Some(bound);
        if state.has_collection_fetch() {
            return two_phase::list(self.factory, state);
        }
        let query = lower_state(&state, FetchMode::Materialize, SelectionSpec::Root)?;
        Ok(self.factory.session().execute_entities(&query)?)
    }

    /// Count matching rows; always expressed as an aggregate.
    pub fn count(self) -> Result<u64, HelixError> {
        run_count(self.factory, &self.state)
    }

    /// Whether any row matches.
    pub fn exists(self) -> Result<bool, HelixError> {
        Ok(self.count()? > 0)
    }

    /// Execute a page: content with the request's window applied and
    /// the total from a separate count query.
    pub fn page(self, request: &PageRequest) -> Result<Page<E>, HelixError> {
        let total = run_count(self.factory, &self.state)?;
        let mut state = self.state;
        state.offset = Some(request.offset());
        state.limit = Some(request.size);
        let content = run_list(self.factory, state)?;
        Ok(Page {
            content,
            total,
            request: request.clone(),
        })
    }
}
