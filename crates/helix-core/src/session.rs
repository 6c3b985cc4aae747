use crate::criteria::{CriteriaDelete, CriteriaQuery};
use crate::entity::Entity;
use crate::error::RuntimeError;
use crate::query::Query;
use crate::value::Value;
use std::rc::Rc;

///
/// Session
///
/// The narrow persistence-runtime contract the core consumes. Any
/// relational criteria engine satisfies it: lifecycle operations on
/// managed instances, identifier lookup, and execution of compiled
/// criteria queries/deletes.
///
/// Write operations require an active write transaction; a session
/// without one fails with [`RuntimeError::TransactionRequired`].
///

pub trait Session {
    // ------------------------------------------------------------------
    // Managed-instance operations
    // ------------------------------------------------------------------

    fn persist<E: Entity>(&self, entity: &mut E) -> Result<(), RuntimeError>;

    fn merge<E: Entity>(&self, entity: &E) -> Result<E, RuntimeError>;

    fn remove<E: Entity>(&self, entity: &E) -> Result<(), RuntimeError>;

    fn refresh<E: Entity>(&self, entity: &mut E) -> Result<(), RuntimeError>;

    fn detach<E: Entity>(&self, entity: &E);

    fn contains<E: Entity>(&self, entity: &E) -> bool;

    fn flush(&self) -> Result<(), RuntimeError>;

    fn find_by_id<E: Entity>(&self, id: &E::Id) -> Result<Option<E>, RuntimeError>;

    // ------------------------------------------------------------------
    // Criteria execution
    // ------------------------------------------------------------------

    fn execute_entities<E: Entity>(&self, query: &CriteriaQuery) -> Result<Vec<E>, RuntimeError>;

    fn execute_rows(&self, query: &CriteriaQuery) -> Result<Vec<Vec<Value>>, RuntimeError>;

    fn execute_update(&self, delete: &CriteriaDelete) -> Result<u64, RuntimeError>;
}

///
/// SessionHandle
///
/// Either a fixed session reference or a supplier resolved on every
/// access (e.g. a request-scoped session). The supplier is invoked on
/// each access, never cached.
///

pub enum SessionHandle<S> {
    Fixed(Rc<S>),
    Supplier(Box<dyn Fn() -> Rc<S>>),
}

impl<S> SessionHandle<S> {
    #[must_use]
    pub fn get(&self) -> Rc<S> {
        match self {
            Self::Fixed(session) => Rc::clone(session),
            Self::Supplier(supplier) => supplier(),
        }
    }
}

///
/// QueryFactory
///
/// Entry point bound to a persistence context. Opens typed query
/// builders for entity types.
///

pub struct QueryFactory<S: Session> {
    handle: SessionHandle<S>,
}

impl<S: Session> QueryFactory<S> {
    #[must_use]
    pub const fn new(session: Rc<S>) -> Self {
        Self {
            handle: SessionHandle::Fixed(session),
        }
    }

    /// Factory resolving its session through `supplier` on every
    /// access.
    #[must_use]
    pub fn with_supplier(supplier: impl Fn() -> Rc<S> + 'static) -> Self {
        Self {
            handle: SessionHandle::Supplier(Box::new(supplier)),
        }
    }

    /// The currently active session.
    #[must_use]
    pub fn session(&self) -> Rc<S> {
        self.handle.get()
    }

    /// Open a query over `E`.
    #[must_use]
    pub fn query<E: Entity>(&self) -> Query<'_, S, E> {
        Query::new(self)
    }

    /// Alias for [`Self::query`].
    #[must_use]
    pub fn select_from<E: Entity>(&self) -> Query<'_, S, E> {
        self.query()
    }
}
