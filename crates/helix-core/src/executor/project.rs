use super::{FetchMode, SelectionSpec, load::run_list, lower_state};
use crate::entity::{Entity, FieldValues, FromRow, FromValue};
use crate::error::HelixError;
use crate::expr::{Constructor, Expr, ExprOp};
use crate::fields::HelixField;
use crate::query::Query;
use crate::session::Session;
use crate::value::{TypeTag, Value};
use std::collections::BTreeMap;
use std::hash::Hash;

impl<S: Session, E: Entity> Query<'_, S, E> {
    /// Constructor projection: each argument expression becomes a
    /// selection, rows are mapped through [`FromRow`]. Fetch joins are
    /// downgraded (fetching is invalid off a non-root selection).
    pub fn query_as<T: FromRow>(self, projection: Constructor<T>) -> Result<Vec<T>, HelixError> {
        let query = lower_state(
            &self.state,
            FetchMode::Downgrade,
            SelectionSpec::Scalars(&projection.args),
        )?;
        let rows = self.factory.session().execute_rows(&query)?;
        rows.iter()
            .map(|row| T::from_row(row).map_err(|err| HelixError::Translation(err.to_string())))
            .collect()
    }

    /// Single scalar selection.
    pub fn select(self, expr: Expr) -> Result<Vec<Value>, HelixError> {
        let query = lower_state(
            &self.state,
            FetchMode::Downgrade,
            SelectionSpec::Scalars(std::slice::from_ref(&expr)),
        )?;
        let rows = self.factory.session().execute_rows(&query)?;
        Ok(rows
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or(Value::Null))
            .collect())
    }

    /// Single scalar selection, converted to a concrete type.
    pub fn select_as<V: FromValue>(self, expr: Expr) -> Result<Vec<Option<V>>, HelixError> {
        Ok(self
            .select(expr)?
            .iter()
            .map(|value| V::from_value(value))
            .collect())
    }

    /// Tuple projection over multiple scalar selections.
    pub fn tuples(self, exprs: Vec<Expr>) -> Result<Vec<Vec<Value>>, HelixError> {
        let query = lower_state(
            &self.state,
            FetchMode::Downgrade,
            SelectionSpec::Scalars(&exprs),
        )?;
        Ok(self.factory.session().execute_rows(&query)?)
    }

    /// `SELECT field, COUNT(*) … GROUP BY field`, returned as ordered
    /// (value, count) pairs.
    pub fn group_by_count<F: HelixField<E>>(
        self,
        field: F,
    ) -> Result<Vec<(Value, u64)>, HelixError> {
        let mut state = self.state;
        state.group_by.push(field.expr());
        let selections = [
            field.expr(),
            Expr::operation(ExprOp::Count, Vec::new(), TypeTag::Int),
        ];
        let query = lower_state(&state, FetchMode::Downgrade, SelectionSpec::Scalars(&selections))?;
        let rows = self.factory.session().execute_rows(&query)?;

        let mut pairs = Vec::with_capacity(rows.len());
        for mut row in rows {
            if row.len() != 2 {
                return Err(HelixError::Translation(format!(
                    "grouped count returned a row of width {}",
                    row.len()
                )));
            }
            let count = match row.pop() {
                Some(Value::Int(count)) => u64::try_from(count).unwrap_or(0),
                other => {
                    return Err(HelixError::Translation(format!(
                        "grouped count returned a non-integer count: {other:?}"
                    )));
                }
            };
            let key = row.pop().unwrap_or(Value::Null);
            pairs.push((key, count));
        }
        Ok(pairs)
    }

    /// Client-side grouping by an explicit key extractor: executes the
    /// list, then folds.
    pub fn list_grouped_by<K, F>(self, key: F) -> Result<std::collections::HashMap<K, Vec<E>>, HelixError>
    where
        K: Eq + Hash,
        F: Fn(&E) -> K,
    {
        let entities = run_list(self.factory, self.state)?;
        let mut groups: std::collections::HashMap<K, Vec<E>> = std::collections::HashMap::new();
        for entity in entities {
            groups.entry(key(&entity)).or_default().push(entity);
        }
        Ok(groups)
    }

    /// Client-side grouping keyed by a descriptor, read back through
    /// attribute-value access. An attribute the entity cannot answer
    /// is an unsupported-shape error.
    pub fn list_grouped_by_field<F: HelixField<E>>(
        self,
        field: F,
    ) -> Result<BTreeMap<Value, Vec<E>>, HelixError> {
        let entities = run_list(self.factory, self.state)?;
        let mut groups: BTreeMap<Value, Vec<E>> = BTreeMap::new();
        for entity in entities {
            let key = entity
                .to_record()
                .walk(field.name().split('.'))
                .ok_or_else(|| {
                    HelixError::UnsupportedEntityShape(format!(
                        "{} has no readable attribute `{}`",
                        E::ENTITY_NAME,
                        field.name()
                    ))
                })?;
            groups.entry(key).or_default().push(entity);
        }
        Ok(groups)
    }
}
