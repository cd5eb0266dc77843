use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{FromRow, Postgres};
use thiserror::Error;

use super::mapper::{ColumnValue, SqlValue, COUNT_COLUMN};

/// Rendered SQL with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<SqlValue>,
}

impl SqlResult {
    /// Bind every parameter onto a query that can run on a pool or a transaction.
    pub fn query(&self) -> Query<'_, Postgres, PgArguments> {
        let mut q = sqlx::query(&self.query);
        for p in self.params.iter() {
            q = bind_param_query(q, p);
        }
        q
    }

    pub fn query_as<T>(&self) -> QueryAs<'_, Postgres, T, PgArguments>
    where
        T: for<'r> FromRow<'r, PgRow>,
    {
        let mut q = sqlx::query_as::<_, T>(&self.query);
        for p in self.params.iter() {
            q = bind_param_query_as(q, p);
        }
        q
    }
}

fn bind_param_query<'q>(
    q: Query<'q, Postgres, PgArguments>,
    v: &'q SqlValue,
) -> Query<'q, Postgres, PgArguments> {
    match v {
        SqlValue::Bool(b) => q.bind(*b),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Text(s) => q.bind(s.as_str()),
        SqlValue::Timestamp(t) => q.bind(*t),
        SqlValue::NullableTimestamp(t) => q.bind(*t),
    }
}

fn bind_param_query_as<'q, O>(
    q: QueryAs<'q, Postgres, O, PgArguments>,
    v: &'q SqlValue,
) -> QueryAs<'q, Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    match v {
        SqlValue::Bool(b) => q.bind(*b),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Text(s) => q.bind(s.as_str()),
        SqlValue::Timestamp(t) => q.bind(*t),
        SqlValue::NullableTimestamp(t) => q.bind(*t),
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StatementError {
    #[error("no columns given for {0}")]
    EmptyColumns(String),

    #[error("no columns to set on {0}")]
    EmptySet(String),

    #[error("refusing to {0} {1} without a WHERE clause")]
    MissingWhere(&'static str, String),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq(String, SqlValue),
    In(String, Vec<SqlValue>),
}

impl Predicate {
    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Predicate::Eq(column.into(), value.into())
    }

    pub fn in_list<I, V>(column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<SqlValue>,
    {
        Predicate::In(column.into(), values.into_iter().map(Into::into).collect())
    }
}

/// Placeholder allocator shared by SET and WHERE so numbering never restarts.
#[derive(Default)]
struct Params {
    values: Vec<SqlValue>,
}

impl Params {
    fn param(&mut self, value: SqlValue) -> String {
        self.values.push(value);
        format!("${}", self.values.len())
    }
}

fn qualify(column: &str, alias: Option<&str>) -> String {
    match alias {
        Some(a) if !column.contains('.') => format!("{}.{}", a, column),
        _ => column.to_string(),
    }
}

fn where_clause(predicates: &[Predicate], alias: Option<&str>, params: &mut Params) -> String {
    let conditions: Vec<String> = predicates
        .iter()
        .map(|p| match p {
            Predicate::Eq(column, value) => {
                format!("{} = {}", qualify(column, alias), params.param(value.clone()))
            }
            Predicate::In(_, values) if values.is_empty() => "1=0".to_string(),
            Predicate::In(column, values) => {
                let placeholders: Vec<String> = values.iter().map(|v| params.param(v.clone())).collect();
                format!("{} IN ({})", qualify(column, alias), placeholders.join(", "))
            }
        })
        .collect();
    conditions.join(" AND ")
}

/// Entry points for the four statement kinds.
pub struct StatementBuilder;

impl StatementBuilder {
    pub fn insert(table: impl Into<String>) -> InsertStatement {
        InsertStatement { table: table.into(), values: vec![], returning: None }
    }

    pub fn update(table: impl Into<String>) -> UpdateStatement {
        UpdateStatement { table: table.into(), set: vec![], predicates: vec![] }
    }

    pub fn delete(table: impl Into<String>) -> DeleteStatement {
        DeleteStatement { table: table.into(), predicates: vec![] }
    }

    pub fn select(table: impl Into<String>) -> SelectStatement {
        SelectStatement {
            table: table.into(),
            alias: None,
            columns: vec![],
            joins: vec![],
            predicates: vec![],
            order_by: None,
            limit: None,
            offset: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsertStatement {
    table: String,
    values: Vec<ColumnValue>,
    returning: Option<String>,
}

impl InsertStatement {
    pub fn values(mut self, values: Vec<ColumnValue>) -> Self {
        self.values = values;
        self
    }

    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning = Some(column.into());
        self
    }

    pub fn build(self) -> Result<SqlResult, StatementError> {
        if self.values.is_empty() {
            return Err(StatementError::EmptyColumns(self.table));
        }
        let mut params = Params::default();
        let columns: Vec<&'static str> = self.values.iter().map(|c| c.column).collect();
        let placeholders: Vec<String> = self.values.into_iter().map(|c| params.param(c.value)).collect();

        let mut query = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );
        if let Some(col) = self.returning {
            query.push_str(&format!(" RETURNING {}", col));
        }
        Ok(SqlResult { query, params: params.values })
    }
}

#[derive(Debug, Clone)]
pub struct UpdateStatement {
    table: String,
    set: Vec<ColumnValue>,
    predicates: Vec<Predicate>,
}

impl UpdateStatement {
    pub fn set(mut self, values: Vec<ColumnValue>) -> Self {
        self.set = values;
        self
    }

    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn build(self) -> Result<SqlResult, StatementError> {
        if self.set.is_empty() {
            return Err(StatementError::EmptySet(self.table));
        }
        if self.predicates.is_empty() {
            return Err(StatementError::MissingWhere("update", self.table));
        }
        let mut params = Params::default();
        let assignments: Vec<String> = self
            .set
            .into_iter()
            .map(|c| format!("{} = {}", c.column, params.param(c.value)))
            .collect();
        let filter = where_clause(&self.predicates, None, &mut params);

        Ok(SqlResult {
            query: format!("UPDATE {} SET {} WHERE {}", self.table, assignments.join(", "), filter),
            params: params.values,
        })
    }
}

#[derive(Debug, Clone)]
pub struct DeleteStatement {
    table: String,
    predicates: Vec<Predicate>,
}

impl DeleteStatement {
    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn build(self) -> Result<SqlResult, StatementError> {
        if self.predicates.is_empty() {
            return Err(StatementError::MissingWhere("delete", self.table));
        }
        let mut params = Params::default();
        let filter = where_clause(&self.predicates, None, &mut params);
        Ok(SqlResult {
            query: format!("DELETE FROM {} WHERE {}", self.table, filter),
            params: params.values,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SelectStatement {
    table: String,
    alias: Option<String>,
    columns: Vec<String>,
    joins: Vec<String>,
    predicates: Vec<Predicate>,
    order_by: Option<Vec<(String, SortDirection)>>,
    limit: Option<i64>,
    offset: Option<i64>,
}

impl SelectStatement {
    /// Alias the base table; unqualified columns, filters and ordering get the prefix.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Raw join clause, e.g. `JOIN users AS u ON u.id = ou.user_id`.
    pub fn join(mut self, clause: impl Into<String>) -> Self {
        self.joins.push(clause.into());
        self
    }

    pub fn and_where(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// The first call replaces the default `created_at DESC` ordering.
    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.get_or_insert_with(Vec::new).push((column.into(), direction));
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn build(self) -> Result<SqlResult, StatementError> {
        if self.columns.is_empty() {
            return Err(StatementError::EmptyColumns(self.table));
        }
        let alias = self.alias.as_deref();
        let mut params = Params::default();

        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if c == COUNT_COLUMN {
                    format!("count(*) over() AS {}", COUNT_COLUMN)
                } else {
                    qualify(c, alias)
                }
            })
            .collect();

        let mut query = format!("SELECT {} FROM {}", columns.join(", "), self.table);
        if let Some(a) = alias {
            query.push_str(&format!(" AS {}", a));
        }
        for join in &self.joins {
            query.push(' ');
            query.push_str(join);
        }
        if !self.predicates.is_empty() {
            let filter = where_clause(&self.predicates, alias, &mut params);
            query.push_str(&format!(" WHERE {}", filter));
        }

        let order = self
            .order_by
            .unwrap_or_else(|| vec![("created_at".to_string(), SortDirection::Desc)]);
        let order: Vec<String> = order
            .iter()
            .map(|(column, dir)| format!("{} {}", qualify(column, alias), dir.to_sql()))
            .collect();
        query.push_str(&format!(" ORDER BY {}", order.join(", ")));

        if let Some(limit) = self.limit {
            query.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            query.push_str(&format!(" OFFSET {}", offset));
        }

        Ok(SqlResult { query, params: params.values })
    }
}
