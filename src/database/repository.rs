use std::future::Future;
use std::marker::PhantomData;
use std::time::Instant;

use sqlx::postgres::PgRow;
use sqlx::{Executor, FromRow, PgConnection, PgPool, Postgres, Row};
use tracing::{debug, warn};

use super::error::RepositoryError;
use super::manager::{DatabaseManager, QuerySettings};
use super::mapper::{column_names, map_columns, Field, MapOptions, Mapped, SqlValue, COUNT_COLUMN};
use super::pagination::{bind_pagination, FetchParams};
use super::statement::{Predicate, SelectStatement, SqlResult, StatementBuilder};

pub const CREATED_AT: &str = "created_at";
pub const UPDATED_AT: &str = "updated_at";

/// A struct persisted to exactly one table.
pub trait Entity: Mapped + Default + for<'r> FromRow<'r, PgRow> + Send + Sync + Unpin + 'static {
    const TABLE: &'static str;
    const PRIMARY_KEY: &'static str = "id";
    /// Columns that may be written on insert but never updated.
    const IMMUTABLE: &'static [&'static str] = &[];

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
}

/// A row of a counted SELECT: the entity plus the windowed total.
#[derive(Debug, Default)]
pub struct Counted<T> {
    pub entity: T,
    pub count: i64,
}

impl<T: Mapped> Mapped for Counted<T> {
    fn fields(&self) -> Vec<Field<'_>> {
        vec![Field::Embedded(&self.entity), Field::Column(COUNT_COLUMN, SqlValue::Int(self.count))]
    }
}

impl<'r, T> FromRow<'r, PgRow> for Counted<T>
where
    T: FromRow<'r, PgRow>,
{
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            entity: T::from_row(row)?,
            count: row.try_get(COUNT_COLUMN)?,
        })
    }
}

/// Shared CRUD plumbing. Writes go to the primary pool, reads to the replica.
pub struct Repository<T> {
    db: PgPool,
    sdb: PgPool,
    settings: QuerySettings,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            sdb: self.sdb.clone(),
            settings: self.settings.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(manager: &DatabaseManager) -> Self {
        Self {
            db: manager.primary().clone(),
            sdb: manager.replica().clone(),
            settings: manager.settings().clone(),
            _phantom: PhantomData,
        }
    }

    fn insert_sql(entity: &T) -> Result<SqlResult, RepositoryError> {
        let options = MapOptions::new()
            .ignore([T::PRIMARY_KEY])
            .auto_timestamp([CREATED_AT, UPDATED_AT]);
        Ok(StatementBuilder::insert(T::TABLE)
            .values(map_columns(entity, &options))
            .returning(T::PRIMARY_KEY)
            .build()?)
    }

    async fn insert_on<'c, E>(&self, executor: E, mut entity: T) -> Result<T, RepositoryError>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let sql = Self::insert_sql(&entity)?;
        let row = self
            .timed("insert", &sql, sql.query().fetch_one(executor))
            .await
            .map_err(RepositoryError::from_write)?;
        entity.set_id(row.try_get(T::PRIMARY_KEY)?);
        Ok(entity)
    }

    /// Insert on the primary pool; returns the entity with its new id.
    pub async fn create(&self, entity: T) -> Result<T, RepositoryError> {
        self.insert_on(&self.db, entity).await
    }

    /// Insert inside an open transaction.
    pub async fn create_with_tx(&self, conn: &mut PgConnection, entity: T) -> Result<T, RepositoryError> {
        self.insert_on(conn, entity).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<T, RepositoryError> {
        if id <= 0 {
            return Err(RepositoryError::validation(format!("invalid {} id: {}", T::TABLE, id)));
        }
        self.get_one_by(vec![Predicate::eq(T::PRIMARY_KEY, id)]).await
    }

    /// Point lookup on the replica. Zero rows is `NotFound`.
    pub async fn get_one_by(&self, predicates: Vec<Predicate>) -> Result<T, RepositoryError> {
        let select = StatementBuilder::select(T::TABLE)
            .columns(column_names(&T::default(), &MapOptions::new()))
            .limit(1);
        let sql = predicates.into_iter().fold(select, SelectStatement::and_where).build()?;

        self.timed("select", &sql, sql.query_as::<T>().fetch_optional(&self.sdb))
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Base SELECT for `fetch`: every entity column plus the window count.
    pub fn counted_select(&self, alias: Option<&str>) -> SelectStatement {
        let select = StatementBuilder::select(T::TABLE)
            .columns(column_names(&Counted::<T>::default(), &MapOptions::new()));
        match alias {
            Some(a) => select.alias(a),
            None => select,
        }
    }

    /// Run a counted SELECT with pagination applied.
    ///
    /// The total is the unpaginated match count, read from the first row.
    pub async fn fetch(&self, select: SelectStatement, params: &FetchParams) -> Result<(Vec<T>, i64), RepositoryError> {
        let sql = bind_pagination(select, params).build()?;
        let rows = self
            .timed("fetch", &sql, sql.query_as::<Counted<T>>().fetch_all(&self.sdb))
            .await?;

        let total = rows.first().map(|r| r.count).unwrap_or(0);
        Ok((rows.into_iter().map(|r| r.entity).collect(), total))
    }

    /// Update the named fields of the row identified by the entity's id.
    pub async fn update(&self, entity: &T, fields: &[&str]) -> Result<u64, RepositoryError> {
        let id = entity.id();
        if id <= 0 {
            return Err(RepositoryError::validation(format!("missing {} id for update", T::TABLE)));
        }
        self.update_where(entity, fields, vec![Predicate::eq(T::PRIMARY_KEY, id)]).await
    }

    /// Update the named fields on every row matching `predicates`.
    ///
    /// Returns rows affected. Zero is logged but not treated as `NotFound`.
    pub async fn update_where(
        &self,
        entity: &T,
        fields: &[&str],
        predicates: Vec<Predicate>,
    ) -> Result<u64, RepositoryError> {
        let sql = Self::update_sql(entity, fields, predicates)?;
        let result = self
            .timed("update", &sql, sql.query().execute(&self.db))
            .await
            .map_err(RepositoryError::from_write)?;

        let affected = result.rows_affected();
        if affected == 0 {
            warn!(table = T::TABLE, "update matched no rows");
        }
        Ok(affected)
    }

    fn update_sql(entity: &T, fields: &[&str], predicates: Vec<Predicate>) -> Result<SqlResult, RepositoryError> {
        if fields.is_empty() {
            return Err(RepositoryError::validation("no fields to update"));
        }
        let known = column_names(entity, &MapOptions::new());
        for field in fields {
            if !known.iter().any(|k| k == field) {
                return Err(RepositoryError::validation(format!("unknown field for {}: {}", T::TABLE, field)));
            }
            if *field == T::PRIMARY_KEY || *field == CREATED_AT || T::IMMUTABLE.iter().any(|c| c == field) {
                return Err(RepositoryError::validation(format!("field is immutable: {}", field)));
            }
        }

        let options = MapOptions::new()
            .select(fields.iter().copied())
            .ignore([T::PRIMARY_KEY])
            .auto_timestamp([UPDATED_AT]);
        let update = StatementBuilder::update(T::TABLE).set(map_columns(entity, &options));
        Ok(predicates.into_iter().fold(update, |u, p| u.and_where(p)).build()?)
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<u64, RepositoryError> {
        if id <= 0 {
            return Err(RepositoryError::validation(format!("invalid {} id: {}", T::TABLE, id)));
        }
        self.delete_where(vec![Predicate::eq(T::PRIMARY_KEY, id)]).await
    }

    pub async fn delete_where(&self, predicates: Vec<Predicate>) -> Result<u64, RepositoryError> {
        let delete = StatementBuilder::delete(T::TABLE);
        let sql = predicates.into_iter().fold(delete, |d, p| d.and_where(p)).build()?;
        let result = self.timed("delete", &sql, sql.query().execute(&self.db)).await?;
        Ok(result.rows_affected())
    }

    async fn timed<F, R>(&self, op: &'static str, sql: &SqlResult, fut: F) -> R
    where
        F: Future<Output = R>,
    {
        let started = Instant::now();
        let out = fut.await;
        let elapsed = started.elapsed();

        if elapsed >= self.settings.slow_query_threshold {
            warn!(
                table = T::TABLE,
                op,
                elapsed_ms = elapsed.as_millis() as u64,
                query = %sql.query,
                "slow query"
            );
        } else if self.settings.log_queries {
            debug!(table = T::TABLE, op, elapsed_ms = elapsed.as_millis() as u64, query = %sql.query);
        }
        out
    }
}
