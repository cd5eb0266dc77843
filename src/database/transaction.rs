use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::{debug, error};

use super::error::RepositoryError;

/// Opens write transactions on the primary pool.
#[derive(Clone)]
pub struct TransactionCoordinator {
    pool: PgPool,
}

impl TransactionCoordinator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn begin(&self) -> Result<Tx, RepositoryError> {
        let inner = self.pool.begin().await?;
        debug!("transaction opened");
        Ok(Tx { inner })
    }
}

/// An open transaction.
///
/// `commit` and `rollback` consume the handle. Dropping it while still open,
/// including after a failed commit, queues a rollback on the connection.
pub struct Tx {
    inner: Transaction<'static, Postgres>,
}

impl Tx {
    /// Connection to pass to `*_with_tx` repository calls.
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut *self.inner
    }

    pub async fn commit(self) -> Result<(), RepositoryError> {
        match self.inner.commit().await {
            Ok(()) => {
                debug!("transaction committed");
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "transaction commit failed; connection rolls back on release");
                Err(e.into())
            }
        }
    }

    pub async fn rollback(self) -> Result<(), RepositoryError> {
        self.inner.rollback().await?;
        debug!("transaction rolled back");
        Ok(())
    }
}
