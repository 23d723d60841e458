//! SeaORM-backed implementation of the repository ports.
//!
//! Holds the shared lazily-connected [`DbHandle`]; every call asks it for a
//! connection, so a database that was down at boot is picked up on the next
//! request.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use modkit_db::DbHandle;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, SqlErr,
};
use uuid::Uuid;

use crate::contract::model::{Appointment, Case, Client};
use crate::domain::repo::{
    AppointmentsRepository, CasesRepository, ClientsRepository, RepoError,
};
use crate::infra::storage::entity::{appointment, case, client};
use crate::infra::storage::mapper;

pub struct SeaOrmLawOfficeRepository {
    db: Arc<DbHandle>,
}

impl SeaOrmLawOfficeRepository {
    pub fn new(db: Arc<DbHandle>) -> Self {
        Self { db }
    }

    async fn conn(&self) -> anyhow::Result<DatabaseConnection> {
        self.db.conn().await.context("database unavailable")
    }
}

fn write_error(e: DbErr, what: &'static str) -> RepoError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return RepoError::UniqueViolation;
    }
    RepoError::Other(anyhow::Error::new(e).context(what))
}

/// `Ok(false)` when the update matched no row.
fn update_result<T>(res: Result<T, DbErr>, what: &'static str) -> Result<bool, RepoError> {
    match res {
        Ok(_) => Ok(true),
        Err(DbErr::RecordNotUpdated) => Ok(false),
        Err(e) => Err(write_error(e, what)),
    }
}

#[async_trait]
impl ClientsRepository for SeaOrmLawOfficeRepository {
    async fn list(&self) -> anyhow::Result<Vec<Client>> {
        let rows = client::Entity::find()
            .order_by_desc(client::Column::CreatedAt)
            .all(&self.conn().await?)
            .await
            .context("list clients failed")?;
        Ok(rows.into_iter().map(mapper::client_from_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Client>> {
        let found = client::Entity::find_by_id(id)
            .one(&self.conn().await?)
            .await
            .context("find client failed")?;
        Ok(found.map(mapper::client_from_row))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Client>> {
        let rows = client::Entity::find()
            .filter(client::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn().await?)
            .await
            .context("find clients by ids failed")?;
        Ok(rows.into_iter().map(mapper::client_from_row).collect())
    }

    async fn email_exists(&self, email: &str, except: Option<Uuid>) -> anyhow::Result<bool> {
        let mut query = client::Entity::find().filter(client::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(client::Column::Id.ne(id));
        }
        let count = query
            .count(&self.conn().await?)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, c: Client) -> Result<(), RepoError> {
        let conn = self.conn().await?;
        mapper::client_to_active(c)
            .insert(&conn)
            .await
            .map_err(|e| write_error(e, "insert client failed"))?;
        Ok(())
    }

    async fn update(&self, c: Client) -> Result<bool, RepoError> {
        let conn = self.conn().await?;
        update_result(
            mapper::client_to_active(c).update(&conn).await,
            "update client failed",
        )
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = client::Entity::delete_by_id(id)
            .exec(&self.conn().await?)
            .await
            .context("delete client failed")?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait]
impl CasesRepository for SeaOrmLawOfficeRepository {
    async fn list(&self) -> anyhow::Result<Vec<Case>> {
        let rows = case::Entity::find()
            .order_by_desc(case::Column::CreatedAt)
            .all(&self.conn().await?)
            .await
            .context("list cases failed")?;
        rows.into_iter()
            .map(|m| mapper::case_from_row(m).context("corrupt case row"))
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Case>> {
        let found = case::Entity::find_by_id(id)
            .one(&self.conn().await?)
            .await
            .context("find case failed")?;
        found
            .map(|m| mapper::case_from_row(m).context("corrupt case row"))
            .transpose()
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> anyhow::Result<Vec<Case>> {
        let rows = case::Entity::find()
            .filter(case::Column::Id.is_in(ids.iter().copied()))
            .all(&self.conn().await?)
            .await
            .context("find cases by ids failed")?;
        rows.into_iter()
            .map(|m| mapper::case_from_row(m).context("corrupt case row"))
            .collect()
    }

    async fn insert(&self, c: Case) -> Result<(), RepoError> {
        let conn = self.conn().await?;
        mapper::case_to_active(c)
            .insert(&conn)
            .await
            .map_err(|e| write_error(e, "insert case failed"))?;
        Ok(())
    }

    async fn update(&self, c: Case) -> Result<bool, RepoError> {
        let conn = self.conn().await?;
        update_result(
            mapper::case_to_active(c).update(&conn).await,
            "update case failed",
        )
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = case::Entity::delete_by_id(id)
            .exec(&self.conn().await?)
            .await
            .context("delete case failed")?;
        Ok(res.rows_affected > 0)
    }
}

#[async_trait]
impl AppointmentsRepository for SeaOrmLawOfficeRepository {
    async fn list(&self) -> anyhow::Result<Vec<Appointment>> {
        let rows = appointment::Entity::find()
            .order_by_asc(appointment::Column::AppointmentDate)
            .all(&self.conn().await?)
            .await
            .context("list appointments failed")?;
        rows.into_iter()
            .map(|m| mapper::appointment_from_row(m).context("corrupt appointment row"))
            .collect()
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Appointment>> {
        let found = appointment::Entity::find_by_id(id)
            .one(&self.conn().await?)
            .await
            .context("find appointment failed")?;
        found
            .map(|m| mapper::appointment_from_row(m).context("corrupt appointment row"))
            .transpose()
    }

    async fn insert(&self, a: Appointment) -> Result<(), RepoError> {
        let conn = self.conn().await?;
        mapper::appointment_to_active(a)
            .insert(&conn)
            .await
            .map_err(|e| write_error(e, "insert appointment failed"))?;
        Ok(())
    }

    async fn update(&self, a: Appointment) -> Result<bool, RepoError> {
        let conn = self.conn().await?;
        update_result(
            mapper::appointment_to_active(a).update(&conn).await,
            "update appointment failed",
        )
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = appointment::Entity::delete_by_id(id)
            .exec(&self.conn().await?)
            .await
            .context("delete appointment failed")?;
        Ok(res.rows_affected > 0)
    }
}
