use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::crud::{ChildEntity, Changes, Column, SqlValue};
use crate::models::record::Record;
use crate::models::resume::{ResumeRow, Theme};
use crate::repository::{
    ReorderOutcome, Repositories, ResumeRepository, ScopedRepository,
};

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Repositories {
            resumes: Arc::new(PgResumeRepository::new(pool.clone())),
            sections: Arc::new(PgScopedRepository::new(pool.clone())),
            educations: Arc::new(PgScopedRepository::new(pool.clone())),
            experiences: Arc::new(PgScopedRepository::new(pool.clone())),
            projects: Arc::new(PgScopedRepository::new(pool.clone())),
            skills: Arc::new(PgScopedRepository::new(pool.clone())),
            certifications: Arc::new(PgScopedRepository::new(pool)),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Resumes
// ────────────────────────────────────────────────────────────────────────────

pub struct PgResumeRepository {
    pool: PgPool,
}

impl PgResumeRepository {
    pub fn new(pool: PgPool) -> Self {
        PgResumeRepository { pool }
    }
}

#[async_trait]
impl ResumeRepository for PgResumeRepository {
    async fn create(&self, user_id: &str, title: &str, theme: Theme) -> Result<ResumeRow> {
        sqlx::query_as::<_, ResumeRow>(
            "INSERT INTO resumes (user_id, title, theme) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(title)
        .bind(theme.as_str())
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to create resume for user {user_id}"))
    }

    async fn find(&self, user_id: &str, id: Uuid) -> Result<Option<ResumeRow>> {
        sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to fetch resume {id}"))
    }

    async fn count_for_user(&self, user_id: &str) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM resumes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .with_context(|| format!("failed to count resumes for user {user_id}"))
    }

    async fn list(&self, user_id: &str, limit: i64, offset: i64) -> Result<Vec<ResumeRow>> {
        sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT * FROM resumes
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to list resumes for user {user_id}"))
    }

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        title: Option<&str>,
        theme: Option<Theme>,
    ) -> Result<Option<ResumeRow>> {
        sqlx::query_as::<_, ResumeRow>(
            r#"
            UPDATE resumes
            SET title = COALESCE($1, title),
                theme = COALESCE($2, theme),
                updated_at = NOW()
            WHERE id = $3 AND user_id = $4
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(theme.map(Theme::as_str))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update resume {id}"))
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete resume {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Child entities
// ────────────────────────────────────────────────────────────────────────────

/// Postgres repository for any [`ChildEntity`]; the entity supplies table and
/// column names, this type supplies the ownership-scoped statements.
pub struct PgScopedRepository<E> {
    pool: PgPool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> PgScopedRepository<E> {
    pub fn new(pool: PgPool) -> Self {
        PgScopedRepository {
            pool,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E: ChildEntity> ScopedRepository<E> for PgScopedRepository<E> {
    async fn insert(
        &self,
        user_id: &str,
        resume_id: Uuid,
        order_index: i32,
        fields: &E::Fields,
    ) -> Result<Option<Record<E::Fields>>> {
        let mut query = insert_query(
            E::TABLE,
            user_id,
            resume_id,
            order_index,
            E::columns(fields),
        );
        query
            .build_query_as::<Record<E::Fields>>()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to insert {} for resume {resume_id}", E::LABEL))
    }

    async fn find(&self, user_id: &str, id: Uuid) -> Result<Option<Record<E::Fields>>> {
        let sql = find_sql(E::TABLE);
        sqlx::query_as::<_, Record<E::Fields>>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to fetch {} {id}", E::LABEL))
    }

    async fn list_by_resume(
        &self,
        user_id: &str,
        resume_id: Uuid,
    ) -> Result<Vec<Record<E::Fields>>> {
        let sql = list_sql(E::TABLE);
        sqlx::query_as::<_, Record<E::Fields>>(&sql)
            .bind(resume_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("failed to list {} rows of resume {resume_id}", E::LABEL))
    }

    async fn update(
        &self,
        user_id: &str,
        id: Uuid,
        order_index: Option<i32>,
        changes: &E::Changes,
    ) -> Result<Option<Record<E::Fields>>> {
        let mut query = update_query(E::TABLE, user_id, id, order_index, changes.columns());
        query
            .build_query_as::<Record<E::Fields>>()
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to update {} {id}", E::LABEL))
    }

    async fn reorder(&self, user_id: &str, items: &[(Uuid, i32)]) -> Result<ReorderOutcome> {
        let sql = reorder_sql(E::TABLE);
        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin reorder transaction")?;

        for &(id, order_index) in items {
            let result = sqlx::query(&sql)
                .bind(order_index)
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("failed to set order of {} {id}", E::LABEL))?;

            if result.rows_affected() == 0 {
                tx.rollback()
                    .await
                    .context("failed to roll back reorder transaction")?;
                return Ok(ReorderOutcome::Missing(id));
            }
        }

        tx.commit()
            .await
            .context("failed to commit reorder transaction")?;
        Ok(ReorderOutcome::Applied)
    }

    async fn delete(&self, user_id: &str, id: Uuid) -> Result<bool> {
        let sql = delete_sql(E::TABLE);
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete {} {id}", E::LABEL))?;
        Ok(result.rows_affected() > 0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Statement builders
// ────────────────────────────────────────────────────────────────────────────

const OWNED_RESUMES: &str = "resume_id IN (SELECT id FROM resumes WHERE user_id = ";

fn push_value(query: &mut QueryBuilder<'static, Postgres>, value: SqlValue) {
    match value {
        SqlValue::Text(v) => {
            query.push_bind(v);
        }
        SqlValue::Date(v) => {
            query.push_bind(v);
        }
        SqlValue::Bool(v) => {
            query.push_bind(v);
        }
        SqlValue::TextArray(v) => {
            query.push_bind(v);
        }
    }
}

/// INSERT ... SELECT from the owning resume, so a foreign or missing parent
/// inserts nothing and returns no row.
pub(crate) fn insert_query(
    table: &str,
    user_id: &str,
    resume_id: Uuid,
    order_index: i32,
    columns: Vec<Column>,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("INSERT INTO {table} (resume_id, order_index"));
    for (name, _) in &columns {
        query.push(", ").push(*name);
    }
    query.push(") SELECT r.id, ").push_bind(order_index);
    for (_, value) in columns {
        query.push(", ");
        push_value(&mut query, value);
    }
    query
        .push(" FROM resumes r WHERE r.id = ")
        .push_bind(resume_id)
        .push(" AND r.user_id = ")
        .push_bind(user_id.to_string())
        .push(" RETURNING *");
    query
}

pub(crate) fn update_query(
    table: &str,
    user_id: &str,
    id: Uuid,
    order_index: Option<i32>,
    columns: Vec<Column>,
) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("UPDATE {table} SET "));
    for (name, value) in columns {
        query.push(name).push(" = ");
        push_value(&mut query, value);
        query.push(", ");
    }
    if let Some(order_index) = order_index {
        query.push("order_index = ").push_bind(order_index).push(", ");
    }
    query
        .push("updated_at = NOW() WHERE id = ")
        .push_bind(id)
        .push(" AND ")
        .push(OWNED_RESUMES)
        .push_bind(user_id.to_string())
        .push(") RETURNING *");
    query
}

pub(crate) fn find_sql(table: &str) -> String {
    format!(
        "SELECT t.* FROM {table} t JOIN resumes r ON r.id = t.resume_id \
         WHERE t.id = $1 AND r.user_id = $2"
    )
}

pub(crate) fn list_sql(table: &str) -> String {
    format!(
        "SELECT t.* FROM {table} t JOIN resumes r ON r.id = t.resume_id \
         WHERE t.resume_id = $1 AND r.user_id = $2 \
         ORDER BY t.order_index ASC, t.created_at ASC"
    )
}

pub(crate) fn reorder_sql(table: &str) -> String {
    format!(
        "UPDATE {table} SET order_index = $1, updated_at = NOW() \
         WHERE id = $2 AND {OWNED_RESUMES}$3)"
    )
}

pub(crate) fn delete_sql(table: &str) -> String {
    format!("DELETE FROM {table} WHERE id = $1 AND {OWNED_RESUMES}$2)")
}
