use sqlx::PgPool;
use uuid::Uuid;

use crate::models::activity::{ActivityRow, NewActivity};
use crate::models::user::UserRow;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    /// Pool that connects on first use. Lets tests build an `AppState`
    /// without a database; queries fail at call time and are handled like
    /// any other store error.
    pub fn connect_lazy(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    // -- User Operations --

    pub async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            r#"INSERT INTO users (email, password_hash)
               VALUES ($1, $2)
               RETURNING id, email, password_hash, created_at, updated_at"#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_users(&self) -> Result<Vec<UserRow>, sqlx::Error> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at, updated_at FROM users ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
    }

    // -- Activity Operations --

    pub async fn insert_activity(&self, activity: &NewActivity) -> Result<ActivityRow, sqlx::Error> {
        sqlx::query_as::<_, ActivityRow>(
            r#"INSERT INTO activities (user_id, kind, endpoint, params, description)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING id, user_id, kind, endpoint, params, description, created_at"#,
        )
        .bind(activity.user_id)
        .bind(activity.kind.as_str())
        .bind(&activity.endpoint)
        .bind(&activity.params)
        .bind(&activity.description)
        .fetch_one(&self.pool)
        .await
    }

    /// All activities for a user, newest first.
    pub async fn list_activities_for_user(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ActivityRow>, sqlx::Error> {
        sqlx::query_as::<_, ActivityRow>(
            r#"SELECT id, user_id, kind, endpoint, params, description, created_at
               FROM activities WHERE user_id = $1 ORDER BY created_at DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
