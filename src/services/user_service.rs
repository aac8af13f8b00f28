use sqlx::PgPool;

use crate::dto::auth_dto::UserListQuery;
use crate::error::{Error, Result};
use crate::models::user::{User, UserRole};
use crate::utils::crypto::{hash_password, verify_password};

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let hashed = hash_password(password)?;

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, hashed_password, role)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(&email)
        .bind(&hashed)
        .bind(UserRole::Customer.as_str())
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(user) => {
                tracing::info!(user_id = user.id, "new user registered: {}", user.email);
                Ok(user)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(Error::Conflict("Email already registered".into()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verifies credentials and stamps `last_login`. Inactive accounts are
    /// refused even with the right password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let user = self.get_by_email(&email).await?;

        let Some(user) = user.filter(|u| verify_password(password, &u.hashed_password)) else {
            tracing::warn!("failed login attempt for {}", email);
            return Err(Error::Unauthorized("Incorrect email or password".into()));
        };

        if !user.is_active {
            tracing::warn!(user_id = user.id, "login attempt for disabled account");
            return Err(Error::Forbidden("Account is disabled".into()));
        }

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET last_login = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(user.id)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn list(&self, query: &UserListQuery) -> Result<Vec<User>> {
        let (skip, limit) = query.offset_limit();
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($3::TEXT IS NULL OR role = $3)
              AND ($4::BOOLEAN IS NULL OR is_active = $4)
            ORDER BY created_at DESC, id DESC
            OFFSET $1 LIMIT $2
            "#,
        )
        .bind(skip)
        .bind(limit)
        .bind(query.role.map(|r| r.as_str()))
        .bind(query.is_active)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Applies an admin change. Users are deactivated, never deleted.
    pub async fn update_access(
        &self,
        id: i64,
        role: Option<UserRole>,
        is_active: Option<bool>,
    ) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET role = COALESCE($2, role),
                is_active = COALESCE($3, is_active)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(role.map(|r| r.as_str()))
        .bind(is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::NotFound("User not found".into()))?;
        tracing::info!(user_id = id, role = %user.role, is_active = user.is_active, "user access updated");
        Ok(user)
    }

    pub async fn promote_to_admin(&self, email: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE email = $1 AND role <> $2")
            .bind(email.trim().to_lowercase())
            .bind(UserRole::Admin.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
