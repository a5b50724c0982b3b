use anyhow::Error;
use chrono::Utc;
use sqlx::{Pool, Sqlite, query_as, query_scalar};

use crate::model::db_model::UserDb;

pub async fn insert_user(
    username: &str,
    email: &str,
    password_hash: &str,
    gdpr_consent: bool,
    pool: &Pool<Sqlite>,
) -> Result<UserDb, Error> {
    let user = query_as::<_, UserDb>(
        "INSERT INTO users (username, email, password_hash, gdpr_consent, created_at)
         VALUES (?, ?, ?, ?, ?)
         RETURNING id, username, email, password_hash, gdpr_consent, created_at",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(gdpr_consent)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(user)
}

pub async fn get_user_by_email(email: &str, pool: &Pool<Sqlite>) -> Result<Option<UserDb>, Error> {
    let user = query_as::<_, UserDb>(
        "SELECT id, username, email, password_hash, gdpr_consent, created_at
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn email_exists(email: &str, pool: &Pool<Sqlite>) -> Result<bool, Error> {
    let exists =
        query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE email = ?)")
            .bind(email)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn inserted_user_is_found_by_email(pool: SqlitePool) {
        let user = insert_user("rider", "rider@example.com", "hash", true, &pool)
            .await
            .unwrap();

        let found = get_user_by_email("rider@example.com", &pool)
            .await
            .unwrap()
            .expect("user should exist");

        assert_eq!(found.id, user.id);
        assert!(found.gdpr_consent);
        assert!(email_exists("rider@example.com", &pool).await.unwrap());
        assert!(!email_exists("ghost@example.com", &pool).await.unwrap());
    }
}
