use crate::{
    error::{Error, Violations},
    schema::{Id, User},
};

use sqlx::{Pool, Sqlite};

pub async fn get_user(pool: &Pool<Sqlite>, username: &str) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_user_by_id(pool: &Pool<Sqlite>, user_id: Id) -> Result<Option<User>, Error> {
    let row: Option<User> = sqlx::query_as("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

/// Registers a catalog user. Username and email are both unique.
pub async fn create_user(
    username: &str,
    email: &str,
    first_name: &str,
    last_name: &str,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    if username.trim().is_empty() || email.trim().is_empty() {
        return Err(Error::ValidationFailure(
            "Username and email are required".into(),
        ));
    }

    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO users (username, email, first_name, last_name)
        VALUES ($1, $2, $3, $4)
        RETURNING id
    ",
    )
    .bind(username)
    .bind(email)
    .bind(first_name)
    .bind(last_name)
    .fetch_one(pool)
    .await
    .map_err(|e| Violations::entity("User").translate(e))?;

    Ok(id.0)
}

/// Removes a user together with their recipes and every relation row that
/// points at either.
pub async fn delete_user(user_id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("User".into()));
    }

    Ok(())
}
