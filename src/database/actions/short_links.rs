use sqlx::{error::ErrorKind, Pool, Sqlite, SqliteConnection};
use uuid::Uuid;

use crate::{
    constants::{SHORT_LINK_LENGTH, SHORT_LINK_MAX_ATTEMPTS},
    error::Error,
    schema::Id,
};

/// A fresh 8 character token taken from a random v4 UUID.
pub fn generate_short_link() -> String {
    Uuid::new_v4().simple().to_string()[..SHORT_LINK_LENGTH].to_owned()
}

/// Returns the recipe's short link, assigning one on first use.
pub async fn ensure_short_link(recipe_id: Id, pool: &Pool<Sqlite>) -> Result<String, Error> {
    ensure_short_link_with(recipe_id, generate_short_link, pool).await
}

/// Same as [`ensure_short_link`] with a caller-supplied candidate source.
pub async fn ensure_short_link_with<F>(
    recipe_id: Id,
    generate: F,
    pool: &Pool<Sqlite>,
) -> Result<String, Error>
where
    F: FnMut() -> String,
{
    let mut tr = pool.begin().await?;
    let token = assign_short_link(recipe_id, generate, &mut *tr).await?;
    tr.commit().await?;

    Ok(token)
}

pub async fn find_recipe_by_short_link(
    token: &str,
    pool: &Pool<Sqlite>,
) -> Result<Option<Id>, Error> {
    let row: Option<(Id,)> = sqlx::query_as("SELECT id FROM recipes WHERE short_link = $1")
        .bind(token)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|r| r.0))
}

/// Assigns a token inside the caller's transaction.
///
/// The first statement is always the conditional UPDATE, so the transaction
/// holds SQLite's write lock before it reads anything. A deferred transaction
/// that reads first cannot upgrade while another connection writes.
///
/// The UNIQUE constraint on `recipes.short_link` decides collisions; the
/// `EXISTS` check on later attempts only skips known ones. An UPDATE that
/// matches no row means the recipe already has a token (or does not exist).
pub(crate) async fn assign_short_link<F>(
    recipe_id: Id,
    mut generate: F,
    conn: &mut SqliteConnection,
) -> Result<String, Error>
where
    F: FnMut() -> String,
{
    for attempt in 1..=SHORT_LINK_MAX_ATTEMPTS {
        let candidate = generate();
        if candidate.chars().count() != SHORT_LINK_LENGTH {
            return Err(Error::Internal(format!(
                "Short link candidate must be {SHORT_LINK_LENGTH} characters"
            )));
        }

        if attempt > 1 {
            let taken: (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM recipes WHERE short_link = $1)")
                    .bind(&candidate)
                    .fetch_one(&mut *conn)
                    .await?;
            if taken.0 {
                log::warn!("Short link collision for recipe {recipe_id} (attempt {attempt})");
                continue;
            }
        }

        let result =
            sqlx::query("UPDATE recipes SET short_link = $1 WHERE id = $2 AND short_link IS NULL")
                .bind(&candidate)
                .bind(recipe_id)
                .execute(&mut *conn)
                .await;

        match result {
            Ok(result) if result.rows_affected() == 1 => return Ok(candidate),
            Ok(_) => {
                return current_short_link(recipe_id, conn)
                    .await?
                    .ok_or_else(|| Error::Internal("Short link vanished".into()));
            }
            Err(sqlx::Error::Database(e)) if matches!(e.kind(), ErrorKind::UniqueViolation) => {
                log::warn!("Short link collision for recipe {recipe_id} (attempt {attempt})");
            }
            Err(e) => return Err(e.into()),
        }
    }

    log::error!(
        "Short link space exhausted for recipe {recipe_id} after {SHORT_LINK_MAX_ATTEMPTS} attempts"
    );
    Err(Error::TokenExhaustion {
        attempts: SHORT_LINK_MAX_ATTEMPTS,
    })
}

async fn current_short_link(
    recipe_id: Id,
    conn: &mut SqliteConnection,
) -> Result<Option<String>, Error> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT short_link FROM recipes WHERE id = $1")
            .bind(recipe_id)
            .fetch_optional(&mut *conn)
            .await?;

    match row {
        Some((token,)) => Ok(token),
        None => Err(Error::NotFound("Recipe".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_links_have_fixed_length() {
        for _ in 0..32 {
            let token = generate_short_link();
            assert_eq!(token.len(), SHORT_LINK_LENGTH);
            assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }
}
