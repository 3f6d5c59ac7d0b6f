use sqlx::{Pool, Sqlite};

use crate::{
    error::{Error, Violations},
    schema::{Id, RelationKind, RelationRow},
};

/// Creates one relation row.
///
/// Uniqueness, the self-subscription ban and endpoint existence are all left to
/// the table constraints, so two racing callers for the same pair get exactly
/// one row and one `AlreadyExists`.
pub async fn add_relation(
    kind: RelationKind,
    left_id: Id,
    right_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<RelationRow, Error> {
    if kind.forbids_self_reference() && left_id == right_id {
        log::debug!("Rejected self-referencing {} for {left_id}", kind.describe());
        return Err(Error::SelfReference(kind.describe().to_owned()));
    }

    let row: RelationRow = sqlx::query_as(&format!(
        "
        INSERT INTO {table} ({left}, {right})
        VALUES ($1, $2)
        RETURNING id, {left} AS left_id, {right} AS right_id, created_at
    ",
        table = kind.table(),
        left = kind.left_column(),
        right = kind.right_column(),
    ))
    .bind(left_id)
    .bind(right_id)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        let error = Violations::relation(kind.describe()).translate(e);
        log::debug!("{} ({left_id}, {right_id}) not added: {error}", kind.describe());
        error
    })?;

    Ok(row)
}

/// Deletes exactly one relation row and returns the removed count.
pub async fn remove_relation(
    kind: RelationKind,
    left_id: Id,
    right_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<u64, Error> {
    let mut tr = pool.begin().await?;

    let result = sqlx::query(&format!(
        "DELETE FROM {table} WHERE {left} = $1 AND {right} = $2",
        table = kind.table(),
        left = kind.left_column(),
        right = kind.right_column(),
    ))
    .bind(left_id)
    .bind(right_id)
    .execute(&mut *tr)
    .await?;

    match result.rows_affected() {
        0 => {
            log::debug!("{} ({left_id}, {right_id}) not found", kind.describe());
            Err(Error::NotFound(kind.describe().to_owned()))
        }
        1 => {
            tr.commit().await?;
            Ok(1)
        }
        count => {
            log::error!(
                "Removing {} ({left_id}, {right_id}) matched {count} rows; rolling back",
                kind.describe()
            );
            tr.rollback().await?;
            Err(Error::Internal(format!(
                "{} removal matched {count} rows",
                kind.describe()
            )))
        }
    }
}

pub async fn relation_exists(
    kind: RelationKind,
    left_id: Id,
    right_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<bool, Error> {
    let row: (bool,) = sqlx::query_as(&format!(
        "SELECT EXISTS(SELECT 1 FROM {table} WHERE {left} = $1 AND {right} = $2)",
        table = kind.table(),
        left = kind.left_column(),
        right = kind.right_column(),
    ))
    .bind(left_id)
    .bind(right_id)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

pub async fn count_relations(kind: RelationKind, pool: &Pool<Sqlite>) -> Result<i64, Error> {
    let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", kind.table()))
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}

/// Rows whose left side is `left_id`, ordered by the right-hand id.
pub async fn relations_of(
    kind: RelationKind,
    left_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RelationRow>, Error> {
    let rows: Vec<RelationRow> = sqlx::query_as(&format!(
        "
        SELECT id, {left} AS left_id, {right} AS right_id, created_at
        FROM {table}
        WHERE {left} = $1
        ORDER BY {right}
    ",
        table = kind.table(),
        left = kind.left_column(),
        right = kind.right_column(),
    ))
    .bind(left_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn favorites_of(user_id: Id, pool: &Pool<Sqlite>) -> Result<Vec<RelationRow>, Error> {
    relations_of(RelationKind::Favorite, user_id, pool).await
}

pub async fn cart_items_of(user_id: Id, pool: &Pool<Sqlite>) -> Result<Vec<RelationRow>, Error> {
    relations_of(RelationKind::ShoppingCart, user_id, pool).await
}

pub async fn subscriptions_of(
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<Vec<RelationRow>, Error> {
    relations_of(RelationKind::Subscription, user_id, pool).await
}

/// Subscription rows pointing at `user_id`, ordered by subscriber.
pub async fn subscribers_of(user_id: Id, pool: &Pool<Sqlite>) -> Result<Vec<RelationRow>, Error> {
    let rows: Vec<RelationRow> = sqlx::query_as(
        "
        SELECT id, subscriber_id AS left_id, subscribed_to_id AS right_id, created_at
        FROM subscriptions
        WHERE subscribed_to_id = $1
        ORDER BY subscriber_id
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
