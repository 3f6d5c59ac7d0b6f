use std::collections::HashMap;

use sqlx::{FromRow, Pool, QueryBuilder, Sqlite};

use crate::{
    error::Error,
    schema::{Id, ShortRecipe, SubscriptionSummary, User},
};

#[derive(FromRow)]
struct FollowedAuthor {
    #[sqlx(flatten)]
    user: User,
    recipes_count: i64,
}

#[derive(FromRow)]
struct AuthorRecipe {
    author_id: Id,
    #[sqlx(flatten)]
    recipe: ShortRecipe,
}

/// Authors `user_id` follows, busiest first, each with up to `recipes_limit`
/// of their newest recipes.
pub async fn list_subscriptions(
    user_id: Id,
    recipes_limit: Option<i64>,
    pool: &Pool<Sqlite>,
) -> Result<Vec<SubscriptionSummary>, Error> {
    let authors: Vec<FollowedAuthor> = sqlx::query_as(
        "
        SELECT u.*, COUNT(r.id) AS recipes_count
        FROM subscriptions s
        INNER JOIN users u ON u.id = s.subscribed_to_id
        LEFT JOIN recipes r ON r.author_id = u.id
        WHERE s.subscriber_id = $1
        GROUP BY u.id
        ORDER BY recipes_count DESC, u.username
    ",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    if authors.is_empty() {
        return Ok(vec![]);
    }

    let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "
        SELECT author_id, id, name, image, cooking_time FROM (
            SELECT r.author_id, r.id, r.name, r.image, r.cooking_time,
                   ROW_NUMBER() OVER (PARTITION BY r.author_id ORDER BY r.created_at DESC, r.id DESC) AS position
            FROM recipes r
            WHERE r.author_id IN (",
    );
    let mut separated = query_builder.separated(", ");
    for author in authors.iter() {
        separated.push_bind(author.user.id);
    }
    separated.push_unseparated(")) ranked");
    if let Some(limit) = recipes_limit {
        query_builder.push(" WHERE position <= ").push_bind(limit.max(0));
    }
    query_builder.push(" ORDER BY author_id, position");

    let rows: Vec<AuthorRecipe> = query_builder.build_query_as().fetch_all(pool).await?;

    let mut recipes: HashMap<Id, Vec<ShortRecipe>> = HashMap::new();
    rows.into_iter().for_each(|row| {
        recipes.entry(row.author_id).or_default().push(row.recipe);
    });

    Ok(authors
        .into_iter()
        .map(|author| SubscriptionSummary {
            recipes: recipes.remove(&author.user.id).unwrap_or_default(),
            recipes_count: author.recipes_count,
            is_subscribed: true,
            author: author.user,
        })
        .collect())
}
