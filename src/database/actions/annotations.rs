use std::collections::{HashMap, HashSet};

use sqlx::{Pool, QueryBuilder, Sqlite};

use crate::{
    constants::ANNOTATION_BATCH_SIZE,
    error::Error,
    schema::{Id, RecipeAnnotation, RelationKind, Viewer},
};

/// Computes `is_favorited` / `is_in_shopping_cart` for every recipe in
/// `recipe_ids`.
///
/// Anonymous viewers short-circuit without touching the store. Otherwise each
/// flag costs one batched membership query over the whole candidate list.
pub async fn annotate(
    recipe_ids: &[Id],
    viewer: Viewer,
    pool: &Pool<Sqlite>,
) -> Result<HashMap<Id, RecipeAnnotation>, Error> {
    let mut annotations: HashMap<Id, RecipeAnnotation> = recipe_ids
        .iter()
        .map(|id| (*id, RecipeAnnotation::default()))
        .collect();

    let user_id = match viewer.user_id() {
        Some(user_id) if !annotations.is_empty() => user_id,
        _ => return Ok(annotations),
    };

    let ids: Vec<Id> = annotations.keys().copied().collect();

    let favorited = matching_right_ids(RelationKind::Favorite, user_id, &ids, pool).await?;
    let in_cart = matching_right_ids(RelationKind::ShoppingCart, user_id, &ids, pool).await?;

    annotations.iter_mut().for_each(|(id, annotation)| {
        annotation.is_favorited = favorited.contains(id);
        annotation.is_in_shopping_cart = in_cart.contains(id);
    });

    Ok(annotations)
}

/// Whether `viewer` follows each of `author_ids`. Same short-circuit rules as
/// [`annotate`].
pub async fn annotate_subscriptions(
    author_ids: &[Id],
    viewer: Viewer,
    pool: &Pool<Sqlite>,
) -> Result<HashMap<Id, bool>, Error> {
    let mut subscribed: HashMap<Id, bool> = author_ids.iter().map(|id| (*id, false)).collect();

    let user_id = match viewer.user_id() {
        Some(user_id) if !subscribed.is_empty() => user_id,
        _ => return Ok(subscribed),
    };

    let ids: Vec<Id> = subscribed.keys().copied().collect();
    let followed = matching_right_ids(RelationKind::Subscription, user_id, &ids, pool).await?;

    subscribed
        .iter_mut()
        .for_each(|(id, value)| *value = followed.contains(id));

    Ok(subscribed)
}

pub async fn is_subscribed(
    viewer: Viewer,
    author_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<bool, Error> {
    let subscribed = annotate_subscriptions(&[author_id], viewer, pool).await?;

    Ok(subscribed.get(&author_id).copied().unwrap_or(false))
}

/// The subset of `candidates` that appear as right-hand ids of `left_id`'s
/// rows in `kind`. One `IN (...)` query per `ANNOTATION_BATCH_SIZE` ids.
async fn matching_right_ids(
    kind: RelationKind,
    left_id: Id,
    candidates: &[Id],
    pool: &Pool<Sqlite>,
) -> Result<HashSet<Id>, Error> {
    let mut matched = HashSet::new();

    for chunk in candidates.chunks(ANNOTATION_BATCH_SIZE) {
        let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {right} FROM {table} WHERE {left} = ",
            table = kind.table(),
            left = kind.left_column(),
            right = kind.right_column(),
        ));
        query_builder.push_bind(left_id);
        query_builder.push(format!(" AND {} IN (", kind.right_column()));
        let mut separated = query_builder.separated(", ");
        for id in chunk.iter() {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows: Vec<(Id,)> = query_builder.build_query_as().fetch_all(pool).await?;
        matched.extend(rows.into_iter().map(|row| row.0));
    }

    Ok(matched)
}
