use crate::{
    error::{Error, Violations},
    form::RecipeForm,
    schema::{AnnotatedRecipe, Id, Recipe, RecipeDetail, RecipeFilter, Viewer},
};

use super::{
    annotate, assign_short_link, generate_short_link, get_user_by_id, is_subscribed,
    list_recipe_ingredients, list_recipe_tags, replace_recipe_ingredients, replace_recipe_tags,
};

use sqlx::{Pool, QueryBuilder, Sqlite};

/// Persists a recipe with its tag links, ingredient lines and short link in
/// a single transaction.
pub async fn create_recipe(
    author_id: Id,
    form: &RecipeForm,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    form.validate()?;

    let mut tr = pool.begin().await?;

    let recipe: (Id,) = sqlx::query_as(
        "
        INSERT INTO recipes (author_id, name, image, text, cooking_time)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
    ",
    )
    .bind(author_id)
    .bind(form.name.trim())
    .bind(&form.image)
    .bind(&form.text)
    .bind(form.cooking_time)
    .fetch_one(&mut *tr)
    .await
    .map_err(|e| Violations::entity("Author").translate(e))?;

    let recipe_id = recipe.0;

    replace_recipe_tags(recipe_id, &form.tags, &mut *tr).await?;
    replace_recipe_ingredients(recipe_id, &form.ingredients, &mut *tr).await?;
    assign_short_link(recipe_id, generate_short_link, &mut *tr).await?;

    tr.commit().await?;

    log::debug!("Created recipe {recipe_id} for author {author_id}");
    Ok(recipe_id)
}

/// Rewrites the recipe fields and replaces its tag set and ingredient lines
/// wholesale. Readers never observe a partially replaced recipe.
pub async fn update_recipe(
    recipe_id: Id,
    form: &RecipeForm,
    pool: &Pool<Sqlite>,
) -> Result<(), Error> {
    form.validate()?;

    let mut tr = pool.begin().await?;

    let result = sqlx::query(
        "UPDATE recipes SET name = $1, image = $2, text = $3, cooking_time = $4 WHERE id = $5",
    )
    .bind(form.name.trim())
    .bind(&form.image)
    .bind(&form.text)
    .bind(form.cooking_time)
    .bind(recipe_id)
    .execute(&mut *tr)
    .await
    .map_err(|e| Violations::entity("Recipe").translate(e))?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Recipe".into()));
    }

    replace_recipe_tags(recipe_id, &form.tags, &mut *tr).await?;
    replace_recipe_ingredients(recipe_id, &form.ingredients, &mut *tr).await?;

    tr.commit().await?;

    Ok(())
}

/// Deletes a recipe; tag links, ingredient lines, favorites and cart rows
/// cascade with it.
pub async fn delete_recipe(recipe_id: Id, pool: &Pool<Sqlite>) -> Result<(), Error> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = $1")
        .bind(recipe_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("Recipe".into()));
    }

    Ok(())
}

pub async fn get_recipe(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Recipe>, Error> {
    let row: Option<Recipe> = sqlx::query_as("SELECT * FROM recipes WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}

pub async fn get_recipe_detail(
    id: Id,
    viewer: Viewer,
    pool: &Pool<Sqlite>,
) -> Result<RecipeDetail, Error> {
    let recipe = get_recipe(id, pool)
        .await?
        .ok_or_else(|| Error::NotFound("Recipe".into()))?;
    let author = get_user_by_id(pool, recipe.author_id)
        .await?
        .ok_or_else(|| Error::Internal(format!("Recipe {id} has no author")))?;

    let tags = list_recipe_tags(pool, id).await?;
    let ingredients = list_recipe_ingredients(pool, id).await?;
    let annotation = annotate(&[id], viewer, pool)
        .await?
        .remove(&id)
        .unwrap_or_default();
    let is_subscribed = is_subscribed(viewer, author.id, pool).await?;

    Ok(RecipeDetail {
        recipe,
        author,
        is_subscribed,
        tags,
        ingredients,
        annotation,
    })
}

/// Newest-first recipe listing with viewer flags computed in the same query.
///
/// `is_favorited` / `is_in_shopping_cart` only narrow the listing when set to
/// `true`; `false` means no filter. Anonymous viewers get constant `false`
/// flags, and any use of either filter returns nothing for them.
pub async fn list_recipes(
    filter: &RecipeFilter,
    viewer: Viewer,
    pool: &Pool<Sqlite>,
) -> Result<Vec<AnnotatedRecipe>, Error> {
    let user_id = match viewer.user_id() {
        Some(user_id) => user_id,
        None if filter.is_favorited.is_some() || filter.is_in_shopping_cart.is_some() => {
            return Ok(vec![]);
        }
        None => {
            return list_recipes_anonymous(filter, pool).await;
        }
    };

    let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT r.*, ");
    query_builder
        .push("EXISTS(SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
        .push_bind(user_id)
        .push(") AS is_favorited, ");
    query_builder
        .push("EXISTS(SELECT 1 FROM shopping_cart_items c WHERE c.recipe_id = r.id AND c.user_id = ")
        .push_bind(user_id)
        .push(") AS is_in_shopping_cart FROM recipes r WHERE 1 = 1");

    push_common_filters(&mut query_builder, filter);

    if filter.is_favorited == Some(true) {
        query_builder
            .push(" AND EXISTS(SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
            .push_bind(user_id)
            .push(")");
    }
    if filter.is_in_shopping_cart == Some(true) {
        query_builder
            .push(" AND EXISTS(SELECT 1 FROM shopping_cart_items c WHERE c.recipe_id = r.id AND c.user_id = ")
            .push_bind(user_id)
            .push(")");
    }

    push_order_and_limit(&mut query_builder, filter);

    let rows: Vec<AnnotatedRecipe> = query_builder.build_query_as().fetch_all(pool).await?;

    Ok(rows)
}

async fn list_recipes_anonymous(
    filter: &RecipeFilter,
    pool: &Pool<Sqlite>,
) -> Result<Vec<AnnotatedRecipe>, Error> {
    let mut query_builder: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT r.*, FALSE AS is_favorited, FALSE AS is_in_shopping_cart FROM recipes r WHERE 1 = 1",
    );

    push_common_filters(&mut query_builder, filter);
    push_order_and_limit(&mut query_builder, filter);

    let rows: Vec<AnnotatedRecipe> = query_builder.build_query_as().fetch_all(pool).await?;

    Ok(rows)
}

fn push_common_filters(query_builder: &mut QueryBuilder<'_, Sqlite>, filter: &RecipeFilter) {
    if let Some(author) = filter.author {
        query_builder.push(" AND r.author_id = ").push_bind(author);
    }

    if !filter.tags.is_empty() {
        query_builder.push(
            " AND EXISTS(SELECT 1 FROM recipe_tags rt INNER JOIN tags t ON t.id = rt.tag_id \
             WHERE rt.recipe_id = r.id AND t.slug IN (",
        );
        let mut separated = query_builder.separated(", ");
        for slug in filter.tags.iter() {
            separated.push_bind(slug.clone());
        }
        separated.push_unseparated("))");
    }
}

fn push_order_and_limit(query_builder: &mut QueryBuilder<'_, Sqlite>, filter: &RecipeFilter) {
    query_builder.push(" ORDER BY r.created_at DESC, r.id DESC");

    if let Some(limit) = filter.limit {
        query_builder.push(" LIMIT ").push_bind(limit.max(0));
    }
}
