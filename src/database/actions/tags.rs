use crate::{
    constants::{MAX_TAG_NAME_LENGTH, MAX_TAG_SLUG_LENGTH},
    error::{Error, Violations},
    schema::{Id, Tag},
};

use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

pub async fn create_tag(name: &str, slug: &str, pool: &Pool<Sqlite>) -> Result<Id, Error> {
    let name = name.trim();
    let slug = slug.trim();
    if name.is_empty() || name.chars().count() > MAX_TAG_NAME_LENGTH {
        return Err(Error::ValidationFailure(format!(
            "Tag name must be 1 to {MAX_TAG_NAME_LENGTH} characters"
        )));
    }
    if slug.is_empty()
        || slug.chars().count() > MAX_TAG_SLUG_LENGTH
        || !slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::ValidationFailure(format!(
            "Tag slug must be 1 to {MAX_TAG_SLUG_LENGTH} characters of [A-Za-z0-9_-]"
        )));
    }

    let id: (Id,) = sqlx::query_as("INSERT INTO tags (name, slug) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(slug)
        .fetch_one(pool)
        .await
        .map_err(|e| Violations::entity("Tag").translate(e))?;

    Ok(id.0)
}

pub async fn get_tag(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Tag>, Error> {
    let tag: Option<Tag> = sqlx::query_as("SELECT * FROM tags WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(tag)
}

pub async fn list_tags(pool: &Pool<Sqlite>) -> Result<Vec<Tag>, Error> {
    let list: Vec<Tag> = sqlx::query_as("SELECT * FROM tags ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(list)
}

pub async fn find_tags_by_slug(slugs: &[String], pool: &Pool<Sqlite>) -> Result<Vec<Tag>, Error> {
    if slugs.is_empty() {
        return Ok(vec![]);
    }

    let mut query_builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("SELECT * FROM tags WHERE slug IN (");
    let mut separated = query_builder.separated(", ");
    for slug in slugs.iter() {
        separated.push_bind(slug.as_str());
    }
    separated.push_unseparated(") ORDER BY name");

    let list: Vec<Tag> = query_builder.build_query_as().fetch_all(pool).await?;

    Ok(list)
}

pub async fn list_recipe_tags(pool: &Pool<Sqlite>, recipe_id: Id) -> Result<Vec<Tag>, Error> {
    let list: Vec<Tag> = sqlx::query_as(
        "
        SELECT t.*
        FROM recipe_tags rt
        INNER JOIN tags t ON t.id = rt.tag_id
        WHERE rt.recipe_id = $1
        ORDER BY t.name
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(list)
}

/// Replaces the tag set of a recipe. Runs on the caller's transaction.
pub(crate) async fn replace_recipe_tags(
    recipe_id: Id,
    tag_ids: &[Id],
    conn: &mut SqliteConnection,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let mut query_builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO recipe_tags (recipe_id, tag_id) ");
    query_builder.push_values(tag_ids.iter(), |mut b, tag_id| {
        b.push_bind(recipe_id).push_bind(*tag_id);
    });

    query_builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| Violations::entity("Tag").translate(e))?;

    Ok(())
}
