#![allow(dead_code)]

use foodgram_sdk::{
    create_ingredient, create_recipe, create_tag, create_user,
    form::{IngredientAmount, RecipeForm},
    open_store,
    schema::Id,
    StoreConfig,
};
use sqlx::{Pool, Sqlite};
use tempfile::TempDir;

pub async fn store() -> Pool<Sqlite> {
    open_store(&StoreConfig::in_memory())
        .await
        .expect("in-memory store should open")
}

/// A database file in a fresh temp directory, opened with several
/// connections so concurrent callers really contend in SQLite.
/// Keep the `TempDir` alive for as long as the pool is used.
pub async fn file_store(max_connections: u32) -> (TempDir, Pool<Sqlite>) {
    let dir = TempDir::new().expect("temp directory should be created");
    let url = format!("sqlite://{}", dir.path().join("foodgram.db").display());
    let config = StoreConfig::new(&url).with_max_connections(max_connections);

    let pool = open_store(&config)
        .await
        .expect("file store should open");

    (dir, pool)
}

pub async fn user(pool: &Pool<Sqlite>, username: &str) -> Id {
    create_user(
        username,
        &format!("{username}@example.com"),
        username,
        "Tester",
        pool,
    )
    .await
    .expect("user should be created")
}

pub async fn tag(pool: &Pool<Sqlite>, slug: &str) -> Id {
    create_tag(&slug.to_uppercase(), slug, pool)
        .await
        .expect("tag should be created")
}

pub async fn ingredient(pool: &Pool<Sqlite>, name: &str, unit: &str) -> Id {
    create_ingredient(name, unit, pool)
        .await
        .expect("ingredient should be created")
}

pub fn form(name: &str, tags: Vec<Id>, ingredients: Vec<(Id, i32)>) -> RecipeForm {
    RecipeForm {
        name: name.to_owned(),
        image: format!("recipes/images/{}.png", name.to_lowercase()),
        text: format!("How to cook {name}"),
        cooking_time: 15,
        tags,
        ingredients: ingredients
            .into_iter()
            .map(|(id, amount)| IngredientAmount { id, amount })
            .collect(),
    }
}

/// A recipe with one fresh tag and one fresh ingredient.
pub async fn recipe(pool: &Pool<Sqlite>, author_id: Id, name: &str) -> Id {
    let slug = format!("tag-{}", name.to_lowercase().replace(' ', "-"));
    let tag_id = tag(pool, &slug).await;
    let ingredient_id = ingredient(pool, &format!("{name} base"), "g").await;

    create_recipe(
        author_id,
        &form(name, vec![tag_id], vec![(ingredient_id, 100)]),
        pool,
    )
    .await
    .expect("recipe should be created")
}
