use crate::{
    constants::{MAX_INGREDIENT_NAME_LENGTH, MAX_MEASUREMENT_UNIT_LENGTH},
    error::{Error, Violations},
    form::IngredientAmount,
    schema::{Id, Ingredient, RecipeIngredient},
};

use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

/// Ingredients are identified by the (name, unit) pair; the same name with a
/// different unit is a separate ingredient.
pub async fn create_ingredient(
    name: &str,
    measurement_unit: &str,
    pool: &Pool<Sqlite>,
) -> Result<Id, Error> {
    let name = name.trim();
    let measurement_unit = measurement_unit.trim();
    if name.is_empty() || name.chars().count() > MAX_INGREDIENT_NAME_LENGTH {
        return Err(Error::ValidationFailure(format!(
            "Ingredient name must be 1 to {MAX_INGREDIENT_NAME_LENGTH} characters"
        )));
    }
    if measurement_unit.is_empty() || measurement_unit.chars().count() > MAX_MEASUREMENT_UNIT_LENGTH
    {
        return Err(Error::ValidationFailure(format!(
            "Measurement unit must be 1 to {MAX_MEASUREMENT_UNIT_LENGTH} characters"
        )));
    }

    let id: (Id,) = sqlx::query_as(
        "
        INSERT INTO ingredients (name, measurement_unit, name_lower)
        VALUES ($1, $2, $3)
        RETURNING id
    ",
    )
    .bind(name)
    .bind(measurement_unit)
    .bind(name.to_lowercase())
    .fetch_one(pool)
    .await
    .map_err(|e| Violations::entity("Ingredient").translate(e))?;

    Ok(id.0)
}

pub async fn get_ingredient(id: Id, pool: &Pool<Sqlite>) -> Result<Option<Ingredient>, Error> {
    let row: Option<Ingredient> =
        sqlx::query_as("SELECT id, name, measurement_unit FROM ingredients WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(row)
}

/// Case-insensitive prefix search; an empty prefix lists everything.
///
/// Matches against `name_lower`, which holds the Unicode lowercase of the
/// name. SQLite's own case folding only covers ASCII.
pub async fn list_ingredients(
    name_prefix: &str,
    pool: &Pool<Sqlite>,
) -> Result<Vec<Ingredient>, Error> {
    let pattern = format!("{}%", escape_like(&name_prefix.trim().to_lowercase()));

    let rows: Vec<Ingredient> = sqlx::query_as(
        "
        SELECT id, name, measurement_unit FROM ingredients
        WHERE name_lower LIKE $1 ESCAPE '\\'
        ORDER BY name, measurement_unit
    ",
    )
    .bind(pattern)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

pub async fn list_recipe_ingredients(
    pool: &Pool<Sqlite>,
    recipe_id: Id,
) -> Result<Vec<RecipeIngredient>, Error> {
    let rows: Vec<RecipeIngredient> = sqlx::query_as(
        "
        SELECT ri.recipe_id AS recipe_id, i.id AS ingredient_id, i.name AS name,
               i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM recipe_ingredients ri
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE ri.recipe_id = $1
        ORDER BY ri.id
    ",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Clears and recreates the ingredient lines of a recipe on the caller's
/// transaction.
pub(crate) async fn replace_recipe_ingredients(
    recipe_id: Id,
    lines: &[IngredientAmount],
    conn: &mut SqliteConnection,
) -> Result<(), Error> {
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
        .bind(recipe_id)
        .execute(&mut *conn)
        .await?;

    if lines.is_empty() {
        return Ok(());
    }

    let mut query_builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) ");
    query_builder.push_values(lines.iter(), |mut b, line| {
        b.push_bind(recipe_id)
            .push_bind(line.id)
            .push_bind(line.amount);
    });

    query_builder
        .build()
        .execute(&mut *conn)
        .await
        .map_err(|e| Violations::entity("Ingredient").translate(e))?;

    Ok(())
}
