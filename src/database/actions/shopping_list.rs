use std::collections::BTreeMap;

use sqlx::{FromRow, Pool, Sqlite};

use crate::{
    error::Error,
    schema::{
        Id, ShoppingListDocument, ShoppingListIngredient, ShoppingListOwner, ShoppingListRecipe,
    },
};

use super::get_user_by_id;

/// One ingredient line of one recipe sitting in the cart.
#[derive(FromRow, Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Builds the export document for everything in `user_id`'s cart.
///
/// Read-only: two queries (cart recipes, then every ingredient line of those
/// recipes) on one transaction, so both see the same cart, folded in memory.
/// The same cart always yields the same document.
pub async fn build_shopping_list(
    user_id: Id,
    pool: &Pool<Sqlite>,
) -> Result<ShoppingListDocument, Error> {
    let user = get_user_by_id(pool, user_id)
        .await?
        .ok_or_else(|| Error::NotFound("User".into()))?;
    let owner = ShoppingListOwner {
        id: user.id,
        username: user.username,
    };

    let mut tr = pool.begin().await?;

    let recipes: Vec<ShoppingListRecipe> = sqlx::query_as(
        "
        SELECT r.id AS id, r.name AS name, r.cooking_time AS cooking_time
        FROM shopping_cart_items c
        INNER JOIN recipes r ON r.id = c.recipe_id
        WHERE c.user_id = $1
        ORDER BY c.id
    ",
    )
    .bind(user_id)
    .fetch_all(&mut *tr)
    .await?;

    if recipes.is_empty() {
        return Ok(ShoppingListDocument::empty(owner));
    }

    let lines: Vec<CartLine> = sqlx::query_as(
        "
        SELECT i.name AS name, i.measurement_unit AS measurement_unit, ri.amount AS amount
        FROM shopping_cart_items c
        INNER JOIN recipe_ingredients ri ON ri.recipe_id = c.recipe_id
        INNER JOIN ingredients i ON i.id = ri.ingredient_id
        WHERE c.user_id = $1
    ",
    )
    .bind(user_id)
    .fetch_all(&mut *tr)
    .await?;

    tr.commit().await?;

    log::trace!(
        "Shopping list for {}: {} recipes, {} lines",
        owner.username,
        recipes.len(),
        lines.len()
    );

    Ok(ShoppingListDocument {
        user: owner,
        recipes,
        ingredients: aggregate_ingredients(lines),
    })
}

/// Sums amounts per (name, unit) key, sorted by name then unit.
/// Keys are the printed text, not ingredient ids.
pub fn aggregate_ingredients<I>(lines: I) -> Vec<ShoppingListIngredient>
where
    I: IntoIterator<Item = CartLine>,
{
    let mut totals: BTreeMap<(String, String), i64> = BTreeMap::new();
    lines.into_iter().for_each(|line| {
        *totals
            .entry((line.name, line.measurement_unit))
            .or_insert(0) += line.amount;
    });

    totals
        .into_iter()
        .map(|((name, unit), total_amount)| ShoppingListIngredient {
            name,
            unit,
            total_amount,
        })
        .collect()
}
