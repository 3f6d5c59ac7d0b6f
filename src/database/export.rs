use std::fmt::{self, Display};

use crate::schema::ShoppingListDocument;

/*
Plain text shopping list

Shopping list for alice
--------------------------------------------------
Recipe: Pancakes | Cooking time: 20 min

Ingredients:
Flour (kg): 1
*/

const RULE_WIDTH: usize = 50;

impl Display for ShoppingListDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Shopping list for {}", self.user.username)?;
        writeln!(f, "{}", "-".repeat(RULE_WIDTH))?;

        if self.is_empty() {
            return writeln!(f, "Shopping cart is empty");
        }

        for recipe in self.recipes.iter() {
            writeln!(
                f,
                "Recipe: {} | Cooking time: {} min",
                recipe.name, recipe.cooking_time
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Ingredients:")?;
        for ingredient in self.ingredients.iter() {
            writeln!(
                f,
                "{} ({}): {}",
                ingredient.name, ingredient.unit, ingredient.total_amount
            )?;
        }

        Ok(())
    }
}

impl ShoppingListDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn file_name(&self) -> String {
        format!("shopping_cart_{}.txt", self.user.username)
    }
}
