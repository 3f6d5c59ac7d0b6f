use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

pub type Id = i32;

/// The three user-owned link tables guarded by the relation engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Favorite,
    ShoppingCart,
    Subscription,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [
        RelationKind::Favorite,
        RelationKind::ShoppingCart,
        RelationKind::Subscription,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            RelationKind::Favorite => "favorites",
            RelationKind::ShoppingCart => "shopping_cart_items",
            RelationKind::Subscription => "subscriptions",
        }
    }

    pub fn left_column(&self) -> &'static str {
        match self {
            RelationKind::Favorite | RelationKind::ShoppingCart => "user_id",
            RelationKind::Subscription => "subscriber_id",
        }
    }

    pub fn right_column(&self) -> &'static str {
        match self {
            RelationKind::Favorite | RelationKind::ShoppingCart => "recipe_id",
            RelationKind::Subscription => "subscribed_to_id",
        }
    }

    /// Only user-to-user links can point back at their own left side.
    pub fn forbids_self_reference(&self) -> bool {
        matches!(self, RelationKind::Subscription)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            RelationKind::Favorite => "Favorite",
            RelationKind::ShoppingCart => "Shopping cart item",
            RelationKind::Subscription => "Subscription",
        }
    }
}

impl TryFrom<Value> for RelationKind {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value.as_str() {
            Some(value) => match value {
                "favorite" => Ok(Self::Favorite),
                "shopping_cart" => Ok(Self::ShoppingCart),
                "subscription" => Ok(Self::Subscription),
                _ => Err(Error::ValidationFailure(String::from("Invalid relation kind"))),
            },
            None => Err(Error::ValidationFailure(String::from(
                "Failed to parse value as string",
            ))),
        }
    }
}

/// Who is looking at a listing. Anonymous viewers never touch relation tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Viewer {
    Anonymous,
    User(Id),
}

impl Viewer {
    pub fn user_id(&self) -> Option<Id> {
        match self {
            Viewer::Anonymous => None,
            Viewer::User(id) => Some(*id),
        }
    }
}

impl From<Option<Id>> for Viewer {
    fn from(value: Option<Id>) -> Self {
        value.map(Viewer::User).unwrap_or(Viewer::Anonymous)
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Id,
    pub name: String,
    pub slug: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: Id,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub id: Id,
    pub author_id: Id,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub short_link: Option<String>,
    pub created_at: NaiveDateTime,
}

/// One ingredient line of a recipe, joined with its ingredient.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeIngredient {
    pub recipe_id: Id,
    pub ingredient_id: Id,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

#[derive(sqlx::FromRow, Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecipeAnnotation {
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotatedRecipe {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub recipe: Recipe,
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub annotation: RecipeAnnotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub author: User,
    pub is_subscribed: bool,
    pub tags: Vec<Tag>,
    pub ingredients: Vec<RecipeIngredient>,
    #[serde(flatten)]
    pub annotation: RecipeAnnotation,
}

/// Compact recipe form used in subscription listings.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortRecipe {
    pub id: Id,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

/// A row of any relation table, with its columns renamed to left/right.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationRow {
    pub id: Id,
    pub left_id: Id,
    pub right_id: Id,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionSummary {
    pub author: User,
    pub is_subscribed: bool,
    pub recipes_count: i64,
    pub recipes: Vec<ShortRecipe>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeFilter {
    /// Matches recipes carrying any of these tag slugs.
    pub tags: Vec<String>,
    pub author: Option<Id>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListOwner {
    pub id: Id,
    pub username: String,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListRecipe {
    pub id: Id,
    pub name: String,
    pub cooking_time: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListIngredient {
    pub name: String,
    pub unit: String,
    pub total_amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShoppingListDocument {
    pub user: ShoppingListOwner,
    pub recipes: Vec<ShoppingListRecipe>,
    pub ingredients: Vec<ShoppingListIngredient>,
}

impl ShoppingListDocument {
    pub fn empty(user: ShoppingListOwner) -> Self {
        Self {
            user,
            recipes: vec![],
            ingredients: vec![],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty() && self.ingredients.is_empty()
    }
}
