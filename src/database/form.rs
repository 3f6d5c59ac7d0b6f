use std::{
    collections::{HashMap, HashSet},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{error::Error, schema::Id};
use crate::constants::{
    MAX_AMOUNT, MAX_COOKING_TIME, MAX_RECIPE_NAME_LENGTH, MIN_AMOUNT, MIN_COOKING_TIME,
};

pub type FormData = HashMap<String, Value>;

pub struct Form {
    inner: HashMap<String, Value>,
}

impl Form {
    pub fn from_data(data: FormData) -> Self {
        Self { inner: data }
    }

    fn get(&self, key: &str) -> Result<&Value, Error> {
        self.inner
            .get(key)
            .ok_or_else(|| Error::ValidationFailure(format!("Field '{key}' is required")))
    }

    pub fn get_value<T>(&self, key: &str) -> Result<T, Error>
    where
        T: TryFrom<Value>,
    {
        self.get(key)?
            .to_owned()
            .try_into()
            .map_err(|_e| Error::ValidationFailure(format!("Invalid value for '{key}'")))
    }

    /// Accepts JSON numbers as well as numeric strings.
    pub fn get_number<T>(&self, key: &str) -> Result<T, Error>
    where
        T: FromStr,
    {
        parse_number(self.get(key)?)
            .ok_or_else(|| Error::ValidationFailure(format!("'{key}' must be a valid number")))
    }

    pub fn get_str(&self, key: &str) -> Result<String, Error> {
        match self.get(key)?.as_str() {
            Some(v) => Ok(v.to_string()),
            None => Err(Error::ValidationFailure(format!("'{key}' must be a string"))),
        }
    }

    pub fn get_list(&self, key: &str) -> Result<&Vec<Value>, Error> {
        match self.get(key)?.as_array() {
            Some(v) => Ok(v),
            None => Err(Error::ValidationFailure(format!("'{key}' must be a list"))),
        }
    }
}

fn parse_number<T: FromStr>(value: &Value) -> Option<T> {
    match value {
        Value::Number(n) => n.to_string().parse().ok(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientAmount {
    pub id: Id,
    pub amount: i32,
}

/// Payload for creating or wholesale-replacing a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeForm {
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub tags: Vec<Id>,
    pub ingredients: Vec<IngredientAmount>,
}

impl RecipeForm {
    pub fn validate(&self) -> Result<(), Error> {
        let name_length = self.name.trim().chars().count();
        if name_length == 0 {
            return Err(Error::ValidationFailure("Recipe name is required".into()));
        }
        if self.name.chars().count() > MAX_RECIPE_NAME_LENGTH {
            return Err(Error::ValidationFailure(format!(
                "Maximum name length is {MAX_RECIPE_NAME_LENGTH}"
            )));
        }
        if self.text.trim().is_empty() {
            return Err(Error::ValidationFailure("Recipe text is required".into()));
        }
        if self.image.trim().is_empty() {
            return Err(Error::ValidationFailure("Recipe image is required".into()));
        }
        if !(MIN_COOKING_TIME..=MAX_COOKING_TIME).contains(&self.cooking_time) {
            return Err(Error::ValidationFailure(format!(
                "Cooking time must be between {MIN_COOKING_TIME} and {MAX_COOKING_TIME}"
            )));
        }

        if self.tags.is_empty() {
            return Err(Error::ValidationFailure("At least one tag is required".into()));
        }
        let mut seen = HashSet::new();
        if !self.tags.iter().all(|id| seen.insert(*id)) {
            return Err(Error::ValidationFailure("Tags must be unique".into()));
        }

        if self.ingredients.is_empty() {
            return Err(Error::ValidationFailure(
                "Ingredients must be non empty list".into(),
            ));
        }
        let mut seen = HashSet::new();
        for line in self.ingredients.iter() {
            if !seen.insert(line.id) {
                return Err(Error::ValidationFailure("Ingredients must be unique".into()));
            }
            if !(MIN_AMOUNT..=MAX_AMOUNT).contains(&line.amount) {
                return Err(Error::ValidationFailure(format!(
                    "Amount must be between {MIN_AMOUNT} and {MAX_AMOUNT}"
                )));
            }
        }

        Ok(())
    }
}

impl TryFrom<&Form> for RecipeForm {
    type Error = Error;

    fn try_from(form: &Form) -> Result<Self, Self::Error> {
        let tags = form
            .get_list("tags")?
            .iter()
            .map(|value| {
                parse_number::<Id>(value)
                    .ok_or_else(|| Error::ValidationFailure("Tag ids must be numbers".into()))
            })
            .collect::<Result<Vec<Id>, Error>>()?;

        let ingredients = form
            .get_list("ingredients")?
            .iter()
            .map(|value| {
                let id = value.get("id").and_then(parse_number::<Id>);
                let amount = value.get("amount").and_then(parse_number::<i32>);
                match (id, amount) {
                    (Some(id), Some(amount)) => Ok(IngredientAmount { id, amount }),
                    _ => Err(Error::ValidationFailure(
                        "Each ingredient must have an id and amount".into(),
                    )),
                }
            })
            .collect::<Result<Vec<IngredientAmount>, Error>>()?;

        let recipe = Self {
            name: form.get_str("name")?,
            image: form.get_str("image")?,
            text: form.get_str("text")?,
            cooking_time: form.get_number("cooking_time")?,
            tags,
            ingredients,
        };
        recipe.validate()?;

        Ok(recipe)
    }
}
