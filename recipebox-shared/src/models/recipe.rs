use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;

/// Maximum number of ingredient slots a recipe carries on the wire.
pub const MAX_INGREDIENTS: usize = 4;

/// A recipe as returned by the API.
///
/// Decoding is lenient: every field may be missing or `null`, and scalar
/// values are accepted as text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    /// Document identifier assigned by the store.
    #[serde(rename = "_id", default, deserialize_with = "lenient::text")]
    pub id: String,

    /// Recipe title.
    #[serde(default, deserialize_with = "lenient::text")]
    pub title: String,

    /// Free-form description and instructions.
    #[serde(rename = "ist", default, deserialize_with = "lenient::text")]
    pub description: String,

    #[serde(rename = "ing1", default, deserialize_with = "lenient::text")]
    pub ingredient1: String,
    #[serde(rename = "ing2", default, deserialize_with = "lenient::text")]
    pub ingredient2: String,
    #[serde(rename = "ing3", default, deserialize_with = "lenient::text")]
    pub ingredient3: String,
    #[serde(rename = "ing4", default, deserialize_with = "lenient::text")]
    pub ingredient4: String,

    /// Single quantity field shared by the ingredients.
    #[serde(rename = "qty1", default, deserialize_with = "lenient::text")]
    pub quantity: String,

    /// Image reference (usually a URL).
    #[serde(rename = "imgUrl", default, deserialize_with = "lenient::text")]
    pub image_url: String,

    /// Identifier of the user who created the recipe.
    #[serde(
        default,
        deserialize_with = "lenient::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub user: Option<String>,

    #[serde(
        rename = "createdAt",
        default,
        deserialize_with = "lenient::timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Recipe {
    /// Non-empty ingredient slots in order.
    pub fn ingredients(&self) -> impl Iterator<Item = &str> {
        [
            self.ingredient1.as_str(),
            self.ingredient2.as_str(),
            self.ingredient3.as_str(),
            self.ingredient4.as_str(),
        ]
        .into_iter()
        .filter(|ingredient| !ingredient.trim().is_empty())
    }
}

/// Payload for `POST /add`. Fields are sent exactly as given.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewRecipe {
    pub title: String,
    #[serde(rename = "ist")]
    pub description: String,
    #[serde(rename = "ing1")]
    pub ingredient1: String,
    #[serde(rename = "ing2")]
    pub ingredient2: String,
    #[serde(rename = "ing3")]
    pub ingredient3: String,
    #[serde(rename = "ing4")]
    pub ingredient4: String,
    #[serde(rename = "qty1")]
    pub quantity: String,
    #[serde(rename = "imgUrl")]
    pub image_url: String,
}

impl NewRecipe {
    /// Start a recipe with a title and description; every other field is empty.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Fill ingredient slots in order. Anything past the fourth is dropped.
    #[must_use]
    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let slots = [
            &mut self.ingredient1,
            &mut self.ingredient2,
            &mut self.ingredient3,
            &mut self.ingredient4,
        ];
        for (slot, ingredient) in slots.into_iter().zip(ingredients) {
            *slot = ingredient.into();
        }
        self
    }

    #[must_use]
    pub fn with_quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = quantity.into();
        self
    }

    #[must_use]
    pub fn with_image_url(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }
}

/// Body of `GET /` and `GET /saved`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeListResponse {
    #[serde(default)]
    pub recipe: Vec<Recipe>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `GET /:id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeResponse {
    pub recipe: Recipe,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recipe_deserializes_wire_field_names() {
        let recipe: Recipe = serde_json::from_value(json!({
            "_id": "66a1",
            "title": "Pancakes",
            "ist": "Mix and fry",
            "ing1": "flour",
            "ing2": "milk",
            "ing3": "",
            "qty1": "2 cups",
            "imgUrl": "https://img.example/pancakes.png",
            "user": "u1",
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .expect("recipe should deserialize");

        assert_eq!(recipe.id, "66a1");
        assert_eq!(recipe.description, "Mix and fry");
        assert_eq!(recipe.quantity, "2 cups");
        assert_eq!(recipe.image_url, "https://img.example/pancakes.png");
        assert_eq!(recipe.user.as_deref(), Some("u1"));
        assert!(recipe.created_at.is_some());
        assert_eq!(recipe.ingredients().collect::<Vec<_>>(), ["flour", "milk"]);
    }

    #[test]
    fn test_recipe_tolerates_sparse_documents() {
        let recipe: Recipe =
            serde_json::from_value(json!({ "title": "Toast" })).expect("sparse recipe");
        assert!(recipe.id.is_empty());
        assert_eq!(recipe.ingredients().count(), 0);
        assert!(recipe.user.is_none());
    }

    #[test]
    fn test_recipe_tolerates_null_and_numeric_fields() {
        let recipe: Recipe = serde_json::from_value(json!({
            "_id": "r2",
            "title": null,
            "ing1": "rice",
            "ing3": null,
            "qty1": 2,
            "imgUrl": null,
            "user": null,
            "createdAt": "yesterday"
        }))
        .expect("lenient recipe");

        assert!(recipe.title.is_empty());
        assert_eq!(recipe.quantity, "2");
        assert!(recipe.image_url.is_empty());
        assert!(recipe.user.is_none());
        assert!(recipe.created_at.is_none());
        assert_eq!(recipe.ingredients().collect::<Vec<_>>(), ["rice"]);
    }

    #[test]
    fn test_recipe_list_survives_one_odd_record() {
        let list: RecipeListResponse = serde_json::from_value(json!({
            "recipe": [
                { "_id": "r1", "title": "Toast", "qty1": 2 },
                { "_id": "r2", "title": "Soup", "ing3": null }
            ]
        }))
        .expect("list");
        assert_eq!(list.recipe.len(), 2);
        assert_eq!(list.recipe[0].quantity, "2");
    }

    #[test]
    fn test_new_recipe_serializes_every_field() {
        let recipe = NewRecipe::new("Soup", "Boil")
            .with_ingredients(["water", "salt", "leek", "potato", "ignored"])
            .with_quantity("1 pot")
            .with_image_url("soup.png");

        let value = serde_json::to_value(&recipe).expect("serialize");
        assert_eq!(
            value,
            json!({
                "title": "Soup",
                "ist": "Boil",
                "ing1": "water",
                "ing2": "salt",
                "ing3": "leek",
                "ing4": "potato",
                "qty1": "1 pot",
                "imgUrl": "soup.png"
            })
        );
    }

    #[test]
    fn test_new_recipe_keeps_empty_fields_on_the_wire() {
        let value = serde_json::to_value(NewRecipe::new("Tea", "")).expect("serialize");
        assert_eq!(value["ing1"], "");
        assert_eq!(value["imgUrl"], "");
    }

    #[test]
    fn test_list_response_defaults_to_empty() {
        let list: RecipeListResponse =
            serde_json::from_value(json!({ "message": "ok" })).expect("list");
        assert!(list.recipe.is_empty());
        assert_eq!(list.message.as_deref(), Some("ok"));
    }
}
