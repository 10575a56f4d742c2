use anyhow::{Context, Result, bail};
use clap::Args;
use client::{ApiResponse, FetchOutcome, SessionStore};
use shared::models::{NewRecipe, Recipe, RecipeResponse, recipe::MAX_INGREDIENTS};

use super::session::require_session;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Recipe title
    #[arg(long, short)]
    pub title: String,

    /// Description and instructions
    #[arg(long, short)]
    pub description: String,

    /// Ingredient, repeat for each one (up to four)
    #[arg(long = "ingredient", short, value_name = "INGREDIENT")]
    pub ingredients: Vec<String>,

    /// Quantity shared by the ingredients, e.g. "2 cups"
    #[arg(long, short)]
    pub quantity: Option<String>,

    /// Link to a picture of the dish
    #[arg(long)]
    pub image_url: Option<String>,
}

impl AddArgs {
    fn into_recipe(self) -> Result<NewRecipe> {
        if self.ingredients.len() > MAX_INGREDIENTS {
            bail!(
                "a recipe takes at most {MAX_INGREDIENTS} ingredients, got {}",
                self.ingredients.len()
            );
        }
        let mut recipe =
            NewRecipe::new(self.title, self.description).with_ingredients(self.ingredients);
        if let Some(quantity) = self.quantity {
            recipe = recipe.with_quantity(quantity);
        }
        if let Some(image_url) = self.image_url {
            recipe = recipe.with_image_url(image_url);
        }
        Ok(recipe)
    }
}

pub async fn list(store: &SessionStore) -> Result<()> {
    match store.fetch_recipes().await {
        FetchOutcome::Applied | FetchOutcome::Stale => {}
        FetchOutcome::Malformed => bail!("server returned an unreadable recipe list"),
        FetchOutcome::Failed => bail!("could not load recipes; see the log for details"),
    }
    print_recipes(&store.recipes(), "No recipes yet");
    Ok(())
}

/// Saved recipes were fetched while restoring the session.
pub fn saved(store: &SessionStore) -> Result<()> {
    require_session(store)?;
    print_recipes(&store.saved_recipes(), "No saved recipes");
    Ok(())
}

pub async fn add(store: &SessionStore, args: AddArgs) -> Result<()> {
    let recipe = args.into_recipe()?;
    require_session(store)?;

    let response = store
        .add_recipe(&recipe)
        .await
        .context("failed to add recipe")?;
    print_server_message(&response, "Recipe added");
    match refresh_problem(store.fetch_recipes().await) {
        None => println!("{} recipes listed", store.recipes().len()),
        Some(reason) => eprintln!("warning: could not refresh the recipe list: {reason}"),
    }
    Ok(())
}

pub async fn show(store: &SessionStore, id: &str) -> Result<()> {
    let response = store
        .get_recipe_by_id(id)
        .await
        .with_context(|| format!("failed to fetch recipe {id}"))?;
    let RecipeResponse { recipe, .. } = response.json::<RecipeResponse>("/:id")?;
    print_recipe(&recipe);
    Ok(())
}

pub async fn save(store: &SessionStore, id: &str) -> Result<()> {
    require_session(store)?;

    let response = store
        .save_recipe_by_id(id)
        .await
        .with_context(|| format!("failed to save recipe {id}"))?;
    print_server_message(&response, "Recipe saved");
    match refresh_problem(store.fetch_saved_recipes().await) {
        None => println!("{} saved recipes", store.saved_recipes().len()),
        Some(reason) => eprintln!("warning: could not refresh the saved list: {reason}"),
    }
    Ok(())
}

/// Why a follow-up refresh did not update the local list, if it didn't.
fn refresh_problem(outcome: FetchOutcome) -> Option<&'static str> {
    match outcome {
        FetchOutcome::Applied => None,
        FetchOutcome::Malformed => Some("the server returned an unreadable list"),
        FetchOutcome::Failed => Some("the request failed"),
        FetchOutcome::Stale => Some("the session changed meanwhile"),
    }
}

fn print_recipes(recipes: &[Recipe], empty: &str) {
    if recipes.is_empty() {
        println!("{empty}");
        return;
    }
    for recipe in recipes {
        println!("{}  {}", recipe.id, recipe.title);
    }
}

fn print_recipe(recipe: &Recipe) {
    println!("{}", recipe.title);
    println!("id: {}", recipe.id);
    if !recipe.description.is_empty() {
        println!("{}", recipe.description);
    }
    let ingredients = recipe.ingredients().collect::<Vec<_>>();
    if !ingredients.is_empty() {
        println!("ingredients: {}", ingredients.join(", "));
    }
    if !recipe.quantity.is_empty() {
        println!("quantity: {}", recipe.quantity);
    }
    if !recipe.image_url.is_empty() {
        println!("image: {}", recipe.image_url);
    }
}

fn print_server_message(response: &ApiResponse, fallback: &str) {
    let message = response
        .body
        .get("message")
        .and_then(|value| value.as_str())
        .unwrap_or(fallback);
    println!("{message}");
}
