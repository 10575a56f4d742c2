//! Wire models exchanged with the `RecipeBox` REST API.
//!
//! Field names follow the JSON the API emits (`_id`, `ist`, `imgUrl`, ...);
//! the Rust side uses descriptive names and maps them with serde renames.

pub mod errors;
mod lenient;
pub mod recipe;
pub mod user;

pub use errors::ErrorResponse;
pub use recipe::{NewRecipe, Recipe, RecipeListResponse, RecipeResponse};
pub use user::{LoginRequest, RegisterRequest, TokenResponse, UserProfile, UserResponse};
