//! Session/data store.
//!
//! [`SessionStore`] owns the session token and everything derived from it:
//! the user profile, the recipe list and the saved-recipe list. The token is
//! mirrored into a [`TokenStorage`] on every change, and a new non-empty
//! token triggers a refetch of all three dependents.
//!
//! Every token change bumps a generation counter. Dependent fetches capture
//! the generation when they start and drop their result if it moved, so a
//! slow response for an old session never lands in a newer one.

use std::{fmt, sync::Arc};

use serde_json::Value;
use shared::models::{LoginRequest, NewRecipe, Recipe, RegisterRequest, UserProfile};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{
    api::{self, ApiResponse, RecipeApiClient},
    error::ClientResult,
    storage::TokenStorage,
};

/// Everything the store knows about the current session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Session credential; empty when signed out.
    pub token: String,
    /// Profile of the signed-in user, once fetched.
    pub user: Option<UserProfile>,
    /// Every recipe on the server.
    pub recipes: Vec<Recipe>,
    /// Recipes the signed-in user saved.
    pub saved_recipes: Vec<Recipe>,
    /// Whether the token has been accepted.
    pub is_authenticated: bool,
    generation: u64,
}

impl SessionState {
    /// Whether a non-empty token is held.
    #[must_use]
    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Counter bumped on every token change and on logout.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Effect of a token mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenChange {
    /// The new token equals the current one; nothing fired.
    Unchanged,
    /// The token became empty; dependents were cleared.
    Cleared,
    /// The token took a new non-empty value; dependents were refetched.
    Replaced,
}

/// What a dependent fetch did with its response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to state.
    Applied,
    /// The response had an unexpected shape; state was reset.
    Malformed,
    /// The request failed; state was degraded as the fetch dictates.
    Failed,
    /// The session changed while the request was in flight; nothing applied.
    Stale,
}

/// Outcomes of the three fetches fired by a token change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependentOutcomes {
    /// Result of `GET /`.
    pub recipes: FetchOutcome,
    /// Result of `GET /saved`.
    pub saved_recipes: FetchOutcome,
    /// Result of `GET /user`.
    pub profile: FetchOutcome,
}

struct Inner {
    api: RecipeApiClient,
    storage: Arc<dyn TokenStorage>,
    state: watch::Sender<SessionState>,
}

/// Session context object. Build one at the application root and hand out
/// clones; every clone shares the same state.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SessionStore")
            .field("api", &self.inner.api.base_url())
            .field("has_token", &state.has_token())
            .field("is_authenticated", &state.is_authenticated)
            .field("recipes", &state.recipes.len())
            .field("saved_recipes", &state.saved_recipes.len())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create an empty, signed-out store. Nothing is read until [`Self::restore`].
    pub fn new(api: RecipeApiClient, storage: Arc<dyn TokenStorage>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            inner: Arc::new(Inner {
                api,
                storage,
                state,
            }),
        }
    }

    /// Same as [`Self::new`], taking the storage by value.
    pub fn with_storage<S: TokenStorage + 'static>(api: RecipeApiClient, storage: S) -> Self {
        Self::new(api, Arc::new(storage))
    }

    /// The underlying API client.
    #[must_use]
    pub fn api(&self) -> &RecipeApiClient {
        &self.inner.api
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Current token; empty when signed out.
    #[must_use]
    pub fn token(&self) -> String {
        self.inner.state.borrow().token.clone()
    }

    /// Current user profile.
    #[must_use]
    pub fn user(&self) -> Option<UserProfile> {
        self.inner.state.borrow().user.clone()
    }

    /// Current recipe list.
    #[must_use]
    pub fn recipes(&self) -> Vec<Recipe> {
        self.inner.state.borrow().recipes.clone()
    }

    /// Current saved-recipe list.
    #[must_use]
    pub fn saved_recipes(&self) -> Vec<Recipe> {
        self.inner.state.borrow().saved_recipes.clone()
    }

    /// Current authentication flag.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated
    }

    /// Adopt the token found in durable storage, once, at startup.
    ///
    /// Returns `true` when a stored token was found. An unreadable storage is
    /// logged and treated as "no session".
    pub async fn restore(&self) -> bool {
        let stored = self.inner.storage.load().unwrap_or_else(|err| {
            error!(error = %err, "failed to read stored session token");
            None
        });
        let Some(token) = stored else {
            debug!("no stored session token");
            return false;
        };

        info!("restoring stored session");
        self.adopt_token(token).await;
        true
    }

    /// The single token mutator.
    ///
    /// Mirrors the token into durable storage, then either refetches the
    /// dependents (non-empty token) or clears them (empty token). Setting the
    /// current value again does nothing.
    pub async fn set_token(&self, token: impl Into<String>) -> TokenChange {
        let change = self.apply_token(token.into());
        if change == TokenChange::Replaced {
            self.refresh_dependents().await;
        }
        change
    }

    /// Fetch recipes, saved recipes and profile concurrently.
    pub async fn refresh_dependents(&self) -> DependentOutcomes {
        let (recipes, saved_recipes, profile) = futures::join!(
            self.fetch_recipes(),
            self.fetch_saved_recipes(),
            self.fetch_profile()
        );
        DependentOutcomes {
            recipes,
            saved_recipes,
            profile,
        }
    }

    /// Replace the recipe list with the server's. A failure keeps the
    /// current list.
    pub async fn fetch_recipes(&self) -> FetchOutcome {
        let (generation, _) = self.ticket();
        match self.inner.api.list_recipes().await {
            Ok(list) => {
                let count = list.recipe.len();
                if self.apply_if_current(generation, |state| state.recipes = list.recipe) {
                    debug!(count, "recipes refreshed");
                    FetchOutcome::Applied
                } else {
                    stale("recipes")
                }
            }
            Err(err) => {
                error!(error = %err, "error fetching recipes");
                FetchOutcome::Failed
            }
        }
    }

    /// Replace the saved list with the server's. A malformed payload or a
    /// failure empties it.
    pub async fn fetch_saved_recipes(&self) -> FetchOutcome {
        let (generation, token) = self.ticket();
        let (saved, outcome) = match self.inner.api.saved_recipes(&token).await {
            Ok(response) => match saved_list(&response.body) {
                Some(saved) => (saved, FetchOutcome::Applied),
                None => {
                    warn!(body = %response.body, "unexpected saved recipe format");
                    (Vec::new(), FetchOutcome::Malformed)
                }
            },
            Err(err) => {
                error!(error = %err, "error fetching saved recipes");
                (Vec::new(), FetchOutcome::Failed)
            }
        };

        let count = saved.len();
        if self.apply_if_current(generation, |state| state.saved_recipes = saved) {
            debug!(count, ?outcome, "saved recipes updated");
            outcome
        } else {
            stale("saved recipes")
        }
    }

    /// Load the profile for the current token. Any failure ends the session.
    pub async fn fetch_profile(&self) -> FetchOutcome {
        let (generation, token) = self.ticket();
        match self.inner.api.profile(&token).await {
            Ok(response) => {
                if self.apply_if_current(generation, |state| state.user = Some(response.user)) {
                    FetchOutcome::Applied
                } else {
                    stale("profile")
                }
            }
            Err(err) => {
                error!(error = %err, "error fetching user profile");
                let current = self.apply_if_current(generation, |state| {
                    state.user = None;
                    state.is_authenticated = false;
                });
                if !current {
                    return stale("profile");
                }
                // An already-empty token fires no change, but storage may
                // still hold a rejected credential.
                if self.apply_token(String::new()) == TokenChange::Unchanged
                    && let Err(err) = self.inner.storage.remove()
                {
                    error!(error = %err, "failed to remove stored session token");
                }
                FetchOutcome::Failed
            }
        }
    }

    /// Exchange credentials for a token and start a session with it.
    ///
    /// # Errors
    /// Returns the transport, status or malformed-body error untouched;
    /// state is not modified in that case.
    pub async fn login(&self, email: &str, password: &str) -> ClientResult<ApiResponse> {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.inner.api.login(&payload).await?;
        let token = api::token_from(&response, "/login")?;
        info!("login succeeded");
        self.adopt_token(token).await;
        Ok(response)
    }

    /// Create an account and start a session with the issued token.
    ///
    /// # Errors
    /// Same contract as [`Self::login`].
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ClientResult<ApiResponse> {
        let payload = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.inner.api.register(&payload).await?;
        let token = api::token_from(&response, "/register")?;
        info!("registration succeeded");
        self.adopt_token(token).await;
        Ok(response)
    }

    /// Submit a recipe. The local lists are left as they are; call
    /// [`Self::fetch_recipes`] to see it.
    ///
    /// # Errors
    /// Transport and status failures.
    pub async fn add_recipe(&self, recipe: &NewRecipe) -> ClientResult<ApiResponse> {
        self.inner.api.add_recipe(&self.token(), recipe).await
    }

    /// Fetch one recipe.
    ///
    /// # Errors
    /// Transport and status failures, logged before being returned.
    pub async fn get_recipe_by_id(&self, id: &str) -> ClientResult<ApiResponse> {
        self.inner
            .api
            .recipe_by_id(&self.token(), id)
            .await
            .inspect_err(|err| error!(error = %err, id, "error fetching recipe by id"))
    }

    /// Save a recipe for the current user. The saved list is left as it is;
    /// call [`Self::fetch_saved_recipes`] to see it.
    ///
    /// # Errors
    /// Transport and status failures, logged before being returned.
    pub async fn save_recipe_by_id(&self, id: &str) -> ClientResult<ApiResponse> {
        self.inner
            .api
            .save_recipe(&self.token(), id)
            .await
            .inspect_err(|err| error!(error = %err, id, "error saving recipe"))
    }

    /// End the session locally.
    ///
    /// Clears token, flag, user and saved list. The recipe list stays.
    pub fn logout(&self) {
        if let Err(err) = self.inner.storage.remove() {
            error!(error = %err, "failed to remove stored session token");
        }
        self.inner.state.send_modify(|state| {
            state.token.clear();
            state.is_authenticated = false;
            state.user = None;
            state.saved_recipes.clear();
            state.generation += 1;
        });
        info!("logged out");
    }

    /// Overwrite the recipe list.
    pub fn set_recipes(&self, recipes: Vec<Recipe>) {
        self.inner.state.send_modify(|state| state.recipes = recipes);
    }

    /// Overwrite the authentication flag.
    pub fn set_authenticated(&self, is_authenticated: bool) {
        self.inner
            .state
            .send_if_modified(|state| {
                let changed = state.is_authenticated != is_authenticated;
                state.is_authenticated = is_authenticated;
                changed
            });
    }

    async fn adopt_token(&self, token: String) {
        let change = self.apply_token(token);
        self.set_authenticated(true);
        if change == TokenChange::Replaced {
            self.refresh_dependents().await;
        }
    }

    fn apply_token(&self, token: String) -> TokenChange {
        let changed = self.inner.state.send_if_modified(|state| {
            if state.token == token {
                return false;
            }
            state.token.clone_from(&token);
            state.generation += 1;
            true
        });
        if !changed {
            return TokenChange::Unchanged;
        }
        self.on_token_changed(&token)
    }

    fn on_token_changed(&self, token: &str) -> TokenChange {
        let persisted = if token.is_empty() {
            self.inner.storage.remove()
        } else {
            self.inner.storage.store(token)
        };
        if let Err(err) = persisted {
            error!(error = %err, "failed to persist session token");
        }

        if !token.is_empty() {
            return TokenChange::Replaced;
        }

        self.inner.state.send_modify(|state| {
            state.user = None;
            state.recipes.clear();
            state.saved_recipes.clear();
            state.is_authenticated = false;
        });
        info!("session token cleared");
        TokenChange::Cleared
    }

    fn ticket(&self) -> (u64, String) {
        let state = self.inner.state.borrow();
        (state.generation, state.token.clone())
    }

    fn apply_if_current<F>(&self, generation: u64, apply: F) -> bool
    where
        F: FnOnce(&mut SessionState),
    {
        self.inner.state.send_if_modified(|state| {
            if state.generation != generation {
                return false;
            }
            apply(state);
            true
        })
    }
}

fn stale(what: &'static str) -> FetchOutcome {
    debug!(what, "discarding response for a superseded session");
    FetchOutcome::Stale
}

fn saved_list(body: &Value) -> Option<Vec<Recipe>> {
    let list = body.get("recipe").filter(|value| value.is_array())?;
    serde_json::from_value(list.clone()).ok()
}
