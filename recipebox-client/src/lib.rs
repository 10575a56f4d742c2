#![cfg_attr(not(test), forbid(unsafe_code))]

//! # `RecipeBox` client
//!
//! Typed access to the recipe REST API plus the [`SessionStore`], which keeps
//! the session token, the signed-in user and the recipe lists in sync with
//! the server and with durable token storage.
//!
//! ```no_run
//! use client::{MemoryTokenStorage, RecipeApiClient, SessionStore};
//!
//! # async fn demo() -> Result<(), client::ClientError> {
//! let api = RecipeApiClient::new("http://localhost:3000/api")?;
//! let store = SessionStore::with_storage(api, MemoryTokenStorage::new());
//! store.restore().await;
//! store.login("a@b.com", "pw").await?;
//! println!("{} recipes", store.recipes().len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod session;
pub mod storage;

pub use api::{ApiResponse, RecipeApiClient};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use session::{DependentOutcomes, FetchOutcome, SessionState, SessionStore, TokenChange};
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileTokenStorage;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalTokenStorage;
pub use storage::{MemoryTokenStorage, StorageError, TokenStorage};
