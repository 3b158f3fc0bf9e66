pub mod codec;
pub mod ffi;
pub mod model;
pub mod repository;
pub mod search;

pub use codec::{decode, encode, CodecError};
pub use model::*;
pub use repository::{ListenerId, RecipeRepository, RepositoryError, RepositoryEvent};
pub use search::search;

uniffi::setup_scaffolding!();
