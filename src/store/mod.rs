pub mod artifacts;

pub use artifacts::{ArtifactStore, BOOKS_TABLE, RATINGS_TABLE, USERS_TABLE};
