//! Persisted client state: the session identifier and the theme preference,
//! kept in a generic string key-value store.

mod error;
mod identity;
mod kv;
mod paths;
mod preferences;
mod store;

pub use error::SessionStoreError;
pub use identity::{
    fallback_token, generate_session_id, generate_session_id_from, FALLBACK_TOKEN_LEN,
};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use paths::{state_file_path, STATE_DIR, STATE_FILE_NAME};
pub use preferences::{Theme, THEME_KEY};
pub use store::{SessionStore, SESSION_ID_KEY};
