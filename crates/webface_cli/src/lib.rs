//! Terminal front end for the webface chat client.
//!
//! Configuration comes from the environment (see [`webface::EnvConfig`]):
//!
//! - `WEBFACE_BASE_URL` backend origin, default `http://127.0.0.1:8000`
//! - `WEBFACE_MODE` `chat` (default) or `forum`
//! - `WEBFACE_STATE_PATH` session/theme file, default `.webface/state.json`
//! - `WEBFACE_SEED` fixed seed for glitch rolls and forum delays
//! - `WEBFACE_LOG`, `WEBFACE_LOG_FILE`, `WEBFACE_DEBUG` logging
//!
//! Each stdin line is one submission; lines starting with `/` are commands.
//! `/close` stands in for the embedded page's close message.

pub mod commands;
pub mod host;
pub mod render;
pub mod runtime;
