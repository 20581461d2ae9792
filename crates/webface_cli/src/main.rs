use std::io;
use std::sync::mpsc;
use std::sync::Arc;

use session_store::{FileStore, KeyValueStore, MemoryStore, SessionStore};
use tracing::warn;
use webface::logging::init_logging;
use webface::{ChatSession, EnvConfig, RandomSource, SeededRandom, SystemClock};
use webface_api::{WebfaceApiClient, WebfaceApiConfig};
use webface_cli::host::ApiHost;
use webface_cli::render::{self, stdout_writer, write_line};
use webface_cli::runtime::{spawn_stdin_reader, EventLoop};

fn main() -> io::Result<()> {
    let config = EnvConfig::from_env();
    if let Err(error) = init_logging(&config) {
        eprintln!("webface: {error}");
    }

    let cwd = std::env::current_dir()?;
    let state_path = config.resolved_state_path(&cwd);
    let kv: Box<dyn KeyValueStore> = match FileStore::open(&state_path) {
        Ok(store) => Box::new(store),
        Err(error) => {
            warn!(%error, "state file unusable; session will not persist");
            Box::new(MemoryStore::new())
        }
    };
    let store = SessionStore::ensure(kv);

    let random: Box<dyn RandomSource> = match config.seed {
        Some(seed) => Box::new(SeededRandom::from_seed(seed)),
        None => Box::new(SeededRandom::from_entropy()),
    };

    let client = WebfaceApiClient::new(WebfaceApiConfig::new(&config.base_url))
        .map_err(io::Error::other)?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("webface-http")
        .enable_all()
        .build()?;

    let out = stdout_writer();
    let mut session = ChatSession::new(config.mode, store, Arc::new(SystemClock), random);
    render::attach(&mut session, out.clone());
    write_line(
        &out,
        &format!(
            "webface ({} mode) at {}; /help for commands",
            config.mode.as_str(),
            client.base_url()
        ),
    );

    let (events_tx, events_rx) = mpsc::channel();
    spawn_stdin_reader(events_tx.clone())?;
    let host = ApiHost::new(runtime.handle().clone(), client, events_tx, out.clone());

    let mut event_loop = EventLoop::new(session, host, events_rx, out);
    event_loop.run();

    runtime.shutdown_background();
    Ok(())
}
