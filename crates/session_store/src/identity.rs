use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};
use tracing::warn;
use uuid::Builder;

/// Length of the low-entropy token produced when no secure source exists.
pub const FALLBACK_TOKEN_LEN: usize = 11;

const FALLBACK_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generates a fresh session identifier from the operating system's secure
/// entropy source, degrading to [`fallback_token`] when that source fails.
#[must_use]
pub fn generate_session_id() -> String {
    generate_session_id_from(&mut OsRng)
}

/// Same as [`generate_session_id`] with an explicit entropy source.
#[must_use]
pub fn generate_session_id_from(entropy: &mut dyn RngCore) -> String {
    let mut bytes = [0u8; 16];
    match entropy.try_fill_bytes(&mut bytes) {
        Ok(()) => Builder::from_random_bytes(bytes).into_uuid().to_string(),
        Err(error) => {
            warn!(%error, "secure entropy unavailable, using fallback session token");
            fallback_token()
        }
    }
}

/// Base36 token seeded from the wall clock, process id and a call counter.
#[must_use]
pub fn fallback_token() -> String {
    static CALLS: AtomicU64 = AtomicU64::new(0);

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default();
    let seed = nanos
        ^ (u64::from(std::process::id()) << 32)
        ^ CALLS.fetch_add(1, Ordering::Relaxed).rotate_left(17);
    let mut rng = StdRng::seed_from_u64(seed);

    (0..FALLBACK_TOKEN_LEN)
        .map(|_| char::from(FALLBACK_ALPHABET[rng.gen_range(0..FALLBACK_ALPHABET.len())]))
        .collect()
}
