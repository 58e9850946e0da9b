//! Single-use verification codes and time-bounded password reset tokens.

use rand::{rngs::OsRng, RngCore};
use time::{Duration, OffsetDateTime};

const TOKEN_BYTES: usize = 20;

fn random_hex() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}

pub fn verification_code() -> String {
    random_hex()
}

#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token: String,
    pub expires_at: OffsetDateTime,
}

pub fn reset_token(now: OffsetDateTime, ttl: Duration) -> ResetToken {
    ResetToken {
        token: random_hex(),
        expires_at: now + ttl,
    }
}
