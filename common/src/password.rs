use crate::error;

pub const HASH_COST: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Valid,
    /// Matched a password that was stored before hashing was introduced.
    /// The caller should replace it with a hash.
    ValidLegacy,
    Invalid,
}

pub fn hash(password: &str) -> error::Result<String> {
    Ok(bcrypt::hash(password, HASH_COST)?)
}

pub fn is_hashed(stored: &str) -> bool {
    ["$2a$", "$2b$", "$2x$", "$2y$"]
        .iter()
        .any(|prefix| stored.starts_with(prefix))
}

pub fn verify(password: &str, stored: &str) -> Verification {
    if is_hashed(stored) {
        return match bcrypt::verify(password, stored) {
            Ok(true) => Verification::Valid,
            Ok(false) => Verification::Invalid,
            Err(err) => {
                log::warn!("Stored password hash is unreadable: {}", err);
                Verification::Invalid
            }
        };
    }

    if !stored.is_empty() && stored == password {
        Verification::ValidLegacy
    } else {
        Verification::Invalid
    }
}
