// Protection for secrets stored at rest
pub mod cipher;

pub use cipher::{CipherError, CredentialCipher};
