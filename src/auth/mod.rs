pub mod digest;
pub mod gate;
pub mod middleware;

use serde::{Deserialize, Serialize};

pub use digest::{digest, new_token, EntropyError};
pub use gate::{CredentialGate, GateError};
pub use middleware::{TokenAuth, TOKEN_HEADER};

/// Shown alongside a newly issued token.
pub const TOKEN_ISSUED_MESSAGE: &str =
    "Token generated successfully. Save this token securely, it won't be shown again.";

/// Payload for a token issuance request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TokenRequest {
    /// The master password. Missing and empty are both rejected.
    pub password: String,
}

/// Response after a token has been issued. This is the only time the
/// plaintext token leaves the server.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub message: String,
}
