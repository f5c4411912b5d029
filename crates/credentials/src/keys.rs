//! Storage keys for the three halves of a session
//!
//! All keys share one namespace prefix so a shared backing store (a browser-like
//! key/value area, a file used by other tools) can hold them without collisions.

/// Short-lived bearer token attached to every request.
pub const ACCESS_TOKEN_KEY: &str = "@api-client#ACCESS_TOKEN";

/// Long-lived token exchanged for a new access/refresh pair.
pub const REFRESH_TOKEN_KEY: &str = "@api-client#REFRESH_TOKEN";

/// JSON-serialized account snapshot captured alongside the tokens.
pub const ACCOUNT_KEY: &str = "@api-client#ACCOUNT";
