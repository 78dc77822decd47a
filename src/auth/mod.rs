//! Authentication and authorization core: credential hashing, token
//! issuance, refresh session rotation and the role engine.

pub mod password;
pub mod roles;
pub mod session;
pub mod tokens;
