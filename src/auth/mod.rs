//! Credential Module
//!
//! Username/password signup and signin backed by a remote document store.
//!
//! ## Flow
//! 1. **Signup**: The password is salted and hashed on the blocking pool, then
//!    `{username, email, password}` is written to the store under `email`.
//! 2. **Signin**: The document under `email` is read back and the supplied
//!    password is checked against the stored hash.
//!
//! Nothing is cached locally and no token is issued; each request stands alone.

pub mod handlers;
pub mod password;
pub mod service;
pub mod store;
pub mod types;
