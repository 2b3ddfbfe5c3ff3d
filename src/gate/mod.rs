// Access gate - API keys, quota metering, credential storage

pub mod access;
pub mod credentials;

pub use access::{AccessGate, GateError};
pub use credentials::{ApiCredential, CredentialStore, CredentialStoreError, InMemoryCredentialStore};
