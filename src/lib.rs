pub mod aes_gcm;
pub mod base64_blobs;
pub mod decryptor;
pub mod js_api;
pub mod kdf;
pub mod payload;
pub mod reveal;
pub mod salt;
pub mod seal;
#[cfg(target_arch = "wasm32")]
mod subtle;

pub use decryptor::{decrypt, decrypt_async, decrypt_json, Failure};
pub use kdf::derive_key;
pub use payload::{Ciphertext, EncryptedPayload};
pub use reveal::{reveal, Outcome};
pub use seal::{seal, Layout};
