use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::aes_gcm::Key;

pub const ITERATIONS: u32 = 100_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hash {
	Sha256,
}

impl Hash {
	// WebCrypto algorithm identifier
	pub fn name(&self) -> &'static str {
		match self {
			Hash::Sha256 => "SHA-256",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Params {
	pub iterations: u32,
	pub hash: Hash,
}

pub const DEFAULT_PARAMS: Params = Params {
	iterations: ITERATIONS,
	hash: Hash::Sha256,
};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("webcrypto unavailable")]
	NoWebCrypto,
	#[error("key derivation rejected by webcrypto")]
	Rejected,
}

// a wrong password or salt only shows up later as a failed tag check
pub fn derive_key(pass: &str, salt: &[u8], iterations: u32, hash: Hash) -> Key {
	let mut bytes = [0u8; Key::SIZE];

	match hash {
		Hash::Sha256 => pbkdf2_hmac::<Sha256>(pass.as_bytes(), salt, iterations, &mut bytes),
	}

	let key = Key { bytes };
	bytes.zeroize();

	key
}

pub fn derive_key_with(pass: &str, salt: &[u8], params: &Params) -> Key {
	derive_key(pass, salt, params.iterations, params.hash)
}

// natively the stretch runs inline and holds the executor thread for its
// whole duration; callers on a runtime should move it to a blocking pool
#[cfg(not(target_arch = "wasm32"))]
pub async fn derive_key_async(pass: &str, salt: &[u8], params: &Params) -> Result<Key, Error> {
	Ok(derive_key_with(pass, salt, params))
}

#[cfg(target_arch = "wasm32")]
pub async fn derive_key_async(pass: &str, salt: &[u8], params: &Params) -> Result<Key, Error> {
	wasm_impl::derive_bits(pass, salt, params).await
}

#[cfg(target_arch = "wasm32")]
mod wasm_impl {
	use super::{Error, Params};
	use crate::{aes_gcm::Key, subtle};
	use js_sys::Uint8Array;
	use wasm_bindgen::JsValue;
	use web_sys::CryptoKey;
	use zeroize::Zeroizing;

	impl From<Error> for JsValue {
		fn from(value: Error) -> Self {
			JsValue::from_str(match value {
				Error::NoWebCrypto => "NoWebCrypto",
				Error::Rejected => "KdfRejected",
			})
		}
	}

	pub(super) async fn derive_bits(pass: &str, salt: &[u8], params: &Params) -> Result<Key, Error> {
		let subtle = subtle::subtle().map_err(|_| Error::NoWebCrypto)?;
		let material = Uint8Array::from(pass.as_bytes());
		let promise = subtle
			.import_key_with_str(
				"raw",
				&material,
				"PBKDF2",
				false,
				&js_sys::Array::of1(&JsValue::from_str("deriveBits")),
			)
			.map_err(|_| Error::Rejected)?;
		let base = CryptoKey::from(subtle::resolve(promise).await.map_err(|_| Error::Rejected)?);
		let algorithm = subtle::algorithm(
			"PBKDF2",
			&[
				("salt", Uint8Array::from(salt).into()),
				("iterations", JsValue::from(params.iterations)),
				("hash", JsValue::from_str(params.hash.name())),
			],
		)
		.map_err(|_| Error::Rejected)?;
		let promise = subtle
			.derive_bits_with_object(&algorithm, &base, (Key::SIZE * 8) as u32)
			.map_err(|_| Error::Rejected)?;
		let bits = subtle::resolve(promise).await.map_err(|_| Error::Rejected)?;
		let bytes = Zeroizing::new(Uint8Array::new(&bits).to_vec());

		Key::try_from(bytes.as_slice()).map_err(|_| Error::Rejected)
	}
}

#[cfg(test)]
mod tests {
	use super::{derive_key, derive_key_async, derive_key_with, Hash, Params, DEFAULT_PARAMS};

	const TEST_PARAMS: Params = Params {
		iterations: 1,
		..DEFAULT_PARAMS
	};

	#[test]
	fn test_pbkdf2_sha256_vectors() {
		// first block of the RFC 7914 section 11 vector
		let key = derive_key("passwd", b"salt", 1, Hash::Sha256);

		assert_eq!(
			hex::encode(key.as_bytes()),
			"55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
		);

		let key = derive_key("password", b"salt", 1, Hash::Sha256);

		assert_eq!(
			hex::encode(key.as_bytes()),
			"120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
		);

		let key = derive_key("password", b"salt", 4096, Hash::Sha256);

		assert_eq!(
			hex::encode(key.as_bytes()),
			"c5e478d59288c841aa530db6845c4c8d962893a001ce4e11a4963873aa98134a"
		);
	}

	#[test]
	fn test_default_params_are_format_constants() {
		assert_eq!(DEFAULT_PARAMS.iterations, 100_000);
		assert_eq!(DEFAULT_PARAMS.hash, Hash::Sha256);
		assert_eq!(DEFAULT_PARAMS.hash.name(), "SHA-256");
	}

	#[test]
	fn test_deterministic() {
		let a = derive_key_with("omega-key", &[0u8; 16], &TEST_PARAMS);
		let b = derive_key_with("omega-key", &[0u8; 16], &TEST_PARAMS);

		assert_eq!(a.as_bytes(), b.as_bytes());
	}

	#[test]
	fn test_every_input_matters() {
		let base = derive_key("omega-key", &[0u8; 16], 2, Hash::Sha256);

		assert_ne!(
			base.as_bytes(),
			derive_key("omega-kez", &[0u8; 16], 2, Hash::Sha256).as_bytes()
		);
		assert_ne!(
			base.as_bytes(),
			derive_key("omega-key", &[1u8; 16], 2, Hash::Sha256).as_bytes()
		);
		assert_ne!(
			base.as_bytes(),
			derive_key("omega-key", &[0u8; 16], 3, Hash::Sha256).as_bytes()
		);
	}

	#[test]
	fn test_empty_inputs_still_derive() {
		let key = derive_key("", &[], 1, Hash::Sha256);

		assert_ne!(key.as_bytes(), &[0u8; 32]);
	}

	#[tokio::test]
	async fn test_async_matches_sync() {
		let sync = derive_key_with("omega-key", b"salt", &TEST_PARAMS);
		let async_key = derive_key_async("omega-key", b"salt", &TEST_PARAMS)
			.await
			.unwrap();

		assert_eq!(sync.as_bytes(), async_key.as_bytes());
	}
}
