use crate::base64_blobs::serialize_array_base64;
use aes_gcm::{
	aead::{generic_array::GenericArray, Aead, NewAead},
	Aes256Gcm,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

const KEY_SIZE: usize = 32;
const IV_SIZE: usize = 12;

pub const TAG_SIZE: usize = 16;

// never serialized, never exported
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Key {
	pub(crate) bytes: [u8; Self::SIZE],
}

impl Key {
	pub const SIZE: usize = KEY_SIZE;

	pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
		&self.bytes
	}
}

impl fmt::Debug for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Key(..)")
	}
}

impl TryFrom<&[u8]> for Key {
	type Error = Error;

	fn try_from(val: &[u8]) -> Result<Self, Self::Error> {
		let bytes = val.try_into().map_err(|_| Error::WrongKeySize)?;

		Ok(Self { bytes })
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Iv {
	#[serde(serialize_with = "serialize_array_base64::<_, IV_SIZE>")]
	pub(crate) bytes: [u8; Self::SIZE],
}

impl Iv {
	pub const SIZE: usize = IV_SIZE;

	pub fn generate() -> Self {
		let mut iv = [0u8; Self::SIZE];
		OsRng.fill_bytes(&mut iv);
		Self { bytes: iv }
	}

	pub fn as_bytes(&self) -> &[u8; Self::SIZE] {
		&self.bytes
	}
}

impl From<[u8; IV_SIZE]> for Iv {
	fn from(bytes: [u8; IV_SIZE]) -> Self {
		Self { bytes }
	}
}

impl TryFrom<&[u8]> for Iv {
	type Error = Error;

	fn try_from(val: &[u8]) -> Result<Self, Self::Error> {
		let bytes = val.try_into().map_err(|_| Error::WrongIvSize)?;

		Ok(Self { bytes })
	}
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("wrong key material")]
	WrongKeyMaterial,
	#[error("key must be 32 bytes")]
	WrongKeySize,
	#[error("iv must be 12 bytes")]
	WrongIvSize,
	#[error("plaintext too long")]
	TooLong,
	#[error("webcrypto unavailable")]
	NoWebCrypto,
}

#[derive(Clone, Debug)]
pub struct Aes {
	pub key: Key,
	pub iv: Iv,
}

#[cfg(target_arch = "wasm32")]
mod wasm_impl {
	use super::{Aes, Error};
	use crate::subtle;
	use js_sys::Uint8Array;
	use wasm_bindgen::JsValue;
	use web_sys::CryptoKey;

	impl From<Error> for JsValue {
		fn from(value: Error) -> Self {
			use Error::*;

			JsValue::from_str(match value {
				WrongKeyMaterial => "WrongKeyMaterial",
				WrongKeySize => "WrongKeySize",
				WrongIvSize => "WrongIvSize",
				TooLong => "TooLong",
				NoWebCrypto => "NoWebCrypto",
			})
		}
	}

	impl Aes {
		async fn import_key(key: &[u8], usage: &str) -> Result<CryptoKey, Error> {
			let key = Uint8Array::from(key);
			let promise = subtle::subtle()
				.map_err(|_| Error::NoWebCrypto)?
				.import_key_with_str(
					"raw",
					&key,
					"AES-GCM",
					false,
					&js_sys::Array::of1(&JsValue::from_str(usage)),
				)
				.map_err(|_| Error::WrongKeySize)?;
			let js_value = subtle::resolve(promise)
				.await
				.map_err(|_| Error::WrongKeySize)?;

			Ok(CryptoKey::from(js_value))
		}

		fn params(&self) -> Result<js_sys::Object, Error> {
			subtle::algorithm(
				"AES-GCM",
				&[(
					"iv",
					Uint8Array::from(&self.iv.as_bytes()[..]).into(),
				)],
			)
			.map_err(|_| Error::NoWebCrypto)
		}

		pub async fn decrypt_async(&self, ct: &[u8]) -> Result<Vec<u8>, Error> {
			let key = Self::import_key(self.key.as_bytes(), "decrypt").await?;
			let promise = subtle::subtle()
				.map_err(|_| Error::NoWebCrypto)?
				.decrypt_with_object_and_u8_array(&self.params()?, &key, ct)
				.map_err(|_| Error::WrongKeyMaterial)?;
			let pt = subtle::resolve(promise)
				.await
				.map_err(|_| Error::WrongKeyMaterial)?;

			Ok(Uint8Array::new(&pt).to_vec())
		}
	}
}

impl Aes {
	pub fn new_with_key_iv(key: Key, iv: Iv) -> Self {
		Self { key, iv }
	}

	#[cfg(not(target_arch = "wasm32"))]
	pub async fn decrypt_async(&self, ct: &[u8]) -> Result<Vec<u8>, Error> {
		self.decrypt(ct)
	}

	// output is ct || tag
	pub fn encrypt(&self, pt: &[u8]) -> Result<Vec<u8>, Error> {
		let cipher = Aes256Gcm::new(GenericArray::from_slice(&self.key.bytes));
		let nonce = GenericArray::from_slice(&self.iv.bytes);

		cipher.encrypt(nonce, pt).map_err(|_| Error::TooLong)
	}

	// expects ct || tag
	pub fn decrypt(&self, ct: &[u8]) -> Result<Vec<u8>, Error> {
		let cipher = Aes256Gcm::new(GenericArray::from_slice(&self.key.bytes));
		let nonce = GenericArray::from_slice(&self.iv.bytes);

		cipher
			.decrypt(nonce, ct)
			.map_err(|_| Error::WrongKeyMaterial)
	}
}

#[cfg(test)]
mod tests {
	use rand::{rngs::OsRng, RngCore};

	use super::{Aes, Error, Iv, Key, TAG_SIZE};

	fn random_key() -> Key {
		let mut bytes = [0u8; Key::SIZE];
		OsRng.fill_bytes(&mut bytes);

		Key { bytes }
	}

	fn random_aes() -> Aes {
		Aes::new_with_key_iv(random_key(), Iv::generate())
	}

	#[test]
	fn test_encrypt_decrypt() {
		let aes = random_aes();
		let ref_pt = b"abcdefghijklmnopqrstuvwxyz";

		let ct = aes.encrypt(ref_pt).unwrap();
		let pt = aes.decrypt(&ct).unwrap();

		assert_eq!(pt, ref_pt.to_vec());
		assert_eq!(ct.len(), ref_pt.len() + TAG_SIZE);
	}

	#[test]
	fn test_encrypt_empty() {
		let aes = random_aes();
		let ct = aes.encrypt(b"").unwrap();
		let pt = aes.decrypt(&ct).unwrap();

		assert_eq!(pt, b"");
		assert_eq!(ct.len(), TAG_SIZE);
	}

	#[test]
	fn test_decrypt_fails_with_wrong_key_iv() {
		let ref_aes = random_aes();
		let ref_pt = b"abcdefghijklmnopqrstuvwxyz";

		let ct = ref_aes.encrypt(ref_pt).unwrap();

		let mut wrong_key_aes = ref_aes.clone();
		wrong_key_aes.key = random_key();

		assert_eq!(wrong_key_aes.decrypt(&ct), Err(Error::WrongKeyMaterial));

		let mut wrong_iv_aes = ref_aes.clone();
		wrong_iv_aes.iv = Iv::generate();

		assert_eq!(wrong_iv_aes.decrypt(&ct), Err(Error::WrongKeyMaterial));
	}

	#[test]
	fn test_decrypt_truncated() {
		let aes = random_aes();
		let ct = aes.encrypt(b"classified").unwrap();

		assert_eq!(
			aes.decrypt(&ct[..ct.len() - 1]),
			Err(Error::WrongKeyMaterial)
		);
		assert_eq!(aes.decrypt(&ct[..TAG_SIZE - 1]), Err(Error::WrongKeyMaterial));
		assert_eq!(aes.decrypt(&[]), Err(Error::WrongKeyMaterial));
	}

	#[test]
	fn test_try_from() {
		assert!(Iv::try_from([7u8; Iv::SIZE].as_slice()).is_ok());
		assert_eq!(
			Iv::try_from(vec![1, 2, 3].as_slice()),
			Err(Error::WrongIvSize)
		);
		assert!(Key::try_from([7u8; Key::SIZE].as_slice()).is_ok());
		assert_eq!(
			Key::try_from([7u8; 16].as_slice()).unwrap_err(),
			Error::WrongKeySize
		);
	}

	#[test]
	fn test_key_debug_hides_bytes() {
		let key = Key {
			bytes: [0xab; Key::SIZE],
		};

		assert_eq!(format!("{:?}", key), "Key(..)");
	}

	#[tokio::test]
	async fn test_async_matches_sync() {
		let aes = random_aes();
		let ct = aes.encrypt(b"omega").unwrap();

		assert_eq!(aes.decrypt_async(&ct).await.unwrap(), b"omega");
		assert_eq!(
			aes.decrypt_async(&ct[1..]).await,
			Err(Error::WrongKeyMaterial)
		);
	}
}
