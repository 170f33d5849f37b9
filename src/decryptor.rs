use tracing::trace;

use crate::{
	aes_gcm::Aes,
	kdf::{self, Params, DEFAULT_PARAMS},
	payload::{Ciphertext, EncryptedPayload},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("decryption failed")]
pub struct Failure;

pub fn decrypt(payload: &EncryptedPayload, pass: &str) -> Result<String, Failure> {
	decrypt_with(payload, pass, &DEFAULT_PARAMS)
}

pub fn decrypt_with(
	payload: &EncryptedPayload,
	pass: &str,
	params: &Params,
) -> Result<String, Failure> {
	let key = kdf::derive_key_with(pass, payload.salt.as_bytes(), params);
	let aes = Aes::new_with_key_iv(key, payload.iv);
	let pt = match aes.decrypt(&payload.body.assemble()) {
		Ok(pt) => pt,
		Err(_) => {
			let ct = fallback(&payload.body)?;

			aes.decrypt(ct).map_err(|_| Failure)?
		}
	};

	String::from_utf8(pt).map_err(|_| Failure)
}

pub async fn decrypt_async(payload: &EncryptedPayload, pass: &str) -> Result<String, Failure> {
	decrypt_with_async(payload, pass, &DEFAULT_PARAMS).await
}

// suspends only on wasm, where WebCrypto does the work; native callers on a
// runtime want `spawn_blocking` around `decrypt` instead
pub async fn decrypt_with_async(
	payload: &EncryptedPayload,
	pass: &str,
	params: &Params,
) -> Result<String, Failure> {
	let key = kdf::derive_key_async(pass, payload.salt.as_bytes(), params)
		.await
		.map_err(|_| Failure)?;
	let aes = Aes::new_with_key_iv(key, payload.iv);
	let assembled = payload.body.assemble();
	let pt = match aes.decrypt_async(&assembled).await {
		Ok(pt) => pt,
		Err(_) => {
			let ct = fallback(&payload.body)?;

			aes.decrypt_async(ct).await.map_err(|_| Failure)?
		}
	};

	String::from_utf8(pt).map_err(|_| Failure)
}

// a malformed record is just another failure
pub fn decrypt_json(json: &str, pass: &str) -> Result<String, Failure> {
	let payload = EncryptedPayload::from_json(json).map_err(|_| Failure)?;

	decrypt(&payload, pass)
}

// one retry with the other layout, never more
fn fallback(body: &Ciphertext) -> Result<&[u8], Failure> {
	let ct = body.fallback().ok_or(Failure)?;
	trace!("declared layout rejected, retrying without the detached tag");

	Ok(ct)
}

#[cfg(target_arch = "wasm32")]
impl From<Failure> for wasm_bindgen::JsValue {
	fn from(_: Failure) -> Self {
		wasm_bindgen::JsValue::from_str("DecryptionFailed")
	}
}
