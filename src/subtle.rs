// WebCrypto plumbing shared by the wasm code paths of aes_gcm and kdf

use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{window, SubtleCrypto};

pub(crate) fn subtle() -> Result<SubtleCrypto, JsValue> {
	let crypto = window()
		.ok_or_else(|| JsValue::from_str("no window"))?
		.crypto()?;

	Ok(crypto.subtle())
}

pub(crate) async fn resolve(promise: Promise) -> Result<JsValue, JsValue> {
	JsFuture::from(promise).await
}

pub(crate) fn algorithm(name: &str, params: &[(&str, JsValue)]) -> Result<Object, JsValue> {
	let algorithm = Object::new();

	Reflect::set(
		&algorithm,
		&JsValue::from_str("name"),
		&JsValue::from_str(name),
	)?;

	for (key, value) in params {
		Reflect::set(&algorithm, &JsValue::from_str(key), value)?;
	}

	Ok(algorithm)
}
