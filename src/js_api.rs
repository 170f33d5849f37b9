use async_trait::async_trait;
use js_sys::Promise;
use wasm_bindgen::{prelude::wasm_bindgen, JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::reveal::{FetchError, Outcome, PasswordPrompt, PayloadStore};

// callbacks supplied by the page:
// fetch(path) -> Promise<string>, rejected on network errors or non-2xx
// prompt(message) -> string | null | Promise<string | null>
#[wasm_bindgen]
pub struct JsStore {
	pub(crate) fetch: js_sys::Function,
	pub(crate) prompt: js_sys::Function,
}

#[wasm_bindgen]
impl JsStore {
	#[wasm_bindgen(constructor)]
	pub fn new(fetch: js_sys::Function, prompt: js_sys::Function) -> Self {
		Self { fetch, prompt }
	}
}

#[async_trait(?Send)]
impl PayloadStore for JsStore {
	async fn fetch(&self, path: &str) -> Result<String, FetchError> {
		let this = JsValue::NULL;
		let path = JsValue::from_str(path);
		let promise = self
			.fetch
			.call1(&this, &path)
			.map_err(|_| FetchError::JsViolated)?
			.dyn_into::<Promise>()
			.map_err(|_| FetchError::JsViolated)?;
		let result = JsFuture::from(promise)
			.await
			.map_err(|e| FetchError::NoNetwork(format!("{:?}", e)))?;

		result.as_string().ok_or(FetchError::JsViolated)
	}
}

#[async_trait(?Send)]
impl PasswordPrompt for JsStore {
	async fn ask(&self, message: &str) -> Option<String> {
		let this = JsValue::NULL;
		let answer = self
			.prompt
			.call1(&this, &JsValue::from_str(message))
			.ok()?;

		match answer.dyn_into::<Promise>() {
			Ok(promise) => JsFuture::from(promise).await.ok()?.as_string(),
			Err(answer) => answer.as_string(),
		}
	}
}

#[wasm_bindgen]
#[derive(Clone)]
pub struct RevealView {
	kind: String,
	text: Option<String>,
}

#[wasm_bindgen]
impl RevealView {
	// "granted" | "denied" | "unavailable" | "cancelled"
	pub fn kind(&self) -> String {
		self.kind.clone()
	}

	pub fn text(&self) -> Option<String> {
		self.text.clone()
	}

	pub fn is_granted(&self) -> bool {
		self.text.is_some()
	}
}

impl From<Outcome> for RevealView {
	fn from(outcome: Outcome) -> Self {
		let (kind, text) = match outcome {
			Outcome::Granted(pt) => ("granted", Some(pt)),
			Outcome::Denied => ("denied", None),
			Outcome::Unavailable => ("unavailable", None),
			Outcome::Cancelled => ("cancelled", None),
		};

		Self {
			kind: kind.to_string(),
			text,
		}
	}
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_logging() {
	// a second call keeps the first subscriber
	let _ = tracing_wasm::try_set_as_global_default();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn decrypt_payload(json: String, pass: String) -> Result<String, JsValue> {
	use crate::{decryptor, payload::EncryptedPayload};

	let payload = EncryptedPayload::from_json(&json).map_err(|_| decryptor::Failure)?;

	Ok(decryptor::decrypt_async(&payload, &pass).await?)
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub async fn reveal_panel(
	store: JsStore,
	path: String,
	message: String,
	prompt_first: bool,
) -> RevealView {
	use crate::reveal::{self, Order, Request};

	let req = Request {
		path: &path,
		message: &message,
		order: if prompt_first {
			Order::PromptFirst
		} else {
			Order::FetchFirst
		},
	};

	reveal::reveal(&store, &store, &req).await.into()
}

#[cfg(test)]
mod tests {
	use super::RevealView;
	use crate::reveal::Outcome;

	#[test]
	fn test_reveal_view() {
		let granted = RevealView::from(Outcome::Granted("LEVEL 7".to_string()));

		assert_eq!(granted.kind(), "granted");
		assert_eq!(granted.text(), Some("LEVEL 7".to_string()));
		assert!(granted.is_granted());

		for (outcome, kind) in [
			(Outcome::Denied, "denied"),
			(Outcome::Unavailable, "unavailable"),
			(Outcome::Cancelled, "cancelled"),
		] {
			let view = RevealView::from(outcome);

			assert_eq!(view.kind(), kind);
			assert_eq!(view.text(), None);
			assert!(!view.is_granted());
		}
	}
}
