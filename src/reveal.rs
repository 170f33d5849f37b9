// fetch, prompt and decrypt for one classified panel

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
	decryptor::{self, Failure},
	kdf::{Params, DEFAULT_PARAMS},
	payload::{EncryptedPayload, WirePayload},
};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum FetchError {
	#[error("no network: {0}")]
	NoNetwork(String),
	#[error("host violated the store contract")]
	JsViolated,
}

#[async_trait(?Send)]
pub trait PayloadStore {
	async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

#[async_trait(?Send)]
pub trait PasswordPrompt {
	// None when the user dismissed the prompt
	async fn ask(&self, message: &str) -> Option<String>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Order {
	FetchFirst,
	PromptFirst,
}

#[derive(Clone, Copy, Debug)]
pub struct Request<'a> {
	pub path: &'a str,
	pub message: &'a str,
	pub order: Order,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
	Granted(String),
	Denied,
	Unavailable,
	Cancelled,
}

pub async fn reveal<S, P>(store: &S, prompt: &P, req: &Request<'_>) -> Outcome
where
	S: PayloadStore + ?Sized,
	P: PasswordPrompt + ?Sized,
{
	reveal_with(store, prompt, req, &DEFAULT_PARAMS).await
}

pub(crate) async fn reveal_with<S, P>(
	store: &S,
	prompt: &P,
	req: &Request<'_>,
	params: &Params,
) -> Outcome
where
	S: PayloadStore + ?Sized,
	P: PasswordPrompt + ?Sized,
{
	let outcome = match req.order {
		Order::FetchFirst => {
			let wire = match fetch(store, req.path).await {
				Ok(wire) => wire,
				Err(outcome) => return outcome,
			};
			let Some(pass) = ask(prompt, req.message).await else {
				return Outcome::Cancelled;
			};

			open(wire, &pass, params).await
		}
		Order::PromptFirst => {
			let Some(pass) = ask(prompt, req.message).await else {
				return Outcome::Cancelled;
			};
			let wire = match fetch(store, req.path).await {
				Ok(wire) => wire,
				Err(outcome) => return outcome,
			};

			open(wire, &pass, params).await
		}
	};

	debug!(
		path = req.path,
		granted = matches!(outcome, Outcome::Granted(_)),
		"panel attempt finished"
	);

	outcome
}

async fn fetch<S>(store: &S, path: &str) -> Result<WirePayload, Outcome>
where
	S: PayloadStore + ?Sized,
{
	let json = store.fetch(path).await.map_err(|e| {
		warn!(path, error = %e, "payload fetch failed");
		Outcome::Unavailable
	})?;

	// not even json: the store handed back something else (an error page, say)
	WirePayload::from_json(&json).map_err(|_| {
		warn!(path, "payload is not json");
		Outcome::Unavailable
	})
}

// empty input counts as a dismissed prompt
async fn ask<P>(prompt: &P, message: &str) -> Option<String>
where
	P: PasswordPrompt + ?Sized,
{
	let pass = prompt.ask(message).await.filter(|p| !p.is_empty());

	if pass.is_none() {
		debug!("prompt cancelled");
	}

	pass
}

async fn open(wire: WirePayload, pass: &str, params: &Params) -> Outcome {
	let result = match EncryptedPayload::try_from(wire) {
		Ok(payload) => decryptor::decrypt_with_async(&payload, pass, params).await,
		Err(_) => Err(Failure),
	};

	match result {
		Ok(pt) => Outcome::Granted(pt),
		Err(Failure) => Outcome::Denied,
	}
}
