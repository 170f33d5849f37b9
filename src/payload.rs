// split:    { "salt": <b64>, "iv": <b64>, "ct": <b64>, "tag": <b64> }
// combined: { "salt": <b64>, "iv": <b64>, "data": <b64> }
//
// stage one (WirePayload) only requires json; stage two types the fields.
// stage one errors mean the payload is unavailable, stage two errors are a
// failed decryption.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
	aes_gcm::Iv,
	base64_blobs::{self, serialize_base64},
	salt::Salt,
};

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("bad json: {0}")]
	BadJson(String),
	#[error("payload is not a json object")]
	NotAnObject,
	#[error("field `{0}` is not a string")]
	WrongType(&'static str),
	#[error("missing field `{0}`")]
	MissingField(&'static str),
	#[error("field `{0}` is not valid base64")]
	BadBase64(&'static str),
	#[error("iv must be {} bytes", Iv::SIZE)]
	WrongIvSize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Ciphertext {
	// tag stored apart from the ciphertext
	Split {
		#[serde(serialize_with = "serialize_base64")]
		ct: Vec<u8>,
		#[serde(serialize_with = "serialize_base64")]
		tag: Vec<u8>,
	},
	// tag already appended
	Combined {
		#[serde(serialize_with = "serialize_base64")]
		data: Vec<u8>,
	},
}

impl Ciphertext {
	// ct || tag, the layout AES-GCM expects
	pub fn assemble(&self) -> Cow<'_, [u8]> {
		match self {
			Ciphertext::Split { ct, tag } => Cow::Owned([ct.as_slice(), tag.as_slice()].concat()),
			Ciphertext::Combined { data } => Cow::Borrowed(data.as_slice()),
		}
	}

	// some generators emit `ct` with the tag already attached and a `tag` anyway
	pub fn fallback(&self) -> Option<&[u8]> {
		match self {
			Ciphertext::Split { ct, .. } => Some(ct.as_slice()),
			Ciphertext::Combined { .. } => None,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WirePayload")]
pub struct EncryptedPayload {
	pub salt: Salt,
	pub iv: Iv,
	#[serde(flatten)]
	pub body: Ciphertext,
}

impl EncryptedPayload {
	pub fn from_json(json: &str) -> Result<Self, Error> {
		WirePayload::from_json(json)?.try_into()
	}

	pub fn to_json(&self) -> Result<String, Error> {
		serde_json::to_string(self).map_err(|e| Error::BadJson(e.to_string()))
	}
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct WirePayload(Value);

impl WirePayload {
	pub fn from_json(json: &str) -> Result<Self, Error> {
		serde_json::from_str(json).map_err(|e| Error::BadJson(e.to_string()))
	}
}

// null reads as absent
fn text<'a>(obj: &'a Map<String, Value>, name: &'static str) -> Result<Option<&'a str>, Error> {
	match obj.get(name) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(s)) => Ok(Some(s.as_str())),
		Some(_) => Err(Error::WrongType(name)),
	}
}

fn field(value: Option<&str>, name: &'static str) -> Result<Vec<u8>, Error> {
	let value = value.ok_or(Error::MissingField(name))?;

	base64_blobs::decode(value).map_err(|_| Error::BadBase64(name))
}

impl TryFrom<WirePayload> for EncryptedPayload {
	type Error = Error;

	fn try_from(wire: WirePayload) -> Result<Self, Self::Error> {
		let obj = wire.0.as_object().ok_or(Error::NotAnObject)?;
		let salt = Salt::from(field(text(obj, "salt")?, "salt")?);
		let iv = Iv::try_from(field(text(obj, "iv")?, "iv")?.as_slice())
			.map_err(|_| Error::WrongIvSize)?;
		let body = match (text(obj, "ct")?, text(obj, "tag")?, text(obj, "data")?) {
			(ct, Some(tag), _) => Ciphertext::Split {
				ct: field(ct, "ct")?,
				tag: field(Some(tag), "tag")?,
			},
			(_, None, Some(data)) => Ciphertext::Combined {
				data: field(Some(data), "data")?,
			},
			(Some(ct), None, None) => Ciphertext::Combined {
				data: field(Some(ct), "ct")?,
			},
			(None, None, None) => return Err(Error::MissingField("data")),
		};

		Ok(Self { salt, iv, body })
	}
}
