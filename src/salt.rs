use rand::{rngs::OsRng, RngCore};
use serde::Serialize;

use crate::base64_blobs::serialize_base64;

// any length is accepted when reading a payload; sealing always emits SIZE bytes
#[derive(Clone, PartialEq, Debug, Serialize)]
#[serde(transparent)]
pub struct Salt {
	#[serde(serialize_with = "serialize_base64")]
	pub(crate) bytes: Vec<u8>,
}

impl Salt {
	pub const SIZE: usize = 16;

	pub fn generate() -> Self {
		let mut bytes = vec![0u8; Self::SIZE];
		OsRng.fill_bytes(&mut bytes);

		Self { bytes }
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}
}

impl From<Vec<u8>> for Salt {
	fn from(bytes: Vec<u8>) -> Self {
		Self { bytes }
	}
}

impl From<&[u8]> for Salt {
	fn from(bytes: &[u8]) -> Self {
		Self {
			bytes: bytes.to_vec(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::Salt;

	#[test]
	fn test_generate() {
		let a = Salt::generate();
		let b = Salt::generate();

		assert_eq!(a.as_bytes().len(), Salt::SIZE);
		assert_ne!(a, b);
	}

	#[test]
	fn test_serialize_as_plain_string() {
		let salt = Salt::from(vec![0u8; 16]);

		assert_eq!(
			serde_json::to_string(&salt).unwrap(),
			r#""AAAAAAAAAAAAAAAAAAAAAA==""#
		);
	}
}
