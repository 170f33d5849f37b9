use serde::Serializer;

// standard alphabet with padding, the same encoding `btoa`/`atob` speak
pub fn serialize_base64<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&base64::encode(bytes))
}

pub fn serialize_array_base64<S, const N: usize>(
	bytes: &[u8; N],
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&base64::encode(bytes))
}

// whitespace anywhere is skipped, as `atob` does; missing padding is tolerated
pub fn decode(b64: &str) -> Result<Vec<u8>, base64::DecodeError> {
	let cleaned: String = b64.chars().filter(|c| !c.is_ascii_whitespace()).collect();

	base64::decode(cleaned)
}
