// authoring side of the payload format; the site only ever decrypts

use crate::{
	aes_gcm::{self, Aes, Iv, TAG_SIZE},
	kdf::{self, Params, DEFAULT_PARAMS},
	payload::{Ciphertext, EncryptedPayload},
	salt::Salt,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
	Split,
	Combined,
}

pub fn seal(pt: &str, pass: &str, layout: Layout) -> Result<EncryptedPayload, aes_gcm::Error> {
	seal_with(
		pt.as_bytes(),
		pass,
		Salt::generate(),
		Iv::generate(),
		&DEFAULT_PARAMS,
		layout,
	)
}

// never reuse an iv with the same password and salt for two plaintexts
pub fn seal_with(
	pt: &[u8],
	pass: &str,
	salt: Salt,
	iv: Iv,
	params: &Params,
	layout: Layout,
) -> Result<EncryptedPayload, aes_gcm::Error> {
	let key = kdf::derive_key_with(pass, salt.as_bytes(), params);
	let mut ct = Aes::new_with_key_iv(key, iv).encrypt(pt)?;
	let body = match layout {
		Layout::Split => {
			let tag = ct.split_off(ct.len() - TAG_SIZE);

			Ciphertext::Split { ct, tag }
		}
		Layout::Combined => Ciphertext::Combined { data: ct },
	};

	Ok(EncryptedPayload { salt, iv, body })
}
