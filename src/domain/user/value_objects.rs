use lazy_static::lazy_static;
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const INVITE_CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const INVITE_CODE_LEN: usize = 6;

lazy_static! {
    static ref INVITE_CODE_REGEX: regex::Regex = regex::Regex::new(r"^[0-9A-Z]{6}$").unwrap();
}

/// A 6-character redemption token. Input is trimmed and upper-cased before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct InviteCode {
    #[validate(regex(path = *INVITE_CODE_REGEX))]
    pub value: String,
}

impl InviteCode {
    pub fn new(value: &str) -> Result<Self, validator::ValidationErrors> {
        let code = Self {
            value: value.trim().to_ascii_uppercase(),
        };
        code.validate()?;
        Ok(code)
    }

    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let value = (0..INVITE_CODE_LEN)
            .map(|_| INVITE_CODE_ALPHABET[rng.gen_range(0..INVITE_CODE_ALPHABET.len())] as char)
            .collect();
        Self { value }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Nickname {
    #[validate(length(min = 1, max = 32))]
    pub value: String,
}

impl Nickname {
    pub fn new(value: &str) -> Result<Self, validator::ValidationErrors> {
        let nickname = Self {
            value: value.trim().to_string(),
        };
        nickname.validate()?;
        Ok(nickname)
    }
}
