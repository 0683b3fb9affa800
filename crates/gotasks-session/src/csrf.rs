//! Per-attempt CSRF state
//!
//! The transmitted value is `<flow id>.<nonce>`. Each authorization attempt
//! stores its value under its own flow id, so a second attempt never
//! overwrites the state of one still in flight.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use uuid::Uuid;

const NONCE_BYTES: usize = 16;

/// Prefix of every stored state key
pub(crate) const STORAGE_PREFIX: &str = "state:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfState {
    flow_id: String,
    value: String,
}

impl CsrfState {
    pub fn generate() -> Self {
        let mut nonce = [0u8; NONCE_BYTES];
        rand::thread_rng().fill_bytes(&mut nonce);

        let flow_id = Uuid::new_v4().simple().to_string();
        let value = format!("{}.{}", flow_id, URL_SAFE_NO_PAD.encode(nonce));

        Self { flow_id, value }
    }

    /// Recover the flow id from a state echoed back by the provider
    pub fn parse(value: &str) -> Option<Self> {
        let (flow_id, nonce) = value.split_once('.')?;
        if flow_id.is_empty() || nonce.is_empty() {
            return None;
        }

        Some(Self {
            flow_id: flow_id.to_string(),
            value: value.to_string(),
        })
    }

    pub fn flow_id(&self) -> &str {
        &self.flow_id
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Session storage key holding this attempt's state
    pub fn storage_key(&self) -> String {
        format!("{}{}", STORAGE_PREFIX, self.flow_id)
    }
}
