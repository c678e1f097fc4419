use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SUCCESS_MESSAGE: &str = "The action was completed successfully.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlashLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// User-visible notifications collected while handling one request.
///
/// Rendered views drain the bag; after a redirect the host carries what is
/// left over to the next request (see [`FlashBag::encode`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashBag {
    flashes: Vec<Flash>,
}

impl FlashBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, level: FlashLevel, message: impl Into<String>) {
        self.flashes.push(Flash {
            level,
            message: message.into(),
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(FlashLevel::Success, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(FlashLevel::Error, message);
    }

    /// Success notification for the action named `label`, or a generic one.
    pub fn action_succeeded(&mut self, label: Option<&str>) {
        match label {
            Some(label) => self.success(format!("The {label} was completed successfully.")),
            None => self.success(DEFAULT_SUCCESS_MESSAGE),
        }
    }

    pub fn peek(&self) -> &[Flash] {
        &self.flashes
    }

    pub fn take(&mut self) -> Vec<Flash> {
        std::mem::take(&mut self.flashes)
    }

    pub fn is_empty(&self) -> bool {
        self.flashes.is_empty()
    }

    pub fn encode(&self) -> String {
        let json = serde_json::to_vec(&self.flashes).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Lenient inverse of [`FlashBag::encode`]: malformed input yields an empty bag.
    pub fn decode(raw: &str) -> Self {
        let flashes = URL_SAFE_NO_PAD
            .decode(raw.trim())
            .ok()
            .and_then(|bytes| serde_json::from_slice::<Vec<Flash>>(&bytes).ok())
            .unwrap_or_default();
        Self { flashes }
    }
}
