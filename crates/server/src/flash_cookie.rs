use admin_crud::{CrudResponse, DeleteTokenManager, FlashBag};
use axum::{
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
};

pub(crate) const FLASH_COOKIE: &str = "flash";

/// Flashes carried over from the previous response, plus whatever the
/// current request adds. The cookie is signed; a cookie whose signature does
/// not match is dropped and cleared.
pub(crate) struct IncomingFlashes {
    pub(crate) bag: FlashBag,
    present: bool,
    signer: DeleteTokenManager,
}

impl IncomingFlashes {
    pub(crate) fn from_headers(headers: &HeaderMap, signer: &DeleteTokenManager) -> Self {
        let raw = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == FLASH_COOKIE)
            .map(|(_, value)| value);

        let bag = raw
            .and_then(|raw| signer.verify(raw))
            .map(FlashBag::decode)
            .unwrap_or_default();
        Self {
            bag,
            present: raw.is_some(),
            signer: signer.clone(),
        }
    }

    /// Stores undisplayed flashes for the next request, or clears the cookie
    /// once they have been shown.
    pub(crate) fn respond(self, response: CrudResponse) -> Response {
        let mut response = response.into_response();

        let cookie = if !self.bag.is_empty() {
            Some(format!(
                "{FLASH_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
                self.signer.sign(&self.bag.encode())
            ))
        } else if self.present {
            Some(format!(
                "{FLASH_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax"
            ))
        } else {
            None
        };

        if let Some(value) = cookie.and_then(|c| HeaderValue::from_str(&c).ok()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        response
    }
}
