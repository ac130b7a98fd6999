//! ESP-IDF HTTP transport.
//!
//! Implements [`HttpTransport`] with `EspHttpConnection` wrapped in the
//! blocking `embedded-svc` client.  A fresh connection is opened per
//! request so each call gets its own timeout and a dead socket never
//! outlives one tick.

use core::time::Duration;

use embedded_svc::http::Method;
use embedded_svc::http::client::Client as HttpClient;
use embedded_svc::io::{Read as _, Write as _};
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use log::debug;

use crate::app::ports::{HttpError, HttpResponse, HttpTransport};

const READ_BUF_SIZE: usize = 256;

/// Upper bound on a response body; Moonraker replies for 32 gates fit easily.
const MAX_BODY_SIZE: usize = 16 * 1024;

pub struct EspHttpTransport {
    base_url: String,
}

impl EspHttpTransport {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl HttpTransport for EspHttpTransport {
    fn post_json(
        &mut self,
        path: &str,
        body: &str,
        timeout_ms: u32,
    ) -> Result<HttpResponse, HttpError> {
        let url = format!("{}{}", self.base_url, path);
        let config = Configuration {
            timeout: Some(Duration::from_millis(timeout_ms as u64)),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&config).map_err(|_| HttpError::Connect)?;
        let mut client = HttpClient::wrap(conn);

        let content_length = body.len().to_string();
        let headers = [
            ("content-type", "application/json"),
            ("content-length", content_length.as_str()),
        ];
        let mut request = client
            .request(Method::Post, &url, &headers)
            .map_err(|_| HttpError::Connect)?;
        request
            .write_all(body.as_bytes())
            .map_err(|_| HttpError::Io)?;
        request.flush().map_err(|_| HttpError::Io)?;
        let mut response = request.submit().map_err(|_| HttpError::Io)?;
        let status = response.status();

        let mut out = Vec::new();
        let mut buf = [0u8; READ_BUF_SIZE];
        loop {
            let len = response.read(&mut buf).map_err(|_| HttpError::Io)?;
            if len == 0 {
                break;
            }
            if out.len() + len > MAX_BODY_SIZE {
                return Err(HttpError::Io);
            }
            out.extend_from_slice(&buf[..len]);
        }
        debug!("POST {} -> {} ({} bytes)", url, status, out.len());

        Ok(HttpResponse { status, body: out })
    }
}
