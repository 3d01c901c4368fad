//! Backend uplink over HTTP.
//!
//! Implements [`UplinkPort`]: each exchange POSTs one [`SensorReport`] as
//! JSON and parses the response body into an [`InboundMessage`].  Both
//! bodies go through fixed 512-byte buffers.
//!
//! [`HttpUplink`] is generic over the connectivity signal and over an
//! [`HttpPost`] transport, so the exchange logic (serialise, status check,
//! parse) runs on the host against a scripted transport.  On target the
//! transport is [`EspHttpPost`], a thin wrapper around `EspHttpConnection`.

use log::debug;

use crate::app::commands::InboundMessage;
use crate::app::ports::UplinkPort;
use crate::app::report::SensorReport;
use crate::error::UplinkError;

use super::wifi::ConnectivityPort;

/// Capacity of the request and response bodies.
pub const BODY_CAPACITY: usize = 512;

pub type ResponseBody = heapless::Vec<u8, BODY_CAPACITY>;

/// One blocking JSON POST.
pub trait HttpPost {
    /// Send `body` to `url`, fill `response` with the reply body and
    /// return the status code.
    fn post_json(
        &mut self,
        url: &str,
        body: &[u8],
        response: &mut ResponseBody,
    ) -> Result<u16, UplinkError>;
}

pub struct HttpUplink<W, T> {
    link: W,
    transport: T,
    url: heapless::String<128>,
}

impl<W: ConnectivityPort, T: HttpPost> HttpUplink<W, T> {
    pub fn new(link: W, transport: T, url: &str) -> Result<Self, UplinkError> {
        let mut owned = heapless::String::new();
        owned.push_str(url).map_err(|_| UplinkError::Transport)?;
        Ok(Self {
            link,
            transport,
            url: owned,
        })
    }

    pub fn link(&self) -> &W {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut W {
        &mut self.link
    }
}

impl<W: ConnectivityPort, T: HttpPost> UplinkPort for HttpUplink<W, T> {
    fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    fn exchange(&mut self, report: &SensorReport) -> Result<InboundMessage, UplinkError> {
        let mut buf = [0u8; BODY_CAPACITY];
        let body = report
            .write_json(&mut buf)
            .ok_or(UplinkError::BodyTooLarge)?;

        let mut response = ResponseBody::new();
        let status = self.transport.post_json(&self.url, body, &mut response)?;
        debug!("uplink: HTTP {} ({} byte reply)", status, response.len());
        if !(200..300).contains(&status) {
            return Err(UplinkError::Status(status));
        }
        if response.is_empty() {
            return Ok(InboundMessage::default());
        }
        InboundMessage::from_json(&response)
    }
}

// ── ESP-IDF transport ─────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp_impl::EspHttpPost;

#[cfg(target_os = "espidf")]
mod esp_impl {
    use core::time::Duration;

    use esp_idf_svc::http::Method;
    use esp_idf_svc::http::client::{Client, Configuration, EspHttpConnection};
    use esp_idf_svc::io::{Read, Write};
    use log::warn;

    use super::{HttpPost, ResponseBody};
    use crate::error::UplinkError;

    const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Opens a fresh connection per exchange; one report per sample cycle
    /// does not justify keeping a socket alive.
    #[derive(Debug, Default)]
    pub struct EspHttpPost;

    impl HttpPost for EspHttpPost {
        fn post_json(
            &mut self,
            url: &str,
            body: &[u8],
            response: &mut ResponseBody,
        ) -> Result<u16, UplinkError> {
            let config = Configuration {
                timeout: Some(REQUEST_TIMEOUT),
                ..Default::default()
            };
            let connection = EspHttpConnection::new(&config).map_err(|e| {
                warn!("uplink: connection setup failed: {e}");
                UplinkError::Transport
            })?;
            let mut client = Client::wrap(connection);

            let length = body.len().to_string();
            let headers = [
                ("Content-Type", "application/json"),
                ("Content-Length", length.as_str()),
            ];
            let mut request = client
                .request(Method::Post, url, &headers)
                .map_err(|_| UplinkError::Transport)?;
            request.write_all(body).map_err(|_| UplinkError::Transport)?;
            request.flush().map_err(|_| UplinkError::Transport)?;
            let mut reply = request.submit().map_err(|_| UplinkError::Transport)?;
            let status = reply.status();

            let mut chunk = [0u8; 64];
            loop {
                let n = reply.read(&mut chunk).map_err(|_| UplinkError::Transport)?;
                if n == 0 {
                    break;
                }
                response
                    .extend_from_slice(&chunk[..n])
                    .map_err(|()| UplinkError::BodyTooLarge)?;
            }
            Ok(status)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::wifi::ConnectivityError;
    use crate::fsm::context::CalibratedReading;

    struct Link(bool);

    impl ConnectivityPort for Link {
        fn connect(&mut self) -> Result<(), ConnectivityError> {
            Ok(())
        }
        fn is_connected(&self) -> bool {
            self.0
        }
        fn poll(&mut self, _now_ms: u64) {}
        fn set_credentials(
            &mut self,
            _ssid: &str,
            _password: &str,
        ) -> Result<(), ConnectivityError> {
            Ok(())
        }
    }

    /// Replies with a fixed status and body, keeping the last request.
    struct Scripted {
        status: u16,
        reply: &'static [u8],
        last_url: String,
        last_body: Vec<u8>,
    }

    impl Scripted {
        fn new(status: u16, reply: &'static [u8]) -> Self {
            Self {
                status,
                reply,
                last_url: String::new(),
                last_body: Vec::new(),
            }
        }
    }

    impl HttpPost for Scripted {
        fn post_json(
            &mut self,
            url: &str,
            body: &[u8],
            response: &mut ResponseBody,
        ) -> Result<u16, UplinkError> {
            self.last_url = url.to_string();
            self.last_body = body.to_vec();
            response
                .extend_from_slice(self.reply)
                .map_err(|()| UplinkError::BodyTooLarge)?;
            Ok(self.status)
        }
    }

    fn report() -> SensorReport {
        SensorReport::new(1, &CalibratedReading::default(), false)
    }

    const URL: &str = "http://192.168.1.10:3000/api/sensors";

    #[test]
    fn posts_report_and_parses_commands() {
        let transport = Scripted::new(200, br#"{"commands":{"autoMode":true,"pumpState":null}}"#);
        let mut uplink = HttpUplink::new(Link(true), transport, URL).unwrap();
        let msg = uplink.exchange(&report()).unwrap();
        assert_eq!(msg.commands.unwrap().auto_mode, Some(true));

        let sent: serde_json::Value = serde_json::from_slice(&uplink.transport.last_body).unwrap();
        assert_eq!(sent["zoneId"], 1);
        assert_eq!(uplink.transport.last_url, URL);
    }

    #[test]
    fn empty_reply_is_a_no_op_message() {
        let mut uplink = HttpUplink::new(Link(true), Scripted::new(204, b""), URL).unwrap();
        assert!(uplink.exchange(&report()).unwrap().is_empty());
    }

    #[test]
    fn error_status_is_reported() {
        let mut uplink = HttpUplink::new(Link(true), Scripted::new(500, b"oops"), URL).unwrap();
        assert_eq!(uplink.exchange(&report()), Err(UplinkError::Status(500)));
    }

    #[test]
    fn non_object_reply_is_malformed() {
        let mut uplink = HttpUplink::new(Link(true), Scripted::new(200, b"[1,2]"), URL).unwrap();
        assert_eq!(uplink.exchange(&report()), Err(UplinkError::Malformed));
    }

    #[test]
    fn connectivity_follows_the_link() {
        let uplink = HttpUplink::new(Link(false), Scripted::new(200, b""), URL).unwrap();
        assert!(!uplink.is_connected());
    }
}
