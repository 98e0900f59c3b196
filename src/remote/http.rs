use std::time::Duration;

use reqwest::blocking::Client;

use super::{FetchError, SheetSource};

const USER_AGENT: &str = concat!("sheetdex/", env!("CARGO_PKG_VERSION"));

/// CSV export endpoint of a published Google Sheet.
pub fn google_export_url(sheet_id: &str, gid: Option<&str>) -> String {
    let mut url = format!(
        "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
        sheet_id.trim()
    );
    if let Some(gid) = gid.map(str::trim).filter(|gid| !gid.is_empty()) {
        url.push_str("&gid=");
        url.push_str(gid);
    }
    url
}

/// Blocking HTTP GET of a CSV export URL.
#[derive(Debug, Clone)]
pub struct HttpSheetSource {
    client: Client,
    url: String,
}

impl HttpSheetSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|err| FetchError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl SheetSource for HttpSheetSource {
    fn fetch(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .map_err(|err| FetchError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        response
            .text()
            .map_err(|err| FetchError::Transport(err.to_string()))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve exactly one canned HTTP response on a local port.
    fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });
        format!("http://{addr}/export?format=csv")
    }

    #[test]
    fn builds_google_export_url() {
        assert_eq!(
            google_export_url("abc123", None),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv"
        );
        assert_eq!(
            google_export_url(" abc123 ", Some("42")),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv&gid=42"
        );
        assert_eq!(
            google_export_url("abc123", Some("  ")),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv"
        );
    }

    #[test]
    fn returns_body_on_success() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Type: text/csv\r\nContent-Length: 15\r\nConnection: close\r\n\r\nCard Name\nAcme\n",
        );
        let source = HttpSheetSource::new(url, Duration::from_secs(5)).unwrap();
        assert_eq!(source.fetch().unwrap(), "Card Name\nAcme\n");
    }

    #[test]
    fn server_error_carries_status_text() {
        let url = serve_once(
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        );
        let source = HttpSheetSource::new(url, Duration::from_secs(5)).unwrap();
        let err = source.fetch().unwrap_err();
        match &err {
            FetchError::Status { code, reason } => {
                assert_eq!(*code, 500);
                assert_eq!(reason, "Internal Server Error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Internal Server Error"));
    }

    #[test]
    fn connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source =
            HttpSheetSource::new(format!("http://{addr}/"), Duration::from_secs(5)).unwrap();
        assert!(matches!(source.fetch(), Err(FetchError::Transport(_))));
    }
}
