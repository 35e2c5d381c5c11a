//! Verbatim-path HTTP/1.1 exchange
//!
//! Payload paths have to reach the target byte for byte: dot segments, doubled
//! slashes and percent-encoded delimiters are exactly what is being tested. A
//! WHATWG URL parser would resolve `/static/../account` to `/account` before
//! sending, so probe URLs are split by hand and written with hyper's
//! connection-level client.

use crate::error::{Result, ScanError};
use http_body_util::Empty;
use hyper::body::{Bytes, Incoming};
use hyper::header::{HeaderName, HeaderValue, HOST, USER_AGENT};
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_native_tls::TlsConnector;
use tracing::debug;
use url::Url;

/// Connection details and the untouched request-target of a probe URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTarget {
    pub https: bool,
    /// Host to connect to (IPv6 literals without brackets)
    pub host: String,
    pub port: u16,
    /// ASCII host plus any non-default port, sent as the Host header
    pub authority: String,
    /// Path and query exactly as written, fragment removed
    pub request_target: String,
}

impl RawTarget {
    /// Splits an absolute http(s) URL without normalizing its path.
    ///
    /// Fails with `InvalidUrl` before any network activity when the scheme is
    /// missing or unsupported.
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let (https, rest) = if let Some(rest) = url.strip_prefix("https://") {
            (true, rest)
        } else if let Some(rest) = url.strip_prefix("http://") {
            (false, rest)
        } else {
            return Err(ScanError::InvalidUrl(url.to_string()));
        };

        let split = rest
            .find(|c| matches!(c, '/' | '?' | '#'))
            .unwrap_or(rest.len());
        let (authority, tail) = rest.split_at(split);
        let authority = authority.rsplit('@').next().unwrap_or(authority);
        if authority.is_empty() {
            return Err(ScanError::InvalidUrl(url.to_string()));
        }

        let scheme = if https { "https" } else { "http" };
        let origin = Url::parse(&format!("{scheme}://{authority}/"))?;
        let ascii_host = origin
            .host_str()
            .ok_or_else(|| ScanError::InvalidUrl(url.to_string()))?;
        let host = ascii_host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .to_string();
        let port = origin
            .port_or_known_default()
            .ok_or_else(|| ScanError::InvalidUrl(url.to_string()))?;
        // IDN hosts go out in punycode so the Host header stays ASCII
        let authority = match origin.port() {
            Some(explicit) => format!("{ascii_host}:{explicit}"),
            None => ascii_host.to_string(),
        };

        let tail = tail.split('#').next().unwrap_or("");
        let request_target = if tail.is_empty() {
            "/".to_string()
        } else if tail.starts_with('?') {
            escape_request_target(&format!("/{tail}"))
        } else {
            escape_request_target(tail)
        };

        Ok(Self {
            https,
            host,
            port,
            authority,
            request_target,
        })
    }
}

/// Percent-encodes bytes that cannot appear on an HTTP/1.1 request line.
/// Existing escapes such as `%2f` or `%00` are left as they are.
fn escape_request_target(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        let allowed = byte.is_ascii_graphic()
            && !matches!(
                byte,
                b'"' | b'<' | b'>' | b'\\' | b'^' | b'`' | b'{' | b'|' | b'}'
            );
        if allowed {
            escaped.push(byte as char);
        } else {
            escaped.push_str(&format!("%{byte:02X}"));
        }
    }
    escaped
}

/// Builds a GET for the target. Custom headers replace the defaults of the
/// same name, `Host` and `User-Agent` included.
pub fn build_request(
    target: &RawTarget,
    user_agent: &str,
    headers: &HashMap<String, String>,
) -> Result<Request<Empty<Bytes>>> {
    let mut request = Request::builder()
        .method(Method::GET)
        .uri(target.request_target.as_str())
        .header(HOST, target.authority.as_str())
        .header(USER_AGENT, user_agent)
        .body(Empty::<Bytes>::new())?;

    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ScanError::Config(format!("Invalid header name '{name}': {e}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|e| ScanError::Config(format!("Invalid value for header '{name}': {e}")))?;
        request.headers_mut().insert(header_name, header_value);
    }

    Ok(request)
}

/// Serializes a request the way it is written on the wire
pub fn render_request<B>(request: &Request<B>) -> String {
    let mut raw = format!("{} {} HTTP/1.1\r\n", request.method(), request.uri());
    for (name, value) in request.headers() {
        raw.push_str(&title_case(name.as_str()));
        raw.push_str(": ");
        raw.push_str(&String::from_utf8_lossy(value.as_bytes()));
        raw.push_str("\r\n");
    }
    raw.push_str("\r\n");
    raw
}

/// `cf-cache-status` -> `Cf-Cache-Status`
pub fn title_case(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// Opens one connection to the target and sends the request over it
pub async fn send(
    target: &RawTarget,
    request: Request<Empty<Bytes>>,
    tls: &TlsConnector,
) -> Result<Response<Incoming>> {
    let stream = TcpStream::connect((target.host.as_str(), target.port)).await?;
    if target.https {
        let stream = tls.connect(&target.host, stream).await?;
        exchange(stream, request).await
    } else {
        exchange(stream, request).await
    }
}

async fn exchange<S>(io: S, request: Request<Empty<Bytes>>) -> Result<Response<Incoming>>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, connection) = hyper::client::conn::http1::Builder::new()
        .title_case_headers(true)
        .handshake(TokioIo::new(io))
        .await?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            debug!("Probe connection closed with error: {e}");
        }
    });

    Ok(sender.send_request(request).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_dot_segments() {
        let target = RawTarget::parse("https://example.com/static/../account").expect("parse");
        assert!(target.https);
        assert_eq!(target.host, "example.com");
        assert_eq!(target.port, 443);
        assert_eq!(target.request_target, "/static/../account");
    }

    #[test]
    fn test_parse_keeps_encoded_delimiters() {
        let target =
            RawTarget::parse("http://example.com:8080/account%2f%2e%2e%2frobots.txt%00").expect("parse");
        assert!(!target.https);
        assert_eq!(target.port, 8080);
        assert_eq!(target.authority, "example.com:8080");
        assert_eq!(target.request_target, "/account%2f%2e%2e%2frobots.txt%00");
    }

    #[test]
    fn test_parse_drops_fragment_and_keeps_query() {
        let target = RawTarget::parse("http://example.com/account?x=1#robots.txt").expect("parse");
        assert_eq!(target.request_target, "/account?x=1");

        let target = RawTarget::parse("http://example.com?robots.txt").expect("parse");
        assert_eq!(target.request_target, "/?robots.txt");

        let target = RawTarget::parse("http://example.com").expect("parse");
        assert_eq!(target.request_target, "/");
    }

    #[test]
    fn test_parse_escapes_non_ascii() {
        let target = RawTarget::parse("http://example.com/account/тест.css").expect("parse");
        assert_eq!(target.request_target, "/account/%D1%82%D0%B5%D1%81%D1%82.css");
    }

    #[test]
    fn test_parse_rejects_missing_scheme() {
        assert!(matches!(
            RawTarget::parse("example.com/account"),
            Err(ScanError::InvalidUrl(_))
        ));
        assert!(matches!(
            RawTarget::parse("ftp://example.com/"),
            Err(ScanError::InvalidUrl(_))
        ));
        assert!(matches!(
            RawTarget::parse("http:///account"),
            Err(ScanError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_parse_ipv6_literal() {
        let target = RawTarget::parse("http://[::1]:8000/a").expect("parse");
        assert_eq!(target.host, "::1");
        assert_eq!(target.port, 8000);
        assert_eq!(target.authority, "[::1]:8000");
    }

    #[test]
    fn test_idn_host_header_is_punycode() {
        let target = RawTarget::parse("https://bücher.example:8443/konto").expect("parse");
        assert_eq!(target.host, "xn--bcher-kva.example");
        assert_eq!(target.authority, "xn--bcher-kva.example:8443");

        let request = build_request(&target, "decepticache-test", &HashMap::new())
            .expect("ASCII Host header");
        assert_eq!(request.headers()[HOST], "xn--bcher-kva.example:8443");
    }

    #[test]
    fn test_default_port_left_out_of_host() {
        let target = RawTarget::parse("http://user:pw@example.com:80/a").expect("parse");
        assert_eq!(target.authority, "example.com");
        assert_eq!(target.port, 80);
    }

    #[test]
    fn test_render_request() {
        let target = RawTarget::parse("http://example.com/account;robots.txt").expect("parse");
        let mut headers = HashMap::new();
        headers.insert("X-Test".to_string(), "1".to_string());
        let request = build_request(&target, "decepticache-test", &headers).expect("request");
        let raw = render_request(&request);

        assert!(raw.starts_with("GET /account;robots.txt HTTP/1.1\r\n"));
        assert!(raw.contains("Host: example.com\r\n"));
        assert!(raw.contains("User-Agent: decepticache-test\r\n"));
        assert!(raw.contains("X-Test: 1\r\n"));
        assert!(raw.ends_with("\r\n\r\n"));
    }

    #[test]
    fn test_custom_header_overrides_default() {
        let target = RawTarget::parse("http://example.com/").expect("parse");
        let mut headers = HashMap::new();
        headers.insert("user-agent".to_string(), "custom".to_string());
        let request = build_request(&target, "default", &headers).expect("request");
        let values: Vec<_> = request.headers().get_all(USER_AGENT).iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "custom");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("cf-cache-status"), "Cf-Cache-Status");
        assert_eq!(title_case("age"), "Age");
    }
}
