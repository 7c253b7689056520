//! Purpose: Fetch JSON over HTTP and hand the decoded body to `Value`/`Object`.
//! Exports: `HttpClient`, `HttpConfig`, `Body`.
//! Role: Boundary adapter; the core only sees the bytes it returns.
//! Invariants: Any status other than 200 is an error carrying that status.
//! Invariants: Response bodies are decoded per `Content-Encoding` (identity, gzip,
//!             deflate); any other encoding is rejected before JSON decoding.
//! Invariants: Configuration is explicit per client; there is no global client.
//! Notes: A `#trace` suffix on the url (or `HttpConfig::trace`) raises the
//!        request/response events from debug to info.
#![allow(clippy::result_large_err)]

use std::io::Read;
use std::path::Path;
use std::time::Duration;

use flate2::read::{DeflateDecoder, GzDecoder};
use getrandom::fill as fill_random;
use tracing::{debug, info};
use url::Url;

use super::{Object, Value};
use crate::core::error::{Error, ErrorKind};
use crate::core::node::Node;
use crate::json::codec;

const TRACE_SUFFIX: &str = "#trace";
const BOUNDARY_BYTES: usize = 30;

macro_rules! trace_event {
    ($trace:expr, $($arg:tt)+) => {
        if $trace {
            info!($($arg)+);
        } else {
            debug!($($arg)+);
        }
    };
}

#[derive(Clone, Debug)]
pub struct HttpConfig {
    pub timeout: Option<Duration>,
    pub user_agent: String,
    /// Sent on every request after the built-in defaults; per-call headers
    /// still override them.
    pub default_headers: Vec<(String, String)>,
    pub trace: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            user_agent: concat!("jsvalue/", env!("CARGO_PKG_VERSION")).to_string(),
            default_headers: Vec::new(),
            trace: false,
        }
    }
}

/// Request payload; the variant decides the `Content-Type`.
#[derive(Clone, Debug)]
pub enum Body {
    Json(Node),
    Form(Vec<(String, String)>),
    Text(String),
    Bytes(Vec<u8>),
}

impl Body {
    fn encode(&self) -> Result<(Vec<u8>, Option<&'static str>), Error> {
        match self {
            Body::Json(node) => Ok((codec::marshal(node)?, Some("application/json"))),
            Body::Form(pairs) => {
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(pairs)
                    .finish();
                Ok((
                    encoded.into_bytes(),
                    Some("application/x-www-form-urlencoded"),
                ))
            }
            Body::Text(text) => Ok((text.clone().into_bytes(), None)),
            Body::Bytes(bytes) => Ok((bytes.clone(), None)),
        }
    }
}

#[derive(Clone)]
pub struct HttpClient {
    config: HttpConfig,
    agent: ureq::Agent,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            config,
        }
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    pub fn load(&self, url: &str) -> Result<Value, Error> {
        self.request_value(Some("GET"), url, &Object::null(), None)
    }

    /// Non-object documents come back as the absent object.
    pub fn load_object(&self, url: &str) -> Result<Object, Error> {
        self.load(url).map(Value::into_object)
    }

    pub fn post_data(&self, url: &str, data: impl Into<Node>) -> Result<Value, Error> {
        self.request_value(
            Some("POST"),
            url,
            &Object::null(),
            Some(Body::Json(data.into())),
        )
    }

    /// Sends `params` as form fields and each `(field, path)` in `files` as a
    /// file part named after the path's final component.
    pub fn post_multipart(
        &self,
        method: Option<&str>,
        url: &str,
        headers: Object,
        params: &Object,
        files: &[(&str, &Path)],
    ) -> Result<Value, Error> {
        let boundary = multipart_boundary()?;
        let body = multipart_body(&boundary, params, files)?;
        let headers = headers.set(
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        );
        self.request_value(method, url, &headers, Some(Body::Bytes(body)))
    }

    pub fn request_value(
        &self,
        method: Option<&str>,
        url: &str,
        headers: &Object,
        body: Option<Body>,
    ) -> Result<Value, Error> {
        let data = self.request(method, url, headers, body)?;
        Value::parse(&data)
    }

    /// Performs one request and returns the decoded response body. Without an
    /// explicit method the request is a POST when `body` is set, else a GET.
    pub fn request(
        &self,
        method: Option<&str>,
        url: &str,
        headers: &Object,
        body: Option<Body>,
    ) -> Result<Vec<u8>, Error> {
        let (url, suffix_trace) = match url.strip_suffix(TRACE_SUFFIX) {
            Some(stripped) => (stripped, true),
            None => (url, false),
        };
        let trace = self.config.trace || suffix_trace;
        let url = parse_http_url(url)?;
        let method = match method.filter(|m| !m.is_empty()) {
            Some(method) => method.to_ascii_uppercase(),
            None if body.is_some() => "POST".to_string(),
            None => "GET".to_string(),
        };
        let (payload, content_type) = match &body {
            Some(body) => {
                let (bytes, content_type) = body.encode()?;
                (Some(bytes), content_type)
            }
            None => (None, None),
        };

        let mut request = self
            .agent
            .request(&method, url.as_str())
            .set("Accept", "application/json")
            .set("User-Agent", &self.config.user_agent)
            .set("Accept-Encoding", "gzip, deflate");
        if let Some(content_type) = content_type {
            request = request.set("Content-Type", content_type);
        }
        for (name, value) in &self.config.default_headers {
            request = request.set(&canonical_header_name(name), value);
        }
        for (name, value) in header_fields(headers) {
            request = request.set(&name, &value);
        }

        trace_event!(trace, method = %method, url = %url, "http request");
        if let Some(payload) = &payload {
            trace_event!(
                trace,
                bytes = payload.len(),
                body = %String::from_utf8_lossy(payload),
                "http request body"
            );
        }

        let response = match &payload {
            Some(payload) => request.send_bytes(payload),
            None => request.call(),
        };
        let response = match response {
            Ok(resp) => resp,
            Err(ureq::Error::Status(code, resp)) => {
                return Err(status_error(code, resp.status_text(), &url));
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(Error::new(ErrorKind::Io)
                    .with_message(format!("request to {url} failed"))
                    .with_source(err));
            }
        };

        let encoding = response
            .header("Content-Encoding")
            .unwrap_or_default()
            .to_string();
        trace_event!(
            trace,
            status = response.status(),
            content_encoding = %encoding,
            "http response"
        );
        if response.status() != 200 {
            return Err(status_error(response.status(), response.status_text(), &url));
        }

        let data = decode_body(&encoding, response.into_reader())?;
        trace_event!(
            trace,
            bytes = data.len(),
            body = %String::from_utf8_lossy(&data),
            "http response body"
        );
        Ok(data)
    }
}

fn parse_http_url(raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid url `{raw}`"))
            .with_source(err)
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("unsupported url scheme `{other}`"))
            .with_hint("use an http:// or https:// url")),
    }
}

fn status_error(code: u16, text: &str, url: &Url) -> Error {
    Error::new(ErrorKind::Status)
        .with_message(format!("http status {code} `{text}` from {url}"))
        .with_status(code)
}

/// Caller headers as `(canonical name, value)`; array values are joined into
/// one comma-separated field.
fn header_fields(headers: &Object) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if value.is_array() {
                value.array().join(", ")
            } else {
                value.string()
            };
            (canonical_header_name(name), value)
        })
        .collect()
}

/// `content-type` -> `Content-Type`.
fn canonical_header_name(name: &str) -> String {
    name.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

fn decode_body(encoding: &str, reader: impl Read) -> Result<Vec<u8>, Error> {
    match encoding.trim().to_ascii_lowercase().as_str() {
        "" | "identity" => read_body(reader),
        "gzip" | "x-gzip" => read_body(GzDecoder::new(reader)),
        "deflate" => read_body(DeflateDecoder::new(reader)),
        other => Err(Error::new(ErrorKind::Encoding)
            .with_message(format!("unsupported content-encoding `{other}`"))),
    }
}

fn read_body(mut reader: impl Read) -> Result<Vec<u8>, Error> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    Ok(data)
}

fn multipart_boundary() -> Result<String, Error> {
    let mut bytes = [0u8; BOUNDARY_BYTES];
    fill_random(&mut bytes).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message(format!("failed to generate multipart boundary: {err}"))
    })?;
    Ok(hex_encode(&bytes))
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(nibble_hex(byte >> 4));
        out.push(nibble_hex(byte & 0x0f));
    }
    out
}

fn nibble_hex(nibble: u8) -> char {
    match nibble {
        0..=9 => char::from(b'0' + nibble),
        _ => char::from(b'a' + (nibble - 10)),
    }
}

fn multipart_body(
    boundary: &str,
    params: &Object,
    files: &[(&str, &Path)],
) -> Result<Vec<u8>, Error> {
    let mut body = Vec::new();
    for (name, value) in params.iter() {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
                escape_quotes(name)
            )
            .as_bytes(),
        );
        body.extend_from_slice(value.string().as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for (field, path) in files {
        let content = std::fs::read(path).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read multipart file")
                .with_path(*path)
                .with_source(err)
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                escape_quotes(field),
                escape_quotes(&filename)
            )
            .as_bytes(),
        );
        body.extend_from_slice(&content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    Ok(body)
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::{
        BOUNDARY_BYTES, Body, canonical_header_name, decode_body, header_fields, hex_encode,
        multipart_body, multipart_boundary, parse_http_url,
    };
    use crate::api::{Array, Object};
    use crate::core::error::ErrorKind;
    use crate::core::node::Node;
    use flate2::Compression;
    use flate2::write::{DeflateEncoder, GzEncoder};
    use std::io::Write;

    #[test]
    fn only_http_schemes_are_accepted() {
        assert!(parse_http_url("http://localhost:1/x").is_ok());
        assert!(parse_http_url("https://example.com").is_ok());
        let err = parse_http_url("ftp://example.com").expect_err("scheme");
        assert_eq!(err.kind(), ErrorKind::Usage);
        let err = parse_http_url("not a url").expect_err("parse");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn header_names_are_canonicalized() {
        assert_eq!(canonical_header_name("content-type"), "Content-Type");
        assert_eq!(canonical_header_name("X-API-KEY"), "X-Api-Key");
        assert_eq!(canonical_header_name("accept"), "Accept");
    }

    #[test]
    fn array_headers_join_values() {
        let headers = Object::new()
            .set("x-tags", Array::from_nodes(["a", "b"]))
            .set("authorization", "Bearer t");
        assert_eq!(
            header_fields(&headers),
            vec![
                ("Authorization".to_string(), "Bearer t".to_string()),
                ("X-Tags".to_string(), "a, b".to_string())
            ]
        );
    }

    #[test]
    fn body_kinds_pick_content_type() {
        let (bytes, content_type) = Body::Json(Node::from(vec![1, 2])).encode().expect("json");
        assert_eq!(bytes, b"[1,2]");
        assert_eq!(content_type, Some("application/json"));

        let form = Body::Form(vec![
            ("q".to_string(), "a b".to_string()),
            ("n".to_string(), "1&2".to_string()),
        ]);
        let (bytes, content_type) = form.encode().expect("form");
        assert_eq!(bytes, b"q=a+b&n=1%262");
        assert_eq!(content_type, Some("application/x-www-form-urlencoded"));

        let (bytes, content_type) = Body::Text("raw".to_string()).encode().expect("text");
        assert_eq!(bytes, b"raw");
        assert_eq!(content_type, None);
    }

    #[test]
    fn bodies_decode_per_content_encoding() {
        let payload = br#"{"ok":true}"#;

        let mut gz = GzEncoder::new(Vec::new(), Compression::default());
        gz.write_all(payload).expect("gzip write");
        let gz = gz.finish().expect("gzip finish");
        assert_eq!(decode_body("gzip", gz.as_slice()).expect("gzip"), payload);

        let mut deflate = DeflateEncoder::new(Vec::new(), Compression::default());
        deflate.write_all(payload).expect("deflate write");
        let deflate = deflate.finish().expect("deflate finish");
        assert_eq!(decode_body("deflate", deflate.as_slice()).expect("deflate"), payload);

        assert_eq!(decode_body("", &payload[..]).expect("identity"), payload);
        let err = decode_body("br", &payload[..]).expect_err("brotli");
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }

    #[test]
    fn multipart_boundaries_are_random_hex() {
        let first = multipart_boundary().expect("boundary");
        let second = multipart_boundary().expect("boundary");
        assert_eq!(first.len(), BOUNDARY_BYTES * 2);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_ne!(first, second);
        assert_eq!(hex_encode(&[0x00, 0x9f, 0xa0]), "009fa0");
    }

    #[test]
    fn multipart_body_has_fields_and_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "hello").expect("seed");
        let params = Object::new().set("title", "x\"y").set("n", 2);
        let body = multipart_body("B", &params, &[("upload", path.as_path())]).expect("body");
        let text = String::from_utf8(body).expect("utf8");
        assert!(text.starts_with("--B\r\nContent-Disposition: form-data; name=\"n\"\r\n\r\n2\r\n"));
        assert!(text.contains("name=\"title\"\r\n\r\nx\"y\r\n"));
        assert!(text.contains("name=\"upload\"; filename=\"note.txt\""));
        assert!(text.contains("\r\n\r\nhello\r\n"));
        assert!(text.ends_with("--B--\r\n"));

        let missing = dir.path().join("missing.bin");
        let err = multipart_body("B", &Object::null(), &[("f", missing.as_path())])
            .expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
