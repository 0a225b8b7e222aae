//! In-process HTTP server serving canned responses and recording requests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path without the query string
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct MockRoute {
    pub method: &'static str,
    pub path: String,
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    /// Advertise more bytes than are sent, then close the connection.
    pub truncated: bool,
}

impl MockRoute {
    pub fn new(method: &'static str, path: &str, status: u16, body: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            status,
            content_type: "application/xml",
            body: body.to_string(),
            truncated: false,
        }
    }

    pub fn html(path: &str, status: u16, body: &str) -> Self {
        Self {
            content_type: "text/html; charset=utf-8",
            ..Self::new("GET", path, status, body)
        }
    }

    pub fn truncated(mut self) -> Self {
        self.truncated = true;
        self
    }
}

pub struct MockServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
    pub async fn start(routes: Vec<MockRoute>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(routes);

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(handle_connection(stream, routes.clone(), recorded.clone()));
            }
        });

        Self {
            base_url: format!("http://{}:{}", addr.ip(), addr.port()),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    routes: Arc<Vec<MockRoute>>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };

    let route = routes
        .iter()
        .find(|r| r.method == request.method && r.path == request.path);
    let (status, content_type, body, truncated) = match route {
        Some(route) => (route.status, route.content_type, route.body.clone(), route.truncated),
        None => (404, "text/plain", "no route".to_string(), false),
    };
    let content_length = if truncated { body.len() + 32 } else { body.len() };

    recorded.lock().unwrap().push(request);

    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        content_type,
        content_length,
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

async fn read_request(stream: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), Some(query.to_string())),
        None => (target, None),
    };

    Some(RecordedRequest {
        method,
        path,
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Product record as the webservice serves it, with two shop locales.
pub fn product_xml(name: &str, short_description: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<prestashop xmlns:xlink="http://www.w3.org/1999/xlink">
<product>
<id><![CDATA[12]]></id>
<manufacturer_name><![CDATA[Sampar]]></manufacturer_name>
<quantity><![CDATA[40]]></quantity>
<reference><![CDATA[SP-PEN]]></reference>
<meta_description>
<language id="1"><![CDATA[]]></language>
<language id="2"><![CDATA[]]></language>
</meta_description>
<meta_title>
<language id="1"><![CDATA[]]></language>
<language id="2"><![CDATA[]]></language>
</meta_title>
<link_rewrite>
<language id="1"><![CDATA[old-slug]]></language>
<language id="2"><![CDATA[ancien-slug]]></language>
</link_rewrite>
<name>
<language id="1"><![CDATA[{name}]]></language>
<language id="2"><![CDATA[{name}]]></language>
</name>
<description_short>
<language id="1"><![CDATA[{short_description}]]></language>
<language id="2"><![CDATA[{short_description}]]></language>
</description_short>
<associations>
<categories>
<category>
<id><![CDATA[3]]></id>
<position_in_category><![CDATA[7]]></position_in_category>
</category>
</categories>
</associations>
</product>
</prestashop>"#
    )
}

pub const PRODUCT_PAGE: &str = r#"<html><body>
<div class="shopi_descripton"><p>A nourishing pen fluid for brittle nails.</p></div>
<div id="showhidetarget4">Keratin, Vitamin E</div>
<div id="showhidetarget6">Apply twice a day.</div>
</body></html>"#;
