use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;

/// One-shot HTTP server that answers a single request with a canned reply
/// and hands the request body back to the test.
pub struct FakeClassifier {
    pub url: String,
    bodies: Receiver<String>,
}

impl FakeClassifier {
    pub fn respond_once(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake classifier");
        let addr = listener.local_addr().expect("fake classifier addr");
        let reply = format!(
            "HTTP/1.1 {status} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            reason(status),
            body.len(),
        );
        let (tx, bodies) = mpsc::channel();
        thread::spawn(move || {
            let Ok((stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream);
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap_or(0) == 0 {
                    return;
                }
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap_or(0);
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            if reader.read_exact(&mut body).is_err() {
                return;
            }
            let _ = tx.send(String::from_utf8_lossy(&body).into_owned());
            let mut stream = reader.into_inner();
            let _ = stream.write_all(reply.as_bytes());
            let _ = stream.flush();
        });
        Self {
            url: format!("http://{addr}/ocr"),
            bodies,
        }
    }

    /// JSON body of the request the server received, if any arrived in time.
    pub fn received(&self, timeout: Duration) -> Option<serde_json::Value> {
        let body = self.bodies.recv_timeout(timeout).ok()?;
        Some(serde_json::from_str(&body).expect("request body is JSON"))
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        500 => "Internal Server Error",
        _ => "Status",
    }
}
