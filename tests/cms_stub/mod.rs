use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

use serde_json::Value;

/// One request the stub received: path and query under `/api`, plus the
/// `Authorization` header if any.
#[derive(Debug, Clone)]
pub struct Hit {
    pub url: String,
    pub authorization: Option<String>,
}

/// Canned Strapi-like API served from a background thread.
///
/// Routes are keyed by the path and query after `/api`, e.g.
/// `/novedades?populate=*`. Anything else answers 404.
pub struct CmsStub {
    pub base_url: String,
    hits: Arc<Mutex<Vec<Hit>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CmsStub {
    pub fn spawn(routes: Vec<(&str, u16, Value)>) -> Self {
        let routes: HashMap<String, (u16, String)> = routes
            .into_iter()
            .map(|(path, status, body)| (path.to_owned(), (status, body.to_string())))
            .collect();

        let server = tiny_http::Server::http("127.0.0.1:0").expect("start cms stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}/api");

        let hits = Arc::new(Mutex::new(Vec::new()));
        let thread_hits = Arc::clone(&hits);
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_owned();
                let key = url.strip_prefix("/api").unwrap_or(&url).to_owned();
                let authorization = request
                    .headers()
                    .iter()
                    .find(|h| h.field.equiv("Authorization"))
                    .map(|h| h.value.as_str().to_owned());
                thread_hits.lock().unwrap().push(Hit {
                    url: key.clone(),
                    authorization,
                });

                let (status, body) = routes
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| (404, r#"{"error":"not found"}"#.to_owned()));
                let mut response = tiny_http::Response::from_string(body).with_status_code(status);
                let header =
                    tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                        .expect("content-type header");
                response.add_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            hits,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    #[allow(dead_code)]
    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn urls(&self) -> Vec<String> {
        self.hits().into_iter().map(|h| h.url).collect()
    }
}

impl Drop for CmsStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Strapi list envelope around `data`.
#[allow(dead_code)]
pub fn list(data: Value) -> Value {
    serde_json::json!({ "data": data, "meta": {} })
}
