use std::ffi::OsStr;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::process::{Command, Output};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

pub struct ServerHandle {
    shutdown: mpsc::Sender<()>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _send_result = self.shutdown.send(());
        if let Some(handle) = self.thread.take() {
            drop(handle.join());
        }
    }
}

/// Canned answers of the stand-in campaign backend.
#[derive(Debug, Clone, Copy)]
pub struct Routes {
    pub health_status: u16,
    /// Status for every other API path.
    pub api_status: u16,
}

impl Routes {
    #[must_use]
    pub const fn healthy() -> Self {
        Self {
            health_status: 200,
            api_status: 200,
        }
    }
}

/// Spawn a lightweight HTTP server that plays both backend and frontend.
///
/// # Errors
///
/// Returns an error if the listener cannot be created or configured.
pub fn spawn_http_server(routes: Routes) -> Result<(String, ServerHandle), String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("bind test server failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("server addr failed: {}", err))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("set_nonblocking failed: {}", err))?;

    let (shutdown_tx, shutdown_rx) = mpsc::channel();
    let routes = Arc::new(routes);

    let handle = thread::spawn(move || {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                break;
            }

            match listener.accept() {
                Ok((stream, _)) => {
                    let routes = routes.clone();
                    thread::spawn(move || handle_client(stream, &routes));
                }
                Err(err) if err.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(Duration::from_millis(10));
                }
                Err(_) => break,
            }
        }
    });

    Ok((
        format!("http://{}", addr),
        ServerHandle {
            shutdown: shutdown_tx,
            thread: Some(handle),
        },
    ))
}

fn route(routes: &Routes, path: &str) -> (u16, &'static str, &'static str) {
    match path {
        "/health/" => (routes.health_status, "application/json", r#"{"status":"ok"}"#),
        "/auth/login/" if routes.api_status == 200 => (
            200,
            "application/json",
            r#"{"token":"e2e-token","user":{"id":1,"email":"vu@example.com"}}"#,
        ),
        "/auth/me/" if routes.api_status == 200 => {
            (200, "application/json", r#"{"id":1,"email":"vu@example.com"}"#)
        }
        _ if path.starts_with("/api/") || path.starts_with("/auth/") => {
            (routes.api_status, "application/json", "[]")
        }
        _ => (200, "text/html", "<html></html>"),
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

fn handle_client(mut stream: TcpStream, routes: &Routes) {
    let mut buffer = [0u8; 4096];
    let Ok(read) = stream.read(&mut buffer) else {
        return;
    };
    let request = String::from_utf8_lossy(buffer.get(..read).unwrap_or_default()).into_owned();
    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/");
    let path = path.split('?').next().unwrap_or(path);

    let (status, content_type, body) = route(routes, path);
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        content_type,
        body.len(),
        body
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if stream.flush().is_err() {
        return;
    }
    drop(stream.shutdown(Shutdown::Both));
}

/// Run the `campaign-loadtest` binary and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_loadtest<I, S>(args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = loadtest_bin()?;
    Command::new(bin)
        .args(args)
        .env("LOADTEST_LOG", "error")
        .env_remove("LOADTEST_CONFIG")
        .env_remove("SCENARIO")
        .env_remove("VUS")
        .env_remove("DURATION")
        .env_remove("ABORT_ON_FAIL")
        .env_remove("INFLUXDB_ENABLED")
        .output()
        .map_err(|err| format!("run campaign-loadtest failed: {}", err))
}

fn loadtest_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_campaign-loadtest").map_or_else(
        || Err("CARGO_BIN_EXE_campaign-loadtest missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
