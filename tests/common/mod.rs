//! Shared helpers: a loopback HTTP server serving release fixtures and a
//! preconfigured installer command.

#![allow(dead_code)]

use assert_cmd::Command;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;

pub const EXPORT_LINE: &str = "export PATH=\"$HOME/bin:$PATH\"";

#[derive(Clone)]
pub enum Route {
    Body(Vec<u8>),
    Redirect(String),
    Status(u16),
    /// Declares `declared` bytes but sends only `body`, then closes.
    Truncated { declared: usize, body: Vec<u8> },
}

pub struct FixtureServer {
    addr: SocketAddr,
    routes: Arc<Mutex<HashMap<String, Route>>>,
}

impl FixtureServer {
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fixture server");
        let addr = listener.local_addr().expect("local addr");
        let routes: Arc<Mutex<HashMap<String, Route>>> = Arc::default();
        let shared = Arc::clone(&routes);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let routes = Arc::clone(&shared);
                thread::spawn(move || serve(stream, &routes));
            }
        });
        Self { addr, routes }
    }

    pub fn set(&self, path: &str, route: Route) {
        self.routes.lock().unwrap().insert(path.to_string(), route);
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

fn serve(stream: TcpStream, routes: &Mutex<HashMap<String, Route>>) {
    let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).is_err() {
        return;
    }
    loop {
        let mut header = String::new();
        match reader.read_line(&mut header) {
            Ok(0) => break,
            Ok(_) if header == "\r\n" || header == "\n" => break,
            Ok(_) => continue,
            Err(_) => return,
        }
    }
    let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
    let route = routes.lock().unwrap().get(&path).cloned().unwrap_or(Route::Status(404));
    let (head, body) = match route {
        Route::Body(body) => (ok_head(body.len()), body),
        Route::Truncated { declared, body } => (ok_head(declared), body),
        Route::Redirect(to) => (
            format!(
                "HTTP/1.1 302 Found\r\nLocation: {to}\r\nContent-Length: 0\r\n\
                 Connection: close\r\n\r\n"
            ),
            Vec::new(),
        ),
        Route::Status(code) => (
            format!(
                "HTTP/1.1 {code} Fixture\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            ),
            Vec::new(),
        ),
    };
    let mut stream = stream;
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(&body);
    let _ = stream.flush();
}

fn ok_head(content_length: usize) -> String {
    format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\n\
         Content-Length: {content_length}\r\nConnection: close\r\n\r\n"
    )
}

/// A stand-in release binary: a shell script printing its arguments.
pub fn script(label: &str, exit_code: i32) -> Vec<u8> {
    format!("#!/bin/sh\necho \"{label}: $*\"\nexit {exit_code}\n").into_bytes()
}

/// Installer command isolated to `home` with bash as the user's shell.
#[allow(deprecated)]
pub fn installer(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("quicktool-install").expect("installer binary");
    cmd.env("HOME", home).env("SHELL", "/bin/bash");
    for var in [
        "QUICKTOOL_INSTALL_CONFIG",
        "QUICKTOOL_INSTALL_HOME",
        "QUICKTOOL_INSTALL_URL",
        "QUICKTOOL_INSTALL_VERSION",
        "QUICKTOOL_INSTALL_SHA256",
        "QUICKTOOL_INSTALL_SHELL",
        "QUICKTOOL_INSTALL_LOG",
        "HTTP_PROXY",
        "http_proxy",
        "HTTPS_PROXY",
        "https_proxy",
        "ALL_PROXY",
        "all_proxy",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

pub fn export_lines(profile: &Path) -> usize {
    std::fs::read_to_string(profile)
        .map(|c| c.matches(EXPORT_LINE).count())
        .unwrap_or(0)
}
