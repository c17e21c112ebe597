//! Shared fixtures for the integration tests: a throwaway HTTP server, listing pages and a
//! fake extractor.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;

use catalauncher::builds::{BuildsClient, Extractor};
use catalauncher::{Config, Launcher};

/// Canned response for one path
#[derive(Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// Send `Content-Length`; without it the body runs until the connection closes
    pub sized: bool,
}

/// Serves fixed responses over HTTP/1.1 on a random local port
pub struct TestServer {
    base: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub fn start(routes: Vec<(&str, Route)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test server");
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes: HashMap<String, Route> = routes
            .into_iter()
            .map(|(path, route)| (path.to_string(), route))
            .collect();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let _ = respond(stream, &routes, &seen);
            }
        });

        Self { base, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.as_str() == path)
            .count()
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn respond(
    stream: TcpStream,
    routes: &HashMap<String, Route>,
    seen: &Mutex<Vec<String>>,
) -> std::io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;
    loop {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 || header == "\r\n" {
            break;
        }
    }

    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();
    seen.lock().unwrap().push(path.clone());

    let route = routes.get(&path).cloned().unwrap_or(Route {
        status: 404,
        body: b"not found".to_vec(),
        sized: true,
    });
    let reason = match route.status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    };

    let mut stream = stream;
    write!(stream, "HTTP/1.1 {} {}\r\n", route.status, reason)?;
    if route.sized {
        write!(stream, "Content-Length: {}\r\n", route.body.len())?;
    }
    write!(
        stream,
        "Content-Type: application/octet-stream\r\nConnection: close\r\n\r\n"
    )?;
    stream.write_all(&route.body)?;
    stream.flush()
}

pub fn ok(body: impl Into<Vec<u8>>) -> Route {
    Route {
        status: 200,
        body: body.into(),
        sized: true,
    }
}

/// A 200 response that does not announce its length
pub fn ok_unsized(body: impl Into<Vec<u8>>) -> Route {
    Route {
        sized: false,
        ..ok(body)
    }
}

pub fn status(code: u16) -> Route {
    Route {
        status: code,
        body: Vec::new(),
        sized: true,
    }
}

/// An address nothing is listening on
pub fn closed_port_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind throwaway port");
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}{}", addr, path)
}

pub fn archive_name(build: u32) -> String {
    format!("cataclysmdda-0.E-{}.tar.gz", build)
}

/// An nginx-style autoindex page listing `(build, upload time)` pairs
pub fn listing(builds: &[(u32, &str)]) -> String {
    let mut html = String::from(
        "<html>\r\n<head><title>Index of /builds/</title></head>\r\n<body>\r\n\
         <h1>Index of /builds/</h1><hr><pre><a href=\"../\">../</a>\r\n",
    );
    for (build, uploaded) in builds {
        let name = archive_name(*build);
        html.push_str(&format!(
            "<a href=\"{0}\">{0}</a>                        {1}            44M\r\n",
            name, uploaded
        ));
    }
    html.push_str("</pre><hr></body>\r\n</html>\r\n");
    html
}

/// Pretends to unpack by creating `cataclysmdda-0.E/` with a marker file
#[derive(Default)]
pub struct FakeExtractor {
    pub archives: RefCell<Vec<PathBuf>>,
}

impl FakeExtractor {
    pub fn calls(&self) -> usize {
        self.archives.borrow().len()
    }
}

impl Extractor for FakeExtractor {
    fn extract(&self, archive: &Path, target: &Path) -> catalauncher::Result<()> {
        let game = target.join("cataclysmdda-0.E");
        fs::create_dir_all(game.join("data")).unwrap();
        fs::write(
            game.join("ARCHIVE"),
            archive.file_name().unwrap().to_string_lossy().as_bytes(),
        )
        .unwrap();
        self.archives.borrow_mut().push(archive.to_path_buf());
        Ok(())
    }
}

pub fn config(server: &TestServer, root: &Path) -> Config {
    Config {
        root: Some(root.to_path_buf()),
        listing_uri: server.url("/builds/"),
        extras_repo: String::new(),
        ..Config::default()
    }
}

pub fn client() -> BuildsClient {
    BuildsClient::from_client(
        reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .unwrap(),
    )
}

pub fn launcher<E: Extractor>(server: &TestServer, root: &Path, extractor: E) -> Launcher<E> {
    Launcher::from_parts(config(server, root), client(), extractor).unwrap()
}

/// Create `builds/<n>/cataclysmdda-0.E` as if the build had been installed earlier
pub fn install_local(root: &Path, build: u32) -> PathBuf {
    let game = root
        .join("builds")
        .join(build.to_string())
        .join("cataclysmdda-0.E");
    fs::create_dir_all(&game).unwrap();
    game
}
