//! vizd - rendering host daemon for the cross-modal plasticity dashboard
//!
//! Holds one dashboard (region catalog, selection, pathway state, controls)
//! and serves scene / info requests to UI clients over a line protocol.
//!
//! Config location:
//! - Linux: ~/.local/share/plasticity_viz/config.json
//! - Windows: %APPDATA%\plasticity_viz\config.json
//! - MacOS: ~/Library/Application Support/plasticity_viz/config.json

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use plasticity_viz::dashboard::Dashboard;
use plasticity_viz::prng::Prng;
use plasticity_viz::protocol::{
    handle_read_request, handle_request, parse_request, Request, Response,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;
use tokio::time;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod paths;

use config::DaemonConfig;
use paths::AppPaths;

// ═══════════════════════════════════════════════════════════════════════════
// Client Handler
// ═══════════════════════════════════════════════════════════════════════════

/// Longest request line accepted, newline included.
const MAX_LINE: u64 = 64 * 1024;

async fn write_response(writer: &mut OwnedWriteHalf, response: &Response) -> io::Result<()> {
    writer.write_all(response.to_line()?.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

/// Drop the remainder of an over-long line, up to and including its newline.
async fn discard_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> io::Result<()> {
    loop {
        let (used, done) = {
            let chunk = reader.fill_buf().await?;
            if chunk.is_empty() {
                return Ok(());
            }
            match chunk.iter().position(|&b| b == b'\n') {
                Some(i) => (i + 1, true),
                None => (chunk.len(), false),
            }
        };
        reader.consume(used);
        if done {
            return Ok(());
        }
    }
}

/// Serve one connection until EOF. Returns `true` once a `Shutdown` request
/// has been acknowledged.
async fn handle_client(stream: TcpStream, state: Arc<RwLock<Dashboard>>) -> io::Result<bool> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = (&mut reader).take(MAX_LINE).read_until(b'\n', &mut buf).await?;
        if n == 0 {
            return Ok(false);
        }
        if buf.last() != Some(&b'\n') && n as u64 == MAX_LINE {
            discard_line(&mut reader).await?;
            let message = format!("Invalid request: line exceeds {} bytes", MAX_LINE);
            write_response(&mut writer, &Response::error(message)).await?;
            continue;
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(_) => {
                write_response(&mut writer, &Response::error("Invalid request: not UTF-8")).await?;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        let request = match parse_request(line) {
            Ok(req) => req,
            Err(message) => {
                write_response(&mut writer, &Response::Error { message }).await?;
                continue;
            }
        };
        debug!(?request, "request");

        let shutdown = matches!(request, Request::Shutdown);
        let response = if request.is_read_only() {
            let d = state.read().await;
            handle_read_request(&d, &request)
        } else {
            None
        };
        let response = match response {
            Some(r) => r,
            None => {
                let mut d = state.write().await;
                handle_request(&mut d, request)
            }
        };

        write_response(&mut writer, &response).await?;

        if shutdown {
            return Ok(true);
        }
    }
}

struct Args {
    config: Option<PathBuf>,
    addr: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        addr: None,
    };
    let mut it = std::env::args().skip(1);
    while let Some(flag) = it.next() {
        match flag.as_str() {
            "--config" => {
                args.config = Some(it.next().ok_or("--config needs a path")?.into());
            }
            "--addr" => {
                args.addr = Some(it.next().ok_or("--addr needs host:port")?);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(args)
}

// ═══════════════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = parse_args()?;

    let config_path = match args.config {
        Some(p) => p,
        None => {
            let paths = AppPaths::new()?;
            info!("Data directory: {:?}", paths.data_dir());
            paths.config_file()
        }
    };
    let mut cfg = DaemonConfig::load_or_default(&config_path);
    if let Some(addr) = args.addr {
        cfg.listen_addr = addr;
    }

    let catalog = cfg.catalog()?;
    info!("Region catalog ready: {} regions", catalog.len());
    let rng = match cfg.seed {
        Some(seed) => Prng::new(seed),
        None => Prng::from_entropy(),
    };
    let dashboard = Dashboard::new(catalog, rng)
        .with_selection(cfg.default_selection.clone())
        .with_simulate_intensity(cfg.simulate_intensity);
    let state = Arc::new(RwLock::new(dashboard));

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C: exiting");
            std::process::exit(0);
        }
    });

    let listener = TcpListener::bind(&cfg.listen_addr).await?;
    info!("vizd listening on {}", cfg.listen_addr);

    // Accept client connections
    loop {
        let (stream, addr) = listener.accept().await?;
        info!("Client connected: {}", addr);
        let state_clone = Arc::clone(&state);

        tokio::spawn(async move {
            match handle_client(stream, state_clone).await {
                Ok(true) => {
                    info!("Shutdown requested");
                    // Give the response a moment to flush before exiting.
                    time::sleep(Duration::from_millis(50)).await;
                    std::process::exit(0);
                }
                Ok(false) => debug!("Client disconnected: {}", addr),
                Err(e) => error!("Client handler error: {}", e),
            }
        });
    }
}
