//! CLI client for the `vizd` daemon.
//!
//! Examples:
//!   viz-cli state
//!   viz-cli select v1,a1,thalamus
//!   viz-cli pathway established
//!   viz-cli simulate 0.9
//!   viz-cli scene > figure.json
//!
//! By default it talks to 127.0.0.1:8050; override with `--addr host:port`.

use std::io::{BufRead, BufReader, Write};
use std::net::TcpStream;
use std::process;
use std::time::Duration;

use plasticity_viz::controls::EncodingStrategy;
use plasticity_viz::pathways::PathwayState;
use plasticity_viz::protocol::Request;
use serde_json::Value;

fn usage() -> ! {
    eprintln!("viz-cli (talks to vizd @ 127.0.0.1:8050 by default)");
    eprintln!("Usage: viz-cli [--addr host:port] <command> [args]\n");
    eprintln!("Commands:");
    eprintln!("  state                         Show selection, pathway state and activation");
    eprintln!("  scene                         Print the current figure as JSON");
    eprintln!("  info                          Show the information panel text");
    eprintln!("  select <id,id,...>            Change the region selection");
    eprintln!("  pathway <normal|early|established|advanced>");
    eprintln!("  simulate [intensity]          Simulate an auditory stimulus (0-1)");
    eprintln!("  reset                         Reset all activation to zero");
    eprintln!("  activate <region> <level>     Set one region's activation (0-1)");
    eprintln!("  preview <region> <level>      Force one region's level and print it alone as JSON");
    eprintln!("  controls                      Show auditory parameters");
    eprintln!("  f0 <220-880> | alpha <0.1-2> | beta <0.1-2> | encoding <name>");
    eprintln!("  shutdown                      Stop the daemon");
    process::exit(1);
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        usage();
    }

    let mut addr = "127.0.0.1:8050".to_string();
    if args.len() >= 2 && args[0] == "--addr" {
        addr = args[1].clone();
        args.drain(0..2);
    }

    if args.is_empty() {
        usage();
    }

    (addr, args)
}

fn send_request(addr: &str, req: &Request) -> Result<Value, String> {
    let mut stream = TcpStream::connect(addr).map_err(|e| format!("connect: {e}"))?;
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .map_err(|e| format!("set_read_timeout: {e}"))?;
    let mut reader = BufReader::new(stream.try_clone().map_err(|e| format!("clone: {e}"))?);

    let line = serde_json::to_string(req).map_err(|e| format!("serialize: {e}"))?;
    stream
        .write_all(line.as_bytes())
        .and_then(|_| stream.write_all(b"\n"))
        .map_err(|e| format!("send: {e}"))?;

    let mut resp_line = String::new();
    reader
        .read_line(&mut resp_line)
        .map_err(|e| format!("recv: {e}"))?;
    serde_json::from_str(&resp_line).map_err(|e| format!("parse response: {e}"))
}

fn print_state(v: &Value) {
    let selection: Vec<&str> = v["selection"]
        .as_array()
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    println!(
        "selection=[{}] pathway={} simulate_intensity={:.2}",
        selection.join(","),
        v["pathway_state"].as_str().unwrap_or("?"),
        v["simulate_intensity"].as_f64().unwrap_or(0.0),
    );
    if let Some(levels) = v["activation"].as_array() {
        for a in levels {
            println!(
                "  {:<12} {:.3}  {}",
                a["id"].as_str().unwrap_or("?"),
                a["level"].as_f64().unwrap_or(0.0),
                a["name"].as_str().unwrap_or(""),
            );
        }
    }
    print_controls(&v["controls"]);
}

fn print_controls(c: &Value) {
    println!(
        "controls: f0={}Hz alpha={} beta={} encoding={}",
        c["f0_hz"], c["alpha"], c["beta"], c["encoding"].as_str().unwrap_or("?"),
    );
}

fn make_error(msg: &str) -> ! {
    eprintln!("{}", msg);
    process::exit(1);
}

fn arg(args: &[String], i: usize) -> &str {
    match args.get(i) {
        Some(a) => a.as_str(),
        None => usage(),
    }
}

fn number(args: &[String], i: usize, what: &str) -> f64 {
    arg(args, i)
        .parse()
        .unwrap_or_else(|_| make_error(&format!("{what} must be a number")))
}

fn main() {
    let (addr, args) = parse_args();
    let cmd = &args[0];

    let req = match cmd.as_str() {
        "state" => Request::GetState,
        "scene" => Request::GetScene,
        "info" => Request::GetInfo,
        "controls" => Request::GetControls,
        "reset" => Request::Reset,
        "shutdown" => Request::Shutdown,
        "select" => Request::SelectRegions {
            ids: arg(&args, 1)
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        },
        "pathway" => Request::SetPathwayState {
            state: arg(&args, 1)
                .parse::<PathwayState>()
                .unwrap_or_else(|e| make_error(&e)),
        },
        "simulate" => Request::Simulate {
            intensity: args.get(1).map(|_| number(&args, 1, "intensity")),
        },
        "activate" => Request::SetActivation {
            region: arg(&args, 1).to_string(),
            level: number(&args, 2, "level"),
        },
        "preview" => Request::PreviewRegion {
            region: arg(&args, 1).to_string(),
            level: number(&args, 2, "level"),
        },
        "f0" | "alpha" | "beta" => {
            let v = Some(number(&args, 1, cmd));
            Request::SetControls {
                f0_hz: v.filter(|_| cmd == "f0"),
                alpha: v.filter(|_| cmd == "alpha"),
                beta: v.filter(|_| cmd == "beta"),
                encoding: None,
            }
        }
        "encoding" => {
            let name = arg(&args, 1);
            let encoding = EncodingStrategy::all()
                .iter()
                .copied()
                .find(|e| e.label() == name)
                .unwrap_or_else(|| {
                    make_error("encoding must be spatial-freq|freq-amp|temporal|spectral|hybrid")
                });
            Request::SetControls {
                f0_hz: None,
                alpha: None,
                beta: None,
                encoding: Some(encoding),
            }
        }
        _ => usage(),
    };

    match send_request(&addr, &req) {
        Ok(v) => match v["type"].as_str() {
            Some("State") => print_state(&v),
            Some("Controls") => print_controls(&v),
            Some("Info") => {
                println!("{}", v["title"].as_str().unwrap_or(""));
                println!("{}", v["body"].as_str().unwrap_or(""));
            }
            Some("Scene") => {
                let figure = serde_json::json!({ "data": v["data"], "layout": v["layout"] });
                println!("{figure}");
            }
            Some("Success") => println!("{}", v["message"].as_str().unwrap_or("")),
            Some("Error") => {
                eprintln!("Error: {}", v["message"].as_str().unwrap_or("unknown"));
                process::exit(1);
            }
            _ => {
                eprintln!("Unexpected response: {v}");
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("Failed: {e}");
            process::exit(1);
        }
    }
}
