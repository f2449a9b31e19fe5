use clap::Parser;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

mod args;
mod config;
mod env_vars;
mod server;

use args::Args;
use cocgate_core::{request_handler, GatewayContext};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Validate arguments
    if let Err(err) = args.validate() {
        eprintln!("❌ Configuration error: {err}");
        std::process::exit(1);
    }

    tracing_subscriber::fmt::init();

    let gateway_config = config::load_from_env();
    server::print_startup_info(&args, &gateway_config);

    let context = Arc::new(GatewayContext::new(gateway_config));

    // Bind to address
    let bind_ip: std::net::IpAddr = args.bind.parse().expect("Invalid bind address");
    let bind_addr = SocketAddr::from((bind_ip, args.listen));
    let listener = match TcpListener::bind(bind_addr).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("❌ Failed to bind to port {}: {}", args.listen, err);
            std::process::exit(1);
        }
    };

    println!("✅ cocgate is running on port {}", args.listen);

    // Accept connections
    loop {
        let (stream, addr) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                eprintln!("⚠️  Failed to accept connection: {err}");
                continue;
            }
        };

        if args.verbose && !args.quiet {
            println!("📡 New connection from {addr}");
        }

        let io = TokioIo::new(stream);
        let context = context.clone();
        let verbose = args.verbose;
        let quiet = args.quiet;

        tokio::task::spawn(async move {
            let service =
                service_fn(move |req| request_handler::handle_request(req, context.clone()));

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                if !quiet {
                    if verbose {
                        eprintln!("⚠️  Connection error from {addr}: {err}");
                    } else {
                        eprintln!("⚠️  Connection error: {err}");
                    }
                }
            }
        });
    }
}
