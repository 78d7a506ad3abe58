//! Fetch a URL and write the body to standard output.
//!
//! ```sh
//! cargo run --example get -- example.com 80 /index.html
//! ```

use std::io::Write;
use std::process::ExitCode;

use http::Version;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use trickle_http::Session;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let mut args = std::env::args().skip(1);
    let (Some(host), Some(port), Some(target)) = (args.next(), args.next(), args.next()) else {
        eprintln!("usage: get <host> <port> <target> [1.0|1.1]");
        return ExitCode::FAILURE;
    };

    let Ok(port) = port.parse::<u16>() else {
        eprintln!("invalid port: {port}");
        return ExitCode::FAILURE;
    };

    let version = match args.next().as_deref() {
        Some("1.0") => Version::HTTP_10,
        Some("1.1") | None => Version::HTTP_11,
        Some(other) => {
            eprintln!("unsupported version: {other}");
            return ExitCode::FAILURE;
        }
    };

    let session = Session::builder(host, port, target)
        .version(version)
        .on_header(|header| {
            info!(status = %header.status(), version = ?header.version(), "header received");
            for (name, value) in header.headers() {
                info!("  {}: {}", name, String::from_utf8_lossy(value.as_bytes()));
            }
        })
        .on_body_chunk(|chunk| {
            std::io::stdout().write_all(chunk).expect("write to stdout");
        })
        .build();

    match session.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e}", e.phase());
            ExitCode::FAILURE
        }
    }
}
