use std::env;
use std::path::PathBuf;

use bucket_listing::AppConfig;

fn print_usage() {
    eprintln!("Usage: bucket-listing [MODE] [OPTIONS]");
    eprintln!();
    eprintln!("Modes:");
    eprintln!("  (default)           Print the collapsed directory tree");
    eprintln!("  --all               Print the tree with every directory expanded");
    eprintln!("  --search <QUERY>    Print files whose path contains QUERY");
    eprintln!("  --recent            Print recently modified files");
    eprintln!("  --serve             Serve the listing in a browser");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bucket <NAME>     Bucket to list (env: BUCKET_LISTING_BUCKET)");
    eprintln!("  --region <REGION>   Bucket region (env: BUCKET_LISTING_REGION, default: us-west-2)");
    eprintln!("  --endpoint <URL>    Listing endpoint, overriding bucket and region");
    eprintln!("  --config <FILE>     Config file (default: <config dir>/bucket-listing/config.toml)");
    eprintln!("  --host <HOST>       Server bind address (default: 127.0.0.1)");
    eprintln!("  --port <PORT>       Server port (default: 8080)");
    eprintln!("  -h, --help          Show this help");
}

#[derive(Default)]
struct Args {
    bucket: Option<String>,
    region: Option<String>,
    endpoint: Option<String>,
    config: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    search: Option<String>,
    serve: bool,
    recent: bool,
    all: bool,
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    eprintln!("Run 'bucket-listing --help' for usage.");
    std::process::exit(1);
}

fn value(args: &[String], i: &mut usize, flag: &str) -> String {
    *i += 1;
    match args.get(*i) {
        Some(v) => v.clone(),
        None => fail(&format!("{flag} requires a value")),
    }
}

fn parse_args(args: &[String]) -> Args {
    let mut parsed = Args::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--bucket" => parsed.bucket = Some(value(args, &mut i, "--bucket")),
            "--region" => parsed.region = Some(value(args, &mut i, "--region")),
            "--endpoint" => parsed.endpoint = Some(value(args, &mut i, "--endpoint")),
            "--config" => parsed.config = Some(PathBuf::from(value(args, &mut i, "--config"))),
            "--host" => parsed.host = Some(value(args, &mut i, "--host")),
            "--port" => {
                let port = value(args, &mut i, "--port");
                match port.parse() {
                    Ok(p) => parsed.port = Some(p),
                    Err(_) => fail(&format!("invalid port: {port}")),
                }
            }
            "--search" => parsed.search = Some(value(args, &mut i, "--search")),
            "--serve" => parsed.serve = true,
            "--recent" => parsed.recent = true,
            "--all" => parsed.all = true,
            "-h" | "--help" => {
                print_usage();
                std::process::exit(0);
            }
            other => fail(&format!("unknown argument: {other}")),
        }
        i += 1;
    }
    parsed
}

fn apply_args(config: &mut AppConfig, args: &mut Args) {
    if let Some(bucket) = args.bucket.take() {
        config.listing.bucket = bucket;
    }
    if let Some(region) = args.region.take() {
        config.listing.region = region;
    }
    if let Some(endpoint) = args.endpoint.take() {
        config.listing.endpoint = Some(endpoint);
    }
    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
}

#[tokio::main]
async fn main() -> bucket_listing::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let mut args = parse_args(&raw);

    let mut config = AppConfig::load(args.config.as_deref())?;
    apply_args(&mut config, &mut args);

    if args.serve {
        #[cfg(feature = "web")]
        {
            bucket_listing::server::run(config).await
        }
        #[cfg(not(feature = "web"))]
        {
            let _ = config;
            eprintln!("Web support not compiled in");
            std::process::exit(1);
        }
    } else {
        #[cfg(feature = "cli")]
        {
            use bucket_listing::cli::Mode;

            let mode = match args.search.take() {
                Some(query) => Mode::Search(query),
                None if args.recent => Mode::Recent,
                None => Mode::Tree { all: args.all },
            };
            bucket_listing::cli::run(&config, &mode).await
        }
        #[cfg(not(feature = "cli"))]
        {
            let _ = config;
            eprintln!("CLI support not compiled in");
            std::process::exit(1);
        }
    }
}
