use ping_scout::{
    resolver, whois_lookup, GenericError, PortState, PortSweep, ProbeConfig, ProbeSession, SweepConfig, Ttl,
    WhoisConfig,
};
use std::net::IpAddr;
use std::time::Duration;

#[derive(argh::FromArgs)]
/// ping-scout - send ICMP ECHO_REQUEST to a host and optionally look it up and sweep its ports
struct Args {
    #[argh(option, short = 'c', default = "4")]
    /// number of packets to send (default: 4)
    count: u16,

    #[argh(option, short = 't', default = "1.0")]
    /// timeout in seconds (default: 1)
    timeout: f64,

    #[argh(option, short = 's', default = "32")]
    /// payload size in bytes (default: 32)
    size: usize,

    #[argh(option, short = 'T')]
    /// time to live (default: system default)
    ttl: Option<u8>,

    #[argh(option, short = 'i', default = "1.0")]
    /// interval between packets in seconds (default: 1)
    interval: f64,

    #[argh(switch, short = 'w')]
    /// perform WHOIS lookup
    whois: bool,

    #[argh(switch, short = 'n')]
    /// perform NSLookup
    nslookup: bool,

    #[argh(switch)]
    /// perform port scan
    scan_port: bool,

    #[argh(option, default = "1")]
    /// start port for port scan (default: 1)
    start_port: u16,

    #[argh(option, default = "65535")]
    /// end port for port scan (default: 65535)
    end_port: u16,

    #[argh(option, default = "32")]
    /// concurrent connects during the port scan (default: 32)
    workers: usize,

    #[argh(switch, short = 'v')]
    /// log trace output
    verbose: bool,

    #[argh(positional)]
    /// host to ping
    host: String,
}

fn main() -> Result<(), GenericError> {
    let args: Args = argh::from_env();

    let level = if args.verbose { tracing::Level::TRACE } else { tracing::Level::WARN };
    let subscriber = tracing_subscriber::FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = ProbeConfig {
        host: args.host.clone(),
        count: args.count,
        timeout: Duration::try_from_secs_f64(args.timeout)?,
        payload_size: args.size,
        ttl: args.ttl.map(Ttl),
        interval: Duration::try_from_secs_f64(args.interval)?,
    };
    let mut session = ProbeSession::new(config)?;

    println!("\n[*] - Pinging {} [{}] with {} bytes of data:", args.host, session.destination(), args.size);
    let result = session.run(|attempt| println!("{attempt}"));
    let summary = match &result {
        Ok(summary) => summary.clone(),
        Err(abort) => {
            eprintln!("{}", abort.error);
            abort.summary.clone()
        }
    };
    println!("\n[*] - {summary}");
    result?;

    if args.whois {
        match whois_lookup(&WhoisConfig::default(), &args.host) {
            Ok(response) => println!("\n[*] - WHOIS lookup for {}:\n{response}", args.host),
            Err(e) => println!("Error performing WHOIS lookup: {e}"),
        }
    }

    if args.nslookup {
        match resolver::resolve(&args.host) {
            Ok(resolution) => {
                println!("\n[*] - {resolution}");
                if let Some(ipv4) = resolution.primary_ipv4() {
                    match resolver::lookup_addr(IpAddr::V4(ipv4)) {
                        Ok(name) => println!("Reverse name for {ipv4}: {name}"),
                        Err(_) => println!("No reverse name for {ipv4}"),
                    }
                }
            }
            Err(_) => println!("Could not resolve host: {}", args.host),
        }
    }

    if args.scan_port {
        let sweep_config = SweepConfig {
            start_port: args.start_port,
            end_port: args.end_port,
            workers: args.workers,
            ..SweepConfig::default()
        };
        let sweep = PortSweep::new(IpAddr::V4(session.destination()), &sweep_config)?;
        println!(
            "\n[*] - Starting port scan for {} from port {} to {}:",
            args.host, args.start_port, args.end_port
        );
        let probes = sweep.run();
        for probe in &probes {
            println!("{probe}");
        }
        let open_ports: Vec<u16> =
            probes.iter().filter(|probe| probe.state == PortState::Open).map(|probe| probe.port).collect();
        if open_ports.is_empty() {
            println!("\n[*] - No open ports found.");
        } else {
            println!("\n[*] - Open ports:");
            for port in open_ports {
                println!("{port}");
            }
        }
    }

    Ok(())
}
