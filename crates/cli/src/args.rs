use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "tumbler")]
#[command(version)]
#[command(about = "Finds hosts on a /24 that open a guard port after a port-knock sequence", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Knock on every host in a range and report the ones that open up
    Scan {
        /// First address of the range. Example: 192.168.1.10
        #[arg(short, long)]
        start: String,

        /// Last address of the range, same /24 as --start
        #[arg(short, long)]
        end: String,

        /// Knock sequence; the last port is the guard port
        #[arg(short, long, default_value = "13,37,30000,3000,1337")]
        ports: String,

        /// Interface to send knocks on and take the source address from
        #[arg(short, long, default_value = "eth0")]
        iface: String,

        /// Max hosts probed at the same time
        #[arg(short, long, default_value = "256")]
        concurrency: usize,

        /// Pause after each knock, in milliseconds
        #[arg(long, default_value = "100")]
        knock_delay: u64,

        /// Guard port connect timeout in milliseconds
        #[arg(long, default_value = "1000")]
        guard_timeout: u64,

        /// Ethernet destination for knock frames
        #[arg(long, default_value = "ff:ff:ff:ff:ff:ff", value_parser = parse_mac)]
        dest_mac: [u8; 6],

        /// Output format: text, json
        #[arg(short, long, default_value = "text", value_parser = ["text", "json"])]
        output_format: String,
    },
}

/// Parse `aa:bb:cc:dd:ee:ff` (or `-` separated) into raw bytes.
pub fn parse_mac(s: &str) -> Result<[u8; 6], String> {
    let parts: Vec<&str> = s.trim().split(|c| c == ':' || c == '-').collect();
    if parts.len() != 6 {
        return Err(format!("expected 6 octets, got {}", parts.len()));
    }

    let mut mac = [0u8; 6];
    for (slot, part) in mac.iter_mut().zip(&parts) {
        if part.len() != 2 {
            return Err(format!("invalid octet '{}'", part));
        }
        *slot = u8::from_str_radix(part, 16).map_err(|_| format!("invalid octet '{}'", part))?;
    }
    Ok(mac)
}
