use std::net::IpAddr;

use clap::Parser;

use users_api::config::ServerConfig;

#[derive(Parser, Debug)]
#[command(version, about = "HTTP API over an existing Postgres users table")]
pub struct Args {
    /// The address the server should listen on. By default it listens
    /// just on the IPv4 loopback.
    #[arg(short, long)]
    address: Option<IpAddr>,

    /// The port the server listens on.
    #[arg(short, long)]
    port: Option<u16>,
}

impl Args {
    /// Fold command line overrides into the environment-derived settings.
    pub fn apply(&self, server: &mut ServerConfig) {
        if let Some(address) = self.address {
            server.address = address;
        }
        if let Some(port) = self.port {
            server.port = port;
        }
    }
}
