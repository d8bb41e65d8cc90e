//! Command-line interface: which role to play, what name to present, and how
//! large a keypair to mint.

use structopt::StructOpt;

/// A self-signed two-party secure chat endpoint.
#[derive(Debug, StructOpt)]
#[structopt(name = "cryptendpoint")]
pub struct Cli {
    /// Bind and wait for a single incoming connection.
    #[structopt(long, conflicts_with = "client")]
    pub server: bool,

    /// Connect to a listening peer.
    #[structopt(long, conflicts_with = "server", required_unless = "server")]
    pub client: bool,

    /// The display name presented in this party's certificate.
    #[structopt(long)]
    pub name: String,

    /// Address to bind (server) or dial (client).
    #[structopt(long, default_value = "127.0.0.1:8888")]
    pub addr: String,

    /// Bit length of each generated key (RSA modulus / ElGamal prime).
    #[structopt(long, default_value = "512")]
    pub key_bits: u64,
}

/// The role this process plays in the session, derived from the mutually
/// exclusive `--server`/`--client` flags.
#[derive(Debug, PartialEq, Eq)]
pub enum Mode {
    Server,
    Client,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.server {
            Mode::Server
        } else {
            Mode::Client
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_server_mode() {
        let cli = Cli::from_iter(["cryptendpoint", "--server", "--name", "alice"]);
        assert_eq!(cli.mode(), Mode::Server);
        assert_eq!(cli.name, "alice");
        assert_eq!(cli.addr, "127.0.0.1:8888");
        assert_eq!(cli.key_bits, 512);
    }

    #[test]
    fn parses_client_mode_with_overrides() {
        let cli = Cli::from_iter([
            "cryptendpoint",
            "--client",
            "--name",
            "bob",
            "--addr",
            "10.0.0.1:9999",
            "--key-bits",
            "256",
        ]);
        assert_eq!(cli.mode(), Mode::Client);
        assert_eq!(cli.addr, "10.0.0.1:9999");
        assert_eq!(cli.key_bits, 256);
    }
}
