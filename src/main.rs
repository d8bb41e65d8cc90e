use structopt::StructOpt;

use cryptendpoint::cli::{Cli, Mode};
use cryptendpoint::identity::Identity;
use cryptendpoint::protocol;

fn main() {
    env_logger::init();
    let cli = Cli::from_args();

    let identity = Identity::generate(cli.name.clone(), cli.key_bits);
    log::info!("generated identity '{}' with {}-bit keys", identity.name, cli.key_bits);

    let result = match cli.mode() {
        Mode::Server => protocol::run_server(&cli.addr, identity),
        Mode::Client => protocol::run_client(&cli.addr, identity),
    };

    if let Err(e) = result {
        log::error!("session ended with error: {e}");
        std::process::exit(1);
    }
}
