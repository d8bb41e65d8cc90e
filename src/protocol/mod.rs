//! The handshake and message-exchange loop that ties identity, certificate,
//! and envelope together into a two-party chat session over TCP.
//!
//! Each side runs the same three phases: exchange and verify certificates,
//! then split into a writer (reads stdin, wraps and sends) and a reader
//! (receives and unwraps) running on their own OS threads against a shared
//! [`TcpStream`] clone. A shared `Arc<AtomicBool>` tells both threads to stop
//! once the writer sees the `exit` sentinel on stdin.

use std::io::{self, BufRead, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use log::{info, warn};

use crate::certificate::Certificate;
use crate::envelope::Envelope;
use crate::error::ProtocolError;
use crate::identity::{Identity, PeerIdentity};

/// The exit sentinel a user types on stdin to end the session cleanly.
pub const EXIT_COMMAND: &str = "exit";

/// Runs as the listening side: binds `addr`, accepts one connection, then
/// runs the shared handshake and message loop.
pub fn run_server(addr: &str, local: Identity) -> Result<(), ProtocolError> {
    let listener = TcpListener::bind(addr)?;
    info!("listening on {addr}");
    let (stream, peer_addr) = listener.accept()?;
    info!("accepted connection from {peer_addr}");
    run_session(stream, local)
}

/// Runs as the connecting side: dials `addr`, then runs the shared handshake
/// and message loop.
pub fn run_client(addr: &str, local: Identity) -> Result<(), ProtocolError> {
    let stream = TcpStream::connect(addr)?;
    info!("connected to {addr}");
    run_session(stream, local)
}

fn run_session(mut stream: TcpStream, local: Identity) -> Result<(), ProtocolError> {
    let peer = handshake(&mut stream, &local)?;
    info!("handshake complete with peer '{}'", peer.name);
    message_loop(stream, local, peer)
}

/// Exchanges self-signed certificates with the peer and verifies the one
/// received. Both sides send first, then receive, to avoid a deadlock where
/// each waits on the other.
fn handshake(stream: &mut TcpStream, local: &Identity) -> Result<PeerIdentity, ProtocolError> {
    let local_cert = Certificate::from_identity(local);
    local_cert.send(stream)?;

    let peer_cert = Certificate::receive(stream)?;
    if !peer_cert.verify() {
        warn!("peer certificate for '{}' failed to verify", peer_cert.name);
        return Err(ProtocolError::HandshakeFailed);
    }

    Ok(PeerIdentity::from_certificate(&peer_cert))
}

/// Spawns a reader thread and runs the writer loop on the calling thread
/// until the `exit` sentinel or a transport error ends the session.
fn message_loop(stream: TcpStream, local: Identity, peer: PeerIdentity) -> Result<(), ProtocolError> {
    let running = Arc::new(AtomicBool::new(true));
    let reader_stream = stream.try_clone()?;
    let reader_running = running.clone();
    let peer_name = peer.name.clone();

    let reader = thread::spawn(move || reader_loop(reader_stream, local.rsa, peer_name, reader_running));

    let result = writer_loop(stream.try_clone()?, peer.rsa, running.clone());
    running.store(false, Ordering::SeqCst);
    // The reader is blocked in `Envelope::receive`; shutting down the socket
    // unblocks it so the thread can observe `running` and exit.
    let _ = stream.shutdown(std::net::Shutdown::Both);
    let _ = reader.join();

    result
}

fn writer_loop(
    mut stream: TcpStream,
    peer_rsa: crate::pke::rsa::RsaPublicKey,
    running: Arc<AtomicBool>,
) -> Result<(), ProtocolError> {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim() == EXIT_COMMAND {
            running.store(false, Ordering::SeqCst);
            let _ = stream.shutdown(std::net::Shutdown::Both);
            break;
        }
        let envelope = Envelope::wrap(line.as_bytes(), &peer_rsa)?;
        envelope.send(&mut stream)?;
    }
    Ok(())
}

fn reader_loop(
    mut stream: TcpStream,
    local_rsa: crate::pke::rsa::RsaKeyPair,
    peer_name: String,
    running: Arc<AtomicBool>,
) {
    while running.load(Ordering::SeqCst) {
        match Envelope::receive(&mut stream) {
            Ok(envelope) => match envelope.unwrap(&local_rsa) {
                Ok(plaintext) => {
                    let text = String::from_utf8_lossy(&plaintext);
                    let now = chrono::Local::now().format("%H:%M:%S");
                    println!("[{now}] {peer_name}: {text}");
                    let _ = io::stdout().flush();
                }
                Err(e) => warn!("failed to unwrap envelope from '{peer_name}': {e}"),
            },
            Err(_) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use std::net::TcpListener;

    #[test]
    fn handshake_succeeds_between_two_valid_identities() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server_thread = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let local = Identity::generate("server", 64);
            handshake(&mut stream, &local).unwrap()
        });

        let mut client_stream = TcpStream::connect(addr).unwrap();
        let client_identity = Identity::generate("client", 64);
        let client_peer = handshake(&mut client_stream, &client_identity).unwrap();
        let server_peer = server_thread.join().unwrap();

        assert_eq!(client_peer.name, "server");
        assert_eq!(server_peer.name, "client");
    }

    #[test]
    fn handshake_rejects_forged_certificate() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server_thread = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut forged = Certificate::from_identity(&Identity::generate("server", 64));
            forged.name = "not-server".to_string();
            forged.send(&mut stream).unwrap();
            let _ = Certificate::receive(&mut stream);
        });

        let mut client_stream = TcpStream::connect(addr).unwrap();
        let client_identity = Identity::generate("client", 64);
        let result = handshake(&mut client_stream, &client_identity);
        server_thread.join().unwrap();

        assert!(matches!(result, Err(ProtocolError::HandshakeFailed)));
    }
}
