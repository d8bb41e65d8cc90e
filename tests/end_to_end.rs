use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::thread;

use cryptendpoint::certificate::Certificate;
use cryptendpoint::envelope::Envelope;
use cryptendpoint::identity::{Identity, PeerIdentity};

const TEST_KEY_BITS: u64 = 64;

fn handshake_pair() -> (TcpStream, TcpStream, Identity, Identity) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    let client_thread = thread::spawn(move || TcpStream::connect(addr).unwrap());
    let (server_stream, _) = listener.accept().unwrap();
    let client_stream = client_thread.join().unwrap();

    let server_identity = Identity::generate("server", TEST_KEY_BITS);
    let client_identity = Identity::generate("client", TEST_KEY_BITS);

    (server_stream, client_stream, server_identity, client_identity)
}

#[test]
fn two_parties_exchange_certificates_and_verify_each_other() {
    let (mut server_stream, mut client_stream, server_identity, client_identity) = handshake_pair();

    let server_thread = thread::spawn(move || {
        let cert = Certificate::from_identity(&server_identity);
        cert.send(&mut server_stream).unwrap();
        Certificate::receive(&mut server_stream).unwrap()
    });

    let client_cert = Certificate::from_identity(&client_identity);
    client_cert.send(&mut client_stream).unwrap();
    let received_from_server = Certificate::receive(&mut client_stream).unwrap();
    let received_from_client = server_thread.join().unwrap();

    assert!(received_from_server.verify());
    assert!(received_from_client.verify());
    assert_eq!(received_from_server.name, "server");
    assert_eq!(received_from_client.name, "client");
}

#[test]
fn full_handshake_then_one_message_each_direction() {
    let (mut server_stream, mut client_stream, server_identity, client_identity) = handshake_pair();

    let server_cert = Certificate::from_identity(&server_identity);
    let client_cert = Certificate::from_identity(&client_identity);

    let server_thread = thread::spawn(move || {
        server_cert.send(&mut server_stream).unwrap();
        let peer_cert = Certificate::receive(&mut server_stream).unwrap();
        assert!(peer_cert.verify());
        let peer = PeerIdentity::from_certificate(&peer_cert);

        let outgoing = Envelope::wrap(b"hello from server", &peer.rsa).unwrap();
        outgoing.send(&mut server_stream).unwrap();

        let incoming = Envelope::receive(&mut server_stream).unwrap();
        incoming.unwrap(&server_identity.rsa).unwrap()
    });

    client_cert.send(&mut client_stream).unwrap();
    let peer_cert = Certificate::receive(&mut client_stream).unwrap();
    assert!(peer_cert.verify());
    let peer = PeerIdentity::from_certificate(&peer_cert);

    let incoming = Envelope::receive(&mut client_stream).unwrap();
    let from_server = incoming.unwrap(&client_identity.rsa).unwrap();
    assert_eq!(from_server, b"hello from server");

    let outgoing = Envelope::wrap(b"hello from client", &peer.rsa).unwrap();
    outgoing.send(&mut client_stream).unwrap();

    let from_client = server_thread.join().unwrap();
    assert_eq!(from_client, b"hello from client");
}

#[test]
fn multiple_envelopes_in_sequence_on_one_stream() {
    let (mut server_stream, mut client_stream, server_identity, _client_identity) = handshake_pair();
    let public = server_identity.rsa.public();

    let writer_thread = thread::spawn(move || {
        for i in 0..5 {
            let text = format!("message {i}");
            let envelope = Envelope::wrap(text.as_bytes(), &public).unwrap();
            envelope.send(&mut client_stream).unwrap();
        }
    });

    for i in 0..5 {
        let envelope = Envelope::receive(&mut server_stream).unwrap();
        let plaintext = envelope.unwrap(&server_identity.rsa).unwrap();
        assert_eq!(plaintext, format!("message {i}").as_bytes());
    }
    writer_thread.join().unwrap();
}

/// Simulates the stdin-driven writer loop against an in-memory buffer instead
/// of a real terminal, confirming the `exit` sentinel stops processing
/// before any further line is wrapped.
#[test]
fn exit_sentinel_stops_before_trailing_lines() {
    use cryptendpoint::protocol::EXIT_COMMAND;

    let input = format!("first line\n{EXIT_COMMAND}\nshould not be sent\n");
    let reader = BufReader::new(input.as_bytes());

    let mut sent = Vec::new();
    for line in reader.lines() {
        let line = line.unwrap();
        if line.trim() == EXIT_COMMAND {
            break;
        }
        sent.push(line);
    }

    assert_eq!(sent, vec!["first line".to_string()]);
}

#[test]
fn certificate_round_trips_through_a_tempfile_backed_stream() {
    let identity = Identity::generate("file-party", TEST_KEY_BITS);
    let cert = Certificate::from_identity(&identity);

    let mut file = tempfile::tempfile().unwrap();
    cert.send(&mut file).unwrap();
    file.flush().unwrap();

    use std::io::Seek;
    file.seek(std::io::SeekFrom::Start(0)).unwrap();

    let recovered = Certificate::receive(&mut file).unwrap();
    assert_eq!(recovered, cert);
    assert!(recovered.verify());
}
