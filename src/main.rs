use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use rustyrtc::config::Config;
use rustyrtc::log::logger::Logger;
use rustyrtc::pc::config::PeerConnectionConfig;
use rustyrtc::pc::data_channel::DataChannelInit;
use rustyrtc::pc::error::OrchestratorError;
use rustyrtc::pc::peer_connection::{PeerConnection, PeerConnectionEvent};

const CERT_CONFIG_PATH: &str = "config.ini";

/// Drives two in-process `PeerConnection`s through offer/answer and a data
/// channel exchange, the way two tabs on either end of a signalling server
/// would — except here the SDP is handed across a function call instead of
/// relayed through a server. Expects `certs/dtls/{cert,key}.pem` (or the
/// paths named under `[TLS]` in `config.ini`) to already exist on disk.
fn main() -> Result<(), OrchestratorError> {
    let logger = Logger::start_default("rustyrtc-demo", 4096, 256, 1);
    let sink = Arc::new(logger.handle());

    let load_cert_config = || Config::load(CERT_CONFIG_PATH).unwrap_or_else(|_| Config::empty());

    let mut offerer = PeerConnection::with_logger(
        PeerConnectionConfig::default(),
        load_cert_config(),
        sink.clone(),
    )?;
    let mut answerer =
        PeerConnection::with_logger(PeerConnectionConfig::default(), load_cert_config(), sink)?;

    let offer = offerer.create_offer()?;
    offerer.set_local_description(offer.clone())?;
    answerer.set_remote_description(offer)?;

    let answer = answerer.create_answer()?;
    answerer.set_local_description(answer.clone())?;
    offerer.set_remote_description(answer)?;

    let channel = offerer.create_data_channel(DataChannelInit::new("chat"))?;
    println!("opened data channel \"{}\" (id {})", channel.label, channel.id);

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut sent = false;
    while Instant::now() < deadline {
        offerer.poll();
        answerer.poll();

        for event in offerer.events().try_iter().collect::<Vec<_>>() {
            if let PeerConnectionEvent::ConnectionStateChange(state) = event {
                println!("offerer connection state: {state:?}");
            }
        }

        for event in answerer.events().try_iter().collect::<Vec<_>>() {
            match event {
                PeerConnectionEvent::DataChannel(ch) => {
                    println!("answerer received data channel \"{}\"", ch.label);
                }
                PeerConnectionEvent::Message { id, payload } => {
                    println!(
                        "answerer got message on channel {id}: {:?}",
                        String::from_utf8_lossy(&payload)
                    );
                }
                PeerConnectionEvent::ConnectionStateChange(state) => {
                    println!("answerer connection state: {state:?}");
                }
                _ => {}
            }
        }

        if !sent && offerer.send_message(channel.id, b"hello from offerer".to_vec()).is_ok() {
            sent = true;
        }

        thread::sleep(Duration::from_millis(50));
    }

    offerer.close();
    answerer.close();
    Ok(())
}
