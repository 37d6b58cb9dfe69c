//! Murmur agent daemon.
//!
//! Joins the configured room, listens to remote participants, and answers
//! every utterance with a spoken "You said: …" reply. Configuration comes
//! from the environment; there is no other CLI surface.

use murmur_voice::{
    run_agent, AgentConfig, HttpSynthesizer, HttpTranscriber, RoomClient, Synthesizer,
    Transcriber,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file if present (before any env::var calls)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[murmur-agent] .env not loaded: {e} (using system environment)");
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env().expect("load AgentConfig");

    let mut room = RoomClient::connect(&config.room, &config.identity)
        .expect("join room");
    let events = room.take_events().expect("room events already taken");
    let mut outbound_rx = room.take_outbound().expect("outbound frames already taken");
    let outbound_tx = room.outbound_sender();
    let room = Arc::new(room);

    let transcriber: Arc<dyn Transcriber> =
        Arc::new(HttpTranscriber::new(&config.speech).expect("build transcriber"));
    let synthesizer: Arc<dyn Synthesizer> =
        Arc::new(HttpSynthesizer::new(&config.speech).expect("build synthesizer"));

    // Hand reply frames to the media bridge as they arrive.
    let publisher_room = Arc::clone(&room);
    tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if let Err(e) = publisher_room.publish_audio(&frame).await {
                tracing::warn!(error = %e, "failed to publish reply audio");
            }
        }
    });

    tracing::info!(
        room = %room.room_name(),
        identity = %room.identity(),
        "murmur agent started"
    );

    tokio::select! {
        res = run_agent(
            config.pipeline.clone(),
            events,
            outbound_tx,
            transcriber,
            synthesizer,
        ) => {
            if let Err(e) = res {
                tracing::error!(error = %e, "agent loop failed");
            } else {
                tracing::info!("room event stream closed; exiting");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("CTRL-C received; shutting down agent");
        }
    }
}
