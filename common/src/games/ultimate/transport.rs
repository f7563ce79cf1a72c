use std::future::Future;

use thiserror::Error;
use tokio::sync::mpsc;

use super::match_controller::{ConnectionState, Role};
use super::types::{Mark, Move};

const LOOPBACK_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    PeerMove(Move),
    RoleAssigned { role: Role, mark: Mark },
    ConnectionStateChanged(ConnectionState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("peer channel is closed")]
    Closed,
}

/// Delivers locally accepted moves to the remote side, in order. Delivery of
/// remote moves comes back as `TransportEvent`s on a separate channel.
pub trait MoveTransport: Send + Sync + 'static {
    fn send_move(&self, mv: Move) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Tells the peer this side went away.
    fn disconnect(&self) -> impl Future<Output = Result<(), TransportError>> + Send;
}

/// One side of an in-process loopback: the transport for outgoing moves and
/// the receiver of everything the peer sends.
pub struct ChannelEndpoint {
    pub transport: ChannelTransport,
    pub events: mpsc::Receiver<TransportEvent>,
}

#[derive(Clone)]
pub struct ChannelTransport {
    peer: mpsc::Sender<TransportEvent>,
}

impl ChannelTransport {
    /// Connects a host and a guest endpoint. Each side starts with its role
    /// and an `Active` connection already queued.
    pub async fn pair() -> Result<(ChannelEndpoint, ChannelEndpoint), TransportError> {
        let (to_host, host_events) = mpsc::channel(LOOPBACK_CAPACITY);
        let (to_guest, guest_events) = mpsc::channel(LOOPBACK_CAPACITY);

        for (inbox, role) in [(&to_host, Role::Host), (&to_guest, Role::Guest)] {
            let greeting = [
                TransportEvent::RoleAssigned {
                    role,
                    mark: role.assigned_mark(),
                },
                TransportEvent::ConnectionStateChanged(ConnectionState::Active),
            ];
            for event in greeting {
                inbox.send(event).await.map_err(|_| TransportError::Closed)?;
            }
        }

        let host = ChannelEndpoint {
            transport: ChannelTransport { peer: to_guest },
            events: host_events,
        };
        let guest = ChannelEndpoint {
            transport: ChannelTransport { peer: to_host },
            events: guest_events,
        };
        Ok((host, guest))
    }
}

impl MoveTransport for ChannelTransport {
    async fn send_move(&self, mv: Move) -> Result<(), TransportError> {
        self.peer
            .send(TransportEvent::PeerMove(mv))
            .await
            .map_err(|_| TransportError::Closed)
    }

    async fn disconnect(&self) -> Result<(), TransportError> {
        self.peer
            .send(TransportEvent::ConnectionStateChanged(ConnectionState::Disconnected))
            .await
            .map_err(|_| TransportError::Closed)
    }
}
