use std::pin::Pin;

use tokio::sync::mpsc;
use tokio::time::Sleep;

use crate::games::GameBroadcaster;
use crate::identifiers::MatchCode;
use crate::log;
use super::bot_controller::calculate_move;
use super::match_controller::{ConnectionState, GameMode, MatchController, MatchSnapshot};
use super::transport::{MoveTransport, TransportEvent};
use super::types::Move;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    RequestMove(Move),
    RequestReset,
    SelectMode(GameMode),
    HostMatch,
    JoinMatch(MatchCode),
    Shutdown,
}

/// Drives one `MatchController` from UI commands, transport events and the
/// bot timer. Everything goes through a single loop so moves are applied
/// one at a time.
pub struct MatchSession<B: GameBroadcaster, T: MoveTransport> {
    controller: MatchController,
    broadcaster: B,
    transport: Option<T>,
    ai_timer: Option<Pin<Box<Sleep>>>,
}

impl<B: GameBroadcaster, T: MoveTransport> MatchSession<B, T> {
    pub fn new(controller: MatchController, broadcaster: B, transport: Option<T>) -> Self {
        Self {
            controller,
            broadcaster,
            transport,
            ai_timer: None,
        }
    }

    /// Runs until `Shutdown` or until every command sender is dropped, and
    /// returns the last published state.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<SessionCommand>,
        mut events: Option<mpsc::Receiver<TransportEvent>>,
    ) -> MatchSnapshot {
        self.publish().await;

        loop {
            self.sync_ai_timer();

            tokio::select! {
                // Commands first, so a host/join issued at startup is in place
                // before the transport's greeting is handled.
                biased;

                command = commands.recv() => {
                    match command {
                        Some(SessionCommand::Shutdown) | None => break,
                        Some(command) => self.handle_command(command).await,
                    }
                }
                event = next_event(&mut events), if events.is_some() => {
                    match event {
                        Some(event) => self.handle_event(event).await,
                        None => {
                            log!("[{}] Transport closed", self.label());
                            events = None;
                        }
                    }
                }
                _ = ai_delay(&mut self.ai_timer), if self.ai_timer.is_some() => {
                    self.ai_timer = None;
                    self.play_ai_turn().await;
                }
            }
        }

        self.notify_peer_of_shutdown().await;
        log!("[{}] Session stopped after {} moves", self.label(), self.controller.state().move_log().len());
        self.controller.snapshot()
    }

    async fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::RequestMove(mv) => self.handle_local_move(mv).await,
            SessionCommand::RequestReset => {
                self.ai_timer = None;
                self.controller.request_reset();
                log!("[{}] Game reset", self.label());
                self.publish().await;
            }
            SessionCommand::SelectMode(mode) => {
                self.ai_timer = None;
                self.controller.select_mode(mode);
                log!("[{}] Mode changed to {:?}", self.label(), mode);
                self.publish().await;
            }
            SessionCommand::HostMatch => {
                self.ai_timer = None;
                let code = self.controller.host_match();
                log!("[{}] Hosting match {}", self.label(), code);
                self.publish().await;
            }
            SessionCommand::JoinMatch(code) => {
                self.ai_timer = None;
                log!("[{}] Joining match {}", self.label(), code);
                self.controller.join_match(code);
                self.publish().await;
            }
            SessionCommand::Shutdown => {}
        }
    }

    async fn handle_local_move(&mut self, mv: Move) {
        let outcome = match self.controller.request_move(mv) {
            Ok(outcome) => outcome,
            Err(e) => {
                log!("[{}] Rejected move {}: {}", self.label(), mv, e);
                self.broadcaster.broadcast_rejection(e).await;
                return;
            }
        };

        if let Some(outgoing) = outcome.outgoing {
            self.forward_move(outgoing).await;
        }
        self.publish().await;
    }

    async fn forward_move(&mut self, mv: Move) {
        let Some(transport) = self.transport.as_ref() else {
            log!("[{}] No transport to forward move {}", self.label(), mv);
            return;
        };

        if let Err(e) = transport.send_move(mv).await {
            log!("[{}] Failed to send move {}: {}", self.label(), mv, e);
            let _ = self
                .controller
                .on_connection_state_changed(ConnectionState::Disconnected);
        }
    }

    async fn notify_peer_of_shutdown(&self) {
        if self.controller.mode() != GameMode::Networked {
            return;
        }
        if let Some(transport) = self.transport.as_ref()
            && let Err(e) = transport.disconnect().await
        {
            log!("[{}] Peer not told about shutdown: {}", self.label(), e);
        }
    }

    async fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::PeerMove(mv) => match self.controller.on_peer_move(mv) {
                Ok(record) => {
                    log!("[{}] Peer played {} as {}", self.label(), mv, record.mark);
                    self.publish().await;
                }
                Err(e) => {
                    log!("[{}] Ignored peer move {}: {}", self.label(), mv, e);
                }
            },
            TransportEvent::RoleAssigned { role, mark } => {
                match self.controller.on_role_assigned(role, mark) {
                    Ok(()) => {
                        log!("[{}] Role {:?} plays {}", self.label(), role, mark);
                        self.publish().await;
                    }
                    Err(e) => log!("[{}] Role announcement refused: {}", self.label(), e),
                }
            }
            TransportEvent::ConnectionStateChanged(connection) => {
                match self.controller.on_connection_state_changed(connection) {
                    Ok(()) => {
                        log!("[{}] Connection is {:?}", self.label(), connection);
                        self.publish().await;
                    }
                    Err(e) => log!("[{}] Connection change ignored: {}", self.label(), e),
                }
            }
        }
    }

    async fn play_ai_turn(&mut self) {
        let Some((input, mut rng)) = self.controller.bot_request() else {
            return;
        };

        let result = tokio::task::spawn_blocking(move || calculate_move(&input, &mut rng)).await;

        match result {
            Ok(Some(mv)) => match self.controller.apply_ai_move(mv) {
                Ok(record) => {
                    log!("[{}] Bot played {} as {}", self.label(), mv, record.mark);
                    self.publish().await;
                }
                Err(e) => log!("[{}] Bot move {} rejected: {}", self.label(), mv, e),
            },
            Ok(None) => log!("[{}] Bot found no move", self.label()),
            Err(e) => log!("[{}] Bot search failed: {}", self.label(), e),
        }
    }

    fn sync_ai_timer(&mut self) {
        if self.controller.pending_ai_mark().is_none() {
            self.ai_timer = None;
        } else if self.ai_timer.is_none() {
            let delay = self.controller.bot_settings().move_delay();
            self.ai_timer = Some(Box::pin(tokio::time::sleep(delay)));
        }
    }

    async fn publish(&self) {
        self.broadcaster
            .broadcast_state(self.controller.snapshot())
            .await;
    }

    fn label(&self) -> String {
        match self.controller.match_code() {
            Some(code) => format!("match:{}", code),
            None => format!("match:{:?}", self.controller.mode()),
        }
    }
}

async fn next_event(events: &mut Option<mpsc::Receiver<TransportEvent>>) -> Option<TransportEvent> {
    match events {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}

async fn ai_delay(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc::UnboundedSender;

    use super::*;
    use crate::games::SessionRng;
    use crate::games::ultimate::match_controller::Role;
    use crate::games::ultimate::transport::ChannelTransport;
    use crate::games::ultimate::{BotSettings, Mark, MoveError};
    use crate::logger::init_logger;

    #[derive(Clone)]
    struct RecordingBroadcaster {
        snapshots: UnboundedSender<MatchSnapshot>,
        rejections: UnboundedSender<MoveError>,
    }

    impl GameBroadcaster for RecordingBroadcaster {
        async fn broadcast_state(&self, snapshot: MatchSnapshot) {
            let _ = self.snapshots.send(snapshot);
        }

        async fn broadcast_rejection(&self, error: MoveError) {
            let _ = self.rejections.send(error);
        }
    }

    struct Recorded {
        snapshots: mpsc::UnboundedReceiver<MatchSnapshot>,
        rejections: mpsc::UnboundedReceiver<MoveError>,
    }

    fn recording() -> (RecordingBroadcaster, Recorded) {
        let (snapshots_tx, snapshots) = mpsc::unbounded_channel();
        let (rejections_tx, rejections) = mpsc::unbounded_channel();
        (
            RecordingBroadcaster {
                snapshots: snapshots_tx,
                rejections: rejections_tx,
            },
            Recorded { snapshots, rejections },
        )
    }

    fn ai_controller(move_delay_ms: u64) -> MatchController {
        let settings = BotSettings {
            depth_limit: 1,
            top_candidates: 1,
            move_delay_ms,
        };
        MatchController::new(GameMode::Ai { ai_mark: Mark::Second }, settings, SessionRng::new(5))
    }

    async fn wait_for_moves(recorded: &mut Recorded, count: usize) -> MatchSnapshot {
        loop {
            let snapshot = tokio::time::timeout(Duration::from_secs(5), recorded.snapshots.recv())
                .await
                .expect("snapshot in time")
                .expect("session alive");
            if snapshot.state.move_log().len() == count {
                return snapshot;
            }
        }
    }

    #[tokio::test]
    async fn test_bot_replies_after_human_move() {
        init_logger(None);
        let (broadcaster, mut recorded) = recording();
        let (commands, commands_rx) = mpsc::channel(8);
        let session = MatchSession::<_, ChannelTransport>::new(ai_controller(10), broadcaster, None);
        let handle = tokio::spawn(session.run(commands_rx, None));

        commands.send(SessionCommand::RequestMove(Move::new(4, 4))).await.unwrap();
        let snapshot = wait_for_moves(&mut recorded, 2).await;

        let reply = snapshot.state.move_log()[1];
        assert_eq!(reply.mark, Mark::Second);
        assert_eq!(reply.sub_board, 4);
        assert!(snapshot.is_local_turn);

        commands.send(SessionCommand::Shutdown).await.unwrap();
        let last = handle.await.unwrap();
        assert_eq!(last.state.move_log().len(), 2);
    }

    #[tokio::test]
    async fn test_human_move_during_bot_turn_is_rejected() {
        init_logger(None);
        let (broadcaster, mut recorded) = recording();
        let (commands, commands_rx) = mpsc::channel(8);
        let session = MatchSession::<_, ChannelTransport>::new(ai_controller(200), broadcaster, None);
        let handle = tokio::spawn(session.run(commands_rx, None));

        commands.send(SessionCommand::RequestMove(Move::new(4, 4))).await.unwrap();
        commands.send(SessionCommand::RequestMove(Move::new(4, 0))).await.unwrap();

        assert_eq!(recorded.rejections.recv().await, Some(MoveError::NotYourTurn));
        commands.send(SessionCommand::Shutdown).await.unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_cancels_pending_bot_move() {
        init_logger(None);
        let (broadcaster, mut recorded) = recording();
        let (commands, commands_rx) = mpsc::channel(8);
        let session = MatchSession::<_, ChannelTransport>::new(ai_controller(200), broadcaster, None);
        let handle = tokio::spawn(session.run(commands_rx, None));

        commands.send(SessionCommand::RequestMove(Move::new(4, 4))).await.unwrap();
        commands.send(SessionCommand::RequestReset).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        commands.send(SessionCommand::Shutdown).await.unwrap();

        let last = handle.await.unwrap();
        assert!(last.state.move_log().is_empty());
        while let Ok(snapshot) = recorded.snapshots.try_recv() {
            assert!(snapshot.state.move_log().len() < 2);
        }
    }

    #[tokio::test]
    async fn test_loopback_sessions_stay_in_sync() {
        init_logger(None);
        let (host_end, guest_end) = ChannelTransport::pair().await.unwrap();
        let (host_broadcaster, mut host_recorded) = recording();
        let (guest_broadcaster, mut guest_recorded) = recording();

        let settings = BotSettings::default();
        let host = MatchSession::new(
            MatchController::new(GameMode::Networked, settings, SessionRng::new(1)),
            host_broadcaster,
            Some(host_end.transport),
        );
        let guest = MatchSession::new(
            MatchController::new(GameMode::Networked, settings, SessionRng::new(2)),
            guest_broadcaster,
            Some(guest_end.transport),
        );

        let (host_commands, host_rx) = mpsc::channel(8);
        let (guest_commands, guest_rx) = mpsc::channel(8);
        let host_handle = tokio::spawn(host.run(host_rx, Some(host_end.events)));
        let guest_handle = tokio::spawn(guest.run(guest_rx, Some(guest_end.events)));

        // Wait until both sides have their role and an active connection.
        for recorded in [&mut host_recorded, &mut guest_recorded] {
            loop {
                let snapshot = recorded.snapshots.recv().await.unwrap();
                if snapshot.role.is_some() && snapshot.connection == ConnectionState::Active {
                    break;
                }
            }
        }

        guest_commands.send(SessionCommand::RequestMove(Move::new(4, 4))).await.unwrap();
        assert_eq!(guest_recorded.rejections.recv().await, Some(MoveError::NotYourTurn));

        host_commands.send(SessionCommand::RequestMove(Move::new(4, 4))).await.unwrap();
        let guest_view = wait_for_moves(&mut guest_recorded, 1).await;
        assert!(guest_view.is_local_turn);
        assert_eq!(guest_view.role, Some(Role::Guest));

        guest_commands.send(SessionCommand::RequestMove(Move::new(4, 0))).await.unwrap();
        let host_view = wait_for_moves(&mut host_recorded, 2).await;
        let guest_view = wait_for_moves(&mut guest_recorded, 2).await;
        assert_eq!(host_view.state, guest_view.state);
        assert!(host_view.is_local_turn);
        assert!(!guest_view.is_local_turn);

        host_commands.send(SessionCommand::Shutdown).await.unwrap();
        guest_commands.send(SessionCommand::Shutdown).await.unwrap();
        host_handle.await.unwrap();
        guest_handle.await.unwrap();
    }

    async fn wait_for_connection(recorded: &mut Recorded, connection: ConnectionState) -> MatchSnapshot {
        loop {
            let snapshot = tokio::time::timeout(Duration::from_secs(5), recorded.snapshots.recv())
                .await
                .expect("snapshot in time")
                .expect("session alive");
            if snapshot.connection == connection {
                return snapshot;
            }
        }
    }

    #[tokio::test]
    async fn test_hosted_match_is_joined_by_code_and_ends_on_host_shutdown() {
        init_logger(None);
        let (host_end, guest_end) = ChannelTransport::pair().await.unwrap();
        let (host_broadcaster, mut host_recorded) = recording();
        let (guest_broadcaster, mut guest_recorded) = recording();
        let settings = BotSettings::default();

        let (host_commands, host_rx) = mpsc::channel(8);
        host_commands.send(SessionCommand::HostMatch).await.unwrap();
        let host = MatchSession::new(
            MatchController::new(GameMode::Networked, settings, SessionRng::new(1)),
            host_broadcaster,
            Some(host_end.transport),
        );
        let host_handle = tokio::spawn(host.run(host_rx, Some(host_end.events)));

        let host_view = wait_for_connection(&mut host_recorded, ConnectionState::Active).await;
        assert_eq!(host_view.role, Some(Role::Host));
        let code = host_view.match_code.expect("host shares a code");

        let (guest_commands, guest_rx) = mpsc::channel(8);
        guest_commands.send(SessionCommand::JoinMatch(code.clone())).await.unwrap();
        let guest = MatchSession::new(
            MatchController::new(GameMode::Networked, settings, SessionRng::new(2)),
            guest_broadcaster,
            Some(guest_end.transport),
        );
        let guest_handle = tokio::spawn(guest.run(guest_rx, Some(guest_end.events)));

        let guest_view = wait_for_connection(&mut guest_recorded, ConnectionState::Active).await;
        assert_eq!(guest_view.role, Some(Role::Guest));
        assert_eq!(guest_view.match_code, Some(code));

        host_commands.send(SessionCommand::RequestMove(Move::new(4, 4))).await.unwrap();
        let guest_view = wait_for_moves(&mut guest_recorded, 1).await;
        assert!(guest_view.is_local_turn);

        host_commands.send(SessionCommand::Shutdown).await.unwrap();
        host_handle.await.unwrap();

        let guest_view = wait_for_connection(&mut guest_recorded, ConnectionState::Disconnected).await;
        assert!(!guest_view.is_local_turn);
        guest_commands.send(SessionCommand::RequestMove(Move::new(4, 0))).await.unwrap();
        assert_eq!(guest_recorded.rejections.recv().await, Some(MoveError::NotConnected));

        guest_commands.send(SessionCommand::Shutdown).await.unwrap();
        let last = guest_handle.await.unwrap();
        assert_eq!(last.state.move_log().len(), 1);
    }
}
