use std::future::Future;

use crate::games::ultimate::{MatchSnapshot, MoveError};

pub trait GameBroadcaster: Send + Sync + Clone + 'static {
    fn broadcast_state(&self, snapshot: MatchSnapshot) -> impl Future<Output = ()> + Send;

    fn broadcast_rejection(&self, error: MoveError) -> impl Future<Output = ()> + Send;
}
