// Player control state written by the connection task and read by the player behavior.

use tokio::sync::watch;

/// Keys a client currently holds down. Unknown key names are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldKeys {
    pub thrust: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub brake: bool,
    pub shoot: bool,
    pub bomb: bool,
}

impl HeldKeys {
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keys = Self::default();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.eq_ignore_ascii_case("W") {
                keys.thrust = true;
            } else if token.eq_ignore_ascii_case("A") {
                keys.turn_left = true;
            } else if token.eq_ignore_ascii_case("D") {
                keys.turn_right = true;
            } else if token.eq_ignore_ascii_case("S") {
                keys.brake = true;
            } else if token.eq_ignore_ascii_case("E") {
                keys.shoot = true;
            } else if token.eq_ignore_ascii_case("B") {
                keys.bomb = true;
            }
        }
        keys
    }
}

/// Latest control message for one player.
///
/// Held keys are latest-value. Resync requests are counted instead, so a request is not lost
/// when a later key message overwrites the slot before the player reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlState {
    pub keys: HeldKeys,
    // Total resync requests received on this connection.
    pub resync_requests: u64,
}

impl ControlState {
    /// Folds one client message into the stored state.
    pub fn apply(&mut self, keys: HeldKeys, resync: bool) {
        self.keys = keys;
        if resync {
            self.resync_requests += 1;
        }
    }
}

pub fn control_channel() -> (watch::Sender<ControlState>, watch::Receiver<ControlState>) {
    watch::channel(ControlState::default())
}
