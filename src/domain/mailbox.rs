// Bounded, non-blocking event delivery between entities.
//
// The record of an entity carries the sending half (its address) so other behaviors can
// reach it through the peer directory; the owning behavior keeps the receiving half.

use tokio::sync::mpsc::{self, error::TrySendError};

/// Event tokens an entity can drop into another entity's mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Grants the receiving player one extra bomb charge.
    BombPlus,
}

impl Token {
    pub fn as_str(self) -> &'static str {
        match self {
            Token::BombPlus => "bombplus",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "bombplus" => Some(Token::BombPlus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailboxAddress {
    tx: mpsc::Sender<Token>,
}

impl MailboxAddress {
    /// Best-effort delivery. A full or closed mailbox drops the token and returns false;
    /// the sender never waits.
    pub fn deliver(&self, token: Token) -> bool {
        match self.tx.try_send(token) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => false,
        }
    }
}

#[derive(Debug)]
pub struct Mailbox {
    rx: mpsc::Receiver<Token>,
}

impl Mailbox {
    pub fn try_take(&mut self) -> Option<Token> {
        self.rx.try_recv().ok()
    }
}

pub fn mailbox(capacity: usize) -> (MailboxAddress, Mailbox) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (MailboxAddress { tx }, Mailbox { rx })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_mailbox_is_full_then_delivery_is_dropped_without_blocking() {
        let (address, mut inbox) = mailbox(2);

        assert!(address.deliver(Token::BombPlus));
        assert!(address.deliver(Token::BombPlus));
        assert!(!address.deliver(Token::BombPlus));

        assert_eq!(inbox.try_take(), Some(Token::BombPlus));
        assert_eq!(inbox.try_take(), Some(Token::BombPlus));
        assert_eq!(inbox.try_take(), None);
    }

    #[test]
    fn when_receiver_is_gone_then_delivery_reports_failure() {
        let (address, inbox) = mailbox(4);
        drop(inbox);

        assert!(!address.deliver(Token::BombPlus));
    }

    #[test]
    fn token_names_round_trip_through_payload_strings() {
        assert_eq!(Token::parse(Token::BombPlus.as_str()), Some(Token::BombPlus));
        assert_eq!(Token::parse("extra-life"), None);
    }
}
