//! Game actor message types.

use crate::game::{GameResult, Guess, PlayerId};
use tokio::sync::oneshot;

/// Messages that can be sent to a GameActor
#[derive(Debug)]
pub enum GameMessage {
    /// Score a guess and append it to the game
    SubmitGuess {
        player: PlayerId,
        text: String,
        response: oneshot::Sender<GameResult<Guess>>,
    },

    /// Stop the actor; anything queued behind this is dropped unanswered
    Shutdown,
}
