//! Event model: the immutable facts a game stream is made of.
//!
//! `EventPayload` is a closed sum type; replay matches it exhaustively, so a
//! new event kind does not compile until the fold handles it.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::layoffs::LayOff;
use crate::domain::melds::Meld;
use crate::domain::rules::EVENT_VERSION;
use crate::domain::scoring::KnockScore;
use crate::domain::state::{GameId, Phase, PlayerId, PlayerScore};
use crate::domain::Card;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameEvent {
    pub id: Uuid,
    pub game_id: GameId,
    /// Acting player; `None` for system events.
    pub player_id: Option<PlayerId>,
    pub sequence_number: i64,
    pub event_version: u32,
    #[serde(flatten)]
    pub payload: EventPayload,
    pub created_at: OffsetDateTime,
}

impl GameEvent {
    pub fn event_type(&self) -> EventType {
        self.payload.event_type()
    }
}

/// Build a current-version event.
pub fn create_game_event(
    game_id: GameId,
    player_id: Option<PlayerId>,
    sequence_number: i64,
    payload: EventPayload,
    created_at: OffsetDateTime,
) -> GameEvent {
    GameEvent {
        id: Uuid::new_v4(),
        game_id,
        player_id,
        sequence_number,
        event_version: EVENT_VERSION,
        payload,
        created_at,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialDeal {
    pub player1_hand: Vec<Card>,
    pub player2_hand: Vec<Card>,
    pub top_discard_card: Card,
    /// Last element is the top of the stock.
    pub stock_pile: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCreated {
    pub player1_id: PlayerId,
    pub username: String,
    pub seed: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerJoined {
    pub player_id: PlayerId,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerReady {
    pub player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStarted {
    pub player1_id: PlayerId,
    pub player2_id: PlayerId,
    pub dealer_id: PlayerId,
    pub starting_player_id: PlayerId,
    pub initial_deal: InitialDeal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeUpcard {
    pub player_id: PlayerId,
    pub card_taken: Card,
    pub discard_pile_after: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassUpcard {
    pub player_id: PlayerId,
    /// Passes so far this round, including this one.
    pub passes: u8,
    pub next_player_id: PlayerId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawFromStock {
    pub player_id: PlayerId,
    pub card_drawn: Card,
    pub stock_size_after: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawFromDiscard {
    pub player_id: PlayerId,
    pub card_drawn: Card,
    pub discard_pile_after: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscardCard {
    pub player_id: PlayerId,
    pub card_discarded: Card,
    pub discard_pile_after: Vec<Card>,
    pub next_player_id: PlayerId,
    /// Stock fell to the floor; the round ends unscored.
    #[serde(default)]
    pub round_drawn: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Knock {
    pub player_id: PlayerId,
    pub card_discarded: Card,
    /// Knocker's hand after the discard.
    pub knocker_hand: Vec<Card>,
    pub knocker_melds: Vec<Meld>,
    pub deadwood_value: u32,
    pub opponent_hand: Vec<Card>,
    pub opponent_melds: Vec<Meld>,
    pub opponent_deadwood: u32,
    pub layoff_options: Vec<LayOff>,
    /// Provisional; committed by the layoff-completion event.
    pub scores: KnockScore,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gin {
    pub player_id: PlayerId,
    pub card_discarded: Card,
    pub ginner_hand: Vec<Card>,
    pub ginner_melds: Vec<Meld>,
    pub opponent_hand: Vec<Card>,
    pub opponent_melds: Vec<Meld>,
    pub scores: KnockScore,
    pub final_scores: Vec<PlayerScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayOffCards {
    pub player_id: PlayerId,
    pub cards_layed_off: Vec<Card>,
    pub target_meld: usize,
    pub meld_after: Meld,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoffCompleted {
    pub player_id: PlayerId,
    /// Every lay-off made this round.
    pub layoffs: Vec<LayOff>,
    pub scores: KnockScore,
    pub final_scores: Vec<PlayerScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiLayoffDecision {
    pub player_id: PlayerId,
    /// Lay-offs applied by this event, in order.
    pub layoffs: Vec<LayOff>,
    pub scores: KnockScore,
    pub final_scores: Vec<PlayerScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartNewRound {
    pub round_number: u32,
    pub dealer_id: PlayerId,
    pub starting_player_id: PlayerId,
    pub requested_by: PlayerId,
    pub new_deal: InitialDeal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFinished {
    pub winner_id: PlayerId,
    pub final_scores: Vec<PlayerScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "eventType",
    content = "eventData",
    rename_all = "SCREAMING_SNAKE_CASE"
)]
pub enum EventPayload {
    GameCreated(GameCreated),
    PlayerJoined(PlayerJoined),
    PlayerReady(PlayerReady),
    GameStarted(GameStarted),
    TakeUpcard(TakeUpcard),
    PassUpcard(PassUpcard),
    DrawFromStock(DrawFromStock),
    DrawFromDiscard(DrawFromDiscard),
    DiscardCard(DiscardCard),
    Knock(Knock),
    Gin(Gin),
    LayOff(LayOffCards),
    LayoffCompleted(LayoffCompleted),
    AiLayoffDecision(AiLayoffDecision),
    StartNewRound(StartNewRound),
    GameFinished(GameFinished),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    GameCreated,
    PlayerJoined,
    PlayerReady,
    GameStarted,
    TakeUpcard,
    PassUpcard,
    DrawFromStock,
    DrawFromDiscard,
    DiscardCard,
    Knock,
    Gin,
    LayOff,
    LayoffCompleted,
    AiLayoffDecision,
    StartNewRound,
    GameFinished,
}

impl EventType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::GameCreated => "GAME_CREATED",
            Self::PlayerJoined => "PLAYER_JOINED",
            Self::PlayerReady => "PLAYER_READY",
            Self::GameStarted => "GAME_STARTED",
            Self::TakeUpcard => "TAKE_UPCARD",
            Self::PassUpcard => "PASS_UPCARD",
            Self::DrawFromStock => "DRAW_FROM_STOCK",
            Self::DrawFromDiscard => "DRAW_FROM_DISCARD",
            Self::DiscardCard => "DISCARD_CARD",
            Self::Knock => "KNOCK",
            Self::Gin => "GIN",
            Self::LayOff => "LAY_OFF",
            Self::LayoffCompleted => "LAYOFF_COMPLETED",
            Self::AiLayoffDecision => "AI_LAYOFF_DECISION",
            Self::StartNewRound => "START_NEW_ROUND",
            Self::GameFinished => "GAME_FINISHED",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        match self {
            Self::GameCreated(_) => EventType::GameCreated,
            Self::PlayerJoined(_) => EventType::PlayerJoined,
            Self::PlayerReady(_) => EventType::PlayerReady,
            Self::GameStarted(_) => EventType::GameStarted,
            Self::TakeUpcard(_) => EventType::TakeUpcard,
            Self::PassUpcard(_) => EventType::PassUpcard,
            Self::DrawFromStock(_) => EventType::DrawFromStock,
            Self::DrawFromDiscard(_) => EventType::DrawFromDiscard,
            Self::DiscardCard(_) => EventType::DiscardCard,
            Self::Knock(_) => EventType::Knock,
            Self::Gin(_) => EventType::Gin,
            Self::LayOff(_) => EventType::LayOff,
            Self::LayoffCompleted(_) => EventType::LayoffCompleted,
            Self::AiLayoffDecision(_) => EventType::AiLayoffDecision,
            Self::StartNewRound(_) => EventType::StartNewRound,
            Self::GameFinished(_) => EventType::GameFinished,
        }
    }

    /// Phase a replay may coerce to before retrying this event.
    ///
    /// `None` means never coerce. Lifecycle and deal events are in that
    /// group: forcing the phase back would re-deal or reset a live round.
    pub fn expected_phase(&self) -> Option<Phase> {
        match self {
            Self::GameCreated(_)
            | Self::PlayerJoined(_)
            | Self::PlayerReady(_)
            | Self::GameStarted(_)
            | Self::StartNewRound(_)
            | Self::GameFinished(_) => None,
            Self::TakeUpcard(_) | Self::PassUpcard(_) => Some(Phase::UpcardDecision),
            Self::DrawFromStock(_) | Self::DrawFromDiscard(_) => Some(Phase::Draw),
            Self::DiscardCard(_) | Self::Knock(_) | Self::Gin(_) => Some(Phase::Discard),
            Self::LayOff(_) | Self::LayoffCompleted(_) | Self::AiLayoffDecision(_) => {
                Some(Phase::Layoff)
            }
        }
    }
}
