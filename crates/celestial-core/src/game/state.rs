use crate::game::score_state::GameScoreState;
use crate::game::snapshot::{GameSnapshot, HandSummary, SideSnapshot, SideSummary};
use crate::game::strategy::{DecisionContext, EnemyStrategy};
use crate::model::card::Card;
use crate::model::combination::CardCombination;
use crate::model::deck::Deck;
use crate::model::hand::Hand;
use crate::model::player::{Player, Side};
use crate::model::suit::Suit;
use core::fmt;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{Level, event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandPhase {
    AwaitingFirstCards,
    AwaitingSecondCards,
    Resolved,
}

/// Root aggregate for one match: both participants, the score state, the
/// computer opponent and the cards committed in the current hand.
///
/// Every entry point silently ignores input that is not legal in the current
/// phase. A finished match stays finished; build a new `GameState` to play again.
pub struct GameState {
    players: [Player; 2],
    score: GameScoreState,
    strategy: Box<dyn EnemyStrategy>,
    face_up: [Option<Card>; 2],
    second: [Option<Card>; 2],
    phase: HandPhase,
    round_complete: bool,
    last_hand: Option<HandSummary>,
    hands_played: u32,
    rng: StdRng,
    seed: u64,
}

impl GameState {
    pub fn new(strategy: Box<dyn EnemyStrategy>) -> Self {
        let seed: u64 = rand::random();
        Self::with_seed(seed, strategy)
    }

    pub fn with_seed(seed: u64, strategy: Box<dyn EnemyStrategy>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let player = Player::deal(Deck::shuffled(&mut rng));
        let enemy = Player::deal(Deck::shuffled(&mut rng));
        Self::assemble([player, enemy], strategy, rng, seed)
    }

    /// Starts a match from prepared participants. `seed` drives discard recycling.
    pub fn from_players(
        player: Player,
        enemy: Player,
        strategy: Box<dyn EnemyStrategy>,
        seed: u64,
    ) -> Self {
        Self::assemble([player, enemy], strategy, StdRng::seed_from_u64(seed), seed)
    }

    fn assemble(
        players: [Player; 2],
        strategy: Box<dyn EnemyStrategy>,
        rng: StdRng,
        seed: u64,
    ) -> Self {
        Self {
            players,
            score: GameScoreState::new(),
            strategy,
            face_up: [None; 2],
            second: [None; 2],
            phase: HandPhase::AwaitingFirstCards,
            round_complete: false,
            last_hand: None,
            hands_played: 0,
            rng,
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn player(&self) -> &Player {
        self.participant(Side::Player)
    }

    pub fn enemy(&self) -> &Player {
        self.participant(Side::Enemy)
    }

    pub fn participant(&self, side: Side) -> &Player {
        &self.players[side.index()]
    }

    pub fn score_state(&self) -> &GameScoreState {
        &self.score
    }

    pub fn strategy(&self) -> &dyn EnemyStrategy {
        self.strategy.as_ref()
    }

    pub fn phase(&self) -> HandPhase {
        self.phase
    }

    pub fn face_up_card(&self, side: Side) -> Option<Card> {
        self.face_up[side.index()]
    }

    pub fn player_face_up_card(&self) -> Option<Card> {
        self.face_up_card(Side::Player)
    }

    pub fn enemy_face_up_card(&self) -> Option<Card> {
        self.face_up_card(Side::Enemy)
    }

    pub fn second_card(&self, side: Side) -> Option<Card> {
        self.second[side.index()]
    }

    /// True from the resolution that decided a round until the next hand opens.
    pub fn is_round_complete(&self) -> bool {
        self.round_complete
    }

    pub fn is_match_complete(&self) -> bool {
        self.score.is_match_decided()
    }

    pub fn match_winner(&self) -> Option<Side> {
        self.score.match_winner()
    }

    pub fn hands_played(&self) -> u32 {
        self.hands_played
    }

    pub fn last_hand(&self) -> Option<&HandSummary> {
        self.last_hand.as_ref()
    }

    /// The view a strategy seated at `side` would receive.
    pub fn decision_context(&self, side: Side) -> DecisionContext<'_> {
        DecisionContext::new(side, &self.players, &self.score, self.face_up)
    }

    /// Commits the human's first card and the enemy's answer, then applies
    /// first-card effects: a Dawn lead scores its face value provisionally and
    /// a Dusk lead locks the opponent's banked power for the hand. Returns the
    /// enemy's card, or `None` if the input was ignored.
    pub fn process_first_cards(&mut self, card: Card) -> Option<Card> {
        if self.is_match_complete() {
            event!(
                target: "celestial_core::game",
                Level::TRACE,
                %card,
                "first card after match end ignored"
            );
            return None;
        }
        if self.phase == HandPhase::AwaitingSecondCards
            || !self.player().hand().contains(card)
            || self.enemy().hand().is_empty()
        {
            event!(
                target: "celestial_core::game",
                Level::TRACE,
                %card,
                phase = ?self.phase,
                "first card rejected"
            );
            return None;
        }
        // Only a legal card clears the resolved hand.
        self.open_next_hand();

        let enemy_card = {
            let ctx = DecisionContext::new(Side::Enemy, &self.players, &self.score, [None; 2]);
            let hand = self.players[Side::Enemy.index()].hand();
            let chosen = self.strategy.select_first_card(hand.cards(), &ctx);
            ensure_strategy_card(hand, chosen, self.strategy.name());
            chosen
        };

        for (side, played) in [(Side::Player, card), (Side::Enemy, enemy_card)] {
            self.players[side.index()].play_card(played);
            self.face_up[side.index()] = Some(played);
        }
        for (side, played) in [(Side::Player, card), (Side::Enemy, enemy_card)] {
            self.apply_first_card_effects(side, played);
        }
        self.phase = HandPhase::AwaitingSecondCards;

        if let Some(amount) = self.enemy_consider_banked_power() {
            event!(
                target: "celestial_core::game",
                Level::DEBUG,
                amount,
                "enemy spends banked power"
            );
        }
        Some(enemy_card)
    }

    /// Spends all of `side`'s banked power into the open hand. Only possible
    /// between the first and second cards, once per side per hand, and while
    /// the power is unlocked.
    pub fn use_banked_power(&mut self, side: Side) -> Option<u32> {
        if self.phase != HandPhase::AwaitingSecondCards
            || self.score.banked_used_this_hand(side) > 0
        {
            return None;
        }
        let amount = self.players[side.index()].withdraw()?;
        self.score.use_banked_power(amount, side);
        Some(amount)
    }

    /// Commits the human's second card and the enemy's answer, resolves both
    /// combinations and completes the hand. Returns the enemy's card.
    pub fn process_second_cards(&mut self, card: Card) -> Option<Card> {
        if self.phase != HandPhase::AwaitingSecondCards
            || self.second.iter().any(Option::is_some)
            || !self.player().hand().contains(card)
        {
            event!(
                target: "celestial_core::game",
                Level::TRACE,
                %card,
                phase = ?self.phase,
                "second card rejected"
            );
            return None;
        }
        let enemy_card = self.choose_enemy_second_card()?;
        self.process_card_combination(Side::Player, card);
        self.process_card_combination(Side::Enemy, enemy_card);
        Some(enemy_card)
    }

    /// Asks the strategy for the enemy's second card and resolves the enemy's
    /// combination on its own.
    pub fn process_enemy_second_card(&mut self) -> Option<Card> {
        if self.phase != HandPhase::AwaitingSecondCards
            || self.second[Side::Enemy.index()].is_some()
        {
            return None;
        }
        let card = self.choose_enemy_second_card()?;
        self.process_card_combination(Side::Enemy, card)?;
        Some(card)
    }

    /// Resolves one side's combination with `card` as its second card. The
    /// hand completes once both sides have resolved.
    pub fn process_card_combination(&mut self, side: Side, card: Card) -> Option<CardCombination> {
        if self.phase != HandPhase::AwaitingSecondCards || self.second[side.index()].is_some() {
            return None;
        }
        let first = self.face_up[side.index()]?;
        if !self.players[side.index()].play_card(card) {
            return None;
        }
        self.second[side.index()] = Some(card);

        let combination = CardCombination::new(first, card);
        self.resolve_combination(side, &combination);
        self.complete_hand_if_ready();
        Some(combination)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let side_snapshot = |side: Side| {
            let player = self.participant(side);
            SideSnapshot {
                hand_size: player.hand().len(),
                deck_size: player.deck_len(),
                banked_power: player.banked_power(),
                banked_power_locked: player.is_banked_power_locked(),
                face_up: self.face_up_card(side),
                second: self.second_card(side),
                card_points: self.score.card_points(side),
                banked_used: self.score.banked_used_this_hand(side),
                hands_won: self.score.hands_won(side),
                rounds_won: self.score.rounds_won(side),
            }
        };
        GameSnapshot {
            current_round: self.score.current_round(),
            hands_played: self.hands_played,
            round_history: *self.score.round_history(),
            player: side_snapshot(Side::Player),
            enemy: side_snapshot(Side::Enemy),
            round_complete: self.round_complete,
            match_complete: self.is_match_complete(),
            match_winner: self.match_winner(),
        }
    }

    /// Clears the previous hand's slots and points so the next first cards
    /// can be played. `process_first_cards` does this on its own; callers
    /// that want a clean decision context beforehand can open early. Returns
    /// `false` once the match is over.
    pub fn open_next_hand(&mut self) -> bool {
        if self.is_match_complete() {
            return false;
        }
        if self.phase == HandPhase::Resolved {
            self.open_hand();
        }
        true
    }

    fn open_hand(&mut self) {
        self.score.reset_hand_points();
        self.face_up = [None; 2];
        self.second = [None; 2];
        self.round_complete = false;
        self.phase = HandPhase::AwaitingFirstCards;
    }

    fn apply_first_card_effects(&mut self, side: Side, card: Card) {
        match card.suit {
            Suit::Dawn => self.score.set_card_points(card.points(), side),
            Suit::Dusk => self.players[side.opponent().index()].lock_banked_power(),
            Suit::Night => {}
        }
    }

    fn enemy_consider_banked_power(&mut self) -> Option<u32> {
        let wants = {
            let ctx = DecisionContext::new(Side::Enemy, &self.players, &self.score, self.face_up);
            ctx.can_withdraw() && self.strategy.should_use_banked_power(&ctx)
        };
        if wants {
            self.use_banked_power(Side::Enemy)
        } else {
            None
        }
    }

    fn choose_enemy_second_card(&mut self) -> Option<Card> {
        let first = self.face_up[Side::Enemy.index()]?;
        let hand = self.players[Side::Enemy.index()].hand();
        if hand.is_empty() {
            return None;
        }
        let ctx = DecisionContext::new(Side::Enemy, &self.players, &self.score, self.face_up);
        let chosen = self.strategy.select_second_card(hand.cards(), first, &ctx);
        ensure_strategy_card(hand, chosen, self.strategy.name());
        Some(chosen)
    }

    fn resolve_combination(&mut self, side: Side, combination: &CardCombination) {
        let outcome = combination.outcome();
        self.score.set_card_points(outcome.immediate, side);
        self.players[side.index()].bank(outcome.banked);
        let removed = self.players[side.opponent().index()].cancel(outcome.cancelled);
        event!(
            target: "celestial_core::game",
            Level::TRACE,
            side = %side,
            combination = %combination,
            cancelled_from_opponent = removed
        );
    }

    fn complete_hand_if_ready(&mut self) {
        let (Some(player_first), Some(player_second), Some(enemy_first), Some(enemy_second)) = (
            self.face_up[Side::Player.index()],
            self.second[Side::Player.index()],
            self.face_up[Side::Enemy.index()],
            self.second[Side::Enemy.index()],
        ) else {
            return;
        };

        for player in &mut self.players {
            player.settle_bank();
            player.unlock_banked_power();
        }

        let round = self.score.current_round();
        let winner = self.score.finish_hand();
        let round_winner = self.score.round_winner();
        if round_winner.is_some() {
            self.round_complete = true;
            self.score.finish_round();
        }
        let match_winner = self.score.match_winner();

        let recycled = [
            self.players[Side::Player.index()].replenish(&mut self.rng),
            self.players[Side::Enemy.index()].replenish(&mut self.rng),
        ];
        self.hands_played += 1;
        self.phase = HandPhase::Resolved;

        let side_summary = |side: Side, first: Card, second: Card| SideSummary {
            first,
            second,
            outcome: CardCombination::new(first, second).outcome(),
            banked_used: self.score.banked_used_this_hand(side),
            hand_points: self.score.hand_points(side),
            recycled_deck: recycled[side.index()],
        };
        let summary = HandSummary {
            hand_number: self.hands_played,
            round,
            player: side_summary(Side::Player, player_first, player_second),
            enemy: side_summary(Side::Enemy, enemy_first, enemy_second),
            winner,
            round_winner,
            match_winner,
        };

        event!(
            target: "celestial_core::game",
            Level::DEBUG,
            hand = summary.hand_number,
            round,
            player_points = summary.player.hand_points,
            enemy_points = summary.enemy.hand_points,
            winner = ?winner
        );
        if let Some(side) = round_winner {
            event!(
                target: "celestial_core::game",
                Level::INFO,
                round,
                winner = %side,
                player_rounds = self.score.rounds_won(Side::Player),
                enemy_rounds = self.score.rounds_won(Side::Enemy),
                "round complete"
            );
        }
        if let Some(side) = match_winner {
            event!(
                target: "celestial_core::game",
                Level::INFO,
                winner = %side,
                hands = self.hands_played,
                "match complete"
            );
        }

        self.strategy.observe_hand(Side::Enemy, &summary);
        self.last_hand = Some(summary);
    }
}

fn ensure_strategy_card(hand: &Hand, card: Card, strategy: &str) {
    assert!(
        hand.contains(card),
        "strategy '{strategy}' chose {card}, which is not in its hand"
    );
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("strategy", &self.strategy.name())
            .field("phase", &self.phase)
            .field("score", &self.score)
            .field("face_up", &self.face_up)
            .field("second", &self.second)
            .field("hands_played", &self.hands_played)
            .field("seed", &self.seed)
            .finish()
    }
}
