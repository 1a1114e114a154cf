//! Generic game state machine.
//!
//! `GameMachine` pairs a `Rules` implementation with the data of one
//! play-through: seated players, initial state, current state, accepted
//! actions, and display lines. It is the only place actions are accepted,
//! so every game gets the same re-validation and history bookkeeping.
//!
//! History uses `im::Vector` so `Clone` (used for historical views and
//! agent look-ahead) is O(1) and never aliases the live instance.

use im::Vector;

use crate::core::{FsmSnapshot, GameError, Player, Seat};

use super::engine::{ActionLog, GameResult, Rules};

/// One play-through of a game.
#[derive(Clone, Debug)]
pub struct GameMachine<R: Rules> {
    rules: R,
    players: Vec<Player>,
    init_state: R::State,
    state: R::State,
    action_history: Vector<R::Action>,
    history_display: Vector<String>,
}

impl<R: Rules> GameMachine<R> {
    /// Start a fresh game for `players`.
    ///
    /// Fails with `GameError::InvalidPlayerCount` if the player count is
    /// outside `R::MIN_PLAYERS..=R::MAX_PLAYERS`.
    pub fn new(players: &[Player]) -> Result<Self, GameError> {
        Self::with_rules(R::default(), players)
    }

    /// Start a fresh game with an explicit rules value.
    pub fn with_rules(rules: R, players: &[Player]) -> Result<Self, GameError> {
        let count = players.len();
        if !(R::MIN_PLAYERS..=R::MAX_PLAYERS).contains(&count) {
            return Err(GameError::InvalidPlayerCount {
                count,
                min: R::MIN_PLAYERS,
                max: R::MAX_PLAYERS,
            });
        }

        let init_state = rules.new_init_state(count);
        Ok(Self {
            state: init_state.clone(),
            init_state,
            players: players.to_vec(),
            action_history: Vector::new(),
            history_display: Vector::new(),
            rules,
        })
    }

    /// Resume a game from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: FsmSnapshot<R::State, R::Action>) -> Self {
        Self {
            rules: R::default(),
            players: snapshot.players,
            init_state: snapshot.init_state,
            state: snapshot.state,
            action_history: snapshot.action_history.into_iter().collect(),
            history_display: snapshot.history_display.into_iter().collect(),
        }
    }

    /// Capture a snapshot. The result shares nothing with `self`.
    #[must_use]
    pub fn to_snapshot(&self) -> FsmSnapshot<R::State, R::Action> {
        FsmSnapshot {
            players: self.players.clone(),
            init_state: self.init_state.clone(),
            state: self.state.clone(),
            action_history: self.action_history.iter().cloned().collect(),
            history_display: self.history_display.iter().cloned().collect(),
        }
    }

    // === Accessors ===

    /// Seated players.
    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &R::State {
        &self.state
    }

    /// State before the first action.
    #[must_use]
    pub fn init_state(&self) -> &R::State {
        &self.init_state
    }

    /// Accepted actions, oldest first.
    #[must_use]
    pub fn action_history(&self) -> &Vector<R::Action> {
        &self.action_history
    }

    /// Display entry per accepted action.
    #[must_use]
    pub fn history_display(&self) -> &Vector<String> {
        &self.history_display
    }

    // === Rules ===

    /// Initial state for `num_players`, independent of this instance's progress.
    #[must_use]
    pub fn new_init_state(&self, num_players: usize) -> R::State {
        self.rules.new_init_state(num_players)
    }

    /// All legal actions from the current state.
    #[must_use]
    pub fn valid_actions(&self) -> Vec<R::Action> {
        self.rules.valid_actions(&self.state)
    }

    /// Check if the game is over.
    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.rules.has_ended(&self.state)
    }

    /// Outcome, if the game has ended.
    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        self.rules.result(&self.state)
    }

    /// Seat expected to act next.
    #[must_use]
    pub fn current_seat(&self) -> Seat {
        self.rules.current_player(&self.state)
    }

    /// Player expected to act next.
    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_seat().index())
    }

    /// Validate and apply an action.
    ///
    /// Returns `false` and leaves everything untouched if the action is not
    /// in `valid_actions()`; stale or duplicate submissions end up here.
    pub fn take_action(&mut self, action: &R::Action) -> bool {
        if !self.valid_actions().contains(action) {
            return false;
        }

        let mut log = ActionLog::new(&self.players);
        self.rules.apply_action(&mut self.state, action, &mut log);
        self.action_history.push_back(action.clone());
        self.history_display.push_back(log.into_entry());
        true
    }

    // === History ===

    /// Rebuild state from the first `index + 1` actions.
    ///
    /// Derived state and display lines are discarded and regenerated.
    pub fn rewind_to(&mut self, index: usize) {
        self.replay_prefix(index.saturating_add(1));
    }

    /// Drop the most recent action.
    pub fn undo(&mut self) {
        let len = self.action_history.len();
        if len > 0 {
            self.replay_prefix(len - 1);
        }
    }

    /// Copy of this game as it stood after action `index`.
    #[must_use]
    pub fn view_at(&self, index: usize) -> Self {
        let mut copy = self.clone();
        copy.rewind_to(index);
        copy
    }

    fn replay_prefix(&mut self, len: usize) {
        let actions: Vec<R::Action> = self.action_history.iter().take(len).cloned().collect();

        self.state = self.init_state.clone();
        self.action_history = Vector::new();
        self.history_display = Vector::new();

        for action in &actions {
            let applied = self.take_action(action);
            debug_assert!(applied, "recorded action rejected on replay: {action:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    /// Players alternately add 1 or 2; whoever reaches 5 wins.
    #[derive(Clone, Debug, Default)]
    struct RaceToFive;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct RaceState {
        total: u8,
        current: Seat,
        winner: Option<Seat>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Add(u8);

    impl Rules for RaceToFive {
        type State = RaceState;
        type Action = Add;
        const NAME: &'static str = "race_to_five";

        fn new_init_state(&self, _num_players: usize) -> RaceState {
            RaceState { total: 0, current: Seat::new(0), winner: None }
        }

        fn valid_actions(&self, state: &RaceState) -> Vec<Add> {
            if state.winner.is_some() {
                return vec![];
            }
            (1..=2).filter(|n| state.total + n <= 5).map(Add).collect()
        }

        fn apply_action(&self, state: &mut RaceState, action: &Add, log: &mut ActionLog<'_>) {
            state.total += action.0;
            log.push(format!("{} added {}", log.name(state.current), action.0));
            if state.total == 5 {
                state.winner = Some(state.current);
                log.push(format!("{} wins", log.name(state.current)));
            } else {
                state.current = state.current.next(2);
            }
        }

        fn result(&self, state: &RaceState) -> Option<GameResult> {
            state.winner.map(GameResult::Winner)
        }

        fn current_player(&self, state: &RaceState) -> Seat {
            state.current
        }
    }

    fn players() -> Vec<Player> {
        vec![Player::new("a", "Alice"), Player::new("b", "Bob")]
    }

    #[test]
    fn test_rejects_wrong_player_count() {
        let one = vec![Player::new("a", "Alice")];
        let err = GameMachine::<RaceToFive>::new(&one).unwrap_err();
        assert!(matches!(err, GameError::InvalidPlayerCount { count: 1, min: 2, max: 2 }));

        let mut three = players();
        three.push(Player::new("c", "Carol"));
        assert!(GameMachine::<RaceToFive>::new(&three).is_err());
    }

    #[test]
    fn test_take_action_records_history() {
        let mut game = GameMachine::<RaceToFive>::new(&players()).unwrap();

        assert!(game.take_action(&Add(2)));
        assert!(game.take_action(&Add(1)));

        assert_eq!(game.state().total, 3);
        assert_eq!(game.action_history().len(), 2);
        assert_eq!(game.history_display()[0], "Alice added 2");
        assert_eq!(game.history_display()[1], "Bob added 1");
        assert_eq!(game.current_player().unwrap().id, "a");
    }

    #[test]
    fn test_invalid_action_leaves_state_unchanged() {
        let mut game = GameMachine::<RaceToFive>::new(&players()).unwrap();
        game.take_action(&Add(2));
        game.take_action(&Add(2));

        let before = game.to_snapshot();
        assert!(!game.take_action(&Add(2)));
        assert!(!game.take_action(&Add(9)));
        assert_eq!(game.to_snapshot(), before);
    }

    #[test]
    fn test_multiple_lines_join_at_one_index() {
        let mut game = GameMachine::<RaceToFive>::new(&players()).unwrap();
        game.take_action(&Add(2));
        game.take_action(&Add(2));
        game.take_action(&Add(1));

        assert!(game.has_ended());
        assert!(game.valid_actions().is_empty());
        assert_eq!(game.result(), Some(GameResult::Winner(Seat::new(0))));
        assert_eq!(game.history_display().len(), 3);
        assert_eq!(game.history_display()[2], "Alice added 1\nAlice wins");
    }

    #[test]
    fn test_rewind_and_undo() {
        let mut game = GameMachine::<RaceToFive>::new(&players()).unwrap();
        for n in [1, 2, 1] {
            game.take_action(&Add(n));
        }

        let view = game.view_at(0);
        assert_eq!(view.state().total, 1);
        assert_eq!(view.action_history().len(), 1);
        assert_eq!(game.state().total, 4, "live instance untouched");

        game.undo();
        assert_eq!(game.state().total, 3);
        assert_eq!(game.history_display().len(), 2);

        game.rewind_to(game.action_history().len() - 1);
        assert_eq!(game.state().total, 3);
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut game = GameMachine::<RaceToFive>::new(&players()).unwrap();
        game.undo();
        assert_eq!(game.state(), game.init_state());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut game = GameMachine::<RaceToFive>::new(&players()).unwrap();
        game.take_action(&Add(1));

        let json = serde_json::to_value(game.to_snapshot()).unwrap();
        let snapshot = serde_json::from_value(json).unwrap();
        let restored = GameMachine::<RaceToFive>::from_snapshot(snapshot);

        assert_eq!(restored.to_snapshot(), game.to_snapshot());
        assert_eq!(restored.new_init_state(2), *game.init_state());
    }
}
