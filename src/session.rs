/// Countdown length for speed mode, in whole seconds.
pub const SPEED_TIME_LIMIT_SECS: u32 = 60;

#[derive(Debug, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum Mode {
    Practice,
    Memory,
    Speed,
}

impl Mode {
    /// Number of simultaneous letter targets shown in this mode.
    pub fn target_count(&self) -> usize {
        match self {
            Mode::Practice => 1,
            Mode::Memory | Mode::Speed => 5,
        }
    }

    pub fn is_timed(&self) -> bool {
        matches!(self, Mode::Speed)
    }
}

/// All session-scoped bookkeeping, owned by the game state machine.
/// "Return to home" resets the whole struct to its defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    pub mode: Option<Mode>,
    pub started: bool,
    pub paused: bool,
    pub finished: bool,
    pub success: bool,
    pub remaining_secs: u32,
    pub score: u32,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            mode: None,
            started: false,
            paused: false,
            finished: false,
            success: false,
            remaining_secs: SPEED_TIME_LIMIT_SECS,
            score: 0,
        }
    }
}

impl GameSession {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_counts() {
        assert_eq!(Mode::Practice.target_count(), 1);
        assert_eq!(Mode::Memory.target_count(), 5);
        assert_eq!(Mode::Speed.target_count(), 5);
    }

    #[test]
    fn test_only_speed_is_timed() {
        assert!(Mode::Speed.is_timed());
        assert!(!Mode::Practice.is_timed());
        assert!(!Mode::Memory.is_timed());
    }

    #[test]
    fn test_mode_display_names() {
        assert_eq!(Mode::Practice.to_string(), "Practice");
        assert_eq!(Mode::Speed.to_string(), "Speed");
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut session = GameSession {
            mode: Some(Mode::Speed),
            started: true,
            paused: true,
            finished: true,
            success: true,
            remaining_secs: 3,
            score: 42,
        };
        session.reset();
        assert_eq!(session, GameSession::default());
        assert_eq!(session.remaining_secs, SPEED_TIME_LIMIT_SECS);
    }
}
