pub mod leaderboard;
pub mod match_runner;
pub mod round_runner;
pub mod session;
pub mod timers;

pub use leaderboard::{LeaderboardRow, LeaderboardStatus, LeaderboardViewModel, Medal};
pub use match_runner::{BoardHandle, BoardInput, BoardView, MatchRunner};
pub use round_runner::{PlayerInput, RoundHandle, RoundOutcome, RoundRunner, RoundView};
pub use session::{Notice, NoticeKind, RoundTicket, Screen, SessionOrchestrator};
