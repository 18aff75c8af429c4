//! Line-oriented screens over the session orchestrator.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::error;

use banana_brain::domain::{BoardPhase, DifficultyTier, Feedback, GameMode, Phase};
use banana_brain::services::{
    BoardInput, BoardView, LeaderboardStatus, LeaderboardViewModel, MatchRunner, Medal,
    NoticeKind, PlayerInput, RoundOutcome, RoundRunner, RoundTicket, RoundView, Screen,
    SessionOrchestrator,
};
use banana_brain::state::AppState;

struct Console {
    lines: mpsc::Receiver<String>,
}

impl Console {
    fn attach() -> Self {
        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if tx.send(line).await.is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }

    /// `None` once stdin is closed.
    async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await.map(|l| l.trim().to_string())
    }

    async fn ask(&mut self, label: &str) -> Option<String> {
        println!("{label}");
        self.next_line().await
    }
}

pub async fn run(app: AppState, tier: DifficultyTier, recovery_token: Option<String>) {
    let mut console = Console::attach();
    let mut session = SessionOrchestrator::new(app);

    if let Some(token) = recovery_token {
        let _ = session.open_recovery_link(&token).await;
        show_notice(&session);
    }

    let mut tier = Some(tier);
    loop {
        session.sync_auth();
        let keep_going = match session.screen() {
            Screen::Auth => auth_screen(&mut console, &mut session).await,
            Screen::UpdatePassword => update_password_screen(&mut console, &mut session).await,
            Screen::Start => {
                if let Some(t) = tier.take() {
                    session.select_tier(t);
                }
                start_screen(&mut console, &mut session).await
            }
            Screen::Leaderboard => {
                let vm = session.leaderboard();
                leaderboard_screen(&mut console, &mut session, vm).await
            }
            Screen::Playing | Screen::ConfirmQuit => {
                // A round is only ever entered through a ticket; anything
                // else here is stale.
                session.main_menu();
                true
            }
        };
        if !keep_going {
            break;
        }
    }
    println!("🍌 Bye!");
}

fn show_notice(session: &SessionOrchestrator) {
    if let Some(notice) = session.notice() {
        match notice.kind {
            NoticeKind::Info => println!("✅ {}", notice.text),
            NoticeKind::Error => println!("❌ {}", notice.text),
        }
    }
}

async fn auth_screen(console: &mut Console, session: &mut SessionOrchestrator) -> bool {
    println!();
    println!("🍌 Banana Brain");
    let Some(choice) = console
        .ask("[l] log in  [s] sign up  [f] forgot password  [q] quit")
        .await
    else {
        return false;
    };
    match choice.as_str() {
        "l" | "s" => {
            let Some(email) = console.ask("Email:").await else {
                return false;
            };
            let Some(password) = console.ask("Password:").await else {
                return false;
            };
            if choice == "l" {
                let _ = session.sign_in(&email, &password).await;
            } else {
                let _ = session.sign_up(&email, &password).await;
            }
        }
        "f" => {
            let Some(email) = console.ask("Email for the recovery link:").await else {
                return false;
            };
            let _ = session.reset_password(&email).await;
        }
        "q" => return false,
        _ => {}
    }
    show_notice(session);
    true
}

async fn update_password_screen(console: &mut Console, session: &mut SessionOrchestrator) -> bool {
    let Some(password) = console.ask("New password:").await else {
        return false;
    };
    let _ = session.update_password(&password).await;
    show_notice(session);
    true
}

async fn start_screen(console: &mut Console, session: &mut SessionOrchestrator) -> bool {
    println!();
    println!("Choose your difficulty (current: {}):", session.tier());
    for (i, tier) in DifficultyTier::ALL.iter().enumerate() {
        println!(
            "  [{}] {:<6} {}s per turn  {}",
            i + 1,
            tier.as_str(),
            tier.seconds_per_turn(),
            tier.description()
        );
    }
    let Some(choice) = console.ask("[1-3] tier  [p] play  [o] log out  [q] quit").await else {
        return false;
    };
    match choice.as_str() {
        "p" => match session.start_round() {
            Ok(ticket) => play(console, session, ticket).await,
            Err(e) => {
                println!("❌ {}", e.user_message());
                true
            }
        },
        "o" => {
            let _ = session.sign_out().await;
            true
        }
        "q" => false,
        other => {
            match other.parse::<DifficultyTier>() {
                Ok(tier) => session.select_tier(tier),
                Err(_) => println!("Pick 1, 2 or 3."),
            }
            true
        }
    }
}

async fn leaderboard_screen(
    console: &mut Console,
    session: &mut SessionOrchestrator,
    mut vm: LeaderboardViewModel,
) -> bool {
    println!();
    println!("🏁 Final score: {}", session.final_score());
    show_notice(session);
    vm.load().await;
    loop {
        render_leaderboard(&vm);
        let Some(choice) = console
            .ask("[1-3] tier  [r] retry  [a] play again  [b] main menu  [o] log out")
            .await
        else {
            return false;
        };
        match choice.as_str() {
            "r" => {
                vm.retry().await;
            }
            "a" => {
                return match session.play_again() {
                    Ok(ticket) => play(console, session, ticket).await,
                    Err(e) => {
                        println!("❌ {}", e.user_message());
                        true
                    }
                };
            }
            "b" => {
                session.main_menu();
                return true;
            }
            "o" => {
                let _ = session.sign_out().await;
                return true;
            }
            other => {
                if let Ok(tier) = other.parse::<DifficultyTier>() {
                    vm.select_tier(tier).await;
                }
            }
        }
    }
}

fn render_leaderboard(vm: &LeaderboardViewModel) {
    println!("── Top scores: {} ──", vm.tier());
    match vm.status() {
        LeaderboardStatus::Loading => println!("Loading top scores..."),
        LeaderboardStatus::Empty => {
            println!("No scores recorded yet for the {} level.", vm.tier());
        }
        LeaderboardStatus::Failed { message } => println!("❌ {message}  (r to retry)"),
        LeaderboardStatus::Ready(rows) => {
            for row in rows {
                let medal = match row.medal {
                    Some(Medal::Gold) => "🥇",
                    Some(Medal::Silver) => "🥈",
                    Some(Medal::Bronze) => "🥉",
                    None => "  ",
                };
                let marker = if row.highlighted { "  ← you" } else { "" };
                println!(
                    "{medal} {:>2}. {:<32} {:>5}{marker}",
                    row.rank, row.entry.player_label, row.entry.score
                );
            }
        }
    }
}

async fn play(console: &mut Console, session: &mut SessionOrchestrator, ticket: RoundTicket) -> bool {
    let outcome = match ticket.mode {
        GameMode::CardMatch => play_board(console, session, &ticket).await,
        GameMode::PuzzleGuess | GameMode::PuzzleSprint => {
            play_puzzles(console, session, &ticket).await
        }
    };
    let Some(outcome) = outcome else {
        return false;
    };
    session.finish_round(ticket.id, outcome).await;
    true
}

/// Returns `None` when stdin closed mid-round.
async fn play_puzzles(
    console: &mut Console,
    session: &mut SessionOrchestrator,
    ticket: &RoundTicket,
) -> Option<RoundOutcome> {
    let runner = RoundRunner::new(session.app().puzzles.clone(), ticket.config.clone());
    let mut handle = runner.spawn();
    let mut auth = session.auth_changes();
    let mut stdin_open = true;
    println!("Type a digit and press enter. [r] retry a failed load  [q] quit");
    render_round(&handle.view.borrow());

    let outcome = loop {
        tokio::select! {
            joined = &mut handle.task => {
                break joined.unwrap_or_else(|e| {
                    error!(error = %e, "Round task failed");
                    RoundOutcome::Abandoned
                });
            }
            Ok(()) = handle.view.changed() => render_round(&handle.view.borrow()),
            Ok(()) = auth.changed() => {
                if session.sync_auth() == Screen::Auth {
                    handle.cancel.cancel();
                }
            }
            line = console.next_line(), if stdin_open => {
                let Some(line) = line else {
                    stdin_open = false;
                    handle.cancel.cancel();
                    continue;
                };
                let input = match confirm_quit_step(session, &line) {
                    QuitStep::Quit => Some(PlayerInput::Quit),
                    QuitStep::Handled => None,
                    QuitStep::PassThrough if line == "r" => Some(PlayerInput::Retry),
                    QuitStep::PassThrough => Some(PlayerInput::Answer(line)),
                };
                if let Some(input) = input {
                    let _ = handle.input.send(input).await;
                }
            }
        }
    };
    stdin_open.then_some(outcome)
}

async fn play_board(
    console: &mut Console,
    session: &mut SessionOrchestrator,
    ticket: &RoundTicket,
) -> Option<RoundOutcome> {
    let runner = match MatchRunner::new(ticket.config.clone(), session.app().settings.shuffle_seed) {
        Ok(runner) => runner,
        Err(e) => {
            println!("❌ {}", e.user_message());
            return Some(RoundOutcome::Abandoned);
        }
    };
    let mut handle = runner.spawn();
    let mut auth = session.auth_changes();
    let mut stdin_open = true;
    println!("Type a card number to flip it. [q] quit");
    render_board(&handle.view.borrow());

    let outcome = loop {
        tokio::select! {
            joined = &mut handle.task => {
                break joined.unwrap_or_else(|e| {
                    error!(error = %e, "Board task failed");
                    RoundOutcome::Abandoned
                });
            }
            Ok(()) = handle.view.changed() => render_board(&handle.view.borrow()),
            Ok(()) = auth.changed() => {
                if session.sync_auth() == Screen::Auth {
                    handle.cancel.cancel();
                }
            }
            line = console.next_line(), if stdin_open => {
                let Some(line) = line else {
                    stdin_open = false;
                    handle.cancel.cancel();
                    continue;
                };
                let input = match confirm_quit_step(session, &line) {
                    QuitStep::Quit => Some(BoardInput::Quit),
                    QuitStep::Handled => None,
                    QuitStep::PassThrough => match line.parse::<usize>() {
                        Ok(n) if n >= 1 => Some(BoardInput::Flip(n - 1)),
                        _ => {
                            println!("Enter a card number.");
                            None
                        }
                    },
                };
                if let Some(input) = input {
                    let _ = handle.input.send(input).await;
                }
            }
        }
    };
    stdin_open.then_some(outcome)
}

enum QuitStep {
    Quit,
    Handled,
    PassThrough,
}

/// `q` asks for confirmation; `y` confirms, anything else resumes.
fn confirm_quit_step(session: &mut SessionOrchestrator, line: &str) -> QuitStep {
    if session.screen() == Screen::ConfirmQuit {
        if line.eq_ignore_ascii_case("y") {
            session.confirm_quit();
            return QuitStep::Quit;
        }
        session.cancel_quit();
        println!("Resumed.");
        return QuitStep::Handled;
    }
    if line == "q" || line.eq_ignore_ascii_case("esc") {
        session.request_quit();
        println!("Are you sure you want to quit? Your progress will be lost. [y/N]");
        return QuitStep::Handled;
    }
    QuitStep::PassThrough
}

fn render_round(view: &RoundView) {
    let s = &view.state;
    let lives = s
        .lives_remaining
        .map(|n| format!("  {}", "❤".repeat(usize::from(n))))
        .unwrap_or_default();
    if let Some(level) = view.level_up {
        println!("⭐ Level up! Level {level}");
    }
    match s.phase {
        Phase::Loading => match &s.fetch_error {
            Some(message) => println!("❌ {message}  (r to retry)"),
            None => println!("Loading puzzle..."),
        },
        Phase::AwaitingAnswer => {
            if let Some(puzzle) = &s.current_puzzle {
                // Every fifth second and the last three.
                if (s.time_remaining % 5 == 0 || s.time_remaining <= 3) && view.notice.is_none() {
                    println!(
                        "⏱ {:>2}s  score {}{lives}  level {}  🖼 {}",
                        s.time_remaining, s.score, s.level, puzzle.image_ref
                    );
                }
            }
        }
        Phase::FeedbackCorrect => {
            println!("✅ Correct! +{}  score {}{lives}", view.score_unit, s.score)
        }
        Phase::FeedbackIncorrect => match s.last_feedback {
            Some(Feedback::TimedOut) => println!("⌛ Time's up!{lives}"),
            _ => {
                let answer = s
                    .current_puzzle
                    .as_ref()
                    .map(|p| format!(" The answer was {}.", p.solution))
                    .unwrap_or_default();
                println!("❌ Wrong.{answer}{lives}");
            }
        },
        Phase::Ended => println!("Game over. Final score {}", s.score),
    }
    if let Some(notice) = &view.notice {
        println!("⚠ {notice}");
    }
}

fn render_board(view: &BoardView) {
    if let Some(notice) = &view.notice {
        println!("⚠ {notice}");
        return;
    }
    let faces: Vec<String> = view
        .cards
        .iter()
        .enumerate()
        .map(|(i, card)| {
            if card.is_matched || card.is_flipped {
                format!("[{:>2}:{:<7}]", i + 1, card.icon.as_str())
            } else {
                format!("[{:>2}:   ?   ]", i + 1)
            }
        })
        .collect();
    for row in faces.chunks(4) {
        println!("{}", row.join(" "));
    }
    let status = match view.phase {
        BoardPhase::Active => "",
        BoardPhase::Resolving => "  (checking...)",
        BoardPhase::Ended => "  finished",
    };
    println!(
        "⏱ {:>2}s  score {}  pairs {}/{}{status}",
        view.time_remaining, view.score, view.matched_pairs, view.pair_count
    );
}
