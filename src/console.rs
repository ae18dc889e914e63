//! Line-oriented console front-end.
//!
//! Each input line is one command; each response starts with `=` on success
//! or `?` on failure, followed by a blank line, in the style of the Go Text
//! Protocol. An optional numeric id before the command is echoed back.
//!
//! ## Supported Commands
//!
//! - `name`, `version`, `list_commands`, `known_command <cmd>`, `quit`
//! - `new [human|computer]` - Start a new game; who moves first (default human)
//! - `play <vertex>` - Human move such as `D3`; the computer replies
//! - `genmove` - Let the computer move now
//! - `hint` - Suggest a move for the human without playing it
//! - `undo` - Take back the human's last move
//! - `showboard` - Print the board, score and status
//! - `moves` - List legal moves for the side to move
//! - `stats` - Per-move statistics of the latest search
//! - `score` - Stone counts
//!
//! ## Example
//!
//! ```ignore
//! use reversi_mcts::config::EngineConfig;
//! use reversi_mcts::console::Console;
//! let mut console = Console::new(EngineConfig::default())?;
//! console.run()?;
//! ```

use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use anyhow::bail;

use crate::board::{format_point, parse_point, Stone};
use crate::config::EngineConfig;
use crate::error::SessionError;
use crate::session::{GameSession, SearchEvent};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "genmove",
    "hint",
    "known_command",
    "list_commands",
    "moves",
    "name",
    "new",
    "play",
    "quit",
    "score",
    "showboard",
    "stats",
    "undo",
    "version",
];

pub struct Console {
    session: GameSession,
    /// Let the computer answer right after a human move
    auto_reply: bool,
}

impl Console {
    pub fn new(config: EngineConfig) -> Result<Self, SessionError> {
        Ok(Self {
            session: GameSession::new(config)?,
            auto_reply: true,
        })
    }

    pub fn with_auto_reply(mut self, auto_reply: bool) -> Self {
        self.auto_reply = auto_reply;
        self
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Run the command loop on stdin and stdout.
    pub fn run(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.run_with(stdin.lock(), stdout.lock())
    }

    /// Run the command loop over arbitrary input and output.
    pub fn run_with<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> anyhow::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command id from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    pub fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        let result = match command {
            "name" => Ok("reversi-mcts".to_string()),
            "version" => Ok(env!("CARGO_PKG_VERSION").to_string()),
            "list_commands" => Ok(KNOWN_COMMANDS.join("\n")),
            "known_command" => match args.first() {
                Some(cmd) => Ok(KNOWN_COMMANDS
                    .contains(&cmd.to_lowercase().as_str())
                    .to_string()),
                None => return (false, "missing argument".to_string()),
            },
            "quit" => Ok(String::new()),
            "new" => self.cmd_new(args),
            "play" => match args.first() {
                Some(vertex) => self.cmd_play(vertex),
                None => return (false, "missing argument".to_string()),
            },
            "genmove" => self.cmd_genmove(),
            "hint" => self.cmd_hint(),
            "undo" => self.cmd_undo(),
            "showboard" => Ok(self.show()),
            "moves" => Ok(self.moves()),
            "stats" => Ok(self.stats()),
            "score" => Ok(self.score()),
            _ => return (false, format!("unknown command: {command}")),
        };
        match result {
            Ok(message) => (true, message),
            Err(e) => (false, e.to_string()),
        }
    }

    fn cmd_new(&mut self, args: &[&str]) -> anyhow::Result<String> {
        let human_first = match args.first().map(|a| a.to_lowercase()) {
            None => true,
            Some(a) if a == "human" => true,
            Some(a) if a == "computer" => false,
            Some(a) => bail!("expected 'human' or 'computer', got '{a}'"),
        };
        self.session.new_game(human_first)?;
        let mut out = String::new();
        if self.auto_reply {
            out.push_str(&self.reply()?);
        }
        out.push_str(&self.show());
        Ok(out)
    }

    fn cmd_play(&mut self, vertex: &str) -> anyhow::Result<String> {
        let (x, y) = parse_point(vertex, self.session.board().size())?;
        self.session.human_place(x, y)?;
        let mut out = String::new();
        if self.auto_reply {
            out.push_str(&self.reply()?);
        }
        out.push_str(&self.show());
        Ok(out)
    }

    fn cmd_undo(&mut self) -> anyhow::Result<String> {
        self.session.undo()?;
        Ok(self.show())
    }

    fn cmd_genmove(&mut self) -> anyhow::Result<String> {
        self.session.request_computer_move(false)?;
        match self.session.wait()? {
            Some(SearchEvent::Placed(p)) => Ok(format_point(p)),
            _ => Ok(String::new()),
        }
    }

    fn cmd_hint(&mut self) -> anyhow::Result<String> {
        self.session.request_computer_move(true)?;
        match self.session.wait()? {
            Some(SearchEvent::Hinted(p)) => Ok(format_point(p)),
            _ => Ok(String::new()),
        }
    }

    /// Let the computer play until it is the human's turn or the game ends.
    fn reply(&mut self) -> Result<String, SessionError> {
        let mut out = String::new();
        while self.session.is_computer_turn() {
            self.session.request_computer_move(false)?;
            if let Some(SearchEvent::Placed(p)) = self.session.wait()? {
                let _ = writeln!(
                    out,
                    "{} plays {}",
                    self.session.computer().name(),
                    format_point(p)
                );
            }
        }
        Ok(out)
    }

    fn show(&self) -> String {
        let s = &self.session;
        let mut out = s.board().to_string();
        let _ = write!(
            out,
            "black {} white {} - {}",
            s.count(Stone::Black),
            s.count(Stone::White),
            s.status_text()
        );
        if let Some(p) = s.last_move() {
            let _ = write!(out, " (last {})", format_point(p));
        }
        out
    }

    fn moves(&self) -> String {
        self.session
            .legal_moves()
            .iter()
            .map(|&p| format_point(p))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn stats(&self) -> String {
        self.session
            .move_stats()
            .iter()
            .map(|m| format!("{} {} {:.3}", format_point(m.mv), m.visits, m.win_ratio))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn score(&self) -> String {
        format!(
            "black {} white {}",
            self.session.count(Stone::Black),
            self.session.count(Stone::White)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn console() -> Console {
        let config = EngineConfig::default()
            .with_board_size(6)
            .with_simulations(100)
            .with_seed(Some(1));
        Console::new(config).unwrap()
    }

    #[test]
    fn test_parse_id_with_id() {
        let (id, cmd) = Console::parse_id("123 name");
        assert_eq!(id, Some(123));
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_parse_id_without_id() {
        let (id, cmd) = Console::parse_id("name");
        assert_eq!(id, None);
        assert_eq!(cmd, "name");
    }

    #[test]
    fn test_name_command() {
        let mut console = console();
        let (success, response) = console.execute("name", &[]);
        assert!(success);
        assert_eq!(response, "reversi-mcts");
    }

    #[test]
    fn test_known_command() {
        let mut console = console();
        assert_eq!(
            console.execute("known_command", &["hint"]),
            (true, "true".to_string())
        );
        assert_eq!(
            console.execute("known_command", &["komi"]),
            (true, "false".to_string())
        );
        assert!(!console.execute("known_command", &[]).0);
    }

    #[test]
    fn test_moves_on_opening() {
        let mut console = console();
        let (success, response) = console.execute("moves", &[]);
        assert!(success);
        // Black's four opening moves on 6x6, x-major order.
        assert_eq!(response, "B3 C2 D5 E4");
    }

    #[test]
    fn test_play_gets_computer_reply() {
        let mut console = console();
        let (success, response) = console.execute("play", &["B3"]);
        assert!(success, "{response}");
        assert!(response.contains("white plays"));
        assert!(console.session().is_human_turn() || console.session().is_over());
    }

    #[test]
    fn test_illegal_play_rejected() {
        let mut console = console();
        let (success, response) = console.execute("play", &["A1"]);
        assert!(!success);
        assert!(response.contains("flips no stones"));
        assert_eq!(console.session().history().len(), 1);
    }

    #[test]
    fn test_undo_after_play() {
        let mut console = console();
        console.execute("play", &["B3"]);
        let (success, _) = console.execute("undo", &[]);
        assert!(success);
        assert_eq!(console.session().history().len(), 1);
    }

    #[test]
    fn test_run_with_script() {
        let mut console = console().with_auto_reply(false);
        let script = "1 name\n# comment\n\nplay C2\n2 bogus\nquit\nname\n";
        let mut out = Vec::new();
        console.run_with(script.as_bytes(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("=1 reversi-mcts\n\n"));
        assert!(text.contains("?2 unknown command: bogus"));
        // Nothing after quit is executed.
        assert_eq!(text.matches("reversi-mcts").count(), 1);
        assert_eq!(console.session().to_move(), Stone::White);
    }
}
