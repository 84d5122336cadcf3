use crate::ViewerResult;
use crate::config::Config;
use crate::input::{self, Input};
use crate::utils::{color_name, Contextualize, Loggable};

use board_chess::game::{GameSession, Termination};
use board_chess::render::{self, Assets};
use linefeed::{DefaultTerminal, Interface, ReadResult, Signal};

use std::io::BufWriter;
use std::sync::mpsc::Receiver;

/// Everything that lives for the length of one session.
/// Starting a new game replaces the whole session, not just the board.
#[derive(Debug, Clone, Default)]
pub struct Session {
  game: GameSession,
  last_reply: Option<Reply>
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
  Success(String),
  Error(String),
  Info(Vec<&'static str>)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
  Continue,
  Quit
}

impl Session {
  pub fn new() -> Self {
    Session::default()
  }

  pub fn game(&self) -> &GameSession {
    &self.game
  }

  pub fn last_reply(&self) -> Option<&Reply> {
    self.last_reply.as_ref()
  }

  /// Handles one submitted line.
  pub fn handle_line(&mut self, line: &str) -> Flow {
    match input::parse_input(line) {
      Ok(input) => self.handle(input),
      Err(error) => {
        self.last_reply = Some(Reply::Error(error.to_string()));
        Flow::Continue
      }
    }
  }

  pub fn handle(&mut self, input: Input) -> Flow {
    let reply = match input {
      Input::Quit => return Flow::Quit,
      Input::Empty => None,
      Input::Help => Some(Reply::Info(input::help_lines().to_vec())),
      // the move form is only shown while the game is in progress
      Input::Move(..) if self.game.is_terminal() => {
        Some(Reply::Error("The game is over, enter 'new' to start a new game.".to_owned()))
      },
      Input::Move(origin, destination) => {
        let report = self.game.submit_move(&origin, &destination);
        if report.is_applied() {
          info!("{origin} -> {destination}");
          Some(Reply::Success(report.message.to_owned()))
        } else {
          Some(Reply::Error(report.message.to_owned()))
        }
      },
      Input::NewGame if self.game.is_terminal() => {
        info!("Starting a new game");
        *self = Session::new();
        None
      },
      Input::NewGame => {
        Some(Reply::Error("A new game can only be started once the current game is over.".to_owned()))
      }
    };

    self.last_reply = reply;
    Flow::Continue
  }

  /// The heading shown above the board: whose turn it is, or how the game ended.
  pub fn status_lines(&self) -> Vec<String> {
    match (self.game.termination(), self.game.outcome()) {
      (Some(termination), Some(outcome)) => vec![
        termination_headline(termination).to_owned(),
        match outcome.winner() {
          Some(winner) => format!("Team {} wins!", color_name(winner)),
          None => "Draw!".to_owned()
        },
        format!("Result: {outcome}. Enter 'new' to start a new game.")
      ],
      _ => vec![
        "Chess Game".to_owned(),
        format!("Current Turn: {}", color_name(self.game.turn()))
      ]
    }
  }

  pub fn write_board(&self, config: &Config, assets: &Assets) -> ViewerResult {
    let img = render::render_board(self.game.board(), assets);
    if let Some(parent) = config.output.parent() {
      fs_err::create_dir_all(parent).context("failed to create board output directory")?;
    };

    let file = fs_err::File::create(&config.output).context("failed to create board image")?;
    render::encode_image_rgba(&img, BufWriter::new(file)).context("failed to encode board image")?;
    trace!("Wrote board to {}", config.output.display());
    Ok(())
  }

  fn present(&self, interface: &Interface<DefaultTerminal>, config: &Config, assets: &Assets) -> ViewerResult {
    // write failures are logged and the session carries on
    self.write_board(config, assets).log();

    let result = match &self.last_reply {
      Some(Reply::Success(message)) => writeln!(interface, "[ok] {message}"),
      Some(Reply::Error(message)) => writeln!(interface, "[error] {message}"),
      Some(Reply::Info(lines)) => lines.iter().try_for_each(|line| writeln!(interface, "{line}")),
      None => Ok(())
    };

    result.context("failed to write to terminal")?;

    for line in self.status_lines() {
      writeln!(interface, "{line}").context("failed to write to terminal")?;
    };

    writeln!(interface, "Board: {}", config.output.display()).context("failed to write to terminal")?;
    Ok(())
  }
}

fn termination_headline(termination: Termination) -> &'static str {
  match termination {
    Termination::Checkmate => "CHECKMATE!!!!",
    Termination::Stalemate => "STALEMATE!",
    Termination::InsufficientMaterial => "INSUFFICIENT MATERIAL!",
    Termination::SeventyFiveMoves => "SEVENTY-FIVE MOVE RULE!"
  }
}

/// Runs the session loop until the player quits, re-rendering after every submitted line.
pub fn run(config: &Config, assets: &Assets, logger_receiver: &Receiver<String>) -> ViewerResult {
  let interface = Interface::new(env!("CARGO_PKG_NAME")).context("failed to open terminal")?;
  interface.set_prompt("> ").context("failed to open terminal")?;
  interface.set_report_signal(Signal::Interrupt, true);

  let pipe_lines = |interface: &Interface<DefaultTerminal>| {
    for line in logger_receiver.try_iter() {
      write!(interface, "{line}").context("failed to write to terminal")?;
    };

    ViewerResult::Ok(())
  };

  let mut session = Session::new();
  for line in input::help_lines() {
    writeln!(interface, "{line}").context("failed to write to terminal")?;
  };

  loop {
    session.present(&interface, config, assets)?;
    pipe_lines(&interface)?;

    let flow = match interface.read_line().context("failed to read input")? {
      ReadResult::Input(line) => {
        if !line.trim().is_empty() {
          interface.add_history_unique(line.clone());
        };

        session.handle_line(&line)
      },
      ReadResult::Eof | ReadResult::Signal(Signal::Interrupt) => Flow::Quit,
      ReadResult::Signal(..) => Flow::Continue
    };

    if flow == Flow::Quit { break };
  };

  info!("Session ended");
  pipe_lines(&interface)
}
