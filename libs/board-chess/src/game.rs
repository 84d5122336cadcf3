use shakmaty::{Board, Chess, Color, File, Move, Position, Square};

use std::fmt;

pub const MESSAGE_APPLIED: &str = "Move successful!";
pub const MESSAGE_ILLEGAL: &str = "Illegal move! Try again.";
pub const MESSAGE_INVALID_SQUARE: &str = "Invalid square entered. Use standard algebraic notation (e.g., 'e2', 'e4').";

/// Halfmove clock value at which the seventy-five-move rule ends the game.
const SEVENTY_FIVE_MOVES: u32 = 150;



#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SquareParseError {
  #[error("no square given")]
  Empty,
  #[error("expected a file letter and a rank digit, found {0} characters")]
  Length(usize),
  #[error("invalid file {0:?}, expected a letter from 'a' to 'h'")]
  File(char),
  #[error("invalid rank {0:?}, expected a digit from '1' to '8'")]
  Rank(char)
}

/// Parses a square name such as `e2`, exactly as written: lowercase file, no surrounding whitespace.
pub fn parse_square(text: &str) -> Result<Square, SquareParseError> {
  text.parse::<Square>().map_err(|_| {
    let mut chars = text.chars();
    match (chars.next(), chars.next(), chars.next()) {
      (None, ..) => SquareParseError::Empty,
      (Some('a'..='h'), Some(rank), None) => SquareParseError::Rank(rank),
      (Some(file), Some(..), None) => SquareParseError::File(file),
      _ => SquareParseError::Length(text.chars().count())
    }
  })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
  #[error("invalid square: {0}")]
  InvalidSquare(#[from] SquareParseError),
  #[error("no legal move from {from} to {to}")]
  IllegalMove {
    from: Square,
    to: Square
  }
}

impl MoveError {
  /// The message shown to the player when a submission is rejected.
  pub fn message(&self) -> &'static str {
    match self {
      MoveError::InvalidSquare(..) => MESSAGE_INVALID_SQUARE,
      MoveError::IllegalMove { .. } => MESSAGE_ILLEGAL
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
  Applied,
  Rejected
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
  pub outcome: MoveOutcome,
  pub message: &'static str
}

impl MoveReport {
  pub fn is_applied(&self) -> bool {
    self.outcome == MoveOutcome::Applied
  }
}

impl From<&Result<Move, MoveError>> for MoveReport {
  fn from(result: &Result<Move, MoveError>) -> Self {
    match result {
      Ok(..) => MoveReport { outcome: MoveOutcome::Applied, message: MESSAGE_APPLIED },
      Err(error) => MoveReport { outcome: MoveOutcome::Rejected, message: error.message() }
    }
  }
}

/// Why a game has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
  Checkmate,
  Stalemate,
  InsufficientMaterial,
  SeventyFiveMoves
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOutcome {
  WhiteWins,
  BlackWins,
  Draw
}

impl GameOutcome {
  pub fn winner(self) -> Option<Color> {
    match self {
      GameOutcome::WhiteWins => Some(Color::White),
      GameOutcome::BlackWins => Some(Color::Black),
      GameOutcome::Draw => None
    }
  }

  fn from_winner(winner: Color) -> Self {
    match winner {
      Color::White => GameOutcome::WhiteWins,
      Color::Black => GameOutcome::BlackWins
    }
  }
}

impl fmt::Display for GameOutcome {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str(match self {
      GameOutcome::WhiteWins => "1-0",
      GameOutcome::BlackWins => "0-1",
      GameOutcome::Draw => "1/2-1/2"
    })
  }
}

/// A single game of chess, the only owner of its position.
/// Moves are checked against the legal moves of the current position
/// and are either played completely or not at all.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
  position: Chess
}

impl GameSession {
  pub fn new() -> Self {
    GameSession { position: Chess::default() }
  }

  pub fn from_position(position: Chess) -> Self {
    GameSession { position }
  }

  #[inline]
  pub fn position(&self) -> &Chess {
    &self.position
  }

  #[inline]
  pub fn board(&self) -> &Board {
    self.position.board()
  }

  #[inline]
  pub fn turn(&self) -> Color {
    self.position.turn()
  }

  /// Discards the current game and starts over from the standard starting position.
  pub fn new_game(&mut self) {
    self.position = Chess::default();
  }

  pub fn termination(&self) -> Option<Termination> {
    if self.position.is_checkmate() {
      Some(Termination::Checkmate)
    } else if self.position.is_stalemate() {
      Some(Termination::Stalemate)
    } else if self.position.is_insufficient_material() {
      Some(Termination::InsufficientMaterial)
    } else if self.position.halfmoves() >= SEVENTY_FIVE_MOVES {
      Some(Termination::SeventyFiveMoves)
    } else {
      None
    }
  }

  #[inline]
  pub fn is_terminal(&self) -> bool {
    self.termination().is_some()
  }

  /// Returns `None` while the game is still in progress.
  pub fn outcome(&self) -> Option<GameOutcome> {
    self.termination().map(|termination| match termination {
      // the side to move is the side that has been mated
      Termination::Checkmate => GameOutcome::from_winner(self.turn().other()),
      _ => GameOutcome::Draw
    })
  }

  /// Plays the move between the two named squares, if it is legal.
  pub fn try_move(&mut self, origin: &str, destination: &str) -> Result<Move, MoveError> {
    let from = parse_square(origin)?;
    let to = parse_square(destination)?;
    let m = self.find_legal_move(from, to)
      .ok_or(MoveError::IllegalMove { from, to })?;
    let position = self.position.clone().play(m.clone())
      .map_err(|_| MoveError::IllegalMove { from, to })?;
    self.position = position;
    Ok(m)
  }

  pub fn submit_move(&mut self, origin: &str, destination: &str) -> MoveReport {
    let result = self.try_move(origin, destination);
    match &result {
      Ok(m) => debug!("Played {m:?}, {:?} to move", self.turn()),
      Err(error) => debug!("Rejected move {origin:?} {destination:?}: {error}")
    };

    MoveReport::from(&result)
  }

  fn find_legal_move(&self, from: Square, to: Square) -> Option<Move> {
    // castling may also be entered as the king moving onto its own rook
    self.position.legal_moves().into_iter().find(|m| {
      m.from() == Some(from) && (move_destination(m) == to || m.to() == to) && m.promotion().is_none()
    })
  }
}

/// The square a move is usually entered with, castling is entered as the king's two-square step.
pub fn move_destination(m: &Move) -> Square {
  match *m {
    Move::Castle { king, rook } => {
      let file = if rook.file() > king.file() { File::G } else { File::C };
      Square::from_coords(file, king.rank())
    },
    _ => m.to()
  }
}



#[cfg(test)]
mod tests {
  use super::*;
  use crate::render::{render_board, PIECES};
  use crate::render::tests::{test_assets, sprite_color, BOARD_BACKGROUND};
  use proptest::prelude::*;
  use shakmaty::{CastlingMode, EnPassantMode, Piece, Rank, Role, Setup};
  use shakmaty::fen::Fen;

  /// The whole game state, castling rights and en passant square included.
  fn snapshot(game: &GameSession) -> Setup {
    game.position().to_setup(EnPassantMode::Legal)
  }

  fn from_fen(fen: &str) -> GameSession {
    let position = fen.parse::<Fen>().unwrap()
      .into_position::<Chess>(CastlingMode::Standard).unwrap();
    GameSession::from_position(position)
  }

  fn play_all(game: &mut GameSession, moves: &[(&str, &str)]) {
    for &(origin, destination) in moves {
      let report = game.submit_move(origin, destination);
      assert!(report.is_applied(), "{origin} {destination}: {}", report.message);
    };
  }

  #[test]
  fn test_parse_square() {
    assert_eq!(parse_square("e2"), Ok(Square::E2));
    assert_eq!(parse_square("h8"), Ok(Square::H8));
    assert_eq!(parse_square(" h8 "), Err(SquareParseError::Length(4)));
    assert_eq!(parse_square("h8 "), Err(SquareParseError::Length(3)));
    assert_eq!(parse_square("A1"), Err(SquareParseError::File('A')));
    assert_eq!(parse_square(""), Err(SquareParseError::Empty));
    assert_eq!(parse_square("   "), Err(SquareParseError::Length(3)));
    assert_eq!(parse_square("e"), Err(SquareParseError::Length(1)));
    assert_eq!(parse_square("e22"), Err(SquareParseError::Length(3)));
    assert_eq!(parse_square("z9"), Err(SquareParseError::File('z')));
    assert_eq!(parse_square("e9"), Err(SquareParseError::Rank('9')));
    assert_eq!(parse_square("e0"), Err(SquareParseError::Rank('0')));
    assert_eq!(parse_square("éa"), Err(SquareParseError::File('é')));
  }

  #[test]
  fn test_scenario_legal_move() {
    let mut game = GameSession::new();
    let report = game.submit_move("e2", "e4");
    assert_eq!(report, MoveReport { outcome: MoveOutcome::Applied, message: MESSAGE_APPLIED });
    assert_eq!(game.board().piece_at(Square::E4), Some(Piece { color: Color::White, role: Role::Pawn }));
    assert_eq!(game.board().piece_at(Square::E2), None);
    assert_eq!(game.turn(), Color::Black);
  }

  #[test]
  fn test_scenario_illegal_move() {
    let mut game = GameSession::new();
    let before = snapshot(&game);
    let report = game.submit_move("e2", "e5");
    assert_eq!(report, MoveReport { outcome: MoveOutcome::Rejected, message: MESSAGE_ILLEGAL });
    assert_eq!(snapshot(&game), before);
    assert_eq!(
      game.try_move("e2", "e5"),
      Err(MoveError::IllegalMove { from: Square::E2, to: Square::E5 })
    );
  }

  #[test]
  fn test_scenario_invalid_square() {
    let mut game = GameSession::new();
    let before = snapshot(&game);
    let report = game.submit_move("z9", "e4");
    assert_eq!(report, MoveReport { outcome: MoveOutcome::Rejected, message: MESSAGE_INVALID_SQUARE });
    assert_eq!(snapshot(&game), before);

    assert_eq!(game.submit_move("e2", "").message, MESSAGE_INVALID_SQUARE);
    assert_eq!(game.try_move("e2", "e44"), Err(MoveError::InvalidSquare(SquareParseError::Length(3))));
    assert_eq!(snapshot(&game), before);
  }

  #[test]
  fn test_square_names_are_not_normalized() {
    let mut game = GameSession::new();
    let before = snapshot(&game);
    for (origin, destination) in [("E2", "E4"), ("e2", "E4"), (" e2", "e4 "), ("e2", "e4\n")] {
      let report = game.submit_move(origin, destination);
      assert_eq!(report, MoveReport { outcome: MoveOutcome::Rejected, message: MESSAGE_INVALID_SQUARE });
      assert_eq!(snapshot(&game), before);
    };

    assert!(game.submit_move("e2", "e4").is_applied());
  }

  #[test]
  fn test_moving_out_of_turn_is_illegal() {
    let mut game = GameSession::new();
    assert_eq!(game.submit_move("e7", "e5").outcome, MoveOutcome::Rejected);
    assert_eq!(game.submit_move("e4", "e5").outcome, MoveOutcome::Rejected);
    assert_eq!(game.turn(), Color::White);
  }

  #[test]
  fn test_scenario_checkmate_and_new_game() {
    let mut game = GameSession::new();
    assert!(!game.is_terminal());
    assert_eq!(game.outcome(), None);

    play_all(&mut game, &[("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")]);
    assert!(game.is_terminal());
    assert_eq!(game.termination(), Some(Termination::Checkmate));
    assert_eq!(game.outcome(), Some(GameOutcome::BlackWins));
    assert_eq!(game.outcome().and_then(GameOutcome::winner), Some(Color::Black));
    assert_eq!(game.submit_move("a2", "a3").outcome, MoveOutcome::Rejected);

    game.new_game();
    assert!(!game.is_terminal());
    assert_eq!(snapshot(&game), snapshot(&GameSession::new()));
  }

  #[test]
  fn test_white_checkmate() {
    let mut game = GameSession::new();
    play_all(&mut game, &[
      ("e2", "e4"), ("e7", "e5"),
      ("f1", "c4"), ("b8", "c6"),
      ("d1", "h5"), ("g8", "f6"),
      ("h5", "f7")
    ]);

    assert_eq!(game.outcome(), Some(GameOutcome::WhiteWins));
    assert_eq!(GameOutcome::WhiteWins.to_string(), "1-0");
  }

  #[test]
  fn test_draws() {
    let stalemate = from_fen("k7/8/1Q6/8/8/8/8/7K b - - 0 1");
    assert_eq!(stalemate.termination(), Some(Termination::Stalemate));
    assert_eq!(stalemate.outcome(), Some(GameOutcome::Draw));

    let bare_kings = from_fen("k7/8/8/8/8/8/8/7K w - - 0 1");
    assert_eq!(bare_kings.termination(), Some(Termination::InsufficientMaterial));

    let seventy_five = from_fen("k7/8/8/8/8/8/8/1R5K w - - 150 120");
    assert_eq!(seventy_five.termination(), Some(Termination::SeventyFiveMoves));
    assert_eq!(seventy_five.outcome(), Some(GameOutcome::Draw));

    let in_progress = from_fen("k7/8/8/8/8/8/8/1R5K w - - 149 120");
    assert_eq!(in_progress.outcome(), None);
  }

  #[test]
  fn test_castling_uses_king_destination() {
    let mut game = from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    assert!(game.submit_move("e1", "g1").is_applied());
    assert_eq!(game.board().piece_at(Square::G1), Some(Piece { color: Color::White, role: Role::King }));
    assert_eq!(game.board().piece_at(Square::F1), Some(Piece { color: Color::White, role: Role::Rook }));

    assert!(game.submit_move("e8", "c8").is_applied());
    assert_eq!(game.board().piece_at(Square::C8), Some(Piece { color: Color::Black, role: Role::King }));
    assert_eq!(game.board().piece_at(Square::D8), Some(Piece { color: Color::Black, role: Role::Rook }));
  }

  #[test]
  fn test_castling_onto_own_rook() {
    let mut game = from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
    assert!(game.submit_move("e1", "h1").is_applied());
    assert_eq!(game.board().piece_at(Square::G1), Some(Piece { color: Color::White, role: Role::King }));
    assert_eq!(game.board().piece_at(Square::F1), Some(Piece { color: Color::White, role: Role::Rook }));
    assert_eq!(game.board().piece_at(Square::H1), None);

    assert!(game.submit_move("e8", "a8").is_applied());
    assert_eq!(game.board().piece_at(Square::C8), Some(Piece { color: Color::Black, role: Role::King }));
    assert_eq!(game.board().piece_at(Square::D8), Some(Piece { color: Color::Black, role: Role::Rook }));
  }

  #[test]
  fn test_rejected_move_keeps_castling_rights_and_en_passant() {
    let mut game = from_fen("r3k2r/8/8/3pP3/8/8/8/R3K2R w KQkq d6 0 2");
    let before = snapshot(&game);
    assert_eq!(before.ep_square, Some(Square::D6));
    assert_eq!(game.submit_move("e1", "e3").outcome, MoveOutcome::Rejected);
    assert_eq!(game.submit_move("h1", "h9").outcome, MoveOutcome::Rejected);
    assert_eq!(snapshot(&game), before);

    assert!(game.submit_move("e5", "d6").is_applied());
    assert_eq!(snapshot(&game).ep_square, None);
  }

  #[test]
  fn test_promotion_without_piece_is_illegal() {
    let mut game = from_fen("k7/4P3/8/8/8/8/8/7K w - - 0 1");
    let before = snapshot(&game);
    assert_eq!(game.submit_move("e7", "e8").outcome, MoveOutcome::Rejected);
    assert_eq!(snapshot(&game), before);
  }

  #[test]
  fn test_en_passant() {
    let mut game = GameSession::new();
    play_all(&mut game, &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5"), ("e5", "d6")]);
    assert_eq!(game.board().piece_at(Square::D5), None);
    assert_eq!(game.board().piece_at(Square::D6), Some(Piece { color: Color::White, role: Role::Pawn }));
  }

  fn square_at(file: u32, rank: u32) -> Square {
    Square::from_coords(File::new(file), Rank::new(rank))
  }

  proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_legal_moves_flip_turn_and_rejections_change_nothing(
      choices in prop::collection::vec((any::<usize>(), 0u32..8, 0u32..8, 0u32..8, 0u32..8), 0..40)
    ) {
      let mut game = GameSession::new();
      for (choice, from_file, from_rank, to_file, to_rank) in choices {
        if game.is_terminal() { break };

        // an arbitrary pair of squares is usually not a legal move
        let before = snapshot(&game);
        let from = square_at(from_file, from_rank);
        let to = square_at(to_file, to_rank);
        let report = game.submit_move(&from.to_string(), &to.to_string());
        if report.is_applied() {
          prop_assert_ne!(game.turn(), before.turn);
        } else {
          prop_assert_eq!(snapshot(&game), before);
        };

        let legal_moves: Vec<Move> = game.position().legal_moves().into_iter()
          .filter(|m| m.promotion().is_none())
          .collect();
        if legal_moves.is_empty() { break };

        let m = &legal_moves[choice % legal_moves.len()];
        let turn = game.turn();
        let origin = m.from().map(|square| square.to_string()).unwrap_or_default();
        let report = game.submit_move(&origin, &move_destination(m).to_string());
        prop_assert!(report.is_applied());
        prop_assert_eq!(game.turn(), turn.other());
      };
    }

    #[test]
    fn prop_render_places_the_right_sprite_on_every_square(
      choices in prop::collection::vec(any::<usize>(), 0..30)
    ) {
      let mut game = GameSession::new();
      for choice in choices {
        let legal_moves: Vec<Move> = game.position().legal_moves().into_iter().collect();
        if legal_moves.is_empty() { break };
        let m = legal_moves[choice % legal_moves.len()].clone();
        game = GameSession::from_position(game.position().clone().play(m).unwrap());
      };

      let assets = test_assets(32);
      let layout = assets.layout();
      let img = render_board(game.board(), &assets);
      for file in 0..8 {
        for rank in 0..8 {
          let square = square_at(file, rank);
          let center = layout.square_origin(square) + layout.square_size() / 2;
          let expected = game.board().piece_at(square).map_or(BOARD_BACKGROUND, sprite_color);
          prop_assert_eq!(*img.get_pixel(center.x, center.y), expected);
        };
      };

      // every sprite color is unique, so a sprite never shows up on the wrong square
      let colors: Vec<_> = PIECES.iter().map(|&piece| sprite_color(piece)).collect();
      for (i, color) in colors.iter().enumerate() {
        prop_assert!(!colors[i + 1..].contains(color));
        prop_assert_ne!(*color, BOARD_BACKGROUND);
      };
    }
  }
}
