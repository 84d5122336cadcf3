use itertools::Itertools;



const COMMANDS: &[Command] = &[
  Command::new("move", Target::Move, 2),
  Command::new("new", Target::NewGame, 0),
  Command::new("help", Target::Help, 0),
  Command::new("quit", Target::Quit, 0),
  Command::new("exit", Target::Quit, 0),
  Command::new("stop", Target::Quit, 0)
];

#[derive(Debug, Clone, Copy)]
struct Command {
  name: &'static str,
  target: Target,
  args: usize
}

impl Command {
  const fn new(name: &'static str, target: Target, args: usize) -> Self {
    Command { name, target, args }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
  Move,
  NewGame,
  Help,
  Quit
}

/// One submitted line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
  /// An origin and a destination square, as typed.
  Move(String, String),
  NewGame,
  Help,
  Quit,
  Empty
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
  #[error("command {0:?} not found, expected two squares or one of {list}", list = command_names())]
  CommandNotFound(String),
  #[error("{0} expects {1} argument(s), found {2}")]
  InsufficientArgs(&'static str, usize, usize)
}

pub fn parse_input(line: &str) -> Result<Input, InputError> {
  let args = line.split_whitespace().collect::<Vec<&str>>();
  let Some((&first, rest)) = args.split_first() else {
    return Ok(Input::Empty);
  };

  let command = COMMANDS.iter()
    .find(|command| command.name.eq_ignore_ascii_case(first));
  match command {
    Some(command) if command.args != rest.len() => {
      Err(InputError::InsufficientArgs(command.name, command.args, rest.len()))
    },
    Some(command) => Ok(match command.target {
      Target::Move => Input::Move(rest[0].to_owned(), rest[1].to_owned()),
      Target::NewGame => Input::NewGame,
      Target::Help => Input::Help,
      Target::Quit => Input::Quit
    }),
    // a bare pair of squares is a move
    None if args.len() == 2 => Ok(Input::Move(args[0].to_owned(), args[1].to_owned())),
    None => Err(InputError::CommandNotFound(first.to_owned()))
  }
}

pub fn command_names() -> String {
  COMMANDS.iter().map(|command| command.name).join(", ")
}

pub fn help_lines() -> [&'static str; 4] {
  [
    "Enter the square of the piece you want to move and the square to move it to (e.g. 'e2 e4').",
    "'move e2 e4' does the same thing.",
    "'new' starts a new game once the current game is over.",
    "'quit' exits."
  ]
}
