//! Available commands, parsing, and autocomplete logic.

use std::path::PathBuf;

use crate::sync::Resolution;

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "show",
    aliases: &["s", "new"],
    description: "Show a random quote (respects the category filter)",
  },
  Command {
    name: "add",
    aliases: &["a"],
    description: "Add a quote: add <text> :: <category>",
  },
  Command {
    name: "filter",
    aliases: &["f"],
    description: "Filter by category: filter <category> (use 'all' to clear)",
  },
  Command {
    name: "categories",
    aliases: &["c", "cats"],
    description: "List the distinct categories",
  },
  Command {
    name: "list",
    aliases: &["l", "ls"],
    description: "List every quote in the collection",
  },
  Command {
    name: "sync",
    aliases: &[],
    description: "Sync against the remote source now",
  },
  Command {
    name: "resolve",
    aliases: &["r"],
    description: "Answer a pending conflict: resolve local|remote",
  },
  Command {
    name: "export",
    aliases: &["e"],
    description: "Export the collection to quotes.json (or a given path)",
  },
  Command {
    name: "import",
    aliases: &["i"],
    description: "Import quotes from a JSON file: import <path>",
  },
  Command {
    name: "help",
    aliases: &["h", "?"],
    description: "Show this command list",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit quotesync",
  },
];

/// A fully parsed user command, ready for the app reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
  Show,
  Add { text: String, category: String },
  Filter { category: String },
  Categories,
  List,
  Sync,
  Resolve(Resolution),
  Export { path: Option<PathBuf> },
  Import { path: PathBuf },
  Help,
  Quit,
}

/// Parse an input line into a command. Errors are user-visible messages.
pub fn parse(line: &str) -> Result<ParsedCommand, String> {
  let line = line.trim();
  let (word, rest) = match line.split_once(char::is_whitespace) {
    Some((word, rest)) => (word, rest.trim()),
    None => (line, ""),
  };

  let name = match resolve_name(word) {
    Some(name) => name,
    None => return Err(unknown_command(word)),
  };

  match name {
    "show" => Ok(ParsedCommand::Show),
    "add" => parse_add(rest),
    "filter" => {
      if rest.is_empty() {
        Err("Usage: filter <category> (use 'all' to clear)".to_string())
      } else {
        Ok(ParsedCommand::Filter {
          category: rest.to_string(),
        })
      }
    }
    "categories" => Ok(ParsedCommand::Categories),
    "list" => Ok(ParsedCommand::List),
    "sync" => Ok(ParsedCommand::Sync),
    "resolve" => match rest {
      "local" => Ok(ParsedCommand::Resolve(Resolution::KeepLocal)),
      "remote" => Ok(ParsedCommand::Resolve(Resolution::KeepRemote)),
      _ => Err("Usage: resolve local|remote".to_string()),
    },
    "export" => Ok(ParsedCommand::Export {
      path: if rest.is_empty() {
        None
      } else {
        Some(PathBuf::from(rest))
      },
    }),
    "import" => {
      if rest.is_empty() {
        Err("Usage: import <path>".to_string())
      } else {
        Ok(ParsedCommand::Import {
          path: PathBuf::from(rest),
        })
      }
    }
    "help" => Ok(ParsedCommand::Help),
    "quit" => Ok(ParsedCommand::Quit),
    // resolve_name and the arms above are kept in lockstep; if they ever
    // drift, fail like any other unknown word instead of panicking.
    _ => Err(unknown_command(word)),
  }
}

/// User-visible message for an unrecognized command word, with the
/// closest-ranked suggestion appended when one exists.
fn unknown_command(word: &str) -> String {
  match get_suggestions(word).first() {
    Some(cmd) => format!(
      "Unknown command '{}'. Did you mean '{}'? Type 'help' for the command list.",
      word, cmd.name
    ),
    None => format!("Unknown command '{}'. Type 'help' for the command list.", word),
  }
}

/// Both fields of an add must be present and non-empty; nothing is
/// mutated when they are not.
fn parse_add(rest: &str) -> Result<ParsedCommand, String> {
  let (text, category) = rest
    .split_once("::")
    .map(|(t, c)| (t.trim(), c.trim()))
    .unwrap_or((rest.trim(), ""));

  if text.is_empty() || category.is_empty() {
    return Err("Please enter both a quote and a category: add <text> :: <category>".to_string());
  }

  Ok(ParsedCommand::Add {
    text: text.to_string(),
    category: category.to_string(),
  })
}

/// Resolve an input word to a canonical command name via exact name or
/// alias match.
fn resolve_name(word: &str) -> Option<&'static str> {
  let word = word.to_lowercase();
  COMMANDS
    .iter()
    .find(|cmd| cmd.name == word || cmd.aliases.contains(&word.as_str()))
    .map(|cmd| cmd.name)
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}
