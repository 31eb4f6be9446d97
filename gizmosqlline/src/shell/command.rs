use std::path::PathBuf;

use clap::ValueEnum;

use super::render::OutputFormat;
use crate::error::{ShellError, ShellResult};

/// Commands start with this character; every other input is SQL.
pub const COMMAND_PREFIX: char = '!';

pub const COMMAND_HELP: &str = "\
!connect <url> [user] [password]  Open a connection (replaces the current one)
!close                            Close the current connection
!run <file>                       Run the statements in a script file
!outputformat <table|csv|tsv>     Change how query results are printed
!help                             Show this list
!quit, !exit, !q                  Leave the shell

SQL statements may span several lines and end with `;`.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect {
        url: String,
        user: Option<String>,
        password: Option<String>,
    },
    Close,
    Run(PathBuf),
    OutputFormat(OutputFormat),
    Help,
    Quit,
    Sql(String),
}

impl Command {
    pub fn parse(input: &str) -> ShellResult<Self> {
        let input = input.trim();
        let Some(body) = input.strip_prefix(COMMAND_PREFIX) else {
            return Ok(Command::Sql(input.to_string()));
        };

        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest),
            None => (body, ""),
        };
        let mut args = tokenize(rest)?.into_iter();
        let command = match name.to_ascii_lowercase().as_str() {
            "connect" => {
                let url = args
                    .next()
                    .ok_or(ShellError::Usage("!connect <url> [user] [password]"))?;
                Command::Connect {
                    url,
                    user: args.next(),
                    password: args.next(),
                }
            }
            "close" => Command::Close,
            "run" => {
                let path = args.next().ok_or(ShellError::Usage("!run <file>"))?;
                Command::Run(PathBuf::from(path))
            }
            "outputformat" => {
                let format = args
                    .next()
                    .ok_or(ShellError::Usage("!outputformat <table|csv|tsv>"))?;
                let parsed = OutputFormat::from_str(&format, true)
                    .map_err(|_| ShellError::OutputFormat(format))?;
                Command::OutputFormat(parsed)
            }
            "help" => Command::Help,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(ShellError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

/// Split on whitespace, honouring double quotes. `""` yields an empty
/// argument.
fn tokenize(input: &str) -> ShellResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
                in_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if in_quotes {
        return Err(ShellError::UnterminatedQuote(input.to_string()));
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

/// Collects input lines into complete commands.
///
/// `!` commands are complete on their own line. SQL is split on every `;`
/// outside quotes; the terminator is not part of the returned statement and
/// `--` comments are dropped.
#[derive(Debug, Default)]
pub struct StatementBuffer {
    pending: String,
    quote: Option<char>,
}

impl StatementBuffer {
    /// Feed one input line. Returns the statements it completed, in order.
    pub fn push_line(&mut self, line: &str) -> Vec<String> {
        let trimmed = line.trim();
        if self.is_empty() && trimmed.starts_with(COMMAND_PREFIX) {
            return vec![trimmed.to_string()];
        }

        if !self.pending.is_empty() {
            self.pending.push('\n');
        }
        let mut statements = Vec::new();
        let mut chars = line.trim_end().chars().peekable();
        while let Some(ch) = chars.next() {
            match (self.quote, ch) {
                (Some(open), c) if c == open => self.quote = None,
                (Some(_), _) => {}
                (None, '\'' | '"') => self.quote = Some(ch),
                (None, '-') if chars.peek() == Some(&'-') => break,
                (None, ';') => {
                    if let Some(statement) = self.take() {
                        statements.push(statement);
                    }
                    continue;
                }
                _ => {}
            }
            self.pending.push(ch);
        }

        if self.quote.is_none() && self.pending.trim().is_empty() {
            self.pending.clear();
        }
        statements
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.quote = None;
    }

    /// Whatever is left once input runs out, as a statement.
    pub fn finish(&mut self) -> Option<String> {
        self.quote = None;
        self.take()
    }

    fn take(&mut self) -> Option<String> {
        let statement = std::mem::take(&mut self.pending).trim().to_string();
        (!statement.is_empty()).then_some(statement)
    }
}

/// Split a complete block of input, such as an `-e` argument, into
/// statements. A missing final `;` is allowed.
pub fn split_statements(text: &str) -> Vec<String> {
    let mut buffer = StatementBuffer::default();
    let mut statements: Vec<String> = text
        .lines()
        .flat_map(|line| buffer.push_line(line))
        .collect();
    statements.extend(buffer.finish());
    statements
}
