//! Line-oriented command protocol for the simulator.
//!
//! A line is split into whitespace-separated words. A word opening with
//! `"` starts a quoted argument that runs until a word closing with `"`;
//! the words in between are joined with single spaces, so book titles may
//! contain spaces.

use crate::error::Error;
use std::str::{FromStr, SplitWhitespace};

/// Cursor over the arguments of one line.
///
/// The cursor is an explicit value owned by the caller, so several lines
/// can be tokenized independently.
pub struct Tokenizer<'a> {
    words: SplitWhitespace<'a>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            words: line.split_whitespace(),
        }
    }

    fn quoted(&mut self, opening: &str) -> String {
        if let Some(inner) = opening.strip_suffix('"') {
            return inner.to_owned();
        }
        let mut arg = opening.to_owned();
        for word in self.words.by_ref() {
            if !arg.is_empty() {
                arg.push(' ');
            }
            if let Some(last) = word.strip_suffix('"') {
                arg.push_str(last);
                return arg;
            }
            arg.push_str(word);
        }
        log::warn!("Unterminated quoted argument {arg:?}");
        arg
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        let word = self.words.next()?;
        Some(match word.strip_prefix('"') {
            Some(rest) => self.quoted(rest),
            None => word.to_owned(),
        })
    }
}

/// One simulator command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Adds a book; followed by `definitions` lines of `<key> <value>`
    AddBook { name: String, definitions: usize },
    GetBook { name: String },
    RemoveBook { name: String },
    AddDefinition { book: String, key: String, value: String },
    GetDefinition { book: String, key: String },
    RemoveDefinition { book: String, key: String },
    AddUser { name: String },
    Borrow { user: String, book: String, days: u32 },
    Return { user: String, book: String, days_since: u32, rating: u32 },
    Lost { user: String, book: String },
    /// Prints the rankings and ends the session
    Exit,
}

fn arg(tokens: &mut Tokenizer<'_>) -> Result<String, Error> {
    tokens.next().ok_or(Error::InvalidCommand)
}

fn number<T: FromStr>(tokens: &mut Tokenizer<'_>) -> Result<T, Error> {
    arg(tokens)?.parse().map_err(|_| Error::InvalidCommand)
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut t = Tokenizer::new(line);
        let name = t.next().ok_or(Error::InvalidCommand)?;
        let command = match name.as_str() {
            "ADD_BOOK" => Self::AddBook {
                name: arg(&mut t)?,
                definitions: number(&mut t)?,
            },
            "GET_BOOK" => Self::GetBook { name: arg(&mut t)? },
            "RMV_BOOK" => Self::RemoveBook { name: arg(&mut t)? },
            "ADD_DEF" => Self::AddDefinition {
                book: arg(&mut t)?,
                key: arg(&mut t)?,
                value: arg(&mut t)?,
            },
            "GET_DEF" => Self::GetDefinition {
                book: arg(&mut t)?,
                key: arg(&mut t)?,
            },
            "RMV_DEF" => Self::RemoveDefinition {
                book: arg(&mut t)?,
                key: arg(&mut t)?,
            },
            "ADD_USER" => Self::AddUser { name: arg(&mut t)? },
            "BORROW" => Self::Borrow {
                user: arg(&mut t)?,
                book: arg(&mut t)?,
                days: number(&mut t)?,
            },
            "RETURN" => Self::Return {
                user: arg(&mut t)?,
                book: arg(&mut t)?,
                days_since: number(&mut t)?,
                rating: number(&mut t)?,
            },
            "LOST" => Self::Lost {
                user: arg(&mut t)?,
                book: arg(&mut t)?,
            },
            "EXIT" => Self::Exit,
            _ => return Err(Error::InvalidCommand),
        };
        Ok(command)
    }
}
