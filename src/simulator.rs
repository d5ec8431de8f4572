//! Library simulator: executes protocol commands against the stores.
//!
//! Every command runs to completion before the next is read. Rejections
//! (unknown user, missing book, ...) are printed to the output as their
//! message and do not stop the session; only I/O errors do.

use crate::command::Command;
use crate::config::TableConfig;
use crate::error::{Error, Result};
use crate::library::{Definition, Library};
use crate::users::UserRegistry;
use std::borrow::Cow;
use std::io::{BufRead, Write};

/// Score lost for every lost book.
pub const LOST_BOOK_PENALTY: i64 = 50;

/// Score lost per day a book is returned late.
pub const LATE_DAY_PENALTY: i64 = 2;

pub struct Simulator {
    library: Library,
    users: UserRegistry,
    finished: bool,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(TableConfig::default())
    }
}

impl Simulator {
    pub fn new(config: TableConfig) -> Self {
        Self {
            users: UserRegistry::new(&config),
            library: Library::new(config),
            finished: false,
        }
    }

    pub fn library(&self) -> &Library {
        &self.library
    }

    pub fn users(&self) -> &UserRegistry {
        &self.users
    }

    /// Whether `EXIT` has been executed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Reads commands line by line until `EXIT` or end of input.
    ///
    /// `ADD_BOOK` consumes the definition lines that follow it. Bytes that
    /// are not valid UTF-8 are replaced with U+FFFD; the line still runs.
    pub fn run<R, W>(&mut self, mut input: R, out: &mut W) -> Result<()>
    where
        R: BufRead,
        W: Write,
    {
        let mut buf = Vec::new();
        while let Some(line) = read_line(&mut input, &mut buf)? {
            match line.parse::<Command>() {
                Ok(Command::AddBook { name, definitions }) => {
                    let mut defs = Vec::with_capacity(definitions.min(64));
                    for _ in 0..definitions {
                        let Some(def_line) = read_line(&mut input, &mut buf)? else {
                            log::warn!("Input ended inside the definitions of {name:?}");
                            break;
                        };
                        defs.push(Definition::parse_line(&def_line));
                    }
                    log::debug!("Adding book {name:?} with {} definitions", defs.len());
                    self.library.add_book(&name, defs);
                }
                Ok(command) => self.execute(command, out)?,
                Err(e) => writeln!(out, "{e}")?,
            }
            if self.finished {
                break;
            }
        }
        Ok(())
    }

    /// Executes one command, printing its output or its rejection.
    ///
    /// `AddBook` adds the book without definitions; definition lines are
    /// only read by [`Simulator::run`].
    pub fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        log::debug!("Executing {command:?}");
        match self.apply(command, out) {
            Err(e) if e.is_rejection() => {
                writeln!(out, "{e}")?;
                Ok(())
            }
            other => other,
        }
    }

    fn apply<W: Write>(&mut self, command: Command, out: &mut W) -> Result<()> {
        match command {
            Command::AddBook { name, .. } => self.library.add_book(&name, []),
            Command::GetBook { name } => writeln!(out, "{}", self.library.book(&name)?)?,
            Command::RemoveBook { name } => {
                self.library.remove_book(&name)?;
            }
            Command::AddDefinition { book, key, value } => {
                self.library
                    .add_definition(&book, Definition { key, value })?;
            }
            Command::GetDefinition { book, key } => {
                writeln!(out, "{}", self.library.definition(&book, &key)?.value)?;
            }
            Command::RemoveDefinition { book, key } => {
                self.library.remove_definition(&book, &key)?;
            }
            Command::AddUser { name } => self.users.add_user(&name)?,
            Command::Borrow { user, book, days } => self.borrow(&user, &book, days)?,
            Command::Return {
                user,
                book,
                days_since,
                rating,
            } => self.return_book(&user, &book, days_since, rating, out)?,
            Command::Lost { user, book } => self.lost(&user, &book, out)?,
            Command::Exit => {
                self.write_rankings(out)?;
                self.finished = true;
            }
        }
        Ok(())
    }

    /// Lends `book` to `user` for `days` days.
    pub fn borrow(&mut self, user: &str, book: &str, days: u32) -> Result<()> {
        let borrower = self.users.user_mut(user)?;
        if borrower.borrowed().is_some() {
            return Err(Error::AlreadyBorrowing);
        }
        let lent = self.library.book_mut(book)?;
        if lent.is_borrowed() {
            return Err(Error::BookBorrowed);
        }
        lent.set_borrowed(true);
        borrower.start_loan(book, days);
        Ok(())
    }

    /// Takes `book` back from `user`.
    ///
    /// Early or on-time returns earn the days left; late ones cost
    /// [`LATE_DAY_PENALTY`] per overdue day. A user whose score drops
    /// below zero is banned. The book is released and rated either way.
    pub fn return_book<W: Write>(
        &mut self,
        user: &str,
        book: &str,
        days_since: u32,
        rating: u32,
        out: &mut W,
    ) -> Result<()> {
        let borrower = self.users.user_mut(user)?;
        if borrower.borrowed() != Some(book) {
            return Err(Error::NotBorrowedByUser);
        }
        let days_max = borrower.days_max();
        let delta = if days_since > days_max {
            -LATE_DAY_PENALTY * i64::from(days_since - days_max)
        } else {
            i64::from(days_max - days_since)
        };
        borrower.adjust_score(delta);
        borrower.end_loan();
        self.report_ban(user, out)?;

        match self.library.book_mut(book) {
            Ok(returned) => returned.record_return(rating),
            Err(_) => log::warn!("Returned book {book:?} is no longer in the library"),
        }
        Ok(())
    }

    /// Records that `user` lost `book`: the user pays
    /// [`LOST_BOOK_PENALTY`] and the book leaves the library.
    pub fn lost<W: Write>(&mut self, user: &str, book: &str, out: &mut W) -> Result<()> {
        let borrower = self.users.user_mut(user)?;
        borrower.adjust_score(-LOST_BOOK_PENALTY);
        borrower.end_loan();
        self.report_ban(user, out)?;
        self.library.remove_book(book)?;
        Ok(())
    }

    fn report_ban<W: Write>(&mut self, user: &str, out: &mut W) -> Result<()> {
        if self.users.ban_if_negative(user) {
            writeln!(out, "The user {user} has been banned from this library.")?;
        }
        Ok(())
    }

    /// Prints both rankings, best first.
    pub fn write_rankings<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Books ranking:")?;
        for (i, book) in self.library.ranking().into_iter().enumerate() {
            writeln!(out, "{}. {book}", i + 1)?;
        }
        writeln!(out, "Users ranking:")?;
        for (i, user) in self.users.ranking().into_iter().enumerate() {
            writeln!(out, "{}. {user}", i + 1)?;
        }
        Ok(())
    }
}

/// Next input line without its terminator, or `None` at end of input.
fn read_line<R: BufRead>(input: &mut R, buf: &mut Vec<u8>) -> Result<Option<String>> {
    buf.clear();
    if input.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    let line = String::from_utf8_lossy(buf);
    if let Cow::Owned(_) = line {
        log::warn!("Replaced invalid UTF-8 in input line {line:?}");
    }
    Ok(Some(line.into_owned()))
}
