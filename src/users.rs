//! User registry: active users and the banned list.

use crate::chained_hash_table::ChainedHashTable;
use crate::config::TableConfig;
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

/// Score every new user starts with.
pub const INITIAL_SCORE: i64 = 100;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    name: String,
    score: i64,
    days_max: u32,
    borrowed: Option<String>,
}

impl User {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: INITIAL_SCORE,
            days_max: 0,
            borrowed: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Days allowed for the current loan.
    pub fn days_max(&self) -> u32 {
        self.days_max
    }

    pub fn borrowed(&self) -> Option<&str> {
        self.borrowed.as_deref()
    }

    pub(crate) fn start_loan(&mut self, book: &str, days_max: u32) {
        self.borrowed = Some(book.to_owned());
        self.days_max = days_max;
    }

    pub(crate) fn end_loan(&mut self) -> Option<String> {
        self.borrowed.take()
    }

    pub(crate) fn adjust_score(&mut self, delta: i64) {
        self.score += delta;
    }

    /// Ranking order: highest score, then name.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .cmp(&self.score)
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name:{} Points:{}", self.name, self.score)
    }
}

pub struct UserRegistry {
    active: ChainedHashTable<String, User>,
    // Banned users map to their own name.
    banned: ChainedHashTable<String, String>,
}

impl UserRegistry {
    pub fn new(config: &TableConfig) -> Self {
        Self {
            active: ChainedHashTable::with_config(config),
            banned: ChainedHashTable::with_config(config),
        }
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn banned_len(&self) -> usize {
        self.banned.len()
    }

    /// Registers `name`, unless it is taken by an active or banned user.
    pub fn add_user(&mut self, name: &str) -> Result<()> {
        if self.active.contains_key(name) || self.banned.contains_key(name) {
            return Err(Error::AlreadyRegistered);
        }
        self.active.put(name.to_owned(), User::new(name));
        Ok(())
    }

    pub fn is_banned(&self, name: &str) -> bool {
        self.banned.contains_key(name)
    }

    pub fn user(&self, name: &str) -> Result<&User> {
        self.active.get(name).ok_or(Error::NotRegistered)
    }

    /// Active user `name`, rejecting banned and unknown names.
    pub fn user_mut(&mut self, name: &str) -> Result<&mut User> {
        if self.is_banned(name) {
            return Err(Error::Banned);
        }
        self.active.get_mut(name).ok_or(Error::NotRegistered)
    }

    /// Moves `name` to the banned list if its score went negative.
    ///
    /// Returns whether the user was banned.
    pub fn ban_if_negative(&mut self, name: &str) -> bool {
        if !self.active.get(name).is_some_and(|u| u.score < 0) {
            return false;
        }
        if let Some((name, user)) = self.active.remove_entry(name) {
            log::debug!("Banning user {name:?} with score {}", user.score);
            self.banned.put(name.clone(), name);
        }
        true
    }

    /// All active users, best ranked first.
    pub fn ranking(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.active.values().collect();
        users.sort_by(|a, b| a.rank_cmp(b));
        users
    }
}
