//! Library store: books keyed by name, each owning a definitions table.

use crate::chained_hash_table::ChainedHashTable;
use crate::command::Tokenizer;
use crate::config::TableConfig;
use crate::error::{Error, Result};
use std::cmp::Ordering;
use std::fmt;

/// A key/value definition stored inside a book.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Definition {
    pub key: String,
    pub value: String,
}

impl Definition {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Parses a `<key> <value>` definition line. Missing words are empty.
    pub fn parse_line(line: &str) -> Self {
        let mut t = Tokenizer::new(line);
        let key = t.next().unwrap_or_default();
        let value = t.next().unwrap_or_default();
        Self { key, value }
    }
}

#[derive(Debug)]
pub struct Book {
    name: String,
    ratings: u64,
    purchases: u32,
    borrowed: bool,
    definitions: ChainedHashTable<String, Definition>,
}

impl Book {
    pub fn new(name: impl Into<String>, config: &TableConfig) -> Self {
        Self {
            name: name.into(),
            ratings: 0,
            purchases: 0,
            borrowed: false,
            definitions: ChainedHashTable::with_config(config),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn purchases(&self) -> u32 {
        self.purchases
    }

    pub fn is_borrowed(&self) -> bool {
        self.borrowed
    }

    /// Average rating over all returns; 0 before the first one.
    pub fn rating(&self) -> f64 {
        if self.purchases == 0 {
            0.0
        } else {
            self.ratings as f64 / f64::from(self.purchases)
        }
    }

    pub fn definitions(&self) -> &ChainedHashTable<String, Definition> {
        &self.definitions
    }

    pub(crate) fn set_borrowed(&mut self, borrowed: bool) {
        self.borrowed = borrowed;
    }

    /// Records a completed loan: the book is released and rated.
    pub(crate) fn record_return(&mut self, rating: u32) {
        self.borrowed = false;
        self.purchases += 1;
        self.ratings += u64::from(rating);
    }

    /// Ranking order: best rating, then most purchases, then name.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .rating()
            .total_cmp(&self.rating())
            .then_with(|| other.purchases.cmp(&self.purchases))
            .then_with(|| self.name.cmp(&other.name))
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name:{} Rating:{:.3} Purchases:{}",
            self.name,
            self.rating(),
            self.purchases
        )
    }
}

pub struct Library {
    books: ChainedHashTable<String, Book>,
    config: TableConfig,
}

impl Library {
    pub fn new(config: TableConfig) -> Self {
        Self {
            books: ChainedHashTable::with_config(&config),
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Adds a book with its definitions, replacing any book of that name
    /// along with all of its definitions.
    pub fn add_book<I>(&mut self, name: &str, definitions: I)
    where
        I: IntoIterator<Item = Definition>,
    {
        let mut book = Book::new(name, &self.config);
        for def in definitions {
            book.definitions.put(def.key.clone(), def);
        }
        if self.books.put(name.to_owned(), book).is_some() {
            log::debug!("Replaced book {name:?}");
        }
    }

    pub fn book(&self, name: &str) -> Result<&Book> {
        self.books.get(name).ok_or(Error::BookNotFound)
    }

    pub fn book_mut(&mut self, name: &str) -> Result<&mut Book> {
        self.books.get_mut(name).ok_or(Error::BookNotFound)
    }

    /// Removes a book; its definitions go with it.
    pub fn remove_book(&mut self, name: &str) -> Result<Book> {
        self.books.remove(name).ok_or(Error::BookNotFound)
    }

    pub fn add_definition(&mut self, book: &str, def: Definition) -> Result<()> {
        let book = self.book_mut(book)?;
        book.definitions.put(def.key.clone(), def);
        Ok(())
    }

    pub fn definition(&self, book: &str, key: &str) -> Result<&Definition> {
        self.book(book)?
            .definitions
            .get(key)
            .ok_or(Error::DefinitionNotFound)
    }

    pub fn remove_definition(&mut self, book: &str, key: &str) -> Result<Definition> {
        self.book_mut(book)?
            .definitions
            .remove(key)
            .ok_or(Error::DefinitionNotFound)
    }

    /// All books, best ranked first.
    pub fn ranking(&self) -> Vec<&Book> {
        let mut books: Vec<&Book> = self.books.values().collect();
        books.sort_by(|a, b| a.rank_cmp(b));
        books
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Library {
        Library::new(TableConfig::default())
    }

    #[test]
    fn add_and_get_book_with_definitions() {
        let mut lib = library();
        lib.add_book("Dune", [Definition::new("spice", "melange")]);
        let book = lib.book("Dune").unwrap();
        assert_eq!(book.to_string(), "Name:Dune Rating:0.000 Purchases:0");
        assert_eq!(lib.definition("Dune", "spice").unwrap().value, "melange");
        assert!(matches!(lib.book("Emma"), Err(Error::BookNotFound)));
    }

    #[test]
    fn definition_lookups_distinguish_missing_book_and_key() {
        let mut lib = library();
        lib.add_book("Dune", []);
        assert!(matches!(lib.definition("Emma", "k"), Err(Error::BookNotFound)));
        assert!(matches!(lib.definition("Dune", "k"), Err(Error::DefinitionNotFound)));
        assert!(matches!(
            lib.add_definition("Emma", Definition::new("k", "v")),
            Err(Error::BookNotFound)
        ));
        assert!(matches!(lib.remove_definition("Dune", "k"), Err(Error::DefinitionNotFound)));
    }

    #[test]
    fn definitions_overwrite_and_remove() {
        let mut lib = library();
        lib.add_book("X", []);
        lib.add_definition("X", Definition::new("k1", "v1")).unwrap();
        lib.add_definition("X", Definition::new("k1", "v2")).unwrap();
        assert_eq!(lib.book("X").unwrap().definitions().len(), 1);
        assert_eq!(lib.definition("X", "k1").unwrap().value, "v2");
        assert_eq!(lib.remove_definition("X", "k1").unwrap().value, "v2");
        assert!(lib.book("X").unwrap().definitions().is_empty());
    }

    /// Re-adding a book starts from a fresh definitions table.
    #[test]
    fn re_adding_book_replaces_definitions() {
        let mut lib = library();
        lib.add_book("X", [Definition::new("old", "1")]);
        lib.add_book("X", [Definition::new("new", "2")]);
        assert_eq!(lib.len(), 1);
        assert!(matches!(lib.definition("X", "old"), Err(Error::DefinitionNotFound)));
        assert_eq!(lib.definition("X", "new").unwrap().value, "2");
    }

    #[test]
    fn remove_book_takes_definitions_along() {
        let mut lib = library();
        lib.add_book("X", [Definition::new("k1", "v1")]);
        let removed = lib.remove_book("X").unwrap();
        assert_eq!(removed.definitions().get("k1").map(|d| d.value.as_str()), Some("v1"));
        assert!(lib.is_empty());
        assert!(matches!(lib.remove_book("X"), Err(Error::BookNotFound)));
    }

    #[test]
    fn ranking_orders_by_rating_purchases_then_name() {
        let mut lib = library();
        for name in ["b", "a", "c", "d"] {
            lib.add_book(name, []);
        }
        lib.book_mut("c").unwrap().record_return(5);
        lib.book_mut("d").unwrap().record_return(4);
        lib.book_mut("d").unwrap().record_return(6);
        lib.book_mut("b").unwrap().record_return(0);

        let names: Vec<&str> = lib.ranking().iter().map(|b| b.name()).collect();
        assert_eq!(names, vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn definition_line_parsing() {
        assert_eq!(Definition::parse_line("key value"), Definition::new("key", "value"));
        assert_eq!(Definition::parse_line("lonely"), Definition::new("lonely", ""));
    }

    #[test]
    fn ratings_accumulate_past_u32_range() {
        let mut lib = library();
        lib.add_book("Dune", []);
        let book = lib.book_mut("Dune").unwrap();
        book.record_return(4_000_000_000);
        book.record_return(4_000_000_000);
        assert_eq!(book.purchases(), 2);
        assert_eq!(book.rating(), 4_000_000_000.0);
    }
}
