/// Errors surfaced by the library simulator.
///
/// Table lookups never fail; a missing key is an `Option`. The domain
/// variants below are rejections of a simulator command and display as the
/// message the simulator prints for them.
#[derive(Debug)]
pub enum Error {
    /// I/O error while reading commands or writing output
    Io(std::io::Error),

    /// Unknown or malformed command line
    InvalidCommand,

    /// No book with the requested name
    BookNotFound,

    /// The book has no definition with the requested key
    DefinitionNotFound,

    /// The name is already taken by an active or banned user
    AlreadyRegistered,

    /// No active user with the requested name
    NotRegistered,

    /// The user has been banned
    Banned,

    /// The user already holds a book
    AlreadyBorrowing,

    /// Somebody else holds the book
    BookBorrowed,

    /// The returned book is not the one the user holds
    NotBorrowedByUser,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidCommand => f.write_str("Invalid command. Please try again."),
            Self::BookNotFound => f.write_str("The book is not in the library."),
            Self::DefinitionNotFound => f.write_str("The definition is not in the book."),
            Self::AlreadyRegistered => f.write_str("User is already registered."),
            Self::NotRegistered => f.write_str("You are not registered yet."),
            Self::Banned => f.write_str("You are banned from this library."),
            Self::AlreadyBorrowing => f.write_str("You have already borrowed a book."),
            Self::BookBorrowed => f.write_str("The book is borrowed."),
            Self::NotBorrowedByUser => f.write_str("You didn't borrow this book."),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl Error {
    /// Whether this is a command rejection rather than an I/O failure.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// Simulator result
pub type Result<T> = std::result::Result<T, Error>;
