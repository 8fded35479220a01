//! Interned identifiers for schema names.
//!
//! Every name that appears in a schema document (type names, field names,
//! enum symbols, variables) is stored once in a process-wide string interner
//! and handled as a copyable [`Id`]. Comparing two identifiers is an integer
//! comparison.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner backing every [`Id`].
///
/// # Thread Safety
///
/// Access is serialized through a `Mutex`; the lock is held only for the
/// duration of a single intern or resolve call.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// An interned name.
///
/// # Examples
///
/// ```
/// use weave_core::identifier::Id;
///
/// let person = Id::new("Person");
/// let again = Id::new("Person");
///
/// assert_eq!(person, again);
/// assert_eq!(person, "Person");
/// assert_eq!(person.to_string(), "Person");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Interns `name` and returns its identifier.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns the length in bytes of the interned name.
    pub fn len(&self) -> usize {
        self.resolve(str::len)
    }

    /// Returns `true` for the identifier of the empty string.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs `f` against the interned text without allocating.
    fn resolve<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        with_interner(|interner| {
            let text = interner
                .resolve(self.0)
                .expect("Symbol should exist in interner");
            f(text)
        })
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Copy out before formatting so the interner lock is not held while
        // arbitrary formatter code runs.
        let text = self.resolve(str::to_owned);
        f.write_str(&text)
    }
}

impl std::str::FromStr for Id {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<&String> for Id {
    fn from(name: &String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "Person"`
    fn eq(&self, other: &str) -> bool {
        self.resolve(|text| text == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
