//! Thread identifiers.

use std::fmt;
use std::str::FromStr;

/// Thread identifier
///
/// This is the thread number the backend assigns (GDB's global thread id),
/// not an OS thread id. It is what `-data-list-register-values --thread`
/// expects.
///
/// ## Example
///
/// ```rust
/// use regscope_core::types::ThreadId;
///
/// let thread = ThreadId::from(1);
/// assert_eq!(thread.raw(), 1);
/// assert_eq!(thread.to_string(), "1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThreadId(pub u64);

impl ThreadId
{
    /// Get the raw `u64` representation of the thread identifier
    #[must_use]
    pub fn raw(&self) -> u64
    {
        self.0
    }
}

impl From<u64> for ThreadId
{
    fn from(value: u64) -> Self
    {
        Self(value)
    }
}

impl FromStr for ThreadId
{
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        s.trim().parse::<u64>().map(Self)
    }
}

impl fmt::Display for ThreadId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}
