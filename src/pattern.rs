//! Tag and filename selector matching
//!
//! Selectors are regular expressions with two special rules:
//!
//! 1. A candidate equal to the pattern text always matches, without compiling
//!    anything.
//! 2. **Substring guard:** a regex match is discarded when the pattern text
//!    occurs literally inside the candidate. A plain word like `linux` therefore
//!    never matches `linux-amd64`; only patterns that use real regex structure
//!    (`linux.*`, `^tool-`, `amd64\.zip$`, ...) select anything beyond an exact
//!    name. The same rule means `v1` does not match `v1.0.0`, even though the
//!    regex engine would accept it. Selection results depend on this, so it must
//!    not be "fixed" without changing what existing configurations download.
//!
//! Callers treat an empty selector as unconstrained and never pass it here.

use crate::error::{Error, Result};
use regex::Regex;

/// Check whether `candidate` satisfies the selector `pattern`
///
/// # Errors
///
/// Returns [`Error::Pattern`] if the pattern is not a valid regular expression.
/// An invalid pattern is never reported as a silent non-match.
///
/// # Examples
///
/// ```
/// use release_dl::pattern::matches;
///
/// assert!(matches("linux-amd64", "linux-amd64").unwrap());
/// assert!(matches("linux-amd64", "linux.*").unwrap());
/// assert!(!matches("linux-amd64", "linux").unwrap());
/// assert!(matches("linux-amd64", "[").is_err());
/// ```
pub fn matches(candidate: &str, pattern: &str) -> Result<bool> {
    if candidate == pattern {
        return Ok(true);
    }

    let re = compile(pattern)?;
    Ok(re.is_match(candidate) && !candidate.contains(pattern))
}

/// Compile a selector, mapping failures to [`Error::Pattern`]
pub(crate) fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}
