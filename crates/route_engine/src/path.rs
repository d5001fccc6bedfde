//! Navigation path grammar.
//!
//! A path is a sequence of `/`-separated segments where each segment is an
//! optional wildcard marker followed by characters from `[A-Za-z0-9.-]`.
//! Collapsed leading, trailing, and doubled separators are permitted, and a
//! segment may begin with the marker so the same check serves both runtime
//! navigation paths and route declarations.

use crate::error::ResolveError;

/// Checks whether `ch` may appear in a path segment body.
const fn is_segment_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '.' | '-')
}

/// Validate a navigation path against the segment grammar.
///
/// The grammar admits one or more repetitions of
/// `(/? marker? [A-Za-z0-9.-]* /?)`, which reduces to a per-character rule:
/// every byte must be a separator, the wildcard marker, or a segment body
/// character. Pure check; no state is touched on either outcome.
///
/// # Errors
///
/// Returns [`ResolveError::InvalidPath`] carrying the byte offset of the
/// first disallowed character.
pub fn validate(path: &str, marker: char) -> Result<(), ResolveError> {
    match path
        .char_indices()
        .find(|&(_, ch)| ch != '/' && ch != marker && !is_segment_char(ch))
    {
        None => Ok(()),
        Some((position, _)) => Err(ResolveError::InvalidPath {
            path: path.to_owned(),
            position,
        }),
    }
}
