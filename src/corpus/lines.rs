//! Line splitting shared by both lookup strategies.
//!
//! A line ends at `\n`; a `\r` directly before it belongs to the terminator.
//! Nothing else is trimmed.

/// Strip a trailing `\n` or `\r\n` from `line`.
pub fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

/// Iterate over the lines of `data` with terminators stripped.
///
/// A final newline does not produce a trailing empty line, but blank lines
/// in the middle of the data are yielded as empty slices.
pub fn split_lines(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    let empty = data.is_empty();
    let data = data.strip_suffix(b"\n").unwrap_or(data);
    data.split(|b| *b == b'\n')
        .filter(move |_| !empty)
        .map(strip_terminator)
}
