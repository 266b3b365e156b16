//! The maximal-munch protocol and the delimiter operations built on it.

use trenn::{MatchStatus, NfaExecutor, Pattern};

use crate::error::{invalid_input, Error};
use crate::source::ByteSource;
use crate::value::FromField;

/// Consumes the longest prefix of the stream that the executor accepts.
///
/// Bytes are consumed speculatively; every time the executor reports a
/// complete match the position becomes a confirmed boundary, and once the
/// executor refuses (or the input ends) everything consumed past the last
/// confirmed boundary is rewound. Returns whether any prefix was ever a
/// confirmed match; when it returns `false` the stream is positioned
/// exactly where it started.
pub(crate) fn consume_longest(
    src: &mut ByteSource,
    exec: &mut NfaExecutor<'_>,
) -> Result<bool, Error> {
    let mut matched = exec.status() == MatchStatus::Accept;
    let mut pending = 0;
    src.commit();
    loop {
        let Some(byte) = src.read_byte() else { break };
        pending += 1;
        exec.next(byte);
        match exec.status() {
            MatchStatus::Accept => {
                matched = true;
                pending = 0;
                src.commit();
            }
            MatchStatus::Refuse => break,
            MatchStatus::Unsure => {}
        }
    }
    src.rewind(pending);
    src.check_io_error()?;
    Ok(matched)
}

/// Consumes one occurrence of the separator pattern, greedily.
///
/// The longest matching prefix of the stream is consumed and discarded.
/// Fails with `InvalidInput` when the stream does not start with a match,
/// leaving the stream unconsumed.
pub fn skip_separator(src: &mut ByteSource, separator: &Pattern) -> Result<(), Error> {
    let mut exec = separator.executor();
    if !consume_longest(src, &mut exec)? {
        return Err(invalid_input(
            src.position(),
            "no match for the separator pattern",
        ));
    }
    Ok(())
}

/// Consumes the longest pattern-matching prefix of the stream and converts
/// it into a typed value.
///
/// Like [`skip_separator`], but the matched text is captured. Fails with
/// `InvalidInput` when the stream does not start with a match (leaving the
/// stream unconsumed) or when the matched text is not a valid `T`.
pub fn read_match<T: FromField>(src: &mut ByteSource, pattern: &Pattern) -> Result<T, Error> {
    let mut exec = pattern.executor();
    let mut matched = exec.status() == MatchStatus::Accept;
    let mut buf = vec![];
    let mut pending = 0;
    src.commit();
    loop {
        let Some(byte) = src.read_byte() else { break };
        pending += 1;
        buf.push(byte);
        exec.next(byte);
        match exec.status() {
            MatchStatus::Accept => {
                matched = true;
                pending = 0;
                src.commit();
            }
            MatchStatus::Refuse => break,
            MatchStatus::Unsure => {}
        }
    }
    src.rewind(pending);
    buf.truncate(buf.len() - pending);
    src.check_io_error()?;
    if !matched {
        return Err(invalid_input(src.position(), "no match for the pattern"));
    }
    T::from_field(&buf).ok_or_else(|| {
        invalid_input(
            src.position(),
            format!(
                "{:?} is not a valid value of the requested type",
                String::from_utf8_lossy(&buf)
            ),
        )
    })
}

/// Reads bytes into `dst` up to the next occurrence of the delimiter
/// pattern, then consumes the longest occurrence of the delimiter itself.
///
/// The delimiter is not anchored: a fresh match candidate is started at
/// every position, and once any candidate completes, the greedy rule picks
/// the longest one. The delimiter bytes are consumed but not stored.
/// Fails with `InvalidInput` when the input ends before the delimiter ever
/// matches; the bytes read so far remain in `dst`.
pub fn read_until(src: &mut ByteSource, delimiter: &Pattern, dst: &mut Vec<u8>) -> Result<(), Error> {
    let mut exec = delimiter.executor();
    while exec.status() != MatchStatus::Accept {
        let Some(byte) = src.read_byte() else {
            src.check_io_error()?;
            return Err(invalid_input(
                src.position(),
                "end of input before the delimiter pattern matched",
            ));
        };
        exec.next(byte);
        exec.start_path();
        dst.push(byte);
    }
    // The delimiter tail sits at the end of what we accumulated; give it
    // back and then extend the match as far as it goes.
    let len = exec.trim_short_matches();
    dst.truncate(dst.len() - len);
    consume_longest(src, &mut exec)?;
    Ok(())
}

/// Like [`read_until`], but discards the bytes in front of the delimiter.
pub fn skip_until(src: &mut ByteSource, delimiter: &Pattern) -> Result<(), Error> {
    let mut scratch = vec![];
    read_until(src, delimiter, &mut scratch)
}
