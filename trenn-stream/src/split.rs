//! Splitting a delimited sequence into typed values.

use trenn::{MatchStatus, Pattern};

use crate::error::{invalid_input, Error};
use crate::source::ByteSource;
use crate::value::FromField;

/// Splits the stream on `separator` until `terminator` matches, converting
/// every token and collecting the values into `dst`.
///
/// Both patterns are matched greedily and unanchored, with one executor
/// each running in parallel over every byte. A token ends when the longest
/// separator occurrence has been exceeded, or when the terminator matches
/// (which ends the whole sequence, terminator included). Insertion order
/// follows token order for ordered containers.
///
/// Fails with `InvalidInput` when the input ends before the terminator
/// matches, or when a token is not a valid textual representation of `T`.
pub fn split_into<T, C>(
    src: &mut ByteSource,
    separator: &Pattern,
    terminator: &Pattern,
    dst: &mut C,
) -> Result<(), Error>
where
    T: FromField,
    C: Extend<T>,
{
    let mut sep = separator.executor();
    let mut term = terminator.executor();
    let mut buf: Vec<u8> = vec![];
    let mut sep_matched = false;
    let mut match_len = 0;
    let mut match_start = 0;
    src.commit();
    loop {
        let Some(byte) = src.read_byte() else {
            src.check_io_error()?;
            return Err(invalid_input(
                src.position(),
                "end of input before the terminator pattern matched",
            ));
        };
        term.next(byte);
        term.start_path();
        sep.next(byte);
        if !sep_matched {
            sep.start_path();
        } else if sep.status() == MatchStatus::Accept {
            match_len = sep.longest_match();
        }
        buf.push(byte);
        if term.status() == MatchStatus::Accept {
            break;
        }
        if !sep_matched && sep.status() == MatchStatus::Accept {
            sep_matched = true;
            match_len = sep.trim_short_matches();
            match_start = buf.len() - match_len;
        } else if sep_matched && sep.status() == MatchStatus::Refuse {
            // The longest separator occurrence has just been exceeded, so
            // the recorded match is the true token boundary. A later accept
            // can cover a span starting before the recorded start; in that
            // case nothing past the match is left to give back.
            if buf.len() > match_start + match_len {
                src.rewind(buf.len() - (match_start + match_len));
                buf.truncate(match_start + match_len);
            }
            src.commit();
            buf.truncate(buf.len() - match_len);
            push_value(dst, &buf, src.position())?;
            sep.reset();
            term.reset();
            sep_matched = false;
            match_len = 0;
            buf.clear();
        }
    }

    // The terminator has matched somewhere at the end of the buffer; extend
    // it greedily before closing the sequence off.
    match_len = term.trim_short_matches();
    match_start = buf.len() - match_len;
    while term.status() != MatchStatus::Refuse {
        let Some(byte) = src.read_byte() else { break };
        term.next(byte);
        buf.push(byte);
        if term.status() == MatchStatus::Accept {
            match_len = term.longest_match();
        }
    }
    if buf.len() > match_start + match_len {
        src.rewind(buf.len() - (match_start + match_len));
        buf.truncate(match_start + match_len);
    }
    src.commit();
    src.check_io_error()?;
    buf.truncate(buf.len() - match_len);
    push_value(dst, &buf, src.position())?;
    Ok(())
}

fn push_value<T: FromField, C: Extend<T>>(
    dst: &mut C,
    field: &[u8],
    at: usize,
) -> Result<(), Error> {
    let value = T::from_field(field).ok_or_else(|| {
        invalid_input(
            at,
            format!(
                "{:?} is not a valid value of the requested type",
                String::from_utf8_lossy(field)
            ),
        )
    })?;
    dst.extend(std::iter::once(value));
    Ok(())
}
