//! Stream tokenization with regex-shaped delimiters.
//!
//! This crate layers the greedy, incremental matching engine of the
//! [`trenn`] crate over byte streams. Input is consumed strictly one byte at
//! a time with no random access; when a delimiter pattern allows matches of
//! several lengths, the longest one wins, and bytes read past the true match
//! boundary are pushed back so the stream continues exactly where the match
//! ended.
//!
//! The entry points are:
//!
//! * [`ByteSource`]: a buffered reader over any [`std::io::Read`] that
//!   supports the pushback the greedy protocol needs.
//! * [`skip_separator`]: consume one occurrence of a delimiter pattern.
//! * [`read_match`]: consume the longest pattern-matching prefix and
//!   convert it into a typed value.
//! * [`read_until`] / [`skip_until`]: read a field up to (and consume) the
//!   next occurrence of a delimiter pattern.
//! * [`split_into`]: split a delimited sequence into typed values collected
//!   in any [`Extend`] container.
//! * [`read_value`] / [`skip_values`]: read or discard whitespace-delimited
//!   typed values.
//!
//! ```
//! use trenn::Pattern;
//! use trenn_stream::{split_into, ByteSource};
//!
//! # fn main() -> Result<(), trenn_stream::Error> {
//! let sep = Pattern::compile(",+")?;
//! let end = Pattern::compile("\n")?;
//!
//! let mut src = ByteSource::from_read("10,20,,,30\n".as_bytes());
//! let mut values: Vec<i32> = vec![];
//! split_into::<i32, _>(&mut src, &sep, &end, &mut values)?;
//! assert_eq!(values, [10, 20, 30]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
mod error;
mod munch;
mod source;
mod split;
mod value;

pub use error::{Error, InnerError};
pub use munch::{read_match, read_until, skip_separator, skip_until};
pub use source::ByteSource;
pub use split::split_into;
pub use value::{read_all, read_value, skip_values, FromField};
