//! Textual value conversion and whitespace separated value streams.

use num_traits::ops::overflowing::{OverflowingAdd, OverflowingMul, OverflowingSub};
use num_traits::{FromPrimitive, Zero};

use crate::error::{invalid_input, Error};
use crate::source::ByteSource;

/// Conversion of a raw token into a typed value.
///
/// Implemented for the built-in integer types (decimal, with leading ASCII
/// whitespace and a sign for the signed types), for `String` (UTF-8
/// validated) and for `Vec<u8>` (raw bytes). Returns `None` when the token
/// is not a valid representation, including on overflow.
pub trait FromField: Sized {
    /// Parses a complete token, returning `None` when any byte is left over
    /// or the value is out of range.
    fn from_field(field: &[u8]) -> Option<Self>;
}

fn skip_leading_space(field: &[u8]) -> &[u8] {
    let start = field
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .unwrap_or(field.len());
    &field[start..]
}

fn unsigned_decimal<I>(field: &[u8]) -> Option<I>
where
    I: Zero + FromPrimitive + OverflowingAdd + OverflowingMul,
{
    let digits = skip_leading_space(field);
    if digits.is_empty() {
        return None;
    }
    let mut value = I::zero();
    let ten = I::from_u8(10)?;
    for &byte in digits {
        if !byte.is_ascii_digit() {
            return None;
        }
        let (shifted, overflow_mul) = value.overflowing_mul(&ten);
        let (next, overflow_add) = shifted.overflowing_add(&I::from_u8(byte - b'0')?);
        if overflow_mul || overflow_add {
            return None;
        }
        value = next;
    }
    Some(value)
}

fn signed_decimal<I>(field: &[u8]) -> Option<I>
where
    I: Zero + FromPrimitive + OverflowingAdd + OverflowingMul + OverflowingSub,
{
    let mut digits = skip_leading_space(field);
    let negative = digits.first() == Some(&b'-');
    if negative {
        digits = &digits[1..];
    }
    if digits.is_empty() {
        return None;
    }
    let mut value = I::zero();
    let ten = I::from_u8(10)?;
    for &byte in digits {
        if !byte.is_ascii_digit() {
            return None;
        }
        let (shifted, overflow_mul) = value.overflowing_mul(&ten);
        let digit = I::from_u8(byte - b'0')?;
        let (next, overflow) = if negative {
            shifted.overflowing_sub(&digit)
        } else {
            shifted.overflowing_add(&digit)
        };
        if overflow_mul || overflow {
            return None;
        }
        value = next;
    }
    Some(value)
}

macro_rules! unsigned_from_field {
    ($($int:ty),*) => {
        $(impl FromField for $int {
            fn from_field(field: &[u8]) -> Option<Self> {
                unsigned_decimal(field)
            }
        })*
    };
}

macro_rules! signed_from_field {
    ($($int:ty),*) => {
        $(impl FromField for $int {
            fn from_field(field: &[u8]) -> Option<Self> {
                signed_decimal(field)
            }
        })*
    };
}

unsigned_from_field!(u8, u16, u32, u64, u128, usize);
signed_from_field!(i8, i16, i32, i64, i128, isize);

impl FromField for String {
    fn from_field(field: &[u8]) -> Option<Self> {
        String::from_utf8(field.to_vec()).ok()
    }
}

impl FromField for Vec<u8> {
    fn from_field(field: &[u8]) -> Option<Self> {
        Some(field.to_vec())
    }
}

/// Reads the next whitespace delimited token and converts it.
///
/// Skips leading ASCII whitespace, then accumulates bytes up to the next
/// whitespace byte or the end of the input. Fails with `InvalidInput` when
/// the input holds no further token or the token is not a valid `T`.
pub fn read_value<T: FromField>(src: &mut ByteSource) -> Result<T, Error> {
    while let Some(byte) = src.read_byte() {
        if !byte.is_ascii_whitespace() {
            src.rewind(1);
            break;
        }
    }
    let mut token = vec![];
    while let Some(byte) = src.read_byte() {
        if byte.is_ascii_whitespace() {
            src.rewind(1);
            break;
        }
        token.push(byte);
    }
    src.check_io_error()?;
    src.commit();
    if token.is_empty() {
        return Err(invalid_input(src.position(), "end of input before a value"));
    }
    T::from_field(&token).ok_or_else(|| {
        invalid_input(
            src.position(),
            format!(
                "{:?} is not a valid value of the requested type",
                String::from_utf8_lossy(&token)
            ),
        )
    })
}

/// Reads and discards `count` whitespace delimited values of type `T`.
///
/// Every skipped token is still converted, so malformed input is reported
/// even when the values themselves are not wanted.
pub fn skip_values<T: FromField>(src: &mut ByteSource, count: usize) -> Result<(), Error> {
    for _ in 0..count {
        read_value::<T>(src)?;
    }
    Ok(())
}

/// Reads every remaining byte of the stream into `dst`.
pub fn read_all(src: &mut ByteSource, dst: &mut Vec<u8>) -> Result<(), Error> {
    while let Some(byte) = src.read_byte() {
        dst.push(byte);
    }
    src.check_io_error()?;
    src.commit();
    Ok(())
}
