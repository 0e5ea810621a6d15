//! # EAN-13 Check Digit
//!
//! Digits at even positions (0-indexed from the left) weigh 1, digits at
//! odd positions weigh 3. The check digit brings the weighted sum to the
//! next multiple of ten.
//!
//! ```
//! use printstream::checksum::{calculate_ean13, ean13_checksum};
//!
//! assert_eq!(ean13_checksum("323210000576")?, 1);
//! assert_eq!(calculate_ean13("323210000576")?, "3232100005761");
//! # Ok::<(), printstream::PrintStreamError>(())
//! ```

use crate::error::{PrintStreamError, Result};

/// Check digit of a 12-digit EAN-13 base.
pub fn ean13_checksum(base: &str) -> Result<u8> {
    if base.len() != 12 || !base.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PrintStreamError::InvalidParameter(format!(
            "EAN-13 base must be 12 digits, got {:?}",
            base
        )));
    }

    let (even, odd) = base
        .bytes()
        .map(|b| u32::from(b - b'0'))
        .enumerate()
        .fold((0, 0), |(even, odd), (i, digit)| {
            if i % 2 == 0 {
                (even + digit, odd)
            } else {
                (even, odd + digit)
            }
        });

    Ok(((10 - (even + odd * 3) % 10) % 10) as u8)
}

/// The full 13-digit code: `base` followed by its check digit.
pub fn calculate_ean13(base: &str) -> Result<String> {
    let check = ean13_checksum(base)?;
    Ok(format!("{}{}", base, check))
}
