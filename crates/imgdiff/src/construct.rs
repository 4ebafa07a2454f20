use crate::Fingerprint;
use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use std::fmt::{Display, Formatter, LowerHex, Result as FmtResult};
use std::str::FromStr;

const HEX_DIGITS: usize = 16;

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{:016x}", self.0)
    }
}

impl LowerHex for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        LowerHex::fmt(&self.0, f)
    }
}

impl FromStr for Fingerprint {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // `u64::from_str_radix` accepts a leading `+`, which is not a hex digit.
        if s.len() != HEX_DIGITS || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            exn::bail!(ErrorKind::InvalidFingerprint(s.to_string()));
        }
        let bits = u64::from_str_radix(s, 16).or_raise(|| ErrorKind::InvalidFingerprint(s.to_string()))?;
        Ok(Fingerprint(bits))
    }
}

impl From<u64> for Fingerprint {
    fn from(bits: u64) -> Self {
        Fingerprint(bits)
    }
}

impl From<Fingerprint> for u64 {
    fn from(fingerprint: Fingerprint) -> Self {
        fingerprint.0
    }
}
