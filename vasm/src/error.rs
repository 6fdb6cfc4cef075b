use std::fmt;

/// Something wrong with a line of pre-lowered assembly: an unresolved block
/// reference, or text that refuses to parse once the pipeline is done with
/// it. Carries the offending line so a driver can print it verbatim.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LowerError {
    UnresolvedLabel { label: String, line: String },
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LowerError::UnresolvedLabel { label, line } => write!(
                f,
                "reference to undefined block \"{}\" in line \"{}\"",
                label, line
            ),
        }
    }
}

/// A canonical line (`addr: MNEM a b` or `addr: value`) that the encoder
/// could not turn into a loader entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EncodeError {
    Malformed(String),
    UnknownMnemonic(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodeError::Malformed(line) => write!(f, "malformed canonical line: \"{}\"", line),
            EncodeError::UnknownMnemonic(mnem) => {
                write!(f, "unknown mnemonic \"{}\"", mnem)
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    Lower(LowerError),
    Encode(EncodeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lower(err) => write!(f, "{}", err),
            Error::Encode(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<LowerError> for Error {
    fn from(err: LowerError) -> Error {
        Error::Lower(err)
    }
}

impl From<EncodeError> for Error {
    fn from(err: EncodeError) -> Error {
        Error::Encode(err)
    }
}
