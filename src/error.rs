use core::fmt;

/// The error type of this library.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The document is not valid TOML.
    Parse(ParseError),
    /// The input bytes are not valid UTF-8.
    Utf8(core::str::Utf8Error),
    /// An error occurred while deserializing the TOML.
    ///
    /// This variant is only available when the `serde` feature is enabled.
    #[cfg(feature = "serde")]
    Deserialize(DeserializeError),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(p) => Some(p),
            Error::Utf8(e) => Some(e),
            #[cfg(feature = "serde")]
            Error::Deserialize(d) => Some(d),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(p) => write!(f, "{p}"),
            Error::Utf8(e) => write!(f, "{e}"),
            #[cfg(feature = "serde")]
            Error::Deserialize(d) => write!(f, "{d}"),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

/// An error raised while decoding a TOML document, with source coordinates.
///
/// The rendered message ends with `" (at line L, column C)"`, or with
/// `" (at end of document)"` when the error was detected at the end of the
/// input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: Box<str>,
    position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    At { line: usize, column: usize },
    EndOfDocument,
}

impl ParseError {
    /// Create an error pointing at byte offset `pos` of `src`.
    pub(crate) fn new(src: &str, pos: usize, message: impl Into<Box<str>>) -> Self {
        let position = if pos >= src.len() {
            Position::EndOfDocument
        } else {
            let line = 1 + src[..pos].bytes().filter(|&b| b == b'\n').count();
            let column = match src[..pos].rfind('\n') {
                Some(newline) => pos - newline,
                None => pos + 1,
            };
            Position::At { line, column }
        };
        Self {
            message: message.into(),
            position,
        }
    }

    /// The message, without the source coordinates.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The one-based line of the error, or `None` at end of document.
    pub fn line(&self) -> Option<usize> {
        match self.position {
            Position::At { line, .. } => Some(line),
            Position::EndOfDocument => None,
        }
    }

    /// The one-based column of the error, or `None` at end of document.
    pub fn column(&self) -> Option<usize> {
        match self.position {
            Position::At { column, .. } => Some(column),
            Position::EndOfDocument => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Position::At { line, column } => {
                write!(f, "{} (at line {line}, column {column})", self.message)
            }
            Position::EndOfDocument => write!(f, "{} (at end of document)", self.message),
        }
    }
}

impl std::error::Error for ParseError {}

/// The context of [`Error::Deserialize`].
#[cfg(feature = "serde")]
#[derive(Debug, Clone, PartialEq)]
pub struct DeserializeError {
    pub(crate) de: serde::de::value::Error,
}

#[cfg(feature = "serde")]
impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Deserialize(DeserializeError {
            de: serde::de::value::Error::custom(msg),
        })
    }
}

#[cfg(feature = "serde")]
impl From<serde::de::value::Error> for Error {
    fn from(e: serde::de::value::Error) -> Self {
        Self::Deserialize(DeserializeError { de: e })
    }
}

#[cfg(feature = "serde")]
impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.de)
    }
}

#[cfg(feature = "serde")]
impl std::error::Error for DeserializeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.de)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates() {
        let src = "one\ntwo\nthree";
        assert_eq!(
            ParseError::new(src, 0, "boom").to_string(),
            "boom (at line 1, column 1)"
        );
        assert_eq!(
            ParseError::new(src, 2, "boom").to_string(),
            "boom (at line 1, column 3)"
        );
        // First character after a newline is column 1.
        assert_eq!(
            ParseError::new(src, 4, "boom").to_string(),
            "boom (at line 2, column 1)"
        );
        assert_eq!(
            ParseError::new(src, 9, "boom").to_string(),
            "boom (at line 3, column 2)"
        );
        assert_eq!(
            ParseError::new(src, src.len(), "boom").to_string(),
            "boom (at end of document)"
        );
    }
}
