use thiserror::Error as ThisError;

use crate::payload::Kind;

#[macro_export]
macro_rules! internal_err {
    () => {
        $crate::error::Error::Internal(None, std::file!(), std::line!())
    };
    ( $x:expr ) => {
        $crate::error::Error::Internal(Some($x.to_string()), std::file!(), std::line!())
    };
}

#[macro_export]
macro_rules! err {
    ( $x:expr ) => {
        $crate::error::Error::Other($x.to_string())
    };
}

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum Error {
    #[error("object cannot be coerced to type 'numeric'")]
    CannotBeCoercedToNumeric,
    #[error("object cannot be coerced to type '{0}'")]
    CannotBeCoercedTo(Kind),
    #[error("'{op}' is not supported for payloads of type '{kind}'")]
    Unsupported { op: &'static str, kind: Kind },
    #[error("{0}")]
    Other(String),
    #[error("{}", internal_message(.0, .1, .2))]
    Internal(Option<String>, &'static str, u32),
}

fn internal_message(msg: &Option<String>, file: &str, line: &u32) -> String {
    match msg {
        Some(msg) => format!("Internal Error ({file}:{line})\n{msg}"),
        None => format!("Internal Error ({file}:{line})"),
    }
}

impl Error {
    pub fn unsupported(op: &'static str, kind: Kind) -> Self {
        Error::Unsupported { op, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use crate::payload::Kind;

    #[test]
    fn messages() {
        assert_eq!(
            Error::CannotBeCoercedTo(Kind::Integer).to_string(),
            "object cannot be coerced to type 'integer'"
        );
        assert_eq!(
            Error::unsupported("median", Kind::Complex).to_string(),
            "'median' is not supported for payloads of type 'complex'"
        );
        assert_eq!(crate::err!("oops").to_string(), "oops");
    }

    #[test]
    fn internal_records_location() {
        let e = crate::internal_err!("bad state");
        match &e {
            Error::Internal(Some(msg), file, _) => {
                assert_eq!(msg, "bad state");
                assert!(file.ends_with("error.rs"));
            }
            _ => unreachable!(),
        }
        assert!(e.to_string().contains("bad state"));
    }
}
