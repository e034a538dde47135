//! Line protocol requests
//!
//! One request per line, whitespace-separated tokens. The command word is
//! case-insensitive; keys and values are opaque strings with no implicit
//! structure.

use std::fmt;
use std::time::Duration;

/// A parsed client request, mapping to exactly one engine operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// SET key value1 [value2 ...]
    Set { key: String, values: Vec<String> },

    /// SETUQ key value1 [value2 ...]
    SetUnique { key: String, values: Vec<String> },

    /// GET key
    Get { key: String },

    /// GETUQ key
    GetUnique { key: String },

    /// GETKEY value
    GetKey { value: String },

    /// DELETE key
    Delete { key: String },

    /// REMOVE key value
    Remove { key: String, value: String },

    /// EXISTS key
    Exists { key: String },

    /// EXPIRE key ttl_in_seconds
    Expire { key: String, ttl: Duration },

    /// TTL key
    Ttl { key: String },

    /// RAND key count
    Rand { key: String, count: usize },

    /// DELALL
    DeleteAll,

    /// DUMP filepath
    Dump { path: String },

    /// LOADDUMP filepath
    LoadDump { path: String },

    /// HELP
    Help,

    /// EXIT
    Exit,
}

/// Line parsing errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Blank line
    Empty,

    /// Unrecognized command word
    UnknownCommand(String),

    /// Wrong number of arguments; carries the usage string
    Usage(&'static str),

    /// Non-numeric or out-of-range numeric argument
    InvalidNumber,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty command"),
            ParseError::UnknownCommand(cmd) => write!(f, "unknown command '{}'", cmd),
            ParseError::Usage(usage) => write!(f, "usage: {}", usage),
            ParseError::InvalidNumber => write!(f, "invalid numeric value"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse one protocol line into a request
pub fn parse_line(line: &str) -> Result<Request, ParseError> {
    let mut parts = line.split_whitespace();
    let command = parts.next().ok_or(ParseError::Empty)?;
    let args: Vec<&str> = parts.collect();

    match command.to_ascii_uppercase().as_str() {
        "SET" => {
            if args.len() < 2 {
                return Err(ParseError::Usage("SET key value1 [value2 ...]"));
            }
            Ok(Request::Set {
                key: args[0].to_string(),
                values: args[1..].iter().map(|s| s.to_string()).collect(),
            })
        }
        "SETUQ" => {
            if args.len() < 2 {
                return Err(ParseError::Usage("SETUQ key value1 [value2 ...]"));
            }
            Ok(Request::SetUnique {
                key: args[0].to_string(),
                values: args[1..].iter().map(|s| s.to_string()).collect(),
            })
        }
        "GET" => match args.as_slice() {
            [key] => Ok(Request::Get { key: key.to_string() }),
            _ => Err(ParseError::Usage("GET key")),
        },
        "GETUQ" => match args.as_slice() {
            [key] => Ok(Request::GetUnique { key: key.to_string() }),
            _ => Err(ParseError::Usage("GETUQ key")),
        },
        "GETKEY" => match args.as_slice() {
            [value] => Ok(Request::GetKey { value: value.to_string() }),
            _ => Err(ParseError::Usage("GETKEY value")),
        },
        "DELETE" => match args.as_slice() {
            [key] => Ok(Request::Delete { key: key.to_string() }),
            _ => Err(ParseError::Usage("DELETE key")),
        },
        "REMOVE" => match args.as_slice() {
            [key, value] => Ok(Request::Remove {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(ParseError::Usage("REMOVE key value")),
        },
        "EXISTS" => match args.as_slice() {
            [key] => Ok(Request::Exists { key: key.to_string() }),
            _ => Err(ParseError::Usage("EXISTS key")),
        },
        "EXPIRE" => match args.as_slice() {
            [key, secs] => {
                let seconds: u64 = secs.parse().map_err(|_| ParseError::InvalidNumber)?;
                Ok(Request::Expire {
                    key: key.to_string(),
                    ttl: Duration::from_secs(seconds),
                })
            }
            _ => Err(ParseError::Usage("EXPIRE key ttl_in_seconds")),
        },
        "TTL" => match args.as_slice() {
            [key] => Ok(Request::Ttl { key: key.to_string() }),
            _ => Err(ParseError::Usage("TTL key")),
        },
        "RAND" => match args.as_slice() {
            [key, count] => {
                let count: usize = count.parse().map_err(|_| ParseError::InvalidNumber)?;
                Ok(Request::Rand {
                    key: key.to_string(),
                    count,
                })
            }
            _ => Err(ParseError::Usage("RAND key count")),
        },
        "DELALL" => match args.as_slice() {
            [] => Ok(Request::DeleteAll),
            _ => Err(ParseError::Usage("DELALL")),
        },
        "DUMP" => match args.as_slice() {
            [path] => Ok(Request::Dump { path: path.to_string() }),
            _ => Err(ParseError::Usage("DUMP filepath")),
        },
        "LOADDUMP" => match args.as_slice() {
            [path] => Ok(Request::LoadDump { path: path.to_string() }),
            _ => Err(ParseError::Usage("LOADDUMP filepath")),
        },
        "HELP" => Ok(Request::Help),
        "EXIT" => Ok(Request::Exit),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_with_multiple_values() {
        assert_eq!(
            parse_line("SET fruits apple banana").unwrap(),
            Request::Set {
                key: "fruits".to_string(),
                values: vec!["apple".to_string(), "banana".to_string()],
            }
        );
    }

    #[test]
    fn test_command_word_is_case_insensitive() {
        assert_eq!(
            parse_line("get fruits").unwrap(),
            Request::Get { key: "fruits".to_string() }
        );
        // Keys stay case-sensitive
        assert_eq!(
            parse_line("GET Fruits").unwrap(),
            Request::Get { key: "Fruits".to_string() }
        );
    }

    #[test]
    fn test_parse_expire_and_rand_numbers() {
        assert_eq!(
            parse_line("EXPIRE k 30").unwrap(),
            Request::Expire {
                key: "k".to_string(),
                ttl: Duration::from_secs(30),
            }
        );
        assert_eq!(
            parse_line("RAND k 2").unwrap(),
            Request::Rand { key: "k".to_string(), count: 2 }
        );
        assert_eq!(parse_line("EXPIRE k soon"), Err(ParseError::InvalidNumber));
        assert_eq!(parse_line("RAND k -1"), Err(ParseError::InvalidNumber));
    }

    #[test]
    fn test_parse_arity_errors() {
        assert!(matches!(parse_line("SET onlykey"), Err(ParseError::Usage(_))));
        assert!(matches!(parse_line("GET"), Err(ParseError::Usage(_))));
        assert!(matches!(parse_line("REMOVE k"), Err(ParseError::Usage(_))));
        assert!(matches!(parse_line("DELALL extra"), Err(ParseError::Usage(_))));
    }

    #[test]
    fn test_parse_empty_and_unknown() {
        assert_eq!(parse_line("   "), Err(ParseError::Empty));
        assert_eq!(
            parse_line("FLUSH"),
            Err(ParseError::UnknownCommand("FLUSH".to_string()))
        );
    }
}
