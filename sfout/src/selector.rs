use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SelectorError {
    #[error("variable selector is empty")]
    Empty,
    #[error("no dataset name before '[' in <{0}>")]
    NoName(String),
    #[error("dataset name <{1}> in <{0}> contains whitespace or brackets")]
    BadName(String, String),
    #[error("missing closing ']' in <{0}>")]
    Unclosed(String),
    #[error("unexpected text <{1}> after ']' in <{0}>")]
    Trailing(String, String),
    #[error("empty index in <{0}>")]
    EmptyIndex(String),
    #[error("index <{1}> in <{0}> is not a non-negative integer")]
    BadIndex(String, String),
}

/// A path to one element of an output dataset, written as
/// `NAME[i,j,...;;;]`.
///
/// `indices` address the leading axes in file order. When `fill` is set
/// (one or more `;` before the `]`), every axis after the given indices is
/// taken at 0. A bare `NAME` selects the single element of a one-element
/// dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub name: String,
    pub indices: Vec<usize>,
    pub fill: bool,
    bracketed: bool,
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self, SelectorError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(SelectorError::Empty);
        }

        let open = match s.find('[') {
            Some(i) => i,
            None => {
                return Ok(Selector {
                    name: check_name(raw, s)?.to_string(),
                    indices: Vec::new(),
                    fill: false,
                    bracketed: false,
                });
            }
        };

        let name = check_name(raw, s[..open].trim())?;

        let rest = &s[open + 1..];
        let close = rest
            .find(']')
            .ok_or_else(|| SelectorError::Unclosed(raw.to_string()))?;
        let after = rest[close + 1..].trim();
        if !after.is_empty() {
            return Err(SelectorError::Trailing(raw.to_string(), after.to_string()));
        }

        let body = rest[..close].trim();
        let (index_list, fill) = match body.find(';') {
            Some(semi) => {
                let marker = &body[semi..];
                if marker.chars().any(|c| c != ';' && !c.is_whitespace()) {
                    return Err(SelectorError::Trailing(raw.to_string(), marker.to_string()));
                }
                (body[..semi].trim(), true)
            }
            None => (body, false),
        };

        let indices = if index_list.is_empty() {
            // `NAME[;;;]` is every axis at 0, `NAME[]` is a typo
            if !fill {
                return Err(SelectorError::EmptyIndex(raw.to_string()));
            }
            Vec::new()
        } else {
            index_list
                .split(',')
                .map(|idx| parse_index(raw, idx))
                .collect::<Result<Vec<_>, _>>()?
        };

        Ok(Selector {
            name: name.to_string(),
            indices,
            fill,
            bracketed: true,
        })
    }

    /// True when the selector had no brackets at all
    pub fn is_bare(&self) -> bool {
        !self.bracketed
    }
}

fn check_name<'n>(raw: &str, name: &'n str) -> Result<&'n str, SelectorError> {
    if name.is_empty() {
        return Err(SelectorError::NoName(raw.to_string()));
    }
    if name.chars().any(|c| c.is_whitespace() || c == '[' || c == ']') {
        return Err(SelectorError::BadName(raw.to_string(), name.to_string()));
    }
    Ok(name)
}

fn parse_index(raw: &str, idx: &str) -> Result<usize, SelectorError> {
    let idx = idx.trim();
    if idx.is_empty() {
        return Err(SelectorError::EmptyIndex(raw.to_string()));
    }
    // `usize::from_str` accepts a leading '+', which the notation doesn't
    if !idx.chars().all(|c| c.is_ascii_digit()) {
        return Err(SelectorError::BadIndex(raw.to_string(), idx.to_string()));
    }
    idx.parse()
        .map_err(|_| SelectorError::BadIndex(raw.to_string(), idx.to_string()))
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.bracketed {
            return Ok(());
        }

        write!(f, "[")?;
        for (i, idx) in self.indices.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", idx)?;
        }
        if self.fill {
            write!(f, ";;;")?;
        }
        write!(f, "]")
    }
}
