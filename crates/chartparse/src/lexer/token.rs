use crate::error::TokenError;
use compact_str::CompactString;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// A token produced by the host's lexer.
///
/// Every field starts out unset. Accessors for the terminal type, lexical
/// rule, position and line fail with [`TokenError::InvalidState`] until the
/// field has been set; the value is optional and simply reads as `None`.
///
/// # Example
///
/// ```rust
/// use chartparse::error::TokenError;
/// use chartparse::lexer::Token;
///
/// let mut token = Token::<i64>::default();
/// assert_eq!(token.kind(), Err(TokenError::InvalidState { field: "type" }));
///
/// token.set_kind("NUMBER")?;
/// token.set_line(3);
/// assert_eq!(token.kind(), Ok("NUMBER"));
/// assert_eq!(token.line(), Ok(3));
/// assert_eq!(token.value(), None);
/// # Ok::<(), TokenError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Token<V> {
    #[cfg_attr(feature = "serialize", serde(rename = "type"))]
    kind: Option<CompactString>,
    rule: Option<CompactString>,
    value: Option<V>,
    position: Option<usize>,
    #[cfg_attr(feature = "serialize", serde(rename = "linenumber"))]
    line: Option<usize>,
}

impl<V> Default for Token<V> {
    fn default() -> Self {
        Self {
            kind: None,
            rule: None,
            value: None,
            position: None,
            line: None,
        }
    }
}

impl<V> Token<V> {
    /// Create a token of terminal type `kind` with every other field unset.
    ///
    /// The type is not checked here; an empty type is reported by
    /// [`Token::kind`].
    #[must_use]
    pub fn new(kind: impl Into<CompactString>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_value(mut self, value: V) -> Self {
        self.value = Some(value);
        self
    }

    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl Into<CompactString>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Terminal type of the token
    ///
    /// # Errors
    ///
    /// [`TokenError::InvalidState`] if never set, [`TokenError::EmptyField`]
    /// if set to an empty string.
    pub fn kind(&self) -> Result<&str, TokenError> {
        non_empty(self.kind.as_deref(), "type")
    }

    /// Set the terminal type
    ///
    /// # Errors
    ///
    /// [`TokenError::EmptyField`] for an empty type.
    pub fn set_kind(&mut self, kind: &str) -> Result<(), TokenError> {
        if kind.is_empty() {
            return Err(TokenError::EmptyField { field: "type" });
        }
        self.kind = Some(kind.into());
        Ok(())
    }

    /// Name of the lexical rule that produced the token
    ///
    /// # Errors
    ///
    /// Same conditions as [`Token::kind`].
    pub fn rule(&self) -> Result<&str, TokenError> {
        non_empty(self.rule.as_deref(), "rule")
    }

    /// # Errors
    ///
    /// [`TokenError::EmptyField`] for an empty rule name.
    pub fn set_rule(&mut self, rule: &str) -> Result<(), TokenError> {
        if rule.is_empty() {
            return Err(TokenError::EmptyField { field: "rule" });
        }
        self.rule = Some(rule.into());
        Ok(())
    }

    #[must_use]
    pub const fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn set_value(&mut self, value: V) {
        self.value = Some(value);
    }

    #[must_use]
    pub fn into_value(self) -> Option<V> {
        self.value
    }

    /// Offset of the token in the input
    ///
    /// # Errors
    ///
    /// [`TokenError::InvalidState`] if never set.
    pub fn position(&self) -> Result<usize, TokenError> {
        self.position
            .ok_or(TokenError::InvalidState { field: "position" })
    }

    pub fn set_position(&mut self, position: usize) {
        self.position = Some(position);
    }

    /// Line of the token in the input
    ///
    /// # Errors
    ///
    /// [`TokenError::InvalidState`] if never set.
    pub fn line(&self) -> Result<usize, TokenError> {
        self.line
            .ok_or(TokenError::InvalidState { field: "linenumber" })
    }

    pub fn set_line(&mut self, line: usize) {
        self.line = Some(line);
    }
}

fn non_empty<'a>(field: Option<&'a str>, name: &'static str) -> Result<&'a str, TokenError> {
    match field {
        None => Err(TokenError::InvalidState { field: name }),
        Some("") => Err(TokenError::EmptyField { field: name }),
        Some(value) => Ok(value),
    }
}
