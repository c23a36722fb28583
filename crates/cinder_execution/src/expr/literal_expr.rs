use std::fmt;

use crate::arrays::scalar::{OwnedScalarValue, ScalarValue};

#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub literal: OwnedScalarValue,
}

impl fmt::Display for LiteralExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.literal {
            ScalarValue::Utf8(_) | ScalarValue::LargeUtf8(_) => {
                // Quote strings when displaying in the context of an
                // expression.
                write!(f, "'{}'", self.literal)
            }
            _ => write!(f, "{}", self.literal),
        }
    }
}
