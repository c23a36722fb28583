pub mod column_expr;
pub mod literal_expr;

use std::fmt;

use cinder_error::{CinderError, Result};

use self::column_expr::ColumnExpr;
use self::literal_expr::LiteralExpr;

use crate::arrays::datatype::DataType;
use crate::arrays::scalar::OwnedScalarValue;
use crate::logical::binder::bind_context::BindContext;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Column(ColumnExpr),
    Literal(LiteralExpr),
}

impl Expression {
    pub fn datatype(&self, bind_context: &BindContext) -> Result<DataType> {
        Ok(match self {
            Self::Column(expr) => expr.datatype(bind_context)?,
            Self::Literal(expr) => expr.literal.datatype(),
        })
    }

    /// If this expression can be folded into a constant at plan time.
    pub const fn is_const_foldable(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Try to get the constant scalar value for this expression.
    ///
    /// Errors for expressions that aren't constant.
    pub fn try_into_scalar(self) -> Result<OwnedScalarValue> {
        match self {
            Self::Literal(expr) => Ok(expr.literal),
            other => Err(CinderError::new(format!(
                "Expression is not a constant: {other}"
            ))),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(expr) => expr.fmt(f),
            Self::Literal(expr) => expr.fmt(f),
        }
    }
}

/// Create a new literal expression.
pub fn lit(value: impl Into<OwnedScalarValue>) -> Expression {
    Expression::Literal(LiteralExpr {
        literal: value.into(),
    })
}

/// Create a new column reference expression.
pub fn col_ref(table: impl Into<crate::logical::binder::table_list::TableRef>, column: usize) -> Expression {
    Expression::Column(ColumnExpr::new(table, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::scalar::ScalarValue;

    #[test]
    fn literal_folds() {
        let expr = lit("DESC");
        assert!(expr.is_const_foldable());
        assert_eq!(
            ScalarValue::from("DESC"),
            expr.try_into_scalar().unwrap()
        );
    }

    #[test]
    fn column_does_not_fold() {
        let expr = col_ref(0, 0);
        assert!(!expr.is_const_foldable());
        assert!(expr.try_into_scalar().is_err());
    }
}
