//// #### Errors
////
//// Everything in this crate is pure computation, so every error is a deterministic
//// function of the inputs. Nothing is retried and nothing returns a partial result.
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid field parameters: {0}")]
    InvalidFieldParameters(String),

    #[error("field element {value} is out of range, must satisfy 0 <= x < {order}")]
    ValueOutOfRange { value: u64, order: u64 },

    #[error("division by zero")]
    DivisionByZero,

    #[error("the logarithm of zero is undefined")]
    LogOfZero,

    #[error("the LU decomposition does not exist, use the LUP decomposition instead")]
    NoLuDecomposition,

    #[error("the matrix is singular")]
    SingularMatrix,

    #[error("expected a square matrix, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("unsupported calculation mode: {0}")]
    UnsupportedMode(String),

    #[error("cannot build lookup tables for a field of order {0}")]
    TableTooLarge(u64),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, Error>;
