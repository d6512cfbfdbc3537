//! Exact arithmetic and linear algebra over finite fields.
//!
//! A field is described once by a [`FieldDescriptor`] and then driven through a [`GF`] context,
//! which picks a calculation strategy (lookup tables for small prime fields, direct calculation
//! otherwise) and an execution [`Target`] for elementwise operations.
//!
//! ```
//! use galois_core::{FieldDescriptor, GF};
//!
//! let gf = GF::new(FieldDescriptor::prime(7, 3)?)?;
//! assert_eq!(gf.multiply(&[3, 4], &[5])?, vec![1, 6]);
//! assert_eq!(gf.log(&[6])?, vec![3]);
//! # Ok::<(), galois_core::Error>(())
//! ```
pub mod algorithm;
pub mod error;
pub mod exec;
pub mod field;
pub mod gf;
pub mod gf_p;
pub mod gf_p_k;
pub mod linalg;
pub mod lut;

pub use error::{Error, Result};
pub use exec::Target;
pub use field::{FieldArithmetic, FieldDescriptor};
pub use gf::{Mode, GF, LOOKUP_ORDER_LIMIT};
pub use linalg::{Lup, Matrix};
pub use lut::MAX_TABLE_ORDER;
