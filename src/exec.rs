//// #### Elementwise execution
////
//// Every elementwise operation (and `poly_eval` over many points) is embarrassingly parallel:
//// output `i` only depends on input `i`. The `Target` picks how the map is executed. The
//// results never depend on the choice.
use crate::error::{Error, Result};
use rayon::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Target {
    /// A plain sequential loop on the calling thread
    #[default]
    Cpu,
    /// Split the map across the rayon thread pool
    Parallel,
}

impl std::str::FromStr for Target {
    type Err = Error;
    fn from_str(s: &str) -> Result<Target> {
        match s {
            "cpu" => Ok(Target::Cpu),
            "parallel" => Ok(Target::Parallel),
            _ => Err(Error::InvalidConfiguration(format!(
                "valid targets are ['cpu', 'parallel'], not '{}'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Target::Cpu => write!(f, "cpu"),
            Target::Parallel => write!(f, "parallel"),
        }
    }
}

//// Two operands are compatible when they have the same length, or when one of them is a single
//// value that gets repeated against every element of the other.
fn broadcast_len(a: usize, b: usize) -> Result<usize> {
    match (a, b) {
        _ if a == b => Ok(a),
        (1, n) | (n, 1) => Ok(n),
        _ => Err(Error::ShapeMismatch(format!(
            "operands of length {} and {} can't be broadcast together",
            a, b
        ))),
    }
}

#[inline]
fn at<T: Copy>(xs: &[T], i: usize) -> T {
    if xs.len() == 1 {
        xs[0]
    } else {
        xs[i]
    }
}

impl Target {
    pub fn map<A, T, F>(&self, xs: &[A], f: F) -> Vec<T>
    where
        A: Copy + Sync,
        T: Send,
        F: Fn(A) -> T + Send + Sync,
    {
        match self {
            Target::Cpu => xs.iter().map(|&x| f(x)).collect(),
            Target::Parallel => xs.par_iter().map(|&x| f(x)).collect(),
        }
    }

    /// Like `map`, but the first error aborts the whole operation.
    pub fn try_map<A, T, F>(&self, xs: &[A], f: F) -> Result<Vec<T>>
    where
        A: Copy + Sync,
        T: Send,
        F: Fn(A) -> Result<T> + Send + Sync,
    {
        match self {
            Target::Cpu => xs.iter().map(|&x| f(x)).collect(),
            Target::Parallel => xs.par_iter().map(|&x| f(x)).collect(),
        }
    }

    pub fn zip_map<A, B, T, F>(&self, a: &[A], b: &[B], f: F) -> Result<Vec<T>>
    where
        A: Copy + Sync,
        B: Copy + Sync,
        T: Send,
        F: Fn(A, B) -> T + Send + Sync,
    {
        let n = broadcast_len(a.len(), b.len())?;
        Ok(match self {
            Target::Cpu => (0..n).map(|i| f(at(a, i), at(b, i))).collect(),
            Target::Parallel => (0..n).into_par_iter().map(|i| f(at(a, i), at(b, i))).collect(),
        })
    }

    pub fn try_zip_map<A, B, T, F>(&self, a: &[A], b: &[B], f: F) -> Result<Vec<T>>
    where
        A: Copy + Sync,
        B: Copy + Sync,
        T: Send,
        F: Fn(A, B) -> Result<T> + Send + Sync,
    {
        let n = broadcast_len(a.len(), b.len())?;
        match self {
            Target::Cpu => (0..n).map(|i| f(at(a, i), at(b, i))).collect(),
            Target::Parallel => (0..n).into_par_iter().map(|i| f(at(a, i), at(b, i))).collect(),
        }
    }
}
