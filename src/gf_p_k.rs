//// #### An implementation of GF(p^k) where p is a prime number and k >= 2
////
//// Elements are polynomials over `GF(p)` of degree below `k`, stored as raw integers in the
//// "decimal representation": the base-`p` digits are the coefficients.
////
//// ```text
//// digit 0 => 1
//// digit 1 => x
//// digit 2 => x^2
//// ... etc ...
//// ```
////
//// Addition is digit-wise in `GF(p)`. Multiplication is a convolution of the digits followed by a
//// reduction modulo the irreducible polynomial `Q`. This is the calculation strategy for
//// extension fields; lookup tables are only offered for prime fields.
use crate::error::{Error, Result};
use crate::field::{FieldArithmetic, FieldDescriptor};

#[derive(Debug, Clone)]
pub struct ExtensionArithmetic {
  field: FieldDescriptor,
  p: u64,
  k: usize,
  q: Vec<u64>, // the modulus polynomial, k+1 coefficients, q[k] == 1
}

impl ExtensionArithmetic {
  pub fn new(field: FieldDescriptor) -> Result<ExtensionArithmetic> {
    let poly = field.irreducible_poly().ok_or_else(|| {
      Error::UnsupportedMode(format!("{} has no irreducible polynomial, it is not an extension field", field))
    })?;
    let p = field.characteristic();
    let k = field.degree() as usize;
    let q = to_digits(poly, p, k + 1);
    Ok(ExtensionArithmetic { field, p, k, q })
  }

  fn coeff_add(&self, a: u64, b: u64) -> u64 {
    ((a as u128 + b as u128) % self.p as u128) as u64
  }

  fn coeff_neg(&self, a: u64) -> u64 {
    (self.p - a) % self.p
  }

  fn coeff_mul(&self, a: u64, b: u64) -> u64 {
    ((a as u128 * b as u128) % self.p as u128) as u64
  }

  //// Convolution of two k-digit vectors gives a (2k-1)-digit result
  fn poly_mul(&self, a: &[u64], b: &[u64]) -> Vec<u64> {
    let mut c = vec![0; 2 * self.k - 1];
    for (i, &ai) in a.iter().enumerate() {
      if ai == 0 {
        continue;
      }
      for (j, &bj) in b.iter().enumerate() {
        c[i + j] = self.coeff_add(c[i + j], self.coeff_mul(ai, bj));
      }
    }
    c
  }

  //// Eliminate the high terms one at a time by subtracting a shifted and scaled `Q`
  fn poly_mod(&self, mut a: Vec<u64>) -> Vec<u64> {
    let k = self.k;
    for i in (k..a.len()).rev() {
      let shift = i - k;
      let scale = self.coeff_neg(a[i]);
      if scale == 0 {
        continue;
      }
      for j in shift..=i {
        let val = self.coeff_mul(scale, self.q[j - shift]);
        a[j] = self.coeff_add(a[j], val);
      }
      debug_assert_eq!(a[i], 0);
    }
    a.truncate(k);
    a
  }
}

pub(crate) fn to_digits(mut val: u64, p: u64, len: usize) -> Vec<u64> {
  let mut vec = vec![0; len];
  for digit in vec.iter_mut() {
    *digit = val % p;
    val /= p;
  }
  vec
}

pub(crate) fn from_digits(digits: &[u64], p: u64) -> u64 {
  digits.iter().rev().fold(0, |val, &d| val * p + d)
}

impl FieldArithmetic for ExtensionArithmetic {
  fn descriptor(&self) -> &FieldDescriptor {
    &self.field
  }

  fn add(&self, a: u64, b: u64) -> u64 {
    let a = to_digits(a, self.p, self.k);
    let b = to_digits(b, self.p, self.k);
    let c: Vec<u64> = a.iter().zip(&b).map(|(&x, &y)| self.coeff_add(x, y)).collect();
    from_digits(&c, self.p)
  }

  fn negate(&self, a: u64) -> u64 {
    let a: Vec<u64> = to_digits(a, self.p, self.k).into_iter().map(|x| self.coeff_neg(x)).collect();
    from_digits(&a, self.p)
  }

  fn multiply(&self, a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
      return 0;
    }
    let a = to_digits(a, self.p, self.k);
    let b = to_digits(b, self.p, self.k);
    from_digits(&self.poly_mod(self.poly_mul(&a, &b)), self.p)
  }

  //// The multiplicative group has `order - 1` elements, so `a^(order-2) = a^-1`
  fn reciprocal(&self, a: u64) -> Result<u64> {
    // Important: Zero has no inverse, it's invalid
    if a == 0 {
      return Err(Error::DivisionByZero);
    }
    let inv = crate::algorithm::power(a, (self.order() - 2) as i128, |x, y| self.multiply(x, y), |_| {
      Err(Error::DivisionByZero)
    })?;
    // Only holds when Q is irreducible, which the descriptor can't check up front
    if self.multiply(a, inv) != 1 {
      return Err(Error::InvalidFieldParameters(format!(
        "{} has no inverse, the modulus polynomial {} is not irreducible over GF({})",
        a,
        from_digits(&self.q, self.p),
        self.p
      )));
    }
    Ok(inv)
  }
}
