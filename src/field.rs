//// #### A type definition for a Field
////
//// A field is described by a handful of immutable parameters: the characteristic `p`, the
//// extension degree `m`, the order `p^m` and a primitive element `alpha` whose powers walk
//// every non-zero element. Extension fields also carry the irreducible polynomial used as
//// the modulus for multiplication.
////
//// The arithmetic itself lives behind the `FieldArithmetic` trait so that generic code
//// (the linear algebra in particular) can be written once and run over any field and any
//// calculation strategy.
use crate::algorithm;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
  characteristic: u64,
  degree: u32,
  order: u64,
  primitive_element: u64,
  irreducible_poly: Option<u64>,
}

impl FieldDescriptor {
  /// Describe the prime field `GF(p)` with multiplicative generator `alpha`.
  ///
  /// Primality of `p` is not checked. Whether `alpha` really is primitive is only verified
  /// when lookup tables are built (or on demand via `GF::verify_primitive_element`).
  pub fn prime(characteristic: u64, primitive_element: u64) -> Result<FieldDescriptor> {
    FieldDescriptor::validated(characteristic, 1, primitive_element, None)
  }

  /// Describe the extension field `GF(p^m)`, `m >= 2`.
  ///
  /// `irreducible_poly` is the monic modulus polynomial in integer representation: its
  /// base-`p` digits are the coefficients, least significant digit first. For `GF(3^2)`
  /// with `x^2 + 1` that's `1*9 + 0*3 + 1 = 10`.
  pub fn extension(
    characteristic: u64,
    degree: u32,
    irreducible_poly: u64,
    primitive_element: u64,
  ) -> Result<FieldDescriptor> {
    if degree < 2 {
      return Err(Error::InvalidFieldParameters(format!(
        "extension fields need degree >= 2, not {}, use FieldDescriptor::prime instead",
        degree
      )));
    }
    FieldDescriptor::validated(characteristic, degree, primitive_element, Some(irreducible_poly))
  }

  fn validated(
    characteristic: u64,
    degree: u32,
    primitive_element: u64,
    irreducible_poly: Option<u64>,
  ) -> Result<FieldDescriptor> {
    if characteristic < 2 {
      return Err(Error::InvalidFieldParameters(format!(
        "characteristic must be a prime >= 2, not {}",
        characteristic
      )));
    }

    // p^m has to fit our element representation
    let order = characteristic.checked_pow(degree).ok_or_else(|| {
      Error::InvalidFieldParameters(format!("order {}^{} does not fit in 64 bits", characteristic, degree))
    })?;

    if !(1..order).contains(&primitive_element) {
      return Err(Error::InvalidFieldParameters(format!(
        "primitive element must satisfy 1 <= alpha < {}, not {}",
        order, primitive_element
      )));
    }

    // A monic polynomial of degree m lies in [p^m, 2*p^m) in integer representation
    if let Some(poly) = irreducible_poly {
      let lo = order as u128;
      let hi = 2 * order as u128;
      if !(lo..hi).contains(&(poly as u128)) {
        return Err(Error::InvalidFieldParameters(format!(
          "irreducible polynomial {} is not a monic polynomial of degree {} over GF({})",
          poly, degree, characteristic
        )));
      }
    }

    Ok(FieldDescriptor {
      characteristic,
      degree,
      order,
      primitive_element,
      irreducible_poly,
    })
  }

  pub fn characteristic(&self) -> u64 {
    self.characteristic
  }

  pub fn degree(&self) -> u32 {
    self.degree
  }

  pub fn order(&self) -> u64 {
    self.order
  }

  pub fn primitive_element(&self) -> u64 {
    self.primitive_element
  }

  pub fn irreducible_poly(&self) -> Option<u64> {
    self.irreducible_poly
  }

  pub fn is_prime_field(&self) -> bool {
    self.degree == 1
  }

  pub fn contains(&self, value: u64) -> bool {
    value < self.order
  }

  /// Boundary check for a raw field element.
  pub fn check(&self, value: u64) -> Result<u64> {
    if self.contains(value) {
      Ok(value)
    } else {
      Err(Error::ValueOutOfRange { value, order: self.order })
    }
  }
}

impl std::fmt::Display for FieldDescriptor {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    if self.is_prime_field() {
      write!(f, "GF({})", self.characteristic)
    } else {
      write!(f, "GF({}^{})", self.characteristic, self.degree)
    }
  }
}

//// #### The arithmetic interface
////
//// Every calculation strategy implements the four basic operations plus negation and
//// reciprocal. Everything else has a default built on top of those, which a strategy may
//// override when it knows a faster way (the lookup tables make `power` and `log` O(1)).
////
//// Elements are raw integers in `[0, order)`. Zero is always `0` and one is always `1`.
pub trait FieldArithmetic: Send + Sync + std::fmt::Debug {
  fn descriptor(&self) -> &FieldDescriptor;

  fn add(&self, a: u64, b: u64) -> u64;
  fn multiply(&self, a: u64, b: u64) -> u64;
  fn negate(&self, a: u64) -> u64;
  fn reciprocal(&self, a: u64) -> Result<u64>;

  fn order(&self) -> u64 {
    self.descriptor().order()
  }

  fn subtract(&self, a: u64, b: u64) -> u64 {
    self.add(a, self.negate(b))
  }

  fn divide(&self, a: u64, b: u64) -> Result<u64> {
    // Important: Cannot divide by zero
    if b == 0 {
      return Err(Error::DivisionByZero);
    }
    if a == 0 {
      return Ok(0);
    }
    Ok(self.multiply(a, self.reciprocal(b)?))
  }

  fn square(&self, a: u64) -> u64 {
    self.multiply(a, a)
  }

  fn power(&self, a: u64, exponent: i64) -> Result<u64> {
    algorithm::power(a, exponent.into(), |x, y| self.multiply(x, y), |x| self.reciprocal(x))
  }

  /// The discrete logarithm of `a` base `alpha`.
  fn log(&self, a: u64) -> Result<u64> {
    if a == 0 {
      return Err(Error::LogOfZero);
    }
    let alpha = self.descriptor().primitive_element();
    algorithm::discrete_log(a, alpha, self.order(), |x, y| self.multiply(x, y)).ok_or_else(|| {
      Error::InvalidFieldParameters(format!(
        "{} is not a power of alpha = {}, alpha is not a multiplicative generator of {}",
        a,
        alpha,
        self.descriptor()
      ))
    })
  }

  /// The `n`-fold sum `a + a + ... + a`, with `n` an ordinary integer rather than a field element.
  fn multiple_add(&self, a: u64, n: u64) -> u64 {
    // Double-and-add
    let mut result = 0;
    let mut addend = a;
    let mut n = n;
    while n > 0 {
      if n & 1 == 1 {
        result = self.add(result, addend);
      }
      addend = self.add(addend, addend);
      n >>= 1;
    }
    result
  }

  /// Horner evaluation of `c[0]*x^(d) + c[1]*x^(d-1) + ... + c[d]`, highest degree first.
  /// The empty polynomial is zero.
  fn poly_eval(&self, coeffs: &[u64], x: u64) -> u64 {
    let Some((&first, rest)) = coeffs.split_first() else {
      return 0;
    };
    rest.iter().fold(first, |acc, &c| self.add(c, self.multiply(acc, x)))
  }
}
