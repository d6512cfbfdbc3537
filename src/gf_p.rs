//// #### Two implementations of GF(p) where p is a prime number
////
//// Both strategies compute exactly the same thing. They only differ in how:
////
////   - `CalculateArithmetic` does plain modular arithmetic on every call.
////   - `LookupArithmetic` reads precomputed `EXP`/`LOG`/`ZECH_LOG` tables, turning
////     multiplication, division, powers and logarithms into O(1) table reads.
////
//// The lookup strategy costs `O(p)` memory up front, so it's only a good fit for small fields.
use crate::algorithm;
use crate::error::{Error, Result};
use crate::field::{FieldArithmetic, FieldDescriptor};
use crate::lut::LookupTables;
use std::sync::Arc;

fn require_prime_field(field: &FieldDescriptor) -> Result<()> {
  if !field.is_prime_field() {
    return Err(Error::UnsupportedMode(format!("{} is not a prime field", field)));
  }
  Ok(())
}

//// #### Calculation
////
//// Addition and multiplication are done in 128 bits before the modulus, so nothing overflows
//// for any 64-bit prime.
#[derive(Debug, Clone)]
pub struct CalculateArithmetic {
  field: FieldDescriptor,
}

impl CalculateArithmetic {
  pub fn new(field: FieldDescriptor) -> Result<CalculateArithmetic> {
    require_prime_field(&field)?;
    Ok(CalculateArithmetic { field })
  }

  fn p(&self) -> u64 {
    self.field.order()
  }
}

impl FieldArithmetic for CalculateArithmetic {
  fn descriptor(&self) -> &FieldDescriptor {
    &self.field
  }

  fn add(&self, a: u64, b: u64) -> u64 {
    ((a as u128 + b as u128) % self.p() as u128) as u64
  }

  fn subtract(&self, a: u64, b: u64) -> u64 {
    if a >= b {
      a - b
    } else {
      self.p() - (b - a)
    }
  }

  fn multiply(&self, a: u64, b: u64) -> u64 {
    ((a as u128 * b as u128) % self.p() as u128) as u64
  }

  //// `neg(a) = (p - a) % p`, so that zero stays zero
  fn negate(&self, a: u64) -> u64 {
    (self.p() - a) % self.p()
  }

  fn reciprocal(&self, a: u64) -> Result<u64> {
    // Important: Zero has no inverse, it's invalid
    if a == 0 {
      return Err(Error::DivisionByZero);
    }
    let (x, gcd) = algorithm::extended_gcd(a, self.p());
    if gcd != 1 {
      return Err(Error::InvalidFieldParameters(format!(
        "{} has no inverse modulo {}, the characteristic is not prime",
        a,
        self.p()
      )));
    }
    Ok(x.rem_euclid(self.p() as i128) as u64)
  }
}

//// #### Lookup
////
//// The tables are shared (`Arc`) and read-only once built, so any number of threads can use
//// the same `LookupArithmetic` at once.
#[derive(Debug, Clone)]
pub struct LookupArithmetic {
  field: FieldDescriptor,
  tables: Arc<LookupTables>,
}

impl LookupArithmetic {
  pub fn new(field: FieldDescriptor, tables: Arc<LookupTables>) -> Result<LookupArithmetic> {
    require_prime_field(&field)?;
    if tables.order() != field.order() {
      return Err(Error::InvalidFieldParameters(format!(
        "lookup tables were built for a field of order {}, not {}",
        tables.order(),
        field
      )));
    }
    Ok(LookupArithmetic { field, tables })
  }

  pub fn tables(&self) -> &Arc<LookupTables> {
    &self.tables
  }
}

impl FieldArithmetic for LookupArithmetic {
  fn descriptor(&self) -> &FieldDescriptor {
    &self.field
  }

  //// Addition through Zech logarithms. With `m <= n`:
  ////
  //// ```text
  //// alpha^m + alpha^n = alpha^m * (1 + alpha^(n-m)) = alpha^(m + ZECH_LOG[n-m])
  //// ```
  ////
  //// unless `1 + alpha^(n-m) == 0`, in which case the operands cancel.
  fn add(&self, a: u64, b: u64) -> u64 {
    if a == 0 {
      return b;
    }
    if b == 0 {
      return a;
    }

    let t = &self.tables;
    let (mut m, mut n) = (t.log(a), t.log(b));
    if m > n {
      std::mem::swap(&mut m, &mut n);
    }
    let d = n - m;
    if t.exp(d) == self.order() - 1 {
      return 0; // b == -a
    }
    t.exp(m + t.zech_log(d))
  }

  fn multiply(&self, a: u64, b: u64) -> u64 {
    if a == 0 || b == 0 {
      return 0;
    }
    let t = &self.tables;
    t.exp(t.log(a) + t.log(b))
  }

  fn negate(&self, a: u64) -> u64 {
    (self.order() - a) % self.order()
  }

  fn reciprocal(&self, a: u64) -> Result<u64> {
    if a == 0 {
      return Err(Error::DivisionByZero);
    }
    let t = &self.tables;
    Ok(t.exp(self.order() - 1 - t.log(a)))
  }

  fn divide(&self, a: u64, b: u64) -> Result<u64> {
    if b == 0 {
      return Err(Error::DivisionByZero);
    }
    if a == 0 {
      return Ok(0);
    }
    let t = &self.tables;
    Ok(t.exp(t.log(a) + (self.order() - 1 - t.log(b))))
  }

  fn power(&self, a: u64, exponent: i64) -> Result<u64> {
    if exponent == 0 {
      return Ok(1);
    }
    if a == 0 {
      return if exponent > 0 { Ok(0) } else { Err(Error::DivisionByZero) };
    }
    let t = &self.tables;
    let cycle = (self.order() - 1) as i128;
    let idx = (t.log(a) as i128 * exponent as i128).rem_euclid(cycle);
    Ok(t.exp(idx as u64))
  }

  fn log(&self, a: u64) -> Result<u64> {
    if a == 0 {
      return Err(Error::LogOfZero);
    }
    Ok(self.tables.log(a))
  }
}
