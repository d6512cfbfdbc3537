//// #### Number-theoretic building blocks
////
//// These don't know anything about lookup tables or calculation modes. `power` and
//// `discrete_log` take the field's multiplication as a closure, so every intermediate value
//// passes through the field and never grows past `order`.
use crate::error::Result;

//// [The Extended Euclidean Algorithm](https://en.wikipedia.org/wiki/Extended_Euclidean_algorithm)
//// finds `x` and `y` with `a*x + n*y = gcd(a, n)`. When the gcd is 1, `x mod n` is the
//// multiplicative inverse of `a`.
////
//// Returns the Bezout coefficient `x` (possibly negative) and the gcd. The caller is expected to
//// rule out `a == 0` first: the algorithm happily returns `(0, n)` for it, which isn't an inverse.
pub fn extended_gcd(a: u64, n: u64) -> (i128, u64) {
  let (mut old_r, mut r) = (a as i128, n as i128);
  let (mut old_s, mut s) = (1i128, 0i128);

  while r != 0 {
    let q = old_r / r;
    (old_r, r) = (r, old_r - q * r);
    (old_s, s) = (s, old_s - q * s);
  }

  (old_s, old_r as u64)
}

//// Square-and-multiply:
////
//// ```text
//// a^13 = a^(0b1101) = a^8 * a^4 * a^1
//// ```
////
//// A negative exponent inverts the base first. `a^0 == 1` for every `a`, zero included. The
//// exponent is 128 bits wide so callers can raise to `order - 2` for any 64-bit order.
pub fn power<M, I>(base: u64, exponent: i128, multiply: M, invert: I) -> Result<u64>
where
  M: Fn(u64, u64) -> u64,
  I: Fn(u64) -> Result<u64>,
{
  if exponent == 0 {
    return Ok(1);
  }

  let mut square = if exponent < 0 { invert(base)? } else { base };
  let mut exponent = exponent.unsigned_abs();
  let mut result = 1;

  while exponent > 0 {
    if exponent & 1 == 1 {
      result = multiply(result, square);
    }
    exponent >>= 1;
    if exponent > 0 {
      square = multiply(square, square);
    }
  }

  Ok(result)
}

//// Naive discrete logarithm: keep multiplying by `alpha` until we hit `beta`.
////
//// This is `O(order)` and only sensible for small fields or as a reference. The lookup
//// tables replace it with an `O(1)` table read. Returns `None` when no power of `alpha` in
//// `[0, order-1)` equals `beta` (zero, or a non-primitive `alpha`).
pub fn discrete_log<M>(beta: u64, alpha: u64, order: u64, multiply: M) -> Option<u64>
where
  M: Fn(u64, u64) -> u64,
{
  let mut result = 1;
  for i in 0..order.saturating_sub(1) {
    if result == beta {
      return Some(i);
    }
    result = multiply(result, alpha);
  }
  None
}

//// Distinct prime factors by trial division, in increasing order. `O(sqrt(n))`.
////
//// `alpha` generates the multiplicative group exactly when `alpha^((order-1)/q) != 1` for every
//// prime `q` dividing `order - 1`.
pub fn prime_factors(mut n: u64) -> Vec<u64> {
  let mut factors = vec![];
  let mut d = 2;
  while d <= n / d {
    if n % d == 0 {
      factors.push(d);
      while n % d == 0 {
        n /= d;
      }
    }
    d += if d == 2 { 1 } else { 2 };
  }
  if n > 1 {
    factors.push(n);
  }
  factors
}
