//// #### The field context
////
//// `GF` ties a field description to a calculation strategy and an execution target, and is the
//// front door for everything else: elementwise arithmetic over slices, polynomial evaluation,
//// the linear algebra, and a few constructors for common arrays.
////
//// Lookup tables are built at most once per context. Switching to calculate mode keeps them
//// around, so switching back is free unless a rebuild is explicitly requested.
use crate::algorithm;
use crate::error::{Error, Result};
use crate::exec::Target;
use crate::field::{FieldArithmetic, FieldDescriptor};
use crate::gf_p::{CalculateArithmetic, LookupArithmetic};
use crate::gf_p_k::{self, ExtensionArithmetic};
use crate::linalg::{self, Lup, Matrix};
use crate::lut::LookupTables;
use once_cell::sync::OnceCell;
use rand::Rng;
use std::ops::Range;
use std::sync::Arc;

/// Prime fields up to this order default to lookup mode.
pub const LOOKUP_ORDER_LIMIT: u64 = 1 << 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Lookup,
    Calculate,
}

impl std::str::FromStr for Mode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Mode> {
        match s {
            "lookup" => Ok(Mode::Lookup),
            "calculate" => Ok(Mode::Calculate),
            _ => Err(Error::InvalidConfiguration(format!(
                "valid modes are ['lookup', 'calculate'], not '{}'",
                s
            ))),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Mode::Lookup => write!(f, "lookup"),
            Mode::Calculate => write!(f, "calculate"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GF {
    field: FieldDescriptor,
    mode: Mode,
    target: Target,
    tables: OnceCell<Arc<LookupTables>>,
    arith: Arc<dyn FieldArithmetic>,
}

impl GF {
    /// A context with the default configuration: lookup tables for small prime fields,
    /// calculation for everything else, sequential execution.
    pub fn new(field: FieldDescriptor) -> Result<GF> {
        let mode = if field.is_prime_field() && field.order() <= LOOKUP_ORDER_LIMIT {
            Mode::Lookup
        } else {
            Mode::Calculate
        };
        GF::with_config(field, Target::Cpu, mode)
    }

    pub fn with_config(field: FieldDescriptor, target: Target, mode: Mode) -> Result<GF> {
        let tables = OnceCell::new();
        let arith = resolve(&field, mode, &tables)?;
        log::info!("{}: mode={} target={}", field, mode, target);
        Ok(GF { field, mode, target, tables, arith })
    }

    /// Select a new target and mode. Nothing is rebuilt when the mode doesn't change, unless
    /// `rebuild` asks for fresh lookup tables. On error the context is left untouched.
    pub fn build_or_retarget(&mut self, target: Target, mode: Mode, rebuild: bool) -> Result<()> {
        if !rebuild && mode == self.mode {
            if target != self.target {
                log::info!("{}: target {} -> {}", self.field, self.target, target);
                self.target = target;
            }
            return Ok(());
        }

        let tables = if rebuild { OnceCell::new() } else { self.tables.clone() };
        if !rebuild && tables.get().is_some() && mode == Mode::Lookup {
            log::debug!("{}: reusing cached lookup tables", self.field);
        }
        let arith = resolve(&self.field, mode, &tables)?;

        log::info!(
            "{}: mode={} target={}{}",
            self.field,
            mode,
            target,
            if rebuild { " (rebuilt)" } else { "" }
        );
        self.tables = tables;
        self.arith = arith;
        self.mode = mode;
        self.target = target;
        Ok(())
    }

    pub fn field(&self) -> &FieldDescriptor {
        &self.field
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// The lookup tables, if they have been built.
    pub fn tables(&self) -> Option<&Arc<LookupTables>> {
        self.tables.get()
    }

    /// The resolved backend, for single-element arithmetic.
    pub fn arithmetic(&self) -> &dyn FieldArithmetic {
        &*self.arith
    }

    /// Check that `alpha` really generates the multiplicative group: `alpha^(order-1) = 1` and
    /// `alpha^((order-1)/q) != 1` for every prime `q` dividing `order - 1`.
    ///
    /// Factoring `order - 1` is done by trial division, so this is `O(sqrt(order))`.
    pub fn verify_primitive_element(&self) -> Result<bool> {
        let f = self.arithmetic();
        let n = self.field.order() - 1;
        let alpha = self.field.primitive_element();
        let pow = |e: u64| algorithm::power(alpha, e as i128, |x, y| f.multiply(x, y), |x| f.reciprocal(x));

        if pow(n)? != 1 {
            return Ok(false);
        }
        for q in algorithm::prime_factors(n) {
            if pow(n / q)? == 1 {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn resolve(
    field: &FieldDescriptor,
    mode: Mode,
    tables: &OnceCell<Arc<LookupTables>>,
) -> Result<Arc<dyn FieldArithmetic>> {
    match mode {
        Mode::Lookup => {
            if !field.is_prime_field() {
                return Err(Error::UnsupportedMode(format!(
                    "lookup mode is only available for prime fields, not {}",
                    field
                )));
            }
            let tables = tables.get_or_try_init(|| LookupTables::build(field).map(Arc::new))?;
            Ok(Arc::new(LookupArithmetic::new(*field, tables.clone())?))
        }
        Mode::Calculate if field.is_prime_field() => Ok(Arc::new(CalculateArithmetic::new(*field)?)),
        Mode::Calculate => Ok(Arc::new(ExtensionArithmetic::new(*field)?)),
    }
}

//// #### Elementwise arithmetic
////
//// Every input is range checked before any arithmetic happens. Binary operations take two
//// slices of the same length, or a single value on either side that's applied to every
//// element of the other. An error anywhere fails the whole call.
impl GF {
    fn check_all(&self, xs: &[u64]) -> Result<()> {
        xs.iter().try_for_each(|&x| self.field.check(x).map(drop))
    }

    pub fn add(&self, a: &[u64], b: &[u64]) -> Result<Vec<u64>> {
        self.check_all(a)?;
        self.check_all(b)?;
        let f = self.arithmetic();
        self.target.zip_map(a, b, |x, y| f.add(x, y))
    }

    pub fn subtract(&self, a: &[u64], b: &[u64]) -> Result<Vec<u64>> {
        self.check_all(a)?;
        self.check_all(b)?;
        let f = self.arithmetic();
        self.target.zip_map(a, b, |x, y| f.subtract(x, y))
    }

    pub fn multiply(&self, a: &[u64], b: &[u64]) -> Result<Vec<u64>> {
        self.check_all(a)?;
        self.check_all(b)?;
        let f = self.arithmetic();
        self.target.zip_map(a, b, |x, y| f.multiply(x, y))
    }

    pub fn divide(&self, a: &[u64], b: &[u64]) -> Result<Vec<u64>> {
        self.check_all(a)?;
        self.check_all(b)?;
        let f = self.arithmetic();
        self.target.try_zip_map(a, b, |x, y| f.divide(x, y))
    }

    pub fn negate(&self, a: &[u64]) -> Result<Vec<u64>> {
        self.check_all(a)?;
        let f = self.arithmetic();
        Ok(self.target.map(a, |x| f.negate(x)))
    }

    pub fn reciprocal(&self, a: &[u64]) -> Result<Vec<u64>> {
        self.check_all(a)?;
        let f = self.arithmetic();
        self.target.try_map(a, |x| f.reciprocal(x))
    }

    pub fn square(&self, a: &[u64]) -> Result<Vec<u64>> {
        self.check_all(a)?;
        let f = self.arithmetic();
        Ok(self.target.map(a, |x| f.square(x)))
    }

    /// Exponents are plain integers, not field elements, and may be negative.
    pub fn power(&self, a: &[u64], exponents: &[i64]) -> Result<Vec<u64>> {
        self.check_all(a)?;
        let f = self.arithmetic();
        self.target.try_zip_map(a, exponents, |x, e| f.power(x, e))
    }

    pub fn log(&self, a: &[u64]) -> Result<Vec<u64>> {
        self.check_all(a)?;
        let f = self.arithmetic();
        self.target.try_map(a, |x| f.log(x))
    }

    /// `a[i]` added to itself `n[i]` times.
    pub fn multiple_add(&self, a: &[u64], n: &[u64]) -> Result<Vec<u64>> {
        self.check_all(a)?;
        let f = self.arithmetic();
        self.target.zip_map(a, n, |x, k| f.multiple_add(x, k))
    }

    /// Evaluate the polynomial with `coeffs` (highest degree first) at every point in `x`.
    pub fn poly_eval(&self, coeffs: &[u64], x: &[u64]) -> Result<Vec<u64>> {
        self.check_all(coeffs)?;
        self.check_all(x)?;
        let f = self.arithmetic();
        Ok(self.target.map(x, |v| f.poly_eval(coeffs, v)))
    }
}

//// #### Linear algebra
impl GF {
    fn check_matrix(&self, m: &Matrix) -> Result<()> {
        self.check_all(m.data())
    }

    pub fn matmul(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        self.check_matrix(a)?;
        self.check_matrix(b)?;
        linalg::matmul(self.arithmetic(), a, b)
    }

    pub fn inner(&self, a: &[u64], b: &[u64]) -> Result<u64> {
        self.check_all(a)?;
        self.check_all(b)?;
        linalg::inner(self.arithmetic(), a, b)
    }

    pub fn outer(&self, a: &[u64], b: &[u64]) -> Result<Matrix> {
        self.check_all(a)?;
        self.check_all(b)?;
        Ok(linalg::outer(self.arithmetic(), a, b))
    }

    pub fn row_reduce(&self, m: &Matrix, ncols: Option<usize>) -> Result<Matrix> {
        self.check_matrix(m)?;
        linalg::row_reduce(self.arithmetic(), m, ncols)
    }

    pub fn lu_decompose(&self, m: &Matrix) -> Result<(Matrix, Matrix)> {
        self.check_matrix(m)?;
        linalg::lu_decompose(self.arithmetic(), m)
    }

    pub fn lup_decompose(&self, m: &Matrix) -> Result<Lup> {
        self.check_matrix(m)?;
        linalg::lup_decompose(self.arithmetic(), m)
    }

    pub fn determinant(&self, m: &Matrix) -> Result<u64> {
        self.check_matrix(m)?;
        linalg::determinant(self.arithmetic(), m)
    }

    pub fn rank(&self, m: &Matrix) -> Result<usize> {
        self.check_matrix(m)?;
        linalg::rank(self.arithmetic(), m)
    }

    pub fn inverse(&self, m: &Matrix) -> Result<Matrix> {
        self.check_matrix(m)?;
        linalg::inverse(self.arithmetic(), m)
    }

    pub fn solve(&self, a: &Matrix, b: &Matrix) -> Result<Matrix> {
        self.check_matrix(a)?;
        self.check_matrix(b)?;
        linalg::solve(self.arithmetic(), a, b)
    }
}

//// #### Constructors
impl GF {
    /// Every element of the field, `0, 1, ..., order - 1`.
    pub fn elements(&self) -> Vec<u64> {
        (0..self.field.order()).collect()
    }

    /// The elements `start, start + step, ...` below `stop`. The range must be non-empty and lie
    /// inside the field, so `start < stop <= order`.
    pub fn range(&self, start: u64, stop: u64, step: u64) -> Result<Vec<u64>> {
        let order = self.field.order();
        if start >= order {
            return Err(Error::ValueOutOfRange { value: start, order });
        }
        if stop > order {
            return Err(Error::ValueOutOfRange { value: stop, order });
        }
        if start >= stop || step == 0 {
            return Err(Error::ShapeMismatch(format!(
                "range {}..{} with step {} is empty",
                start, stop, step
            )));
        }
        let step = usize::try_from(step).unwrap_or(usize::MAX);
        Ok((start..stop).step_by(step).collect())
    }

    /// Validated construction from row-major data.
    pub fn matrix(&self, rows: usize, cols: usize, data: Vec<u64>) -> Result<Matrix> {
        self.check_all(&data)?;
        Matrix::new(rows, cols, data)
    }

    pub fn zeros(&self, rows: usize, cols: usize) -> Matrix {
        Matrix::zeros(rows, cols)
    }

    pub fn ones(&self, rows: usize, cols: usize) -> Matrix {
        let mut m = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                m[(i, j)] = 1;
            }
        }
        m
    }

    pub fn identity(&self, n: usize) -> Matrix {
        Matrix::identity(n)
    }

    /// The `m x n` Vandermonde matrix `V[i][j] = (a^i)^j`.
    pub fn vandermonde(&self, a: u64, m: usize, n: usize) -> Result<Matrix> {
        self.field.check(a)?;
        if m == 0 || n == 0 {
            return Err(Error::ShapeMismatch(format!(
                "a Vandermonde matrix needs positive dimensions, not {}x{}",
                m, n
            )));
        }
        let f = self.arithmetic();
        let mut out = Matrix::zeros(m, n);
        let mut base = 1;
        for i in 0..m {
            let mut x = 1;
            for j in 0..n {
                out[(i, j)] = x;
                x = f.multiply(x, base);
            }
            base = f.multiply(base, a);
        }
        Ok(out)
    }

    /// Uniformly random field elements.
    pub fn random_vector<R: Rng + ?Sized>(&self, rng: &mut R, len: usize) -> Vec<u64> {
        let order = self.field.order();
        (0..len).map(|_| rng.gen_range(0..order)).collect()
    }

    /// Uniformly random elements drawn from `bounds`, which must satisfy
    /// `0 <= low < high <= order`.
    pub fn random_vector_in<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        len: usize,
        bounds: Range<u64>,
    ) -> Result<Vec<u64>> {
        let order = self.field.order();
        if bounds.end > order {
            return Err(Error::ValueOutOfRange { value: bounds.end, order });
        }
        if bounds.is_empty() {
            return Err(Error::ShapeMismatch(format!(
                "random bounds {}..{} are empty",
                bounds.start, bounds.end
            )));
        }
        Ok((0..len).map(|_| rng.gen_range(bounds.clone())).collect())
    }

    pub fn random_matrix<R: Rng + ?Sized>(&self, rng: &mut R, rows: usize, cols: usize) -> Matrix {
        let order = self.field.order();
        let mut m = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                m[(i, j)] = rng.gen_range(0..order);
            }
        }
        m
    }
}

//// #### Vector representation
////
//// An element of GF(p^m) is a polynomial of degree below `m` over GF(p). Its vector form lists
//// the `m` coefficients from the highest degree down, so in GF(3^2) the element `x + 2`
//// (decimal `5`) is the vector `[1, 2]`. Prime fields have `m = 1` and each element is its own
//// one-entry vector.
impl GF {
    /// One row of `m` coefficients per element.
    pub fn vector(&self, a: &[u64]) -> Result<Matrix> {
        self.check_all(a)?;
        let p = self.field.characteristic();
        let m = self.field.degree() as usize;
        let mut out = Vec::with_capacity(a.len() * m);
        for &x in a {
            let mut digits = gf_p_k::to_digits(x, p, m);
            digits.reverse();
            out.extend(digits);
        }
        Matrix::new(a.len(), m, out)
    }

    /// The inverse of [`GF::vector`]: every row must hold `m` coefficients in GF(p).
    pub fn from_vector(&self, v: &Matrix) -> Result<Vec<u64>> {
        let p = self.field.characteristic();
        let m = self.field.degree() as usize;
        let (rows, cols) = v.shape();
        if cols != m {
            return Err(Error::ShapeMismatch(format!(
                "vectors over {} have {} coefficients, not {}",
                self.field, m, cols
            )));
        }
        if let Some(&bad) = v.data().iter().find(|&&c| c >= p) {
            return Err(Error::ValueOutOfRange { value: bad, order: p });
        }
        Ok((0..rows)
            .map(|i| {
                let mut digits = v.row(i).to_vec();
                digits.reverse();
                gf_p_k::from_digits(&digits, p)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn gf5(mode: Mode) -> GF {
        GF::with_config(FieldDescriptor::prime(5, 2).unwrap(), Target::Cpu, mode).unwrap()
    }

    fn both5() -> Vec<GF> {
        let mut par = gf5(Mode::Calculate);
        par.build_or_retarget(Target::Parallel, Mode::Calculate, false).unwrap();
        vec![gf5(Mode::Lookup), gf5(Mode::Calculate), par]
    }

    // TEST: The default configuration
    #[test]
    fn test_default_mode() {
        let gf = GF::new(FieldDescriptor::prime(7, 3).unwrap()).unwrap();
        assert_eq!(gf.mode(), Mode::Lookup);
        assert_eq!(gf.target(), Target::Cpu);
        assert!(gf.tables().is_some());

        // Largest prime below 2^31, generator 7
        let big = GF::new(FieldDescriptor::prime(2147483647, 7).unwrap()).unwrap();
        assert_eq!(big.mode(), Mode::Calculate);
        assert!(big.tables().is_none());

        let gf9 = GF::new(FieldDescriptor::extension(3, 2, 10, 4).unwrap()).unwrap();
        assert_eq!(gf9.mode(), Mode::Calculate);
        assert_eq!(gf9.multiply(&[3], &[3]), Ok(vec![2]));
    }

    // TEST: Parsing modes
    #[test]
    fn test_parse_mode() {
        assert_eq!("lookup".parse::<Mode>(), Ok(Mode::Lookup));
        assert_eq!("calculate".parse::<Mode>(), Ok(Mode::Calculate));
        assert!(matches!("python-calculate".parse::<Mode>(), Err(Error::InvalidConfiguration(_))));
        assert_eq!(Mode::Calculate.to_string(), "calculate");
    }

    // TEST: Configurations that can't work
    #[test]
    fn test_invalid_config() {
        let gf9 = FieldDescriptor::extension(3, 2, 10, 4).unwrap();
        assert!(matches!(
            GF::with_config(gf9, Target::Cpu, Mode::Lookup),
            Err(Error::UnsupportedMode(_))
        ));

        // 2 is not primitive in GF(7), the table build catches it
        let bad = FieldDescriptor::prime(7, 2).unwrap();
        assert!(matches!(
            GF::with_config(bad, Target::Cpu, Mode::Lookup),
            Err(Error::InvalidFieldParameters(_))
        ));

        // 2^61 - 1 is far too big to tabulate, asking for lookup mode is refused
        let huge = FieldDescriptor::prime(2305843009213693951, 37).unwrap();
        assert_eq!(
            GF::with_config(huge, Target::Cpu, Mode::Lookup).map(|_| ()),
            Err(Error::TableTooLarge(2305843009213693951))
        );
        let mut calc = GF::with_config(huge, Target::Cpu, Mode::Calculate).unwrap();
        assert_eq!(
            calc.build_or_retarget(Target::Cpu, Mode::Lookup, false),
            Err(Error::TableTooLarge(2305843009213693951))
        );
        assert_eq!(calc.mode(), Mode::Calculate);

        // x^2 over GF(2) is reducible, x has no inverse
        let reducible = GF::new(FieldDescriptor::extension(2, 2, 4, 2).unwrap()).unwrap();
        assert!(matches!(reducible.reciprocal(&[1, 2]), Err(Error::InvalidFieldParameters(_))));

        // A failed retarget leaves the context as it was
        let mut gf = GF::with_config(bad, Target::Cpu, Mode::Calculate).unwrap();
        assert!(gf.build_or_retarget(Target::Parallel, Mode::Lookup, false).is_err());
        assert_eq!(gf.mode(), Mode::Calculate);
        assert_eq!(gf.target(), Target::Cpu);
        assert_eq!(gf.add(&[3], &[6]), Ok(vec![2]));
    }

    // TEST: Lookup tables are cached across retargeting and rebuilt on request
    #[test]
    fn test_retarget_caching() {
        let mut gf = gf5(Mode::Lookup);
        let first = gf.tables().unwrap().clone();

        gf.build_or_retarget(Target::Parallel, Mode::Lookup, false).unwrap();
        assert_eq!(gf.target(), Target::Parallel);
        assert!(Arc::ptr_eq(&first, gf.tables().unwrap()));

        gf.build_or_retarget(Target::Cpu, Mode::Calculate, false).unwrap();
        assert_eq!(gf.mode(), Mode::Calculate);
        assert!(Arc::ptr_eq(&first, gf.tables().unwrap()));

        gf.build_or_retarget(Target::Cpu, Mode::Lookup, false).unwrap();
        assert!(Arc::ptr_eq(&first, gf.tables().unwrap()));

        gf.build_or_retarget(Target::Cpu, Mode::Lookup, true).unwrap();
        let rebuilt = gf.tables().unwrap();
        assert!(!Arc::ptr_eq(&first, rebuilt));
        assert_eq!(first.exp_table(), rebuilt.exp_table());

        // Clones share the tables
        let copy = gf.clone();
        assert!(Arc::ptr_eq(copy.tables().unwrap(), gf.tables().unwrap()));
    }

    // TEST: Elementwise arithmetic in GF(5), in every configuration
    #[test]
    fn test_elementwise() {
        for gf in both5() {
            // GF(5) | 1 + 4 = 0, 2 + 4 = 1, 3 + 4 = 2
            assert_eq!(gf.add(&[1, 2, 3], &[4]), Ok(vec![0, 1, 2]));
            // GF(5) | 1 - 3 = 3
            assert_eq!(gf.subtract(&[1, 4], &[3, 3]), Ok(vec![3, 1]));
            // GF(5) | 3 * 4 = 2
            assert_eq!(gf.multiply(&[3], &[4, 0, 1]), Ok(vec![2, 0, 4]));
            // GF(5) | 4 / 3 = 3
            assert_eq!(gf.divide(&[4, 0], &[3]), Ok(vec![3, 0]));
            assert_eq!(gf.negate(&[0, 1, 2, 3, 4]), Ok(vec![0, 4, 3, 2, 1]));
            assert_eq!(gf.reciprocal(&[1, 2, 3, 4]), Ok(vec![1, 3, 2, 4]));
            assert_eq!(gf.square(&[2, 3, 4]), Ok(vec![4, 4, 1]));
            // GF(5) | 2^3 = 3, 2^-1 = 3, 0^0 = 1
            assert_eq!(gf.power(&[2], &[3, -1]), Ok(vec![3, 3]));
            assert_eq!(gf.power(&[0], &[0]), Ok(vec![1]));
            // Powers of 2: 1, 2, 4, 3
            assert_eq!(gf.log(&[1, 2, 4, 3]), Ok(vec![0, 1, 2, 3]));
            // GF(5) | 3 + 3 + 3 + 3 = 2
            assert_eq!(gf.multiple_add(&[3], &[4, 0, 5]), Ok(vec![2, 0, 0]));
        }
    }

    // TEST: Failures fail the whole call
    #[test]
    fn test_elementwise_errors() {
        for gf in both5() {
            assert_eq!(gf.add(&[1, 5], &[1]), Err(Error::ValueOutOfRange { value: 5, order: 5 }));
            assert_eq!(gf.divide(&[1, 2], &[1, 0]), Err(Error::DivisionByZero));
            assert_eq!(gf.reciprocal(&[0]), Err(Error::DivisionByZero));
            assert_eq!(gf.power(&[0], &[-1]), Err(Error::DivisionByZero));
            assert_eq!(gf.log(&[1, 0]), Err(Error::LogOfZero));
            assert!(matches!(gf.add(&[1, 2], &[1, 2, 3]), Err(Error::ShapeMismatch(_))));
        }
    }

    // TEST: Polynomial evaluation
    #[test]
    fn test_poly_eval() {
        for mode in [Mode::Lookup, Mode::Calculate] {
            let gf = GF::with_config(FieldDescriptor::prime(31, 3).unwrap(), Target::Parallel, mode).unwrap();
            // 3x^3 + 7x + 12
            assert_eq!(gf.poly_eval(&[3, 0, 7, 12], &[0, 1, 2, 5, 30]), Ok(vec![12, 22, 19, 19, 2]));
            assert_eq!(gf.poly_eval(&[], &[4]), Ok(vec![0]));
            assert_eq!(gf.poly_eval(&[9], &[4, 5]), Ok(vec![9, 9]));
            assert!(gf.poly_eval(&[31], &[1]).is_err());
        }
    }

    // TEST: Primitive element verification
    #[test]
    fn test_verify_primitive_element() {
        let gf7 = GF::new(FieldDescriptor::prime(7, 3).unwrap()).unwrap();
        assert_eq!(gf7.verify_primitive_element(), Ok(true));

        // 2 has order 3 in GF(7)
        let bad = GF::with_config(FieldDescriptor::prime(7, 2).unwrap(), Target::Cpu, Mode::Calculate).unwrap();
        assert_eq!(bad.verify_primitive_element(), Ok(false));

        let gf9 = GF::new(FieldDescriptor::extension(3, 2, 10, 4).unwrap()).unwrap();
        assert_eq!(gf9.verify_primitive_element(), Ok(true));
        // x has order 4 in GF(3^2) mod x^2 + 1
        let gf9x = GF::new(FieldDescriptor::extension(3, 2, 10, 3).unwrap()).unwrap();
        assert_eq!(gf9x.verify_primitive_element(), Ok(false));
    }

    // TEST: Linear algebra goes through the selected backend
    #[test]
    fn test_linalg() {
        for gf in both5() {
            let M = gf.matrix(4, 4, vec![1, 3, 2, 0, 3, 4, 2, 3, 0, 2, 1, 4, 4, 3, 3, 1]).unwrap();
            assert_eq!(gf.determinant(&M), Ok(4));
            assert_eq!(gf.rank(&M), Ok(4));
            assert_eq!(gf.lu_decompose(&M), Err(Error::NoLuDecomposition));
            assert_eq!(gf.lup_decompose(&M).unwrap().swaps(), 1);

            let inv = gf.inverse(&M).unwrap();
            assert_eq!(gf.matmul(&M, &inv), Ok(gf.identity(4)));
            assert_eq!(gf.row_reduce(&M, None), Ok(gf.identity(4)));

            let b = gf.matrix(4, 1, vec![3, 4, 3, 3]).unwrap();
            assert_eq!(gf.solve(&M, &b), Matrix::new(4, 1, vec![1, 2, 3, 4]));

            assert_eq!(gf.inner(&[1, 2, 3], &[4, 3, 2]), Ok(1));
            assert_eq!(gf.outer(&[1, 2], &[3, 4]), Matrix::new(2, 2, vec![3, 4, 1, 3]));
        }
    }

    // TEST: Out of range entries are caught before any elimination
    #[test]
    fn test_linalg_range_check() {
        let gf = gf5(Mode::Lookup);
        assert_eq!(gf.matrix(1, 2, vec![1, 7]), Err(Error::ValueOutOfRange { value: 7, order: 5 }));
        let bad = Matrix::new(2, 2, vec![1, 2, 3, 9]).unwrap();
        assert_eq!(gf.determinant(&bad), Err(Error::ValueOutOfRange { value: 9, order: 5 }));
        assert_eq!(gf.inverse(&bad), Err(Error::ValueOutOfRange { value: 9, order: 5 }));
    }

    // TEST: Constructors
    #[test]
    fn test_constructors() {
        let gf = GF::new(FieldDescriptor::prime(7, 3).unwrap()).unwrap();
        assert_eq!(gf.elements(), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(gf.range(2, 5, 1), Ok(vec![2, 3, 4]));
        assert_eq!(gf.range(5, 7, 1), Ok(vec![5, 6]));
        assert_eq!(gf.range(0, 7, 3), Ok(vec![0, 3, 6]));
        assert_eq!(gf.range(1, 7, 10), Ok(vec![1]));
        assert_eq!(gf.range(5, 8, 1), Err(Error::ValueOutOfRange { value: 8, order: 7 }));
        assert_eq!(gf.range(7, 7, 1), Err(Error::ValueOutOfRange { value: 7, order: 7 }));
        assert!(matches!(gf.range(5, 2, 1), Err(Error::ShapeMismatch(_))));
        assert!(matches!(gf.range(3, 3, 1), Err(Error::ShapeMismatch(_))));
        assert!(matches!(gf.range(0, 7, 0), Err(Error::ShapeMismatch(_))));
        assert_eq!(gf.zeros(2, 3).shape(), (2, 3));
        assert_eq!(gf.ones(2, 2), Matrix::new(2, 2, vec![1, 1, 1, 1]).unwrap());
        assert_eq!(gf.ones(0, 4).shape(), (0, 4));

        // Rows are powers of 1, 3, 3^2 = 2
        assert_eq!(
            gf.vandermonde(3, 3, 4),
            Matrix::new(3, 4, vec![1, 1, 1, 1, 1, 3, 2, 6, 1, 2, 4, 1])
        );
        assert!(matches!(gf.vandermonde(3, 0, 4), Err(Error::ShapeMismatch(_))));
        assert!(gf.vandermonde(7, 2, 2).is_err());
    }

    // TEST: Random arrays stay in the field
    #[test]
    fn test_random() {
        let gf = GF::new(FieldDescriptor::prime(31, 3).unwrap()).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let v = gf.random_vector(&mut rng, 1000);
        assert_eq!(v.len(), 1000);
        assert!(v.iter().all(|&x| x < 31));

        let m = gf.random_matrix(&mut rng, 5, 6);
        assert_eq!(m.shape(), (5, 6));
        assert!(m.data().iter().all(|&x| x < 31));

        let mut again = StdRng::seed_from_u64(7);
        assert_eq!(gf.random_vector(&mut again, 1000), v);

        let bounded = gf.random_vector_in(&mut rng, 1000, 10..12).unwrap();
        assert!(bounded.iter().all(|&x| x == 10 || x == 11));
        assert!(bounded.contains(&10) && bounded.contains(&11));
        assert_eq!(gf.random_vector_in(&mut rng, 3, 30..31), Ok(vec![30, 30, 30]));
        assert_eq!(
            gf.random_vector_in(&mut rng, 3, 0..32),
            Err(Error::ValueOutOfRange { value: 32, order: 31 })
        );
        assert!(matches!(gf.random_vector_in(&mut rng, 3, 5..5), Err(Error::ShapeMismatch(_))));
    }

    // TEST: GF(3^2) elements as coefficient vectors
    #[test]
    fn test_vector() {
        let gf9 = GF::new(FieldDescriptor::extension(3, 2, 10, 4).unwrap()).unwrap();
        // 5 = x + 2, 7 = 2x + 1, 3 = x
        let v = gf9.vector(&[5, 7, 3, 0]).unwrap();
        assert_eq!(v, Matrix::new(4, 2, vec![1, 2, 2, 1, 1, 0, 0, 0]).unwrap());
        assert_eq!(gf9.from_vector(&v), Ok(vec![5, 7, 3, 0]));

        let all = gf9.elements();
        assert_eq!(gf9.from_vector(&gf9.vector(&all).unwrap()), Ok(all));

        assert_eq!(gf9.vector(&[9]), Err(Error::ValueOutOfRange { value: 9, order: 9 }));
        let wide = Matrix::new(1, 3, vec![0, 1, 2]).unwrap();
        assert!(matches!(gf9.from_vector(&wide), Err(Error::ShapeMismatch(_))));
        let bad_digit = Matrix::new(1, 2, vec![1, 3]).unwrap();
        assert_eq!(gf9.from_vector(&bad_digit), Err(Error::ValueOutOfRange { value: 3, order: 3 }));

        // GF(2^8): 0x83 = x^7 + x + 1
        let gf256 = GF::new(FieldDescriptor::extension(2, 8, 283, 3).unwrap()).unwrap();
        assert_eq!(gf256.vector(&[0x83]).unwrap().data(), &[1, 0, 0, 0, 0, 0, 1, 1]);

        // Prime fields are one coefficient wide
        let gf7 = GF::new(FieldDescriptor::prime(7, 3).unwrap()).unwrap();
        assert_eq!(gf7.vector(&[4, 6]), Matrix::new(2, 1, vec![4, 6]));
    }
}
