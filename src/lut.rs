//// #### Lookup tables for GF(p)
////
//// Every non-zero element of a field is a power of the primitive element `alpha`. If we write
//// down all the powers once (`EXP`) and invert that mapping (`LOG`), multiplication becomes
//// addition of exponents:
////
//// ```text
//// a * b = alpha^(LOG[a] + LOG[b]) = EXP[LOG[a] + LOG[b]]
//// ```
////
//// The Zech logarithm table does the same trick for addition:
////
//// ```text
//// ZECH_LOG[i] = LOG[1 + alpha^i]
//// alpha^m + alpha^n = alpha^m * (1 + alpha^(n-m)) = alpha^(m + ZECH_LOG[n-m])
//// ```
use crate::error::{Error, Result};
use crate::field::FieldDescriptor;
use std::collections::HashSet;

/// The largest field order lookup tables are built for. Four tables of this many `u64` entries
/// (EXP counts twice) come to 128 MiB.
pub const MAX_TABLE_ORDER: u64 = 1 << 22;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTables {
    order: u64,
    exp: Vec<u64>,      // EXP[0..2*order), doubled so EXP[LOG[a] + LOG[b]] never wraps
    log: Vec<u64>,      // LOG[0..order), LOG[0] is meaningless
    zech_log: Vec<u64>, // ZECH_LOG[0..order)
}

impl LookupTables {
    /// Build the tables for a prime field.
    ///
    /// Fails with `InvalidFieldParameters` when the primitive element doesn't generate the whole
    /// multiplicative group, and with `TableTooLarge` when the order exceeds [`MAX_TABLE_ORDER`]
    /// or the tables can't be allocated.
    pub fn build(field: &FieldDescriptor) -> Result<LookupTables> {
        if !field.is_prime_field() {
            return Err(Error::UnsupportedMode(format!(
                "lookup tables are only built for prime fields, not {}",
                field
            )));
        }

        let order = field.order();
        let alpha = field.primitive_element();
        if order > MAX_TABLE_ORDER {
            return Err(Error::TableTooLarge(order));
        }
        let n = usize::try_from(order).map_err(|_| Error::TableTooLarge(order))?;

        log::debug!("building EXP/LOG/ZECH_LOG tables for {} ({} entries each)", field, n);

        let mut exp = zeroed(2 * n, order)?;
        let mut log = zeroed(n, order)?;
        let mut zech_log = zeroed(n, order)?;

        // Walk the powers of alpha: EXP[i] = alpha^i
        exp[0] = 1;
        for i in 1..n {
            exp[i] = ((exp[i - 1] as u128 * alpha as u128) % order as u128) as u64;

            // EXP[order-1] wraps back around to EXP[0], so don't let it overwrite LOG[1]
            if i < n - 1 {
                log[exp[i] as usize] = i as u64;
            }
        }

        // ZECH_LOG[i] = LOG[1 + alpha^i]
        for i in 0..n {
            let one_plus = ((exp[i] as u128 + 1) % order as u128) as usize;
            zech_log[i] = log[one_plus];
        }

        // A generator has multiplicative order exactly `order - 1`
        if exp[n - 1] != 1 {
            return Err(Error::InvalidFieldParameters(format!(
                "primitive element alpha = {} does not have multiplicative order {} and therefore isn't a multiplicative generator for {}",
                alpha,
                order - 1,
                field
            )));
        }
        let distinct_exp: HashSet<u64> = exp[0..n - 1].iter().copied().collect();
        if distinct_exp.len() != n - 1 {
            return Err(Error::InvalidFieldParameters(format!(
                "the EXP table for alpha = {} over {} is not unique",
                alpha, field
            )));
        }
        let distinct_log: HashSet<u64> = log[1..n].iter().copied().collect();
        if distinct_log.len() != n - 1 {
            return Err(Error::InvalidFieldParameters(format!(
                "the LOG table for alpha = {} over {} is not unique",
                alpha, field
            )));
        }

        // Double the EXP table so multiplication never needs `% (order - 1)` on the index
        exp.copy_within(1..n, n);
        exp[2 * n - 1] = exp[n];

        Ok(LookupTables {
            order,
            exp,
            log,
            zech_log,
        })
    }

    pub fn order(&self) -> u64 {
        self.order
    }

    /// `alpha^i` for `i < 2*order`.
    #[inline]
    pub fn exp(&self, i: u64) -> u64 {
        self.exp[i as usize]
    }

    /// `log_alpha(x)` for non-zero `x`.
    #[inline]
    pub fn log(&self, x: u64) -> u64 {
        self.log[x as usize]
    }

    /// `log_alpha(1 + alpha^i)`. Only meaningful when `1 + alpha^i != 0`.
    #[inline]
    pub fn zech_log(&self, i: u64) -> u64 {
        self.zech_log[i as usize]
    }

    pub fn exp_table(&self) -> &[u64] {
        &self.exp
    }

    pub fn log_table(&self) -> &[u64] {
        &self.log
    }

    pub fn zech_log_table(&self) -> &[u64] {
        &self.zech_log
    }
}

fn zeroed(len: usize, order: u64) -> Result<Vec<u64>> {
    let mut table = Vec::new();
    table.try_reserve_exact(len).map_err(|_| Error::TableTooLarge(order))?;
    table.resize(len, 0);
    Ok(table)
}
