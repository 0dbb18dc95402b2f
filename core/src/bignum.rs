//! Arbitrary-precision decimal scalar: integer mantissa times a power of ten.
//!
//! Save files carry quantities (hero souls, titan damage, ascension rewards)
//! that outgrow every fixed-width numeric type, so the whole core speaks
//! `BigNumber` wherever a value is unbounded. Representations are not kept
//! normalized; comparison and formatting are correct for any equivalent
//! (mantissa, exponent) pair, and zero canonicalizes its exponent to 0 at
//! construction time.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::float::FloatCore;
use num_traits::{Pow, Zero};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Significant digits produced by the `/` operator. Ratio and scaling math
/// in the optimizer never needs more; call `div_to_precision` to choose.
pub const DIV_PRECISION: usize = 30;

/// Largest exponent magnitude `parse` accepts. Real saves sit orders of
/// magnitude below this; letting arbitrary exponents through would turn a
/// short hostile literal into gigabytes of mantissa alignment downstream.
pub const MAX_PARSE_EXPONENT: i64 = 9_999_999;

#[derive(Debug, Clone, Default)]
pub struct BigNumber {
    mantissa: BigInt,
    exponent: i64,
}

impl BigNumber {
    pub fn new(mantissa: impl Into<BigInt>, exponent: i64) -> Self {
        let mantissa = mantissa.into();
        let exponent = if mantissa.is_zero() { 0 } else { exponent };
        BigNumber { mantissa, exponent }
    }

    pub fn zero() -> Self {
        BigNumber::default()
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    pub fn signum(&self) -> i32 {
        match self.mantissa.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        }
    }

    /// Append one decimal digit to the mantissa: `m := m * 10 + digit`.
    /// The primitive behind digit-string construction.
    pub fn push_digit(&mut self, digit: u32) {
        debug_assert!(digit < 10, "push_digit takes a single decimal digit");
        self.mantissa = &self.mantissa * 10u32 + digit;
    }

    /// Exact conversion from a finite float. `None` for NaN or infinity.
    ///
    /// Every finite f64 is `m * 2^k` for integers m, k; the decimal form is
    /// exact (`m * 5^-k * 10^k` when k is negative). Trailing zero factors
    /// are stripped so round numbers come out in their short form.
    pub fn from_f64(value: f64) -> Option<Self> {
        if value.is_nan() || value.is_infinite() {
            return None;
        }
        if value == 0.0 {
            return Some(BigNumber::zero());
        }
        let (m, k, sign) = FloatCore::integer_decode(value);
        let mut mantissa;
        let mut exponent;
        if k >= 0 {
            mantissa = BigInt::from(m) << (k as usize);
            exponent = 0i64;
        } else {
            let shift = (-k) as u64;
            mantissa = BigInt::from(m) * Pow::pow(BigInt::from(5u32), shift);
            exponent = k as i64;
        }
        let ten = BigInt::from(10u32);
        while !mantissa.is_zero() && (&mantissa % &ten).is_zero() {
            mantissa /= &ten;
            exponent += 1;
        }
        if sign < 0 {
            mantissa = -mantissa;
        }
        Some(BigNumber::new(mantissa, exponent))
    }

    /// Parse a decimal literal: optional sign, digits with an optional
    /// point, optional `e`/`E` exponent. `None` on anything else, and on
    /// exponents past [`MAX_PARSE_EXPONENT`]: parsed text is untrusted.
    ///
    /// The mantissa is accumulated in 9-digit chunks, so a ten-thousand
    /// digit literal costs O(n) small big-integer multiplies.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (negative, rest) = match text.as_bytes().first()? {
            b'-' => (true, &text[1..]),
            b'+' => (false, &text[1..]),
            _ => (false, text),
        };

        let (digits_part, exp_part) = match rest.find(['e', 'E']) {
            Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
            None => (rest, None),
        };

        let mut mantissa = BigInt::zero();
        let mut frac_digits: i64 = 0;
        let mut seen_digit = false;
        let mut seen_point = false;
        let mut chunk: u32 = 0;
        let mut chunk_len: u32 = 0;
        for b in digits_part.bytes() {
            match b {
                b'0'..=b'9' => {
                    seen_digit = true;
                    chunk = chunk * 10 + u32::from(b - b'0');
                    chunk_len += 1;
                    if seen_point {
                        frac_digits += 1;
                    }
                    if chunk_len == 9 {
                        mantissa = mantissa * 1_000_000_000u32 + chunk;
                        chunk = 0;
                        chunk_len = 0;
                    }
                }
                b'.' if !seen_point => seen_point = true,
                _ => return None,
            }
        }
        if chunk_len > 0 {
            mantissa = mantissa * 10u32.pow(chunk_len) + chunk;
        }
        if !seen_digit {
            return None;
        }

        let explicit_exp: i64 = match exp_part {
            Some(e) if !e.is_empty() => e.parse().ok()?,
            Some(_) => return None,
            None => 0,
        };
        let exponent = explicit_exp.checked_sub(frac_digits)?;
        if !(-MAX_PARSE_EXPONENT..=MAX_PARSE_EXPONENT).contains(&exponent) {
            return None;
        }
        if negative {
            mantissa = -mantissa;
        }
        Some(BigNumber::new(mantissa, exponent))
    }

    /// 10 raised to a real exponent, carried to ~15 significant digits.
    /// Used where a log-space computation leaves the native float range.
    pub fn exp10(log10: f64) -> BigNumber {
        if log10 == f64::NEG_INFINITY {
            return BigNumber::zero();
        }
        let whole = log10.floor();
        let lead = 10f64.powf(log10 - whole);
        let scaled = (lead * 1e14).round() as u64;
        BigNumber::new(BigInt::from(scaled), whole as i64 - 14)
    }

    /// Decimal digits in |mantissa|.
    fn digit_count(&self) -> u64 {
        self.mantissa.magnitude().to_str_radix(10).len() as u64
    }

    /// log10 of the magnitude, as a float approximation.
    /// Negative infinity for zero.
    pub fn log10_abs(&self) -> f64 {
        if self.is_zero() {
            return f64::NEG_INFINITY;
        }
        let digits = self.mantissa.magnitude().to_str_radix(10);
        let lead_len = digits.len().min(17);
        let lead: f64 = digits[..lead_len].parse().unwrap_or(1.0);
        lead.log10() + (digits.len() - lead_len) as f64 + self.exponent as f64
    }

    /// Nearest f64, saturating to infinity past the float range.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        let digits = self.mantissa.magnitude().to_str_radix(10);
        let lead_len = digits.len().min(17);
        let lead: f64 = digits[..lead_len].parse().unwrap_or(0.0);
        let rest = ((digits.len() - lead_len) as i64).saturating_add(self.exponent);
        let rest = rest.clamp(-100_000, 100_000) as i32;
        let magnitude = lead * 10f64.powi(rest);
        if self.signum() < 0 {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Whether the magnitude fits the native float range. The switch the
    /// optimizer uses to leave its float fast path.
    pub fn fits_f64(&self) -> bool {
        match BigNumber::from_f64(f64::MAX) {
            Some(max) => self.cmp_magnitude(&max) != Ordering::Greater,
            None => false,
        }
    }

    /// Total ordering against a float, exact even at the extremes of the
    /// float range. `None` only for NaN.
    pub fn cmp_f64(&self, other: f64) -> Option<Ordering> {
        if other.is_nan() {
            return None;
        }
        if other == f64::INFINITY {
            return Some(Ordering::Less);
        }
        if other == f64::NEG_INFINITY {
            return Some(Ordering::Greater);
        }
        BigNumber::from_f64(other).map(|rhs| self.cmp(&rhs))
    }

    /// Compare magnitudes, ignoring signs, across denormalized forms.
    fn cmp_magnitude(&self, other: &BigNumber) -> Ordering {
        match (self.is_zero(), other.is_zero()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        // Position of the most significant digit decides unless equal.
        // Saturating keeps exponents at the i64 rim ordered; a saturated
        // tie falls through to the exact alignment below.
        let place_a = (self.digit_count() as i64).saturating_add(self.exponent);
        let place_b = (other.digit_count() as i64).saturating_add(other.exponent);
        if place_a != place_b {
            return place_a.cmp(&place_b);
        }
        // Equal leading place bounds the exponent gap by the digit counts,
        // so aligning mantissas stays proportional to the operand sizes.
        let mag_a = self.mantissa.magnitude();
        let mag_b = other.mantissa.magnitude();
        match self.exponent.cmp(&other.exponent) {
            Ordering::Equal => mag_a.cmp(mag_b),
            Ordering::Greater => {
                let shift = (self.exponent - other.exponent) as u64;
                (mag_a * pow10(shift)).cmp(mag_b)
            }
            Ordering::Less => {
                let shift = (other.exponent - self.exponent) as u64;
                mag_a.cmp(&(mag_b * pow10(shift)))
            }
        }
    }

    /// Quotient carried to `sig_digits` significant digits, truncated
    /// toward zero. Panics on a zero divisor; that is a caller bug, the
    /// save pipeline never divides by data it has not checked.
    pub fn div_to_precision(&self, rhs: &BigNumber, sig_digits: usize) -> BigNumber {
        assert!(!rhs.is_zero(), "BigNumber division by zero");
        if self.is_zero() {
            return BigNumber::zero();
        }
        let shift =
            sig_digits as i64 + rhs.digit_count() as i64 - self.digit_count() as i64 + 1;
        let (num, den) = if shift >= 0 {
            (&self.mantissa * int_pow10(shift as u64), rhs.mantissa.clone())
        } else {
            (self.mantissa.clone(), &rhs.mantissa * int_pow10((-shift) as u64))
        };
        BigNumber::new(num / den, self.exponent - rhs.exponent - shift)
    }

    /// Mantissas aligned to the smaller exponent, for add/sub/cmp.
    fn aligned(&self, other: &BigNumber) -> (BigInt, BigInt, i64) {
        match self.exponent.cmp(&other.exponent) {
            Ordering::Equal => (self.mantissa.clone(), other.mantissa.clone(), self.exponent),
            Ordering::Greater => {
                let shift = (self.exponent - other.exponent) as u64;
                (
                    &self.mantissa * int_pow10(shift),
                    other.mantissa.clone(),
                    other.exponent,
                )
            }
            Ordering::Less => {
                let shift = (other.exponent - self.exponent) as u64;
                (
                    self.mantissa.clone(),
                    &other.mantissa * int_pow10(shift),
                    self.exponent,
                )
            }
        }
    }

    fn fmt_scientific(&self, f: &mut fmt::Formatter<'_>, e_char: char) -> fmt::Result {
        let precision = f.precision().unwrap_or(6);
        if self.is_zero() {
            let mut out = String::from("0");
            if precision > 0 {
                out.push('.');
                out.push_str(&"0".repeat(precision));
            }
            return write!(f, "{out}{e_char}+000");
        }
        let digits = self.mantissa.magnitude().to_str_radix(10);
        let (rounded, carry) = round_digits(&digits, precision + 1);
        let exp10 = (digits.len() as i64 - 1)
            .saturating_add(self.exponent)
            .saturating_add(carry);
        let sign = if self.signum() < 0 { "-" } else { "" };
        let (head, frac) = rounded.split_at(1);
        let exp_sign = if exp10 < 0 { '-' } else { '+' };
        if precision > 0 {
            write!(
                f,
                "{sign}{head}.{frac}{e_char}{exp_sign}{:03}",
                exp10.unsigned_abs()
            )
        } else {
            write!(f, "{sign}{head}{e_char}{exp_sign}{:03}", exp10.unsigned_abs())
        }
    }
}

/// Round a digit string to `keep` digits, half away from zero. Returns the
/// digits and the exponent bump when the carry overflows the width.
fn round_digits(digits: &str, keep: usize) -> (String, i64) {
    if digits.len() <= keep {
        let mut out = String::with_capacity(keep);
        out.push_str(digits);
        out.push_str(&"0".repeat(keep - digits.len()));
        return (out, 0);
    }
    let mut out: Vec<char> = digits[..keep].chars().collect();
    if digits.as_bytes()[keep] >= b'5' {
        let mut i = keep;
        loop {
            if i == 0 {
                // 99..9 rounded up: becomes 10..0 one place higher.
                out.pop();
                out.insert(0, '1');
                return (out.into_iter().collect(), 1);
            }
            i -= 1;
            if out[i] == '9' {
                out[i] = '0';
            } else {
                out[i] = char::from(out[i] as u8 + 1);
                break;
            }
        }
    }
    (out.into_iter().collect(), 0)
}

fn pow10(exp: u64) -> BigUint {
    Pow::pow(BigUint::from(10u32), exp)
}

fn int_pow10(exp: u64) -> BigInt {
    Pow::pow(BigInt::from(10u32), exp)
}

// ── Comparison ─────────────────────────────────────────────

impl PartialEq for BigNumber {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BigNumber {}

impl PartialOrd for BigNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        let sign = self.signum().cmp(&other.signum());
        if sign != Ordering::Equal {
            return sign;
        }
        match self.signum() {
            0 => Ordering::Equal,
            s if s > 0 => self.cmp_magnitude(other),
            _ => other.cmp_magnitude(self),
        }
    }
}

impl PartialEq<f64> for BigNumber {
    fn eq(&self, other: &f64) -> bool {
        self.cmp_f64(*other) == Some(Ordering::Equal)
    }
}

impl PartialOrd<f64> for BigNumber {
    fn partial_cmp(&self, other: &f64) -> Option<Ordering> {
        self.cmp_f64(*other)
    }
}

// ── Arithmetic ─────────────────────────────────────────────

impl Add<&BigNumber> for &BigNumber {
    type Output = BigNumber;

    fn add(self, rhs: &BigNumber) -> BigNumber {
        let (a, b, exponent) = self.aligned(rhs);
        BigNumber::new(a + b, exponent)
    }
}

impl Sub<&BigNumber> for &BigNumber {
    type Output = BigNumber;

    fn sub(self, rhs: &BigNumber) -> BigNumber {
        let (a, b, exponent) = self.aligned(rhs);
        BigNumber::new(a - b, exponent)
    }
}

impl Mul<&BigNumber> for &BigNumber {
    type Output = BigNumber;

    fn mul(self, rhs: &BigNumber) -> BigNumber {
        BigNumber::new(&self.mantissa * &rhs.mantissa, self.exponent + rhs.exponent)
    }
}

impl Div<&BigNumber> for &BigNumber {
    type Output = BigNumber;

    /// `/` keeps [`DIV_PRECISION`] significant digits.
    fn div(self, rhs: &BigNumber) -> BigNumber {
        self.div_to_precision(rhs, DIV_PRECISION)
    }
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident) => {
        impl $trait<BigNumber> for BigNumber {
            type Output = BigNumber;
            fn $method(self, rhs: BigNumber) -> BigNumber {
                (&self).$method(&rhs)
            }
        }
        impl $trait<&BigNumber> for BigNumber {
            type Output = BigNumber;
            fn $method(self, rhs: &BigNumber) -> BigNumber {
                (&self).$method(rhs)
            }
        }
        impl $trait<BigNumber> for &BigNumber {
            type Output = BigNumber;
            fn $method(self, rhs: BigNumber) -> BigNumber {
                self.$method(&rhs)
            }
        }
    };
}

forward_binop!(Add, add);
forward_binop!(Sub, sub);
forward_binop!(Mul, mul);
forward_binop!(Div, div);

impl AddAssign<&BigNumber> for BigNumber {
    fn add_assign(&mut self, rhs: &BigNumber) {
        if self.exponent == rhs.exponent {
            self.mantissa += &rhs.mantissa;
            if self.mantissa.is_zero() {
                self.exponent = 0;
            }
        } else {
            *self = &*self + rhs;
        }
    }
}

impl AddAssign<BigNumber> for BigNumber {
    fn add_assign(&mut self, rhs: BigNumber) {
        *self += &rhs;
    }
}

impl SubAssign<&BigNumber> for BigNumber {
    fn sub_assign(&mut self, rhs: &BigNumber) {
        *self = &*self - rhs;
    }
}

impl SubAssign<BigNumber> for BigNumber {
    fn sub_assign(&mut self, rhs: BigNumber) {
        *self -= &rhs;
    }
}

impl Neg for &BigNumber {
    type Output = BigNumber;

    fn neg(self) -> BigNumber {
        BigNumber {
            mantissa: -&self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl Neg for BigNumber {
    type Output = BigNumber;

    fn neg(self) -> BigNumber {
        BigNumber {
            mantissa: -self.mantissa,
            exponent: self.exponent,
        }
    }
}

impl From<i64> for BigNumber {
    fn from(value: i64) -> Self {
        BigNumber::new(value, 0)
    }
}

impl From<u64> for BigNumber {
    fn from(value: u64) -> Self {
        BigNumber::new(BigInt::from(value), 0)
    }
}

impl From<i32> for BigNumber {
    fn from(value: i32) -> Self {
        BigNumber::new(value, 0)
    }
}

impl From<u32> for BigNumber {
    fn from(value: u32) -> Self {
        BigNumber::new(value, 0)
    }
}

// ── Formatting ─────────────────────────────────────────────

/// General form: every significant digit, decimal point only when the
/// exponent calls for one, zero as the single character `0`.
impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let sign = if self.signum() < 0 { "-" } else { "" };
        let digits = self.mantissa.magnitude().to_str_radix(10);
        if self.exponent >= 0 {
            let zeros = "0".repeat(self.exponent as usize);
            return write!(f, "{sign}{digits}{zeros}");
        }
        let point = digits.len() as i64 + self.exponent;
        if point > 0 {
            let (whole, frac) = digits.split_at(point as usize);
            write!(f, "{sign}{whole}.{frac}")
        } else {
            let zeros = "0".repeat((-point) as usize);
            write!(f, "{sign}0.{zeros}{digits}")
        }
    }
}

/// Scientific form: `d.dddddd E+EEE`. Six fraction digits unless the
/// format asks otherwise; exponent signed and zero-padded to three digits,
/// widening past three as needed.
impl fmt::UpperExp for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_scientific(f, 'E')
    }
}

impl fmt::LowerExp for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_scientific(f, 'e')
    }
}

// ── Serde ──────────────────────────────────────────────────

/// Map key under which `serde_json` presents numbers when its
/// `arbitrary_precision` feature is on.
const JSON_NUMBER_TOKEN: &str = "$serde_json::private::Number";

impl Serialize for BigNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for BigNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BigNumberVisitor;

        impl<'de> de::Visitor<'de> for BigNumberVisitor {
            type Value = BigNumber;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a decimal string or number")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<BigNumber, E> {
                BigNumber::parse(v)
                    .ok_or_else(|| E::custom(format!("invalid decimal literal: {v:?}")))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<BigNumber, E> {
                Ok(BigNumber::from(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<BigNumber, E> {
                Ok(BigNumber::from(v))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<BigNumber, E> {
                BigNumber::from_f64(v)
                    .ok_or_else(|| E::custom(format!("non-finite number: {v}")))
            }

            fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<BigNumber, A::Error> {
                // Under arbitrary_precision, numbers arrive as a one-entry
                // map carrying the unparsed token text.
                match map.next_entry::<String, String>()? {
                    Some((key, text)) if key == JSON_NUMBER_TOKEN => BigNumber::parse(&text)
                        .ok_or_else(|| {
                            de::Error::custom(format!("invalid decimal literal: {text:?}"))
                        }),
                    _ => Err(de::Error::invalid_type(de::Unexpected::Map, &self)),
                }
            }
        }

        deserializer.deserialize_any(BigNumberVisitor)
    }
}
