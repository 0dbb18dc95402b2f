//! BigNumber arithmetic, comparison, and formatting tests.

use ascension_core::bignum::{BigNumber, MAX_PARSE_EXPONENT};
use std::cmp::Ordering;

/// Parsing accepts signs, decimal points, and exponent suffixes.
#[test]
fn parse_accepts_decimal_literals() {
    assert_eq!(BigNumber::parse("120").unwrap(), BigNumber::from(120u32));
    assert_eq!(BigNumber::parse("-12").unwrap(), BigNumber::from(-12i32));
    assert_eq!(BigNumber::parse("+7").unwrap(), BigNumber::from(7u32));
    assert_eq!(BigNumber::parse(" 42 ").unwrap(), BigNumber::from(42u32));
    assert_eq!(
        BigNumber::parse("4.5e12").unwrap().to_string(),
        "4500000000000"
    );
    assert_eq!(BigNumber::parse("1e-3").unwrap().to_string(), "0.001");
    assert_eq!(BigNumber::parse("3.25").unwrap().to_string(), "3.25");
}

/// Junk never parses; it is reported as `None`, not a panic.
#[test]
fn parse_rejects_junk() {
    for junk in ["", "abc", "12abc", "1e", "--5", "1.2.3", "0x10", "1e4.5"] {
        assert!(
            BigNumber::parse(junk).is_none(),
            "Expected {junk:?} to fail parsing"
        );
    }
}

/// Exponents outside the accepted envelope are rejected as hostile text,
/// never folded into overflowing arithmetic.
#[test]
fn parse_rejects_runaway_exponents() {
    for hostile in [
        "1e9223372036854775807",
        "1.5e-9223372036854775808",
        "1e9223372036854775808",
        "1e2000000000",
        "1e-2000000000",
    ] {
        assert!(
            BigNumber::parse(hostile).is_none(),
            "Expected {hostile:?} to be rejected"
        );
    }

    let edge = BigNumber::parse(&format!("1e{MAX_PARSE_EXPONENT}")).unwrap();
    assert_eq!(format!("{edge:E}"), format!("1.000000E+{MAX_PARSE_EXPONENT}"));
    assert!(BigNumber::parse(&format!("1e-{MAX_PARSE_EXPONENT}")).is_some());
    assert!(BigNumber::parse(&format!("1e{}", MAX_PARSE_EXPONENT + 1)).is_none());
    // Fractional digits count against the envelope; the stored exponent
    // is what is bounded.
    assert!(BigNumber::parse(&format!("2.5e-{MAX_PARSE_EXPONENT}")).is_none());
}

/// A ten-thousand digit value survives digit-by-digit construction and
/// prints every digit back in general form.
#[test]
fn ten_thousand_digit_round_trip() {
    let mut value = BigNumber::zero();
    let mut expected = String::with_capacity(10_000);
    for i in 0..10_000u32 {
        let digit = 1 + i % 9;
        value.push_digit(digit);
        expected.push(char::from(b'0' + digit as u8));
    }

    assert_eq!(value.to_string(), expected);
    assert_eq!(BigNumber::parse(&expected).unwrap(), value);
    // Scientific form keeps the leading digits and the full magnitude.
    assert_eq!(format!("{value:E}"), "1.234568E+9999");
}

/// Zero prints as `0` in general form and keeps the fixed scientific shape.
#[test]
fn zero_formatting() {
    let zero = BigNumber::zero();
    assert_eq!(zero.to_string(), "0");
    assert_eq!(format!("{zero:E}"), "0.000000E+000");
    assert_eq!(format!("{zero:.2E}"), "0.00E+000");
    assert_eq!((BigNumber::from(5u32) - BigNumber::from(5u32)).to_string(), "0");
}

/// General form shows every significant digit with no grouping.
#[test]
fn general_form_prints_all_digits() {
    assert_eq!(BigNumber::new(45, 11).to_string(), "4500000000000");
    assert_eq!(BigNumber::parse("0.005").unwrap().to_string(), "0.005");
    assert_eq!(BigNumber::parse("-3.25").unwrap().to_string(), "-3.25");
    assert_eq!(
        BigNumber::from_f64(1e22).unwrap().to_string(),
        "10000000000000000000000"
    );
}

/// Scientific form pads short mantissas, keeps the exponent sign, and
/// zero-pads the exponent to three digits.
#[test]
fn scientific_form_shape() {
    let x = BigNumber::parse("123.456").unwrap();
    assert_eq!(format!("{x:E}"), "1.234560E+002");
    assert_eq!(format!("{x:e}"), "1.234560e+002");
    assert_eq!(format!("{x:.2E}"), "1.23E+002");
    assert_eq!(format!("{:E}", BigNumber::parse("1e-7").unwrap()), "1.000000E-007");
    assert_eq!(format!("{:E}", BigNumber::from(1u32)), "1.000000E+000");
}

/// The exponent field widens past three digits instead of truncating.
#[test]
fn scientific_exponent_widens() {
    assert_eq!(format!("{:E}", BigNumber::parse("1e100").unwrap()), "1.000000E+100");
    assert_eq!(
        format!("{:E}", BigNumber::parse("1.23e4567").unwrap()),
        "1.230000E+4567"
    );
}

/// Rounding is half away from zero, for both signs.
#[test]
fn scientific_rounds_half_away_from_zero() {
    assert_eq!(format!("{:.0E}", BigNumber::parse("2.5").unwrap()), "3E+000");
    assert_eq!(format!("{:.0E}", BigNumber::parse("3.5").unwrap()), "4E+000");
    assert_eq!(format!("{:.0E}", BigNumber::parse("-2.5").unwrap()), "-3E+000");
    assert_eq!(
        format!("{:E}", BigNumber::parse("1999999.5").unwrap()),
        "2.000000E+006"
    );
}

/// A rounding carry that overflows the mantissa bumps the exponent.
#[test]
fn scientific_carry_bumps_exponent() {
    let x = BigNumber::parse("9.9999995e10").unwrap();
    assert_eq!(format!("{x:E}"), "1.000000E+011");
    assert_eq!(format!("{:.1E}", BigNumber::parse("99.9").unwrap()), "1.0E+002");
}

/// Equality sees through denormalized (mantissa, exponent) pairs.
#[test]
fn equality_across_denormalized_forms() {
    assert_eq!(BigNumber::new(45, 11), BigNumber::new(4500, 9));
    assert_eq!(BigNumber::new(45, 11), BigNumber::parse("4.5e12").unwrap());
    assert_ne!(BigNumber::new(46, 11), BigNumber::new(45, 11));
}

/// Total order: sign first, then magnitude, reversed for negatives.
#[test]
fn ordering_is_total() {
    let ordered = [
        BigNumber::parse("-1e10").unwrap(),
        BigNumber::parse("-5").unwrap(),
        BigNumber::parse("-2").unwrap(),
        BigNumber::zero(),
        BigNumber::parse("999").unwrap(),
        BigNumber::parse("1e3").unwrap(),
        BigNumber::parse("1e300").unwrap(),
    ];
    for pair in ordered.windows(2) {
        assert!(
            pair[0] < pair[1],
            "Expected {} < {}",
            pair[0],
            pair[1]
        );
    }
}

/// from_f64 is exact: the full binary expansion is kept, not a rounding.
#[test]
fn from_f64_is_exact() {
    assert_eq!(BigNumber::from_f64(0.5).unwrap().to_string(), "0.5");
    assert_eq!(BigNumber::from_f64(-3.0).unwrap().to_string(), "-3");
    // 0.1 is not exactly representable in binary; the conversion tells
    // the truth about what the float holds.
    assert_eq!(
        BigNumber::from_f64(0.1).unwrap().to_string(),
        "0.1000000000000000055511151231257827021181583404541015625"
    );
    assert!(BigNumber::from_f64(f64::NAN).is_none());
    assert!(BigNumber::from_f64(f64::INFINITY).is_none());
}

/// Comparisons against f64 stay exact at the very top of the float range.
#[test]
fn compares_exactly_at_f64_extremes() {
    let max = BigNumber::from_f64(f64::MAX).unwrap();
    assert_eq!(max.cmp_f64(f64::MAX), Some(Ordering::Equal));
    assert!(max.fits_f64());

    // One more than f64::MAX is already past the float range.
    let above = &max + &BigNumber::from(1u32);
    assert_eq!(above.cmp_f64(f64::MAX), Some(Ordering::Greater));
    assert!(!above.fits_f64());
    assert!(above < f64::INFINITY);
    assert!(above > f64::NEG_INFINITY);

    let huge = BigNumber::parse("-1e400").unwrap();
    assert_eq!(huge.cmp_f64(f64::NEG_INFINITY), Some(Ordering::Greater));
    assert_eq!(huge.cmp_f64(f64::MAX), Some(Ordering::Less));
    assert_eq!(max.cmp_f64(f64::NAN), None);
}

/// The smallest subnormal still compares exactly.
#[test]
fn compares_exactly_at_subnormals() {
    let tiny = BigNumber::from_f64(5e-324).unwrap();
    assert_eq!(tiny.cmp_f64(5e-324), Some(Ordering::Equal));
    assert_eq!(tiny.cmp_f64(0.0), Some(Ordering::Greater));
    assert_eq!(tiny.cmp_f64(1e-323), Some(Ordering::Less));
}

/// Hand-built values at the rim of the i64 exponent range still order,
/// convert, and format without overflow.
#[test]
fn extreme_exponents_stay_total() {
    let top = BigNumber::new(45, i64::MAX);
    let bottom = BigNumber::new(1, i64::MIN);

    assert!(top > BigNumber::parse("1e300").unwrap());
    assert!(bottom < BigNumber::parse("1e-300").unwrap());
    assert!(bottom > BigNumber::zero());
    assert!(!top.fits_f64());
    assert!(bottom.fits_f64());
    assert_eq!(top.to_f64(), f64::INFINITY);
    assert_eq!(bottom.to_f64(), 0.0);
    assert_eq!(BigNumber::new(-45, i64::MAX).to_f64(), f64::NEG_INFINITY);
    assert_eq!(format!("{top:E}"), "4.500000E+9223372036854775807");
    assert_eq!(format!("{bottom:E}"), "1.000000E-9223372036854775808");
}

/// Addition and subtraction align exponents at full precision.
#[test]
fn addition_aligns_exponents() {
    let a = BigNumber::parse("1.5e3").unwrap();
    let b = BigNumber::parse("25").unwrap();
    assert_eq!((&a + &b).to_string(), "1525");
    assert_eq!((&a - &b).to_string(), "1475");
    assert_eq!(-BigNumber::parse("5").unwrap(), BigNumber::parse("-5").unwrap());
}

/// `+=` accumulates across mixed exponents without drifting.
#[test]
fn add_assign_accumulates() {
    let mut sum = BigNumber::zero();
    for _ in 0..1000 {
        sum += BigNumber::from(1u32);
    }
    assert_eq!(sum, BigNumber::from(1000u32));

    let mut halves = BigNumber::zero();
    halves += BigNumber::parse("0.5").unwrap();
    halves += BigNumber::parse("0.5").unwrap();
    assert_eq!(halves, BigNumber::from(1u32));

    let mut cancel = BigNumber::parse("7e5").unwrap();
    cancel -= BigNumber::parse("7e5").unwrap();
    assert!(cancel.is_zero());
    assert_eq!(format!("{cancel:E}"), "0.000000E+000");
}

/// Multiplication is exact; division carries a fixed significant width.
#[test]
fn multiplication_and_division() {
    let product = BigNumber::parse("2e10").unwrap() * BigNumber::parse("3e20").unwrap();
    assert_eq!(product, BigNumber::parse("6e30").unwrap());

    let third = BigNumber::parse("1e30").unwrap() / BigNumber::parse("3").unwrap();
    assert_eq!(format!("{third:.6E}"), "3.333333E+029");

    let coarse = BigNumber::parse("1e30")
        .unwrap()
        .div_to_precision(&BigNumber::parse("3").unwrap(), 2);
    assert_eq!(format!("{coarse:.2E}"), "3.33E+029");

    let ratio = BigNumber::parse("1e5000").unwrap() / BigNumber::parse("4e4990").unwrap();
    assert_eq!(format!("{ratio:.4E}"), "2.5000E+009");
}

/// Dividing by zero is a caller bug and panics loudly.
#[test]
#[should_panic(expected = "division by zero")]
fn division_by_zero_panics() {
    let _ = BigNumber::from(1u32) / BigNumber::zero();
}

/// log10 magnitude estimation feeds the optimizer's log-space path.
#[test]
fn log10_abs_estimates_magnitude() {
    assert!((BigNumber::parse("1e100").unwrap().log10_abs() - 100.0).abs() < 1e-9);
    assert!((BigNumber::parse("-2e5").unwrap().log10_abs() - 5.301_029_995).abs() < 1e-6);
    assert_eq!(BigNumber::zero().log10_abs(), f64::NEG_INFINITY);
}

/// exp10 reconstructs a value from its log without leaving precision
/// behind at float-range magnitudes.
#[test]
fn exp10_reconstructs_from_logs() {
    assert_eq!(BigNumber::exp10(3.0), BigNumber::from(1000u32));
    assert_eq!(BigNumber::exp10(f64::NEG_INFINITY), BigNumber::zero());

    let beyond = BigNumber::exp10(400.0);
    assert!(!beyond.fits_f64());
    assert!((beyond.log10_abs() - 400.0).abs() < 1e-9);
    assert_eq!(beyond.to_f64(), f64::INFINITY);
}

/// Serde round-trips the general string form.
#[test]
fn serde_uses_general_string_form() {
    let value = BigNumber::parse("4.5e12").unwrap();
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, "\"4500000000000\"");

    let back: BigNumber = serde_json::from_str("\"123.45\"").unwrap();
    assert_eq!(back, BigNumber::parse("123.45").unwrap());

    let err = serde_json::from_str::<BigNumber>("\"not a number\"");
    assert!(err.is_err(), "Junk strings should fail deserialization");
}

/// Bare JSON numbers deserialize through their exact token text, not an
/// f64 detour.
#[test]
fn serde_accepts_bare_numbers() {
    let frac: BigNumber = serde_json::from_str("123.45").unwrap();
    assert_eq!(frac, BigNumber::parse("123.45").unwrap());

    let digits = "123456789012345678901234567890123456789";
    let wide: BigNumber = serde_json::from_str(digits).unwrap();
    assert_eq!(wide.to_string(), digits, "Every digit survives, none round");

    let small: BigNumber = serde_json::from_str("-42").unwrap();
    assert_eq!(small, BigNumber::from(-42i32));
    assert_eq!(
        serde_json::from_str::<BigNumber>("2.75e30008").unwrap(),
        BigNumber::parse("2.75e30008").unwrap()
    );
    assert!(
        serde_json::from_str::<BigNumber>(r#"{"a": 1}"#).is_err(),
        "Ordinary maps are still not numbers"
    );
}
