use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const INR_CURRENCY_CODE: &str = "INR";
pub const INR_CURRENCY_CODE_LOWER: &str = "inr";

//--------------------------------------      Rupees       -----------------------------------------------------------
/// An exact amount of Indian rupees, denominated in paise (1/100th of a rupee).
///
/// All arithmetic is integer arithmetic on the paise value, so sums of line totals are exact. The decimal
/// representation only appears at the wire and display boundaries. Conversions from decimal amounts reject sub-paise
/// precision rather than rounding.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, PartialOrd, Ord)]
#[sqlx(transparent)]
pub struct Rupees(i64);

op!(binary Rupees, Add, add);
op!(binary Rupees, Sub, sub);
op!(inplace Rupees, AddAssign, add_assign);
op!(inplace Rupees, SubAssign, sub_assign);
op!(unary Rupees, Neg, neg);

impl Mul<i64> for Rupees {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Rupees {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Amount cannot be represented in paise: {0}")]
pub struct PaiseConversionError(pub String);

impl Rupees {
    /// The amount in paise, the minor currency unit that the payment gateway expects.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_paise(paise: i64) -> Self {
        Self(paise)
    }

    pub fn from_rupees(rupees: i64) -> Self {
        Self(rupees * 100)
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }
}

impl TryFrom<Decimal> for Rupees {
    type Error = PaiseConversionError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        let paise = value * Decimal::from(100);
        if !paise.fract().is_zero() {
            return Err(PaiseConversionError(format!("{value} has sub-paise precision")));
        }
        let paise = paise
            .to_i64()
            .ok_or_else(|| PaiseConversionError(format!("{value} is out of range for a paise amount")))?;
        Ok(Self(paise))
    }
}

impl Display for Rupees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "₹{}", self.to_decimal())
    }
}

impl Serialize for Rupees {
    fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
    where S: Serializer {
        Serialize::serialize(&self.to_decimal(), s)
    }
}

impl<'de> Deserialize<'de> for Rupees {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where D: Deserializer<'de> {
        let amount = <Decimal as Deserialize>::deserialize(d)?;
        Rupees::try_from(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decimal_amounts_convert_to_paise() {
        let amount = Rupees::try_from(Decimal::new(25000, 2)).unwrap();
        assert_eq!(amount.value(), 25_000);
        assert_eq!(amount, Rupees::from_rupees(250));
    }

    #[test]
    fn sub_paise_precision_is_rejected() {
        let err = Rupees::try_from(Decimal::new(1005, 3)).unwrap_err();
        assert!(err.to_string().contains("sub-paise"));
    }

    #[test]
    fn line_totals_sum_exactly() {
        let lines = [Rupees::from_paise(1999) * 3, Rupees::from_paise(550) * 2];
        let total: Rupees = lines.into_iter().sum();
        assert_eq!(total.value(), 7097);
    }

    #[test]
    fn display_uses_two_decimal_places() {
        assert_eq!(Rupees::from_paise(25_000).to_string(), "₹250.00");
        assert_eq!(Rupees::from_paise(1).to_string(), "₹0.01");
    }

    #[test]
    fn serde_round_trip_is_exact() {
        let amount = Rupees::from_paise(25_000);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, r#""250.00""#);
        let back: Rupees = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
