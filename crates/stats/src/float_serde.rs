//! Serde helpers for floats that may be non-finite.
//!
//! JSON has no literal for NaN or infinity (`serde_json` writes `null`), so
//! these are written as the strings `"nan"`, `"inf"` and `"-inf"`. Reading
//! accepts numbers, those strings and `null` (as NaN).
//!
//! ```
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Fit {
//!     #[serde(with = "aquifer_stats::float_serde")]
//!     aic: f64,
//! }
//!
//! let json = serde_json::to_string(&Fit { aic: f64::NEG_INFINITY }).unwrap();
//! assert_eq!(json, r#"{"aic":"-inf"}"#);
//! let back: Fit = serde_json::from_str(&json).unwrap();
//! assert_eq!(back.aic, f64::NEG_INFINITY);
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f64),
    Text(String),
}

fn parse(repr: Option<Repr>) -> Result<f64, String> {
    match repr {
        None => Ok(f64::NAN),
        Some(Repr::Number(v)) => Ok(v),
        Some(Repr::Text(t)) => match t.to_ascii_lowercase().as_str() {
            "nan" => Ok(f64::NAN),
            "inf" | "+inf" | "infinity" => Ok(f64::INFINITY),
            "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
            _ => Err(format!("invalid float '{t}'")),
        },
    }
}

struct Float(f64);

impl Serialize for Float {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        let v = self.0;
        if v.is_finite() {
            s.serialize_f64(v)
        } else if v.is_nan() {
            s.serialize_str("nan")
        } else if v > 0.0 {
            s.serialize_str("inf")
        } else {
            s.serialize_str("-inf")
        }
    }
}

pub fn serialize<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    Float(*v).serialize(s)
}

pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    parse(Option::<Repr>::deserialize(d)?).map_err(D::Error::custom)
}

/// The same encoding for `Vec<f64>`.
pub mod vec {
    use super::*;

    pub fn serialize<S: Serializer>(v: &[f64], s: S) -> Result<S::Ok, S::Error> {
        s.collect_seq(v.iter().map(|&x| Float(x)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Option<Repr>>::deserialize(d)?
            .into_iter()
            .map(|r| parse(r).map_err(D::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super")]
        x: f64,
        #[serde(with = "super::vec")]
        xs: Vec<f64>,
    }

    #[test]
    fn non_finite_values_survive_json() {
        let s = Sample {
            x: f64::INFINITY,
            xs: vec![1.5, f64::NAN, f64::NEG_INFINITY],
        };
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"x":"inf","xs":[1.5,"nan","-inf"]}"#);
        let back: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(back.x, f64::INFINITY);
        assert_eq!(back.xs[0], 1.5);
        assert!(back.xs[1].is_nan());
        assert_eq!(back.xs[2], f64::NEG_INFINITY);
    }

    #[test]
    fn null_reads_as_nan() {
        let back: Sample = serde_json::from_str(r#"{"x":null,"xs":[null,2.0]}"#).unwrap();
        assert!(back.x.is_nan());
        assert!(back.xs[0].is_nan());
        assert_eq!(back.xs[1], 2.0);
    }

    #[test]
    fn unknown_text_rejected() {
        assert!(serde_json::from_str::<Sample>(r#"{"x":"big","xs":[]}"#).is_err());
    }
}
