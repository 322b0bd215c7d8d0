use crate::utils::error::{PlotError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CutOp {
    fn symbol(self) -> &'static str {
        match self {
            CutOp::Lt => "<",
            CutOp::Le => "<=",
            CutOp::Gt => ">",
            CutOp::Ge => ">=",
            CutOp::Eq => "==",
            CutOp::Ne => "!=",
        }
    }
}

/// 單一篩選條件，例如 `pt > 20`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Cut {
    pub column: String,
    pub op: CutOp,
    pub value: f64,
}

fn cut_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*([A-Za-z_][A-Za-z0-9_]*)\s*(<=|>=|==|!=|<|>)\s*(\S+)\s*$")
            .expect("cut pattern is a valid regex")
    })
}

impl Cut {
    pub fn passes(&self, x: f64) -> bool {
        match self.op {
            CutOp::Lt => x < self.value,
            CutOp::Le => x <= self.value,
            CutOp::Gt => x > self.value,
            CutOp::Ge => x >= self.value,
            CutOp::Eq => x == self.value,
            CutOp::Ne => x != self.value,
        }
    }
}

impl FromStr for Cut {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self> {
        let caps = cut_pattern()
            .captures(s)
            .ok_or_else(|| PlotError::config("cuts", format!("Cannot parse cut '{}'", s)))?;

        let op = match &caps[2] {
            "<" => CutOp::Lt,
            "<=" => CutOp::Le,
            ">" => CutOp::Gt,
            ">=" => CutOp::Ge,
            "==" => CutOp::Eq,
            _ => CutOp::Ne,
        };
        let value: f64 = caps[3].parse().map_err(|_| {
            PlotError::config("cuts", format!("Cut '{}' compares against a non-number", s))
        })?;

        Ok(Cut {
            column: caps[1].to_string(),
            op,
            value,
        })
    }
}

impl TryFrom<String> for Cut {
    type Error = PlotError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Cut> for String {
    fn from(cut: Cut) -> Self {
        cut.to_string()
    }
}

impl fmt::Display for Cut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.column, self.op.symbol(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cuts() {
        let cut: Cut = "pt > 20".parse().unwrap();
        assert_eq!(cut.column, "pt");
        assert_eq!(cut.op, CutOp::Gt);
        assert_eq!(cut.value, 20.0);

        let cut: Cut = "eta>=-2.5".parse().unwrap();
        assert_eq!(cut.op, CutOp::Ge);
        assert_eq!(cut.value, -2.5);
        assert!(cut.passes(-2.5));
        assert!(!cut.passes(-3.0));
    }

    #[test]
    fn test_reject_malformed_cuts() {
        assert!("pt >".parse::<Cut>().is_err());
        assert!("pt ~ 3".parse::<Cut>().is_err());
        assert!("pt < twenty".parse::<Cut>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let cut: Cut = "HadronConeExclTruthLabelID != 15".parse().unwrap();
        let again: Cut = cut.to_string().parse().unwrap();
        assert_eq!(cut, again);
    }
}
