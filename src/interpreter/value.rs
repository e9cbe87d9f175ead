use std::cmp::Ordering;
use std::fmt;

use crate::ast::{BinaryOp, CompareOp};

use super::RuntimeError;

/// FluxScript runtime value types
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Boolean(bool),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::Float(n) => f.write_str(&format_float(*n)),
            Value::String(s) => f.write_str(s),
            Value::Boolean(true) => f.write_str("True"),
            Value::Boolean(false) => f.write_str("False"),
        }
    }
}

/// Shortest round-trip digits. Decimal exponents outside `-4..16` switch to
/// scientific form with a signed two-digit exponent (`1e+16`, `1.5e-07`);
/// otherwise whole values keep a trailing `.0`.
fn format_float(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if n != 0.0 {
        let scientific = format!("{:e}", n);
        if let Some((mantissa, exponent)) = scientific.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                if !(-4..16).contains(&exponent) {
                    let sign = if exponent < 0 { '-' } else { '+' };
                    return format!("{mantissa}e{sign}{:02}", exponent.abs());
                }
            }
        }
    }
    let plain = n.to_string();
    if plain.contains('.') {
        plain
    } else {
        format!("{plain}.0")
    }
}

/// Operands promoted for arithmetic; booleans count as 0/1.
#[derive(Debug, Clone, Copy)]
enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(n) => n as f64,
            Numeric::Float(n) => n,
        }
    }
}

impl Value {
    /// Get the type name of the value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Boolean(_) => "bool",
        }
    }

    /// `false`, `0`, `0.0` and `""` are false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Integer(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Boolean(b) => *b,
        }
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            Value::Integer(n) => Some(Numeric::Int(*n)),
            Value::Float(n) => Some(Numeric::Float(*n)),
            Value::Boolean(b) => Some(Numeric::Int(i64::from(*b))),
            Value::String(_) => None,
        }
    }

    fn numeric_operands(
        &self,
        other: &Value,
        operation: &str,
    ) -> Result<(Numeric, Numeric), RuntimeError> {
        match (self.numeric(), other.numeric()) {
            (Some(left), Some(right)) => Ok((left, right)),
            _ => Err(RuntimeError::TypeMismatch(format!(
                "unsupported operand types for {}: {} and {}",
                operation,
                self.type_name(),
                other.type_name()
            ))),
        }
    }

    /// Apply an arithmetic operator. `+` concatenates when either side is a string.
    pub fn binary(&self, op: BinaryOp, other: &Value) -> Result<Value, RuntimeError> {
        match op {
            BinaryOp::Add => self.add(other),
            BinaryOp::Subtract => self.subtract(other),
            BinaryOp::Multiply => self.multiply(other),
            BinaryOp::Divide => self.divide(other),
        }
    }

    pub fn add(&self, other: &Value) -> Result<Value, RuntimeError> {
        if self.is_string() || other.is_string() {
            return Ok(Value::String(format!("{}{}", self, other)));
        }
        match self.numeric_operands(other, "+")? {
            (Numeric::Int(a), Numeric::Int(b)) => a
                .checked_add(b)
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::IntegerOverflow(format!("{} + {}", a, b))),
            (a, b) => Ok(Value::Float(a.as_f64() + b.as_f64())),
        }
    }

    pub fn subtract(&self, other: &Value) -> Result<Value, RuntimeError> {
        match self.numeric_operands(other, "-")? {
            (Numeric::Int(a), Numeric::Int(b)) => a
                .checked_sub(b)
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::IntegerOverflow(format!("{} - {}", a, b))),
            (a, b) => Ok(Value::Float(a.as_f64() - b.as_f64())),
        }
    }

    pub fn multiply(&self, other: &Value) -> Result<Value, RuntimeError> {
        match self.numeric_operands(other, "*")? {
            (Numeric::Int(a), Numeric::Int(b)) => a
                .checked_mul(b)
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::IntegerOverflow(format!("{} * {}", a, b))),
            (a, b) => Ok(Value::Float(a.as_f64() * b.as_f64())),
        }
    }

    /// Real division, narrowed back to an integer when both operands were
    /// integers and the quotient is whole.
    pub fn divide(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (left, right) = self.numeric_operands(other, "/")?;
        if right.as_f64() == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        if let (Numeric::Int(a), Numeric::Int(b)) = (left, right) {
            if a.checked_rem(b) == Some(0) {
                return a
                    .checked_div(b)
                    .map(Value::Integer)
                    .ok_or_else(|| RuntimeError::IntegerOverflow(format!("{} / {}", a, b)));
            }
        }
        Ok(Value::Float(left.as_f64() / right.as_f64()))
    }

    /// Division used by `/=`: always a float result.
    pub fn divide_real(&self, other: &Value) -> Result<Value, RuntimeError> {
        let (left, right) = self.numeric_operands(other, "/=")?;
        if right.as_f64() == 0.0 {
            return Err(RuntimeError::DivisionByZero);
        }
        Ok(Value::Float(left.as_f64() / right.as_f64()))
    }

    pub fn negate(&self) -> Result<Value, RuntimeError> {
        match self.numeric() {
            Some(Numeric::Int(n)) => n
                .checked_neg()
                .map(Value::Integer)
                .ok_or_else(|| RuntimeError::IntegerOverflow(format!("-({})", n))),
            Some(Numeric::Float(n)) => Ok(Value::Float(-n)),
            None => Err(RuntimeError::TypeMismatch(format!(
                "bad operand type for unary -: {}",
                self.type_name()
            ))),
        }
    }

    pub fn compare(&self, op: CompareOp, other: &Value) -> Result<Value, RuntimeError> {
        let ordering = match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => {
                let (left, right) = match (self.numeric(), other.numeric()) {
                    (Some(left), Some(right)) => (left, right),
                    _ => {
                        return Err(RuntimeError::TypeMismatch(format!(
                            "'{}' not supported between {} and {}",
                            op,
                            self.type_name(),
                            other.type_name()
                        )));
                    }
                };
                match (left, right) {
                    (Numeric::Int(a), Numeric::Int(b)) => Some(a.cmp(&b)),
                    (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
                }
            }
        };
        let result = match op {
            CompareOp::Less => ordering == Some(Ordering::Less),
            CompareOp::Greater => ordering == Some(Ordering::Greater),
        };
        Ok(Value::Boolean(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_print_rendering() {
        assert_eq!(Value::Integer(-4).to_string(), "-4");
        assert_eq!(Value::Float(3.5).to_string(), "3.5");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.1 + 0.2).to_string(), "0.30000000000000004");
        assert_eq!(Value::Boolean(true).to_string(), "True");
        assert_eq!(Value::Boolean(false).to_string(), "False");
        assert_eq!(Value::String("hi".into()).to_string(), "hi");
    }

    #[test]
    fn large_and_tiny_floats_use_exponent_form() {
        assert_eq!(Value::Float(1e16).to_string(), "1e+16");
        assert_eq!(Value::Float(9999999999999998.0).to_string(), "9999999999999998.0");
        assert_eq!(Value::Float(1.5e-7).to_string(), "1.5e-07");
        assert_eq!(Value::Float(0.0001).to_string(), "0.0001");
        assert_eq!(Value::Float(-2.5e20).to_string(), "-2.5e+20");
        assert_eq!(Value::Float(-0.0).to_string(), "-0.0");
        assert_eq!(Value::Float(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn concatenation_renders_booleans_capitalized() {
        let joined = Value::String("x".into()).add(&Value::Boolean(true)).unwrap();
        assert_eq!(joined, Value::String("xTrue".into()));
    }

    #[test]
    fn division_narrows_whole_integer_quotients() {
        let six = Value::Integer(6);
        assert_eq!(six.divide(&Value::Integer(2)).unwrap(), Value::Integer(3));
        assert_eq!(
            Value::Integer(7).divide(&Value::Integer(2)).unwrap(),
            Value::Float(3.5)
        );
        assert_eq!(
            Value::Float(6.0).divide(&Value::Integer(2)).unwrap(),
            Value::Float(3.0)
        );
        assert!(matches!(
            Value::Integer(5).divide(&Value::Integer(0)),
            Err(RuntimeError::DivisionByZero)
        ));
        assert!(matches!(
            Value::Integer(5).divide(&Value::Float(0.0)),
            Err(RuntimeError::DivisionByZero)
        ));
    }

    #[test]
    fn plus_concatenates_when_either_side_is_text() {
        let text = Value::String("a".into());
        assert_eq!(
            text.add(&Value::Integer(1)).unwrap(),
            Value::String("a1".into())
        );
        assert_eq!(
            Value::Float(1.5).add(&text).unwrap(),
            Value::String("1.5a".into())
        );
        assert_eq!(
            Value::Integer(1).add(&Value::Integer(2)).unwrap(),
            Value::Integer(3)
        );
    }

    #[test]
    fn strings_reject_other_arithmetic() {
        let text = Value::String("a".into());
        assert!(matches!(
            text.subtract(&Value::Integer(1)),
            Err(RuntimeError::TypeMismatch(_))
        ));
        assert!(matches!(
            text.multiply(&Value::Integer(2)),
            Err(RuntimeError::TypeMismatch(_))
        ));
        assert!(matches!(text.negate(), Err(RuntimeError::TypeMismatch(_))));
    }

    #[test]
    fn integer_overflow_is_reported() {
        assert!(matches!(
            Value::Integer(i64::MAX).add(&Value::Integer(1)),
            Err(RuntimeError::IntegerOverflow(_))
        ));
    }

    #[test]
    fn comparisons() {
        let less = |a: Value, b: Value| a.compare(CompareOp::Less, &b).unwrap();
        assert_eq!(less(Value::Integer(1), Value::Float(1.5)), Value::Boolean(true));
        assert_eq!(
            less(Value::String("b".into()), Value::String("a".into())),
            Value::Boolean(false)
        );
        assert_eq!(
            Value::Boolean(true)
                .compare(CompareOp::Greater, &Value::Integer(0))
                .unwrap(),
            Value::Boolean(true)
        );
        assert!(
            Value::String("1".into())
                .compare(CompareOp::Less, &Value::Integer(2))
                .is_err()
        );
    }

    #[test]
    fn truthiness() {
        assert!(!Value::Integer(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::String(String::new()).is_truthy());
        assert!(Value::String("0".into()).is_truthy());
        assert!(Value::Integer(-1).is_truthy());
    }
}
