use crate::ast::Type;

use super::{RuntimeError, Value};

/// Convert `value` for a binding declared as `declared`.
///
/// * `int` truncates floats and rejects strings.
/// * `float` promotes integers and rejects strings.
/// * `string` stringifies anything.
/// * `bool` treats nonzero numbers as true and rejects strings.
///
/// Booleans count as the integers 0 and 1 for the numeric targets.
pub fn coerce(declared: Type, value: Value) -> Result<Value, RuntimeError> {
    match (declared, value) {
        (Type::Int, Value::Integer(n)) => Ok(Value::Integer(n)),
        (Type::Int, Value::Boolean(b)) => Ok(Value::Integer(i64::from(b))),
        (Type::Int, Value::Float(f)) => truncate(f),

        (Type::Float, Value::Float(f)) => Ok(Value::Float(f)),
        (Type::Float, Value::Integer(n)) => Ok(Value::Float(n as f64)),
        (Type::Float, Value::Boolean(b)) => Ok(Value::Float(if b { 1.0 } else { 0.0 })),

        (Type::String, Value::String(s)) => Ok(Value::String(s)),
        (Type::String, other) => Ok(Value::String(other.to_string())),

        (Type::Bool, Value::Boolean(b)) => Ok(Value::Boolean(b)),
        (Type::Bool, Value::Integer(n)) => Ok(Value::Boolean(n != 0)),
        (Type::Bool, Value::Float(f)) => Ok(Value::Boolean(f != 0.0)),

        (declared, other) => Err(RuntimeError::TypeMismatch(format!(
            "cannot declare {} from {} value '{}'",
            declared,
            other.type_name(),
            other
        ))),
    }
}

// 2^63: i64::MAX itself is not representable as f64.
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

fn truncate(value: f64) -> Result<Value, RuntimeError> {
    let truncated = value.trunc();
    if truncated.is_finite() && (-I64_LIMIT..I64_LIMIT).contains(&truncated) {
        Ok(Value::Integer(truncated as i64))
    } else {
        Err(RuntimeError::IntegerOverflow(format!(
            "cannot convert {} to int",
            value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_truncates_toward_zero() {
        assert_eq!(coerce(Type::Int, Value::Float(3.9)).unwrap(), Value::Integer(3));
        assert_eq!(coerce(Type::Int, Value::Float(-3.9)).unwrap(), Value::Integer(-3));
        assert_eq!(coerce(Type::Int, Value::Boolean(true)).unwrap(), Value::Integer(1));
    }

    #[test]
    fn int_rejects_text_and_infinities() {
        assert!(matches!(
            coerce(Type::Int, Value::String("4".into())),
            Err(RuntimeError::TypeMismatch(_))
        ));
        assert!(matches!(
            coerce(Type::Int, Value::Float(f64::INFINITY)),
            Err(RuntimeError::IntegerOverflow(_))
        ));
    }

    #[test]
    fn float_promotes_integers() {
        assert_eq!(coerce(Type::Float, Value::Integer(2)).unwrap(), Value::Float(2.0));
        assert!(coerce(Type::Float, Value::String("2.0".into())).is_err());
    }

    #[test]
    fn string_accepts_everything() {
        assert_eq!(
            coerce(Type::String, Value::Float(2.0)).unwrap(),
            Value::String("2.0".into())
        );
        assert_eq!(
            coerce(Type::String, Value::Boolean(false)).unwrap(),
            Value::String("False".into())
        );
    }

    #[test]
    fn bool_from_numbers() {
        assert_eq!(coerce(Type::Bool, Value::Integer(0)).unwrap(), Value::Boolean(false));
        assert_eq!(coerce(Type::Bool, Value::Float(0.5)).unwrap(), Value::Boolean(true));
        assert!(coerce(Type::Bool, Value::String("true".into())).is_err());
    }
}
