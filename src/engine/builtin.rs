//! Builtin type catalog.
//!
//! Declares the `java.lang` types the command grammar is usually pointed at,
//! backed by native implementations with matching semantics (two's-complement
//! `int`, `Double.toString` formatting, `ArithmeticException` on overflow and
//! division by zero).

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use crate::engine::catalog::{Registry, TypeDef};
use crate::engine::error::Fault;
use crate::engine::value::{self, TypeRef, Value};

const INT: TypeRef = TypeRef::Int;
const LONG: TypeRef = TypeRef::Long;
const DOUBLE: TypeRef = TypeRef::Double;
const BOOLEAN: TypeRef = TypeRef::Boolean;
const STRING: TypeRef = TypeRef::String;
const INTEGER: TypeRef = TypeRef::Named("java.lang.Integer");
const DOUBLE_BOX: TypeRef = TypeRef::Named("java.lang.Double");
const BOOLEAN_BOX: TypeRef = TypeRef::Named("java.lang.Boolean");

/// Registry with every builtin type.
pub fn registry() -> Registry {
    Registry::new()
        .with(math())
        .with(integer())
        .with(double())
        .with(boolean())
        .with(string())
        .with(system())
}

fn math() -> TypeDef {
    TypeDef::new("java.lang.Math")
        .field(DOUBLE, "E")
        .field(DOUBLE, "PI")
        .static_method(INT, "abs", &[INT], |a| Ok(a.int(0)?.wrapping_abs().into()))
        .static_method(DOUBLE, "abs", &[DOUBLE], |a| Ok(a.double(0)?.abs().into()))
        .static_method(INT, "max", &[INT, INT], |a| Ok(a.int(0)?.max(a.int(1)?).into()))
        .static_method(DOUBLE, "max", &[DOUBLE, DOUBLE], |a| {
            Ok(java_max(a.double(0)?, a.double(1)?).into())
        })
        .static_method(INT, "min", &[INT, INT], |a| Ok(a.int(0)?.min(a.int(1)?).into()))
        .static_method(DOUBLE, "min", &[DOUBLE, DOUBLE], |a| {
            Ok(java_min(a.double(0)?, a.double(1)?).into())
        })
        .static_method(DOUBLE, "pow", &[DOUBLE, DOUBLE], |a| {
            Ok(a.double(0)?.powf(a.double(1)?).into())
        })
        .static_method(DOUBLE, "sqrt", &[DOUBLE], |a| Ok(a.double(0)?.sqrt().into()))
        .static_method(DOUBLE, "cbrt", &[DOUBLE], |a| Ok(a.double(0)?.cbrt().into()))
        .static_method(DOUBLE, "hypot", &[DOUBLE, DOUBLE], |a| {
            Ok(a.double(0)?.hypot(a.double(1)?).into())
        })
        .static_method(DOUBLE, "floor", &[DOUBLE], |a| Ok(a.double(0)?.floor().into()))
        .static_method(DOUBLE, "ceil", &[DOUBLE], |a| Ok(a.double(0)?.ceil().into()))
        .static_method(LONG, "round", &[DOUBLE], |a| Ok(java_round(a.double(0)?).into()))
        .static_method(DOUBLE, "signum", &[DOUBLE], |a| {
            let v = a.double(0)?;
            let sign = if v == 0.0 || v.is_nan() { v } else { v.signum() };
            Ok(sign.into())
        })
        .static_method(DOUBLE, "sin", &[DOUBLE], |a| Ok(a.double(0)?.sin().into()))
        .static_method(DOUBLE, "cos", &[DOUBLE], |a| Ok(a.double(0)?.cos().into()))
        .static_method(DOUBLE, "tan", &[DOUBLE], |a| Ok(a.double(0)?.tan().into()))
        .static_method(DOUBLE, "exp", &[DOUBLE], |a| Ok(a.double(0)?.exp().into()))
        .static_method(DOUBLE, "log", &[DOUBLE], |a| Ok(a.double(0)?.ln().into()))
        .static_method(DOUBLE, "log10", &[DOUBLE], |a| Ok(a.double(0)?.log10().into()))
        .static_method(DOUBLE, "toRadians", &[DOUBLE], |a| Ok(a.double(0)?.to_radians().into()))
        .static_method(DOUBLE, "toDegrees", &[DOUBLE], |a| Ok(a.double(0)?.to_degrees().into()))
        .static_method(DOUBLE, "random", &[], |_| Ok(fastrand::f64().into()))
        .static_method(INT, "floorDiv", &[INT, INT], |a| {
            Ok(floor_div(a.int(0)?, a.int(1)?)?.into())
        })
        .static_method(INT, "floorMod", &[INT, INT], |a| {
            let (x, y) = (a.int(0)?, a.int(1)?);
            Ok(x.wrapping_sub(floor_div(x, y)?.wrapping_mul(y)).into())
        })
        .static_method(INT, "addExact", &[INT, INT], |a| {
            exact(a.int(0)?.checked_add(a.int(1)?))
        })
        .static_method(INT, "subtractExact", &[INT, INT], |a| {
            exact(a.int(0)?.checked_sub(a.int(1)?))
        })
        .static_method(INT, "multiplyExact", &[INT, INT], |a| {
            exact(a.int(0)?.checked_mul(a.int(1)?))
        })
        .static_method(INT, "negateExact", &[INT], |a| exact(a.int(0)?.checked_neg()))
}

fn integer() -> TypeDef {
    TypeDef::new("java.lang.Integer")
        .field(INT, "MIN_VALUE")
        .field(INT, "MAX_VALUE")
        .field(INT, "SIZE")
        .field(INT, "BYTES")
        .field(INT, "value")
        .static_method(INT, "parseInt", &[STRING], |a| Ok(parse_int(a.text(0)?, 10)?.into()))
        .static_method(INT, "parseInt", &[STRING, INT], |a| {
            Ok(parse_int(a.text(0)?, a.int(1)?)?.into())
        })
        .static_method(INTEGER, "valueOf", &[INT], |a| Ok(a.int(0)?.into()))
        .static_method(INTEGER, "valueOf", &[STRING], |a| Ok(parse_int(a.text(0)?, 10)?.into()))
        .static_method(STRING, "toString", &[INT], |a| Ok(a.int(0)?.to_string().into()))
        .static_method(STRING, "toBinaryString", &[INT], |a| {
            Ok(format!("{:b}", a.int(0)? as u32).into())
        })
        .static_method(STRING, "toHexString", &[INT], |a| {
            Ok(format!("{:x}", a.int(0)? as u32).into())
        })
        .static_method(STRING, "toOctalString", &[INT], |a| {
            Ok(format!("{:o}", a.int(0)? as u32).into())
        })
        .static_method(INT, "bitCount", &[INT], |a| Ok((a.int(0)?.count_ones() as i32).into()))
        .static_method(INT, "reverse", &[INT], |a| Ok(a.int(0)?.reverse_bits().into()))
        .static_method(INT, "signum", &[INT], |a| Ok(a.int(0)?.signum().into()))
        .static_method(INT, "compare", &[INT, INT], |a| {
            Ok((a.int(0)?.cmp(&a.int(1)?) as i32).into())
        })
        .static_method(INT, "sum", &[INT, INT], |a| Ok(a.int(0)?.wrapping_add(a.int(1)?).into()))
        .static_method(INT, "max", &[INT, INT], |a| Ok(a.int(0)?.max(a.int(1)?).into()))
        .static_method(INT, "min", &[INT, INT], |a| Ok(a.int(0)?.min(a.int(1)?).into()))
        .instance_method(INT, "intValue", &[])
        .instance_method(DOUBLE, "doubleValue", &[])
        .instance_method(STRING, "toString", &[])
        .instance_method(INT, "hashCode", &[])
}

fn double() -> TypeDef {
    TypeDef::new("java.lang.Double")
        .field(DOUBLE, "MAX_VALUE")
        .field(DOUBLE, "MIN_VALUE")
        .field(DOUBLE, "NaN")
        .field(DOUBLE, "POSITIVE_INFINITY")
        .field(DOUBLE, "NEGATIVE_INFINITY")
        .field(DOUBLE, "value")
        .static_method(DOUBLE, "parseDouble", &[STRING], |a| Ok(parse_double(a.text(0)?)?.into()))
        .static_method(DOUBLE_BOX, "valueOf", &[DOUBLE], |a| Ok(a.double(0)?.into()))
        .static_method(DOUBLE_BOX, "valueOf", &[STRING], |a| Ok(parse_double(a.text(0)?)?.into()))
        .static_method(STRING, "toString", &[DOUBLE], |a| Ok(double_to_string(a.double(0)?).into()))
        .static_method(BOOLEAN, "isNaN", &[DOUBLE], |a| Ok(a.double(0)?.is_nan().into()))
        .static_method(BOOLEAN, "isInfinite", &[DOUBLE], |a| Ok(a.double(0)?.is_infinite().into()))
        .static_method(BOOLEAN, "isFinite", &[DOUBLE], |a| Ok(a.double(0)?.is_finite().into()))
        .static_method(INT, "compare", &[DOUBLE, DOUBLE], |a| {
            Ok((a.double(0)?.total_cmp(&a.double(1)?) as i32).into())
        })
        .static_method(DOUBLE, "sum", &[DOUBLE, DOUBLE], |a| Ok((a.double(0)? + a.double(1)?).into()))
        .static_method(DOUBLE, "max", &[DOUBLE, DOUBLE], |a| {
            Ok(java_max(a.double(0)?, a.double(1)?).into())
        })
        .static_method(DOUBLE, "min", &[DOUBLE, DOUBLE], |a| {
            Ok(java_min(a.double(0)?, a.double(1)?).into())
        })
        .instance_method(DOUBLE, "doubleValue", &[])
        .instance_method(BOOLEAN, "isNaN", &[])
        .instance_method(STRING, "toString", &[])
}

fn boolean() -> TypeDef {
    TypeDef::new("java.lang.Boolean")
        .field(BOOLEAN_BOX, "TRUE")
        .field(BOOLEAN_BOX, "FALSE")
        .field(BOOLEAN, "value")
        .static_method(BOOLEAN, "parseBoolean", &[STRING], |a| {
            Ok(a.text(0)?.eq_ignore_ascii_case("true").into())
        })
        .static_method(BOOLEAN_BOX, "valueOf", &[STRING], |a| {
            Ok(a.text(0)?.eq_ignore_ascii_case("true").into())
        })
        .instance_method(BOOLEAN, "booleanValue", &[])
}

fn string() -> TypeDef {
    TypeDef::new("java.lang.String")
        .field(TypeRef::Named("byte[]"), "value")
        .field(INT, "hash")
        .field(TypeRef::Named("java.util.Comparator"), "CASE_INSENSITIVE_ORDER")
        .static_method(STRING, "valueOf", &[INT], |a| Ok(a.int(0)?.to_string().into()))
        .static_method(STRING, "valueOf", &[DOUBLE], |a| Ok(double_to_string(a.double(0)?).into()))
        .instance_method(INT, "length", &[])
        .instance_method(BOOLEAN, "isEmpty", &[])
        .instance_method(STRING, "trim", &[])
        .instance_method(STRING, "toUpperCase", &[])
        .instance_method(STRING, "toLowerCase", &[])
        .instance_method(INT, "indexOf", &[STRING])
        .instance_method(STRING, "concat", &[STRING])
}

fn system() -> TypeDef {
    TypeDef::new("java.lang.System")
        .field(TypeRef::Named("java.io.InputStream"), "in")
        .field(TypeRef::Named("java.io.PrintStream"), "out")
        .field(TypeRef::Named("java.io.PrintStream"), "err")
        .static_method(LONG, "currentTimeMillis", &[], |_| {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis();
            Ok((millis as i64).into())
        })
        .static_method(LONG, "nanoTime", &[], |_| {
            static ORIGIN: OnceLock<Instant> = OnceLock::new();
            let elapsed = ORIGIN.get_or_init(Instant::now).elapsed().as_nanos();
            Ok((elapsed as i64).into())
        })
        .static_method(STRING, "lineSeparator", &[], |_| Ok(line_separator().to_string().into()))
        .static_method(STRING, "getProperty", &[STRING], |a| Ok(system_property(a.text(0)?).into()))
}

fn line_separator() -> &'static str {
    if cfg!(windows) {
        "\r\n"
    } else {
        "\n"
    }
}

/// Host properties exposed through `System.getProperty`; anything else is null.
fn system_property(key: &str) -> Option<String> {
    let value = match key {
        "os.name" => std::env::consts::OS,
        "os.arch" => std::env::consts::ARCH,
        "line.separator" => line_separator(),
        "file.separator" => std::path::MAIN_SEPARATOR_STR,
        "path.separator" => {
            if cfg!(windows) {
                ";"
            } else {
                ":"
            }
        }
        _ => return None,
    };
    Some(value.to_string())
}

fn exact(result: Option<i32>) -> Result<Value, Fault> {
    result
        .map(Value::Int)
        .ok_or_else(|| Fault::arithmetic("integer overflow"))
}

fn floor_div(x: i32, y: i32) -> Result<i32, Fault> {
    if y == 0 {
        return Err(Fault::arithmetic("/ by zero"));
    }
    let q = x.wrapping_div(y);
    if x.wrapping_rem(y) != 0 && (x ^ y) < 0 {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn parse_int(text: &str, radix: i32) -> Result<i32, Fault> {
    if !(2..=36).contains(&radix) {
        return Err(Fault::new(
            "NumberFormatException",
            format!("radix {radix} out of range"),
        ));
    }
    i32::from_str_radix(text, radix as u32).map_err(|_| Fault::number_format(text))
}

fn parse_double(text: &str) -> Result<f64, Fault> {
    if text.trim().is_empty() {
        return Err(Fault::new("NumberFormatException", "empty String"));
    }
    value::parse_double(text).ok_or_else(|| Fault::number_format(text))
}

/// Round half up without the `x + 0.5` rounding error.
/// NaN rounds to 0 and out-of-range values saturate, as `as` does.
fn java_round(v: f64) -> i64 {
    let floor = v.floor();
    let rounded = if v - floor >= 0.5 { floor + 1.0 } else { floor };
    rounded as i64
}

fn java_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

fn java_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

/// Render a double the way `Double.toString` does: plain decimal inside
/// `[1e-3, 1e7)`, computerized scientific notation outside it.
pub fn double_to_string(v: f64) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        let text = if v > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if v == 0.0 {
        let text = if v.is_sign_negative() { "-0.0" } else { "0.0" };
        return text.to_string();
    }

    let magnitude = v.abs();
    if (1e-3..1e7).contains(&magnitude) {
        return format!("{v:?}");
    }

    let scientific = format!("{v:E}");
    match scientific.split_once('E') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0E{exponent}")
        }
        _ => scientific,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::catalog::TypeCatalog;
    use crate::engine::error::EngineError;
    use crate::engine::value::{Argument, ValueKind};

    fn call(type_name: &str, method: &str, args: Vec<Argument>) -> Result<Value, EngineError> {
        let registry = registry();
        let ty = registry.resolve_type(type_name)?;
        let kinds: Vec<ValueKind> = args.iter().map(Argument::kind).collect();
        let m = registry.find_static_method(ty, method, &kinds)?;
        registry.invoke_static(m, &args)
    }

    #[test]
    fn math_overloads_resolve_by_kind() {
        assert_eq!(call("java.lang.Math", "abs", vec![Argument::Int(-3)]).unwrap(), Value::Int(3));
        assert_eq!(
            call("java.lang.Math", "abs", vec![Argument::Double(-2.5)]).unwrap(),
            Value::Double(2.5)
        );
        assert_eq!(
            call("java.lang.Math", "max", vec![Argument::Int(4), Argument::Int(9)]).unwrap(),
            Value::Int(9)
        );
    }

    #[test]
    fn round_is_half_up_without_drift() {
        assert_eq!(java_round(0.49999999999999994), 0);
        assert_eq!(java_round(0.5), 1);
        assert_eq!(java_round(-2.5), -2);
        assert_eq!(java_round(-2.6), -3);
        assert_eq!(java_round(f64::NAN), 0);
        assert_eq!(java_round(f64::INFINITY), i64::MAX);
        assert_eq!(
            call("java.lang.Math", "round", vec![Argument::Double(0.49999999999999994)]).unwrap(),
            Value::Long(0)
        );
    }

    #[test]
    fn parse_double_rejects_rust_only_spellings() {
        let parse = |text: &str| call("java.lang.Double", "parseDouble", vec![Argument::Text(text.into())]);
        assert_eq!(parse(" 2.5d ").unwrap(), Value::Double(2.5));
        assert_eq!(parse("-Infinity").unwrap(), Value::Double(f64::NEG_INFINITY));
        for text in ["inf", "nan", "Infinite"] {
            let err = parse(text).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("InvocationFault: NumberFormatException: For input string: \"{text}\"")
            );
        }
    }

    #[test]
    fn abs_of_min_value_wraps() {
        assert_eq!(
            call("java.lang.Math", "abs", vec![Argument::Int(i32::MIN)]).unwrap(),
            Value::Int(i32::MIN)
        );
    }

    #[test]
    fn floor_division_semantics() {
        assert_eq!(floor_div(7, 2).unwrap(), 3);
        assert_eq!(floor_div(-7, 2).unwrap(), -4);
        assert_eq!(floor_div(7, -2).unwrap(), -4);
        assert_eq!(floor_div(i32::MIN, -1).unwrap(), i32::MIN);
        assert_eq!(
            call("java.lang.Math", "floorMod", vec![Argument::Int(-7), Argument::Int(3)]).unwrap(),
            Value::Int(2)
        );
    }

    #[test]
    fn division_by_zero_is_a_fault() {
        let err = call("java.lang.Math", "floorDiv", vec![Argument::Int(1), Argument::Int(0)]).unwrap_err();
        assert_eq!(err, EngineError::Invocation(Fault::arithmetic("/ by zero")));
    }

    #[test]
    fn exact_arithmetic_overflow_is_a_fault() {
        let err = call(
            "java.lang.Math",
            "addExact",
            vec![Argument::Int(i32::MAX), Argument::Int(1)],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "InvocationFault: ArithmeticException: integer overflow");
    }

    #[test]
    fn integer_parsing_and_formatting() {
        assert_eq!(
            call(
                "java.lang.Integer",
                "parseInt",
                vec![Argument::Text("ff".into()), Argument::Int(16)]
            )
            .unwrap(),
            Value::Int(255)
        );
        assert_eq!(
            call("java.lang.Integer", "toBinaryString", vec![Argument::Int(-1)]).unwrap(),
            Value::Text("1".repeat(32))
        );
        let err = call("java.lang.Integer", "parseInt", vec![Argument::Text("abc".into())]).unwrap_err();
        assert_eq!(
            err,
            EngineError::Invocation(Fault::number_format("abc"))
        );
        let err = call(
            "java.lang.Integer",
            "parseInt",
            vec![Argument::Text("1".into()), Argument::Int(99)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("radix 99 out of range"));
    }

    #[test]
    fn instance_members_are_declared_but_not_invokable() {
        let err = call("java.lang.String", "length", vec![]).unwrap_err();
        assert!(matches!(err, EngineError::NotStatic { .. }));
    }

    #[test]
    fn double_to_string_matches_java_formatting() {
        assert_eq!(double_to_string(3.0), "3.0");
        assert_eq!(double_to_string(0.001), "0.001");
        assert_eq!(double_to_string(1e7), "1.0E7");
        assert_eq!(double_to_string(-1.5e-5), "-1.5E-5");
        assert_eq!(double_to_string(f64::NAN), "NaN");
        assert_eq!(double_to_string(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(double_to_string(-0.0), "-0.0");
    }

    #[test]
    fn unknown_system_property_is_null() {
        assert_eq!(
            call("java.lang.System", "getProperty", vec![Argument::Text("user.password".into())]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn math_declares_members_in_order() {
        let registry = registry();
        let math = registry.resolve_type("java.lang.Math").unwrap();
        let fields: Vec<String> = math.fields().iter().map(ToString::to_string).collect();
        assert_eq!(fields, vec!["double E", "double PI"]);
        assert_eq!(math.methods()[0].to_string(), "int abs(int)");
        assert_eq!(math.methods()[2].to_string(), "int max(int, int)");
    }
}
