//! Shape validation for create requests.
//!
//! Works on raw JSON rather than a derived `Deserialize` so that every
//! offending field is reported at once, each with its location in the
//! payload. Nothing here touches storage.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{NewStep, NewWorkInstruction, OrderKey};

/// One segment of a field location: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Loc {
    Field(String),
    Index(usize),
}

impl From<&str> for Loc {
    fn from(s: &str) -> Self {
        Loc::Field(s.to_string())
    }
}

impl From<usize> for Loc {
    fn from(i: usize) -> Self {
        Loc::Index(i)
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Loc::Field(name) => write!(f, "{name}"),
            Loc::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Category of a field error, reported as `type` in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Missing,
    StringType,
    ListType,
    DictType,
    IntType,
    IntFromFloat,
    IntParsing,
    IntParsingSize,
    GreaterThanEqual,
    JsonInvalid,
}

impl ErrorKind {
    fn message(self) -> &'static str {
        match self {
            ErrorKind::Missing => "Field required",
            ErrorKind::StringType => "Input should be a valid string",
            ErrorKind::ListType => "Input should be a valid list",
            ErrorKind::DictType => "Input should be a valid dictionary",
            ErrorKind::IntType => "Input should be a valid integer",
            ErrorKind::IntFromFloat => {
                "Input should be a valid integer, got a number with a fractional part"
            }
            ErrorKind::IntParsing => {
                "Input should be a valid integer, unable to parse string as an integer"
            }
            ErrorKind::IntParsingSize => {
                "Unable to parse input string as an integer, exceeded maximum size"
            }
            ErrorKind::GreaterThanEqual => "Input should be greater than or equal to 0",
            ErrorKind::JsonInvalid => "Invalid JSON",
        }
    }
}

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub loc: Vec<Loc>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
}

impl FieldError {
    fn new(loc: Vec<Loc>, kind: ErrorKind) -> Self {
        Self {
            loc,
            msg: kind.message().to_string(),
            kind,
        }
    }
}

/// All field errors found in one payload. Never empty when returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    pub fn kinds_at(&self, loc: &[Loc]) -> Vec<ErrorKind> {
        self.0
            .iter()
            .filter(|e| e.loc == loc)
            .map(|e| e.kind)
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            let path: Vec<String> = err.loc.iter().map(ToString::to_string).collect();
            write!(f, "{}: {}", path.join("."), err.msg)?;
        }
        Ok(())
    }
}

/// Collects errors while walking a payload.
struct Collector {
    errors: Vec<FieldError>,
}

impl Collector {
    fn push(&mut self, loc: Vec<Loc>, kind: ErrorKind) {
        self.errors.push(FieldError::new(loc, kind));
    }

    fn required_string(&mut self, obj: &Map<String, Value>, base: &[Loc], key: &str) -> Option<String> {
        let loc = at(base, key);
        match obj.get(key) {
            None => {
                self.push(loc, ErrorKind::Missing);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(loc, ErrorKind::StringType);
                None
            }
        }
    }

    fn optional_string(&mut self, obj: &Map<String, Value>, base: &[Loc], key: &str) -> Option<String> {
        match obj.get(key) {
            None => Some(String::new()),
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.push(at(base, key), ErrorKind::StringType);
                None
            }
        }
    }

    fn required_order(&mut self, obj: &Map<String, Value>, base: &[Loc]) -> Option<OrderKey> {
        let loc = at(base, "order");
        let Some(value) = obj.get("order") else {
            self.push(loc, ErrorKind::Missing);
            return None;
        };
        match non_negative_int(value) {
            Ok(order) => Some(order),
            Err(kind) => {
                self.push(loc, kind);
                None
            }
        }
    }
}

fn at(base: &[Loc], segment: impl Into<Loc>) -> Vec<Loc> {
    let mut loc = base.to_vec();
    loc.push(segment.into());
    loc
}

/// Longest integer accepted, in decimal digits.
const MAX_ORDER_DIGITS: usize = 4300;

/// Lax integer coercion for `order`.
///
/// Accepts integers of any size, integer-valued numbers (`3.0`, `1e20`),
/// integer strings (`"2"`, `" 7 "`, `"4.00"`) and booleans. Negative
/// values fail the `>= 0` bound.
fn non_negative_int(value: &Value) -> std::result::Result<OrderKey, ErrorKind> {
    let (negative, digits) = match value {
        Value::Bool(b) => return Ok(OrderKey::from(u64::from(*b))),
        Value::Number(n) => match n.as_u64() {
            Some(u) => return Ok(OrderKey::from(u)),
            None => number_digits(&n.to_string())?,
        },
        Value::String(s) => string_digits(s)?,
        _ => return Err(ErrorKind::IntType),
    };
    let key = OrderKey::from_digits(&digits).ok_or(ErrorKind::IntType)?;
    if negative && !key.is_zero() {
        return Err(ErrorKind::GreaterThanEqual);
    }
    Ok(key)
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

/// Integer digits of a JSON number literal such as `-12`, `3.0` or `1.5e3`.
fn number_digits(literal: &str) -> std::result::Result<(bool, String), ErrorKind> {
    let (negative, unsigned) = split_sign(literal);
    let (mantissa, exponent) = match unsigned.split_once(['e', 'E']) {
        Some((mantissa, exp)) => (mantissa, exp.parse::<i64>().map_err(|_| ErrorKind::IntType)?),
        None => (unsigned, 0),
    };
    let (whole, fraction) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if whole.is_empty() || !all_digits(whole) || !all_digits(fraction) {
        return Err(ErrorKind::IntType);
    }

    let digits = format!("{whole}{fraction}");
    let significant = digits.trim_end_matches('0').len();
    if significant == 0 {
        return Ok((negative, "0".to_string()));
    }
    let leading = digits.len() - digits.trim_start_matches('0').len();
    // Digits left of the decimal point once the exponent is applied.
    let point = (whole.len() as i64)
        .checked_add(exponent)
        .ok_or(ErrorKind::IntType)?;
    if point < significant as i64 {
        return Err(ErrorKind::IntFromFloat);
    }
    if point - leading as i64 > MAX_ORDER_DIGITS as i64 {
        return Err(ErrorKind::IntType);
    }

    let point = point as usize;
    let mut integer = digits[..significant].to_string();
    integer.push_str(&"0".repeat(point - significant));
    Ok((negative, integer))
}

/// Integer digits of a string such as `"2"`, `" -4 "` or `"7.000"`.
fn string_digits(s: &str) -> std::result::Result<(bool, String), ErrorKind> {
    let (negative, unsigned) = split_sign(s.trim());
    let whole = match unsigned.split_once('.') {
        Some((whole, zeros)) if zeros.bytes().all(|b| b == b'0') => whole,
        Some(_) => return Err(ErrorKind::IntParsing),
        None => unsigned,
    };
    if whole.is_empty() || !all_digits(whole) {
        return Err(ErrorKind::IntParsing);
    }
    if whole.trim_start_matches('0').len() > MAX_ORDER_DIGITS {
        return Err(ErrorKind::IntParsingSize);
    }
    Ok((negative, whole.to_string()))
}

/// Parse and validate a raw request body.
pub fn parse_new_instruction(body: &[u8]) -> std::result::Result<NewWorkInstruction, ValidationErrors> {
    let value: Value = serde_json::from_slice(body).map_err(|e| {
        ValidationErrors(vec![FieldError {
            loc: vec![Loc::from("body")],
            msg: format!("{}: {e}", ErrorKind::JsonInvalid.message()),
            kind: ErrorKind::JsonInvalid,
        }])
    })?;
    validate_new_instruction(&value)
}

/// Validate an already-decoded payload.
pub fn validate_new_instruction(
    value: &Value,
) -> std::result::Result<NewWorkInstruction, ValidationErrors> {
    let root = vec![Loc::from("body")];
    let mut c = Collector { errors: Vec::new() };

    let Value::Object(obj) = value else {
        c.push(root, ErrorKind::DictType);
        return Err(ValidationErrors(c.errors));
    };

    let title = c.required_string(obj, &root, "title");

    let mut steps = Vec::new();
    match obj.get("steps") {
        None => {}
        Some(Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                let base = at(&at(&root, "steps"), index);
                let Value::Object(step) = item else {
                    c.push(base, ErrorKind::DictType);
                    continue;
                };
                let step_title = c.required_string(step, &base, "title");
                let description = c.optional_string(step, &base, "description");
                let order = c.required_order(step, &base);
                if let (Some(title), Some(description), Some(order)) = (step_title, description, order) {
                    steps.push(NewStep {
                        title,
                        description,
                        order,
                    });
                }
            }
        }
        Some(_) => c.push(at(&root, "steps"), ErrorKind::ListType),
    }

    match title {
        Some(title) if c.errors.is_empty() => Ok(NewWorkInstruction { title, steps }),
        _ => Err(ValidationErrors(c.errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loc(parts: &[Loc]) -> Vec<Loc> {
        parts.to_vec()
    }

    fn body() -> Loc {
        Loc::from("body")
    }

    #[test]
    fn accepts_minimal_payload() {
        let new = validate_new_instruction(&json!({"title": "Assemble"})).unwrap();
        assert_eq!(new.title, "Assemble");
        assert!(new.steps.is_empty());
    }

    #[test]
    fn accepts_empty_title() {
        let new = validate_new_instruction(&json!({"title": "", "steps": []})).unwrap();
        assert_eq!(new.title, "");
    }

    #[test]
    fn keeps_steps_in_input_order_without_normalizing() {
        let new = validate_new_instruction(&json!({
            "title": "t",
            "steps": [
                {"title": "B", "order": 5},
                {"title": "A", "description": "first", "order": 2}
            ]
        }))
        .unwrap();
        assert_eq!(new.steps[0], NewStep::new("B", 5u64));
        assert_eq!(new.steps[1], NewStep::new("A", 2u64).description("first"));
    }

    #[test]
    fn integer_valued_float_is_accepted() {
        let new = validate_new_instruction(&json!({
            "title": "t",
            "steps": [{"title": "a", "order": 3.0}]
        }))
        .unwrap();
        assert_eq!(new.steps[0].order, OrderKey::from(3));
    }

    fn order_of(raw: &[u8]) -> std::result::Result<OrderKey, ValidationErrors> {
        let mut body = br#"{"title":"t","steps":[{"title":"a","order":"#.to_vec();
        body.extend_from_slice(raw);
        body.extend_from_slice(b"}]}");
        parse_new_instruction(&body).map(|new| new.steps[0].order.clone())
    }

    fn order_error(raw: &[u8]) -> Vec<ErrorKind> {
        order_of(raw)
            .unwrap_err()
            .kinds_at(&loc(&[body(), "steps".into(), 0.into(), "order".into()]))
    }

    #[test]
    fn integers_beyond_u64_are_accepted() {
        let order = order_of(b"100000000000000000000").unwrap();
        assert_eq!(order.digits(), "100000000000000000000");
        assert_eq!(
            order_of(b"123456789012345678901234567890").unwrap().digits(),
            "123456789012345678901234567890"
        );
    }

    #[test]
    fn exponent_forms_expand_to_integers() {
        assert_eq!(order_of(b"1e20").unwrap().digits(), "100000000000000000000");
        assert_eq!(order_of(b"1.5E3").unwrap(), OrderKey::from(1500));
        assert_eq!(order_of(b"2500e-2").unwrap(), OrderKey::from(25));
        assert_eq!(order_of(b"0.0").unwrap(), OrderKey::from(0));
        assert_eq!(order_of(b"-0").unwrap(), OrderKey::from(0));
    }

    #[test]
    fn huge_orders_keep_their_relative_position() {
        let new = parse_new_instruction(
            br#"{"title":"t","steps":[
                {"title":"last","order":100000000000000000001},
                {"title":"middle","order":100000000000000000000},
                {"title":"first","order":18446744073709551615}
            ]}"#,
        )
        .unwrap();
        let mut orders: Vec<_> = new
            .steps
            .iter()
            .map(|s| (s.order.clone(), s.title.as_str()))
            .collect();
        orders.sort();
        let titles: Vec<&str> = orders.into_iter().map(|(_, t)| t).collect();
        assert_eq!(titles, ["first", "middle", "last"]);
    }

    #[test]
    fn integer_strings_and_booleans_are_coerced() {
        assert_eq!(order_of(br#""2""#).unwrap(), OrderKey::from(2));
        assert_eq!(order_of(br#"" 7 ""#).unwrap(), OrderKey::from(7));
        assert_eq!(order_of(br#""4.00""#).unwrap(), OrderKey::from(4));
        assert_eq!(
            order_of(br#""100000000000000000000""#).unwrap().digits(),
            "100000000000000000000"
        );
        assert_eq!(order_of(b"true").unwrap(), OrderKey::from(1));
        assert_eq!(order_of(b"false").unwrap(), OrderKey::from(0));
    }

    #[test]
    fn negative_values_fail_the_bound_in_every_form() {
        assert_eq!(order_error(b"-100000000000000000000"), [ErrorKind::GreaterThanEqual]);
        assert_eq!(order_error(b"-1e20"), [ErrorKind::GreaterThanEqual]);
        assert_eq!(order_error(br#""-2""#), [ErrorKind::GreaterThanEqual]);
    }

    #[test]
    fn non_integer_orders_are_rejected_by_kind() {
        assert_eq!(order_error(b"1.5"), [ErrorKind::IntFromFloat]);
        assert_eq!(order_error(b"1e-3"), [ErrorKind::IntFromFloat]);
        assert_eq!(order_error(br#""2.5""#), [ErrorKind::IntParsing]);
        assert_eq!(order_error(br#""two""#), [ErrorKind::IntParsing]);
        assert_eq!(order_error(br#""""#), [ErrorKind::IntParsing]);
        assert_eq!(order_error(b"null"), [ErrorKind::IntType]);
        assert_eq!(order_error(b"[1]"), [ErrorKind::IntType]);
    }

    #[test]
    fn number_literals_past_the_digit_limit_are_rejected() {
        assert_eq!(number_digits("1e5000"), Err(ErrorKind::IntType));
        assert_eq!(number_digits("12e3"), Ok((false, "12000".to_string())));
    }

    #[test]
    fn oversized_integer_strings_are_rejected() {
        let digits = format!("\"{}\"", "9".repeat(MAX_ORDER_DIGITS + 1));
        assert_eq!(order_error(digits.as_bytes()), [ErrorKind::IntParsingSize]);
    }

    #[test]
    fn missing_title_is_reported() {
        let err = validate_new_instruction(&json!({"steps": []})).unwrap_err();
        assert_eq!(err.kinds_at(&loc(&[body(), "title".into()])), [ErrorKind::Missing]);
    }

    #[test]
    fn non_string_title_is_reported() {
        let err = validate_new_instruction(&json!({"title": 7})).unwrap_err();
        assert_eq!(err.kinds_at(&loc(&[body(), "title".into()])), [ErrorKind::StringType]);
    }

    #[test]
    fn negative_order_is_reported() {
        let err = validate_new_instruction(&json!({
            "title": "t",
            "steps": [{"title": "a", "order": -1}]
        }))
        .unwrap_err();
        assert_eq!(
            err.kinds_at(&loc(&[body(), "steps".into(), 0.into(), "order".into()])),
            [ErrorKind::GreaterThanEqual]
        );
    }

    #[test]
    fn missing_order_is_reported() {
        let err = validate_new_instruction(&json!({
            "title": "t",
            "steps": [{"title": "a"}]
        }))
        .unwrap_err();
        assert_eq!(
            err.kinds_at(&loc(&[body(), "steps".into(), 0.into(), "order".into()])),
            [ErrorKind::Missing]
        );
    }

    #[test]
    fn fractional_and_unparseable_orders_are_rejected() {
        let err = validate_new_instruction(&json!({
            "title": "t",
            "steps": [{"title": "a", "order": 1.5}, {"title": "b", "order": "second"}]
        }))
        .unwrap_err();
        assert_eq!(
            err.kinds_at(&loc(&[body(), "steps".into(), 0.into(), "order".into()])),
            [ErrorKind::IntFromFloat]
        );
        assert_eq!(
            err.kinds_at(&loc(&[body(), "steps".into(), 1.into(), "order".into()])),
            [ErrorKind::IntParsing]
        );
    }

    #[test]
    fn reports_every_offending_field() {
        let err = validate_new_instruction(&json!({
            "steps": [
                {"order": -3},
                "not a step",
                {"title": "ok", "description": null, "order": 0}
            ]
        }))
        .unwrap_err();
        assert_eq!(err.errors().len(), 5);
        assert_eq!(
            err.kinds_at(&loc(&[body(), "steps".into(), 1.into()])),
            [ErrorKind::DictType]
        );
        assert_eq!(
            err.kinds_at(&loc(&[body(), "steps".into(), 2.into(), "description".into()])),
            [ErrorKind::StringType]
        );
    }

    #[test]
    fn steps_must_be_a_list() {
        let err = validate_new_instruction(&json!({"title": "t", "steps": {}})).unwrap_err();
        assert_eq!(err.kinds_at(&loc(&[body(), "steps".into()])), [ErrorKind::ListType]);
    }

    #[test]
    fn non_object_body_is_reported_at_root() {
        let err = validate_new_instruction(&json!([1, 2])).unwrap_err();
        assert_eq!(err.kinds_at(&loc(&[body()])), [ErrorKind::DictType]);
    }

    #[test]
    fn invalid_json_is_reported_at_root() {
        let err = parse_new_instruction(b"{not json").unwrap_err();
        assert_eq!(err.kinds_at(&loc(&[body()])), [ErrorKind::JsonInvalid]);
    }

    #[test]
    fn serializes_with_type_field() {
        let err = validate_new_instruction(&json!({})).unwrap_err();
        let json = serde_json::to_value(err.errors()).unwrap();
        assert_eq!(
            json,
            json!([{"loc": ["body", "title"], "msg": "Field required", "type": "missing"}])
        );
    }
}
