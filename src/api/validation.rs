//! Field-level request validation.
//!
//! DTOs declare their rules with `#[derive(Validate)]`; [`RequestValidator`]
//! runs them and flattens the result into client-addressable [`Violation`]s.
//! The domain format rules (phone, ID card, password strength, ...) are
//! `validate_*` functions referenced from `#[validate(custom(function = "..."))]`.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequest, Request},
    Json,
};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::ApiError;

/// A single failed rule on a single field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }
}

/// Runs declarative DTO rules and fills in messages for rules that declare none
#[derive(Debug, Clone)]
pub struct RequestValidator {
    messages: HashMap<&'static str, &'static str>,
    fallback: &'static str,
}

impl Default for RequestValidator {
    fn default() -> Self {
        let messages = HashMap::from([
            ("required", "该字段为必填项"),
            ("length", "长度不符合要求"),
            ("range", "数值超出允许范围"),
            ("email", "邮箱格式不正确"),
            ("phone", "手机号格式不正确"),
            ("id_card", "身份证号格式不正确"),
            ("password", "密码至少8位，且必须包含大写字母、小写字母和数字"),
            ("one_of", "取值不在允许范围内"),
            ("non_negative", "金额不能为负数"),
            ("positive", "数值必须大于0"),
            ("date_order", "结束日期不能早于开始日期"),
        ]);
        Self {
            messages,
            fallback: "字段校验失败",
        }
    }
}

impl RequestValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate `request`; an empty result means the request may proceed
    pub fn validate<T: Validate>(&self, request: &T) -> Vec<Violation> {
        match request.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => self.violations(&errors),
        }
    }

    /// Flatten nested validation errors, sorted by field then rule
    pub fn violations(&self, errors: &ValidationErrors) -> Vec<Violation> {
        let mut out = Vec::new();
        self.collect(errors, None, &mut out);
        out.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.rule.cmp(&b.rule)));
        out
    }

    fn collect(&self, errors: &ValidationErrors, prefix: Option<&str>, out: &mut Vec<Violation>) {
        for (field, kind) in errors.errors() {
            let path = join(prefix, &field.to_string());
            match kind {
                ValidationErrorsKind::Field(list) => {
                    for error in list {
                        // Struct-level rules name the field they belong to
                        let target = match (field.to_string() == SCHEMA_KEY, error.params.get("field")) {
                            (true, Some(Value::String(name))) => join(prefix, name),
                            _ => path.clone(),
                        };
                        out.push(self.violation(&target, error));
                    }
                }
                ValidationErrorsKind::Struct(nested) => self.collect(nested, Some(&path), out),
                ValidationErrorsKind::List(items) => {
                    for (index, nested) in items {
                        self.collect(nested, Some(&format!("{}[{}]", path, index)), out);
                    }
                }
            }
        }
    }

    fn violation(&self, field: &str, error: &ValidationError) -> Violation {
        let rule = error.code.to_string();
        let message = match &error.message {
            Some(message) => message.to_string(),
            None => self.messages.get(rule.as_str()).copied().unwrap_or(self.fallback).to_string(),
        };
        Violation {
            field: field.to_string(),
            rule,
            message,
        }
    }
}

/// Key `validator` files `schema(...)` failures under
const SCHEMA_KEY: &str = "__all__";

fn join(prefix: Option<&str>, field: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}.{}", prefix, field),
        None => field.to_string(),
    }
}

/// JSON body that has been deserialized and validated
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Arc<RequestValidator>: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        let validator = Arc::<RequestValidator>::from_ref(state);
        let violations = validator.validate(&value);
        if !violations.is_empty() {
            return Err(ApiError::validation(violations));
        }

        Ok(ValidatedJson(value))
    }
}

fn rule(code: &'static str) -> ValidationError {
    ValidationError::new(code)
}

/// Mainland mobile number: 11 digits starting with `1[3-9]`
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let bytes = value.as_bytes();
    let valid = bytes.len() == 11
        && bytes.iter().all(u8::is_ascii_digit)
        && bytes[0] == b'1'
        && (b'3'..=b'9').contains(&bytes[1]);
    if valid {
        Ok(())
    } else {
        Err(rule("phone"))
    }
}

/// 18-character resident identity number with its ISO 7064 MOD 11-2 check digit
pub fn validate_id_card(value: &str) -> Result<(), ValidationError> {
    const WEIGHTS: [u32; 17] = [7, 9, 10, 5, 8, 4, 2, 1, 6, 3, 7, 9, 10, 5, 8, 4, 2];
    const CHECKS: [char; 11] = ['1', '0', 'X', '9', '8', '7', '6', '5', '4', '3', '2'];

    let chars: Vec<char> = value.chars().collect();
    if chars.len() != 18 {
        return Err(rule("id_card"));
    }

    let mut sum = 0;
    for (c, weight) in chars.iter().take(17).zip(WEIGHTS) {
        match c.to_digit(10) {
            Some(d) => sum += d * weight,
            None => return Err(rule("id_card")),
        }
    }

    let expected = CHECKS[(sum % 11) as usize];
    if chars[17].to_ascii_uppercase() == expected {
        Ok(())
    } else {
        Err(rule("id_card"))
    }
}

/// At least 8 characters with an upper-case letter, a lower-case letter and a digit
pub fn validate_password(value: &str) -> Result<(), ValidationError> {
    let strong = value.chars().count() >= 8
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_digit());
    if strong {
        Ok(())
    } else {
        Err(rule("password"))
    }
}

pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(rule("non_negative"))
    } else {
        Ok(())
    }
}

pub fn validate_positive(value: &Decimal) -> Result<(), ValidationError> {
    if *value > Decimal::ZERO {
        Ok(())
    } else {
        Err(rule("positive"))
    }
}

/// Minimum item count for a list field that also carries `nested` rules.
///
/// Call it from a struct-level `schema` function: a field-level `length` next
/// to `nested` makes `validator` panic once both fail. The failure is reported
/// against `field`, not `__all__`.
pub fn min_items<T>(items: &[T], min: usize, field: &'static str, message: &'static str) -> Result<(), ValidationError> {
    if items.len() >= min {
        return Ok(());
    }
    let mut error = rule("length");
    error.message = Some(message.into());
    error.add_param("field".into(), &field);
    error.add_param("min".into(), &min);
    Err(error)
}

/// Enumeration membership; wrap per field with the allowed set
pub fn one_of(value: &str, allowed: &[&str]) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        let mut error = rule("one_of");
        error.add_param("allowed".into(), &allowed);
        Err(error)
    }
}

/// Record status shared by master-data entities
pub fn validate_record_status(value: &str) -> Result<(), ValidationError> {
    one_of(value, &["active", "inactive"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct SignupForm {
        #[validate(required, length(min = 3, max = 32))]
        username: Option<String>,
        #[validate(required, email)]
        email: Option<String>,
        #[validate(required, custom(function = "validate_password"))]
        password: Option<String>,
        #[validate(custom(function = "validate_phone"))]
        phone: Option<String>,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Line {
        #[validate(range(min = 1))]
        account_id: u64,
    }

    #[derive(Debug, Deserialize, Validate)]
    #[validate(schema(function = "voucher_items", skip_on_field_errors = false))]
    struct Voucher {
        #[validate(nested)]
        items: Vec<Line>,
    }

    fn voucher_items(voucher: &Voucher) -> Result<(), ValidationError> {
        min_items(&voucher.items, 2, "items", "至少两条")
    }

    fn form(value: serde_json::Value) -> SignupForm {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn valid_request_has_no_violations() {
        let request = form(serde_json::json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "Secret123",
            "phone": "13800138000"
        }));
        assert!(RequestValidator::new().validate(&request).is_empty());
    }

    #[test]
    fn one_violation_per_missing_required_field() {
        let violations = RequestValidator::new().validate(&form(serde_json::json!({})));
        let fields: Vec<&str> = violations.iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["email", "password", "username"]);
        assert!(violations.iter().all(|v| v.rule == "required"));
        assert!(violations.iter().all(|v| v.message == "该字段为必填项"));
    }

    #[test]
    fn format_rules_report_their_codes() {
        let violations = RequestValidator::new().validate(&form(serde_json::json!({
            "username": "al",
            "email": "nope",
            "password": "password",
            "phone": "12345"
        })));
        let rules: Vec<(&str, &str)> = violations.iter().map(|v| (v.field.as_str(), v.rule.as_str())).collect();
        assert_eq!(
            rules,
            vec![("email", "email"), ("password", "password"), ("phone", "phone"), ("username", "length")]
        );
    }

    #[test]
    fn nested_items_are_indexed() {
        let voucher = Voucher {
            items: vec![Line { account_id: 1 }, Line { account_id: 0 }],
        };
        let violations = RequestValidator::new().validate(&voucher);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, "items[1].account_id");
        assert_eq!(violations[0].rule, "range");
    }

    #[test]
    fn short_list_with_a_bad_item_reports_both() {
        let voucher = Voucher {
            items: vec![Line { account_id: 0 }],
        };
        let violations = RequestValidator::new().validate(&voucher);
        let got: Vec<(&str, &str, &str)> = violations
            .iter()
            .map(|v| (v.field.as_str(), v.rule.as_str(), v.message.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![("items", "length", "至少两条"), ("items[0].account_id", "range", "数值超出允许范围")]
        );
    }

    #[test]
    fn empty_list_reports_only_the_count() {
        let violations = RequestValidator::new().validate(&Voucher { items: vec![] });
        assert_eq!(violations, vec![Violation::new("items", "length", "至少两条")]);
    }

    #[test]
    fn phone_rule() {
        assert!(validate_phone("13912345678").is_ok());
        assert!(validate_phone("12912345678").is_err());
        assert!(validate_phone("1391234567").is_err());
        assert!(validate_phone("1391234567a").is_err());
    }

    #[test]
    fn id_card_rule() {
        assert!(validate_id_card("11010519491231002X").is_ok());
        assert!(validate_id_card("11010519491231002x").is_ok());
        assert!(validate_id_card("110105194912310021").is_err());
        assert!(validate_id_card("1101051949123100").is_err());
    }

    #[test]
    fn password_rule() {
        assert!(validate_password("Abcdefg1").is_ok());
        assert!(validate_password("abcdefg1").is_err());
        assert!(validate_password("ABCDEFG1").is_err());
        assert!(validate_password("Abcdefgh").is_err());
        assert!(validate_password("Abc1").is_err());
    }

    #[test]
    fn decimal_rules() {
        assert!(validate_non_negative(&Decimal::ZERO).is_ok());
        assert!(validate_non_negative(&Decimal::new(-1, 2)).is_err());
        assert!(validate_positive(&Decimal::ZERO).is_err());
        assert!(validate_positive(&Decimal::new(5, 1)).is_ok());
    }
}
