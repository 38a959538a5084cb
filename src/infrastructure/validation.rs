//! 输入验证模块
//! 按字段收集错误：字段名 → 错误消息列表

use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// 请求体级别错误使用的键
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

pub const MSG_REQUIRED: &str = "This field is required.";
pub const MSG_BLANK: &str = "This field may not be blank.";
pub const MSG_NOT_STRING: &str = "Not a valid string.";
pub const MSG_NOT_INTEGER: &str = "A valid integer is required.";
pub const MSG_NEGATIVE: &str = "Ensure this value is greater than or equal to 0.";

/// 字段错误映射，键有序便于稳定输出
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单条请求体级别错误
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD_ERRORS, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

/// 每种请求类型声明自己的字段集合并实现验证
pub trait ValidateRequest: Sized {
    fn validate(body: &Map<String, Value>) -> Result<Self, FieldErrors>;
}

/// 从 JSON 对象中逐字段读取，错误累积到 `FieldErrors`
///
/// 读取失败时返回占位值；调用方必须以 `finish()` 结束，
/// 有任何错误时占位值不会被使用。
pub struct FieldReader<'a> {
    body: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(body: &'a Map<String, Value>) -> Self {
        Self {
            body,
            errors: FieldErrors::new(),
        }
    }

    fn present(&mut self, field: &str) -> Option<&'a Value> {
        match self.body.get(field) {
            None | Some(Value::Null) => {
                self.errors.add(field, MSG_REQUIRED);
                None
            }
            Some(value) => Some(value),
        }
    }

    /// 必填字符串：去除首尾空白，不能为空，不能超过 `max_len` 个字符
    pub fn string(&mut self, field: &str, max_len: usize) -> String {
        let Some(value) = self.present(field) else {
            return String::new();
        };
        let Some(raw) = value.as_str() else {
            self.errors.add(field, MSG_NOT_STRING);
            return String::new();
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            self.errors.add(field, MSG_BLANK);
            return String::new();
        }
        if trimmed.chars().count() > max_len {
            self.errors.add(
                field,
                format!("Ensure this field has no more than {} characters.", max_len),
            );
            return String::new();
        }
        trimmed.to_string()
    }

    /// 必填非负整数索引，接受 JSON 整数、小数部分为零的数值或对应的字符串
    pub fn index(&mut self, field: &str) -> u32 {
        let Some(value) = self.present(field) else {
            return 0;
        };
        let parsed = match value {
            Value::Number(n) => n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from))
                .or_else(|| n.as_f64().and_then(integral_float)),
            Value::String(s) => parse_integer_text(s.trim()),
            _ => None,
        };
        let Some(n) = parsed else {
            self.errors.add(field, MSG_NOT_INTEGER);
            return 0;
        };
        if n < 0 {
            self.errors.add(field, MSG_NEGATIVE);
            return 0;
        }
        match u32::try_from(n) {
            Ok(index) => index,
            Err(_) => {
                self.errors.add(
                    field,
                    format!("Ensure this value is less than or equal to {}.", u32::MAX),
                );
                0
            }
        }
    }

    /// 必填枚举字段，`FromStr` 的错误文本即错误消息
    pub fn choice<T>(&mut self, field: &str) -> Option<T>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let value = self.present(field)?;
        let Some(raw) = value.as_str() else {
            self.errors.add(field, MSG_NOT_STRING);
            return None;
        };
        match raw.parse::<T>() {
            Ok(choice) => Some(choice),
            Err(e) => {
                self.errors.add(field, e.to_string());
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), FieldErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// 小数部分为零的浮点数视为整数（如 `3.0`）
fn integral_float(f: f64) -> Option<i128> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 1e30).then(|| f as i128)
}

/// 整数文本，允许 `"3.0"` / `"3."` 这类全零小数部分
fn parse_integer_text(text: &str) -> Option<i128> {
    let digits = match text.split_once('.') {
        Some((int, frac)) if frac.bytes().all(|b| b == b'0') => int,
        Some(_) => return None,
        None => text,
    };
    digits.parse::<i128>().ok()
}

/// JSON 值类型名称，用于请求体错误消息
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
