use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 文档字段集合
///
/// 集合是无模式的，每个文档就是一组 JSON 字段
pub type Fields = serde_json::Map<String, Value>;

/// 带 id 的文档
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// 文档 id
    pub id: String,

    /// 字段内容
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// 读取单个字段
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// 读取字符串字段
    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_str())
    }

    /// 反序列化为具体类型
    pub fn deserialize<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }
}

/// 单字段查询条件
///
/// 只支持单字段的等值和范围比较，复合过滤由调用方在内存中完成
#[derive(Debug, Clone)]
pub enum Filter {
    /// 字段等于
    Eq(String, Value),
    /// 字段大于等于
    Ge(String, Value),
    /// 字段大于
    Gt(String, Value),
    /// 字段小于等于
    Le(String, Value),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ge(field.into(), value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Le(field.into(), value.into())
    }

    /// 判断字段集合是否匹配
    pub fn matches(&self, fields: &Fields) -> bool {
        match self {
            Filter::Eq(field, value) => fields.get(field) == Some(value),
            Filter::Ge(field, value) => {
                compare(fields.get(field), value).is_some_and(|o| o.is_ge())
            }
            Filter::Gt(field, value) => {
                compare(fields.get(field), value).is_some_and(|o| o.is_gt())
            }
            Filter::Le(field, value) => {
                compare(fields.get(field), value).is_some_and(|o| o.is_le())
            }
        }
    }
}

/// 数值按 f64 比较，字符串按字典序比较（ISO 时间串天然有序）
/// 类型不一致或缺失视为不匹配
fn compare(actual: Option<&Value>, expected: &Value) -> Option<std::cmp::Ordering> {
    match (actual?, expected) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => None,
    }
}
