use serde_json::{Map, Number, Value};

/// A single payload field value. Payload fields are flat: strings, numbers
/// or booleans.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    String(String),
    Number(Number),
    Bool(bool),
}

impl From<&str> for PayloadValue {
    fn from(value: &str) -> Self {
        PayloadValue::String(value.into())
    }
}

impl From<String> for PayloadValue {
    fn from(value: String) -> Self {
        PayloadValue::String(value)
    }
}

impl From<&String> for PayloadValue {
    fn from(value: &String) -> Self {
        PayloadValue::String(value.clone())
    }
}

impl From<bool> for PayloadValue {
    fn from(value: bool) -> Self {
        PayloadValue::Bool(value)
    }
}

impl From<i64> for PayloadValue {
    fn from(value: i64) -> Self {
        PayloadValue::Number(value.into())
    }
}

impl From<i32> for PayloadValue {
    fn from(value: i32) -> Self {
        PayloadValue::Number(value.into())
    }
}

impl From<u32> for PayloadValue {
    fn from(value: u32) -> Self {
        PayloadValue::Number(value.into())
    }
}

impl From<u64> for PayloadValue {
    fn from(value: u64) -> Self {
        PayloadValue::Number(value.into())
    }
}

impl From<PayloadValue> for Value {
    fn from(value: PayloadValue) -> Self {
        match value {
            PayloadValue::String(s) => Value::String(s),
            PayloadValue::Number(n) => Value::Number(n),
            PayloadValue::Bool(b) => Value::Bool(b),
        }
    }
}

/// A flat JSON request body. Field order is the order fields were added.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Payload {
    fields: Map<String, Value>,
}

impl Payload {
    pub fn builder() -> PayloadBuilder {
        PayloadBuilder::new()
    }

    pub fn from_fields<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<PayloadValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        fields
            .into_iter()
            .fold(PayloadBuilder::new(), |builder, (key, value)| {
                builder.field(key, value)
            })
            .build()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    pub fn to_json_string(&self) -> String {
        // a map of strings to JSON values always serializes
        serde_json::to_string(&self.fields).unwrap_or_else(|_| String::from("{}"))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PayloadBuilder {
    fields: Map<String, Value>,
}

impl PayloadBuilder {
    pub fn new() -> Self {
        Self { fields: Map::new() }
    }

    /// Adds a field. Setting an existing key replaces its value in place.
    pub fn field<K: Into<String>, V: Into<PayloadValue>>(mut self, key: K, value: V) -> Self {
        self.fields.insert(key.into(), Value::from(value.into()));
        self
    }

    pub fn build(self) -> Payload {
        Payload {
            fields: self.fields,
        }
    }
}
