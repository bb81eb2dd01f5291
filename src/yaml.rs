use serde_yaml::Value as YamlValue;

use crate::query::Scalar;
use crate::record::Record;

/// A YAML mapping is a flat record keyed by its string keys.
impl Record for YamlValue {
    fn resolve(&self, field: &str) -> Option<Scalar<'_>> {
        let value = self.as_mapping()?.get(field)?;
        yaml_to_scalar(value)
    }
}

fn yaml_to_scalar(v: &YamlValue) -> Option<Scalar<'_>> {
    match v {
        YamlValue::String(s) => Some(Scalar::String(s)),
        YamlValue::Number(n) => n
            .as_i64()
            .map(Scalar::Integer)
            .or_else(|| n.as_f64().map(Scalar::Float)),
        _ => None,
    }
}
