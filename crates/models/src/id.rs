//! Resource ids are strings on the wire, but older registrations stored
//! numeric ids. Both forms are accepted when reading.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
            RawId::Float(f) if f.fract() == 0.0 => format!("{}", f as i64),
            RawId::Float(f) => f.to_string(),
        }
    }
}

pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

pub fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawId> = Option::deserialize(deserializer)?;
    Ok(raw.map(String::from).filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::string_or_number")]
        id: String,
    }

    #[derive(Deserialize)]
    struct OptHolder {
        #[serde(default, deserialize_with = "super::opt_string_or_number")]
        id: Option<String>,
    }

    #[test]
    fn accepts_strings_and_numbers() {
        let a: Holder = serde_json::from_str(r#"{"id":"7f3a"}"#).unwrap();
        let b: Holder = serde_json::from_str(r#"{"id":482113}"#).unwrap();
        let c: Holder = serde_json::from_str(r#"{"id":12.0}"#).unwrap();
        assert_eq!(a.id, "7f3a");
        assert_eq!(b.id, "482113");
        assert_eq!(c.id, "12");
    }

    #[test]
    fn optional_id_absent_null_or_empty() {
        let a: OptHolder = serde_json::from_str(r#"{}"#).unwrap();
        let b: OptHolder = serde_json::from_str(r#"{"id":null}"#).unwrap();
        let c: OptHolder = serde_json::from_str(r#"{"id":""}"#).unwrap();
        let d: OptHolder = serde_json::from_str(r#"{"id":5}"#).unwrap();
        assert_eq!(a.id, None);
        assert_eq!(b.id, None);
        assert_eq!(c.id, None);
        assert_eq!(d.id.as_deref(), Some("5"));
    }
}
