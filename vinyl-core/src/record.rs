use std::fmt;

use serde::{Deserialize, Serialize};

/// Grouping key used when a record has no format.
pub const MISSING_KEY: &str = "undefined";

/// Release year; the dataset mixes numbers and free text ("c. 1958").
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Year {
    Number(i64),
    Text(String),
}

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Year::Number(n) => write!(f, "{n}"),
            Year::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Sale amount as stored in the file: a number, or text like "$1,250".
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(f64),
    Text(String),
}

impl Amount {
    pub fn value(&self) -> Option<f64> {
        let v = match self {
            Amount::Number(v) => Some(*v),
            Amount::Text(s) => {
                let cleaned = s
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, '$' | ',' | ' '))
                    .collect::<String>();
                cleaned.parse::<f64>().ok()
            }
        };
        v.filter(|v| v.is_finite())
    }
}

/// Entry exactly as it appears in the dataset; nothing is required yet.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawRecord {
    pub name: Option<String>,
    pub title: Option<String>,
    pub format: Option<String>,
    pub year: Option<Year>,
    pub max_amount: Option<Amount>,
    pub story: Option<String>,
    pub article: Option<String>,
    pub article_date: Option<String>,
    pub photo_copyright: Option<String>,
    pub icon_copyright: Option<String>,
}

/// One validated sale event.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    pub title: Option<String>,
    pub format: Option<String>,
    pub year: Option<Year>,
    pub max_amount: f64,
    pub story: Option<String>,
    pub article: Option<String>,
    pub article_date: Option<String>,
    pub photo_copyright: Option<String>,
    pub icon_copyright: Option<String>,
}

impl Record {
    /// Minimal record; the remaining fields are filled with struct update syntax.
    pub fn new(name: &str, format: &str, max_amount: f64) -> Self {
        Record {
            name: name.to_string(),
            title: None,
            format: Some(format.to_string()),
            year: None,
            max_amount,
            story: None,
            article: None,
            article_date: None,
            photo_copyright: None,
            icon_copyright: None,
        }
    }

    pub fn name_key(&self) -> &str {
        &self.name
    }

    pub fn format_key(&self) -> &str {
        self.format.as_deref().unwrap_or(MISSING_KEY)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl TryFrom<RawRecord> for Record {
    type Error = String;

    fn try_from(raw: RawRecord) -> Result<Self, Self::Error> {
        let name = non_empty(raw.name).ok_or_else(|| "missing name".to_string())?;
        let max_amount = match raw.max_amount {
            None => return Err(format!("{name}: missing max_amount")),
            Some(a) => a
                .value()
                .ok_or_else(|| format!("{name}: max_amount is not a number"))?,
        };
        if max_amount < 0.0 {
            return Err(format!("{name}: negative max_amount {max_amount}"));
        }
        Ok(Record {
            name,
            title: non_empty(raw.title),
            format: non_empty(raw.format),
            year: raw.year,
            max_amount,
            story: non_empty(raw.story),
            article: non_empty(raw.article),
            article_date: non_empty(raw.article_date),
            photo_copyright: non_empty(raw.photo_copyright),
            icon_copyright: non_empty(raw.icon_copyright),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn amount_accepts_numbers_and_currency_text() {
        assert_eq!(Amount::Number(12.5).value(), Some(12.5));
        assert_eq!(Amount::Text("$1,250".into()).value(), Some(1250.0));
        assert_eq!(Amount::Text("n/a".into()).value(), None);
    }

    #[test]
    fn year_is_number_or_text() {
        let r = raw(r#"{"name":"a","max_amount":1,"year":1968}"#);
        assert_eq!(r.year, Some(Year::Number(1968)));
        let r = raw(r#"{"name":"a","max_amount":1,"year":"c. 1958"}"#);
        assert_eq!(r.year.unwrap().to_string(), "c. 1958");
    }

    #[test]
    fn validation_requires_name_and_amount() {
        assert!(Record::try_from(raw(r#"{"max_amount":1}"#)).is_err());
        assert!(Record::try_from(raw(r#"{"name":"  ","max_amount":1}"#)).is_err());
        assert!(Record::try_from(raw(r#"{"name":"a"}"#)).is_err());
        assert!(Record::try_from(raw(r#"{"name":"a","max_amount":"lots"}"#)).is_err());
        assert!(Record::try_from(raw(r#"{"name":"a","max_amount":-3}"#)).is_err());
    }

    #[test]
    fn missing_format_groups_under_undefined() {
        let r = Record::try_from(raw(r#"{"name":"a","max_amount":"$10","format":""}"#)).unwrap();
        assert_eq!(r.max_amount, 10.0);
        assert_eq!(r.format, None);
        assert_eq!(r.format_key(), MISSING_KEY);
        assert_eq!(r.display_title(), "a");
    }
}
