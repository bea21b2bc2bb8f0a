// Argument validation for Reddit tools.
//
// Each parameter is declared once; the same declaration renders the JSON
// Schema advertised in tools/list and checks incoming arguments.

use crate::tools::{json_schema_integer, json_schema_string};
use reddit_mcp_core::TimeFilter;
use serde_json::{Map, Value};

/// Longest subreddit name Reddit allows.
const MAX_SUBREDDIT_LEN: usize = 21;

/// An argument failed its schema constraints.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid argument '{field}': {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Raw tool arguments as received from the caller.
#[derive(Debug, Default)]
pub struct Arguments {
    values: Map<String, Value>,
}

impl Arguments {
    /// Accepts an object, or `null` for "no arguments".
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        match value {
            Value::Object(map) => Ok(Self {
                values: map.clone(),
            }),
            Value::Null => Ok(Self::default()),
            _ => Err(ValidationError::new(
                "arguments",
                "expected an object of named arguments",
            )),
        }
    }

    fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }
}

/// Bounded integer parameter with a default.
#[derive(Debug, Clone, Copy)]
pub struct IntParam {
    pub name: &'static str,
    pub description: &'static str,
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

impl IntParam {
    pub fn schema(&self) -> Value {
        json_schema_integer(self.description, self.default, self.min, self.max)
    }

    /// Integers and integer strings are accepted; a missing value takes the
    /// default.
    pub fn read(&self, args: &Arguments) -> Result<u32, ValidationError> {
        let value = match args.get(self.name) {
            None => return Ok(self.default),
            Some(value) => value,
        };

        let parsed = match value {
            Value::Number(n) => n.as_i64().or_else(|| {
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            }),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
        .ok_or_else(|| ValidationError::new(self.name, "expected an integer"))?;

        if parsed < i64::from(self.min) || parsed > i64::from(self.max) {
            return Err(ValidationError::new(
                self.name,
                format!(
                    "must be between {} and {}, got {}",
                    self.min, self.max, parsed
                ),
            ));
        }

        Ok(parsed as u32)
    }
}

pub const POST_LIMIT: IntParam = IntParam {
    name: "limit",
    description: "Number of posts to retrieve (1-100, default 10)",
    default: 10,
    min: 1,
    max: 100,
};

pub const COMMENT_LIMIT: IntParam = IntParam {
    name: "limit",
    description: "Number of comments to retrieve (1-100, default 10)",
    default: 10,
    min: 1,
    max: 100,
};

pub const DETAIL_COMMENT_LIMIT: IntParam = IntParam {
    name: "comment_limit",
    description: "Number of top-level comments to retrieve (1-100, default 10)",
    default: 10,
    min: 1,
    max: 100,
};

pub const DETAIL_COMMENT_DEPTH: IntParam = IntParam {
    name: "comment_depth",
    description: "Maximum depth of comment replies to fetch (1-10, default 3)",
    default: 3,
    min: 1,
    max: 10,
};

pub const SUBREDDIT_NAME: &str = "subreddit_name";
pub const POST_ID: &str = "post_id";
pub const TIME_FILTER: &str = "time_filter";
/// Older clients send the top-posts window as `time`.
const TIME_FILTER_ALIAS: &str = "time";

fn required_str<'a>(args: &'a Arguments, name: &str) -> Result<&'a str, ValidationError> {
    match args.get(name) {
        None => Err(ValidationError::new(name, "is required")),
        Some(Value::String(s)) => Ok(s.trim()),
        Some(_) => Err(ValidationError::new(name, "expected a string")),
    }
}

/// Inputs `read_subreddit_name` accepts.
pub const SUBREDDIT_NAME_PATTERN: &str = r"^\s*(/?r/)?[A-Za-z0-9_]{1,21}\s*$";

pub fn subreddit_name_schema() -> Value {
    serde_json::json!({
        "type": "string",
        "description": "Name of the subreddit, e.g. 'python' (an 'r/' or '/r/' prefix is accepted)",
        "minLength": 1,
        "pattern": SUBREDDIT_NAME_PATTERN
    })
}

/// Trimmed subreddit name with any `r/` or `/r/` prefix removed.
pub fn read_subreddit_name(args: &Arguments) -> Result<String, ValidationError> {
    let raw = required_str(args, SUBREDDIT_NAME)?;
    let name = raw
        .strip_prefix("/r/")
        .or_else(|| raw.strip_prefix("r/"))
        .unwrap_or(raw);

    if name.is_empty() {
        return Err(ValidationError::new(SUBREDDIT_NAME, "must not be empty"));
    }
    if name.len() > MAX_SUBREDDIT_LEN {
        return Err(ValidationError::new(
            SUBREDDIT_NAME,
            format!("must be at most {} characters", MAX_SUBREDDIT_LEN),
        ));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::new(
            SUBREDDIT_NAME,
            "may only contain letters, digits and underscores",
        ));
    }
    Ok(name.to_string())
}

pub fn post_id_schema() -> Value {
    serde_json::json!({
        "type": "string",
        "description": "Reddit post ID (base-36, e.g. '1abc2d'; a 't3_' prefix is accepted)",
        "minLength": 1
    })
}

/// Base-36 post id with any `t3_` prefix removed.
pub fn read_post_id(args: &Arguments) -> Result<String, ValidationError> {
    let raw = required_str(args, POST_ID)?;
    let id = raw.strip_prefix("t3_").unwrap_or(raw);

    if id.is_empty() {
        return Err(ValidationError::new(POST_ID, "must not be empty"));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::new(
            POST_ID,
            "must be a base-36 identifier (letters and digits only)",
        ));
    }
    Ok(id.to_ascii_lowercase())
}

pub fn time_filter_schema() -> Value {
    let mut values = vec![String::new()];
    values.extend(TimeFilter::ALL.iter().map(|f| f.as_str().to_string()));
    let mut schema = json_schema_string(
        "Time window for top posts (\"\", \"hour\", \"day\", \"week\", \"month\", \"year\", \"all\"); empty uses Reddit's default",
    );
    schema["enum"] = serde_json::json!(values);
    schema["default"] = serde_json::json!("");
    schema
}

/// `None` means "let Reddit pick" (the empty string).
pub fn read_time_filter(args: &Arguments) -> Result<Option<TimeFilter>, ValidationError> {
    let (field, value) = match args.get(TIME_FILTER) {
        Some(value) => (TIME_FILTER, value),
        None => match args.get(TIME_FILTER_ALIAS) {
            Some(value) => (TIME_FILTER_ALIAS, value),
            None => return Ok(None),
        },
    };

    let raw = value
        .as_str()
        .ok_or_else(|| ValidationError::new(field, "expected a string"))?;
    if raw.is_empty() {
        return Ok(None);
    }

    raw.parse::<TimeFilter>().map(Some).map_err(|_| {
        ValidationError::new(
            field,
            format!(
                "must be one of \"\", hour, day, week, month, year, all; got '{}'",
                raw
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        Arguments::from_value(&value).unwrap()
    }

    #[test]
    fn test_arguments_must_be_object() {
        assert!(Arguments::from_value(&json!(null)).is_ok());
        let err = Arguments::from_value(&json!([1, 2])).unwrap_err();
        assert_eq!(err.field, "arguments");
    }

    #[test]
    fn test_limit_default_and_bounds() {
        assert_eq!(POST_LIMIT.read(&args(json!({}))).unwrap(), 10);
        assert_eq!(POST_LIMIT.read(&args(json!({"limit": null}))).unwrap(), 10);
        assert_eq!(POST_LIMIT.read(&args(json!({"limit": 1}))).unwrap(), 1);
        assert_eq!(POST_LIMIT.read(&args(json!({"limit": 100}))).unwrap(), 100);

        for bad in [json!(0), json!(101), json!(1000), json!(-5)] {
            let err = POST_LIMIT.read(&args(json!({ "limit": bad }))).unwrap_err();
            assert_eq!(err.field, "limit");
        }
    }

    #[test]
    fn test_limit_type_coercion() {
        assert_eq!(POST_LIMIT.read(&args(json!({"limit": "25"}))).unwrap(), 25);
        assert_eq!(POST_LIMIT.read(&args(json!({"limit": 5.0}))).unwrap(), 5);
        assert!(POST_LIMIT.read(&args(json!({"limit": 5.5}))).is_err());
        assert!(POST_LIMIT.read(&args(json!({"limit": "many"}))).is_err());
        assert!(POST_LIMIT.read(&args(json!({"limit": true}))).is_err());
    }

    #[test]
    fn test_comment_depth_bounds() {
        assert_eq!(DETAIL_COMMENT_DEPTH.read(&args(json!({}))).unwrap(), 3);
        assert!(DETAIL_COMMENT_DEPTH
            .read(&args(json!({"comment_depth": 11})))
            .is_err());
    }

    #[test]
    fn test_subreddit_name() {
        assert_eq!(
            read_subreddit_name(&args(json!({"subreddit_name": "python"}))).unwrap(),
            "python"
        );
        assert_eq!(
            read_subreddit_name(&args(json!({"subreddit_name": "r/rust"}))).unwrap(),
            "rust"
        );

        for bad in ["", "   ", "r/", "../etc", "a b", "this_name_is_far_too_long_for_reddit"] {
            let err = read_subreddit_name(&args(json!({ "subreddit_name": bad }))).unwrap_err();
            assert_eq!(err.field, "subreddit_name", "input {:?}", bad);
        }

        let err = read_subreddit_name(&args(json!({}))).unwrap_err();
        assert_eq!(err.message, "is required");
        assert!(read_subreddit_name(&args(json!({"subreddit_name": 7}))).is_err());
    }

    #[test]
    fn test_subreddit_name_schema_matches_reader() {
        let pattern = regex::Regex::new(SUBREDDIT_NAME_PATTERN).unwrap();
        assert_eq!(subreddit_name_schema()["pattern"], SUBREDDIT_NAME_PATTERN);

        let inputs = [
            "python",
            "r/rust",
            "/r/rust",
            "  AskReddit ",
            " /r/learn_programming",
            "a23456789012345678901",
            "",
            "   ",
            "r/",
            "/r/",
            "//r/rust",
            "rr/rust",
            "../etc",
            "a b",
            "a23456789012345678901x",
            "caf\u{e9}",
        ];
        for input in inputs {
            let accepted = read_subreddit_name(&args(json!({ "subreddit_name": input }))).is_ok();
            assert_eq!(pattern.is_match(input), accepted, "input {:?}", input);
        }
    }

    #[test]
    fn test_post_id() {
        assert_eq!(read_post_id(&args(json!({"post_id": "1AbC2d"}))).unwrap(), "1abc2d");
        assert_eq!(read_post_id(&args(json!({"post_id": "t3_xyz"}))).unwrap(), "xyz");
        assert!(read_post_id(&args(json!({"post_id": ""}))).is_err());
        assert!(read_post_id(&args(json!({"post_id": "t3_"}))).is_err());
        assert!(read_post_id(&args(json!({"post_id": "abc/../x"}))).is_err());
    }

    #[test]
    fn test_time_filter() {
        assert_eq!(read_time_filter(&args(json!({}))).unwrap(), None);
        assert_eq!(read_time_filter(&args(json!({"time_filter": ""}))).unwrap(), None);
        assert_eq!(
            read_time_filter(&args(json!({"time_filter": "month"}))).unwrap(),
            Some(TimeFilter::Month)
        );
        assert_eq!(
            read_time_filter(&args(json!({"time": "all"}))).unwrap(),
            Some(TimeFilter::All)
        );

        let err = read_time_filter(&args(json!({"time_filter": "decade"}))).unwrap_err();
        assert_eq!(err.field, "time_filter");
        let err = read_time_filter(&args(json!({"time": "forever"}))).unwrap_err();
        assert_eq!(err.field, "time");
    }

    #[test]
    fn test_time_filter_schema_lists_all_values() {
        let schema = time_filter_schema();
        assert_eq!(schema["enum"].as_array().unwrap().len(), 7);
        assert_eq!(schema["enum"][0], "");
    }
}
