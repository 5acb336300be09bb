use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};

/// Matches a whole-string `${env:NAME}` placeholder.
static ENV_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\$\{env:([A-Za-z0-9_]+)\}$").expect("placeholder pattern is valid")
});

/// Replace `${env:NAME}` strings in a parsed document with values from the
/// process environment.
///
/// Only a string that is exactly one placeholder is substituted; a
/// placeholder embedded in a longer string is left alone. An unset variable
/// becomes `null`, so a required field that references it fails validation.
pub fn expand(value: &Value) -> Value {
    expand_with(value, &|name| std::env::var(name).ok())
}

/// Same as [`expand`], resolving variables through `lookup`.
pub fn expand_with(value: &Value, lookup: &dyn Fn(&str) -> Option<String>) -> Value {
    match value {
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(k, v)| (k.clone(), expand_with(v, lookup)))
                .collect::<Mapping>(),
        ),
        Value::Sequence(items) => {
            Value::Sequence(items.iter().map(|v| expand_with(v, lookup)).collect())
        }
        Value::String(s) => match ENV_PLACEHOLDER.captures(s) {
            Some(caps) => lookup(&caps[1]).map(Value::String).unwrap_or(Value::Null),
            None => value.clone(),
        },
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: expand_with(&tagged.value, lookup),
        })),
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<String> {
        match name {
            "MY_VAR" => Some("secret".to_string()),
            "NYC_TOKEN_2" => Some("abc123".to_string()),
            _ => None,
        }
    }

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn full_match_is_substituted() {
        let out = expand_with(&Value::String("${env:MY_VAR}".into()), &lookup);
        assert_eq!(out, Value::String("secret".into()));
    }

    #[test]
    fn partial_match_is_left_alone() {
        let input = Value::String("prefix-${env:MY_VAR}".into());
        assert_eq!(expand_with(&input, &lookup), input);

        let trailing = Value::String("${env:MY_VAR}/data".into());
        assert_eq!(expand_with(&trailing, &lookup), trailing);
    }

    #[test]
    fn unset_variable_becomes_null() {
        let out = expand_with(&Value::String("${env:NOT_SET_ANYWHERE}".into()), &lookup);
        assert_eq!(out, Value::Null);
    }

    #[test]
    fn recurses_through_maps_and_sequences() {
        let input = yaml(
            r#"
extractors:
  nyc:
    class: inspect_core::extractors::open_data::OpenDataExtractor
    params:
      app_token: ${env:NYC_TOKEN_2}
      limit: 500
      flags: ["${env:MY_VAR}", plain, true]
"#,
        );
        let out = expand_with(&input, &lookup);
        let params = &out["extractors"]["nyc"]["params"];
        assert_eq!(params["app_token"], Value::String("abc123".into()));
        assert_eq!(params["limit"], yaml("500"));
        assert_eq!(params["flags"][0], Value::String("secret".into()));
        assert_eq!(params["flags"][1], Value::String("plain".into()));
        assert_eq!(params["flags"][2], Value::Bool(true));
    }

    #[test]
    fn keys_keep_their_order_and_input_is_untouched() {
        let input = yaml("b: ${env:MY_VAR}\na: 1\nc: x\n");
        let out = expand_with(&input, &lookup);

        let keys: Vec<&str> = out
            .as_mapping()
            .unwrap()
            .keys()
            .map(|k| k.as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
        assert_eq!(input["b"], Value::String("${env:MY_VAR}".into()));
    }

    #[test]
    fn names_with_other_characters_do_not_match() {
        let input = Value::String("${env:MY-VAR}".into());
        assert_eq!(expand_with(&input, &lookup), input);
    }

    #[test]
    fn process_environment_is_used_by_default() {
        std::env::set_var("INSPECT_FLOW_ENV_TEST", "from-env");
        let out = expand(&Value::String("${env:INSPECT_FLOW_ENV_TEST}".into()));
        assert_eq!(out, Value::String("from-env".into()));
    }
}
