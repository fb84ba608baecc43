use serde_json::*;

/// Field-equality query over the given `{field: value}` object, the store's
/// `match` query. The store accepts exactly one field per clause; what
/// arrives here is passed through for it to judge.
pub fn matches(fields: Value) -> Value {
    json! {
        {
            "match": fields
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_clause() {
        let clause = matches(json!({"@message": "Foo Bar DB queries"}));

        assert_eq!(
            clause,
            json! {
                {
                    "match": {
                        "@message": "Foo Bar DB queries"
                    }
                }
            }
        );
    }

    #[test]
    fn test_non_string_values_pass_through() {
        let clause = matches(json!({"@fields.http_status": 503}));

        assert_eq!(
            clause,
            json! {
                {
                    "match": {
                        "@fields.http_status": 503
                    }
                }
            }
        );
    }
}
