use serde_json::*;

/// Free-text query in the store's query mini-language, eg.
/// `@message:"PHP Fatal" AND @fields.environment:prod`.
///
/// A blank query turns into `match_all` instead of an empty `query_string`
/// the store would reject.
pub fn query_string(query: &str) -> Value {
    if query.trim().is_empty() {
        json! {
            {
                "match_all": {}
            }
        }
    } else {
        json! {
            {
                "query_string": {
                    "query": query
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_clause() {
        let clause = query_string("@message:\"^PHP Fatal\"");

        assert_eq!(
            clause,
            json! {
                {
                    "query_string": {
                        "query": "@message:\"^PHP Fatal\""
                    }
                }
            }
        );
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert_eq!(query_string(""), json!({"match_all": {}}));
    }

    #[test]
    fn test_whitespace_query_matches_everything() {
        assert_eq!(query_string("   \t "), json!({"match_all": {}}));
    }

    #[test]
    fn test_wildcard_star_is_kept_as_a_query() {
        // "*" is a valid query_string query in its own right
        assert_eq!(
            query_string("*"),
            json!({"query_string": {"query": "*"}})
        );
    }
}
