use crate::time_window::TimeWindow;
use serde_json::*;

/// Constrain `@timestamp` to the resolved window, both bounds inclusive.
///
/// Bounds are sent as the formatted wall-clock strings the log indices
/// store, not as epoch numbers.
pub fn timestamp_range(window: &TimeWindow) -> Value {
    json! {
        {
            "range": {
                "@timestamp": {
                    "gte": TimeWindow::format_timestamp(window.since()),
                    "lte": TimeWindow::format_timestamp(window.to())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_range_clause() {
        // an explicit since is exclusive, so the bound lands one second later
        let window = TimeWindow::resolve(Some(123456), 900, 1_000_005);
        let clause = timestamp_range(&window);

        assert_eq!(
            clause,
            json! {
                {
                    "range": {
                        "@timestamp": {
                            "gte": "1970-01-02T10:17:37.000Z",
                            "lte": "1970-01-12T13:46:40.000Z"
                        }
                    }
                }
            }
        );
    }
}
