use serde_json::*;

/// Keep roughly `percent` of every hundred matching documents.
///
/// The cut is made store-side from a hash of each document's id, so the
/// same query over unchanged indices keeps returning the same subset,
/// which `random_score` sampling would not.
pub fn sampling(percent: u8) -> Value {
    json! {
        {
            "script": {
                "script": {
                    "lang": "painless",
                    "source": "Math.abs(doc['_id'].value.hashCode()) % 100 < params.sampling",
                    "params": {
                        "sampling": percent
                    }
                }
            }
        }
    }
}
