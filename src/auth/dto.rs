use serde::Serialize;
use time::OffsetDateTime;

/// Response for the token endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BearerToken {
    pub token: String,
    #[serde(with = "time::serde::rfc3339")]
    pub token_expiration: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_serializes_with_camel_case_expiry() {
        let bearer = BearerToken {
            token: "ab".repeat(16),
            token_expiration: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&bearer).unwrap();
        assert!(json.contains("\"token\""));
        assert!(json.contains("\"tokenExpiration\""));
        assert!(json.contains("1970-01-01T00:00:00Z"));
    }
}
