//! Pure request classification for the activity log.
//!
//! Maps a request's shape to an activity type and description, and builds
//! the sanitized params JSON that gets persisted alongside it. No state,
//! no side effects: identical inputs always classify identically.

use axum::http::{Method, Uri};
use serde_json::{json, Map, Value};

use crate::models::activity::ActivityType;

/// Marker stored in place of redacted body fields.
pub const REDACTED: &str = "[REDACTED]";

/// Body fields that must never reach the activity log in clear text.
const SENSITIVE_FIELDS: [&str; 4] = [
    "password",
    "passwordConfirmation",
    "currentPassword",
    "newPassword",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub kind: ActivityType,
    pub description: String,
}

/// Classify a request into an activity type and human-readable description.
pub fn classify(method: &Method, path: &str, query: &Map<String, Value>) -> Classification {
    if path.contains("/auth/login") {
        return auth("User login");
    }
    if path.contains("/auth/register") {
        return auth("User registration");
    }
    if path.contains("/auth/logout") {
        return auth("User logout");
    }
    if path.contains("/auth/profile") {
        return auth("Accessed user profile");
    }

    if path.contains("/restaurants") {
        let description = match (str_param(query, "lat"), str_param(query, "lon")) {
            (Some(lat), Some(lon)) => {
                format!("Searched for restaurants near coordinates ({}, {})", lat, lon)
            }
            _ => match str_param(query, "city") {
                Some(city) => format!("Searched for restaurants in city: {}", city),
                None => "Searched for restaurants".to_string(),
            },
        };
        return Classification {
            kind: ActivityType::Search,
            description,
        };
    }

    Classification {
        kind: ActivityType::Transaction,
        description: format!("{} request to {}", method, path),
    }
}

fn auth(description: &str) -> Classification {
    Classification {
        kind: ActivityType::Auth,
        description: description.to_string(),
    }
}

fn str_param<'a>(query: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    query.get(key).and_then(|v| v.as_str())
}

/// Parse the query string of a URI into a JSON object of string values.
pub fn query_map(uri: &Uri) -> Map<String, Value> {
    uri.query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
                .collect()
        })
        .unwrap_or_default()
}

/// Serialize `{query, body}` for storage. Sensitive body fields are
/// replaced with [`REDACTED`]; query parameters are stored as-is; the body
/// is omitted entirely for GET requests.
pub fn sanitized_params(
    method: &Method,
    query: &Map<String, Value>,
    body: Option<&Value>,
) -> String {
    let mut params = json!({ "query": query });

    if *method != Method::GET {
        if let Some(body) = body {
            params["body"] = sanitize_body(body);
        }
    }

    params.to_string()
}

fn sanitize_body(body: &Value) -> Value {
    let Value::Object(map) = body else {
        return body.clone();
    };
    let mut sanitized = map.clone();
    for field in SENSITIVE_FIELDS {
        if sanitized.contains_key(field) {
            sanitized.insert(field.to_string(), Value::String(REDACTED.to_string()));
        }
    }
    Value::Object(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_of(pairs: &[(&str, &str)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_auth_paths() {
        let q = Map::new();
        let cases = [
            ("/auth/login", "User login"),
            ("/auth/register", "User registration"),
            ("/auth/logout", "User logout"),
            ("/auth/profile", "Accessed user profile"),
        ];
        for (path, description) in cases {
            let c = classify(&Method::POST, path, &q);
            assert_eq!(c.kind, ActivityType::Auth);
            assert_eq!(c.description, description);
        }
    }

    #[test]
    fn test_restaurant_search_by_coordinates() {
        let q = query_of(&[("lat", "40.7128"), ("lon", "-74.0060")]);
        let c = classify(&Method::GET, "/restaurants", &q);
        assert_eq!(c.kind, ActivityType::Search);
        assert_eq!(
            c.description,
            "Searched for restaurants near coordinates (40.7128, -74.0060)"
        );
    }

    #[test]
    fn test_restaurant_search_by_city() {
        let q = query_of(&[("city", "New York")]);
        let c = classify(&Method::GET, "/restaurants", &q);
        assert_eq!(c.kind, ActivityType::Search);
        assert_eq!(c.description, "Searched for restaurants in city: New York");
    }

    #[test]
    fn test_restaurant_search_bare() {
        let c = classify(&Method::GET, "/restaurants", &Map::new());
        assert_eq!(c.description, "Searched for restaurants");
    }

    #[test]
    fn test_coordinates_win_over_city() {
        let q = query_of(&[("lat", "1"), ("lon", "2"), ("city", "Boston")]);
        let c = classify(&Method::GET, "/restaurants", &q);
        assert!(c.description.contains("coordinates (1, 2)"));
    }

    #[test]
    fn test_default_transaction() {
        let c = classify(&Method::DELETE, "/widgets/42", &Map::new());
        assert_eq!(c.kind, ActivityType::Transaction);
        assert_eq!(c.description, "DELETE request to /widgets/42");
    }

    #[test]
    fn test_classification_is_idempotent() {
        let q = query_of(&[("lat", "40.7128"), ("lon", "-74.0060")]);
        let first = classify(&Method::GET, "/restaurants", &q);
        let second = classify(&Method::GET, "/restaurants", &q);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sanitized_params_redacts_password_fields() {
        let q = Map::new();
        let body = json!({
            "email": "alice@example.com",
            "password": "Secret123!",
            "passwordConfirmation": "Secret123!",
        });
        let params = sanitized_params(&Method::POST, &q, Some(&body));

        assert!(!params.contains("Secret123!"));
        let parsed: Value = serde_json::from_str(&params).unwrap();
        assert_eq!(parsed["body"]["password"], REDACTED);
        assert_eq!(parsed["body"]["passwordConfirmation"], REDACTED);
        assert_eq!(parsed["body"]["email"], "alice@example.com");
    }

    #[test]
    fn test_sanitized_params_omits_body_for_get() {
        let q = query_of(&[("lat", "40.7128")]);
        let body = json!({"password": "Secret123!"});
        let params = sanitized_params(&Method::GET, &q, Some(&body));

        let parsed: Value = serde_json::from_str(&params).unwrap();
        assert!(parsed.get("body").is_none());
        assert_eq!(parsed["query"]["lat"], "40.7128");
    }

    #[test]
    fn test_query_is_never_redacted() {
        let q = query_of(&[("password", "oops-in-query")]);
        let params = sanitized_params(&Method::POST, &q, None);
        let parsed: Value = serde_json::from_str(&params).unwrap();
        assert_eq!(parsed["query"]["password"], "oops-in-query");
    }

    #[test]
    fn test_query_map_parses_uri() {
        let uri: Uri = "/restaurants?lat=40.7128&lon=-74.0060".parse().unwrap();
        let q = query_map(&uri);
        assert_eq!(q.get("lat").unwrap(), "40.7128");
        assert_eq!(q.get("lon").unwrap(), "-74.0060");
        assert!(query_map(&"/restaurants".parse::<Uri>().unwrap()).is_empty());
    }
}
