//! Keystone wire types
//!
//! Request and response bodies for the identity API, v2 and v3, plus the
//! service-catalog selection that turns an auth response into a storage URL.
//! Only the fields this adapter reads are modeled; Keystone sends far more.

use serde::{Deserialize, Serialize};

/// Catalog service type under which Swift registers itself.
pub const OBJECT_STORE_TYPE: &str = "object-store";

// ========== v3 ==========

#[derive(Debug, Serialize)]
pub struct V3AuthRequest {
    pub auth: V3Auth,
}

#[derive(Debug, Serialize)]
pub struct V3Auth {
    pub identity: V3Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<V3Scope>,
}

#[derive(Debug, Serialize)]
pub struct V3Identity {
    pub methods: Vec<String>,
    pub password: V3Password,
}

#[derive(Debug, Serialize)]
pub struct V3Password {
    pub user: V3User,
}

#[derive(Debug, Serialize)]
pub struct V3User {
    pub name: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<DomainRef>,
}

#[derive(Debug, Serialize)]
pub struct DomainRef {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct V3Scope {
    pub domain: DomainRef,
}

impl V3AuthRequest {
    /// Password authentication. When a domain id is given it scopes both the
    /// user and the token, mirroring the double domain scoping of the
    /// connection parameters this client inherits.
    pub fn new(username: &str, password: &str, domain_id: Option<&str>) -> Self {
        Self {
            auth: V3Auth {
                identity: V3Identity {
                    methods: vec!["password".to_string()],
                    password: V3Password {
                        user: V3User {
                            name: username.to_string(),
                            password: password.to_string(),
                            domain: domain_id.map(|id| DomainRef { id: id.to_string() }),
                        },
                    },
                },
                scope: domain_id.map(|id| V3Scope {
                    domain: DomainRef { id: id.to_string() },
                }),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct V3AuthResponse {
    pub token: V3Token,
}

#[derive(Debug, Deserialize)]
pub struct V3Token {
    #[serde(default)]
    pub catalog: Vec<V3CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct V3CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<V3Endpoint>,
}

#[derive(Debug, Deserialize)]
pub struct V3Endpoint {
    pub interface: Option<String>,
    pub region: Option<String>,
    pub url: String,
}

/// Public object-store URL from a v3 catalog, narrowed by region when one is
/// configured.
pub fn object_store_url_v3(catalog: &[V3CatalogEntry], region: Option<&str>) -> Option<String> {
    let entry = catalog
        .iter()
        .find(|entry| entry.service_type == OBJECT_STORE_TYPE)?;
    entry
        .endpoints
        .iter()
        .filter(|ep| ep.interface.as_deref().unwrap_or("public") == "public")
        .find(|ep| match region {
            Some(region) => ep.region.as_deref() == Some(region),
            None => true,
        })
        .map(|ep| ep.url.clone())
}

// ========== v2 ==========

#[derive(Debug, Serialize)]
pub struct V2AuthRequest {
    pub auth: V2Auth,
}

#[derive(Debug, Serialize)]
pub struct V2Auth {
    #[serde(rename = "passwordCredentials")]
    pub password_credentials: V2PasswordCredentials,
}

#[derive(Debug, Serialize)]
pub struct V2PasswordCredentials {
    pub username: String,
    pub password: String,
}

impl V2AuthRequest {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            auth: V2Auth {
                password_credentials: V2PasswordCredentials {
                    username: username.to_string(),
                    password: password.to_string(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct V2AuthResponse {
    pub access: V2Access,
}

#[derive(Debug, Deserialize)]
pub struct V2Access {
    pub token: V2Token,
    #[serde(rename = "serviceCatalog", default)]
    pub service_catalog: Vec<V2CatalogEntry>,
}

#[derive(Debug, Deserialize)]
pub struct V2Token {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct V2CatalogEntry {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub endpoints: Vec<V2Endpoint>,
}

#[derive(Debug, Deserialize)]
pub struct V2Endpoint {
    pub region: Option<String>,
    #[serde(rename = "publicURL")]
    pub public_url: String,
}

/// Public object-store URL from a v2 service catalog.
pub fn object_store_url_v2(catalog: &[V2CatalogEntry], region: Option<&str>) -> Option<String> {
    let entry = catalog
        .iter()
        .find(|entry| entry.service_type == OBJECT_STORE_TYPE)?;
    entry
        .endpoints
        .iter()
        .find(|ep| match region {
            Some(region) => ep.region.as_deref() == Some(region),
            None => true,
        })
        .map(|ep| ep.public_url.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v3_request_shape() {
        let request = V3AuthRequest::new("admin", "secret", Some("default"));
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["auth"]["identity"]["methods"][0], "password");
        assert_eq!(value["auth"]["identity"]["password"]["user"]["name"], "admin");
        assert_eq!(
            value["auth"]["identity"]["password"]["user"]["domain"]["id"],
            "default"
        );
        assert_eq!(value["auth"]["scope"]["domain"]["id"], "default");
    }

    #[test]
    fn test_v3_request_without_domain_omits_scope() {
        let request = V3AuthRequest::new("admin", "secret", None);
        let value = serde_json::to_value(&request).unwrap();

        assert!(value["auth"].get("scope").is_none());
        assert!(
            value["auth"]["identity"]["password"]["user"]
                .get("domain")
                .is_none()
        );
    }

    #[test]
    fn test_v2_request_shape() {
        let request = V2AuthRequest::new("admin", "secret");
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["auth"]["passwordCredentials"]["username"], "admin");
        assert_eq!(value["auth"]["passwordCredentials"]["password"], "secret");
    }

    #[test]
    fn test_v3_catalog_selection() {
        let body = r#"{
            "token": {
                "catalog": [
                    {"type": "identity", "endpoints": [{"interface": "public", "url": "https://id"}]},
                    {"type": "object-store", "endpoints": [
                        {"interface": "admin", "region": "regionOne", "url": "https://admin"},
                        {"interface": "public", "region": "regionOne", "url": "https://one/v1/AUTH_t"},
                        {"interface": "public", "region": "regionTwo", "url": "https://two/v1/AUTH_t"}
                    ]}
                ]
            }
        }"#;
        let response: V3AuthResponse = serde_json::from_str(body).unwrap();

        assert_eq!(
            object_store_url_v3(&response.token.catalog, Some("regionTwo")).as_deref(),
            Some("https://two/v1/AUTH_t")
        );
        // Without a region the first public endpoint wins.
        assert_eq!(
            object_store_url_v3(&response.token.catalog, None).as_deref(),
            Some("https://one/v1/AUTH_t")
        );
        // Admin interfaces are never selected.
        assert_eq!(object_store_url_v3(&response.token.catalog, Some("nowhere")), None);
    }

    #[test]
    fn test_v2_catalog_selection() {
        let body = r#"{
            "access": {
                "token": {"id": "tok-123"},
                "serviceCatalog": [
                    {"type": "object-store", "endpoints": [
                        {"region": "regionOne", "publicURL": "https://one/v1/AUTH_t"}
                    ]}
                ]
            }
        }"#;
        let response: V2AuthResponse = serde_json::from_str(body).unwrap();

        assert_eq!(response.access.token.id, "tok-123");
        assert_eq!(
            object_store_url_v2(&response.access.service_catalog, Some("regionOne")).as_deref(),
            Some("https://one/v1/AUTH_t")
        );
        assert_eq!(
            object_store_url_v2(&response.access.service_catalog, Some("regionTwo")),
            None
        );
    }

    #[test]
    fn test_missing_object_store_entry() {
        let response: V3AuthResponse =
            serde_json::from_str(r#"{"token": {"catalog": []}}"#).unwrap();
        assert_eq!(object_store_url_v3(&response.token.catalog, None), None);
    }
}
