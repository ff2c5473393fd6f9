use indexmap::IndexMap;
use serde::Serialize;

use crate::parse::{
    ApiKeyLocation, ParsedOperation, SecurityRequirement, SecurityScheme, SecuritySchemeType,
};

/// How a client presents a credential for one scheme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CredentialKind {
    Bearer,
    Basic,
    ApiKey { name: String, location: ApiKeyLocation },
    OAuth2,
    OpenIdConnect,
    /// Certificates live outside the request, so no HTTP-level cases exist.
    MutualTls,
    /// Named by a requirement but not declared, or an unknown `http` scheme.
    Unknown,
}

impl CredentialKind {
    fn from_scheme(scheme: &SecurityScheme) -> Self {
        match scheme.scheme_type {
            SecuritySchemeType::Http => match scheme.scheme.as_deref().map(str::to_ascii_lowercase) {
                Some(ref s) if s == "bearer" => CredentialKind::Bearer,
                Some(ref s) if s == "basic" => CredentialKind::Basic,
                _ => CredentialKind::Unknown,
            },
            SecuritySchemeType::ApiKey => CredentialKind::ApiKey {
                name: scheme.name.clone().unwrap_or_else(|| "X-API-Key".to_string()),
                location: scheme.location.unwrap_or(ApiKeyLocation::Header),
            },
            SecuritySchemeType::OAuth2 => CredentialKind::OAuth2,
            SecuritySchemeType::OpenIdConnect => CredentialKind::OpenIdConnect,
            SecuritySchemeType::MutualTls => CredentialKind::MutualTls,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CredentialKind::Bearer => "bearer",
            CredentialKind::Basic => "basic",
            CredentialKind::ApiKey { .. } => "api_key",
            CredentialKind::OAuth2 => "oauth2",
            CredentialKind::OpenIdConnect => "openid_connect",
            CredentialKind::MutualTls => "mutual_tls",
            CredentialKind::Unknown => "unknown",
        }
    }
}

/// Where a credential goes on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialLocation {
    Header,
    Query,
    Cookie,
}

/// A concrete credential placed on a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    pub location: CredentialLocation,
    pub name: String,
    pub value: String,
}

/// One scheme an operation requires, joined to its declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRequirementInfo {
    pub scheme_name: String,
    pub kind: CredentialKind,
    pub scopes: Vec<String>,
    pub declared: bool,
}

impl SecurityRequirementInfo {
    /// The credential carrying `token`, or `None` when the scheme has no HTTP form.
    pub fn credential(&self, token: &str) -> Option<Credential> {
        let header = |value: String| Credential {
            location: CredentialLocation::Header,
            name: "Authorization".to_string(),
            value,
        };
        match &self.kind {
            CredentialKind::Bearer
            | CredentialKind::OAuth2
            | CredentialKind::OpenIdConnect
            | CredentialKind::Unknown => Some(header(format!("Bearer {token}"))),
            CredentialKind::Basic => Some(header(format!("Basic {token}"))),
            CredentialKind::ApiKey { name, location } => Some(Credential {
                location: match location {
                    ApiKeyLocation::Header => CredentialLocation::Header,
                    ApiKeyLocation::Query => CredentialLocation::Query,
                    ApiKeyLocation::Cookie => CredentialLocation::Cookie,
                },
                name: name.clone(),
                value: token.to_string(),
            }),
            CredentialKind::MutualTls => None,
        }
    }
}

/// Computes the security an operation actually needs.
pub struct SecurityAnalyzer<'a> {
    schemes: &'a IndexMap<String, SecurityScheme>,
    global: &'a [SecurityRequirement],
}

impl<'a> SecurityAnalyzer<'a> {
    pub fn new(schemes: &'a IndexMap<String, SecurityScheme>, global: &'a [SecurityRequirement]) -> Self {
        Self { schemes, global }
    }

    /// Distinct schemes named by the effective requirements, first-seen order.
    ///
    /// Operation-level `security` replaces the document-level list; an empty
    /// operation list disables authentication. Scopes for a scheme named by
    /// several alternatives are unioned.
    pub fn analyze(&self, operation: &ParsedOperation) -> Vec<SecurityRequirementInfo> {
        let effective = operation.security.as_deref().unwrap_or(self.global);

        let mut infos: Vec<SecurityRequirementInfo> = Vec::new();
        for requirement in effective {
            for (name, scopes) in requirement {
                if let Some(existing) = infos.iter_mut().find(|i| &i.scheme_name == name) {
                    for scope in scopes {
                        if !existing.scopes.contains(scope) {
                            existing.scopes.push(scope.clone());
                        }
                    }
                    continue;
                }

                let (kind, declared) = match self.schemes.get(name) {
                    Some(scheme) => (CredentialKind::from_scheme(scheme), true),
                    None => {
                        log::warn!(
                            "{}: security scheme '{name}' is not declared, assuming bearer",
                            operation.label()
                        );
                        (CredentialKind::Unknown, false)
                    }
                };
                infos.push(SecurityRequirementInfo {
                    scheme_name: name.clone(),
                    kind,
                    scopes: scopes.clone(),
                    declared,
                });
            }
        }
        infos
    }

    /// The effective requirement alternatives, each holding the schemes a
    /// request must present together, joined to `analyzed`. An empty
    /// alternative allows anonymous access.
    pub fn alternatives(
        &self,
        operation: &ParsedOperation,
        analyzed: &[SecurityRequirementInfo],
    ) -> Vec<Vec<SecurityRequirementInfo>> {
        let effective = operation.security.as_deref().unwrap_or(self.global);
        effective
            .iter()
            .map(|requirement| {
                requirement
                    .keys()
                    .filter_map(|name| analyzed.iter().find(|i| &i.scheme_name == name).cloned())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::HttpMethod;

    fn requirement(name: &str, scopes: &[&str]) -> SecurityRequirement {
        let mut req = SecurityRequirement::new();
        req.insert(name.to_string(), scopes.iter().map(|s| s.to_string()).collect());
        req
    }

    fn schemes() -> IndexMap<String, SecurityScheme> {
        let mut schemes = IndexMap::new();
        schemes.insert("bearerAuth".to_string(), SecurityScheme::bearer());
        schemes.insert(
            "apiKey".to_string(),
            SecurityScheme::api_key("X-Api-Key", ApiKeyLocation::Header),
        );
        schemes
    }

    #[test]
    fn test_operation_security_overrides_global() {
        let schemes = schemes();
        let global = vec![requirement("bearerAuth", &[])];
        let analyzer = SecurityAnalyzer::new(&schemes, &global);

        let mut op = ParsedOperation::new(HttpMethod::Get, "/keys");
        op.security = Some(vec![requirement("apiKey", &[])]);
        let infos = analyzer.analyze(&op);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].scheme_name, "apiKey");

        let inherited = analyzer.analyze(&ParsedOperation::new(HttpMethod::Get, "/users"));
        assert_eq!(inherited[0].kind, CredentialKind::Bearer);
    }

    #[test]
    fn test_empty_operation_security_disables_auth() {
        let schemes = schemes();
        let global = vec![requirement("bearerAuth", &[])];
        let mut op = ParsedOperation::new(HttpMethod::Get, "/health");
        op.security = Some(vec![]);
        assert!(SecurityAnalyzer::new(&schemes, &global).analyze(&op).is_empty());
    }

    #[test]
    fn test_repeated_scheme_unions_scopes() {
        let schemes = schemes();
        let mut op = ParsedOperation::new(HttpMethod::Post, "/users");
        op.security = Some(vec![
            requirement("bearerAuth", &["read"]),
            requirement("bearerAuth", &["read", "write"]),
        ]);
        let infos = SecurityAnalyzer::new(&schemes, &[]).analyze(&op);
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].scopes, vec!["read", "write"]);
    }

    #[test]
    fn test_requirement_objects_stay_grouped() {
        let schemes = schemes();
        let mut both = requirement("bearerAuth", &[]);
        both.insert("apiKey".to_string(), Vec::new());
        let mut op = ParsedOperation::new(HttpMethod::Get, "/reports");
        op.security = Some(vec![both, requirement("apiKey", &["admin"])]);
        let analyzer = SecurityAnalyzer::new(&schemes, &[]);
        let infos = analyzer.analyze(&op);
        let alternatives = analyzer.alternatives(&op, &infos);
        let grouped: Vec<Vec<&str>> = alternatives
            .iter()
            .map(|alt| alt.iter().map(|i| i.scheme_name.as_str()).collect())
            .collect();
        assert_eq!(grouped, vec![vec!["bearerAuth", "apiKey"], vec!["apiKey"]]);
    }

    #[test]
    fn test_undeclared_scheme_is_unknown() {
        let schemes = IndexMap::new();
        let mut op = ParsedOperation::new(HttpMethod::Get, "/users");
        op.security = Some(vec![requirement("mystery", &[])]);
        let infos = SecurityAnalyzer::new(&schemes, &[]).analyze(&op);
        assert!(!infos[0].declared);
        let cred = infos[0].credential("t").unwrap();
        assert_eq!(cred.value, "Bearer t");
    }

    #[test]
    fn test_api_key_credential_uses_scheme_name() {
        let info = SecurityRequirementInfo {
            scheme_name: "apiKey".to_string(),
            kind: CredentialKind::ApiKey {
                name: "api_key".to_string(),
                location: ApiKeyLocation::Query,
            },
            scopes: vec![],
            declared: true,
        };
        let cred = info.credential("secret").unwrap();
        assert_eq!(cred.location, CredentialLocation::Query);
        assert_eq!(cred.name, "api_key");
        assert_eq!(cred.value, "secret");
    }
}
