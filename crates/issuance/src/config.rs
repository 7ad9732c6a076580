// Copyright 2021-2024 SecureDNA Stiftung (SecureDNA Foundation) <licensing@securedna.org>
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration-driven chain construction. The chain order is exactly
//! the order of `[[handler]]` entries in the deployment's TOML config.

use std::collections::HashMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::chain::HandlerChain;
use crate::handler::RequestHandler;
use crate::handlers::{ExtensionAllowList, RequireDnComponent, SetDnComponent};

/// One `[[handler]]` entry: a kind selecting the constructor, and the
/// remaining keys as that handler's parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct HandlerEntry {
    pub kind: String,
    #[serde(flatten)]
    pub params: toml::Table,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChainConfig {
    #[serde(default, rename = "handler")]
    pub handlers: Vec<HandlerEntry>,
}

impl ChainConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ChainConfigError> {
        toml::from_str(raw).map_err(ChainConfigError::Parse)
    }
}

type HandlerConstructor =
    Box<dyn Fn(&toml::Table) -> Result<Arc<dyn RequestHandler>, ChainConfigError> + Send + Sync>;

/// Maps handler kinds to constructors. Deployments register their plugin
/// handlers here; the built-in kinds are pre-registered.
pub struct HandlerRegistry {
    constructors: HashMap<String, HandlerConstructor>,
}

impl HandlerRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// A registry with the built-in handler kinds registered.
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::empty();
        registry.register_params::<SetDnComponent>("set-dn-component");
        registry.register_params::<RequireDnComponent>("require-dn-component");
        registry.register_params::<ExtensionAllowList>("extension-allow-list");
        registry
    }

    pub fn register(&mut self, kind: impl Into<String>, constructor: HandlerConstructor) {
        self.constructors.insert(kind.into(), constructor);
    }

    /// Registers a handler type whose parameters deserialize directly
    /// from the entry's remaining keys.
    pub fn register_params<H>(&mut self, kind: &str)
    where
        H: RequestHandler + DeserializeOwned + 'static,
    {
        let kind_name = kind.to_string();
        self.register(
            kind,
            Box::new(move |params| {
                let handler: H = toml::Value::Table(params.clone()).try_into().map_err(
                    |source| ChainConfigError::InvalidParams {
                        kind: kind_name.clone(),
                        source,
                    },
                )?;
                Ok(Arc::new(handler))
            }),
        );
    }

    /// Builds a chain whose handler order is exactly the config order.
    pub fn build_chain(&self, config: &ChainConfig) -> Result<HandlerChain, ChainConfigError> {
        let mut chain = HandlerChain::new();
        for entry in &config.handlers {
            let constructor = self.constructors.get(&entry.kind).ok_or_else(|| {
                ChainConfigError::UnknownHandlerKind {
                    kind: entry.kind.clone(),
                }
            })?;
            chain.push(constructor(&entry.params)?);
        }
        Ok(chain)
    }
}

#[derive(Error, Debug)]
pub enum ChainConfigError {
    #[error("could not parse handler chain config: {0}")]
    Parse(#[source] toml::de::Error),
    #[error("unknown handler kind {kind}")]
    UnknownHandlerKind { kind: String },
    #[error("invalid parameters for handler kind {kind}: {source}")]
    InvalidParams {
        kind: String,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::CertificateProfileName;
    use pki::test_helpers::end_entity_request;
    use pki::DnComponentKind;

    const CONFIG: &str = r#"
        [[handler]]
        kind = "set-dn-component"
        component = "OU"
        value = "Engineering"

        [[handler]]
        kind = "require-dn-component"
        component = "OU"
    "#;

    #[test]
    fn chain_built_from_config_applies_in_config_order() {
        let config = ChainConfig::from_toml_str(CONFIG).unwrap();
        let chain = HandlerRegistry::with_builtin_handlers()
            .build_chain(&config)
            .unwrap();
        assert_eq!(chain.len(), 2);

        let request = end_entity_request("device-1");
        let processed = chain
            .process(&request, &CertificateProfileName::from("server"))
            .unwrap();
        assert_eq!(
            processed.subject().get(DnComponentKind::OrganizationalUnit),
            Some("Engineering")
        );
    }

    #[test]
    fn reordered_config_changes_outcome() {
        // Validation before enrichment: the empty OU is now a rejection.
        let reordered = r#"
            [[handler]]
            kind = "require-dn-component"
            component = "OU"

            [[handler]]
            kind = "set-dn-component"
            component = "OU"
            value = "Engineering"
        "#;
        let config = ChainConfig::from_toml_str(reordered).unwrap();
        let chain = HandlerRegistry::with_builtin_handlers()
            .build_chain(&config)
            .unwrap();

        let request = end_entity_request("device-1");
        let err = chain
            .process(&request, &CertificateProfileName::from("server"))
            .unwrap_err();
        assert_eq!(err.handler, "require-dn-component");
    }

    #[test]
    fn unknown_handler_kind_is_rejected() {
        let config = ChainConfig::from_toml_str(
            r#"
            [[handler]]
            kind = "no-such-handler"
        "#,
        )
        .unwrap();

        let err = HandlerRegistry::with_builtin_handlers()
            .build_chain(&config)
            .unwrap_err();
        assert!(matches!(
            err,
            ChainConfigError::UnknownHandlerKind { kind } if kind == "no-such-handler"
        ));
    }

    #[test]
    fn invalid_handler_params_are_rejected() {
        let config = ChainConfig::from_toml_str(
            r#"
            [[handler]]
            kind = "set-dn-component"
            component = "NOT-A-COMPONENT"
            value = "x"
        "#,
        )
        .unwrap();

        let err = HandlerRegistry::with_builtin_handlers()
            .build_chain(&config)
            .unwrap_err();
        assert!(matches!(err, ChainConfigError::InvalidParams { .. }));
    }

    #[test]
    fn empty_config_builds_empty_chain() {
        let config = ChainConfig::from_toml_str("").unwrap();
        let chain = HandlerRegistry::with_builtin_handlers()
            .build_chain(&config)
            .unwrap();
        assert!(chain.is_empty());
    }
}
