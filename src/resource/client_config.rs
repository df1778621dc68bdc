//! Caller identity query

use declarative::{DeclarationKind, Inputs, Resource};

/// Read-only query for the credentials the engine runs with; yields
/// `subscriptionId`, `tenantId`, `clientId` and `objectId`
#[derive(Debug, Clone)]
pub struct GetClientConfig {
    pub name: String,
}

impl GetClientConfig {
    pub const TYPE: &'static str = "azure-native:authorization:getClientConfig";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Resource for GetClientConfig {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn kind(&self) -> DeclarationKind {
        DeclarationKind::Invoke
    }

    fn inputs(&self) -> Inputs {
        Inputs::new()
    }
}
