//! Directory identity objects - application, service principal, password
//!
//! The three form a chain: the service principal is bound to the
//! application's `clientId`, and the password credential to the service
//! principal's `id`.

use chrono::{DateTime, SecondsFormat, Utc};
use declarative::{Input, Inputs, Resource};

#[derive(Debug, Clone)]
pub struct Application {
    pub name: String,
    pub display_name: String,
}

impl Application {
    pub const TYPE: &'static str = "azuread:index/application:Application";
}

impl Resource for Application {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        Inputs::from([("displayName".to_string(), self.display_name.as_str().into())])
    }
}

#[derive(Debug, Clone)]
pub struct ServicePrincipal {
    pub name: String,
    pub client_id: Input,
}

impl ServicePrincipal {
    pub const TYPE: &'static str = "azuread:index/servicePrincipal:ServicePrincipal";
}

impl Resource for ServicePrincipal {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        Inputs::from([("clientId".to_string(), self.client_id.clone())])
    }
}

/// Password credential of a service principal
///
/// When `value` is unset the directory generates the secret and exposes it
/// through the `value` output.
#[derive(Debug, Clone)]
pub struct ServicePrincipalPassword {
    pub name: String,
    pub service_principal_id: Input,
    pub value: Option<Input>,
    pub end_date: DateTime<Utc>,
}

impl ServicePrincipalPassword {
    pub const TYPE: &'static str =
        "azuread:index/servicePrincipalPassword:ServicePrincipalPassword";
}

impl Resource for ServicePrincipalPassword {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        let mut inputs = Inputs::from([
            (
                "servicePrincipalId".to_string(),
                self.service_principal_id.clone(),
            ),
            (
                "endDate".to_string(),
                self.end_date
                    .to_rfc3339_opts(SecondsFormat::Secs, true)
                    .into(),
            ),
        ]);
        if let Some(value) = &self.value {
            inputs.insert("value".into(), value.clone());
        }
        inputs
    }

    fn secret_outputs(&self) -> &'static [&'static str] {
        &["value"]
    }
}
