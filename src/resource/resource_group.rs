//! Resource group - the namespace every other Azure resource lives in

use declarative::{Input, Inputs, Resource};

#[derive(Debug, Clone)]
pub struct ResourceGroup {
    pub name: String,
    /// Azure region; the provider's configured location applies when unset
    pub location: Option<String>,
}

impl ResourceGroup {
    pub const TYPE: &'static str = "azure-native:resources:ResourceGroup";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }
}

impl Resource for ResourceGroup {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        let mut inputs = Inputs::new();
        if let Some(location) = &self.location {
            inputs.insert("location".into(), Input::literal(location.as_str()));
        }
        inputs
    }
}
