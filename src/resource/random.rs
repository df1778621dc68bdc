//! Values generated once by the `random` provider

use declarative::{Inputs, Resource};

/// Generated password; the value is read from the `result` output
#[derive(Debug, Clone)]
pub struct RandomPassword {
    pub name: String,
    pub length: u32,
    pub special: bool,
}

impl RandomPassword {
    pub const TYPE: &'static str = "random:index/randomPassword:RandomPassword";
}

impl Resource for RandomPassword {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        Inputs::from([
            ("length".to_string(), self.length.into()),
            ("special".to_string(), self.special.into()),
        ])
    }

    fn secret_outputs(&self) -> &'static [&'static str] {
        &["result", "bcryptHash"]
    }
}

/// Generated UUID, stable until the resource itself is replaced
#[derive(Debug, Clone)]
pub struct RandomUuid {
    pub name: String,
}

impl RandomUuid {
    pub const TYPE: &'static str = "random:index/randomUuid:RandomUuid";

    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Resource for RandomUuid {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        Inputs::new()
    }
}
