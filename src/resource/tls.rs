//! Key material generated by the `tls` provider

use declarative::{Inputs, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAlgorithm {
    Rsa,
}

impl KeyAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rsa => "RSA",
        }
    }
}

/// An asymmetric key pair; `publicKeyOpenssh` is the output other resources read
#[derive(Debug, Clone)]
pub struct PrivateKey {
    pub name: String,
    pub algorithm: KeyAlgorithm,
    pub rsa_bits: Option<u32>,
}

impl PrivateKey {
    pub const TYPE: &'static str = "tls:index/privateKey:PrivateKey";

    pub fn rsa(name: impl Into<String>, bits: u32) -> Self {
        Self {
            name: name.into(),
            algorithm: KeyAlgorithm::Rsa,
            rsa_bits: Some(bits),
        }
    }
}

impl Resource for PrivateKey {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        let mut inputs = Inputs::new();
        inputs.insert("algorithm".into(), self.algorithm.as_str().into());
        if let Some(bits) = self.rsa_bits {
            inputs.insert("rsaBits".into(), bits.into());
        }
        inputs
    }

    fn secret_outputs(&self) -> &'static [&'static str] {
        &["privateKeyPem", "privateKeyOpenssh", "privateKeyPemPkcs8"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::Input;

    #[test]
    fn test_rsa_key_inputs() {
        let key = PrivateKey::rsa("ssh-key", 4096);
        let inputs = key.inputs();
        assert_eq!(inputs["algorithm"], Input::literal("RSA"));
        assert_eq!(inputs["rsaBits"], Input::literal(4096));
        assert!(!key.secret_outputs().contains(&"publicKeyOpenssh"));
    }
}
