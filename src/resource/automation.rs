//! Automation account and the runbooks it hosts

use declarative::{Input, Inputs, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkuName {
    Free,
}

impl SkuName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "Free",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityType {
    SystemAssigned,
}

impl IdentityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAssigned => "SystemAssigned",
        }
    }
}

/// Automation account; with a system-assigned identity its principal id is
/// published at `identity.principalId`
#[derive(Debug, Clone)]
pub struct AutomationAccount {
    pub name: String,
    pub account_name: String,
    pub resource_group_name: Input,
    pub sku: SkuName,
    pub identity: IdentityType,
}

impl AutomationAccount {
    pub const TYPE: &'static str = "azure-native:automation:AutomationAccount";
}

impl Resource for AutomationAccount {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        Inputs::from([
            (
                "automationAccountName".to_string(),
                self.account_name.as_str().into(),
            ),
            ("name".to_string(), self.account_name.as_str().into()),
            (
                "resourceGroupName".to_string(),
                self.resource_group_name.clone(),
            ),
            (
                "sku".to_string(),
                Input::object([("name", self.sku.as_str().into())]),
            ),
            (
                "identity".to_string(),
                Input::object([("type", self.identity.as_str().into())]),
            ),
        ])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunbookType {
    PowerShell,
}

impl RunbookType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PowerShell => "PowerShell",
        }
    }
}

/// Runbook whose body is uploaded verbatim
#[derive(Debug, Clone)]
pub struct Runbook {
    pub name: String,
    pub runbook_name: String,
    pub automation_account_name: Input,
    pub resource_group_name: Input,
    pub location: Input,
    pub description: String,
    pub runbook_type: RunbookType,
    pub log_activity_trace: u32,
    pub log_progress: bool,
    pub log_verbose: bool,
    pub content: String,
}

impl Runbook {
    pub const TYPE: &'static str = "azure-native:automation:Runbook";
}

impl Resource for Runbook {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        Inputs::from([
            (
                "automationAccountName".to_string(),
                self.automation_account_name.clone(),
            ),
            ("name".to_string(), self.runbook_name.as_str().into()),
            ("runbookName".to_string(), self.runbook_name.as_str().into()),
            (
                "resourceGroupName".to_string(),
                self.resource_group_name.clone(),
            ),
            ("location".to_string(), self.location.clone()),
            ("description".to_string(), self.description.as_str().into()),
            ("runbookType".to_string(), self.runbook_type.as_str().into()),
            ("logActivityTrace".to_string(), self.log_activity_trace.into()),
            ("logProgress".to_string(), self.log_progress.into()),
            ("logVerbose".to_string(), self.log_verbose.into()),
            ("content".to_string(), self.content.as_str().into()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_inputs() {
        let account = AutomationAccount {
            name: "automationAccount".into(),
            account_name: "myAutomationAccount9".into(),
            resource_group_name: Input::output("k8s", "name"),
            sku: SkuName::Free,
            identity: IdentityType::SystemAssigned,
        };
        let inputs = account.inputs();
        assert_eq!(inputs["name"], inputs["automationAccountName"]);
        assert_eq!(inputs["identity"].to_string(), "{type: SystemAssigned}");
        assert_eq!(inputs["sku"].to_string(), "{name: Free}");
    }

    #[test]
    fn test_runbook_type_wire_name() {
        assert_eq!(RunbookType::PowerShell.as_str(), "PowerShell");
    }
}
