//! Role assignments - bind a principal to a role definition at a scope

use declarative::{Input, Inputs, Resource};

/// Built-in Owner role definition
pub const OWNER_ROLE_ID: &str = "8e3af657-a8ff-443c-a75c-2fe8c4bcb635";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalType {
    ServicePrincipal,
}

impl PrincipalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ServicePrincipal => "ServicePrincipal",
        }
    }
}

/// `/subscriptions/{subscription}`
pub fn subscription_scope(subscription: &Input) -> Input {
    Input::concat(["/subscriptions/".into(), subscription.clone()])
}

/// `/subscriptions/{subscription}/resourceGroups/{resource_group}`
pub fn resource_group_scope(subscription: &Input, resource_group: &Input) -> Input {
    Input::concat([
        "/subscriptions/".into(),
        subscription.clone(),
        "/resourceGroups/".into(),
        resource_group.clone(),
    ])
}

/// Fully qualified id of a built-in role definition
pub fn role_definition_id(subscription: &Input, role: &str) -> Input {
    Input::concat([
        "/subscriptions/".into(),
        subscription.clone(),
        "/providers/Microsoft.Authorization/roleDefinitions/".into(),
        role.into(),
    ])
}

#[derive(Debug, Clone)]
pub struct RoleAssignment {
    pub name: String,
    pub scope: Input,
    /// Assignment GUID
    pub role_assignment_name: Input,
    pub principal_type: PrincipalType,
    pub principal_id: Input,
    pub role_definition_id: Input,
}

impl RoleAssignment {
    pub const TYPE: &'static str = "azure-native:authorization:RoleAssignment";
}

impl Resource for RoleAssignment {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_token(&self) -> &'static str {
        Self::TYPE
    }

    fn inputs(&self) -> Inputs {
        Inputs::from([
            ("scope".to_string(), self.scope.clone()),
            (
                "roleAssignmentName".to_string(),
                self.role_assignment_name.clone(),
            ),
            (
                "principalType".to_string(),
                self.principal_type.as_str().into(),
            ),
            ("principalId".to_string(), self.principal_id.clone()),
            (
                "roleDefinitionId".to_string(),
                self.role_definition_id.clone(),
            ),
        ])
    }
}
