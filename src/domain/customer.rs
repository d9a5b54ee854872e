use serde::{Deserialize, Serialize};

/// Reference to the owner's record on the processor side.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct CustomerRef {
    pub id: String,
    #[serde(default)]
    pub default_payment_method: Option<String>,
}

/// Attributes used when the processor customer has to be created.
#[derive(Debug, Default, Serialize, Clone, PartialEq)]
pub struct CustomerOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
