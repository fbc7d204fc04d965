use crate::auth::context::SessionUser;
use crate::domains::user::UserType;
use crate::errors::DomainResult;
use crate::validation::{common, Validate, ValidationBuilder};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> DomainResult<()> {
        common::validate_login_email(&self.email)?;
        ValidationBuilder::new("password", Some(self.password.clone()))
            .required()
            .validate()
    }
}

/// Sign-up form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub city: String,
    pub state: String,
    #[serde(default, alias = "user_type")]
    pub user_type: UserType,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, alias = "preferred_causes")]
    pub preferred_causes: Vec<String>,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> DomainResult<()> {
        ValidationBuilder::new("name", Some(self.name.clone()))
            .required_text()
            .min_length(2)
            .max_length(100)
            .validate()?;

        ValidationBuilder::new("email", Some(self.email.clone()))
            .required_text()
            .email()
            .validate()?;

        common::validate_password(&self.password)?;

        ValidationBuilder::new("city", Some(self.city.clone()))
            .required_text()
            .validate()?;

        common::validate_state_code(&self.state, "state")?;
        common::validate_unique_items(&self.preferred_causes, "preferred_causes")?;
        Ok(())
    }
}

/// Body returned by `/auth/login` and `/auth/register`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "accessToken")]
    pub access_token: String,
    pub user: SessionUser,
}
