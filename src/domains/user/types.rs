use crate::errors::DomainResult;
use crate::types::{record_id, timestamp, PROJECT_CAUSES};
use crate::validation::{common, Validate, ValidationBuilder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MAX_BIO_LENGTH: usize = 1000;

/// Account kind: people who volunteer/donate, or organizations that publish
/// projects and campaigns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[default]
    Volunteer,
    #[serde(alias = "ong")]
    Ngo,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Volunteer => "volunteer",
            UserType::Ngo => "ngo",
        }
    }
}

/// Profile as shown on the profile screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(deserialize_with = "record_id::deserialize")]
    pub id: String,
    #[serde(alias = "nome")]
    pub name: String,
    pub email: String,
    #[serde(default, alias = "cidade")]
    pub city: Option<String>,
    #[serde(default, alias = "estado")]
    pub state: Option<String>,
    #[serde(default, alias = "telefone")]
    pub phone: Option<String>,
    #[serde(default, alias = "biografia")]
    pub bio: Option<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, alias = "preferredCauses")]
    pub preferred_causes: Vec<String>,
    #[serde(default, alias = "userType")]
    pub user_type: UserType,
    #[serde(default, with = "timestamp", alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Applies the fields present in `update`.
    pub fn apply(&mut self, update: &UpdateProfile) {
        if let Some(name) = &update.name {
            self.name = name.trim().to_string();
        }
        if let Some(city) = &update.city {
            self.city = Some(city.trim().to_string());
        }
        if let Some(state) = &update.state {
            self.state = Some(state.trim().to_uppercase());
        }
        if let Some(phone) = &update.phone {
            self.phone = Some(phone.trim().to_string());
        }
        if let Some(bio) = &update.bio {
            self.bio = Some(bio.clone());
        }
        if let Some(experience) = &update.experience {
            self.experience = Some(experience.clone());
        }
        if let Some(skills) = &update.skills {
            self.skills = skills.clone();
        }
        if let Some(causes) = &update.preferred_causes {
            self.preferred_causes = causes.clone();
        }
    }
}

/// Partial profile update. Sent to the backend in camelCase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "preferred_causes")]
    pub preferred_causes: Option<Vec<String>>,
}

impl UpdateProfile {
    pub fn is_empty(&self) -> bool {
        *self == UpdateProfile::default()
    }
}

impl Validate for UpdateProfile {
    fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            ValidationBuilder::new("name", Some(name.clone()))
                .required_text()
                .min_length(2)
                .max_length(100)
                .validate()?;
        }

        if let Some(city) = &self.city {
            ValidationBuilder::new("city", Some(city.clone()))
                .required_text()
                .max_length(100)
                .validate()?;
        }

        if let Some(state) = &self.state {
            common::validate_state_code(state, "state")?;
        }

        if let Some(phone) = &self.phone {
            // An empty phone clears it
            if !phone.trim().is_empty() {
                ValidationBuilder::new("phone", Some(phone.clone()))
                    .phone()
                    .validate()?;
            }
        }

        if let Some(bio) = &self.bio {
            ValidationBuilder::new("bio", Some(bio.clone()))
                .max_length(MAX_BIO_LENGTH)
                .validate()?;
        }

        if let Some(causes) = &self.preferred_causes {
            common::validate_unique_items(causes, "preferred_causes")?;
            for cause in causes {
                ValidationBuilder::new("preferred_causes", Some(cause.clone()))
                    .one_of(PROJECT_CAUSES, Some("must be one of the listed causes"))
                    .validate()?;
            }
        }

        if let Some(skills) = &self.skills {
            common::validate_unique_items(skills, "skills")?;
        }

        Ok(())
    }
}
