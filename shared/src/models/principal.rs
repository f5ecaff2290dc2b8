//! Principal Model

use serde::{Deserialize, Serialize};

/// Platform role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    SuperAdmin,
    CityAdmin,
    Citizen,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::CityAdmin => "CITY_ADMIN",
            Self::Citizen => "CITIZEN",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::CityAdmin)
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            "CITY_ADMIN" => Ok(Self::CityAdmin),
            "CITIZEN" => Ok(Self::Citizen),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Authenticated actor supplied by the identity collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub name: String,
    pub role: UserRole,
    /// Optional for SUPER_ADMIN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_district: Option<String>,
}

impl Principal {
    pub fn citizen(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: UserRole::Citizen,
            city_district: None,
        }
    }

    pub fn city_admin(
        id: impl Into<String>,
        name: impl Into<String>,
        district: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: UserRole::CityAdmin,
            city_district: Some(district.into()),
        }
    }

    pub fn super_admin(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role: UserRole::SuperAdmin,
            city_district: None,
        }
    }

    /// Whether this principal may administer issues in `district`
    ///
    /// SUPER_ADMIN covers every district; CITY_ADMIN only its own,
    /// compared case-insensitively.
    pub fn administers(&self, district: &str) -> bool {
        match self.role {
            UserRole::SuperAdmin => true,
            UserRole::CityAdmin => self
                .city_district
                .as_deref()
                .is_some_and(|own| own.trim().eq_ignore_ascii_case(district.trim())),
            UserRole::Citizen => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_super_admin_administers_any_district() {
        let admin = Principal::super_admin("root", "Root");
        assert!(admin.administers("Chennai"));
        assert!(admin.administers("Pune"));
    }

    #[test]
    fn test_city_admin_scope_is_case_insensitive() {
        let admin = Principal::city_admin("a1", "Asha", "Chennai");
        assert!(admin.administers("chennai"));
        assert!(admin.administers("CHENNAI "));
        assert!(!admin.administers("Pune"));
    }

    #[test]
    fn test_city_admin_without_district_administers_nothing() {
        let mut admin = Principal::city_admin("a1", "Asha", "Chennai");
        admin.city_district = None;
        assert!(!admin.administers("Chennai"));
    }

    #[test]
    fn test_citizen_is_never_admin() {
        let citizen = Principal::citizen("c1", "Ravi");
        assert!(!citizen.role.is_admin());
        assert!(!citizen.administers("Chennai"));
    }

    #[test]
    fn test_role_serde() {
        let json = serde_json::to_string(&UserRole::CityAdmin).unwrap();
        assert_eq!(json, "\"CITY_ADMIN\"");
        assert_eq!("SUPER_ADMIN".parse::<UserRole>(), Ok(UserRole::SuperAdmin));
    }
}
