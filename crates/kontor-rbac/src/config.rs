//! Authorization service configuration.

/// Configuration for the role and tenant services.
#[derive(Debug, Clone)]
pub struct RbacConfig {
    /// Name of the immutable system role provisioned with every corp.
    pub admin_role_name: String,
    /// Minimum admin password length at onboarding.
    pub min_password_length: usize,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
}

impl Default for RbacConfig {
    fn default() -> Self {
        Self {
            admin_role_name: "Admin".into(),
            min_password_length: 8,
            pepper: None,
        }
    }
}

impl RbacConfig {
    /// Description stamped onto the system admin role at provisioning.
    pub fn admin_role_description(&self, corp_name: &str) -> String {
        format!("Corporation {corp_name} administrator")
    }
}
