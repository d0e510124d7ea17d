//! User domain types.

/// Roles that grant administrative access when asserted by the identity provider.
pub const ADMIN_ROLES: [&str; 4] = ["admin", "dev", "developer", "superadmin"];

/// Whether a role name grants admin rights. Comparison ignores case and
/// surrounding whitespace.
pub fn role_grants_admin(role: &str) -> bool {
    let role = role.trim().to_ascii_lowercase();
    ADMIN_ROLES.contains(&role.as_str())
}

/// Interpret a loosely typed flag ("1", "true", "yes", "y") as a boolean.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}
