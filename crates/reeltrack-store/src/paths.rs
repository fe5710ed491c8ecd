// Collection path convention of the consumed store

/// Top-level collection holding one profile document per user, keyed by
/// the user id.
pub const USERS: &str = "users";

/// Per-user list collection: `users/{uid}/{list}`.
pub fn user_list(user_id: &str, list: &str) -> String {
    format!("users/{}/{}", user_id, list)
}

/// Per-user audit collection with auto-generated document ids:
/// `users/{uid}/history`.
pub fn user_history(user_id: &str) -> String {
    format!("users/{}/history", user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_shapes() {
        assert_eq!(user_list("u1", "watching"), "users/u1/watching");
        assert_eq!(user_history("u1"), "users/u1/history");
    }
}
