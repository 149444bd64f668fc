use uuid::Uuid;

/// Ownership check used by every mutating User/Post/Comment handler.
/// Identity is compared by id only, never by row equality.
pub fn is_owner(principal_id: Uuid, owner_id: Uuid) -> bool {
    principal_id == owner_id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_matches_by_id() {
        let id = Uuid::new_v4();
        assert!(is_owner(id, id));
    }

    #[test]
    fn different_ids_are_not_owners() {
        assert!(!is_owner(Uuid::new_v4(), Uuid::new_v4()));
    }
}
