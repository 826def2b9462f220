/// Build the search expression for merged changes of `project` on `branch`,
/// optionally limited to changes owned by any of `owners`.
pub fn build_query(project: &str, branch: &str, owners: &[String]) -> String {
    let mut query = format!("status:merged branch:{} project:{} ", branch, project);
    if !owners.is_empty() {
        query.push_str(&owner_clause(owners));
    }
    query
}

fn owner_clause(owners: &[String]) -> String {
    let alternatives: Vec<String> = owners.iter().map(|owner| format!("owner:{}", owner)).collect();
    format!("({})", alternatives.join(" OR "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_only() {
        assert_eq!(
            build_query("openstack/neutron", "master", &[]),
            "status:merged branch:master project:openstack/neutron "
        );
    }

    #[test]
    fn single_owner_is_grouped() {
        let owners = vec!["alice".to_string()];
        assert_eq!(
            build_query("openstack/nova", "master", &owners),
            "status:merged branch:master project:openstack/nova (owner:alice)"
        );
    }

    #[test]
    fn owners_are_or_ed_in_order() {
        let owners = vec!["alice".to_string(), "bob".to_string(), "carol".to_string()];
        let query = build_query("openstack/nova", "stable", &owners);
        assert!(query.starts_with("status:merged branch:stable project:openstack/nova "));
        assert!(query.ends_with("(owner:alice OR owner:bob OR owner:carol)"));
    }

    #[test]
    fn identifiers_are_passed_through() {
        let owners = vec!["not a user!".to_string()];
        assert!(build_query("x", "master", &owners).contains("owner:not a user!"));
    }
}
