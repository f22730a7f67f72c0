/// Extracts the ID of a newly created resource from a `Location` header value.
///
/// Keycloak answers `201 Created` with the URL of the new resource; its ID is the
/// last path segment. A trailing slash or a query string is ignored.
///
/// # Examples
/// ```
/// use keycloak_admin_client::utils::id::id_from_location;
/// let id = id_from_location("http://kc/admin/realms/test/organizations/resource-id-123");
/// assert_eq!(id, "resource-id-123");
/// ```
pub fn id_from_location(location: &str) -> String {
    let without_query = location.split(['?', '#']).next().unwrap_or_default();
    without_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
