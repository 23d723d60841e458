/// Client-side search: case-insensitive substring match over
/// `"{first_name} {last_name}"` or the email. An empty term matches everything.
pub fn client_matches(first_name: &str, last_name: &str, email: &str, term: &str) -> bool {
    let term = term.to_lowercase();
    format!("{first_name} {last_name}")
        .to_lowercase()
        .contains(&term)
        || email.to_lowercase().contains(&term)
}
