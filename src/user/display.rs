//! Display names composed from stored name fragments.
//!
//! Absent fragments render as empty strings. Inner runs of spaces left by
//! empty fragments are kept; only the ends are trimmed.

use super::User;

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl User {
    /// Title, only if supplied and the user is external.
    ///
    /// Internal staff never get a title, even when one is stored.
    pub fn get_title(&self) -> &str {
        match non_empty(&self.title) {
            Some(title) if self.is_external => title,
            _ => "",
        }
    }

    /// Stored initials without the first one.
    pub fn get_middle_initials(&self) -> String {
        let initials = self.middle_initials.as_deref().unwrap_or_default();
        if initials.chars().count() > 1 {
            initials.chars().skip(1).collect()
        } else {
            String::new()
        }
    }

    pub fn guess_first_initial(&self) -> String {
        self.first_name
            .as_deref()
            .and_then(|name| name.chars().next())
            .map(String::from)
            .unwrap_or_default()
    }

    /// Affiliation in parentheses, or an empty string.
    pub fn get_affiliation(&self) -> String {
        non_empty(&self.affiliation)
            .map(|a| format!("({a})"))
            .unwrap_or_default()
    }

    /// Title, first name, initials, last name and affiliation for a person;
    /// group name and affiliation for a group.
    pub fn get_full_name(&self) -> String {
        let full_name = if self.is_group {
            format!(
                "{} {}",
                self.group_name.as_deref().unwrap_or_default(),
                self.get_affiliation()
            )
        } else {
            format!(
                "{} {} {} {} {}",
                self.get_title(),
                self.first_name.as_deref().unwrap_or_default(),
                self.get_middle_initials(),
                self.last_name.as_deref().unwrap_or_default(),
                self.get_affiliation()
            )
        };

        full_name.trim().to_owned()
    }

    pub fn full_name(&self) -> String {
        self.get_full_name()
    }

    /// First name as stored, without any fallback.
    pub fn get_short_name(&self) -> &str {
        self.first_name.as_deref().unwrap_or_default()
    }

    /// First name, falling back to [`User::full_name`] when it is empty.
    pub fn short_name(&self) -> String {
        match non_empty(&self.first_name) {
            Some(first_name) => first_name.to_owned(),
            None => self.full_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::user::tests::user;

    #[test]
    fn test_title_hidden_for_internal() {
        let mut user = user("jdoe");
        user.title = Some("Dr".into());
        assert_eq!(user.get_title(), "");

        user.is_external = true;
        assert_eq!(user.get_title(), "Dr");

        user.title = Some(String::new());
        assert_eq!(user.get_title(), "");
        user.title = None;
        assert_eq!(user.get_title(), "");
    }

    #[test]
    fn test_middle_initials_drop_first() {
        let mut user = user("jdoe");

        user.middle_initials = Some("AB".into());
        assert_eq!(user.get_middle_initials(), "B");

        user.middle_initials = Some("JRR".into());
        assert_eq!(user.get_middle_initials(), "RR");

        user.middle_initials = Some("A".into());
        assert_eq!(user.get_middle_initials(), "");

        user.middle_initials = Some(String::new());
        assert_eq!(user.get_middle_initials(), "");

        user.middle_initials = None;
        assert_eq!(user.get_middle_initials(), "");

        // Counted in characters.
        user.middle_initials = Some("ÉÅ".into());
        assert_eq!(user.get_middle_initials(), "Å");
    }

    #[test]
    fn test_first_initial() {
        let mut user = user("jdoe");
        assert_eq!(user.guess_first_initial(), "");

        user.first_name = Some("Jane".into());
        assert_eq!(user.guess_first_initial(), "J");

        user.first_name = Some("Øystein".into());
        assert_eq!(user.guess_first_initial(), "Ø");
    }

    #[test]
    fn test_affiliation() {
        let mut user = user("jdoe");
        assert_eq!(user.get_affiliation(), "");

        user.affiliation = Some("Region A".into());
        assert_eq!(user.get_affiliation(), "(Region A)");
    }

    #[test]
    fn test_person_full_name_keeps_inner_spaces() {
        let mut user = user("jdoe");
        user.title = Some(String::new());
        user.first_name = Some("Jane".into());
        user.middle_initials = Some(String::new());
        user.last_name = Some("Doe".into());
        user.affiliation = Some(String::new());

        assert_eq!(user.get_full_name(), "Jane  Doe");
    }

    #[test]
    fn test_person_full_name_every_fragment() {
        let mut user = user("jdoe");
        user.title = Some("Dr".into());
        user.is_external = true;
        user.first_name = Some("Jane".into());
        user.middle_initials = Some("JQ".into());
        user.last_name = Some("Doe".into());
        user.affiliation = Some("University of Somewhere".into());

        assert_eq!(
            user.get_full_name(),
            "Dr Jane Q Doe (University of Somewhere)"
        );

        user.is_external = false;
        assert_eq!(user.get_full_name(), "Jane Q Doe (University of Somewhere)");
    }

    #[test]
    fn test_group_full_name() {
        let mut user = user("goldfields");
        user.is_group = true;
        user.group_name = Some("Goldfields Office".into());
        user.affiliation = Some("Region A".into());
        // Contact person is ignored for display.
        user.first_name = Some("Jane".into());
        user.last_name = Some("Doe".into());

        assert_eq!(user.get_full_name(), "Goldfields Office (Region A)");

        user.affiliation = None;
        assert_eq!(user.get_full_name(), "Goldfields Office");
    }

    #[test]
    fn test_short_name_fallbacks_diverge() {
        let mut user = user("goldfields");
        user.is_group = true;
        user.group_name = Some("Goldfields Office".into());
        user.affiliation = Some("Region A".into());

        assert_eq!(user.short_name(), user.get_full_name());
        assert_eq!(user.get_short_name(), "");

        user.first_name = Some(String::new());
        assert_eq!(user.short_name(), "Goldfields Office (Region A)");
        assert_eq!(user.get_short_name(), "");

        user.first_name = Some("Jane".into());
        assert_eq!(user.short_name(), "Jane");
        assert_eq!(user.get_short_name(), "Jane");
    }

    #[test]
    fn test_full_name_property() {
        let mut user = user("jdoe");
        user.first_name = Some("Jane".into());
        user.last_name = Some("Doe".into());

        assert_eq!(user.full_name(), user.get_full_name());
        assert_eq!(user.full_name(), "Jane  Doe");
    }
}
