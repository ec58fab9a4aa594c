//! Field labels, help texts and length limits of a [`User`](super::User),
//! for forms and admin listings.

/// Declared metadata of one profile field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub help_text: &'static str,
    pub max_length: Option<usize>,
    /// `false` for fields no ordinary form may set.
    pub editable: bool,
}

const fn text(
    name: &'static str,
    label: &'static str,
    help_text: &'static str,
    max_length: Option<usize>,
) -> FieldSpec {
    FieldSpec {
        name,
        label,
        help_text,
        max_length,
        editable: true,
    }
}

pub static FIELDS: &[FieldSpec] = &[
    text(
        "username",
        "username",
        "Required. 30 characters or fewer. Letters, digits and @/./+/-/_ only.",
        Some(30),
    ),
    text(
        "title",
        "Academic Title",
        "Optional academic title, shown in team lists only if supplied, and \
         only for external team members.",
        Some(30),
    ),
    text("first_name", "First Name", "First name or given name.", Some(100)),
    text(
        "middle_initials",
        "Initials",
        "Initials of first and middle names. Will be used in team lists with \
         abbreviated names.",
        Some(100),
    ),
    text("last_name", "Last Name", "Last name or surname.", Some(100)),
    text(
        "is_group",
        "Show as Group",
        "Whether this profile refers to a group, rather than a natural person. \
         Groups are referred to with their group name, whereas first and last \
         name refer to the group's contact person.",
        None,
    ),
    text(
        "group_name",
        "Group name",
        "Group name, if this profile is not a natural person. E.g., \
         'Goldfields Regional Office'.",
        Some(200),
    ),
    text(
        "affiliation",
        "Affiliation",
        "Optional affiliation, not required for internal staff. If provided, \
         the affiliation will be appended to the person or group name in \
         parentheses.",
        Some(200),
    ),
    text(
        "image",
        "Image",
        "If you wish, provide us with a face to the name!",
        Some(100),
    ),
    text("email", "email address", "", Some(254)),
    text(
        "phone",
        "Primary Phone number",
        "The primary phone number during work hours.",
        Some(100),
    ),
    text(
        "phone_alt",
        "Alternative Phone number",
        "An alternative phone number during work hours.",
        Some(100),
    ),
    text("fax", "Fax number", "The fax number.", Some(100)),
    text(
        "profile_text",
        "Profile text",
        "A profile text for the staff members, roughly three paragraphs long.",
        None,
    ),
    text(
        "expertise",
        "Expertise",
        "A bullet point list of skills and expertise.",
        None,
    ),
    text(
        "curriculum_vitae",
        "Curriculum vitae",
        "A brief curriculum vitae of academic qualifications and professional \
         memberships.",
        None,
    ),
    text(
        "projects",
        "Projects outside SDIS",
        "Tell us about projects outside SDIS you are involved in.",
        None,
    ),
    text(
        "author_code",
        "Author code",
        "The author code links users to their publications. Staff only.",
        Some(255),
    ),
    text(
        "publications_staff",
        "Staff publications",
        "A list of publications produced for the Department. Staff only.",
        None,
    ),
    text(
        "publications_other",
        "Other publications",
        "A list of publications produced under external affiliation, in press \
         or otherwise unregistered as staff publication.",
        None,
    ),
    text(
        "is_staff",
        "staff status",
        "Designates whether the user can log into this admin site.",
        None,
    ),
    text(
        "is_active",
        "active",
        "Designates whether this user should be treated as active. Unselect \
         this instead of deleting accounts.",
        None,
    ),
    text(
        "is_external",
        "External to the Department",
        "Is the user external to the Department?",
        None,
    ),
    FieldSpec {
        name: "agreed",
        label: "Agreed to the Terms and Conditions",
        help_text: "Has the user agreed to the Terms and Conditions?",
        max_length: None,
        editable: false,
    },
    text("date_joined", "date joined", "", None),
];

/// Look a field up by name.
pub fn field(name: &str) -> Option<&'static FieldSpec> {
    FIELDS.iter().find(|f| f.name == name)
}

/// Fields an ordinary profile form may set.
pub fn editable_fields() -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(|f| f.editable)
}
