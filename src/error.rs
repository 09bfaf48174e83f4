use itertools::Itertools;

/// Render aggregated validation lines the way every multi-line error does:
/// a leading newline, then one indented line per violation.
fn render_lines(lines: &[String]) -> String {
    format!("\n{}", lines.iter().map(|line| format!("    {}", line)).join("\n"))
}

/// Every failure the library can report.
///
/// Aggregated variants hold one entry per violation found in a single pass,
/// so a caller sees all problems of a request at once.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    /// A concrete resource type was declared without an `id` field.
    #[error("A Resource must have an 'id' attribute.")]
    MissingId,

    /// A qualified link name refers to a relationship that does not exist.
    #[error("'{relationship}' is not a valid relationship for {resource}.")]
    InvalidLinkName {
        relationship: String,
        resource: String,
    },

    /// Reserved names, missing required fields or mismatched values at construction.
    #[error("{}", render_lines(.0))]
    Construction(Vec<String>),

    /// Dumping an instance whose `id` is unset or null.
    #[error("This '{0}' object has no id.")]
    NoIdentity(String),

    #[error("{}", render_lines(.0))]
    AttributeFilter(Vec<String>),

    #[error("{}", render_lines(.0))]
    RelationshipValidation(Vec<String>),

    #[error("{}", render_lines(.0))]
    LinkResolution(Vec<String>),

    /// Introspection called with something that is not a resource.
    #[error("'{0}' object is not a resource object.")]
    NotAResource(String),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A caller-supplied serializer failed.
    #[error("Serializer failed: {0}")]
    Serializer(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ResourceError {
    /// The individual violation lines of an aggregated error, empty otherwise.
    pub fn lines(&self) -> &[String] {
        match self {
            ResourceError::Construction(lines)
            | ResourceError::AttributeFilter(lines)
            | ResourceError::RelationshipValidation(lines)
            | ResourceError::LinkResolution(lines) => lines,
            _ => &[],
        }
    }
}

pub type Result<T, E = ResourceError> = std::result::Result<T, E>;
