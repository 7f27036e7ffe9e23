//! Form-encoded request bodies.

use url::form_urlencoded;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Ordered set of form fields sent as an `application/x-www-form-urlencoded`
/// body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    fields: Vec<(String, String)>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Repeated names are kept in insertion order.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Url-encoded body bytes.
    pub fn data(&self) -> Vec<u8> {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.fields.iter())
            .finish()
            .into_bytes()
    }

    /// Headers that must accompany [`Form::data`].
    pub fn headers(&self) -> Vec<(String, String)> {
        vec![("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string())]
    }
}
