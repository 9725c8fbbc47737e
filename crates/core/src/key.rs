//! Result key: addresses one stored scan result in the backing store.

use core::fmt;

use crate::error::{DomainError, DomainResult};

/// Separator used in the storage-native rendering.
///
/// Field values must not contain it; `validate` rejects them so two distinct
/// field tuples can never collide in the backend's flat key namespace.
pub const KEY_SEPARATOR: char = ':';

/// Key identifying one stored scan result.
///
/// Constructed independently by the accept path and the poll path; both must
/// produce byte-identical renderings for the same request, so the key carries
/// no derived or ambient state. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResultKey {
    namespace: String,
    producer: String,
    request_id: String,
    mime_type: String,
}

impl ResultKey {
    /// Build a key with an empty namespace. Use [`ResultKey::with_namespace`]
    /// to scope it to a deployment prefix.
    pub fn new(
        producer: impl Into<String>,
        request_id: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            namespace: String::new(),
            producer: producer.into(),
            request_id: request_id.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Returns a copy of the key with `namespace` set. Pure.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn producer(&self) -> &str {
        &self.producer
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Check the key is fit for persistence.
    ///
    /// `producer`, `request_id` and `mime_type` must be non-empty, and no
    /// field (namespace included) may contain the rendering separator.
    pub fn validate(&self) -> DomainResult<()> {
        for (name, value) in [
            ("producer", &self.producer),
            ("request id", &self.request_id),
            ("mime type", &self.mime_type),
        ] {
            if value.is_empty() {
                return Err(DomainError::invalid_key(format!("missing {name}")));
            }
        }

        for (name, value) in [
            ("namespace", &self.namespace),
            ("producer", &self.producer),
            ("request id", &self.request_id),
            ("mime type", &self.mime_type),
        ] {
            if value.contains(KEY_SEPARATOR) {
                return Err(DomainError::invalid_key(format!(
                    "{name} must not contain '{KEY_SEPARATOR}': {value}"
                )));
            }
        }

        Ok(())
    }

    /// Storage-native rendering.
    ///
    /// Deterministic, and injective for keys that pass [`ResultKey::validate`]:
    /// the separator never occurs inside a field, so the four fields can
    /// always be recovered unambiguously.
    pub fn render(&self) -> String {
        format!(
            "{ns}{sep}{producer}{sep}{request_id}{sep}{mime}",
            ns = self.namespace,
            producer = self.producer,
            request_id = self.request_id,
            mime = self.mime_type,
            sep = KEY_SEPARATOR,
        )
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ResultKey {
        ResultKey::new("cis", "req-1", "application/vnd.security.report")
            .with_namespace("scanrelay")
    }

    #[test]
    fn rendering_is_deterministic() {
        assert_eq!(sample().render(), sample().render());
        assert_eq!(
            sample().render(),
            "scanrelay:cis:req-1:application/vnd.security.report"
        );
    }

    #[test]
    fn with_namespace_does_not_touch_other_fields() {
        let key = sample();
        assert_eq!(key.producer(), "cis");
        assert_eq!(key.request_id(), "req-1");
        assert_eq!(key.mime_type(), "application/vnd.security.report");
        assert_eq!(key.namespace(), "scanrelay");
    }

    #[test]
    fn empty_required_fields_are_rejected() {
        for key in [
            ResultKey::new("", "req-1", "mime"),
            ResultKey::new("cis", "", "mime"),
            ResultKey::new("cis", "req-1", ""),
        ] {
            assert!(matches!(key.validate(), Err(DomainError::InvalidKey(_))));
        }
        // An empty namespace is allowed; only the other three are required.
        assert!(ResultKey::new("cis", "req-1", "mime").validate().is_ok());
    }

    #[test]
    fn separator_inside_a_field_is_rejected() {
        let key = ResultKey::new("cis", "a:b", "mime");
        assert!(matches!(key.validate(), Err(DomainError::InvalidKey(_))));

        let key = sample().with_namespace("scan:relay");
        assert!(matches!(key.validate(), Err(DomainError::InvalidKey(_))));
    }

    #[test]
    fn distinct_tuples_render_distinct_identifiers() {
        let base = sample();
        let variants = [
            sample().with_namespace("other"),
            ResultKey::new("other", "req-1", "application/vnd.security.report")
                .with_namespace("scanrelay"),
            ResultKey::new("cis", "req-2", "application/vnd.security.report")
                .with_namespace("scanrelay"),
            ResultKey::new("cis", "req-1", "application/other")
                .with_namespace("scanrelay"),
        ];
        for variant in variants {
            assert_ne!(base.render(), variant.render());
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        // Field values that pass validation: non-empty, separator-free.
        const FIELD: &str = "[a-zA-Z0-9./+;= _-]{1,24}";

        proptest! {
            /// Property: rendering is injective over valid field tuples.
            #[test]
            fn rendering_is_injective(
                ns_a in FIELD, prod_a in FIELD, req_a in FIELD, mime_a in FIELD,
                ns_b in FIELD, prod_b in FIELD, req_b in FIELD, mime_b in FIELD,
            ) {
                let a = ResultKey::new(&prod_a, &req_a, &mime_a).with_namespace(&ns_a);
                let b = ResultKey::new(&prod_b, &req_b, &mime_b).with_namespace(&ns_b);
                prop_assert!(a.validate().is_ok());
                prop_assert!(b.validate().is_ok());

                let same_tuple = ns_a == ns_b && prod_a == prod_b
                    && req_a == req_b && mime_a == mime_b;
                prop_assert_eq!(a.render() == b.render(), same_tuple);
            }
        }
    }
}
