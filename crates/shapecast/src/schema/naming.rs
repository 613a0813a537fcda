use serde::{Deserialize, Serialize};

///
/// NamingPolicy
///
/// How a relationship field's identifier-shadow alias is derived from its
/// title. The exact transform is a policy choice, not a load-bearing
/// contract, so both conventions are supported per model schema.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum NamingPolicy {
    /// `widgets` -> `widget_ids`; `owner` -> `owner_id`.
    #[default]
    Singularized,
    /// Keep the title verbatim and append the suffix:
    /// `orders` -> `orders_ids`.
    VerbatimSuffix,
}

impl NamingPolicy {
    /// Alias for a has-one field.
    #[must_use]
    pub fn has_one_alias(self, title: &str) -> String {
        format!("{title}_id")
    }

    /// Alias for a has-many field.
    #[must_use]
    pub fn has_many_alias(self, title: &str) -> String {
        match self {
            Self::Singularized => format!("{}_ids", singularize(title)),
            Self::VerbatimSuffix => format!("{title}_ids"),
        }
    }
}

/// Minimal English singularization covering the common plural endings.
/// Titles that match no rule are kept verbatim.
#[must_use]
pub fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies")
        && !stem.is_empty()
    {
        return format!("{stem}y");
    }
    if word.ends_with("ss") || word.ends_with("us") {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("es")
        && (stem.ends_with("sh") || stem.ends_with("ch") || stem.ends_with('x'))
    {
        return stem.to_string();
    }
    word.strip_suffix('s').unwrap_or(word).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singularized_policy_transforms_plurals() {
        let policy = NamingPolicy::Singularized;

        assert_eq!(policy.has_many_alias("widgets"), "widget_ids");
        assert_eq!(policy.has_many_alias("boxes"), "box_ids");
        assert_eq!(policy.has_one_alias("owner"), "owner_id");
    }

    #[test]
    fn verbatim_policy_keeps_title() {
        let policy = NamingPolicy::VerbatimSuffix;

        assert_eq!(policy.has_many_alias("orders"), "orders_ids");
    }

    #[test]
    fn singularize_leaves_non_plurals_alone() {
        assert_eq!(singularize("status"), "status");
        assert_eq!(singularize("glass"), "glass");
        assert_eq!(singularize("widget"), "widget");
    }

    #[test]
    fn singularize_handles_ies_plurals() {
        assert_eq!(singularize("entries"), "entry");
        assert_eq!(singularize("parties"), "party");
    }
}
