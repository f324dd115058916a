use crate::domain::Tag;
use anyhow::Result;
use tracing::warn;

#[derive(Debug, Default)]
pub struct TagResolution {
    pub resolved: Vec<Tag>,
    pub missing: Vec<String>,
}

impl TagResolution {
    pub fn ids(&self) -> Vec<i64> {
        self.resolved.iter().map(|t| t.id).collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.resolved.iter().map(|t| t.name.clone()).collect()
    }
}

/// Splits raw `--tag` values on commas, trims, drops empties and repeats.
pub fn normalize_tag_names(raw: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in raw.iter().flat_map(|r| r.split(',')) {
        let name = part.trim();
        if name.is_empty() || out.iter().any(|n| n == name) {
            continue;
        }
        out.push(name.to_string());
    }
    out
}

/// Looks each requested name up; unknown names are skipped, not fatal.
///
/// A tag never appears twice in `resolved`, even if requested twice.
pub fn resolve_tags<F>(requested: &[String], mut lookup: F) -> Result<TagResolution>
where
    F: FnMut(&str) -> Result<Option<Tag>>,
{
    let mut resolution = TagResolution::default();
    for name in normalize_tag_names(requested) {
        match lookup(&name)? {
            Some(tag) => {
                if !resolution.resolved.iter().any(|t| t.id == tag.id) {
                    resolution.resolved.push(tag);
                }
            }
            None => {
                warn!(tag = %name, "tag not found, skipping");
                resolution.missing.push(name);
            }
        }
    }
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tag(id: i64, name: &str) -> Tag {
        Tag {
            id,
            name: name.to_string(),
            description: None,
            color: "#28a745".to_string(),
            created_at: Utc::now(),
        }
    }

    fn known() -> Vec<Tag> {
        vec![tag(1, "food"), tag(2, "work"), tag(3, "recurring")]
    }

    fn lookup_in(tags: &[Tag]) -> impl FnMut(&str) -> Result<Option<Tag>> + '_ {
        move |name| Ok(tags.iter().find(|t| t.name == name).cloned())
    }

    #[test]
    fn unknown_names_are_reported_not_fatal() {
        let tags = known();
        let requested = vec!["food".to_string(), "vacation".to_string()];
        let res = resolve_tags(&requested, lookup_in(&tags)).expect("resolve");
        assert_eq!(res.names(), vec!["food"]);
        assert_eq!(res.missing, vec!["vacation"]);
    }

    #[test]
    fn repeated_names_attach_once() {
        let tags = known();
        let requested = vec![
            "work".to_string(),
            "work, recurring".to_string(),
            " work ".to_string(),
        ];
        let res = resolve_tags(&requested, lookup_in(&tags)).expect("resolve");
        assert_eq!(res.ids(), vec![2, 3]);
        assert!(res.missing.is_empty());
    }

    #[test]
    fn empty_request_resolves_nothing() {
        let tags = known();
        let res = resolve_tags(&[String::from(" , ")], lookup_in(&tags)).expect("resolve");
        assert!(res.resolved.is_empty());
        assert!(res.missing.is_empty());
    }

    #[test]
    fn lookup_failure_propagates() {
        let requested = vec!["food".to_string()];
        let res = resolve_tags(&requested, |_| Err(anyhow::anyhow!("db gone")));
        assert!(res.is_err());
    }
}
