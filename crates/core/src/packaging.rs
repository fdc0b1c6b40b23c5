//! Injection artifact packaging.
//!
//! Packages a generated prompt into its deployable "injection" form: a
//! named file whose content carries a provenance header ahead of the
//! prompt text, plus a checksum of the whole artifact.

use serde::Serialize;

use crate::hashing::sha256_hex;
use crate::versioning::VersionLabel;

/// The packaged, deployable form of a generated prompt.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionArtifact {
    /// Conventional file name, e.g. `acme-coffee_v3.prompt.md`.
    pub file_name: String,
    /// Header block plus the prompt text.
    pub content: String,
    /// SHA-256 hex digest of `content`.
    pub checksum: String,
}

/// Package a prompt into an injection artifact.
///
/// The header records the version and briefing hash so a deployed file
/// can always be traced back to the run that produced it.
pub fn package(
    prompt_content: &str,
    assistant_slug: &str,
    version: &VersionLabel,
    briefing_hash: &str,
) -> InjectionArtifact {
    let file_name = format!("{assistant_slug}_{}.prompt.md", version.version);
    let content = format!(
        "<!--\n\
         version: {}\n\
         briefing_hash: {}\n\
         -->\n\n\
         {}\n",
        version.version, briefing_hash, prompt_content
    );
    let checksum = sha256_hex(content.as_bytes());
    InjectionArtifact {
        file_name,
        content,
        checksum,
    }
}

/// Lowercase a display name into a file-name-safe slug.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        "assistant".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_carries_version_and_hash_header() {
        let v = VersionLabel::from_number(3);
        let artifact = package("You are a helpful assistant.", "acme", &v, "abc123");
        assert_eq!(artifact.file_name, "acme_v3.prompt.md");
        assert!(artifact.content.contains("version: v3"));
        assert!(artifact.content.contains("briefing_hash: abc123"));
        assert!(artifact.content.contains("You are a helpful assistant."));
    }

    #[test]
    fn checksum_matches_content() {
        let v = VersionLabel::from_number(1);
        let artifact = package("prompt", "a", &v, "h");
        assert_eq!(artifact.checksum, sha256_hex(artifact.content.as_bytes()));
    }

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Acme Coffee"), "acme-coffee");
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Dr. Smith's  Clinic!"), "dr-smith-s-clinic");
    }

    #[test]
    fn slugify_empty_falls_back() {
        assert_eq!(slugify("!!!"), "assistant");
    }
}
