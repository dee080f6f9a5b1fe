use warden_core::entry::{render_entry_point, CONFIG_FILE_NAME, ENTRY_FILE_NAME};
use warden_core::function::PolicyFunctionSpec;
use warden_core::policy::render_policy_document;

use crate::archive::{PackageArchive, SealedArchive};
use crate::error::ArchiveError;

/// Assemble and seal the deployable bundle for one policy function: the
/// walked source and library trees plus two synthetic entries, the
/// embedded policy document and the generated dispatch manifest.
pub fn build_policy_archive(spec: &PolicyFunctionSpec) -> Result<SealedArchive, ArchiveError> {
    let mut archive = PackageArchive::build(spec.layout())?;
    archive.add_contents(
        CONFIG_FILE_NAME,
        render_policy_document(spec.policy()).as_bytes(),
    )?;
    archive.add_contents(
        ENTRY_FILE_NAME,
        render_entry_point(spec.mode_kind()).as_bytes(),
    )?;
    archive.seal()
}

#[cfg(test)]
mod tests {
    use std::fs::{self, File};
    use std::io::Read;

    use serde_json::Value;
    use tempfile::TempDir;
    use warden_core::function::{BundleLayout, PolicyFunctionSpec};
    use warden_core::policy::{PolicyDescription, PolicyDocument};

    use super::*;

    fn read_entry(sealed: &SealedArchive, name: &str) -> String {
        let file = File::open(sealed.path()).expect("open sealed archive");
        let mut zip = zip::ZipArchive::new(file).expect("read sealed archive");
        let mut entry = zip.by_name(name).expect("entry should exist");
        let mut contents = String::new();
        entry
            .read_to_string(&mut contents)
            .expect("entry should be UTF-8");
        contents
    }

    fn spec(dir: &TempDir) -> PolicyFunctionSpec {
        let source_root = dir.path().join("policy_src");
        fs::create_dir_all(&source_root).expect("create source root");
        fs::write(source_root.join("resolver.txt"), "resolve\n").expect("write fixture");

        let policy: PolicyDescription = serde_json::from_value(serde_json::json!({
            "name": "ec2-tag-compliance",
            "mode": {
                "type": "cloudtrail",
                "sources": ["ec2.amazonaws.com"],
                "events": ["RunInstances"],
                "role": "arn:aws:iam::644160558196:role/warden"
            },
            "filters": [{"tag:required": "absent"}]
        }))
        .expect("policy should parse");

        PolicyFunctionSpec::from_policy(
            policy,
            BundleLayout {
                source_root,
                ..Default::default()
            },
        )
        .expect("spec should build")
    }

    #[test]
    fn embeds_policy_document_and_dispatch_manifest() {
        let dir = TempDir::new().expect("tempdir");
        let sealed = build_policy_archive(&spec(&dir)).expect("bundle should build");

        let document: PolicyDocument =
            serde_json::from_str(&read_entry(&sealed, CONFIG_FILE_NAME))
                .expect("embedded document should parse");
        assert_eq!(document.policies.len(), 1);
        assert_eq!(document.policies[0].name, "ec2-tag-compliance");
        assert!(document.policies[0].data.contains_key("filters"));

        let manifest: Value = serde_json::from_str(&read_entry(&sealed, ENTRY_FILE_NAME))
            .expect("manifest should parse");
        assert_eq!(manifest["dispatch"], "cloudtrail_handle");
    }

    #[test]
    fn rebuilding_an_unchanged_policy_reproduces_the_checksum() {
        let dir = TempDir::new().expect("tempdir");
        let spec = spec(&dir);
        let first = build_policy_archive(&spec).expect("first build");
        let second = build_policy_archive(&spec).expect("second build");
        assert_eq!(first.checksum(), second.checksum());
    }
}
