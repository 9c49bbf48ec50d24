//! Integration tests for the host label applier

#[cfg(test)]
mod tests {
    use selutils_errors::PlatformError;
    use selutils_platform::{ContextApplier, Filesystem, LabelSource, Platform, XattrContextApplier};
    use selutils_types::{ContextComponents, SecurityContext};
    use std::fs;
    use std::path::Path;

    // user.* attributes are writable without privileges on regular files
    const TEST_XATTR: &str = "user.selutils.test";

    fn context(raw: &str) -> SecurityContext {
        SecurityContext::parse(raw).unwrap()
    }

    fn fixed(raw: &str) -> XattrContextApplier {
        XattrContextApplier::new(LabelSource::Context(context(raw)), TEST_XATTR).unwrap()
    }

    /// Some CI filesystems reject user xattrs; those runs skip the label checks.
    fn xattrs_supported(dir: &Path) -> bool {
        let sample = dir.join("sample");
        fs::write(&sample, b"").unwrap();
        fixed("u:r:t").apply(&sample).is_ok()
    }

    #[test]
    fn test_apply_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        if !xattrs_supported(dir.path()) {
            return;
        }
        let file = dir.path().join("file");
        fs::write(&file, b"content").unwrap();

        let applier = fixed("system_u:object_r:etc_t:s0");
        applier.apply(&file).unwrap();
        applier.apply(&file).unwrap();

        assert_eq!(
            applier.read_context(&file, false).unwrap().to_string(),
            "system_u:object_r:etc_t:s0"
        );
        assert_eq!(fs::read(&file).unwrap(), b"content");
    }

    #[test]
    fn test_components_replace_fields() {
        let dir = tempfile::tempdir().unwrap();
        if !xattrs_supported(dir.path()) {
            return;
        }
        let file = dir.path().join("file");
        fs::write(&file, b"").unwrap();
        fixed("user_u:object_r:tmp_t:s0").apply(&file).unwrap();

        let applier = XattrContextApplier::new(
            LabelSource::Components(ContextComponents {
                type_: Some("etc_t".into()),
                ..ContextComponents::default()
            }),
            TEST_XATTR,
        )
        .unwrap();
        applier.apply(&file).unwrap();

        assert_eq!(
            applier.read_context(&file, false).unwrap().to_string(),
            "user_u:object_r:etc_t:s0"
        );
    }

    #[test]
    fn test_components_on_unlabelled_file() {
        let dir = tempfile::tempdir().unwrap();
        if !xattrs_supported(dir.path()) {
            return;
        }
        let file = dir.path().join("bare");
        fs::write(&file, b"").unwrap();

        let applier = XattrContextApplier::new(
            LabelSource::Components(ContextComponents {
                role: Some("object_r".into()),
                ..ContextComponents::default()
            }),
            TEST_XATTR,
        )
        .unwrap();
        assert!(matches!(
            applier.apply(&file),
            Err(PlatformError::NoContext { .. })
        ));
    }

    #[test]
    fn test_reference_file_label_copied() {
        let dir = tempfile::tempdir().unwrap();
        if !xattrs_supported(dir.path()) {
            return;
        }
        let reference = dir.path().join("reference");
        let file = dir.path().join("file");
        fs::write(&reference, b"").unwrap();
        fs::write(&file, b"").unwrap();
        fixed("staff_u:object_r:user_home_t:s0").apply(&reference).unwrap();

        let applier =
            XattrContextApplier::new(LabelSource::Reference(reference), TEST_XATTR).unwrap();
        applier.apply(&file).unwrap();
        assert_eq!(
            applier.read_context(&file, false).unwrap(),
            context("staff_u:object_r:user_home_t:s0")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_reference_read_through_symlink() {
        let dir = tempfile::tempdir().unwrap();
        if !xattrs_supported(dir.path()) {
            return;
        }
        let target = dir.path().join("target");
        let link = dir.path().join("link");
        fs::write(&target, b"").unwrap();
        std::os::unix::fs::symlink(&target, &link).unwrap();
        fixed("sys_u:object_r:bin_t:s0").apply(&target).unwrap();

        let applier = fixed("u:r:t");
        assert_eq!(
            applier.read_context(&link, true).unwrap(),
            context("sys_u:object_r:bin_t:s0")
        );
        let copied = XattrContextApplier::new(LabelSource::Reference(link), TEST_XATTR).unwrap();
        assert_eq!(
            copied.context_for(&target).unwrap(),
            context("sys_u:object_r:bin_t:s0")
        );
    }

    #[test]
    fn test_unlabelled_file_reads_as_no_context() {
        let dir = tempfile::tempdir().unwrap();
        if !xattrs_supported(dir.path()) {
            return;
        }
        let file = dir.path().join("bare");
        fs::write(&file, b"").unwrap();

        let applier = fixed("u:r:t");
        assert!(matches!(
            applier.read_context(&file, false),
            Err(PlatformError::NoContext { .. })
        ));
        assert!(matches!(
            applier.read_context(&file, true),
            Err(PlatformError::NoContext { .. })
        ));
    }

    #[test]
    fn test_invalid_attribute_name_rejected() {
        let result = XattrContextApplier::new(LabelSource::Context(context("u:r:t")), "bad\0name");
        assert!(matches!(
            result,
            Err(PlatformError::LabelOperationFailed { .. })
        ));
    }

    #[test]
    fn test_missing_reference_file_fails_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let result = XattrContextApplier::new(
            LabelSource::Reference(dir.path().join("absent")),
            TEST_XATTR,
        );
        assert!(result.is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_apply_missing_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = fixed("u:r:t").apply(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, PlatformError::LabelOperationFailed { .. }));
    }

    #[test]
    fn test_host_platform_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let platform =
            Platform::host(LabelSource::Context(context("u:r:t")), TEST_XATTR).unwrap();
        assert!(platform
            .filesystem()
            .classify(dir.path())
            .unwrap()
            .is_directory());
    }
}
