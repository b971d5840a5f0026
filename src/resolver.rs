//! Rewrites import specifiers so they stay valid when hoisted into the manifest.

/// Returns `specifier` as it should appear in the generated manifest.
///
/// * `./x` is rebased onto the directory of `importing_path`.
/// * A specifier containing N `../` segments loses its first N segments and is returned as
///   `./rest`. The depth of `importing_path` is not consulted, so this is only correct when
///   the specifier climbs back to the logical root.
/// * Anything else (packages, already resolved paths) is passed through unchanged, which
///   makes resolution idempotent for non-relative specifiers.
pub fn resolve(specifier: &str, importing_path: &str) -> String {
    let climbs = specifier.matches("../").count();

    if climbs == 0 {
        return match specifier.strip_prefix("./") {
            Some(rest) => format!("{}{}", directory_of(importing_path), rest),
            None => specifier.to_string(),
        };
    }

    let rest: Vec<&str> = specifier.split('/').skip(climbs).collect();
    format!("./{}", rest.join("/"))
}

/// Logical path up to and including its last `/`, or empty for a bare file name.
fn directory_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_directory_specifier_uses_importing_directory() {
        assert_eq!(
            resolve("./schema", "./api/v1/product/get.ts"),
            "./api/v1/product/schema"
        );
        assert_eq!(resolve("./schema", "get.ts"), "schema");
    }

    #[test]
    fn test_package_specifier_passes_through() {
        assert_eq!(resolve("zod", "./api/v1/product/get.ts"), "zod");
        assert_eq!(
            resolve("@acme/validators", "./api/v1/product/get.ts"),
            "@acme/validators"
        );
    }

    #[test]
    fn test_resolution_is_idempotent_for_non_relative_specifiers() {
        for specifier in ["zod", "@acme/validators", "lib/schema"] {
            let once = resolve(specifier, "./api/v1/product/get.ts");
            assert_eq!(resolve(&once, "./api/v1/other/post.ts"), once);
        }
    }

    #[test]
    fn test_parent_specifier_drops_one_segment_per_climb() {
        assert_eq!(resolve("../common", "./api/v1/product/get.ts"), "./common");
        assert_eq!(
            resolve("../../models/product", "./api/v1/product/get.ts"),
            "./models/product"
        );
    }

    #[test]
    fn test_parent_resolution_ignores_importing_depth() {
        // Same specifier, different importer depth, same answer.
        assert_eq!(
            resolve("../shared", "./api/v1/a/b/c/get.ts"),
            resolve("../shared", "./api/get.ts")
        );
    }
}
