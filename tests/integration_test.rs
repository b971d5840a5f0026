use clap::Parser;
use pretty_assertions::assert_eq;
use route_manifest::{
    cli::{self, CliArgs},
    config::GeneratorConfig,
    error::DiagnosticKind,
    pipeline,
};
use std::ffi::OsString;
use std::path::Path;
use tempfile::TempDir;

/// Helper function to create a temporary routes directory
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn product_project() -> TempDir {
    create_test_project(vec![
        ("api/v1/product/get.ts", include_str!("fixtures/product_get.ts")),
        ("api/v1/product/post.ts", include_str!("fixtures/product_post.ts")),
        ("api/v1/product/schema.ts", include_str!("fixtures/shared_schema.ts")),
        ("api/v1/order/put.ts", include_str!("fixtures/order_put.ts")),
    ])
}

fn config_for(root: &Path) -> GeneratorConfig {
    GeneratorConfig::new(root.to_path_buf(), ".")
}

#[tokio::test]
async fn test_end_to_end_generation() {
    let temp_dir = product_project();

    let generation = pipeline::run(&config_for(temp_dir.path()))
        .await
        .expect("Generation failed");

    assert_eq!(generation.discovered, 4);
    assert_eq!(generation.routes, 3);
    assert!(generation.is_complete());

    let expected = r#"// THIS IS GENERATED FILE
// DO NOT EDIT

import { ProductQuery } from "./api/v1/product/schema"
import { ProductSchema } from "./api/v1/product/schema"
import { Role } from "./auth/roles"
import { z } from "zod"

export default {
  "order.put": {
    method: "PUT",
    path: "./api/v1/order/put.ts",
    url: "api/v1/order",
    auth: false,
    isAdmin: false,
    schema: z.object({
})
  },
  "product.get": {
    method: "GET",
    path: "./api/v1/product/get.ts",
    url: "api/v1/product",
    auth: true,
    isAdmin: true,
    schema: z.object({
body: ProductSchema,
})
  },
  "product.post": {
    method: "POST",
    path: "./api/v1/product/post.ts",
    url: "api/v1/product",
    auth: true,
    isAdmin: false,
    schema: z.object({
body: ProductSchema.extend({ draft: z.boolean() }),
headers: z.object({ "x-request-id": z.string() }),
query: ProductQuery,
})
  },
}
"#;
    assert_eq!(generation.document, expected);
}

#[tokio::test]
async fn test_output_is_stable_across_runs() {
    let temp_dir = product_project();
    let config = config_for(temp_dir.path());

    let first = pipeline::run(&config).await.unwrap().document;
    for _ in 0..5 {
        assert_eq!(pipeline::run(&config).await.unwrap().document, first);
    }
}

#[tokio::test]
async fn test_single_route_round_trip() {
    let temp_dir = create_test_project(vec![(
        "api/v1/product/get.ts",
        r#"
import { ProductSchema } from "./schema";
export default createRoute({ auth: true, roles: [Role.Admin], body: ProductSchema });
"#,
    )]);

    let generation = pipeline::run(&config_for(temp_dir.path())).await.unwrap();
    let doc = &generation.document;

    assert!(doc.contains("  \"product.get\": {\n"));
    assert!(doc.contains("    url: \"api/v1/product\",\n"));
    assert!(doc.contains("    auth: true,\n"));
    assert!(doc.contains("    isAdmin: true,\n"));
    assert!(doc.contains("    schema: z.object({\nbody: ProductSchema,\n})\n"));
    assert!(doc.contains("import { ProductSchema } from \"./api/v1/product/schema\"\n"));
}

#[tokio::test]
async fn test_prefix_is_part_of_logical_path() {
    let temp_dir = create_test_project(vec![(
        "v1/product/get.ts",
        "export default createRoute({ auth: true });",
    )]);

    let mut config = GeneratorConfig::new(temp_dir.path().to_path_buf(), "api");
    config.api_prefix = "api/".to_string();
    let generation = pipeline::run(&config).await.unwrap();

    assert!(generation.document.contains("\"v1/product.get\""));
    assert!(generation.document.contains("path: \"api/v1/product/get.ts\""));
    assert!(generation.document.contains("url: \"api/v1/product\""));
}

#[tokio::test]
async fn test_patch_and_options_routes_keep_their_segment() {
    let temp_dir = create_test_project(vec![
        ("api/v1/product/get.ts", "export default createRoute({});"),
        ("api/v1/product/patch.ts", "export default createRoute({ auth: true });"),
        ("api/v1/product/options.ts", "export default createRoute({});"),
    ]);

    let generation = pipeline::run(&config_for(temp_dir.path())).await.unwrap();
    let doc = &generation.document;

    assert_eq!(generation.routes, 3);
    assert!(doc.contains("  \"product.get\": {\n    method: \"GET\",\n    path: \"./api/v1/product/get.ts\",\n    url: \"api/v1/product\",\n"));
    assert!(doc.contains("  \"product/patch\": {\n    method: \"PATCH\",\n    path: \"./api/v1/product/patch.ts\",\n    url: \"api/v1/product/patch\",\n"));
    assert!(doc.contains("  \"product/options\": {\n    method: \"OPTIONS\",\n    path: \"./api/v1/product/options.ts\",\n    url: \"api/v1/product/options\",\n"));
}

#[tokio::test]
async fn test_files_without_method_suffix_are_dropped() {
    let temp_dir = create_test_project(vec![
        ("api/v1/product/get.ts", "export default createRoute({});"),
        ("api/v1/product/schema.ts", "export const x = 1;"),
        ("api/v1/product/helpers.ts", "export function help() {}"),
    ]);

    let generation = pipeline::run(&config_for(temp_dir.path())).await.unwrap();

    assert_eq!(generation.routes, 1);
    assert!(generation.is_complete());
    let skipped: Vec<_> = generation.skipped().map(|d| d.path.as_str()).collect();
    assert_eq!(
        skipped,
        vec!["./api/v1/product/helpers.ts", "./api/v1/product/schema.ts"]
    );
    assert!(!generation.document.contains("schema.ts"));
}

#[tokio::test]
async fn test_ignored_directories_are_not_scanned() {
    let temp_dir = create_test_project(vec![
        ("api/v1/product/get.ts", "export default createRoute({});"),
        ("node_modules/lib/get.ts", "this is not typescript {"),
    ]);

    let mut config = config_for(temp_dir.path());
    config.ignore_dirs = vec!["node_modules".to_string()];
    let generation = pipeline::run(&config).await.unwrap();

    assert_eq!(generation.discovered, 1);
    assert!(generation.is_complete());
}

#[tokio::test]
async fn test_broken_file_is_reported_and_others_survive() {
    let temp_dir = create_test_project(vec![
        ("api/v1/product/get.ts", "export default createRoute({ auth: true });"),
        ("api/v1/order/post.ts", "export default createRoute({ body: "),
    ]);

    let generation = pipeline::run(&config_for(temp_dir.path())).await.unwrap();

    assert_eq!(generation.routes, 1);
    assert!(generation.document.contains("\"product.get\""));
    let fatal: Vec<_> = generation.fatal_diagnostics().collect();
    assert_eq!(fatal.len(), 1);
    assert_eq!(fatal[0].path, "./api/v1/order/post.ts");
    assert_eq!(fatal[0].kind, DiagnosticKind::ParseFailure);
}

#[tokio::test]
async fn test_cli_writes_manifest_and_report() {
    let temp_dir = product_project();
    let out_dir = TempDir::new().unwrap();
    let output = out_dir.path().join("generated/routes.ts");
    let report = out_dir.path().join("report.json");

    let args = CliArgs::try_parse_from([
        OsString::from("route-manifest"),
        temp_dir.path().into(),
        ".".into(),
        output.as_path().into(),
        "--report".into(),
        report.as_path().into(),
    ])
    .unwrap();
    cli::run(args).await.expect("CLI run failed");

    let manifest = std::fs::read_to_string(&output).unwrap();
    assert!(manifest.starts_with("// THIS IS GENERATED FILE\n// DO NOT EDIT\n"));
    assert!(manifest.contains("\"product.post\""));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(report["complete"], true);
    assert_eq!(report["routes"], 3);
    assert_eq!(report["diagnostics"][0]["kind"], "unrecognized_method");
}

#[tokio::test]
async fn test_cli_refuses_to_write_partial_manifest() {
    let temp_dir = create_test_project(vec![
        ("api/v1/product/get.ts", "export default createRoute({});"),
        ("api/v1/order/get.ts", "export default createRoute({"),
    ]);
    let out_dir = TempDir::new().unwrap();
    let output = out_dir.path().join("routes.ts");

    let args = CliArgs::try_parse_from([
        OsString::from("route-manifest"),
        temp_dir.path().into(),
        ".".into(),
        output.as_path().into(),
    ])
    .unwrap();
    let err = cli::run(args).await.unwrap_err();

    assert!(err.to_string().contains("1 of 2 route files"));
    assert!(!output.exists());
}

#[tokio::test]
async fn test_cli_allow_partial_writes_manifest() {
    let temp_dir = create_test_project(vec![
        ("api/v1/product/get.ts", "export default createRoute({});"),
        ("api/v1/order/get.ts", "export default createRoute({"),
    ]);
    let out_dir = TempDir::new().unwrap();
    let output = out_dir.path().join("routes.ts");
    let report = out_dir.path().join("report.yaml");

    let args = CliArgs::try_parse_from([
        OsString::from("route-manifest"),
        temp_dir.path().into(),
        ".".into(),
        output.as_path().into(),
        "--allow-partial".into(),
        "--report".into(),
        report.as_path().into(),
        "--report-format".into(),
        "yaml".into(),
    ])
    .unwrap();
    cli::run(args).await.unwrap();

    let manifest = std::fs::read_to_string(&output).unwrap();
    assert!(manifest.contains("\"product.get\""));
    assert!(!manifest.contains("\"order.get\""));

    let report = std::fs::read_to_string(&report).unwrap();
    assert!(report.contains("complete: false"));
    assert!(report.contains("./api/v1/order/get.ts"));
    assert!(report.contains("parse_failure"));
}
