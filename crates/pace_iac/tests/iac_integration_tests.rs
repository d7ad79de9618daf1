//! Integration tests for resolution, input building and generation.

use std::fs;

use pace_iac::{validate_manifest, ArtifactGenerator, GenerateOptions, IacError};
use pace_spec::{Catalog, InputValue, Loader, Manifest, Value};
use pace_templates::TemplateRenderer;
use tempfile::tempdir;

const CATALOG: &str = r#"
resources:
  community/aws/storage/bucket:
    source: terraform-aws-modules/s3-bucket/aws
    version: "3.15.1"
    inputs:
      - from: id
        to: bucket
      - from: versioning
        to: versioning.enabled
    outputs:
      - from: s3_bucket_arn
        to: arn
  community/gcp/storage/bucket:
    source: terraform-google-modules/cloud-storage/google
    version: "5.0.0"
    inputs:
      - from: id
        to: names
  community/aws/net/vpc:
    source: terraform-aws-modules/vpc/aws
    version: "5.0.0"
    inputs:
      - from: id
        to: name
    outputs:
      - from: vpc_id
        to: id
  community/aws/data/postgres:
    source: terraform-aws-modules/rds/aws
    version: "6.1.0"
    inputs:
      - from: id
        to: identifier
      - from: size
        to: instance_class
        default: small
      - from: engine_version
        to: engine_version
        required: true
      - from: network
        to: vpc_id
        default: "{{ ref.network.id }}"
    outputs:
      - from: db_instance_endpoint
        to: endpoint
    dependencies:
      - id: network
        uses: vpc
  community/aws/compute/service:
    source: ./modules/service
    inputs:
      - from: id
        to: name
      - from: database
        to: db_host
        required: true
      - from: replicas
        to: desired_count
        default: 1
"#;

fn catalog() -> Catalog {
    Loader::parse_catalog(CATALOG.as_bytes()).unwrap()
}

fn manifest(yaml: &str) -> Manifest {
    Loader::parse_manifest(yaml.as_bytes()).unwrap()
}

const SHOP: &str = r#"
name: shop
stack: aws
resources:
  - id: orders
    uses: postgres
    with:
      size: large
      engine_version: "15"
  - id: api
    uses: service
    with:
      database: "{{ ref.orders.endpoint }}"
  - id: my-bucket
    uses: community/aws/storage/bucket
    with:
      versioning: true
"#;

#[test]
fn test_bucket_scenario_inputs() {
    let catalog = catalog();
    let manifest = manifest(
        r#"
name: demo
stack: aws
resources:
  - id: my-bucket
    uses: bucket
    with:
      versioning: true
"#,
    );

    let generator = ArtifactGenerator::new(&catalog, TemplateRenderer::new());
    let artifacts = generator.render(&manifest, &GenerateOptions::new()).unwrap();
    assert_eq!(artifacts.len(), 1);

    let inputs = &artifacts[0].inputs;
    assert_eq!(inputs.len(), 2);
    assert_eq!(inputs["bucket"], InputValue::Literal(Value::from("my-bucket")));
    assert_eq!(inputs["versioning.enabled"], InputValue::Literal(Value::Bool(true)));

    let json = serde_json::to_value(inputs).unwrap();
    assert_eq!(json, serde_json::json!({"bucket": "my-bucket", "versioning.enabled": true}));
}

#[test]
fn test_generate_writes_one_file_per_request() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("infra");
    let catalog = catalog();
    let manifest = manifest(SHOP);

    let generator = ArtifactGenerator::new(&catalog, TemplateRenderer::new());
    let report = generator
        .generate(&manifest, &GenerateOptions::new().output_dir(&out))
        .unwrap();

    let ids: Vec<&str> = report.artifacts.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["orders", "api", "my-bucket"]);
    assert!(out.join("orders.tf").exists());
    assert!(out.join("api.tf").exists());
    assert!(out.join("my-bucket.tf").exists());
    assert!(!out.join("network.tf").exists());

    let orders = fs::read_to_string(out.join("orders.tf")).unwrap();
    assert!(orders.contains("module \"orders\" {"));
    assert!(orders.contains("  instance_class = \"db.t3.large\"\n"));
    assert!(orders.contains("  vpc_id = module.network.vpc_id\n"));

    let api = fs::read_to_string(out.join("api.tf")).unwrap();
    assert!(api.contains("  source = \"./modules/service\"\n"));
    assert!(!api.contains("version ="));
    assert!(api.contains("  db_host = module.orders.db_instance_endpoint\n"));
    assert!(api.contains("  desired_count = 1\n"));
}

#[test]
fn test_generation_is_deterministic() {
    let catalog = catalog();
    let manifest = manifest(SHOP);
    let generator = ArtifactGenerator::new(&catalog, TemplateRenderer::new());

    let first = tempdir().unwrap();
    let second = tempdir().unwrap();
    generator
        .generate(&manifest, &GenerateOptions::new().output_dir(first.path()))
        .unwrap();
    generator
        .generate(&manifest, &GenerateOptions::new().output_dir(second.path()))
        .unwrap();

    for name in ["orders.tf", "api.tf", "my-bucket.tf"] {
        let a = fs::read(first.path().join(name)).unwrap();
        let b = fs::read(second.path().join(name)).unwrap();
        assert_eq!(a, b, "{} differs between runs", name);
    }
}

#[test]
fn test_failure_keeps_earlier_artifacts() {
    let dir = tempdir().unwrap();
    let catalog = catalog();
    let manifest = manifest(
        r#"
name: shop
stack: aws
resources:
  - id: assets
    uses: bucket
  - id: orders
    uses: postgres
  - id: logs
    uses: bucket
"#,
    );

    let generator = ArtifactGenerator::new(&catalog, TemplateRenderer::new());
    let err = generator
        .generate(&manifest, &GenerateOptions::new().output_dir(dir.path()))
        .unwrap_err();

    match err {
        IacError::MissingRequiredInput { id, input } => {
            assert_eq!(id, "orders");
            assert_eq!(input, "engine_version");
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(dir.path().join("assets.tf").exists());
    assert!(!dir.path().join("orders.tf").exists());
    assert!(!dir.path().join("logs.tf").exists());
}

#[test]
fn test_stack_mismatch_writes_nothing() {
    let dir = tempdir().unwrap();
    let catalog = catalog();
    let manifest = manifest(
        r#"
name: shop
stack: aws
resources:
  - id: assets
    uses: bucket
  - id: archive
    uses: community/gcp/storage/bucket
"#,
    );

    let generator = ArtifactGenerator::new(&catalog, TemplateRenderer::new());
    let err = generator
        .generate(&manifest, &GenerateOptions::new().output_dir(dir.path()))
        .unwrap_err();

    assert_eq!(err.resource_id(), Some("archive"));
    assert!(matches!(err.root_cause(), IacError::StackMismatch { .. }));
    assert!(!dir.path().join("assets.tf").exists());
}

#[test]
fn test_include_dependencies_renders_network() {
    let dir = tempdir().unwrap();
    let catalog = catalog();
    let manifest = manifest(SHOP);

    let generator = ArtifactGenerator::new(&catalog, TemplateRenderer::new());
    let options = GenerateOptions::new()
        .output_dir(dir.path())
        .include_dependencies(true);
    let report = generator.generate(&manifest, &options).unwrap();

    assert_eq!(report.artifacts.last().map(|a| a.id.as_str()), Some("network"));
    let network = fs::read_to_string(dir.path().join("network.tf")).unwrap();
    assert!(network.contains("  name = \"network\"\n"));
}

#[test]
fn test_custom_template_and_extension() {
    let catalog = catalog();
    let manifest = manifest(SHOP);
    let renderer = TemplateRenderer::new().with_template("summary", "{{id}} => {{resource_type}}\n");

    let generator = ArtifactGenerator::new(&catalog, renderer);
    let options = GenerateOptions::new().template("summary").extension("txt");
    let artifacts = generator.render(&manifest, &options).unwrap();

    assert_eq!(artifacts[2].file_name, "my-bucket.txt");
    assert_eq!(
        String::from_utf8(artifacts[2].contents.clone()).unwrap(),
        "my-bucket => community/aws/storage/bucket\n"
    );
}

#[test]
fn test_validate_reports_all_problems() {
    let catalog = catalog();
    let manifest = manifest(
        r#"
name: shop
stack: aws
resources:
  - id: api
    uses: service
  - id: archive
    uses: community/gcp/storage/bucket
  - id: orders
    uses: postgres
    with:
      engine_version: "15"
      storage: 100
"#,
    );

    let result = validate_manifest(&manifest, &catalog);
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 2);
    assert!(result.errors[0].starts_with("api: missing required input 'database'"));
    assert!(result.errors[1].starts_with("archive: Module 'community/gcp/storage/bucket' does not belong"));
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].starts_with("orders: input 'storage'"));
}

#[test]
fn test_validate_accepts_generatable_manifest() {
    let result = validate_manifest(&manifest(SHOP), &catalog());
    assert!(result.valid, "{:?}", result.errors);
}
