//! Artifact rendering.

use std::collections::HashMap;

use pace_spec::{InputMap, ResourceRequest, ResourceSpec};
use regex::Regex;
use tracing::debug;

use crate::error::{TemplateError, TemplateResult};
use crate::hcl;

/// Name of the built-in Terraform module template.
pub const MODULE_TEMPLATE: &str = "module.tf";

const DEFAULT_MODULE_TEMPLATE: &str = r#"# Generated by pace for resource "{{id}}" ({{resource_type}}). Do not edit by hand.

module "{{id}}" {
  source = "{{source}}"
{{version_line}}{{inputs}}}
"#;

/// Everything a template may draw on for one resource.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// The request being rendered.
    pub request: &'a ResourceRequest,
    /// Fully-qualified catalog name the request resolved to.
    pub resource_type: &'a str,
    /// The catalog entry.
    pub entry: &'a ResourceSpec,
    /// Final module inputs.
    pub inputs: &'a InputMap,
}

impl<'a> RenderContext<'a> {
    /// Build the placeholder values for this context.
    pub fn variables(&self) -> TemplateResult<HashMap<&'static str, String>> {
        let mut vars = HashMap::new();

        vars.insert("id", hcl::escape(&self.request.id));
        vars.insert("uses", hcl::escape(&self.request.uses));
        vars.insert("resource_type", hcl::escape(self.resource_type));
        vars.insert("source", hcl::escape(&self.entry.source));
        vars.insert("version", hcl::escape(&self.entry.version));

        let version_line = if self.entry.version.is_empty() {
            String::new()
        } else {
            format!("  version = {}\n", hcl::quote(&self.entry.version))
        };
        vars.insert("version_line", version_line);

        let arguments = hcl::render_arguments(self.inputs, 1)?;
        let inputs = if arguments.is_empty() {
            arguments
        } else {
            format!("\n{}", arguments)
        };
        vars.insert("inputs", inputs);

        Ok(vars)
    }
}

/// Turns a render context into artifact bytes.
pub trait ArtifactRenderer {
    fn render(&self, template_name: &str, context: &RenderContext<'_>) -> TemplateResult<Vec<u8>>;
}

/// Placeholder-substituting renderer over a set of named templates.
///
/// Templates use `{{ variable }}` placeholders; see
/// [`RenderContext::variables`] for the available names.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    templates: HashMap<String, String>,
    variable_pattern: Regex,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Create a renderer holding only the built-in module template.
    pub fn new() -> Self {
        let mut templates = HashMap::new();
        templates.insert(MODULE_TEMPLATE.to_string(), DEFAULT_MODULE_TEMPLATE.to_string());

        Self {
            templates,
            // Match {{variable_name}}, tolerating inner whitespace
            variable_pattern: Regex::new(r"\{\{\s*([a-zA-Z_][a-zA-Z0-9_]*)\s*\}\}").unwrap(),
        }
    }

    /// Add or replace a template.
    pub fn with_template(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.register(name, content);
        self
    }

    /// Add or replace a template.
    pub fn register(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.templates.insert(name.into(), content.into());
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Registered template names, sorted.
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Substitute placeholders in `content`.
    ///
    /// Every placeholder must name a known variable.
    pub fn render_content(
        &self,
        template_name: &str,
        content: &str,
        variables: &HashMap<&'static str, String>,
    ) -> TemplateResult<String> {
        for caps in self.variable_pattern.captures_iter(content) {
            if !variables.contains_key(&caps[1]) {
                return Err(TemplateError::UnknownVariable {
                    template: template_name.to_string(),
                    variable: caps[1].to_string(),
                });
            }
        }

        Ok(self
            .variable_pattern
            .replace_all(content, |caps: &regex::Captures| {
                variables.get(&caps[1]).cloned().unwrap_or_default()
            })
            .into_owned())
    }
}

impl ArtifactRenderer for TemplateRenderer {
    fn render(&self, template_name: &str, context: &RenderContext<'_>) -> TemplateResult<Vec<u8>> {
        let template = self
            .templates
            .get(template_name)
            .ok_or_else(|| TemplateError::NotFound(template_name.to_string()))?;

        debug!("Rendering template {} for {}", template_name, context.request.id);

        let variables = context.variables()?;
        let rendered = self.render_content(template_name, template, &variables)?;
        Ok(rendered.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pace_spec::{InputValue, Value};

    fn bucket_entry() -> ResourceSpec {
        ResourceSpec::new("terraform-aws-modules/s3-bucket/aws", "3.15.1")
    }

    #[test]
    fn test_render_builtin_module() {
        let request = ResourceRequest::new("my-bucket", "bucket");
        let entry = bucket_entry();
        let mut inputs = InputMap::new();
        inputs.insert("bucket".into(), InputValue::Literal(Value::from("my-bucket")));
        inputs.insert("versioning.enabled".into(), InputValue::Literal(Value::from(true)));

        let context = RenderContext {
            request: &request,
            resource_type: "community/aws/storage/bucket",
            entry: &entry,
            inputs: &inputs,
        };

        let bytes = TemplateRenderer::new().render(MODULE_TEMPLATE, &context).unwrap();
        let expected = r#"# Generated by pace for resource "my-bucket" (community/aws/storage/bucket). Do not edit by hand.

module "my-bucket" {
  source = "terraform-aws-modules/s3-bucket/aws"
  version = "3.15.1"

  bucket = "my-bucket"
  versioning = {
    enabled = true
  }
}
"#;
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn test_local_module_without_inputs() {
        let request = ResourceRequest::new("net", "vpc");
        let entry = ResourceSpec::new("./modules/vpc", "");
        let inputs = InputMap::new();
        let context = RenderContext {
            request: &request,
            resource_type: "platform/aws/net/vpc",
            entry: &entry,
            inputs: &inputs,
        };

        let rendered = TemplateRenderer::new()
            .with_template("short", "module \"{{ id }}\" {\n  source = \"{{source}}\"\n{{version_line}}{{inputs}}}\n")
            .render("short", &context)
            .unwrap();
        assert_eq!(
            String::from_utf8(rendered).unwrap(),
            "module \"net\" {\n  source = \"./modules/vpc\"\n}\n"
        );
    }

    #[test]
    fn test_unknown_variable_and_template() {
        let request = ResourceRequest::new("net", "vpc");
        let entry = ResourceSpec::new("./modules/vpc", "");
        let inputs = InputMap::new();
        let context = RenderContext {
            request: &request,
            resource_type: "platform/aws/net/vpc",
            entry: &entry,
            inputs: &inputs,
        };

        let renderer = TemplateRenderer::new().with_template("bad", "{{ region }}");
        assert!(matches!(
            renderer.render("bad", &context),
            Err(TemplateError::UnknownVariable { .. })
        ));
        assert!(matches!(
            renderer.render("missing", &context),
            Err(TemplateError::NotFound(_))
        ));
        assert_eq!(renderer.template_names(), vec!["bad", MODULE_TEMPLATE]);
    }
}
