//! This module provides a service for rendering templates using the minijinja
//! templating engine, and the composer that turns batch items into
//! notification titles and bodies.

use minijinja::Environment;
use serde_json::json;
use thiserror::Error;

use crate::models::{BatchItem, NotificationMessage, RegionId};

/// Title template used when none is configured.
pub const DEFAULT_TITLE_TEMPLATE: &str = "{{ name }} is in the {{ region }} {{ source }}";

/// Body template used when none is configured.
pub const DEFAULT_BODY_TEMPLATE: &str =
    "{{ name }} is available in the {{ region }} {{ source }} right now.";

/// A service for rendering templates using the minijinja templating engine.
pub struct TemplateService {
    env: Environment<'static>,
}

/// Error type for the TemplateService.
#[derive(Debug, Error)]
pub enum TemplateServiceError {
    /// An error occurred while rendering the template.
    #[error("Failed to render template: {0}")]
    RenderError(#[from] minijinja::Error),
}

impl Default for TemplateService {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateService {
    /// Creates a new instance of `TemplateService` with a strict environment,
    /// so templates referring to unknown variables fail instead of rendering
    /// blanks.
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(minijinja::UndefinedBehavior::Strict);

        Self { env }
    }

    /// Renders a template with the given context.
    pub fn render(
        &self,
        template_str: &str,
        context: serde_json::Value,
    ) -> Result<String, TemplateServiceError> {
        tracing::debug!(
            template = template_str,
            context = %context,
            "Rendering template with context."
        );

        match self.env.render_str(template_str, context) {
            Ok(rendered_string) => Ok(rendered_string),
            Err(e) => {
                tracing::warn!("Failed to render template '{}': {}", template_str, e);
                Err(TemplateServiceError::RenderError(e))
            }
        }
    }

    /// Parses a template without rendering it.
    pub fn check_syntax(&self, template_str: &str) -> Result<(), TemplateServiceError> {
        self.env.template_from_str(template_str)?;
        Ok(())
    }
}

/// Renders the title and body of an item notification.
pub struct MessageComposer {
    templates: NotificationMessage,
    service: TemplateService,
}

impl Default for MessageComposer {
    fn default() -> Self {
        Self::new(NotificationMessage {
            title: DEFAULT_TITLE_TEMPLATE.to_string(),
            body: DEFAULT_BODY_TEMPLATE.to_string(),
        })
    }
}

impl MessageComposer {
    /// Creates a composer for the given title and body templates.
    pub fn new(templates: NotificationMessage) -> Self {
        Self { templates, service: TemplateService::new() }
    }

    /// Parses both templates, so syntax errors are caught at startup instead
    /// of on the first notification.
    pub fn validate(&self) -> Result<(), TemplateServiceError> {
        self.service.check_syntax(&self.templates.title)?;
        self.service.check_syntax(&self.templates.body)
    }

    /// Returns `(title, body)` for an item. If rendering fails the item's
    /// display name, or its raw identifier, is used for both.
    pub fn compose(
        &self,
        region: &RegionId,
        source: &str,
        item_id: &str,
        item: &BatchItem,
    ) -> (String, String) {
        let context = Self::context(region, source, item_id, item);
        let title = self.service.render(&self.templates.title, context.clone());
        let body = self.service.render(&self.templates.body, context);

        match (title, body) {
            (Ok(title), Ok(body)) => (title, body),
            _ => {
                let fallback = item.label().unwrap_or(item_id).to_string();
                (fallback.clone(), fallback)
            }
        }
    }

    fn context(
        region: &RegionId,
        source: &str,
        item_id: &str,
        item: &BatchItem,
    ) -> serde_json::Value {
        json!({
            "item_id": item_id,
            "name": item.label().unwrap_or(item_id),
            "region": region,
            "source": source,
            "icon": item.display_icon,
            "metadata": item.metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_render_template_with_context() {
        let service = TemplateService::new();
        let template = "Region: {{ region }}, Item: {{ item.name }}";
        let context = json!({ "region": "TR", "item": { "name": "Prime Vandal" } });
        let result = service.render(template, context).unwrap();
        assert_eq!(result, "Region: TR, Item: Prime Vandal");
    }

    #[test]
    fn test_render_template_with_invalid_template() {
        let service = TemplateService::new();
        let result = service.render("Hello, {{ name }", json!({ "name": "World" }));
        assert!(matches!(result, Err(TemplateServiceError::RenderError(_))));
    }

    #[test]
    fn test_compose_uses_display_name() {
        let composer = MessageComposer::default();
        let item = BatchItem::new("skin-42").with_display_name("Prime Vandal");
        let (title, body) = composer.compose(&RegionId::new("TR"), "store", "skin-42", &item);
        assert_eq!(title, "Prime Vandal is in the TR store");
        assert_eq!(body, "Prime Vandal is available in the TR store right now.");
    }

    #[test]
    fn test_compose_falls_back_to_identifier() {
        let composer = MessageComposer::default();
        let item = BatchItem::new("skin-42");
        let (title, _) = composer.compose(&RegionId::new("TR"), "store", "skin-42", &item);
        assert_eq!(title, "skin-42 is in the TR store");
    }

    #[test]
    fn test_compose_render_failure_uses_label() {
        let composer = MessageComposer::new(NotificationMessage {
            title: "{{ missing_variable }}".to_string(),
            body: "ok".to_string(),
        });
        let item = BatchItem::new("skin-42").with_display_name("Prime Vandal");
        let (title, body) = composer.compose(&RegionId::new("TR"), "store", "skin-42", &item);
        assert_eq!(title, "Prime Vandal");
        assert_eq!(body, "Prime Vandal");
    }

    #[test]
    fn test_validate_rejects_syntax_errors() {
        let broken = MessageComposer::new(NotificationMessage {
            title: "{{ name }".to_string(),
            body: "ok".to_string(),
        });
        assert!(broken.validate().is_err());
        assert!(MessageComposer::default().validate().is_ok());
    }

    #[test]
    fn test_metadata_is_available_to_templates() {
        let composer = MessageComposer::new(NotificationMessage {
            title: "{{ name }}".to_string(),
            body: "{{ metadata.cost }} VP".to_string(),
        });
        let mut item = BatchItem::new("skin-42");
        item.metadata.insert("cost".to_string(), json!(1775));
        let (_, body) = composer.compose(&RegionId::new("TR"), "store", "skin-42", &item);
        assert_eq!(body, "1775 VP");
        assert!(composer.validate().is_ok());
    }
}
