//! Stock layouts and demo templates
//!
//! Used by the bundled server binary and as a starting point for
//! applications that register their own classes.

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rand::{Rng, RngCore};
use serde_json::{json, Map, Value};

use super::{DeclaredTemplate, Registry, RegistryBuilder, StaticLayout, Variable};
use crate::schema::{Key, Schema};

const BRANDED_LAYOUT: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{{ subject }}</title>
</head>
<body style="margin:0;background:#f4f4f7;font-family:Helvetica,Arial,sans-serif;">
<table role="presentation" width="100%" cellpadding="0" cellspacing="0">
<tr><td align="center" style="padding:32px 0;">
<table role="presentation" width="600" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:6px;">
<tr><td style="padding:32px;color:#333333;font-size:15px;line-height:1.6;">
{{ body }}
</td></tr>
</table>
<p style="color:#9a9ea6;font-size:12px;">You are receiving this email because you have an account with us.</p>
</td></tr>
</table>
</body>
</html>"#;

const PLAIN_LAYOUT: &str = "<html><body>{{ body }}</body></html>";

/// The branded default layout
#[must_use]
pub fn branded_layout() -> StaticLayout {
    StaticLayout::new("default", BRANDED_LAYOUT).description("Branded card")
}

/// A minimal layout with no styling
#[must_use]
pub fn plain_layout() -> StaticLayout {
    StaticLayout::new("plain", PLAIN_LAYOUT).description("Plain HTML")
}

/// Welcome email sent after sign up
#[must_use]
pub fn welcome() -> DeclaredTemplate {
    DeclaredTemplate::new("welcome")
        .description("Sent after a user signs up")
        .kwarg(Key::new("user_name", Schema::string_len(1, Some(80))))
        .kwarg(Key::new("activation_url", Schema::Url))
        .variable(Variable::new("name", Schema::string_len(1, Some(80))))
        .variable(Variable::new("activation_url", Schema::Url))
        .map_variables(welcome_variables)
        .seed(
            "Welcome aboard, {{ name }}!",
            "<h1>Hi {{ name }},</h1>\n<p>Thanks for signing up. Please <a href=\"{{ activation_url }}\">activate your account</a>.</p>",
        )
}

fn welcome_variables(kwargs: &Map<String, Value>) -> Map<String, Value> {
    let mut variables = Map::new();
    if let Some(name) = kwargs.get("user_name") {
        variables.insert("name".to_string(), name.clone());
    }
    variables
}

/// Password reset email
#[must_use]
pub fn password_reset() -> DeclaredTemplate {
    DeclaredTemplate::new("password_reset")
        .description("Password reset link")
        .kwarg(Key::new("email", Schema::Email))
        .kwarg(Key::new("token", Schema::string_len(16, Some(64))))
        .kwarg(Key::new("expires_in_hours", Schema::int_range(Some(1), Some(72))).default(json!(24)))
        .variable(Variable::new("email", Schema::Email))
        .variable(Variable::new("reset_url", Schema::Url).fake(fake_reset_url))
        .variable(Variable::new("expires_in_hours", Schema::int_range(Some(1), Some(72))))
        .map_variables(password_reset_variables)
        .seed(
            "Reset your password",
            "<p>A password reset was requested for {{ email }}.</p>\n<p><a href=\"{{ reset_url }}\">Choose a new password</a>. The link expires in {{ expires_in_hours }} hours.</p>",
        )
}

fn password_reset_variables(kwargs: &Map<String, Value>) -> Map<String, Value> {
    let mut variables = Map::new();
    if let Some(token) = kwargs.get("token").and_then(Value::as_str) {
        variables.insert(
            "reset_url".to_string(),
            Value::String(format!(
                "https://example.com/reset/{}",
                utf8_percent_encode(token, NON_ALPHANUMERIC)
            )),
        );
    }
    variables
}

fn fake_reset_url(rng: &mut dyn RngCore) -> Value {
    let token: String = (0..24)
        .map(|_| char::from(b'a' + rng.gen_range(0..26u8)))
        .collect();
    Value::String(format!("https://example.com/reset/{token}"))
}

/// Order shipped notification with nested data
#[must_use]
pub fn order_shipped() -> DeclaredTemplate {
    let item = Schema::dict([
        Key::new("title", Schema::string_len(1, Some(120))),
        Key::new("quantity", Schema::int_range(Some(1), Some(99))),
    ]);
    let order = Schema::dict([
        Key::new("number", Schema::int_range(Some(1), None)),
        Key::new("items", Schema::list_len(item, 1, Some(10))),
    ]);

    DeclaredTemplate::new("order_shipped")
        .description("Order has left the warehouse")
        .kwarg(Key::new("order", order.clone()))
        .kwarg(Key::new("tracking_url", Schema::Url.nullable()).optional())
        .variable(Variable::new("order", order))
        .variable(Variable::new("tracking_url", Schema::Url.nullable()).default(Value::Null))
        .seed(
            "Order #{{ order.number }} has shipped",
            "<p>Your order #{{ order.number }} is on its way:</p>\n<ul>{% for item in order.items %}<li>{{ item.quantity }} x {{ item.title }}</li>{% endfor %}</ul>\n{% if tracking_url %}<p><a href=\"{{ tracking_url }}\">Track your parcel</a></p>{% endif %}",
        )
}

/// Builder pre-populated with the stock layouts and demo templates
#[must_use]
pub fn registry_builder() -> RegistryBuilder {
    Registry::builder()
        .layout(branded_layout())
        .layout(plain_layout())
        .template(welcome())
        .template(password_reset())
        .template(order_shipped())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::fake_variables_with;
    use crate::template::{Compiler, TemplateClass, TemplateInstance};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_registry_builds() {
        let registry = registry_builder().build().unwrap();
        assert_eq!(registry.default_layout().name(), "default");
        assert_eq!(registry.templates().len(), 3);
    }

    #[test]
    fn test_every_seed_compiles_with_fake_data() {
        let registry = registry_builder().build().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let compiler = Compiler::new();

        for class in registry.templates() {
            for layout in registry.layouts() {
                let variables = fake_variables_with(class.as_ref(), &mut rng);
                let instance = TemplateInstance::new(Arc::clone(class), Arc::clone(layout), "spam")
                    .kwargs(crate::fake::fake_kwargs_with(class.as_ref(), &mut rng))
                    .force_variables(variables)
                    .subject(class.default_subject())
                    .body(class.default_body());

                let compiled = compiler.compile(&instance);
                assert!(
                    compiled.is_ok(),
                    "{} in {} failed: {:?}",
                    class.name(),
                    layout.name(),
                    compiled.err()
                );
            }
        }
    }

    #[test]
    fn test_every_seed_compiles_from_fake_kwargs_alone() {
        let registry = registry_builder().build().unwrap();
        let compiler = Compiler::new();

        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            for class in registry.templates() {
                let instance = TemplateInstance::new(
                    Arc::clone(class),
                    registry.default_layout(),
                    "spam",
                )
                .kwargs(crate::fake::fake_kwargs_with(class.as_ref(), &mut rng))
                .subject(class.default_subject())
                .body(class.default_body());

                let compiled = compiler.compile(&instance);
                assert!(
                    compiled.is_ok(),
                    "{} with seed {seed} failed: {:?}",
                    class.name(),
                    compiled.err()
                );
            }
        }
    }

    #[test]
    fn test_password_reset_encodes_token_in_url() {
        let mut kwargs = Map::new();
        kwargs.insert("token".into(), json!("amber river maple"));
        let variables = password_reset().get_variables(&kwargs);
        assert_eq!(
            variables.get("reset_url"),
            Some(&json!("https://example.com/reset/amber%20river%20maple"))
        );
        assert!(Schema::Url.validate(&variables["reset_url"]).is_ok());
    }

    #[test]
    fn test_password_reset_builds_url_from_token() {
        let class = password_reset();
        let mut kwargs = Map::new();
        kwargs.insert("token".into(), json!("abcdefghijklmnop"));
        let variables = class.get_variables(&kwargs);
        assert_eq!(
            variables.get("reset_url"),
            Some(&json!("https://example.com/reset/abcdefghijklmnop"))
        );
    }
}
