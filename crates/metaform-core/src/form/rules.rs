//! Validation rule resolution and record-level validation.

use super::config::FormMode;
use crate::catalog::{FieldDef, SchemaDef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A resolved validation rule, tagged for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Value must be present and non-empty.
    Required {
        /// Violation message.
        message: String,
    },
    /// Minimum string length.
    MinLength {
        /// Threshold.
        value: u32,
        /// Violation message.
        message: String,
    },
    /// Maximum string length.
    MaxLength {
        /// Threshold.
        value: u32,
        /// Violation message.
        message: String,
    },
    /// Value must match a regular expression.
    Pattern {
        /// The expression source.
        value: String,
        /// Violation message.
        message: String,
    },
    /// Minimum numeric value.
    Min {
        /// Threshold.
        value: f64,
        /// Violation message.
        message: String,
    },
    /// Maximum numeric value.
    Max {
        /// Threshold.
        value: f64,
        /// Violation message.
        message: String,
    },
    /// Value must look like an email address.
    Email {
        /// Violation message.
        message: String,
    },
    /// Value must look like a URL.
    Url {
        /// Violation message.
        message: String,
    },
    /// Maximum number of array items.
    MaxItems {
        /// Threshold.
        value: u32,
        /// Violation message.
        message: String,
    },
}

/// Resolve a field's declared validation into ordered rules.
///
/// The required rule always comes first. `custom_message` overrides the
/// generated message of every declared rule except required.
pub fn resolve_rules(field: &FieldDef, label: &str) -> Vec<ValidationRule> {
    let mut rules = Vec::new();

    if field.required {
        rules.push(ValidationRule::Required {
            message: format!("{label} is required"),
        });
    }

    let Some(validation) = &field.validation else {
        return rules;
    };
    let custom = validation.custom_message.as_deref();
    let message = |fallback: String| custom.map_or(fallback, str::to_string);

    if let Some(value) = validation.min_length {
        rules.push(ValidationRule::MinLength {
            value,
            message: message(format!("Minimum length is {value}")),
        });
    }
    if let Some(value) = validation.max_length {
        rules.push(ValidationRule::MaxLength {
            value,
            message: message(format!("Maximum length is {value}")),
        });
    }
    if let Some(pattern) = &validation.pattern {
        rules.push(ValidationRule::Pattern {
            value: pattern.clone(),
            message: message("Invalid format".to_string()),
        });
    }
    if let Some(value) = validation.min {
        rules.push(ValidationRule::Min {
            value,
            message: message(format!("Minimum value is {value}")),
        });
    }
    if let Some(value) = validation.max {
        rules.push(ValidationRule::Max {
            value,
            message: message(format!("Maximum value is {value}")),
        });
    }
    if validation.email {
        rules.push(ValidationRule::Email {
            message: message("Invalid email address".to_string()),
        });
    }
    if validation.url {
        rules.push(ValidationRule::Url {
            message: message("Invalid URL".to_string()),
        });
    }
    if let Some(value) = validation.max_items {
        rules.push(ValidationRule::MaxItems {
            value,
            message: message(format!("Maximum {value} items")),
        });
    }

    rules
}

/// Validate a submitted value map against a schema's field rules.
///
/// Returns every violation message. Primary-key, auto-generated, and
/// auto-updated fields are skipped (the system owns their values). Pattern,
/// email, and url rules are left to the renderer; this check covers presence,
/// lengths, numeric ranges, and item counts.
pub fn validate_record(schema: &SchemaDef, data: &Map<String, Value>, mode: FormMode) -> Vec<String> {
    let mut violations = Vec::new();

    for field in &schema.fields {
        if field.primary_key || field.auto_generate || field.auto_update {
            continue;
        }
        let label = field
            .ui
            .as_ref()
            .and_then(|ui| ui.label.clone())
            .unwrap_or_else(|| super::config::humanize(&field.name));
        let value = data.get(&field.name);

        if field.required {
            let missing = match value {
                None => !mode.is_edit(),
                Some(Value::Null) => true,
                Some(Value::String(s)) => s.trim().is_empty(),
                Some(_) => false,
            };
            if missing {
                violations.push(format!("{label} is required"));
                continue;
            }
        }

        let Some(value) = value else { continue };
        let Some(validation) = &field.validation else {
            continue;
        };

        if let Value::String(s) = value {
            let len = s.chars().count() as u32;
            if let Some(min) = validation.min_length {
                if len < min {
                    violations.push(format!("{label}: minimum length is {min}"));
                }
            }
            if let Some(max) = validation.max_length {
                if len > max {
                    violations.push(format!("{label}: maximum length is {max}"));
                }
            }
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = validation.min {
                if n < min {
                    violations.push(format!("{label}: minimum value is {min}"));
                }
            }
            if let Some(max) = validation.max {
                if n > max {
                    violations.push(format!("{label}: maximum value is {max}"));
                }
            }
        }

        if let Value::Array(items) = value {
            if let Some(max) = validation.max_items {
                if items.len() as u32 > max {
                    violations.push(format!("{label}: maximum {max} items"));
                }
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FieldKind, ValidationRules};
    use serde_json::json;

    fn name_field() -> FieldDef {
        FieldDef::new("name", FieldKind::Text)
            .required()
            .with_validation(ValidationRules {
                min_length: Some(2),
                max_length: Some(50),
                ..Default::default()
            })
    }

    #[test]
    fn test_resolve_rules_order() {
        let rules = resolve_rules(&name_field(), "Name");

        assert_eq!(rules.len(), 3);
        assert!(matches!(&rules[0], ValidationRule::Required { message } if message == "Name is required"));
        assert!(matches!(&rules[1], ValidationRule::MinLength { value: 2, .. }));
        assert!(matches!(&rules[2], ValidationRule::MaxLength { value: 50, .. }));
    }

    #[test]
    fn test_custom_message_override() {
        let field = FieldDef::new("code", FieldKind::Text).with_validation(ValidationRules {
            pattern: Some("^[A-Z]{3}$".to_string()),
            custom_message: Some("Use a three-letter code".to_string()),
            ..Default::default()
        });
        let rules = resolve_rules(&field, "Code");

        assert!(matches!(
            &rules[0],
            ValidationRule::Pattern { message, .. } if message == "Use a three-letter code"
        ));
    }

    #[test]
    fn test_rule_serialization_tag() {
        let rule = ValidationRule::Min {
            value: 1.0,
            message: "Minimum value is 1".to_string(),
        };
        let json = serde_json::to_value(&rule).unwrap();

        assert_eq!(json["rule"], "min");
        assert_eq!(json["value"], 1.0);
    }

    fn product_schema() -> SchemaDef {
        SchemaDef::page("Product")
            .with_field(FieldDef::primary_key("id"))
            .with_field(name_field())
            .with_field(
                FieldDef::new("price", FieldKind::Decimal).with_validation(ValidationRules {
                    min: Some(0.0),
                    ..Default::default()
                }),
            )
    }

    #[test]
    fn test_validate_record_ok() {
        let data = json!({"name": "Gadget", "price": 9.5});
        let violations =
            validate_record(&product_schema(), data.as_object().unwrap(), FormMode::Create);

        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_validate_record_missing_required() {
        let data = json!({"price": 1.0});
        let violations =
            validate_record(&product_schema(), data.as_object().unwrap(), FormMode::Create);

        assert_eq!(violations, vec!["Name is required".to_string()]);
    }

    #[test]
    fn test_validate_record_absent_ok_in_edit() {
        let data = json!({"price": 1.0});
        let violations =
            validate_record(&product_schema(), data.as_object().unwrap(), FormMode::Edit);

        assert!(violations.is_empty());
    }

    #[test]
    fn test_validate_record_range_and_length() {
        let data = json!({"name": "G", "price": -2});
        let violations =
            validate_record(&product_schema(), data.as_object().unwrap(), FormMode::Create);

        assert_eq!(violations.len(), 2);
        assert!(violations[0].contains("minimum length is 2"));
        assert!(violations[1].contains("minimum value is 0"));
    }

    #[test]
    fn test_validate_skips_system_fields() {
        let data = json!({"name": "Gadget"});
        let violations =
            validate_record(&product_schema(), data.as_object().unwrap(), FormMode::Create);

        // id is auto-generated; its absence is not a violation.
        assert!(violations.is_empty());
    }
}
