// crates/gatewayd-startos-config/src/json_schema.rs
// ============================================================================
// Module: JSON Schema Export
// Description: JSON Schema (draft 2020-12) view of a configuration specification.
// Purpose: Let external tooling validate saved configurations without the platform.
// Dependencies: serde_json, crate::spec
// ============================================================================

//! ## Overview
//! The export mirrors the form: string fields carry their pattern, objects
//! list their properties, and unions become `oneOf` branches discriminated by
//! a `const` tag. Pointer values are substituted by the platform, so their
//! schema accepts anything.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use serde_json::json;

use crate::spec::ConfigSpec;
use crate::spec::Field;
use crate::spec::FieldKind;
use crate::spec::FieldSpec;
use crate::spec::UnionField;

// ============================================================================
// SECTION: Export
// ============================================================================

/// Renders the JSON Schema for `spec`.
#[must_use]
pub fn json_schema(spec: &ConfigSpec) -> Value {
    let mut schema = object_schema(spec.root(), &[]);
    if let Value::Object(map) = &mut schema {
        map.insert(
            "$schema".to_string(),
            Value::String("https://json-schema.org/draft/2020-12/schema".to_string()),
        );
        map.insert("title".to_string(), Value::String("gatewayd configuration".to_string()));
    }
    schema
}

/// Schema for an object level; `extra` adds properties such as a union tag.
fn object_schema(spec: &FieldSpec, extra: &[(&str, Value)]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for (name, schema) in extra {
        properties.insert((*name).to_string(), schema.clone());
        required.push(Value::String((*name).to_string()));
    }
    for field in spec {
        properties.insert(field.name.to_string(), field_schema(field));
        if !is_optional(field) {
            required.push(Value::String(field.name.to_string()));
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Returns true when the field may be absent or null.
const fn is_optional(field: &Field) -> bool {
    match &field.kind {
        FieldKind::String(string) => string.nullable,
        FieldKind::Object(object) => object.nullable,
        FieldKind::Union(_) => false,
        FieldKind::Pointer(_) => true,
    }
}

/// Schema for a single field.
fn field_schema(field: &Field) -> Value {
    let mut schema = match &field.kind {
        FieldKind::String(string) => {
            let mut schema = Map::new();
            let kind = if string.nullable { json!(["string", "null"]) } else { json!("string") };
            schema.insert("type".to_string(), kind);
            if let Some(pattern) = &string.pattern {
                schema.insert("pattern".to_string(), Value::String(pattern.pattern().to_string()));
            }
            if string.masked {
                schema.insert("writeOnly".to_string(), Value::Bool(true));
            } else if let Some(default) = &string.default {
                schema.insert("default".to_string(), Value::String(default.clone()));
            }
            Value::Object(schema)
        }
        FieldKind::Object(object) => object_schema(&object.spec, &[]),
        FieldKind::Union(union) => union_schema(union),
        FieldKind::Pointer(_) => json!({}),
    };
    if let Value::Object(map) = &mut schema {
        map.insert("title".to_string(), Value::String(field.display_name.clone()));
        map.insert("description".to_string(), Value::String(field.description.clone()));
    }
    schema
}

/// Schema for a union: one branch per variant, keyed by the tag constant.
fn union_schema(union: &UnionField) -> Value {
    let branches: Vec<Value> = union
        .variants
        .iter()
        .map(|variant| {
            let tag = json!({ "const": variant.id.as_str(), "title": variant.label });
            object_schema(&variant.spec, &[(union.tag.id.as_str(), tag)])
        })
        .collect();
    json!({ "oneOf": branches })
}
