// crates/gatewayd-startos-config/src/spec.rs
// ============================================================================
// Module: Configuration Specification Model
// Description: Typed form fields, objects, tagged unions, and package pointers.
// Purpose: Describe a configuration form and serialize it for the platform.
// Dependencies: serde, thiserror, crate::identifiers, crate::pattern
// ============================================================================

//! ## Overview
//! A [`ConfigSpec`] is an ordered tree of [`Field`] values. Each field is one
//! of four kinds: a validated string, a nested object, a tagged union whose
//! variants expose their own sub-fields, or a pointer into another installed
//! package's exposed data. Pointers are plain data (package id plus selector);
//! the platform substitutes their live value at render time.
//!
//! Invariants:
//! - A [`ConfigSpec`] only exists after [`ConfigSpec::new`] has checked the
//!   whole tree; any violation is a [`SchemaError`] and no spec is returned.
//! - Object and variant specs keep declaration order on the wire.
//! - Masked string defaults are never rendered by `Debug`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde::Serializer;
use serde::ser::SerializeMap;
use thiserror::Error;

use crate::identifiers::FieldName;
use crate::identifiers::PackageId;
use crate::identifiers::VariantId;
use crate::pattern::PatternError;
use crate::pattern::ValuePattern;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Construction-time contract violations. Any of these prevents a schema from
/// being returned.
///
/// # Invariants
/// - `path` is the dotted location of the offending field; union variant
///   fields include the variant id as a path segment.
/// - Messages never include default values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field has an empty name.
    #[error("field at `{path}` has an empty name")]
    EmptyFieldName {
        /// Location of the enclosing spec.
        path: String,
    },
    /// Two fields in the same object share a name.
    #[error("duplicate field `{path}`")]
    DuplicateField {
        /// Location of the duplicated field.
        path: String,
    },
    /// A union declares no variants.
    #[error("union `{path}` declares no variants")]
    EmptyUnion {
        /// Location of the union.
        path: String,
    },
    /// A union declares the same variant twice.
    #[error("union `{path}` declares variant `{variant}` more than once")]
    DuplicateVariant {
        /// Location of the union.
        path: String,
        /// Duplicated variant id.
        variant: VariantId,
    },
    /// A union's default variant is not one of its variants.
    #[error("union `{path}` default variant `{variant}` is not declared")]
    UnknownDefaultVariant {
        /// Location of the union.
        path: String,
        /// Offending default variant.
        variant: VariantId,
    },
    /// A union tag id shadows a sub-field of one of its variants.
    #[error("union `{path}` tag `{tag}` collides with a field of variant `{variant}`")]
    TagCollision {
        /// Location of the union.
        path: String,
        /// Tag field id.
        tag: FieldName,
        /// Variant declaring the colliding field.
        variant: VariantId,
    },
    /// A pointer has an empty selector.
    #[error("pointer `{path}` has an empty selector")]
    EmptySelector {
        /// Location of the pointer.
        path: String,
    },
    /// A config-scoped pointer selector is not a `$.` path.
    #[error("pointer `{path}` selector `{selector}` is not a config path")]
    InvalidSelector {
        /// Location of the pointer.
        path: String,
        /// Offending selector.
        selector: String,
    },
    /// A string default does not satisfy the field's own pattern.
    #[error("field `{path}` default does not satisfy its pattern")]
    DefaultRejected {
        /// Location of the string field.
        path: String,
    },
    /// A pattern failed to compile or disagrees with its description.
    #[error("field `{path}` pattern is invalid: {source}")]
    Pattern {
        /// Location of the string field.
        path: String,
        /// Underlying pattern error.
        source: PatternError,
    },
}

// ============================================================================
// SECTION: Field Kinds
// ============================================================================

/// Leaf string field with an optional validation pattern.
#[derive(Clone, PartialEq, Eq)]
pub struct StringField {
    /// Whether the value may be null.
    pub nullable: bool,
    /// Default value, when one exists.
    pub default: Option<String>,
    /// Validation pattern and its description.
    pub pattern: Option<ValuePattern>,
    /// Whether the value must never be echoed back to the operator.
    pub masked: bool,
}

impl StringField {
    /// Creates a required string field with no default and no pattern.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nullable: false,
            default: None,
            pattern: None,
            masked: false,
        }
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Sets the validation pattern.
    #[must_use]
    pub fn with_pattern(mut self, pattern: ValuePattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Marks the field as masked.
    #[must_use]
    pub const fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Marks the field as nullable.
    #[must_use]
    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

impl Default for StringField {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StringField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let default = match (&self.default, self.masked) {
            (Some(_), true) => Some("[redacted]"),
            (Some(value), false) => Some(value.as_str()),
            (None, _) => None,
        };
        f.debug_struct("StringField")
            .field("nullable", &self.nullable)
            .field("default", &default)
            .field("pattern", &self.pattern)
            .field("masked", &self.masked)
            .finish()
    }
}

/// Nested object field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectField {
    /// Whether the object may be null.
    pub nullable: bool,
    /// Child fields in declaration order.
    pub spec: FieldSpec,
}

impl ObjectField {
    /// Creates a required object field.
    #[must_use]
    pub const fn new(spec: FieldSpec) -> Self {
        Self {
            nullable: false,
            spec,
        }
    }
}

/// Synthetic sub-field holding a union's selected variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionTag {
    /// Key of the tag inside the union's value object.
    pub id: FieldName,
    /// Display label of the tag selector.
    pub name: String,
}

/// One named alternative of a tagged union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Variant id stored in the tag field.
    pub id: VariantId,
    /// Display label for the variant.
    pub label: String,
    /// Fields visible only when this variant is selected.
    pub spec: FieldSpec,
}

/// Tagged union field.
///
/// # Invariants
/// - Variant labels and variant specs are stored together, so the rendered
///   `variant-names` and `variants` maps share one key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionField {
    /// Tag sub-field.
    pub tag: UnionTag,
    /// Variant selected when the operator has not chosen one.
    pub default_variant: VariantId,
    /// Variants in declaration order.
    pub variants: Vec<Variant>,
}

impl UnionField {
    /// Creates a union with no variants yet.
    #[must_use]
    pub fn new(
        tag_id: impl Into<FieldName>,
        tag_name: impl Into<String>,
        default_variant: impl Into<VariantId>,
    ) -> Self {
        Self {
            tag: UnionTag {
                id: tag_id.into(),
                name: tag_name.into(),
            },
            default_variant: default_variant.into(),
            variants: Vec::new(),
        }
    }

    /// Appends a variant.
    #[must_use]
    pub fn with_variant(
        mut self,
        id: impl Into<VariantId>,
        label: impl Into<String>,
        spec: FieldSpec,
    ) -> Self {
        self.variants.push(Variant {
            id: id.into(),
            label: label.into(),
            spec,
        });
        self
    }

    /// Looks up a variant by id.
    #[must_use]
    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.iter().find(|variant| variant.id.as_str() == id)
    }

    /// Returns the variant ids in declaration order.
    pub fn variant_ids(&self) -> impl Iterator<Item = &VariantId> {
        self.variants.iter().map(|variant| &variant.id)
    }
}

/// Data a pointer reads from the target package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerTarget {
    /// A value inside the target's own configuration.
    Config,
    /// The target's Tor address for an interface.
    TorAddress,
    /// The target's LAN address for an interface.
    LanAddress,
}

/// Cross-package reference resolved by the platform at render time.
///
/// # Invariants
/// - `selector` is a `$.` path for [`PointerTarget::Config`] and an interface
///   id for address targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerField {
    /// Package the pointer reads from.
    pub package_id: PackageId,
    /// Scope exposed by the target package.
    pub target: PointerTarget,
    /// Path or interface selecting the value.
    pub selector: String,
    /// Whether several target instances may satisfy the pointer.
    pub multi: bool,
}

impl PointerField {
    /// Creates a single-instance pointer into a package.
    #[must_use]
    pub fn package(
        package_id: impl Into<PackageId>,
        target: PointerTarget,
        selector: impl Into<String>,
    ) -> Self {
        Self {
            package_id: package_id.into(),
            target,
            selector: selector.into(),
            multi: false,
        }
    }
}

/// Kind-specific attributes of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// String leaf.
    String(StringField),
    /// Nested object.
    Object(ObjectField),
    /// Tagged union.
    Union(UnionField),
    /// Cross-package pointer.
    Pointer(PointerField),
}

impl FieldKind {
    /// Returns the wire `type` label.
    #[must_use]
    pub const fn type_label(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Object(_) => "object",
            Self::Union(_) => "union",
            Self::Pointer(_) => "pointer",
        }
    }
}

impl From<StringField> for FieldKind {
    fn from(value: StringField) -> Self {
        Self::String(value)
    }
}

impl From<ObjectField> for FieldKind {
    fn from(value: ObjectField) -> Self {
        Self::Object(value)
    }
}

impl From<UnionField> for FieldKind {
    fn from(value: UnionField) -> Self {
        Self::Union(value)
    }
}

impl From<PointerField> for FieldKind {
    fn from(value: PointerField) -> Self {
        Self::Pointer(value)
    }
}

// ============================================================================
// SECTION: Fields and Specs
// ============================================================================

/// A named, described field of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Key inside the enclosing spec.
    pub name: FieldName,
    /// Label shown to the operator.
    pub display_name: String,
    /// Help text shown to the operator.
    pub description: String,
    /// Kind-specific attributes.
    pub kind: FieldKind,
}

impl Field {
    /// Creates a field.
    #[must_use]
    pub fn new(
        name: impl Into<FieldName>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        kind: impl Into<FieldKind>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            kind: kind.into(),
        }
    }
}

/// Ordered field list keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    /// Fields in declaration order.
    fields: Vec<Field>,
}

impl FieldSpec {
    /// Creates an empty spec.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    #[must_use]
    pub fn with(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name.as_str() == name)
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Returns the number of fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the spec has no fields.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldSpec {
    type IntoIter = std::slice::Iter<'a, Field>;
    type Item = &'a Field;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Checked configuration specification.
///
/// # Invariants
/// - Every invariant listed on [`SchemaError`] holds for the whole tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSpec {
    /// Top-level fields.
    root: FieldSpec,
}

impl ConfigSpec {
    /// Checks `root` and wraps it as a specification.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found in a depth-first walk.
    pub fn new(root: FieldSpec) -> Result<Self, SchemaError> {
        check_spec(&root, "")?;
        Ok(Self {
            root,
        })
    }

    /// Returns the top-level fields.
    #[must_use]
    pub const fn root(&self) -> &FieldSpec {
        &self.root
    }

    /// Returns every field with its dotted path, depth-first in declaration
    /// order. Union variant fields include the variant id as a segment.
    #[must_use]
    pub fn fields_with_paths(&self) -> Vec<(String, &Field)> {
        let mut out = Vec::new();
        collect_fields(&self.root, "", &mut out);
        out
    }

    /// Calls `visit` with every string field and its dotted path.
    pub fn visit_strings(&self, mut visit: impl FnMut(&str, &StringField)) {
        for (path, field) in self.fields_with_paths() {
            if let FieldKind::String(string) = &field.kind {
                visit(&path, string);
            }
        }
    }

    /// Calls `visit` with every union field and its dotted path.
    pub fn visit_unions(&self, mut visit: impl FnMut(&str, &UnionField)) {
        for (path, field) in self.fields_with_paths() {
            if let FieldKind::Union(union) = &field.kind {
                visit(&path, union);
            }
        }
    }

    /// Calls `visit` with every pointer field and its dotted path.
    pub fn visit_pointers(&self, mut visit: impl FnMut(&str, &PointerField)) {
        for (path, field) in self.fields_with_paths() {
            if let FieldKind::Pointer(pointer) = &field.kind {
                visit(&path, pointer);
            }
        }
    }
}

// ============================================================================
// SECTION: Schema Checks
// ============================================================================

/// Joins a dotted path segment.
pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() { segment.to_string() } else { format!("{prefix}.{segment}") }
}

/// Collects fields depth-first.
fn collect_fields<'a>(spec: &'a FieldSpec, prefix: &str, out: &mut Vec<(String, &'a Field)>) {
    for field in spec {
        let path = join_path(prefix, field.name.as_str());
        out.push((path.clone(), field));
        match &field.kind {
            FieldKind::Object(object) => collect_fields(&object.spec, &path, out),
            FieldKind::Union(union) => {
                for variant in &union.variants {
                    collect_fields(&variant.spec, &join_path(&path, variant.id.as_str()), out);
                }
            }
            FieldKind::String(_) | FieldKind::Pointer(_) => {}
        }
    }
}

/// Checks one spec level and recurses into children.
fn check_spec(spec: &FieldSpec, prefix: &str) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    for field in spec {
        if field.name.as_str().is_empty() {
            return Err(SchemaError::EmptyFieldName {
                path: prefix.to_string(),
            });
        }
        let path = join_path(prefix, field.name.as_str());
        if !seen.insert(field.name.as_str()) {
            return Err(SchemaError::DuplicateField {
                path,
            });
        }
        match &field.kind {
            FieldKind::String(string) => check_string(string, &path)?,
            FieldKind::Object(object) => check_spec(&object.spec, &path)?,
            FieldKind::Union(union) => check_union(union, &path)?,
            FieldKind::Pointer(pointer) => check_pointer(pointer, &path)?,
        }
    }
    Ok(())
}

/// Checks pattern agreement and the default-matches-pattern invariant.
fn check_string(field: &StringField, path: &str) -> Result<(), SchemaError> {
    let Some(pattern) = &field.pattern else {
        return Ok(());
    };
    pattern.check_agreement().map_err(|source| SchemaError::Pattern {
        path: path.to_string(),
        source,
    })?;
    if let Some(default) = &field.default
        && !pattern.is_match(default)
    {
        return Err(SchemaError::DefaultRejected {
            path: path.to_string(),
        });
    }
    Ok(())
}

/// Checks union variant invariants and recurses into variant specs.
fn check_union(field: &UnionField, path: &str) -> Result<(), SchemaError> {
    if field.variants.is_empty() {
        return Err(SchemaError::EmptyUnion {
            path: path.to_string(),
        });
    }
    let mut seen = BTreeSet::new();
    for variant in &field.variants {
        if !seen.insert(variant.id.as_str()) {
            return Err(SchemaError::DuplicateVariant {
                path: path.to_string(),
                variant: variant.id.clone(),
            });
        }
        if variant.spec.get(field.tag.id.as_str()).is_some() {
            return Err(SchemaError::TagCollision {
                path: path.to_string(),
                tag: field.tag.id.clone(),
                variant: variant.id.clone(),
            });
        }
        check_spec(&variant.spec, &join_path(path, variant.id.as_str()))?;
    }
    if !seen.contains(field.default_variant.as_str()) {
        return Err(SchemaError::UnknownDefaultVariant {
            path: path.to_string(),
            variant: field.default_variant.clone(),
        });
    }
    Ok(())
}

/// Checks pointer selectors.
fn check_pointer(field: &PointerField, path: &str) -> Result<(), SchemaError> {
    if field.selector.trim().is_empty() {
        return Err(SchemaError::EmptySelector {
            path: path.to_string(),
        });
    }
    if field.target == PointerTarget::Config && !field.selector.starts_with("$.") {
        return Err(SchemaError::InvalidSelector {
            path: path.to_string(),
            selector: field.selector.clone(),
        });
    }
    Ok(())
}

// ============================================================================
// SECTION: Serialization
// ============================================================================

impl Serialize for ConfigSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.root.serialize(serializer)
    }
}

impl Serialize for FieldSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(field.name.as_str(), field)?;
        }
        map.end()
    }
}

/// Wire view of a union tag.
#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct TagView<'a> {
    /// Tag field id.
    id: &'a FieldName,
    /// Tag label.
    name: &'a str,
    /// Variant id to label map.
    variant_names: VariantNames<'a>,
}

/// Variant id to label map in declaration order.
struct VariantNames<'a>(&'a [Variant]);

impl Serialize for VariantNames<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for variant in self.0 {
            map.serialize_entry(variant.id.as_str(), &variant.label)?;
        }
        map.end()
    }
}

/// Variant id to spec map in declaration order.
struct VariantSpecs<'a>(&'a [Variant]);

impl Serialize for VariantSpecs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for variant in self.0 {
            map.serialize_entry(variant.id.as_str(), &variant.spec)?;
        }
        map.end()
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", self.kind.type_label())?;
        map.serialize_entry("name", &self.display_name)?;
        map.serialize_entry("description", &self.description)?;
        match &self.kind {
            FieldKind::String(string) => {
                map.serialize_entry("nullable", &string.nullable)?;
                if let Some(default) = &string.default {
                    map.serialize_entry("default", default)?;
                }
                if let Some(pattern) = &string.pattern {
                    map.serialize_entry("pattern", pattern.pattern())?;
                    map.serialize_entry("pattern-description", pattern.description())?;
                }
                map.serialize_entry("masked", &string.masked)?;
            }
            FieldKind::Object(object) => {
                map.serialize_entry("nullable", &object.nullable)?;
                map.serialize_entry("spec", &object.spec)?;
            }
            FieldKind::Union(union) => {
                map.serialize_entry(
                    "tag",
                    &TagView {
                        id: &union.tag.id,
                        name: &union.tag.name,
                        variant_names: VariantNames(&union.variants),
                    },
                )?;
                map.serialize_entry("default", &union.default_variant)?;
                map.serialize_entry("variants", &VariantSpecs(&union.variants))?;
            }
            FieldKind::Pointer(pointer) => {
                map.serialize_entry("subtype", "package")?;
                map.serialize_entry("package-id", &pointer.package_id)?;
                map.serialize_entry("target", &pointer.target)?;
                let selector_key = match pointer.target {
                    PointerTarget::Config => "selector",
                    PointerTarget::TorAddress | PointerTarget::LanAddress => "interface",
                };
                map.serialize_entry(selector_key, &pointer.selector)?;
                map.serialize_entry("multi", &pointer.multi)?;
            }
        }
        map.end()
    }
}
