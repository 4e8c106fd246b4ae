//! Interview schema construction and lifecycle.
//!
//! The `Interview` struct lives in `intake-types`; this module provides the
//! ordered registration builder that constructs one, and an extension trait
//! (`InterviewExt`) with lifecycle methods: snapshot merging, field activity,
//! and display rendering. The extension trait pattern is used because Rust
//! does not allow inherent impls for types defined in another crate.

use intake_types::cast::{CastDef, CastKind, cast_name};
use intake_types::error::BuildError;
use intake_types::field::{FieldDef, RESERVED_KEYS, VisibleWhen};
use intake_types::interview::{Interview, Role, RoleTrait};

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Ordered registration builder for an [`Interview`].
///
/// Declaration order of fields, casts, and traits is preserved and is
/// externally observable: it drives prompt construction and tool schemas.
/// `build` validates the registered schema (duplicate fields, duplicate or
/// reserved cast names, dangling visibility targets) so a malformed
/// interview never reaches a conversation.
#[derive(Debug, Clone)]
pub struct InterviewBuilder {
    name: String,
    description: String,
    guide: Role,
    respondent: Role,
    fields: Vec<FieldDef>,
}

impl InterviewBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            guide: Role::new("Interviewer"),
            respondent: Role::new("Respondent"),
            fields: Vec::new(),
        }
    }

    /// Rename the guiding role.
    pub fn guide(mut self, name: impl Into<String>) -> Self {
        self.guide.name = name.into();
        self
    }

    /// Rename the responding role.
    pub fn respondent(mut self, name: impl Into<String>) -> Self {
        self.respondent.name = name.into();
        self
    }

    /// Register an always-active trait on the guiding role.
    pub fn guide_trait(mut self, description: impl Into<String>) -> Self {
        self.guide.traits.push(RoleTrait::always(description));
        self
    }

    /// Register a triggered trait on the guiding role.
    pub fn guide_trait_when(
        mut self,
        trigger: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.guide.traits.push(RoleTrait::when(trigger, description));
        self
    }

    /// Register an always-active trait on the responding role.
    pub fn respondent_trait(mut self, description: impl Into<String>) -> Self {
        self.respondent.traits.push(RoleTrait::always(description));
        self
    }

    /// Register a triggered trait on the responding role.
    pub fn respondent_trait_when(
        mut self,
        trigger: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.respondent
            .traits
            .push(RoleTrait::when(trigger, description));
        self
    }

    /// Register a plain field with no specs or casts.
    pub fn field(mut self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.fields.push(FieldDef::new(name, description));
        self
    }

    /// Register a field and configure its specs and casts.
    pub fn field_with(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        configure: impl FnOnce(FieldBuilder) -> FieldBuilder,
    ) -> Self {
        let builder = configure(FieldBuilder {
            def: FieldDef::new(name, description),
        });
        self.fields.push(builder.def);
        self
    }

    /// Validate the registered schema and produce the interview.
    pub fn build(self) -> Result<Interview, BuildError> {
        for (i, field) in self.fields.iter().enumerate() {
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(BuildError::DuplicateField(field.name.clone()));
            }
            for (j, cast) in field.casts.iter().enumerate() {
                if RESERVED_KEYS.contains(&cast.name.as_str()) {
                    return Err(BuildError::ReservedCastName {
                        field: field.name.clone(),
                        cast: cast.name.clone(),
                    });
                }
                if field.casts[..j].iter().any(|c| c.name == cast.name) {
                    return Err(BuildError::DuplicateCast {
                        field: field.name.clone(),
                        cast: cast.name.clone(),
                    });
                }
            }
            if let Some(cond) = &field.specs.visible_when {
                if !self.fields.iter().any(|f| f.name == cond.field) {
                    return Err(BuildError::UnknownVisibilityField {
                        field: field.name.clone(),
                        depends_on: cond.field.clone(),
                    });
                }
            }
        }

        Ok(Interview {
            name: self.name,
            description: self.description,
            guide: self.guide,
            respondent: self.respondent,
            fields: self.fields,
        })
    }
}

/// Configures one field inside [`InterviewBuilder::field_with`].
#[derive(Debug)]
pub struct FieldBuilder {
    def: FieldDef,
}

impl FieldBuilder {
    /// Add a rule the collected value must satisfy.
    pub fn must(mut self, rule: impl Into<String>) -> Self {
        self.def.specs.musts.push(rule.into());
        self
    }

    /// Add a rule the collected value must not violate.
    pub fn reject(mut self, rule: impl Into<String>) -> Self {
        self.def.specs.rejects.push(rule.into());
        self
    }

    /// Add elicitation guidance that is shown but not enforced.
    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.def.specs.hints.push(hint.into());
        self
    }

    /// Never echo the collected value back in rendered output.
    pub fn confidential(mut self) -> Self {
        self.def.specs.confidential = true;
        self
    }

    /// Collect only after every non-conclude field is filled.
    pub fn conclude(mut self) -> Self {
        self.def.specs.conclude = true;
        self
    }

    /// Gate this field on another field's collected value.
    ///
    /// `equals: None` activates once the other field is collected at all.
    pub fn visible_when(mut self, field: impl Into<String>, equals: Option<&str>) -> Self {
        self.def.specs.visible_when = Some(VisibleWhen {
            field: field.into(),
            equals: equals.map(str::to_string),
        });
        self
    }

    /// Register a cast. The cast's name is built from `base` plus the
    /// optional `sub` (`as_bool` + `even` gives `as_bool_even`).
    pub fn cast(
        mut self,
        base: &str,
        sub: Option<&str>,
        kind: CastKind,
        prompt: impl Into<String>,
    ) -> Self {
        self.def.casts.push(CastDef {
            name: cast_name(base, sub),
            kind,
            prompt: prompt.into(),
        });
        self
    }
}

// ---------------------------------------------------------------------------
// Lifecycle extension
// ---------------------------------------------------------------------------

/// Extension trait for [`Interview`] lifecycle management.
pub trait InterviewExt {
    /// Pull `other`'s collected values into `self`, field by field.
    ///
    /// Per field, `other`'s value wins when it is present; an absent value in
    /// `other` never erases one in `self`. Doneness can therefore only grow
    /// across merges. Fields are matched by name; names unknown to `self`
    /// are ignored.
    fn merge_from(&mut self, other: &Interview);

    /// Whether a field's visibility condition currently holds.
    fn is_visible(&self, field: &FieldDef) -> bool;

    /// Fields currently eligible for the structured-update tool: visibility
    /// satisfied, and conclude fields only once every non-conclude field is
    /// collected.
    fn active_fields(&self) -> Vec<&FieldDef>;

    /// Names of declared fields still lacking a value.
    fn pending_fields(&self) -> Vec<&str>;

    /// Human-readable rendering of collected state. Confidential field
    /// values are masked.
    fn summary(&self) -> String;
}

impl InterviewExt for Interview {
    fn merge_from(&mut self, other: &Interview) {
        for field in &mut self.fields {
            if let Some(theirs) = other.field(&field.name) {
                if let Some(value) = &theirs.value {
                    field.value = Some(value.clone());
                }
            }
        }
    }

    fn is_visible(&self, field: &FieldDef) -> bool {
        match &field.specs.visible_when {
            None => true,
            Some(cond) => match self.field(&cond.field).and_then(|f| f.value.as_ref()) {
                None => false,
                Some(value) => cond
                    .equals
                    .as_deref()
                    .is_none_or(|want| value.primary == want),
            },
        }
    }

    fn active_fields(&self) -> Vec<&FieldDef> {
        let main_pass_done = self
            .fields
            .iter()
            .filter(|f| !f.specs.conclude)
            .all(|f| f.value.is_some());

        self.fields
            .iter()
            .filter(|f| (!f.specs.conclude || main_pass_done) && self.is_visible(f))
            .collect()
    }

    fn pending_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.value.is_none())
            .map(|f| f.name.as_str())
            .collect()
    }

    fn summary(&self) -> String {
        let mut lines = Vec::with_capacity(self.fields.len() + 1);
        lines.push(format!("{}: {}", self.name, self.description));

        for field in &self.fields {
            match &field.value {
                None => lines.push(format!("  {}: (pending)", field.name)),
                Some(_) if field.specs.confidential => {
                    lines.push(format!("  {}: (confidential)", field.name));
                }
                Some(value) => {
                    lines.push(format!("  {}: {}", field.name, value.primary));
                    for (name, cast_value) in &value.casts {
                        lines.push(format!("    {name}: {cast_value}"));
                    }
                }
            }
        }

        lines.join("\n")
    }
}
