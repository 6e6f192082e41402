//! Metadata channel: carries declared types through languages that cannot
//! spell them.
//!
//! A writer for an untyped language collects one [`LanguageMetadata`] record
//! per consumer node (`FunctionDef`, `Assign`) in pre-order, and either
//! embeds the non-empty ones as comments ([`comment`]) or hands the whole
//! list back as a sidecar. A reader rebuilds a [`MetadataQueue`] from
//! either source and [`inject`]s it with the same walk. Records are not
//! tagged with their node; order is the only link.

pub mod comment;

use crate::ir::{Assign, Expr, FunctionDef, Module, Stmt, shared_constant_type};
use crate::types::{CanonicalType, TypeDefinition, canonicalize};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, VecDeque};

/// Typed metadata attached to one consumer node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<CanonicalType>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub param_types: BTreeMap<String, CanonicalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<TypeDefinition>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub individual_param_metadata: BTreeMap<String, BTreeMap<String, String>>,
}

impl LanguageMetadata {
    pub fn is_empty(&self) -> bool {
        self.return_type.is_none()
            && self.param_types.is_empty()
            && self.variable_type.is_none()
            && self.individual_param_metadata.is_empty()
    }

    /// Decode an untyped JSON object.
    ///
    /// This is the only place loose maps are accepted. Unexpected value
    /// shapes are skipped key by key; a non-object yields `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut record = Self::default();

        if let Some(ty) = object.get("returnType").and_then(Value::as_str) {
            record.return_type = Some(canonicalize(ty));
        }

        if let Some(params) = object.get("paramTypes").and_then(Value::as_object) {
            for (name, ty) in params {
                if let Some(ty) = ty.as_str() {
                    record.param_types.insert(name.clone(), canonicalize(ty));
                }
            }
        }

        if let Some(ty) = object.get("variableType").and_then(Value::as_str) {
            record.variable_type = Some(TypeDefinition::parse(ty));
        }

        if let Some(params) = object
            .get("individualParamMetadata")
            .and_then(Value::as_object)
        {
            for (name, facts) in params {
                let Some(facts) = facts.as_object() else {
                    continue;
                };
                let facts: BTreeMap<String, String> = facts
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.clone(), v.to_string())))
                    .collect();
                if !facts.is_empty() {
                    record.individual_param_metadata.insert(name.clone(), facts);
                }
            }
        }

        Some(record)
    }

    /// Compact single-line JSON form.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Record describing a function's declared types.
    pub fn for_function(func: &FunctionDef) -> Self {
        Self {
            return_type: func.return_type.is_known().then_some(func.return_type),
            param_types: func.param_types.clone(),
            variable_type: None,
            individual_param_metadata: func.param_metadata.clone(),
        }
    }

    /// Record describing an assignment's declared type.
    pub fn for_assign(assign: &Assign) -> Self {
        let variable_type = if assign.variable_type.is_known() {
            Some(TypeDefinition::Simple(assign.variable_type))
        } else {
            declared_value_type(&assign.value)
        };
        Self {
            variable_type,
            ..Self::default()
        }
    }
}

/// Container type on a list/tuple value that a reader would not recover
/// from the literal alone.
fn declared_value_type(value: &Expr) -> Option<TypeDefinition> {
    match value {
        Expr::List {
            elements,
            element_type,
            ..
        } if element_type.is_known() && *element_type != shared_constant_type(elements) => {
            Some(TypeDefinition::array(*element_type))
        }
        Expr::Tuple { element_types, .. } if !element_types.is_empty() => {
            Some(TypeDefinition::Tuple(element_types.clone()))
        }
        _ => None,
    }
}

/// Rendered code paired with the records it could not carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeWithMetadata {
    pub code: String,
    pub metadata: Vec<LanguageMetadata>,
}

/// FIFO of records awaiting injection. One instance per parse call.
#[derive(Debug, Clone, Default)]
pub struct MetadataQueue {
    records: VecDeque<LanguageMetadata>,
}

impl MetadataQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a queue from comment records keyed by source row.
    ///
    /// `consumer_rows` lists the first source row of every consumer node in
    /// walk order. Each consumer gets the record found on its row, or an
    /// empty one. Records on rows with no consumer are dropped.
    pub fn aligned(records: Vec<(usize, LanguageMetadata)>, consumer_rows: &[usize]) -> Self {
        let mut by_row: BTreeMap<usize, LanguageMetadata> = records.into_iter().collect();
        let queue: VecDeque<LanguageMetadata> = consumer_rows
            .iter()
            .map(|row| by_row.remove(row).unwrap_or_default())
            .collect();
        if !by_row.is_empty() {
            tracing::debug!(
                rows = ?by_row.keys().collect::<Vec<_>>(),
                "metadata comments not attached to a function or assignment"
            );
        }
        Self { records: queue }
    }

    pub fn push(&mut self, record: LanguageMetadata) {
        self.records.push_back(record);
    }

    pub fn pop(&mut self) -> Option<LanguageMetadata> {
        self.records.pop_front()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl From<Vec<LanguageMetadata>> for MetadataQueue {
    fn from(records: Vec<LanguageMetadata>) -> Self {
        Self {
            records: records.into(),
        }
    }
}

/// Collect one record per consumer node, in walk order.
pub fn collect(module: &Module) -> Vec<LanguageMetadata> {
    let mut records = Vec::new();
    collect_stmts(&module.body, &mut records);
    records
}

fn collect_stmts(stmts: &[Stmt], records: &mut Vec<LanguageMetadata>) {
    for stmt in stmts {
        match stmt {
            Stmt::FunctionDef(func) => {
                records.push(LanguageMetadata::for_function(func));
                collect_stmts(&func.body, records);
            }
            Stmt::ClassDef(class) => collect_stmts(&class.body, records),
            Stmt::If { body, orelse, .. } => {
                collect_stmts(body, records);
                collect_stmts(orelse, records);
            }
            Stmt::Assign(assign) => records.push(LanguageMetadata::for_assign(assign)),
            Stmt::ExprStatement(_)
            | Stmt::Print(_)
            | Stmt::CallStatement(_)
            | Stmt::Return(_)
            | Stmt::Unknown { .. } => {}
        }
    }
}

/// Re-attach queued records to consumer nodes in walk order.
///
/// Running out of records leaves the remaining nodes untouched; leftover
/// records are discarded.
pub fn inject(module: Module, queue: &mut MetadataQueue) -> Module {
    let body = inject_stmts(module.body, queue);
    if !queue.is_empty() {
        tracing::debug!(leftover = queue.len(), "discarding unconsumed metadata records");
        queue.clear();
    }
    Module { body }
}

fn inject_stmts(stmts: Vec<Stmt>, queue: &mut MetadataQueue) -> Vec<Stmt> {
    stmts
        .into_iter()
        .map(|stmt| inject_stmt(stmt, queue))
        .collect()
}

fn inject_stmt(stmt: Stmt, queue: &mut MetadataQueue) -> Stmt {
    match stmt {
        Stmt::FunctionDef(func) => {
            let mut func = match queue.pop() {
                Some(record) => apply_to_function(func, record),
                None => func,
            };
            func.body = inject_stmts(std::mem::take(&mut func.body), queue);
            Stmt::FunctionDef(func)
        }
        Stmt::ClassDef(mut class) => {
            class.body = inject_stmts(std::mem::take(&mut class.body), queue);
            Stmt::ClassDef(class)
        }
        Stmt::If { test, body, orelse } => {
            let body = inject_stmts(body, queue);
            let orelse = inject_stmts(orelse, queue);
            Stmt::If { test, body, orelse }
        }
        Stmt::Assign(assign) => match queue.pop().and_then(|r| r.variable_type) {
            Some(def) => Stmt::Assign(apply_variable_type(assign, &def)),
            None => Stmt::Assign(assign),
        },
        other => other,
    }
}

fn apply_to_function(mut func: FunctionDef, record: LanguageMetadata) -> FunctionDef {
    if let Some(ty) = record.return_type {
        func.return_type = ty;
    }
    for (name, ty) in record.param_types {
        if func.has_param(&name) {
            func.param_types.insert(name, ty);
        } else {
            tracing::debug!(function = %func.name, param = %name, "ignoring type for unknown parameter");
        }
    }
    for (name, facts) in record.individual_param_metadata {
        if func.has_param(&name) {
            func.param_metadata.insert(name, facts);
        }
    }
    func
}

/// Apply a declared type to an assignment.
///
/// Simple types set `variable_type`; array and tuple types retype the
/// assigned list or tuple literal, turning a list into a tuple when needed.
pub fn apply_variable_type(assign: Assign, def: &TypeDefinition) -> Assign {
    match def {
        TypeDefinition::Simple(ty) => Assign {
            variable_type: *ty,
            ..assign
        },
        TypeDefinition::Array {
            element,
            homogeneous,
        } => {
            let value = match assign.value {
                Expr::List { elements, .. } => Expr::List {
                    elements,
                    element_type: *element,
                    homogeneous: *homogeneous,
                },
                other => other,
            };
            Assign { value, ..assign }
        }
        TypeDefinition::Tuple(types) => {
            let value = match assign.value {
                Expr::List { elements, .. } | Expr::Tuple { elements, .. }
                    if elements.len() == types.len() =>
                {
                    Expr::Tuple {
                        elements,
                        element_types: types.clone(),
                    }
                }
                other => other,
            };
            Assign { value, ..assign }
        }
        TypeDefinition::Custom(_) | TypeDefinition::Unknown => assign,
    }
}
